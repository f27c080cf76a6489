//! File assembly and emission.
//!
//! Emission is the pipeline's only externally observable side effect: one
//! plain-text Rust source file per analysed type, written through the
//! [`Filer`] abstraction. Assembly is deterministic (a fixed header, a
//! sorted import block, then the items in declaration order, rendered token
//! stream by token stream), so identical descriptor input produces
//! byte-identical output.

pub mod spec_optics;
pub mod type_optics;

use std::collections::{BTreeMap, BTreeSet};
use std::io::Write as _;
use std::path::PathBuf;

use proc_macro2::TokenStream;
use thiserror::Error;
use tracing::debug;

/// The fixed first line of every emitted file.
pub const GENERATED_HEADER: &str = "// Generated by refract. Do not edit.";

/// One assembled file ready for the filer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmittedFile {
    /// Path relative to the filer root.
    pub relative_path: String,
    /// Full file contents.
    pub contents: String,
}

/// Emission failures surfaced as `IoFailure` diagnostics.
#[derive(Debug, Error)]
pub enum FilerError {
    /// The same relative path was written twice in one round.
    #[error("file `{0}` was already emitted this round")]
    Duplicate(String),
    /// The underlying write failed.
    #[error("could not write `{path}`: {source}")]
    Io {
        /// The relative path being written.
        path: String,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },
}

/// The host-provided file-writing facility.
///
/// Writes are create-or-replace against the filer's root; a relative path
/// may be written at most once per round.
pub trait Filer {
    /// Writes `contents` at `relative_path` under the filer's root.
    ///
    /// # Errors
    ///
    /// Returns [`FilerError::Duplicate`] for a repeated path and
    /// [`FilerError::Io`] when the underlying write fails.
    fn write(&mut self, relative_path: &str, contents: &str) -> Result<(), FilerError>;
}

/// A filer writing through `std::fs` under an output root.
#[derive(Debug)]
pub struct FsFiler {
    root: PathBuf,
    written: BTreeSet<String>,
}

impl FsFiler {
    /// Creates a filer rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            written: BTreeSet::new(),
        }
    }
}

impl Filer for FsFiler {
    fn write(&mut self, relative_path: &str, contents: &str) -> Result<(), FilerError> {
        if !self.written.insert(relative_path.to_string()) {
            return Err(FilerError::Duplicate(relative_path.to_string()));
        }

        let target = self.root.join(relative_path);
        let io = |source| FilerError::Io {
            path: relative_path.to_string(),
            source,
        };

        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent).map_err(io)?;
        }
        let mut file = std::fs::File::create(&target).map_err(io)?;
        file.write_all(contents.as_bytes()).map_err(io)?;

        debug!(path = relative_path, bytes = contents.len(), "emitted file");
        Ok(())
    }
}

/// An in-memory filer for tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryFiler {
    files: BTreeMap<String, String>,
}

impl MemoryFiler {
    /// Creates an empty filer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The contents written at `relative_path`, if any.
    #[must_use]
    pub fn file(&self, relative_path: &str) -> Option<&str> {
        self.files.get(relative_path).map(String::as_str)
    }

    /// All written paths, sorted.
    #[must_use]
    pub fn paths(&self) -> Vec<&str> {
        self.files.keys().map(String::as_str).collect()
    }

    /// The number of written files.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Whether nothing was written.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl Filer for MemoryFiler {
    fn write(&mut self, relative_path: &str, contents: &str) -> Result<(), FilerError> {
        if self.files.contains_key(relative_path) {
            return Err(FilerError::Duplicate(relative_path.to_string()));
        }
        self.files
            .insert(relative_path.to_string(), contents.to_string());
        Ok(())
    }
}

/// Assembles one emitted file: header, module doc, sorted imports, items in
/// push order.
#[derive(Debug, Default)]
pub struct FileBuilder {
    doc: String,
    uses: BTreeSet<String>,
    items: Vec<TokenStream>,
}

impl FileBuilder {
    /// Creates a builder whose module doc line is `doc`.
    #[must_use]
    pub fn new(doc: impl Into<String>) -> Self {
        Self {
            doc: doc.into(),
            uses: BTreeSet::new(),
            items: Vec::new(),
        }
    }

    /// Adds an import line (without the `use ` prefix or trailing `;`).
    /// Imports render sorted and deduplicated.
    pub fn import(&mut self, path: impl Into<String>) {
        self.uses.insert(path.into());
    }

    /// Appends an item; items render in push order.
    pub fn push(&mut self, item: TokenStream) {
        self.items.push(item);
    }

    /// Whether any item was pushed.
    #[must_use]
    pub fn has_items(&self) -> bool {
        !self.items.is_empty()
    }

    /// Renders the file.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str(GENERATED_HEADER);
        out.push('\n');
        out.push_str(&format!("//! {}\n", self.doc));

        if !self.uses.is_empty() {
            out.push('\n');
            for import in &self.uses {
                out.push_str(&format!("use {import};\n"));
            }
        }

        for item in &self.items {
            out.push('\n');
            out.push_str(&item.to_string());
            out.push('\n');
        }

        out
    }
}

/// Converts a `PascalCase` or `camelCase` name to `snake_case`.
#[must_use]
pub fn to_snake_case(input: &str) -> String {
    let mut result = String::with_capacity(input.len() + 4);
    let chars: Vec<char> = input.chars().collect();

    for (index, &character) in chars.iter().enumerate() {
        if character.is_uppercase() {
            if index > 0 {
                let previous = chars[index - 1];
                let next_is_lowercase = chars.get(index + 1).is_some_and(|c| c.is_lowercase());
                if previous.is_lowercase() || (previous.is_uppercase() && next_is_lowercase) {
                    result.push('_');
                }
            }
            result.push(character.to_lowercase().next().unwrap_or(character));
        } else {
            result.push(character);
        }
    }

    result
}

/// The file stem for a source type's optics file.
#[must_use]
pub fn optics_file_stem(type_name: &str) -> String {
    format!("{}_optics", to_snake_case(type_name))
}

/// The file stem derived from a spec trait's name: a `Spec` suffix is
/// stripped, otherwise `Impl` is appended, then the result is snake-cased.
#[must_use]
pub fn spec_file_stem(spec_name: &str) -> String {
    let base = spec_name
        .strip_suffix("Spec")
        .filter(|stripped| !stripped.is_empty())
        .map_or_else(|| format!("{spec_name}Impl"), ToString::to_string);
    to_snake_case(&base)
}

/// Maps a target module path to a relative output path for `stem`.
///
/// A leading `crate` segment is dropped; the remaining segments become
/// directories.
#[must_use]
pub fn relative_path(module: Option<&str>, stem: &str) -> String {
    let Some(module) = module else {
        return format!("{stem}.rs");
    };
    let segments: Vec<&str> = module
        .split("::")
        .filter(|segment| !segment.is_empty() && *segment != "crate")
        .collect();
    if segments.is_empty() {
        format!("{stem}.rs")
    } else {
        format!("{}/{stem}.rs", segments.join("/"))
    }
}

#[cfg(test)]
mod tests {
    use quote::quote;

    use super::*;

    #[test]
    fn snake_case_handles_acronyms() {
        assert_eq!(to_snake_case("HttpRequest"), "http_request");
        assert_eq!(to_snake_case("XMLParser"), "xml_parser");
        assert_eq!(to_snake_case("Point"), "point");
    }

    #[test]
    fn spec_stem_strips_suffix_or_appends_impl() {
        assert_eq!(spec_file_stem("PersonOpticsSpec"), "person_optics");
        assert_eq!(spec_file_stem("PersonOptics"), "person_optics_impl");
        assert_eq!(spec_file_stem("Spec"), "spec_impl");
    }

    #[test]
    fn relative_path_maps_modules_to_directories() {
        assert_eq!(relative_path(None, "point_optics"), "point_optics.rs");
        assert_eq!(
            relative_path(Some("crate::geometry"), "point_optics"),
            "geometry/point_optics.rs"
        );
        assert_eq!(
            relative_path(Some("geometry::shapes"), "point_optics"),
            "geometry/shapes/point_optics.rs"
        );
    }

    #[test]
    fn duplicate_writes_are_rejected() {
        let mut filer = MemoryFiler::new();
        filer.write("a.rs", "first").unwrap();
        let error = filer.write("a.rs", "second").unwrap_err();
        assert!(matches!(error, FilerError::Duplicate(_)));
        assert_eq!(filer.file("a.rs"), Some("first"));
    }

    #[test]
    fn rendering_is_deterministic() {
        let build = || {
            let mut builder = FileBuilder::new("Optics for `Point`.");
            builder.import("::lambars::optics::Lens as _");
            builder.push(quote! { pub fn x() {} });
            builder.render()
        };
        assert_eq!(build(), build());
        assert!(build().starts_with(GENERATED_HEADER));
    }
}
