//! The structural model abstraction and its in-memory binding.
//!
//! The pipeline never talks to a parser or a compiler; it queries a
//! [`StructuralModel`] for raw type facts, registered container shape
//! aliases, and navigability. Two bindings exist: the
//! [`SourceModel`](crate::frontend::SourceModel) built from host-parsed
//! items, and [`MemoryModel`] here, which registers everything
//! programmatically and backs the pipeline's unit tests.

use std::collections::{BTreeMap, BTreeSet};

use syn::{Ident, Path, Type};

use super::container::ContainerKind;
use super::{path_key, Accessor, RawShape, RawSpecInfo, RawTypeInfo, SelfKind};

/// One unit of work the host asked a round to generate.
#[derive(Debug, Clone)]
pub enum GenerationTarget {
    /// Generate optics for a structurally-described type.
    Type(Path),
    /// Generate optics from a declarative spec trait.
    Spec(Ident),
}

/// A field resolved on a source type: its effective type and how to read it.
#[derive(Debug, Clone)]
pub struct ResolvedField {
    /// The field's effective type, with any accessor borrow stripped.
    pub ty: Type,
    /// How the field is read.
    pub accessor: Accessor,
}

/// The host-facing facts store the pipeline depends on.
pub trait StructuralModel {
    /// Looks up a type by path: exact match first, then by unique final
    /// segment.
    fn raw_type(&self, path: &Path) -> Option<&RawTypeInfo>;

    /// Looks up a spec trait by name.
    fn raw_spec(&self, name: &Ident) -> Option<&RawSpecInfo>;

    /// The registered abstract shape of a concrete container type, if any.
    fn shape_alias(&self, path: &Path) -> Option<ContainerKind>;

    /// Whether a type participates in navigator generation.
    fn is_navigable(&self, path: &Path) -> bool;

    /// Everything this round should generate, in registration order.
    fn targets(&self) -> Vec<GenerationTarget>;
}

/// Strips one layer of shared reference from a type.
#[must_use]
pub fn strip_reference(ty: &Type) -> &Type {
    match ty {
        Type::Reference(reference) if reference.mutability.is_none() => &reference.elem,
        _ => ty,
    }
}

/// Resolves a named field on a source type: named struct fields first,
/// then accessor methods (`field()`, `get_field()`, `is_field()`), then
/// nothing.
#[must_use]
pub fn resolve_field(info: &RawTypeInfo, field: &Ident) -> Option<ResolvedField> {
    if let RawShape::Struct { fields } = &info.shape {
        for raw in fields {
            if raw.name == *field && raw.public {
                return Some(ResolvedField {
                    ty: raw.ty.clone(),
                    accessor: Accessor::Field,
                });
            }
        }
    }

    let getter = format!("get_{field}");
    let is_getter = format!("is_{field}");
    for method in &info.methods {
        let name = method.name.to_string();
        if name != field.to_string() && name != getter && name != is_getter {
            continue;
        }
        if !method.public || !method.params.is_empty() || method.receiver != SelfKind::Ref {
            continue;
        }
        if let Some(ret) = &method.ret {
            return Some(ResolvedField {
                ty: strip_reference(ret).clone(),
                accessor: Accessor::Method(method.name.clone()),
            });
        }
    }

    None
}

/// In-memory structural model for tests and programmatic hosts.
///
/// Registration order is generation order. Types registered with
/// [`MemoryModel::add_type`] are both generation targets and navigable;
/// [`MemoryModel::add_support_type`] registers facts only.
#[derive(Debug, Default)]
pub struct MemoryModel {
    types: Vec<RawTypeInfo>,
    specs: Vec<RawSpecInfo>,
    aliases: BTreeMap<String, ContainerKind>,
    navigable: BTreeSet<String>,
    targets: Vec<GenerationTarget>,
}

impl MemoryModel {
    /// Creates an empty model.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a type as a generation target (and navigable).
    pub fn add_type(&mut self, info: RawTypeInfo) {
        self.navigable.insert(path_key(&info.path));
        self.targets.push(GenerationTarget::Type(info.path.clone()));
        self.types.push(info);
    }

    /// Registers type facts without targeting them for generation.
    pub fn add_support_type(&mut self, info: RawTypeInfo) {
        self.types.push(info);
    }

    /// Registers a spec trait as a generation target.
    pub fn add_spec(&mut self, info: RawSpecInfo) {
        self.targets.push(GenerationTarget::Spec(info.name.clone()));
        self.specs.push(info);
    }

    /// Registers a concrete container type as an abstract shape.
    pub fn register_shape_alias(&mut self, path: &Path, kind: ContainerKind) {
        self.aliases.insert(path_key(path), kind);
    }

    /// Marks a type navigable without targeting it.
    pub fn mark_navigable(&mut self, path: &Path) {
        self.navigable.insert(path_key(path));
    }

    fn lookup(&self, path: &Path) -> Option<&RawTypeInfo> {
        let key = path_key(path);
        if let Some(exact) = self.types.iter().find(|info| path_key(&info.path) == key) {
            return Some(exact);
        }

        // Unqualified references resolve by final segment when unambiguous.
        let name = path.segments.last()?.ident.to_string();
        let mut matches = self
            .types
            .iter()
            .filter(|info| info.name().is_some_and(|ident| *ident == name));
        let first = matches.next()?;
        if matches.next().is_some() {
            return None;
        }
        Some(first)
    }
}

impl StructuralModel for MemoryModel {
    fn raw_type(&self, path: &Path) -> Option<&RawTypeInfo> {
        self.lookup(path)
    }

    fn raw_spec(&self, name: &Ident) -> Option<&RawSpecInfo> {
        self.specs.iter().find(|spec| spec.name == *name)
    }

    fn shape_alias(&self, path: &Path) -> Option<ContainerKind> {
        if let Some(kind) = self.aliases.get(&path_key(path)) {
            return Some(*kind);
        }
        // An alias registered by simple name also matches qualified uses.
        let name = path.segments.last()?.ident.to_string();
        self.aliases.get(&name).copied()
    }

    fn is_navigable(&self, path: &Path) -> bool {
        if self.navigable.contains(&path_key(path)) {
            return true;
        }
        // Unqualified references match module-qualified registrations by
        // final segment.
        let Some(segment) = path.segments.last() else {
            return false;
        };
        let name = segment.ident.to_string();
        let suffix = format!("::{name}");
        self.navigable
            .iter()
            .any(|key| *key == name || key.ends_with(&suffix))
    }

    fn targets(&self) -> Vec<GenerationTarget> {
        self.targets.clone()
    }
}
