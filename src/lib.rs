//! # refract
//!
//! A source-code synthesis toolkit for optics: refract analyses structural
//! descriptions of Rust data types and generates source files implementing
//! composable get/set/modify accessors: lenses for always-present fields,
//! prisms for the cases of a closed variant set, traversals for
//! zero-or-more elements, and fluent navigator wrappers chaining these
//! across nested types.
//!
//! ## Pipeline
//!
//! - [`classify`]: shape classification (product / sum / enumeration /
//!   mutable-with-updaters / unsupported) and container detection
//! - [`spec`]: declarative spec-trait analysis and strategy resolution
//! - [`strategy`]: pure, strategy-specific fragment generators
//! - [`emit`]: file assembly, naming, and the `Filer` abstraction
//! - [`navigator`]: fluent navigator generation with path-kind widening
//! - [`pipeline`]: the per-round driver tying the stages together
//!
//! The pipeline consumes structural facts through the
//! [`StructuralModel`](model::structural::StructuralModel) abstraction: the
//! [`frontend`] binds it to host-parsed `syn` items, and
//! [`MemoryModel`](model::structural::MemoryModel) backs programmatic hosts
//! and tests. Generated code calls into an external optics runtime rooted at
//! a configurable path (default `::lambars::optics`); refract emits against
//! that contract and never redefines it.
//!
//! ## Example
//!
//! ```
//! use refract::diag::DiagnosticSink;
//! use refract::emit::MemoryFiler;
//! use refract::frontend::SourceModel;
//! use refract::pipeline::{GenerateConfig, Pipeline};
//!
//! let source: syn::File = syn::parse_quote! {
//!     #[import_optics]
//!     pub struct Point {
//!         pub x: i32,
//!         pub y: i32,
//!     }
//! };
//!
//! let mut sink = DiagnosticSink::new();
//! let model = SourceModel::from_files(&[source], &mut sink);
//! let pipeline = Pipeline::new(&model, GenerateConfig::default());
//!
//! let mut filer = MemoryFiler::new();
//! let outcome = pipeline.run_round(&mut filer, &mut sink);
//! assert_eq!(outcome.emitted, ["point_optics.rs"]);
//! assert!(!sink.has_errors());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

pub mod classify;
pub mod diag;
pub mod emit;
pub mod frontend;
pub mod model;
pub mod navigator;
pub mod pipeline;
pub mod spec;
pub mod strategy;

pub use diag::{Diagnostic, DiagnosticKind, DiagnosticSink, Severity};
pub use model::structural::{MemoryModel, StructuralModel};
pub use model::{TypeDescriptor, TypeKind};
pub use pipeline::{GenerateConfig, Pipeline, RoundOutcome};
