//! Derive macros for refract-generated optics.
//!
//! This crate binds the refract synthesis engine to the compiler's derive
//! mechanism: the same classifier and fragment generators that back
//! refract's file emission expand here into inherent optics methods on the
//! deriving type.
//!
//! # Available Derive Macros
//!
//! - [`Lenses`]: Generates lens methods for struct fields
//! - [`Prisms`]: Generates prism methods for enum variants
//!
//! # Example: Lenses
//!
//! ```rust,ignore
//! use refract_derive::Lenses;
//! use lambars::optics::Lens;
//!
//! #[derive(Clone, Lenses)]
//! struct Point {
//!     x: i32,
//!     y: i32,
//! }
//!
//! // Generated methods:
//! // - Point::x_lens() -> impl Lens<Point, i32>
//! // - Point::y_lens() -> impl Lens<Point, i32>
//!
//! let point = Point { x: 10, y: 20 };
//! let x_lens = Point::x_lens();
//! assert_eq!(*x_lens.get(&point), 10);
//! ```
//!
//! # Example: Prisms
//!
//! ```rust,ignore
//! use refract_derive::Prisms;
//! use lambars::optics::Prism;
//!
//! #[derive(Clone, Prisms)]
//! enum Shape {
//!     Circle(f64),
//!     Rectangle(f64, f64),
//! }
//!
//! // Generated methods:
//! // - Shape::circle_prism() -> impl Prism<Shape, f64>
//! // - Shape::rectangle_prism() -> impl Prism<Shape, (f64, f64)>
//!
//! let circle = Shape::Circle(5.0);
//! let circle_prism = Shape::circle_prism();
//! assert_eq!(circle_prism.preview(&circle), Some(&5.0));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

mod lenses;
mod prisms;

use proc_macro::TokenStream;

/// Derive macro for generating Lens implementations for struct fields.
///
/// This macro generates a method for each field in the struct that returns
/// a lens focusing on that field. The method name follows the pattern
/// `{field_name}_lens()`.
///
/// # Requirements
///
/// - The struct must be a named struct (not a tuple struct)
/// - The struct should implement `Clone` for `modify` operations
///
/// # Generated Code
///
/// For each field `foo` of type `T`, generates:
///
/// ```rust,ignore
/// impl StructName {
///     pub fn foo_lens() -> impl Lens<StructName, T> + Clone { ... }
/// }
/// ```
#[proc_macro_derive(Lenses)]
pub fn derive_lenses(input: TokenStream) -> TokenStream {
    lenses::derive_lenses_impl(input)
}

/// Derive macro for generating Prism implementations for enum variants.
///
/// This macro generates a method for each variant in the enum that returns
/// a prism focusing on that variant. The method name follows the pattern
/// `{variant_name_snake_case}_prism()`.
///
/// # Variant Types
///
/// - **Unit variants** (e.g., `None`): Returns `impl Prism<Enum, ()>`
/// - **Single-field tuple variants** (e.g., `Some(T)`): Returns `impl Prism<Enum, T>`
/// - **Multi-field tuple variants**: Returns `impl Prism<Enum, (T1, T2, ...)>`
/// - **Struct variants**: Returns `impl Prism<Enum, (T1, T2, ...)>`
///
/// For multi-field and struct variants, `preview` always returns `None`
/// because Rust's enum layout does not store the fields as a tuple in
/// memory; use `preview_owned` and `review` instead.
#[proc_macro_derive(Prisms)]
pub fn derive_prisms(input: TokenStream) -> TokenStream {
    prisms::derive_prisms_impl(input)
}
