//! The structural data model the pipeline operates on.
//!
//! The model has two layers. The raw layer ([`RawTypeInfo`], [`RawMethod`],
//! [`RawField`], [`RawVariant`], [`RawSpecInfo`]) records pre-classification
//! facts about a type exactly as the host's introspection facility reported
//! them. The classified layer ([`TypeDescriptor`], [`FieldDescriptor`],
//! [`VariantDescriptor`], [`UpdaterPair`]) is produced by the
//! [classifier](crate::classify) once per type per round and is immutable
//! afterwards.
//!
//! Declarative [hints](hints::Hint) are carried alongside the raw facts,
//! never merged into them. Type references use `syn` types throughout, which
//! keeps the descriptors directly quotable by the fragment generators.

pub mod container;
pub mod hints;
pub mod structural;

use quote::ToTokens;
use syn::{Block, Ident, Path, Type};

use self::container::ContainerDescriptor;
use self::hints::Hint;

/// The classified shape of a source type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    /// A struct with named, all-public fields; rebuilt by construction.
    Product,
    /// An enum with at least one payload-carrying variant.
    Sum,
    /// An enum whose variants are all unit constants.
    Enumeration,
    /// A struct updated through `with_*` methods paired with accessors.
    MutableUpdate,
    /// A shape the pipeline cannot generate optics for.
    Unsupported,
}

/// The receiver shape of an inherent method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelfKind {
    /// No receiver: an associated function.
    None,
    /// `self`.
    Owned,
    /// `&self`.
    Ref,
    /// `&mut self`.
    RefMut,
}

/// A field of a struct as the host reported it.
#[derive(Debug, Clone)]
pub struct RawField {
    /// Field name.
    pub name: Ident,
    /// Declared type.
    pub ty: Type,
    /// Whether the field is `pub`.
    pub public: bool,
}

/// An enum variant's payload shape.
#[derive(Debug, Clone)]
pub enum VariantPayload {
    /// No payload.
    Unit,
    /// Exactly one unnamed payload type.
    Single(Type),
    /// Two or more unnamed payload types.
    Tuple(Vec<Type>),
    /// Named payload fields, in declaration order.
    Record(Vec<RawField>),
}

impl VariantPayload {
    /// Whether the variant carries any payload.
    #[must_use]
    pub const fn is_unit(&self) -> bool {
        matches!(self, Self::Unit)
    }
}

/// An enum variant as the host reported it.
#[derive(Debug, Clone)]
pub struct RawVariant {
    /// Variant name.
    pub name: Ident,
    /// Payload shape.
    pub payload: VariantPayload,
}

/// An inherent method as the host reported it.
#[derive(Debug, Clone)]
pub struct RawMethod {
    /// Method name.
    pub name: Ident,
    /// Receiver shape.
    pub receiver: SelfKind,
    /// Non-receiver parameter types, in order.
    pub params: Vec<Type>,
    /// The argument list as written, kept for pass-through copying.
    pub inputs: Vec<syn::FnArg>,
    /// Return type; `None` for unit.
    pub ret: Option<Type>,
    /// Whether the method is `pub` (trait methods are always public).
    pub public: bool,
    /// Whether the method declares its own generic parameters.
    pub generic: bool,
    /// The body, present for spec-trait default methods.
    pub body: Option<Block>,
    /// Hints attached to this method.
    pub hints: Vec<Hint>,
}

/// The structural shape of a raw type.
#[derive(Debug, Clone)]
pub enum RawShape {
    /// Struct with named fields.
    Struct {
        /// Fields in declaration order.
        fields: Vec<RawField>,
    },
    /// Tuple struct.
    TupleStruct {
        /// Field types in declaration order.
        types: Vec<Type>,
    },
    /// Unit struct.
    UnitStruct,
    /// Enum.
    Enum {
        /// Variants in declaration order.
        variants: Vec<RawVariant>,
    },
}

/// Everything the host knows about one type before classification.
#[derive(Debug, Clone)]
pub struct RawTypeInfo {
    /// The type's path as the host refers to it.
    pub path: Path,
    /// Structural shape.
    pub shape: RawShape,
    /// Inherent methods, merged across impl blocks in source order.
    pub methods: Vec<RawMethod>,
    /// Type-level hints (scope markers).
    pub hints: Vec<Hint>,
    /// The module the type was declared in, if known.
    pub module: Option<String>,
}

impl RawTypeInfo {
    /// The type's simple name: the final path segment.
    #[must_use]
    pub fn name(&self) -> Option<&Ident> {
        self.path.segments.last().map(|segment| &segment.ident)
    }
}

/// A declarative spec as the host reported it: a trait whose supertrait
/// list carries the `OpticsSpec<S>` marker.
#[derive(Debug, Clone)]
pub struct RawSpecInfo {
    /// The spec trait's name.
    pub name: Ident,
    /// Supertrait paths, with their type arguments.
    pub supertraits: Vec<Path>,
    /// All trait methods, in declaration order.
    pub methods: Vec<RawMethod>,
    /// Trait-level hints.
    pub hints: Vec<Hint>,
    /// The module the spec was declared in, if known.
    pub module: Option<String>,
}

/// How a field's value is read from the source type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Accessor {
    /// Direct field access (`source.name`).
    Field,
    /// An accessor method (`source.name()`), assumed borrow-returning.
    Method(Ident),
}

/// The copy strategy resolved for a field or lens intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyStrategy {
    /// Rebuild through the type's canonical construction.
    CanonicalConstructor,
    /// Rebuild through a `with_*` method.
    Wither,
    /// Rebuild through an explicit constructor call.
    ViaConstructor,
    /// Rebuild by copying and invoking a setter.
    ViaCopyAndSet,
    /// Rebuild through the builder convention.
    ViaBuilder,
}

/// The prism strategy resolved for a prism intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrismStrategy {
    /// Narrow to one case of the source sum.
    InstanceOf,
    /// Match through a predicate/getter method pair.
    MatchWhen,
}

/// The traversal strategy resolved for a traversal intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraversalStrategy {
    /// One of the standard container shapes.
    StandardContainer,
    /// An explicit external traversal reference.
    ExplicitReference,
    /// Through a named container field, possibly auto-detected.
    ThroughField,
}

/// A qualifying `with_<field>` updater paired with its accessor.
#[derive(Debug, Clone)]
pub struct UpdaterPair {
    /// The field name extracted from the updater's name.
    pub field: Ident,
    /// The updater method.
    pub wither: Ident,
    /// The paired accessor method.
    pub getter: Ident,
    /// The updater's parameter type (and the field's effective type).
    pub param_ty: Type,
}

/// A classified field, owned by exactly one [`TypeDescriptor`].
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    /// Field name.
    pub name: Ident,
    /// Declared type.
    pub ty: Type,
    /// How the field is read.
    pub accessor: Accessor,
    /// Resolved copy strategy.
    pub copy_strategy: CopyStrategy,
    /// Container classification, when the field has a recognised shape.
    pub container: Option<ContainerDescriptor>,
}

/// A classified variant of a sum or enumeration.
#[derive(Debug, Clone)]
pub struct VariantDescriptor {
    /// Variant name.
    pub name: Ident,
    /// Payload shape.
    pub payload: VariantPayload,
}

/// A classified type: the classifier's output, immutable afterwards.
#[derive(Debug, Clone)]
pub struct TypeDescriptor {
    /// The type's path.
    pub path: Path,
    /// Classified shape kind.
    pub kind: TypeKind,
    /// Fields in declaration order (products and mutable-update types).
    pub fields: Vec<FieldDescriptor>,
    /// Variants in declaration order (sums and enumerations).
    pub variants: Vec<VariantDescriptor>,
    /// Detected updater pairs (mutable-update types).
    pub updaters: Vec<UpdaterPair>,
    /// Whether any `set_*` mutator was detected.
    pub has_mutable_fields: bool,
    /// The module the type was declared in, if known.
    pub module: Option<String>,
}

impl TypeDescriptor {
    /// The type's simple name: the final path segment.
    #[must_use]
    pub fn name(&self) -> Option<&Ident> {
        self.path.segments.last().map(|segment| &segment.ident)
    }
}

/// Renders a path as a whitespace-free key for map lookups and diagnostics.
#[must_use]
pub fn path_key(path: &Path) -> String {
    path.to_token_stream().to_string().replace(' ', "")
}

/// Renders a type as a whitespace-free key.
#[must_use]
pub fn type_key(ty: &Type) -> String {
    ty.to_token_stream().to_string().replace(' ', "")
}

/// The final identifier of a path, when it has one.
#[must_use]
pub fn last_ident(path: &Path) -> Option<&Ident> {
    path.segments.last().map(|segment| &segment.ident)
}

#[cfg(test)]
mod tests {
    use syn::parse_quote;

    use super::*;

    #[test]
    fn path_key_ignores_token_spacing() {
        let path: Path = parse_quote!(crate::geometry::Point);
        assert_eq!(path_key(&path), "crate::geometry::Point");
    }

    #[test]
    fn type_key_normalises_generics() {
        let ty: Type = parse_quote!(HashMap<String, u32>);
        assert_eq!(type_key(&ty), "HashMap<String,u32>");
    }
}
