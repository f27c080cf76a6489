//! The declarative hint vocabulary.
//!
//! Hints are attached out-of-band to structural elements by the extraction
//! pass in [`crate::frontend::attrs`] and validated during strategy
//! resolution. They form one tagged union over the hint families: four copy
//! strategies, two prism hints, two traversal hints, and the scope markers.
//! The pipeline consumes hints; it never defines new ones.

use syn::{Expr, Ident, Path};

/// A parsed strategy hint or scope marker.
#[derive(Debug, Clone, PartialEq)]
pub enum Hint {
    /// Copy via the builder convention: `#[via_builder(...)]`.
    ViaBuilder(BuilderHint),
    /// Copy via an explicit wither method: `#[wither(...)]`.
    Wither(WitherHint),
    /// Copy via a constructor call: `#[via_constructor(...)]`.
    ViaConstructor(ConstructorHint),
    /// Copy via clone-then-setter: `#[via_copy_and_set(...)]`.
    ViaCopyAndSet(CopyAndSetHint),
    /// Prism over one case of the source sum: `#[instance_of(Type)]`.
    InstanceOf(InstanceOfHint),
    /// Prism via predicate and getter methods: `#[match_when(...)]`.
    MatchWhen(MatchWhenHint),
    /// Traversal via an external reference: `#[traverse_with("expr")]`.
    TraverseWith(TraverseWithHint),
    /// Traversal through a named container field: `#[through_field(...)]`.
    ThroughField(ThroughFieldHint),
    /// Scope marker importing optics over externally-named types:
    /// `#[import_optics(...)]`.
    ImportOptics(ImportOpticsHint),
}

impl Hint {
    /// Whether this hint selects a lens copy strategy.
    #[must_use]
    pub const fn is_copy_hint(&self) -> bool {
        matches!(
            self,
            Self::ViaBuilder(_) | Self::Wither(_) | Self::ViaConstructor(_) | Self::ViaCopyAndSet(_)
        )
    }

    /// Whether this hint selects a prism strategy.
    #[must_use]
    pub const fn is_prism_hint(&self) -> bool {
        matches!(self, Self::InstanceOf(_) | Self::MatchWhen(_))
    }

    /// Whether this hint selects a traversal strategy.
    #[must_use]
    pub const fn is_traversal_hint(&self) -> bool {
        matches!(self, Self::TraverseWith(_) | Self::ThroughField(_))
    }

    /// The attribute name this hint was parsed from.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::ViaBuilder(_) => "via_builder",
            Self::Wither(_) => "wither",
            Self::ViaConstructor(_) => "via_constructor",
            Self::ViaCopyAndSet(_) => "via_copy_and_set",
            Self::InstanceOf(_) => "instance_of",
            Self::MatchWhen(_) => "match_when",
            Self::TraverseWith(_) => "traverse_with",
            Self::ThroughField(_) => "through_field",
            Self::ImportOptics(_) => "import_optics",
        }
    }
}

/// Payload of `#[via_builder]`.
///
/// Every name is independently overridable; defaults are resolved during
/// strategy resolution (getter and setter default to the field name,
/// `to_builder` and `build` to those literal method names).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuilderHint {
    /// Accessor on the source type.
    pub getter: Option<Ident>,
    /// Method producing the builder.
    pub to_builder: Option<Ident>,
    /// Setter on the builder.
    pub setter: Option<Ident>,
    /// Method finishing the builder.
    pub build: Option<Ident>,
}

/// Payload of `#[wither]`. Both names are required; there are no defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WitherHint {
    /// The `with_*` style update method.
    pub method: Ident,
    /// The paired accessor.
    pub getter: Ident,
}

/// Payload of `#[via_constructor]`: the constructor's parameter names in
/// positional order. Empty when the author omitted the ordering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConstructorHint {
    /// Parameter names in the order the constructor takes them.
    pub parameter_order: Vec<Ident>,
}

/// Payload of `#[via_copy_and_set]`.
#[derive(Debug, Clone, PartialEq)]
pub struct CopyAndSetHint {
    /// The declared setter invoked on the copy.
    pub setter: Ident,
    /// Optional alternate copy-constructor type.
    pub copy_with: Option<Path>,
}

/// Payload of `#[instance_of]`: the case payload type the prism narrows to.
#[derive(Debug, Clone, PartialEq)]
pub struct InstanceOfHint {
    /// The prism's target type; must be a genuine case of the source sum.
    pub target: Path,
}

/// Payload of `#[match_when]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchWhenHint {
    /// Predicate method on the source type.
    pub predicate: Ident,
    /// Getter method extracting the focus.
    pub getter: Ident,
}

/// Payload of `#[traverse_with]`: a verbatim expression evaluating to the
/// external traversal.
#[derive(Debug, Clone, PartialEq)]
pub struct TraverseWithHint {
    /// The external traversal reference.
    pub reference: Expr,
}

/// Payload of `#[through_field]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ThroughFieldHint {
    /// The container field on the source type.
    pub field: Ident,
    /// Explicit traversal expression; auto-detected from the field's
    /// container shape when absent.
    pub traversal: Option<Expr>,
}

/// Payload of the `#[import_optics]` scope marker.
///
/// Carries the externally-named types to generate optics for, plus the
/// per-marker generation options.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportOpticsHint {
    /// Types to generate optics for.
    pub types: Vec<Path>,
    /// Explicit target module for the emitted files.
    pub target_module: Option<String>,
    /// Whether to generate navigator wrappers.
    pub navigators: bool,
    /// Maximum navigator chain depth (clamped to `[1, 10]` downstream).
    pub max_depth: usize,
    /// Fields navigation is restricted to; empty means all.
    pub include_fields: Vec<String>,
    /// Fields excluded from navigation when the include set is empty.
    pub exclude_fields: Vec<String>,
    /// Permits mutable-update generation despite detected `set_*` methods.
    pub allow_mutable: bool,
}

impl Default for ImportOpticsHint {
    fn default() -> Self {
        Self {
            types: Vec::new(),
            target_module: None,
            navigators: false,
            max_depth: 3,
            include_fields: Vec::new(),
            exclude_fields: Vec::new(),
            allow_mutable: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use syn::parse_quote;

    use super::*;

    #[test]
    fn hint_families_are_disjoint() {
        let wither = Hint::Wither(WitherHint {
            method: parse_quote!(with_year),
            getter: parse_quote!(year),
        });
        assert!(wither.is_copy_hint());
        assert!(!wither.is_prism_hint());
        assert!(!wither.is_traversal_hint());

        let instance_of = Hint::InstanceOf(InstanceOfHint {
            target: parse_quote!(Circle),
        });
        assert!(instance_of.is_prism_hint());
        assert!(!instance_of.is_copy_hint());
    }
}
