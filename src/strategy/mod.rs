//! Strategy resolution payloads and the strategy-specific code generators.
//!
//! A *plan* is a fully resolved strategy: every name filled in, every default
//! applied, validated upstream by the [spec analyser](crate::spec) or the
//! [classifier](crate::classify). The generator submodules are pure functions
//! from plans and descriptors to emittable fragments: they perform no
//! diagnostics and no I/O.

pub mod copy;
pub mod prism;
pub mod traversal;

use proc_macro2::Span;
use syn::{Expr, Ident, Path};

use crate::model::container::ContainerDescriptor;
use crate::model::hints::BuilderHint;
use crate::model::{Accessor, CopyStrategy, PrismStrategy, TraversalStrategy};

/// A resolved builder copy strategy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuilderPlan {
    /// Accessor on the source type.
    pub getter: Ident,
    /// Method producing the builder.
    pub to_builder: Ident,
    /// Setter on the builder.
    pub setter: Ident,
    /// Method finishing the builder.
    pub build: Ident,
}

impl BuilderPlan {
    /// Resolves a builder hint against its field name.
    ///
    /// Getter and setter default to the field name; `to_builder` and `build`
    /// default to those literal method names.
    #[must_use]
    pub fn resolve(hint: &BuilderHint, field: &Ident) -> Self {
        Self {
            getter: hint.getter.clone().unwrap_or_else(|| field.clone()),
            to_builder: hint
                .to_builder
                .clone()
                .unwrap_or_else(|| Ident::new("to_builder", Span::call_site())),
            setter: hint.setter.clone().unwrap_or_else(|| field.clone()),
            build: hint
                .build
                .clone()
                .unwrap_or_else(|| Ident::new("build", Span::call_site())),
        }
    }
}

/// A resolved wither copy strategy. Both names come from the hint verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WitherPlan {
    /// The update method.
    pub wither: Ident,
    /// The paired accessor.
    pub getter: Ident,
}

/// A resolved constructor copy strategy.
///
/// The parameter order is guaranteed non-empty: an omitted ordering is a
/// synthesis-time diagnostic, never a plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstructorPlan {
    /// Accessor for the lens get side.
    pub getter: Ident,
    /// Constructor parameter names in positional order.
    pub order: Vec<Ident>,
}

/// A resolved copy-and-set strategy.
#[derive(Debug, Clone, PartialEq)]
pub struct CopyAndSetPlan {
    /// Accessor for the lens get side.
    pub getter: Ident,
    /// The declared setter invoked on the copy.
    pub setter: Ident,
    /// Alternate copy-constructor type, when one was named.
    pub copy_with: Option<Path>,
}

/// A resolved lens copy strategy for a spec intent.
#[derive(Debug, Clone, PartialEq)]
pub enum CopyPlan {
    /// `#[via_builder]`.
    Builder(BuilderPlan),
    /// `#[wither]`.
    Wither(WitherPlan),
    /// `#[via_constructor]`.
    Constructor(ConstructorPlan),
    /// `#[via_copy_and_set]`.
    CopyAndSet(CopyAndSetPlan),
}

impl CopyPlan {
    /// The strategy tag this plan resolves.
    #[must_use]
    pub const fn strategy(&self) -> CopyStrategy {
        match self {
            Self::Builder(_) => CopyStrategy::ViaBuilder,
            Self::Wither(_) => CopyStrategy::Wither,
            Self::Constructor(_) => CopyStrategy::ViaConstructor,
            Self::CopyAndSet(_) => CopyStrategy::ViaCopyAndSet,
        }
    }

    /// The accessor the lens get side reads through.
    #[must_use]
    pub const fn getter(&self) -> &Ident {
        match self {
            Self::Builder(plan) => &plan.getter,
            Self::Wither(plan) => &plan.getter,
            Self::Constructor(plan) => &plan.getter,
            Self::CopyAndSet(plan) => &plan.getter,
        }
    }
}

/// A resolved prism strategy for a spec intent.
#[derive(Debug, Clone, PartialEq)]
pub enum PrismPlan {
    /// Narrow to the variant of the source sum carrying `target`.
    InstanceOf {
        /// The validated target type.
        target: Path,
        /// The variant of the source sum that carries it.
        variant: Ident,
    },
    /// Match through a predicate/getter pair.
    MatchWhen {
        /// Predicate method on the source.
        predicate: Ident,
        /// Getter method extracting the focus.
        getter: Ident,
    },
}

impl PrismPlan {
    /// The strategy tag this plan resolves.
    #[must_use]
    pub const fn strategy(&self) -> PrismStrategy {
        match self {
            Self::InstanceOf { .. } => PrismStrategy::InstanceOf,
            Self::MatchWhen { .. } => PrismStrategy::MatchWhen,
        }
    }
}

/// What a through-field traversal composes the field lens with.
#[derive(Debug, Clone)]
pub enum FieldEach {
    /// The standard traversal for an auto-detected container shape.
    Standard(ContainerDescriptor),
    /// A traversal expression the hint declared explicitly.
    Explicit(Expr),
}

/// A resolved traversal strategy for a spec intent.
#[derive(Debug, Clone)]
pub enum TraversalPlan {
    /// A verbatim external traversal reference, used as-is.
    External(Expr),
    /// The named field's lens composed with a container traversal.
    Field {
        /// The container field on the source type.
        field: Ident,
        /// How the field is read.
        accessor: Accessor,
        /// The traversal composed behind the field lens.
        each: FieldEach,
    },
}

impl TraversalPlan {
    /// The strategy tag this plan resolves.
    #[must_use]
    pub const fn strategy(&self) -> TraversalStrategy {
        match self {
            Self::External(_) => TraversalStrategy::ExplicitReference,
            Self::Field { .. } => TraversalStrategy::ThroughField,
        }
    }
}
