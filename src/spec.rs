//! Declarative spec analysis.
//!
//! A spec is a trait whose supertrait list carries exactly one instantiation
//! of the `OpticsSpec<S>` marker. Each abstract method declares one optic
//! over `S`: the optic kind comes from the return type's final path segment,
//! the focus type from its second type argument, and the synthesis strategy
//! from the method's hints. Default methods (those with bodies) pass through
//! to the generated file unchanged.
//!
//! Hint requirements are hard diagnostics with no silent defaults: a lens
//! needs exactly one copy-strategy hint, a prism exactly one prism hint, a
//! traversal exactly one traversal hint (whose container shape may be
//! auto-detected). The analyser preserves declaration order throughout.

use syn::{Ident, Path, Type, TypeParamBound};

use crate::classify::TypeClassifier;
use crate::diag::{DiagnosticKind, DiagnosticSink};
use crate::model::container::supported_shapes;
use crate::model::hints::Hint;
use crate::model::structural::{resolve_field, StructuralModel};
use crate::model::{path_key, RawMethod, RawShape, RawSpecInfo, SelfKind, VariantPayload};
use crate::strategy::{
    BuilderPlan, ConstructorPlan, CopyAndSetPlan, CopyPlan, FieldEach, PrismPlan, TraversalPlan,
    WitherPlan,
};

/// The default marker trait a spec's supertrait list must instantiate.
pub const SPEC_MARKER: &str = "OpticsSpec";

/// The seven optic kinds a spec method may declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpticKind {
    /// Always-present focus.
    Lens,
    /// One case of a closed variant set.
    Prism,
    /// Zero or more foci.
    Traversal,
    /// Zero-or-one focus.
    Affine,
    /// Bidirectional conversion.
    Iso,
    /// Read-only focus.
    Getter,
    /// Read-only multi-focus.
    Fold,
}

impl OpticKind {
    /// Maps a return type's final segment to an optic kind.
    #[must_use]
    pub fn from_ident(ident: &str) -> Option<Self> {
        match ident {
            "Lens" => Some(Self::Lens),
            "Prism" => Some(Self::Prism),
            "Traversal" => Some(Self::Traversal),
            "Affine" => Some(Self::Affine),
            "Iso" => Some(Self::Iso),
            "Getter" => Some(Self::Getter),
            "Fold" => Some(Self::Fold),
            _ => None,
        }
    }

    /// The kind's display name.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Lens => "Lens",
            Self::Prism => "Prism",
            Self::Traversal => "Traversal",
            Self::Affine => "Affine",
            Self::Iso => "Iso",
            Self::Getter => "Getter",
            Self::Fold => "Fold",
        }
    }

    /// Whether full synthesis exists for this kind. The remaining kinds get
    /// API-preserving stubs.
    #[must_use]
    pub const fn is_synthesized(self) -> bool {
        matches!(self, Self::Lens | Self::Prism | Self::Traversal)
    }
}

/// The resolved synthesis strategy of one spec method.
#[derive(Debug, Clone)]
pub enum ResolvedStrategy {
    /// A lens with a resolved copy plan.
    Lens(CopyPlan),
    /// A prism with a resolved prism plan.
    Prism(PrismPlan),
    /// A traversal with a resolved traversal plan.
    Traversal(TraversalPlan),
    /// A kind without synthesis support; emitted as a stub.
    Stub,
}

/// One analysed optic declaration, in declaration order.
#[derive(Debug, Clone)]
pub struct OpticIntent {
    /// The declaring method's name.
    pub method: Ident,
    /// The declared optic kind.
    pub kind: OpticKind,
    /// The focus type `A` of `Optic<S, A>`.
    pub focus: Type,
    /// The declared return type, reused verbatim on the emitted fn.
    pub declared_return: Type,
    /// The resolved strategy.
    pub strategy: ResolvedStrategy,
}

/// The analyser's output for one spec trait.
#[derive(Debug, Clone)]
pub struct SpecAnalysis {
    /// The spec trait's name.
    pub name: Ident,
    /// The source type `S`.
    pub source: Path,
    /// Optic intents, in declaration order.
    pub intents: Vec<OpticIntent>,
    /// Default methods passed through unchanged, in declaration order.
    pub passthrough: Vec<RawMethod>,
    /// The module the spec was declared in, if known.
    pub module: Option<String>,
}

/// Analyses spec traits against a structural model.
pub struct SpecAnalyser<'m> {
    model: &'m dyn StructuralModel,
    marker: String,
}

impl<'m> SpecAnalyser<'m> {
    /// Creates an analyser using the default `OpticsSpec` marker.
    #[must_use]
    pub fn new(model: &'m dyn StructuralModel) -> Self {
        Self {
            model,
            marker: SPEC_MARKER.to_string(),
        }
    }

    /// Creates an analyser recognising a custom marker trait name.
    #[must_use]
    pub fn with_marker(model: &'m dyn StructuralModel, marker: impl Into<String>) -> Self {
        Self {
            model,
            marker: marker.into(),
        }
    }

    /// Analyses a spec trait. Returns `None` after attaching a diagnostic
    /// for the first declaration that fails to resolve; a spec with any
    /// invalid declaration emits nothing.
    #[must_use]
    pub fn analyse(&self, spec: &RawSpecInfo, sink: &mut DiagnosticSink) -> Option<SpecAnalysis> {
        let element = spec.name.to_string();
        let source = self.extract_source(spec, sink, &element)?;

        let mut intents = Vec::new();
        let mut passthrough = Vec::new();

        for method in &spec.methods {
            if method.body.is_some() {
                passthrough.push(method.clone());
                continue;
            }
            let intent = self.analyse_optic_method(spec, &source, method, sink)?;
            intents.push(intent);
        }

        Some(SpecAnalysis {
            name: spec.name.clone(),
            source,
            intents,
            passthrough,
            module: spec.module.clone(),
        })
    }

    fn extract_source(
        &self,
        spec: &RawSpecInfo,
        sink: &mut DiagnosticSink,
        element: &str,
    ) -> Option<Path> {
        let mut sources = Vec::new();
        for supertrait in &spec.supertraits {
            let Some(segment) = supertrait.segments.last() else {
                continue;
            };
            if segment.ident != self.marker {
                continue;
            }
            let arguments = marker_arguments(segment);
            match arguments.first() {
                Some(Type::Path(type_path)) if type_path.qself.is_none() => {
                    sources.push(type_path.path.clone());
                }
                _ => {
                    sink.error(
                        DiagnosticKind::ClassificationFailure,
                        element,
                        format!(
                            "cannot determine source type: the spec must extend \
                             {marker}<S> with a concrete type argument",
                            marker = self.marker
                        ),
                    );
                    return None;
                }
            }
        }

        match sources.len() {
            1 => sources.into_iter().next(),
            0 => {
                sink.error(
                    DiagnosticKind::ClassificationFailure,
                    element,
                    format!(
                        "cannot determine source type: the spec must extend exactly one \
                         {marker}<S> supertrait",
                        marker = self.marker
                    ),
                );
                None
            }
            _ => {
                sink.error(
                    DiagnosticKind::ClassificationFailure,
                    element,
                    format!(
                        "ambiguous source type: the spec extends {count} {marker}<S> \
                         supertraits, expected exactly one",
                        count = sources.len(),
                        marker = self.marker
                    ),
                );
                None
            }
        }
    }

    fn analyse_optic_method(
        &self,
        spec: &RawSpecInfo,
        source: &Path,
        method: &RawMethod,
        sink: &mut DiagnosticSink,
    ) -> Option<OpticIntent> {
        let element = format!("{}::{}", spec.name, method.name);

        if method.generic {
            sink.error(
                DiagnosticKind::ClassificationFailure,
                &element,
                "optic methods must not declare their own generic parameters",
            );
            return None;
        }
        if method.receiver != SelfKind::None || !method.params.is_empty() {
            sink.error(
                DiagnosticKind::ClassificationFailure,
                &element,
                "optic methods must be associated functions with no parameters",
            );
            return None;
        }

        let Some(declared_return) = &method.ret else {
            sink.error(
                DiagnosticKind::ClassificationFailure,
                &element,
                "optic methods must return an optic type \
                 (Lens, Prism, Traversal, Affine, Iso, Getter, or Fold)",
            );
            return None;
        };

        let Some(optic_path) = optic_return_path(declared_return) else {
            sink.error(
                DiagnosticKind::ClassificationFailure,
                &element,
                "optic methods must return an optic type \
                 (Lens, Prism, Traversal, Affine, Iso, Getter, or Fold)",
            );
            return None;
        };

        let segment = optic_path.segments.last()?;
        let Some(kind) = OpticKind::from_ident(&segment.ident.to_string()) else {
            sink.error(
                DiagnosticKind::ClassificationFailure,
                &element,
                format!(
                    "return type `{}` is not an optic: expected Lens, Prism, Traversal, \
                     Affine, Iso, Getter, or Fold",
                    segment.ident
                ),
            );
            return None;
        };

        let arguments = marker_arguments(segment);
        let Some(focus) = arguments.get(1).cloned() else {
            sink.error(
                DiagnosticKind::ClassificationFailure,
                &element,
                format!(
                    "cannot determine focus type: expected {}<S, A> with two type arguments",
                    kind.label()
                ),
            );
            return None;
        };

        let strategy = match kind {
            OpticKind::Lens => ResolvedStrategy::Lens(self.resolve_copy_plan(
                method, sink, &element,
            )?),
            OpticKind::Prism => ResolvedStrategy::Prism(self.resolve_prism_plan(
                source, method, sink, &element,
            )?),
            OpticKind::Traversal => ResolvedStrategy::Traversal(self.resolve_traversal_plan(
                source, method, sink, &element,
            )?),
            OpticKind::Affine | OpticKind::Iso | OpticKind::Getter | OpticKind::Fold => {
                ResolvedStrategy::Stub
            }
        };

        Some(OpticIntent {
            method: method.name.clone(),
            kind,
            focus,
            declared_return: declared_return.clone(),
            strategy,
        })
    }

    fn resolve_copy_plan(
        &self,
        method: &RawMethod,
        sink: &mut DiagnosticSink,
        element: &str,
    ) -> Option<CopyPlan> {
        let hints: Vec<&Hint> = method.hints.iter().filter(|hint| hint.is_copy_hint()).collect();
        match hints.as_slice() {
            [] => {
                sink.error(
                    DiagnosticKind::HintMissing,
                    element,
                    "lens methods require a copy strategy hint: \
                     #[via_builder], #[wither], #[via_constructor], or #[via_copy_and_set]",
                );
                None
            }
            [hint] => self.copy_plan_for(hint, method, sink, element),
            _ => {
                sink.error(
                    DiagnosticKind::HintInvalid,
                    element,
                    format!(
                        "conflicting copy strategy hints ({}): exactly one must be attached",
                        hints.iter().map(|hint| hint.name()).collect::<Vec<_>>().join(", ")
                    ),
                );
                None
            }
        }
    }

    #[allow(clippy::unused_self)]
    fn copy_plan_for(
        &self,
        hint: &Hint,
        method: &RawMethod,
        sink: &mut DiagnosticSink,
        element: &str,
    ) -> Option<CopyPlan> {
        match hint {
            Hint::ViaBuilder(builder) => {
                Some(CopyPlan::Builder(BuilderPlan::resolve(builder, &method.name)))
            }
            Hint::Wither(wither) => Some(CopyPlan::Wither(WitherPlan {
                wither: wither.method.clone(),
                getter: wither.getter.clone(),
            })),
            Hint::ViaConstructor(constructor) => {
                if constructor.parameter_order.is_empty() {
                    // A setter that cannot be ordered cannot be synthesized;
                    // failing here beats failing when the generated code runs.
                    sink.error(
                        DiagnosticKind::HintInvalid,
                        element,
                        "#[via_constructor] requires an explicit parameter order, \
                         e.g. #[via_constructor(args(x, y))]",
                    );
                    return None;
                }
                Some(CopyPlan::Constructor(ConstructorPlan {
                    getter: method.name.clone(),
                    order: constructor.parameter_order.clone(),
                }))
            }
            Hint::ViaCopyAndSet(copy_and_set) => Some(CopyPlan::CopyAndSet(CopyAndSetPlan {
                getter: method.name.clone(),
                setter: copy_and_set.setter.clone(),
                copy_with: copy_and_set.copy_with.clone(),
            })),
            _ => None,
        }
    }

    fn resolve_prism_plan(
        &self,
        source: &Path,
        method: &RawMethod,
        sink: &mut DiagnosticSink,
        element: &str,
    ) -> Option<PrismPlan> {
        let hints: Vec<&Hint> = method.hints.iter().filter(|hint| hint.is_prism_hint()).collect();
        match hints.as_slice() {
            [] => {
                sink.error(
                    DiagnosticKind::HintMissing,
                    element,
                    "prism methods require a prism hint: #[instance_of] or #[match_when]",
                );
                None
            }
            [Hint::InstanceOf(instance_of)] => {
                let variant =
                    self.validate_case_of(source, &instance_of.target, sink, element)?;
                Some(PrismPlan::InstanceOf {
                    target: instance_of.target.clone(),
                    variant,
                })
            }
            [Hint::MatchWhen(match_when)] => Some(PrismPlan::MatchWhen {
                predicate: match_when.predicate.clone(),
                getter: match_when.getter.clone(),
            }),
            [_] => None,
            _ => {
                sink.error(
                    DiagnosticKind::HintInvalid,
                    element,
                    "conflicting prism hints: exactly one of #[instance_of] or \
                     #[match_when] must be attached",
                );
                None
            }
        }
    }

    /// Validates that `target` is a genuine case of the source sum: the
    /// payload of exactly one single-payload variant.
    fn validate_case_of(
        &self,
        source: &Path,
        target: &Path,
        sink: &mut DiagnosticSink,
        element: &str,
    ) -> Option<Ident> {
        let source_name = path_key(source);
        let target_name = path_key(target);

        let Some(info) = self.model.raw_type(source) else {
            sink.error(
                DiagnosticKind::HintInvalid,
                element,
                format!("source type `{source_name}` is not known to the structural model"),
            );
            return None;
        };

        let RawShape::Enum { variants } = &info.shape else {
            sink.error(
                DiagnosticKind::HintInvalid,
                element,
                format!(
                    "#[instance_of({target_name})] requires the source type \
                     `{source_name}` to be a closed sum"
                ),
            );
            return None;
        };

        let target_ident = target.segments.last().map(|segment| segment.ident.to_string())?;
        let mut carriers = variants.iter().filter(|variant| {
            matches!(
                &variant.payload,
                VariantPayload::Single(Type::Path(type_path))
                    if type_path.path.segments.last()
                        .is_some_and(|segment| segment.ident == target_ident)
            )
        });

        let first = carriers.next();
        let second = carriers.next();
        match (first, second) {
            (Some(variant), None) => Some(variant.name.clone()),
            (Some(_), Some(_)) => {
                sink.error(
                    DiagnosticKind::HintInvalid,
                    element,
                    format!(
                        "#[instance_of({target_name})] is ambiguous: more than one case of \
                         `{source_name}` carries `{target_name}`"
                    ),
                );
                None
            }
            _ => {
                sink.error(
                    DiagnosticKind::HintInvalid,
                    element,
                    format!(
                        "`{target_name}` is not a case of source type `{source_name}`: \
                         only payload types of `{source_name}`'s variants can be used \
                         with #[instance_of]"
                    ),
                );
                None
            }
        }
    }

    fn resolve_traversal_plan(
        &self,
        source: &Path,
        method: &RawMethod,
        sink: &mut DiagnosticSink,
        element: &str,
    ) -> Option<TraversalPlan> {
        let hints: Vec<&Hint> =
            method.hints.iter().filter(|hint| hint.is_traversal_hint()).collect();
        match hints.as_slice() {
            [] => {
                sink.error(
                    DiagnosticKind::HintMissing,
                    element,
                    "traversal methods require a traversal hint: \
                     #[traverse_with] or #[through_field]",
                );
                None
            }
            [Hint::TraverseWith(traverse_with)] => {
                Some(TraversalPlan::External(traverse_with.reference.clone()))
            }
            [Hint::ThroughField(through_field)] => {
                self.resolve_through_field(source, through_field, sink, element)
            }
            [_] => None,
            _ => {
                sink.error(
                    DiagnosticKind::HintInvalid,
                    element,
                    "conflicting traversal hints: exactly one of #[traverse_with] or \
                     #[through_field] must be attached",
                );
                None
            }
        }
    }

    fn resolve_through_field(
        &self,
        source: &Path,
        hint: &crate::model::hints::ThroughFieldHint,
        sink: &mut DiagnosticSink,
        element: &str,
    ) -> Option<TraversalPlan> {
        let Some(info) = self.model.raw_type(source) else {
            sink.error(
                DiagnosticKind::HintInvalid,
                element,
                format!(
                    "source type `{}` is not known to the structural model",
                    path_key(source)
                ),
            );
            return None;
        };

        let Some(resolved) = resolve_field(info, &hint.field) else {
            sink.error(
                DiagnosticKind::FieldNotFound,
                element,
                format!(
                    "field `{field}` not found on type `{source}`: check that the name \
                     matches a public field or accessor method",
                    field = hint.field,
                    source = path_key(source),
                ),
            );
            return None;
        };

        if let Some(explicit) = &hint.traversal {
            return Some(TraversalPlan::Field {
                field: hint.field.clone(),
                accessor: resolved.accessor,
                each: FieldEach::Explicit(explicit.clone()),
            });
        }

        let classifier = TypeClassifier::new(self.model);
        let Some(container) = classifier.detect_container_with_model(&resolved.ty) else {
            sink.error(
                DiagnosticKind::ContainerUndetectable,
                element,
                format!(
                    "cannot auto-detect a traversal for field `{field}` of type \
                     `{ty}`; supported container shapes: {shapes}. Declare the \
                     traversal explicitly, e.g. \
                     #[through_field(field = \"{field}\", traversal = \"...\")]",
                    field = hint.field,
                    ty = crate::model::type_key(&resolved.ty),
                    shapes = supported_shapes(),
                ),
            );
            return None;
        };

        Some(TraversalPlan::Field {
            field: hint.field.clone(),
            accessor: resolved.accessor,
            each: FieldEach::Standard(container),
        })
    }
}

fn optic_return_path(ty: &Type) -> Option<&Path> {
    match ty {
        Type::Path(type_path) if type_path.qself.is_none() => Some(&type_path.path),
        Type::ImplTrait(impl_trait) => impl_trait.bounds.iter().find_map(|bound| match bound {
            TypeParamBound::Trait(trait_bound) => Some(&trait_bound.path),
            _ => None,
        }),
        _ => None,
    }
}

fn marker_arguments(segment: &syn::PathSegment) -> Vec<Type> {
    let syn::PathArguments::AngleBracketed(arguments) = &segment.arguments else {
        return Vec::new();
    };
    arguments
        .args
        .iter()
        .filter_map(|argument| match argument {
            syn::GenericArgument::Type(ty) => Some(ty.clone()),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use syn::parse_quote;

    use super::*;

    #[test]
    fn optic_kinds_cover_the_seven_return_types() {
        for (name, expected) in [
            ("Lens", OpticKind::Lens),
            ("Prism", OpticKind::Prism),
            ("Traversal", OpticKind::Traversal),
            ("Affine", OpticKind::Affine),
            ("Iso", OpticKind::Iso),
            ("Getter", OpticKind::Getter),
            ("Fold", OpticKind::Fold),
        ] {
            assert_eq!(OpticKind::from_ident(name), Some(expected));
        }
        assert_eq!(OpticKind::from_ident("Optional"), None);
    }

    #[test]
    fn return_path_reads_through_impl_trait() {
        let ty: Type = parse_quote!(impl ::lambars::optics::Lens<Person, String> + Clone);
        let path = optic_return_path(&ty).unwrap();
        assert_eq!(path.segments.last().unwrap().ident, "Lens");
    }
}
