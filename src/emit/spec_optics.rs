//! Emitter for spec-trait analyses.
//!
//! One file per analysed spec: one fn per resolved optic intent, dispatched
//! to the matching strategy generator, then verbatim pass-through copies of
//! the spec's default methods. Optic kinds without synthesis support still
//! get a fn stub that unconditionally signals "not yet supported", so the
//! declared API surface is preserved rather than silently narrowed.
//!
//! Pass-through bodies are copied as written; they must reference sibling
//! generated modules (never `Self::`), since the copies are free functions
//! outside any trait.

use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::Path;

use super::{relative_path, spec_file_stem, EmittedFile, FileBuilder};
use crate::model::{path_key, Accessor, RawMethod};
use crate::spec::{OpticIntent, ResolvedStrategy, SpecAnalysis};
use crate::strategy::traversal::compose_with_lens;
use crate::strategy::{copy, prism, FieldEach, PrismPlan, TraversalPlan};

/// Emits optics files from spec analyses.
pub struct SpecOpticsEmitter {
    runtime: Path,
}

impl SpecOpticsEmitter {
    /// Creates an emitter generating against `runtime`.
    #[must_use]
    pub const fn new(runtime: Path) -> Self {
        Self { runtime }
    }

    /// Assembles the file for one spec analysis.
    #[must_use]
    pub fn emit(&self, analysis: &SpecAnalysis, target_module: Option<&str>) -> EmittedFile {
        let mut builder = FileBuilder::new(format!(
            "Optics generated from spec `{}` for `{}`.",
            analysis.name,
            path_key(&analysis.source),
        ));

        for intent in &analysis.intents {
            self.push_intent(&mut builder, analysis, intent);
        }
        for method in &analysis.passthrough {
            builder.push(Self::passthrough_fn(method));
        }

        let stem = spec_file_stem(&analysis.name.to_string());
        let module = target_module.or(analysis.module.as_deref());
        EmittedFile {
            relative_path: relative_path(module, &stem),
            contents: builder.render(),
        }
    }

    fn push_intent(&self, builder: &mut FileBuilder, analysis: &SpecAnalysis, intent: &OpticIntent) {
        let runtime = &self.runtime;
        let source = &analysis.source;
        let method = &intent.method;
        let focus = &intent.focus;
        let declared_return = &intent.declared_return;

        let body = match &intent.strategy {
            ResolvedStrategy::Lens(plan) => {
                copy::lens_for_plan(runtime, source, focus, method, plan)
            }
            ResolvedStrategy::Prism(PrismPlan::InstanceOf { variant, .. }) => {
                prism::instance_of_expr(runtime, source, variant, focus)
            }
            ResolvedStrategy::Prism(PrismPlan::MatchWhen { predicate, getter }) => {
                prism::match_when_expr(runtime, source, focus, predicate, getter)
            }
            ResolvedStrategy::Traversal(TraversalPlan::External(reference)) => {
                quote! { #reference }
            }
            ResolvedStrategy::Traversal(TraversalPlan::Field {
                field,
                accessor,
                each,
            }) => {
                let getter = copy::getter_fragment(source, field, accessor);
                let setter = match accessor {
                    Accessor::Field => copy::update_setter(source, focus, field),
                    // Encapsulated fields rebuild through the wither
                    // convention.
                    Accessor::Method(_) => {
                        let wither = format_ident!("with_{field}");
                        copy::wither_setter(source, focus, &wither)
                    }
                };
                let lens = copy::lens_expr(runtime, &getter, &setter);
                let each_expr = match each {
                    FieldEach::Standard(container) => {
                        crate::strategy::traversal::standard_each_expr(runtime, container.kind)
                    }
                    FieldEach::Explicit(expression) => quote! { #expression },
                };
                builder.import(format!(
                    "{}::LensComposeWithTraversal as _",
                    path_key(runtime)
                ));
                compose_with_lens(&lens, &each_expr)
            }
            ResolvedStrategy::Stub => {
                let message = format!(
                    "{} optics are not yet supported in spec traits",
                    intent.kind.label()
                );
                let doc = format!(
                    " Declared as a {} in `{}`; synthesis is not yet supported.",
                    intent.kind.label(),
                    analysis.name,
                );
                builder.push(quote! {
                    #[doc = #doc]
                    pub fn #method() -> #declared_return {
                        unimplemented!(#message)
                    }
                });
                return;
            }
        };

        let doc = format!(
            " Creates the `{method}` {kind} declared by `{spec}`.",
            kind = intent.kind.label().to_lowercase(),
            spec = analysis.name,
        );
        builder.push(quote! {
            #[doc = #doc]
            pub fn #method() -> #declared_return {
                #body
            }
        });
    }

    /// Copies a default method from the spec trait, unchanged.
    fn passthrough_fn(method: &RawMethod) -> TokenStream {
        let name = &method.name;
        let inputs = &method.inputs;
        let output = method
            .ret
            .as_ref()
            .map_or_else(TokenStream::new, |ty| quote! { -> #ty });
        let body = method
            .body
            .as_ref()
            .map_or_else(|| quote! { {} }, |block| quote! { #block });
        let doc = " Copied from the spec trait's default method.";

        quote! {
            #[doc = #doc]
            pub fn #name(#(#inputs),*) #output #body
        }
    }
}
