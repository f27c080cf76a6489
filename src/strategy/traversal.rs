//! Traversal-strategy fragment generators and the pluggable container
//! registry.
//!
//! Per-container code generation is an explicit, pipeline-local registry of
//! (shape-predicate, fragment-generator) pairs resolved by first match. The
//! registry is constructed once per pipeline run, never as global state,
//! with the five standard shapes pre-registered; hosts may append their own
//! entries for exotic containers.

use proc_macro2::TokenStream;
use quote::quote;
use syn::{Path, Type};

use crate::classify::type_arguments;
use crate::model::container::{ContainerDescriptor, ContainerKind};

/// Produces the runtime traversal expression for a matched container.
pub type EachExprFn = Box<dyn Fn(&Path, &ContainerDescriptor) -> TokenStream>;

/// Decides whether a generator handles a container shape.
pub type ShapePredicate = Box<dyn Fn(&ContainerDescriptor) -> bool>;

/// One pluggable per-container generator.
pub struct ContainerGenerator {
    /// Name used in logs and registry listings.
    pub name: &'static str,
    /// Shape predicate; first matching entry wins.
    pub matches: ShapePredicate,
    /// Traversal-expression producer.
    pub each_expr: EachExprFn,
    /// Which type argument of the container the traversal focuses on.
    pub focus_argument: usize,
}

/// The pipeline-local registry of container generators.
pub struct TraversalRegistry {
    entries: Vec<ContainerGenerator>,
}

impl TraversalRegistry {
    /// A registry with the five standard container shapes.
    #[must_use]
    pub fn standard() -> Self {
        let mut registry = Self {
            entries: Vec::new(),
        };
        for kind in ContainerKind::ALL {
            registry.register(ContainerGenerator {
                name: kind.label(),
                matches: Box::new(move |container| container.kind == kind),
                each_expr: Box::new(move |runtime, _| standard_each_expr(runtime, kind)),
                focus_argument: kind.focus_argument(),
            });
        }
        registry
    }

    /// An empty registry, for hosts that supply every generator themselves.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Appends a generator. Resolution is first-match, so earlier entries
    /// take precedence.
    pub fn register(&mut self, generator: ContainerGenerator) {
        self.entries.push(generator);
    }

    /// The first generator whose predicate accepts the container.
    #[must_use]
    pub fn resolve(&self, container: &ContainerDescriptor) -> Option<&ContainerGenerator> {
        self.entries
            .iter()
            .find(|generator| (generator.matches)(container))
    }
}

/// The standard traversal constructor for a container kind, under the
/// configured runtime path.
#[must_use]
pub fn standard_each_expr(runtime: &Path, kind: ContainerKind) -> TokenStream {
    match kind {
        ContainerKind::List => quote! { #runtime::VecEach::new() },
        ContainerKind::Set => quote! { #runtime::HashSetEach::new() },
        ContainerKind::Optional => quote! { #runtime::OptionEach::new() },
        ContainerKind::Map => quote! { #runtime::HashMapEach::new() },
        ContainerKind::Array => quote! { #runtime::ArrayEach::new() },
    }
}

/// Composes a field lens with a container traversal: the canonical
/// traverse-all/rebuild body.
#[must_use]
pub fn compose_with_lens(lens: &TokenStream, each: &TokenStream) -> TokenStream {
    quote! {
        #lens.compose_traversal(#each)
    }
}

/// The focus type a generator extracts from a declared container type, or
/// `None` when synthesis must fail: a raw container, or a declared
/// focus-argument index exceeding the type's actual arity.
#[must_use]
pub fn focus_type(declared: &Type, focus_argument: usize) -> Option<Type> {
    if let Type::Array(array) = declared {
        return (focus_argument == 0).then(|| (*array.elem).clone());
    }
    let arguments = type_arguments(declared);
    arguments.get(focus_argument).cloned()
}
