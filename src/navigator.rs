//! Fluent navigator generation with path-kind widening.
//!
//! For each field whose type is recognised as navigable, the generator
//! builds a wrapper struct over the runtime's path types and one navigation
//! method per field of the nested type, recursing to a configurable depth.
//! A chain's path kind is the join of every hop's contribution: optional
//! shapes contribute [`PathKind::Affine`], collection shapes (lists and
//! sets) contribute [`PathKind::Traversal`], everything else contributes
//! [`PathKind::Focus`]. Widening is monotonic: a chain that has become
//! affine or traversal never narrows back.
//!
//! Chain structs are named by their full field chain (`HomeAddressCity...`)
//! and emitted into the root type's own file, which keeps every chain's
//! widened kind local to one flat namespace.

use std::collections::BTreeSet;

use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::{Ident, Path, Type};

use crate::classify::TypeClassifier;
use crate::emit::optics_file_stem;
use crate::model::container::ContainerKind;
use crate::model::structural::StructuralModel;
use crate::model::{FieldDescriptor, TypeDescriptor, TypeKind};

/// Depth bounds for navigator chains.
const MIN_DEPTH: usize = 1;
const MAX_DEPTH: usize = 10;

/// The kind of path a navigation chain has widened to.
///
/// Kinds form a join-semilattice: `Focus` is the identity, `Affine` absorbs
/// `Focus`, and `Traversal` absorbs both.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathKind {
    /// Exactly one element, always present.
    Focus,
    /// Zero or one element.
    Affine,
    /// Zero or more elements.
    Traversal,
}

impl PathKind {
    /// The lattice join of two kinds.
    #[must_use]
    pub const fn widen(self, other: Self) -> Self {
        match (self, other) {
            (Self::Traversal, _) | (_, Self::Traversal) => Self::Traversal,
            (Self::Affine, _) | (_, Self::Affine) => Self::Affine,
            (Self::Focus, Self::Focus) => Self::Focus,
        }
    }

    /// The runtime path type this kind delegates to.
    #[must_use]
    pub fn path_type_ident(self) -> Ident {
        match self {
            Self::Focus => format_ident!("FocusPath"),
            Self::Affine => format_ident!("AffinePath"),
            Self::Traversal => format_ident!("TraversalPath"),
        }
    }
}

/// Navigator generation options: chain depth and field visibility.
#[derive(Debug, Clone)]
pub struct NavigatorOptions {
    max_depth: usize,
    include: BTreeSet<String>,
    exclude: BTreeSet<String>,
}

impl NavigatorOptions {
    /// Creates options with `max_depth` clamped to `[1, 10]`.
    #[must_use]
    pub fn new(max_depth: usize) -> Self {
        Self {
            max_depth: max_depth.clamp(MIN_DEPTH, MAX_DEPTH),
            include: BTreeSet::new(),
            exclude: BTreeSet::new(),
        }
    }

    /// Restricts navigation to exactly these field names.
    #[must_use]
    pub fn with_include(mut self, fields: impl IntoIterator<Item = String>) -> Self {
        self.include = fields.into_iter().collect();
        self
    }

    /// Excludes these field names; only consulted when the include set is
    /// empty.
    #[must_use]
    pub fn with_exclude(mut self, fields: impl IntoIterator<Item = String>) -> Self {
        self.exclude = fields.into_iter().collect();
        self
    }

    /// The clamped maximum chain depth.
    #[must_use]
    pub const fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Whether navigation may be generated for a field name. A non-empty
    /// include set restricts navigation to exactly those names; otherwise
    /// every name outside the exclude set is navigable.
    #[must_use]
    pub fn allows(&self, field: &str) -> bool {
        if self.include.is_empty() {
            !self.exclude.contains(field)
        } else {
            self.include.contains(field)
        }
    }
}

impl Default for NavigatorOptions {
    fn default() -> Self {
        Self::new(3)
    }
}

/// One hop of a navigation chain.
struct Hop {
    /// The path kind this hop contributes.
    contributed: PathKind,
    /// The navigable type the hop lands on.
    target: Path,
}

/// Generates navigator wrapper structs and root accessors.
pub struct NavigatorGenerator<'m> {
    model: &'m dyn StructuralModel,
    runtime: Path,
    options: NavigatorOptions,
}

impl<'m> NavigatorGenerator<'m> {
    /// Creates a generator emitting against `runtime`.
    #[must_use]
    pub const fn new(
        model: &'m dyn StructuralModel,
        runtime: Path,
        options: NavigatorOptions,
    ) -> Self {
        Self {
            model,
            runtime,
            options,
        }
    }

    /// The path kind a field type contributes to a chain.
    #[must_use]
    pub fn field_kind(&self, ty: &Type) -> PathKind {
        let classifier = TypeClassifier::new(self.model);
        match classifier.detect_container_with_model(ty).map(|c| c.kind) {
            Some(ContainerKind::Optional) => PathKind::Affine,
            Some(ContainerKind::List | ContainerKind::Set) => PathKind::Traversal,
            // Maps and arrays traverse but do not navigate.
            Some(ContainerKind::Map | ContainerKind::Array) | None => PathKind::Focus,
        }
    }

    /// All navigator structs for a root type, in chain discovery order.
    #[must_use]
    pub fn navigator_items(&self, root: &TypeDescriptor) -> Vec<TokenStream> {
        let mut items = Vec::new();
        self.collect(root, &[], PathKind::Focus, 1, &mut items);
        items
    }

    /// The root accessor fn for one navigable field, or `None` when the
    /// field is filtered out or its type is not navigable.
    #[must_use]
    pub fn root_accessor(
        &self,
        root: &TypeDescriptor,
        field: &FieldDescriptor,
        lens: &TokenStream,
    ) -> Option<TokenStream> {
        if !self.options.allows(&field.name.to_string()) {
            return None;
        }
        let hop = self.navigable_hop(&field.ty)?;
        let navigator = chain_struct_ident(&[field.name.clone()]);
        let root_path = &root.path;
        let runtime = &self.runtime;
        let method = format_ident!("{}_navigator", field.name);
        let suffix = hop_suffix(hop.contributed);
        let doc = format!(
            " Creates a navigator for the `{}` field, for fluent access into `{}`.",
            field.name,
            crate::model::path_key(&hop.target),
        );

        Some(quote! {
            #[doc = #doc]
            pub fn #method() -> #navigator<#root_path> {
                #navigator::new(#runtime::focus::FocusPath::of(#lens)#suffix)
            }
        })
    }

    fn collect(
        &self,
        current: &TypeDescriptor,
        chain: &[Ident],
        kind: PathKind,
        depth: usize,
        items: &mut Vec<TokenStream>,
    ) {
        if depth > self.options.max_depth {
            return;
        }

        for field in &current.fields {
            if !self.options.allows(&field.name.to_string()) {
                continue;
            }
            let Some(hop) = self.navigable_hop(&field.ty) else {
                continue;
            };
            let Some(target) = self.product_descriptor(&hop.target) else {
                continue;
            };

            let widened = kind.widen(hop.contributed);
            let mut next_chain = chain.to_vec();
            next_chain.push(field.name.clone());

            items.push(self.navigator_struct(&next_chain, widened, &target, depth));
            self.collect(&target, &next_chain, widened, depth + 1, items);
        }
    }

    /// Builds one navigator struct: the delegate field, the delegate
    /// operations appropriate to the widened kind, and one navigation
    /// method per field of the target type.
    fn navigator_struct(
        &self,
        chain: &[Ident],
        kind: PathKind,
        target: &TypeDescriptor,
        depth: usize,
    ) -> TokenStream {
        let runtime = &self.runtime;
        let name = chain_struct_ident(chain);
        let target_path = &target.path;
        let path_type = kind.path_type_ident();
        let delegate_type = quote! { #runtime::focus::#path_type<S, #target_path> };
        let delegate_ops = Self::delegate_ops(kind, target_path);
        let navigation = self.navigation_methods(chain, kind, target, depth);
        let doc = format!(
            " Navigator for the `{}` chain, delegating to a `{}`.",
            chain_label(chain),
            path_type,
        );

        quote! {
            #[doc = #doc]
            pub struct #name<S> {
                delegate: #delegate_type,
            }

            impl<S> #name<S> {
                #[doc = " Wraps the underlying path."]
                pub fn new(delegate: #delegate_type) -> Self {
                    Self { delegate }
                }

                #delegate_ops

                #(#navigation)*

                #[doc = " Returns the underlying path."]
                pub fn to_path(self) -> #delegate_type {
                    self.delegate
                }
            }
        }
    }

    fn delegate_ops(kind: PathKind, target: &Path) -> TokenStream {
        match kind {
            PathKind::Focus => quote! {
                #[doc = " Extracts the focused value from the source."]
                pub fn get(&self, source: &S) -> #target {
                    self.delegate.get(source)
                }

                #[doc = " Creates a new source with the focused value replaced."]
                pub fn set(&self, value: #target, source: &S) -> S {
                    self.delegate.set(value, source)
                }

                #[doc = " Creates a new source with the focused value transformed."]
                pub fn modify(&self, f: impl Fn(#target) -> #target, source: &S) -> S {
                    self.delegate.modify(f, source)
                }
            },
            PathKind::Affine => quote! {
                #[doc = " Extracts the focused value if present."]
                pub fn get_optional(&self, source: &S) -> Option<#target> {
                    self.delegate.get_optional(source)
                }

                #[doc = " Creates a new source with the focused value replaced, if focused."]
                pub fn set(&self, value: #target, source: &S) -> S {
                    self.delegate.set(value, source)
                }

                #[doc = " Creates a new source with the focused value transformed, if focused."]
                pub fn modify(&self, f: impl Fn(#target) -> #target, source: &S) -> S {
                    self.delegate.modify(f, source)
                }

                #[doc = " Whether this chain focuses a value in the given source."]
                pub fn matches(&self, source: &S) -> bool {
                    self.delegate.matches(source)
                }
            },
            PathKind::Traversal => quote! {
                #[doc = " Extracts all focused values from the source."]
                pub fn get_all(&self, source: &S) -> Vec<#target> {
                    self.delegate.get_all(source)
                }

                #[doc = " Creates a new source with every focused value replaced."]
                pub fn set_all(&self, value: #target, source: &S) -> S {
                    self.delegate.set_all(value, source)
                }

                #[doc = " Creates a new source with every focused value transformed."]
                pub fn modify_all(&self, f: impl Fn(#target) -> #target, source: &S) -> S {
                    self.delegate.modify_all(f, source)
                }

                #[doc = " The number of focused elements."]
                pub fn count(&self, source: &S) -> usize {
                    self.delegate.count(source)
                }

                #[doc = " Whether no element is focused."]
                pub fn is_empty(&self, source: &S) -> bool {
                    self.delegate.is_empty(source)
                }
            },
        }
    }

    fn navigation_methods(
        &self,
        chain: &[Ident],
        kind: PathKind,
        target: &TypeDescriptor,
        depth: usize,
    ) -> Vec<TokenStream> {
        let runtime = &self.runtime;
        let target_module = target
            .name()
            .map(|name| format_ident!("{}", optics_file_stem(&name.to_string())));
        let Some(target_module) = target_module else {
            return Vec::new();
        };

        target
            .fields
            .iter()
            .map(|field| {
                let field_name = &field.name;
                let contributed = self.field_kind(&field.ty);
                let widened = kind.widen(contributed);
                let suffix = hop_suffix(contributed);
                let via = quote! {
                    self.delegate.via(super::#target_module::#field_name())#suffix
                };

                let navigable = self
                    .navigable_hop(&field.ty)
                    .filter(|_| depth < self.options.max_depth)
                    .filter(|_| self.options.allows(&field_name.to_string()));

                if let Some(hop) = navigable {
                    let mut next_chain = chain.to_vec();
                    next_chain.push(field_name.clone());
                    let navigator = chain_struct_ident(&next_chain);
                    let doc = format!(
                        " Navigates into the `{field_name}` field of `{}`.",
                        crate::model::path_key(&hop.target),
                    );
                    quote! {
                        #[doc = #doc]
                        pub fn #field_name(&self) -> #navigator<S> {
                            #navigator::new(#via)
                        }
                    }
                } else {
                    let focus = self.hop_focus_type(field);
                    let path_type = widened.path_type_ident();
                    let doc = format!(" Navigates to the `{field_name}` field.");
                    quote! {
                        #[doc = #doc]
                        pub fn #field_name(&self) -> #runtime::focus::#path_type<S, #focus> {
                            #via
                        }
                    }
                }
            })
            .collect()
    }

    /// The focus type a navigation hop lands on: the container's focus for
    /// optional/collection shapes, the declared type otherwise.
    fn hop_focus_type(&self, field: &FieldDescriptor) -> Type {
        let classifier = TypeClassifier::new(self.model);
        match classifier.detect_container_with_model(&field.ty) {
            Some(container)
                if matches!(
                    container.kind,
                    ContainerKind::Optional | ContainerKind::List | ContainerKind::Set
                ) =>
            {
                container.focus
            }
            _ => field.ty.clone(),
        }
    }

    /// Recognises a navigable hop: a navigable product type directly, or an
    /// optional/collection shape whose focus is one.
    fn navigable_hop(&self, ty: &Type) -> Option<Hop> {
        let classifier = TypeClassifier::new(self.model);
        if let Some(container) = classifier.detect_container_with_model(ty) {
            let contributed = match container.kind {
                ContainerKind::Optional => PathKind::Affine,
                ContainerKind::List | ContainerKind::Set => PathKind::Traversal,
                ContainerKind::Map | ContainerKind::Array => return None,
            };
            let target = navigable_path(&container.focus)?;
            if !self.model.is_navigable(&target) {
                return None;
            }
            return Some(Hop {
                contributed,
                target,
            });
        }

        let target = navigable_path(ty)?;
        if !self.model.is_navigable(&target) {
            return None;
        }
        Some(Hop {
            contributed: PathKind::Focus,
            target,
        })
    }

    /// Classifies a navigable target; only products navigate.
    fn product_descriptor(&self, path: &Path) -> Option<TypeDescriptor> {
        let raw = self.model.raw_type(path)?;
        let classifier = TypeClassifier::new(self.model);
        let descriptor = classifier.classify(raw);
        (descriptor.kind == TypeKind::Product).then_some(descriptor)
    }
}

/// The `.some()` / `.each()` hop appended when a chain steps through a
/// container shape.
fn hop_suffix(contributed: PathKind) -> TokenStream {
    match contributed {
        PathKind::Focus => TokenStream::new(),
        PathKind::Affine => quote! { .some() },
        PathKind::Traversal => quote! { .each() },
    }
}

fn navigable_path(ty: &Type) -> Option<Path> {
    match ty {
        Type::Path(type_path) if type_path.qself.is_none() => Some(type_path.path.clone()),
        _ => None,
    }
}

fn chain_struct_ident(chain: &[Ident]) -> Ident {
    let joined: String = chain
        .iter()
        .map(|segment| snake_to_pascal(&segment.to_string()))
        .collect();
    format_ident!("{joined}Navigator")
}

fn chain_label(chain: &[Ident]) -> String {
    chain
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(".")
}

fn snake_to_pascal(input: &str) -> String {
    input
        .split('_')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().collect::<String>() + chars.as_str()
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use syn::parse_quote;

    use super::*;

    #[test]
    fn widen_is_a_join() {
        use PathKind::{Affine, Focus, Traversal};
        assert_eq!(Focus.widen(Focus), Focus);
        assert_eq!(Focus.widen(Affine), Affine);
        assert_eq!(Affine.widen(Traversal), Traversal);
        assert_eq!(Traversal.widen(Focus), Traversal);
        assert_eq!(Traversal.widen(Affine), Traversal);
    }

    #[test]
    fn depth_is_clamped() {
        assert_eq!(NavigatorOptions::new(0).max_depth(), 1);
        assert_eq!(NavigatorOptions::new(25).max_depth(), 10);
        assert_eq!(NavigatorOptions::new(4).max_depth(), 4);
    }

    #[test]
    fn include_set_wins_over_exclude_set() {
        let options = NavigatorOptions::new(3)
            .with_include(["name".to_string()])
            .with_exclude(["name".to_string()]);
        assert!(options.allows("name"));
        assert!(!options.allows("age"));

        let exclude_only = NavigatorOptions::new(3).with_exclude(["secret".to_string()]);
        assert!(exclude_only.allows("name"));
        assert!(!exclude_only.allows("secret"));
    }

    #[test]
    fn chain_names_concatenate_pascal_case() {
        let chain: Vec<Ident> = vec![parse_quote!(home_address), parse_quote!(city)];
        assert_eq!(chain_struct_ident(&chain).to_string(), "HomeAddressCityNavigator");
    }
}
