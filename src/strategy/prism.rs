//! Prism-strategy fragment generators.
//!
//! Prism construction follows the runtime's three-closure contract: a
//! borrowing preview, a review rebuilding the source, and an owned preview.
//! Variants whose payload is not a single value cannot borrow a focus that
//! does not exist in memory, so their borrowing preview is unconditionally
//! `None` and callers rely on the owned form, the same split the deriving
//! binding inherits.

use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::{Ident, Path, Type};

use crate::model::{VariantDescriptor, VariantPayload};

/// The focus type a variant's prism exposes: its single payload, a tuple of
/// its payloads in declaration order, or `()` for constants.
#[must_use]
pub fn variant_focus_type(payload: &VariantPayload) -> Type {
    match payload {
        VariantPayload::Unit => syn::parse_quote!(()),
        VariantPayload::Single(ty) => ty.clone(),
        VariantPayload::Tuple(types) => syn::parse_quote!((#(#types),*)),
        VariantPayload::Record(fields) => {
            let types: Vec<&Type> = fields.iter().map(|field| &field.ty).collect();
            syn::parse_quote!((#(#types),*))
        }
    }
}

/// A complete prism constructor expression for one variant of a sum or
/// enumeration.
#[must_use]
pub fn variant_prism_expr(
    runtime: &Path,
    source: &Path,
    variant: &VariantDescriptor,
) -> TokenStream {
    let name = &variant.name;
    match &variant.payload {
        VariantPayload::Unit => unit_prism(runtime, source, name),
        VariantPayload::Single(ty) => single_prism(runtime, source, name, ty),
        VariantPayload::Tuple(types) => tuple_prism(runtime, source, name, types),
        VariantPayload::Record(fields) => {
            let names: Vec<&Ident> = fields.iter().map(|field| &field.name).collect();
            let types: Vec<&Type> = fields.iter().map(|field| &field.ty).collect();
            record_prism(runtime, source, name, &names, &types)
        }
    }
}

/// The instance-of prism: narrow to the variant of the source sum carrying
/// the target payload, rebuild by constructing that variant.
#[must_use]
pub fn instance_of_expr(
    runtime: &Path,
    source: &Path,
    variant: &Ident,
    focus: &Type,
) -> TokenStream {
    quote! {
        #runtime::FunctionPrism::new(
            |source: &#source| match source {
                #source::#variant(value) => Some(value),
                #[allow(unreachable_patterns)]
                _ => None,
            },
            |value: #focus| #source::#variant(value),
            |source: #source| match source {
                #source::#variant(value) => Some(value),
                #[allow(unreachable_patterns)]
                _ => None,
            },
        )
    }
}

/// The match-when prism: a predicate-method call paired with an explicitly
/// named getter-method call; rebuild through the source's `From<focus>`
/// conversion.
#[must_use]
pub fn match_when_expr(
    runtime: &Path,
    source: &Path,
    focus: &Type,
    predicate: &Ident,
    getter: &Ident,
) -> TokenStream {
    quote! {
        #runtime::FunctionPrism::new(
            |source: &#source| if source.#predicate() { Some(source.#getter()) } else { None },
            |value: #focus| <#source>::from(value),
            |source: #source| {
                if source.#predicate() {
                    Some(source.#getter().clone())
                } else {
                    None
                }
            },
        )
    }
}

fn unit_prism(runtime: &Path, source: &Path, variant: &Ident) -> TokenStream {
    quote! {
        #runtime::FunctionPrism::new(
            |source: &#source| match source {
                #source::#variant => Some(&()),
                #[allow(unreachable_patterns)]
                _ => None,
            },
            |_: ()| #source::#variant,
            |source: #source| match source {
                #source::#variant => Some(()),
                #[allow(unreachable_patterns)]
                _ => None,
            },
        )
    }
}

fn single_prism(runtime: &Path, source: &Path, variant: &Ident, ty: &Type) -> TokenStream {
    quote! {
        #runtime::FunctionPrism::new(
            |source: &#source| match source {
                #source::#variant(value) => Some(value),
                #[allow(unreachable_patterns)]
                _ => None,
            },
            |value: #ty| #source::#variant(value),
            |source: #source| match source {
                #source::#variant(value) => Some(value),
                #[allow(unreachable_patterns)]
                _ => None,
            },
        )
    }
}

fn tuple_prism(runtime: &Path, source: &Path, variant: &Ident, types: &[Type]) -> TokenStream {
    let tuple_type = quote! { (#(#types),*) };
    let bindings: Vec<Ident> = (0..types.len())
        .map(|index| format_ident!("value{index}"))
        .collect();

    quote! {
        #runtime::FunctionPrism::new(
            // A borrowed tuple of the payloads does not exist in memory.
            |_source: &#source| -> Option<&#tuple_type> { None },
            |tuple: #tuple_type| {
                let (#(#bindings),*) = tuple;
                #source::#variant(#(#bindings),*)
            },
            |source: #source| match source {
                #source::#variant(#(#bindings),*) => Some((#(#bindings),*)),
                #[allow(unreachable_patterns)]
                _ => None,
            },
        )
    }
}

fn record_prism(
    runtime: &Path,
    source: &Path,
    variant: &Ident,
    names: &[&Ident],
    types: &[&Type],
) -> TokenStream {
    let tuple_type = quote! { (#(#types),*) };
    let bindings: Vec<Ident> = (0..types.len())
        .map(|index| format_ident!("value{index}"))
        .collect();

    quote! {
        #runtime::FunctionPrism::new(
            // A borrowed tuple of the payloads does not exist in memory.
            |_source: &#source| -> Option<&#tuple_type> { None },
            |tuple: #tuple_type| {
                let (#(#bindings),*) = tuple;
                #source::#variant { #(#names: #bindings),* }
            },
            |source: #source| match source {
                #source::#variant { #(#names),* } => Some((#(#names),*)),
                #[allow(unreachable_patterns)]
                _ => None,
            },
        )
    }
}
