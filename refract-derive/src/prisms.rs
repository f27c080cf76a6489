//! Implementation of the `#[derive(Prisms)]` macro.
//!
//! The expansion reuses the engine's variant prism fragments, so the derive
//! output and the file emitters agree on every payload shape (unit, single,
//! multi-field tuple, struct variants).

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use refract::emit::to_snake_case;
use refract::model::{RawField, VariantDescriptor, VariantPayload};
use refract::strategy::prism;
use syn::{parse_macro_input, Data, DeriveInput, Fields, Generics, Ident, Variant};

/// Main implementation of the Prisms derive macro.
pub fn derive_prisms_impl(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    let name = &input.ident;
    let generics = &input.generics;

    let expanded = match &input.data {
        Data::Enum(data_enum) => {
            generate_enum_prisms(name, generics, &data_enum.variants.iter().collect::<Vec<_>>())
        }
        Data::Struct(_) => {
            syn::Error::new_spanned(
                &input.ident,
                "Prisms can only be derived for enums, not structs. Use #[derive(Lenses)] for structs.",
            )
            .to_compile_error()
        }
        Data::Union(_) => {
            syn::Error::new_spanned(&input.ident, "Prisms cannot be derived for unions.")
                .to_compile_error()
        }
    };

    TokenStream::from(expanded)
}

/// Generates prism methods for an enum's variants.
fn generate_enum_prisms(name: &Ident, generics: &Generics, variants: &[&Variant]) -> TokenStream2 {
    let prism_methods: Vec<TokenStream2> = variants
        .iter()
        .map(|variant| generate_variant_prism(variant))
        .collect();

    let (impl_generics, type_generics, where_clause) = generics.split_for_impl();

    quote! {
        impl #impl_generics #name #type_generics #where_clause {
            #(#prism_methods)*
        }
    }
}

/// Generates a prism method for a single enum variant.
fn generate_variant_prism(variant: &Variant) -> TokenStream2 {
    let method_name = format_ident!("{}_prism", to_snake_case(&variant.ident.to_string()));
    let descriptor = VariantDescriptor {
        name: variant.ident.clone(),
        payload: variant_payload(&variant.fields),
    };

    let runtime: syn::Path = syn::parse_quote!(::lambars::optics);
    let self_path: syn::Path = syn::parse_quote!(Self);
    let focus = prism::variant_focus_type(&descriptor.payload);
    let body = prism::variant_prism_expr(&runtime, &self_path, &descriptor);

    quote! {
        /// Returns a prism focusing on this variant.
        ///
        /// This prism provides preview/review access to the variant. For
        /// variants whose payload is not a single value, `preview` returns
        /// `None`; use `preview_owned` instead.
        #[inline]
        #[must_use]
        pub fn #method_name() -> impl ::lambars::optics::Prism<Self, #focus> + Clone {
            #body
        }
    }
}

/// Lowers a variant's fields into the engine's payload shape.
fn variant_payload(fields: &Fields) -> VariantPayload {
    match fields {
        Fields::Unit => VariantPayload::Unit,
        Fields::Unnamed(unnamed) => {
            let mut types: Vec<syn::Type> =
                unnamed.unnamed.iter().map(|field| field.ty.clone()).collect();
            match types.len() {
                0 => VariantPayload::Unit,
                1 => VariantPayload::Single(types.remove(0)),
                _ => VariantPayload::Tuple(types),
            }
        }
        Fields::Named(named) => VariantPayload::Record(
            named
                .named
                .iter()
                .filter_map(|field| {
                    field.ident.as_ref().map(|ident| RawField {
                        name: ident.clone(),
                        ty: field.ty.clone(),
                        public: true,
                    })
                })
                .collect(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn expansion_for(input: DeriveInput) -> String {
        let Data::Enum(data) = &input.data else {
            panic!("expected an enum");
        };
        generate_enum_prisms(
            &input.ident,
            &input.generics,
            &data.variants.iter().collect::<Vec<_>>(),
        )
        .to_string()
    }

    #[rstest]
    fn single_field_variants_preview_by_reference() {
        let expanded = expansion_for(syn::parse_quote! {
            enum Shape {
                Circle(f64),
                Point,
            }
        });
        assert!(expanded.contains("circle_prism"));
        assert!(expanded.contains("point_prism"));
        let normalised = expanded.replace(' ', "");
        assert!(normalised.contains("Self::Circle(value)=>Some(value)"));
    }

    #[rstest]
    fn struct_variants_extract_tuples() {
        let expanded = expansion_for(syn::parse_quote! {
            enum Event {
                Click { x: i32, y: i32 },
            }
        });
        let normalised = expanded.replace(' ', "");
        assert!(normalised.contains("click_prism"));
        assert!(normalised.contains("Option<&(i32,i32)>{None}"));
    }
}
