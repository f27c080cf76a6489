//! Implementation of the `#[derive(Lenses)]` macro.
//!
//! The expansion reuses the engine's copy-strategy fragments: each field's
//! lens is the canonical-constructor rebuild the file emitters generate,
//! expressed against `Self`.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use refract::model::Accessor;
use refract::strategy::copy;
use syn::{parse_macro_input, Data, DeriveInput, Fields, Generics, Ident};

/// Main implementation of the Lenses derive macro.
pub fn derive_lenses_impl(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    let name = &input.ident;
    let generics = &input.generics;

    let expanded = match &input.data {
        Data::Struct(data_struct) => generate_struct_lenses(name, generics, &data_struct.fields),
        Data::Enum(_) => {
            syn::Error::new_spanned(
                &input.ident,
                "Lenses can only be derived for structs, not enums. Use #[derive(Prisms)] for enums.",
            )
            .to_compile_error()
        }
        Data::Union(_) => {
            syn::Error::new_spanned(&input.ident, "Lenses cannot be derived for unions.")
                .to_compile_error()
        }
    };

    TokenStream::from(expanded)
}

/// Generates lens methods for a struct's fields.
fn generate_struct_lenses(name: &Ident, generics: &Generics, fields: &Fields) -> TokenStream2 {
    match fields {
        Fields::Named(named_fields) => {
            let runtime: syn::Path = syn::parse_quote!(::lambars::optics);
            let self_path: syn::Path = syn::parse_quote!(Self);
            let field_names: Vec<Ident> = named_fields
                .named
                .iter()
                .filter_map(|field| field.ident.clone())
                .collect();

            let lens_methods: Vec<TokenStream2> = named_fields
                .named
                .iter()
                .filter_map(|field| {
                    let field_name = field.ident.as_ref()?;
                    let field_type = &field.ty;
                    let method_name = format_ident!("{}_lens", field_name);

                    let getter = copy::getter_fragment(&self_path, field_name, &Accessor::Field);
                    let setter =
                        copy::canonical_setter(&self_path, field_type, &field_names, field_name);
                    let lens = copy::lens_expr(&runtime, &getter, &setter);

                    Some(quote! {
                        /// Returns a lens focusing on this field.
                        ///
                        /// This lens provides get/set access to the field.
                        #[inline]
                        #[must_use]
                        pub fn #method_name() -> impl ::lambars::optics::Lens<Self, #field_type> + Clone {
                            #lens
                        }
                    })
                })
                .collect();

            let (impl_generics, type_generics, where_clause) = generics.split_for_impl();

            quote! {
                impl #impl_generics #name #type_generics #where_clause {
                    #(#lens_methods)*
                }
            }
        }
        Fields::Unnamed(_) => syn::Error::new_spanned(
            name,
            "Lenses can only be derived for structs with named fields, not tuple structs.",
        )
        .to_compile_error(),
        Fields::Unit => syn::Error::new_spanned(
            name,
            "Lenses cannot be derived for unit structs (structs with no fields).",
        )
        .to_compile_error(),
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn named_struct_expansion_substitutes_fields() {
        let input: DeriveInput = syn::parse_quote! {
            struct Point {
                x: i32,
                y: i32,
            }
        };
        let Data::Struct(data) = &input.data else {
            panic!("expected a struct");
        };
        let expanded =
            generate_struct_lenses(&input.ident, &input.generics, &data.fields).to_string();
        assert!(expanded.contains("x_lens"));
        assert!(expanded.contains("y_lens"));
        let normalised = expanded.replace(' ', "");
        assert!(normalised.contains("Self{x:value,y:source.y}"));
    }

    #[rstest]
    fn tuple_struct_expansion_is_an_error() {
        let input: DeriveInput = syn::parse_quote! {
            struct Pair(i32, i32);
        };
        let Data::Struct(data) = &input.data else {
            panic!("expected a struct");
        };
        let expanded =
            generate_struct_lenses(&input.ident, &input.generics, &data.fields).to_string();
        assert!(expanded.contains("compile_error"));
    }
}
