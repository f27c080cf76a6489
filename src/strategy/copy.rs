//! Copy-strategy fragment generators.
//!
//! Each function produces one closure fragment (or a complete lens
//! constructor expression) for a resolved copy strategy. The lens get side
//! is either a direct field borrow or a call through the strategy's
//! accessor, which is expected to follow the borrow-returning convention.

use proc_macro2::TokenStream;
use quote::quote;
use syn::{Ident, Path, Type};

use super::{BuilderPlan, ConstructorPlan, CopyAndSetPlan, CopyPlan, WitherPlan};
use crate::model::Accessor;

/// The getter closure for a field read through `accessor`.
#[must_use]
pub fn getter_fragment(source: &Path, name: &Ident, accessor: &Accessor) -> TokenStream {
    match accessor {
        Accessor::Field => quote! { |source: &#source| &source.#name },
        Accessor::Method(method) => quote! { |source: &#source| source.#method() },
    }
}

/// The canonical-constructor setter: rebuild by positional substitution of
/// every component in declaration order, replacing the target field's value.
/// Product types only.
#[must_use]
pub fn canonical_setter(
    source: &Path,
    focus: &Type,
    fields: &[Ident],
    target: &Ident,
) -> TokenStream {
    let assignments = fields.iter().map(|field| {
        if field == target {
            quote! { #field: value }
        } else {
            quote! { #field: source.#field }
        }
    });
    quote! {
        |source: #source, value: #focus| #source { #(#assignments),* }
    }
}

/// A struct-update setter for a single named field of a source whose full
/// component list is not in view: `Source { field: value, ..source }`.
#[must_use]
pub fn update_setter(source: &Path, focus: &Type, field: &Ident) -> TokenStream {
    quote! {
        |source: #source, value: #focus| #source { #field: value, ..source }
    }
}

/// The builder setter: `source.to_builder().setter(value).build()`, with
/// every name taken from the resolved plan.
#[must_use]
pub fn builder_setter(source: &Path, focus: &Type, plan: &BuilderPlan) -> TokenStream {
    let to_builder = &plan.to_builder;
    let setter = &plan.setter;
    let build = &plan.build;
    quote! {
        |source: #source, value: #focus| source.#to_builder().#setter(value).#build()
    }
}

/// The wither setter: a single update-method call.
#[must_use]
pub fn wither_setter(source: &Path, focus: &Type, wither: &Ident) -> TokenStream {
    quote! {
        |source: #source, value: #focus| source.#wither(value)
    }
}

/// The constructor setter: `Source::new(...)` with every argument read back
/// from the source except the target position, which receives the new value.
#[must_use]
pub fn constructor_setter(
    source: &Path,
    focus: &Type,
    plan: &ConstructorPlan,
    target: &Ident,
) -> TokenStream {
    let arguments = plan.order.iter().map(|parameter| {
        if parameter == target {
            quote! { value }
        } else {
            quote! { source.#parameter().clone() }
        }
    });
    quote! {
        |source: #source, value: #focus| #source::new(#(#arguments),*)
    }
}

/// The copy-and-set setter: allocate the copy, invoke the declared setter,
/// return the copy. An alternate copy-constructor type is invoked as
/// `Alt::new(source)`; otherwise the owned source is the copy.
#[must_use]
pub fn copy_and_set_setter(source: &Path, focus: &Type, plan: &CopyAndSetPlan) -> TokenStream {
    let setter = &plan.setter;
    let copy = plan.copy_with.as_ref().map_or_else(
        || quote! { source },
        |alternate| quote! { #alternate::new(source) },
    );
    quote! {
        |source: #source, value: #focus| {
            let mut copy = #copy;
            copy.#setter(value);
            copy
        }
    }
}

/// A complete lens constructor expression from getter and setter fragments.
#[must_use]
pub fn lens_expr(runtime: &Path, getter: &TokenStream, setter: &TokenStream) -> TokenStream {
    quote! {
        #runtime::FunctionLens::new(
            #getter,
            #setter,
        )
    }
}

/// The lens constructor for a resolved spec copy plan: the plan's accessor
/// on the get side, the strategy's rebuild on the set side.
#[must_use]
pub fn lens_for_plan(
    runtime: &Path,
    source: &Path,
    focus: &Type,
    field: &Ident,
    plan: &CopyPlan,
) -> TokenStream {
    let getter = getter_fragment(source, field, &Accessor::Method(plan.getter().clone()));
    let setter = match plan {
        CopyPlan::Builder(builder) => builder_setter(source, focus, builder),
        CopyPlan::Wither(WitherPlan { wither, .. }) => wither_setter(source, focus, wither),
        CopyPlan::Constructor(constructor) => {
            constructor_setter(source, focus, constructor, field)
        }
        CopyPlan::CopyAndSet(copy_and_set) => copy_and_set_setter(source, focus, copy_and_set),
    };
    lens_expr(runtime, &getter, &setter)
}

#[cfg(test)]
mod tests {
    use syn::parse_quote;

    use super::*;

    fn rendered(tokens: &TokenStream) -> String {
        tokens.to_string().replace(' ', "")
    }

    #[test]
    fn canonical_setter_substitutes_only_the_target() {
        let setter = canonical_setter(
            &parse_quote!(Point),
            &parse_quote!(i32),
            &[parse_quote!(x), parse_quote!(y)],
            &parse_quote!(x),
        );
        let text = rendered(&setter);
        assert!(text.contains("x:value"));
        assert!(text.contains("y:source.y"));
    }

    #[test]
    fn builder_setter_uses_resolved_names() {
        let plan = BuilderPlan {
            getter: parse_quote!(total),
            to_builder: parse_quote!(to_builder),
            setter: parse_quote!(total),
            build: parse_quote!(build),
        };
        let setter = builder_setter(&parse_quote!(Order), &parse_quote!(u32), &plan);
        assert!(rendered(&setter).contains("source.to_builder().total(value).build()"));
    }

    #[test]
    fn copy_and_set_emits_three_statements() {
        let plan = CopyAndSetPlan {
            getter: parse_quote!(balance),
            setter: parse_quote!(set_balance),
            copy_with: None,
        };
        let setter = copy_and_set_setter(&parse_quote!(Account), &parse_quote!(i64), &plan);
        let text = rendered(&setter);
        assert!(text.contains("letmutcopy=source;"));
        assert!(text.contains("copy.set_balance(value);"));
    }

    #[test]
    fn copy_and_set_honours_alternate_copy_type() {
        let plan = CopyAndSetPlan {
            getter: parse_quote!(balance),
            setter: parse_quote!(set_balance),
            copy_with: Some(parse_quote!(AccountSnapshot)),
        };
        let setter = copy_and_set_setter(&parse_quote!(Account), &parse_quote!(i64), &plan);
        assert!(rendered(&setter).contains("AccountSnapshot::new(source)"));
    }
}
