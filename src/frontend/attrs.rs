//! Hint extraction from attributes.
//!
//! The dedicated extraction pass that turns the attribute vocabulary into
//! [`Hint`] values before strategy resolution runs. Malformed attributes are
//! `HintInvalid` diagnostics on the carrying element; well-formed hints the
//! resolver later rejects are its concern, not this pass's.

use proc_macro2::Span;
use syn::{Attribute, Expr, Ident, Lit, LitStr};

use crate::diag::{DiagnosticKind, DiagnosticSink};
use crate::model::hints::{
    BuilderHint, ConstructorHint, CopyAndSetHint, Hint, ImportOpticsHint, InstanceOfHint,
    MatchWhenHint, ThroughFieldHint, TraverseWithHint, WitherHint,
};

/// The attribute names this pass consumes.
pub const HINT_ATTRIBUTES: [&str; 9] = [
    "via_builder",
    "wither",
    "via_constructor",
    "via_copy_and_set",
    "instance_of",
    "match_when",
    "traverse_with",
    "through_field",
    "import_optics",
];

/// Whether an attribute belongs to the hint vocabulary.
#[must_use]
pub fn is_hint_attribute(attribute: &Attribute) -> bool {
    attribute
        .path()
        .get_ident()
        .is_some_and(|ident| HINT_ATTRIBUTES.contains(&ident.to_string().as_str()))
}

/// Extracts every hint attached to `attributes`, attaching a `HintInvalid`
/// diagnostic per malformed attribute and continuing with the rest.
#[must_use]
pub fn extract_hints(
    attributes: &[Attribute],
    element: &str,
    sink: &mut DiagnosticSink,
) -> Vec<Hint> {
    let mut hints = Vec::new();
    for attribute in attributes {
        let Some(ident) = attribute.path().get_ident().map(ToString::to_string) else {
            continue;
        };
        if !HINT_ATTRIBUTES.contains(&ident.as_str()) {
            continue;
        }
        match parse_hint(attribute, &ident) {
            Ok(hint) => hints.push(hint),
            Err(error) => sink.error(
                DiagnosticKind::HintInvalid,
                element,
                format!("malformed #[{ident}] hint: {error}"),
            ),
        }
    }
    hints
}

fn parse_hint(attribute: &Attribute, name: &str) -> syn::Result<Hint> {
    match name {
        "via_builder" => parse_via_builder(attribute),
        "wither" => parse_wither(attribute),
        "via_constructor" => parse_via_constructor(attribute),
        "via_copy_and_set" => parse_via_copy_and_set(attribute),
        "instance_of" => {
            let target = attribute.parse_args::<syn::Path>()?;
            Ok(Hint::InstanceOf(InstanceOfHint { target }))
        }
        "match_when" => parse_match_when(attribute),
        "traverse_with" => {
            let reference = parse_expr_argument(attribute)?;
            Ok(Hint::TraverseWith(TraverseWithHint { reference }))
        }
        "through_field" => parse_through_field(attribute),
        "import_optics" => parse_import_optics(attribute),
        _ => Err(syn::Error::new_spanned(attribute, "unknown hint")),
    }
}

fn parse_via_builder(attribute: &Attribute) -> syn::Result<Hint> {
    let mut hint = BuilderHint::default();
    if !matches!(attribute.meta, syn::Meta::Path(_)) {
        attribute.parse_nested_meta(|meta| {
            if meta.path.is_ident("getter") {
                hint.getter = Some(ident_value(&meta)?);
            } else if meta.path.is_ident("to_builder") {
                hint.to_builder = Some(ident_value(&meta)?);
            } else if meta.path.is_ident("setter") {
                hint.setter = Some(ident_value(&meta)?);
            } else if meta.path.is_ident("build") {
                hint.build = Some(ident_value(&meta)?);
            } else {
                return Err(meta.error("expected getter, to_builder, setter, or build"));
            }
            Ok(())
        })?;
    }
    Ok(Hint::ViaBuilder(hint))
}

fn parse_wither(attribute: &Attribute) -> syn::Result<Hint> {
    let mut method = None;
    let mut getter = None;
    attribute.parse_nested_meta(|meta| {
        if meta.path.is_ident("method") {
            method = Some(ident_value(&meta)?);
        } else if meta.path.is_ident("getter") {
            getter = Some(ident_value(&meta)?);
        } else {
            return Err(meta.error("expected method or getter"));
        }
        Ok(())
    })?;
    match (method, getter) {
        (Some(method), Some(getter)) => Ok(Hint::Wither(WitherHint { method, getter })),
        _ => Err(syn::Error::new_spanned(
            attribute,
            "both method and getter must be named explicitly",
        )),
    }
}

fn parse_via_constructor(attribute: &Attribute) -> syn::Result<Hint> {
    let mut hint = ConstructorHint::default();
    if !matches!(attribute.meta, syn::Meta::Path(_)) {
        attribute.parse_nested_meta(|meta| {
            if meta.path.is_ident("args") {
                meta.parse_nested_meta(|inner| {
                    match inner.path.get_ident() {
                        Some(ident) => hint.parameter_order.push(ident.clone()),
                        None => return Err(inner.error("expected a parameter name")),
                    }
                    Ok(())
                })
            } else {
                Err(meta.error("expected args(...)"))
            }
        })?;
    }
    Ok(Hint::ViaConstructor(hint))
}

fn parse_via_copy_and_set(attribute: &Attribute) -> syn::Result<Hint> {
    let mut setter = None;
    let mut copy_with = None;
    attribute.parse_nested_meta(|meta| {
        if meta.path.is_ident("setter") {
            setter = Some(ident_value(&meta)?);
        } else if meta.path.is_ident("copy_with") {
            let literal: LitStr = meta.value()?.parse()?;
            copy_with = Some(literal.parse::<syn::Path>()?);
        } else {
            return Err(meta.error("expected setter or copy_with"));
        }
        Ok(())
    })?;
    setter.map_or_else(
        || {
            Err(syn::Error::new_spanned(
                attribute,
                "a setter must be named explicitly",
            ))
        },
        |setter| Ok(Hint::ViaCopyAndSet(CopyAndSetHint { setter, copy_with })),
    )
}

fn parse_match_when(attribute: &Attribute) -> syn::Result<Hint> {
    let mut predicate = None;
    let mut getter = None;
    attribute.parse_nested_meta(|meta| {
        if meta.path.is_ident("predicate") {
            predicate = Some(ident_value(&meta)?);
        } else if meta.path.is_ident("getter") {
            getter = Some(ident_value(&meta)?);
        } else {
            return Err(meta.error("expected predicate or getter"));
        }
        Ok(())
    })?;
    match (predicate, getter) {
        (Some(predicate), Some(getter)) => {
            Ok(Hint::MatchWhen(MatchWhenHint { predicate, getter }))
        }
        _ => Err(syn::Error::new_spanned(
            attribute,
            "both predicate and getter must be named explicitly",
        )),
    }
}

fn parse_through_field(attribute: &Attribute) -> syn::Result<Hint> {
    let mut field = None;
    let mut traversal = None;
    attribute.parse_nested_meta(|meta| {
        if meta.path.is_ident("field") {
            field = Some(ident_value(&meta)?);
        } else if meta.path.is_ident("traversal") {
            let literal: LitStr = meta.value()?.parse()?;
            traversal = Some(literal.parse::<Expr>()?);
        } else {
            return Err(meta.error("expected field or traversal"));
        }
        Ok(())
    })?;
    field.map_or_else(
        || {
            Err(syn::Error::new_spanned(
                attribute,
                "a field must be named explicitly",
            ))
        },
        |field| Ok(Hint::ThroughField(ThroughFieldHint { field, traversal })),
    )
}

fn parse_import_optics(attribute: &Attribute) -> syn::Result<Hint> {
    let mut hint = ImportOpticsHint::default();
    if !matches!(attribute.meta, syn::Meta::Path(_)) {
        attribute.parse_nested_meta(|meta| {
            if meta.path.is_ident("types") {
                meta.parse_nested_meta(|inner| {
                    hint.types.push(inner.path.clone());
                    Ok(())
                })
            } else if meta.path.is_ident("target_module") {
                let literal: LitStr = meta.value()?.parse()?;
                hint.target_module = Some(literal.value());
                Ok(())
            } else if meta.path.is_ident("navigators") {
                hint.navigators = true;
                Ok(())
            } else if meta.path.is_ident("max_depth") {
                let literal: Lit = meta.value()?.parse()?;
                match literal {
                    Lit::Int(int) => {
                        hint.max_depth = int.base10_parse()?;
                        Ok(())
                    }
                    _ => Err(meta.error("max_depth expects an integer")),
                }
            } else if meta.path.is_ident("include_fields") {
                parse_name_list(&meta, &mut hint.include_fields)
            } else if meta.path.is_ident("exclude_fields") {
                parse_name_list(&meta, &mut hint.exclude_fields)
            } else if meta.path.is_ident("allow_mutable") {
                hint.allow_mutable = true;
                Ok(())
            } else {
                Err(meta.error(
                    "expected types, target_module, navigators, max_depth, \
                     include_fields, exclude_fields, or allow_mutable",
                ))
            }
        })?;
    }
    Ok(Hint::ImportOptics(hint))
}

fn parse_name_list(
    meta: &syn::meta::ParseNestedMeta<'_>,
    into: &mut Vec<String>,
) -> syn::Result<()> {
    meta.parse_nested_meta(|inner| {
        match inner.path.get_ident() {
            Some(ident) => into.push(ident.to_string()),
            None => return Err(inner.error("expected a field name")),
        }
        Ok(())
    })
}

/// Reads `name = "value"` as an identifier.
fn ident_value(meta: &syn::meta::ParseNestedMeta<'_>) -> syn::Result<Ident> {
    let literal: LitStr = meta.value()?.parse()?;
    let value = literal.value();
    syn::parse_str::<Ident>(&value)
        .map(|ident| Ident::new(&ident.to_string(), Span::call_site()))
        .map_err(|_| syn::Error::new(literal.span(), format!("`{value}` is not an identifier")))
}

/// Reads the attribute argument as an expression; a string literal is
/// re-parsed as the expression it quotes.
fn parse_expr_argument(attribute: &Attribute) -> syn::Result<Expr> {
    let expression = attribute.parse_args::<Expr>()?;
    if let Expr::Lit(literal) = &expression {
        if let Lit::Str(string) = &literal.lit {
            return string.parse::<Expr>();
        }
    }
    Ok(expression)
}

#[cfg(test)]
mod tests {
    use syn::parse_quote;

    use super::*;

    fn extract_one(attribute: Attribute) -> Hint {
        let mut sink = DiagnosticSink::new();
        let hints = extract_hints(&[attribute], "Spec::method", &mut sink);
        assert!(!sink.has_errors(), "unexpected diagnostics: {:?}", sink.diagnostics());
        assert_eq!(hints.len(), 1);
        hints.into_iter().next().unwrap()
    }

    #[test]
    fn wither_requires_both_names() {
        let hint = extract_one(parse_quote!(#[wither(method = "with_year", getter = "year")]));
        let Hint::Wither(wither) = hint else {
            panic!("expected a wither hint");
        };
        assert_eq!(wither.method.to_string(), "with_year");
        assert_eq!(wither.getter.to_string(), "year");

        let mut sink = DiagnosticSink::new();
        let attribute: Attribute = parse_quote!(#[wither(method = "with_year")]);
        let hints = extract_hints(&[attribute], "Spec::year", &mut sink);
        assert!(hints.is_empty());
        assert!(sink.has_errors());
    }

    #[test]
    fn via_constructor_parses_parameter_order() {
        let hint = extract_one(parse_quote!(#[via_constructor(args(x, y, z))]));
        let Hint::ViaConstructor(constructor) = hint else {
            panic!("expected a constructor hint");
        };
        let order: Vec<String> = constructor
            .parameter_order
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(order, ["x", "y", "z"]);
    }

    #[test]
    fn via_constructor_accepts_an_omitted_order() {
        let hint = extract_one(parse_quote!(#[via_constructor]));
        let Hint::ViaConstructor(constructor) = hint else {
            panic!("expected a constructor hint");
        };
        assert!(constructor.parameter_order.is_empty());
    }

    #[test]
    fn traverse_with_accepts_quoted_expressions() {
        let hint = extract_one(parse_quote!(#[traverse_with("my_traversals::all_players()")]));
        let Hint::TraverseWith(traverse) = hint else {
            panic!("expected a traverse_with hint");
        };
        assert!(matches!(traverse.reference, Expr::Call(_)));
    }

    #[test]
    fn import_optics_collects_options() {
        let hint = extract_one(parse_quote!(#[import_optics(
            types(Company, Address),
            navigators,
            max_depth = 4,
            exclude_fields(internal_id)
        )]));
        let Hint::ImportOptics(import) = hint else {
            panic!("expected an import_optics hint");
        };
        assert_eq!(import.types.len(), 2);
        assert!(import.navigators);
        assert_eq!(import.max_depth, 4);
        assert_eq!(import.exclude_fields, ["internal_id"]);
    }

    #[test]
    fn unrelated_attributes_are_ignored() {
        let mut sink = DiagnosticSink::new();
        let attribute: Attribute = parse_quote!(#[derive(Clone)]);
        assert!(extract_hints(&[attribute], "Point", &mut sink).is_empty());
        assert!(sink.is_empty());
    }
}
