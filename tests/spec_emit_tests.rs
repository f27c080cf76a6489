//! Tests for spec-driven emission: strategy dispatch, pass-through copies,
//! stub preservation, and file naming (Scenario C included).

use refract::diag::DiagnosticSink;
use refract::emit::spec_optics::SpecOpticsEmitter;
use refract::emit::EmittedFile;
use refract::frontend::SourceModel;
use refract::spec::SpecAnalyser;
use refract::StructuralModel as _;
use rstest::rstest;
use syn::parse_quote;

fn emit_spec(file: syn::File, spec_name: &str) -> (Option<EmittedFile>, DiagnosticSink) {
    let mut sink = DiagnosticSink::new();
    let model = SourceModel::from_files(&[file], &mut sink);
    let name: syn::Ident = syn::parse_str(spec_name).unwrap();
    let spec = model.raw_spec(&name).expect("spec should be collected").clone();

    let analyser = SpecAnalyser::new(&model);
    let emitted = analyser.analyse(&spec, &mut sink).map(|analysis| {
        SpecOpticsEmitter::new(parse_quote!(::lambars::optics)).emit(&analysis, None)
    });
    (emitted, sink)
}

fn normalised(contents: &str) -> String {
    contents.replace([' ', '\n'], "")
}

// =============================================================================
// Scenario C: a lens without a copy hint emits nothing
// =============================================================================

#[rstest]
fn hint_missing_emits_no_file_for_the_spec() {
    let (emitted, sink) = emit_spec(
        parse_quote! {
            pub trait PersonOpticsSpec: OpticsSpec<Person> {
                fn name() -> impl Lens<Person, String>;
            }
        },
        "PersonOpticsSpec",
    );
    assert!(emitted.is_none());
    assert!(sink.has_errors());
}

// =============================================================================
// Strategy dispatch
// =============================================================================

#[rstest]
fn wither_lens_uses_the_hinted_names() {
    let (emitted, sink) = emit_spec(
        parse_quote! {
            pub trait PersonOpticsSpec: OpticsSpec<Person> {
                #[wither(method = "with_name", getter = "display_name")]
                fn name() -> impl Lens<Person, String>;
            }
        },
        "PersonOpticsSpec",
    );
    assert!(!sink.has_errors());
    let file = emitted.expect("emission should succeed");
    assert_eq!(file.relative_path, "person_optics.rs");

    let text = normalised(&file.contents);
    assert!(text.contains("source.display_name()"));
    assert!(text.contains("source.with_name(value)"));
}

#[rstest]
fn builder_lens_chains_the_builder_calls() {
    let (emitted, _sink) = emit_spec(
        parse_quote! {
            pub trait OrderOpticsSpec: OpticsSpec<Order> {
                #[via_builder(setter = "with_total", build = "finish")]
                fn total() -> impl Lens<Order, u32>;
            }
        },
        "OrderOpticsSpec",
    );
    let file = emitted.expect("emission should succeed");
    let text = normalised(&file.contents);
    assert!(text.contains("source.to_builder().with_total(value).finish()"));
}

#[rstest]
fn constructor_lens_orders_arguments_positionally() {
    let (emitted, _sink) = emit_spec(
        parse_quote! {
            pub trait PointOpticsSpec: OpticsSpec<Point> {
                #[via_constructor(args(x, y))]
                fn y() -> impl Lens<Point, i32>;
            }
        },
        "PointOpticsSpec",
    );
    let file = emitted.expect("emission should succeed");
    let text = normalised(&file.contents);
    assert!(text.contains("Point::new(source.x().clone(),value)"));
}

#[rstest]
fn copy_and_set_lens_emits_the_three_statements() {
    let (emitted, _sink) = emit_spec(
        parse_quote! {
            pub trait AccountOpticsSpec: OpticsSpec<Account> {
                #[via_copy_and_set(setter = "set_balance", copy_with = "AccountSnapshot")]
                fn balance() -> impl Lens<Account, i64>;
            }
        },
        "AccountOpticsSpec",
    );
    let file = emitted.expect("emission should succeed");
    let text = normalised(&file.contents);
    assert!(text.contains("letmutcopy=AccountSnapshot::new(source);"));
    assert!(text.contains("copy.set_balance(value);"));
}

#[rstest]
fn match_when_prism_pairs_predicate_and_getter() {
    let (emitted, _sink) = emit_spec(
        parse_quote! {
            pub trait PaymentOpticsSpec: OpticsSpec<Payment> {
                #[match_when(predicate = "is_card", getter = "card_details")]
                fn card() -> impl Prism<Payment, CardDetails>;
            }
        },
        "PaymentOpticsSpec",
    );
    let file = emitted.expect("emission should succeed");
    let text = normalised(&file.contents);
    assert!(text.contains("source.is_card()"));
    assert!(text.contains("source.card_details()"));
    assert!(text.contains("<Payment>::from(value)"));
}

#[rstest]
fn instance_of_prism_matches_the_carrying_variant() {
    let (emitted, sink) = emit_spec(
        parse_quote! {
            pub enum Shape {
                Round(Circle),
                Cornered(Square),
            }

            pub trait ShapeOpticsSpec: OpticsSpec<Shape> {
                #[instance_of(Circle)]
                fn circle() -> impl Prism<Shape, Circle>;
            }
        },
        "ShapeOpticsSpec",
    );
    assert!(!sink.has_errors());
    let file = emitted.expect("emission should succeed");
    let text = normalised(&file.contents);
    assert!(text.contains("Shape::Round(value)=>Some(value)"));
    assert!(text.contains("|value:Circle|Shape::Round(value)"));
}

#[rstest]
fn through_field_traversal_composes_lens_and_each() {
    let (emitted, sink) = emit_spec(
        parse_quote! {
            pub struct Team {
                pub players: Vec<String>,
            }

            pub trait TeamOpticsSpec: OpticsSpec<Team> {
                #[through_field(field = "players")]
                fn players() -> impl Traversal<Team, String>;
            }
        },
        "TeamOpticsSpec",
    );
    assert!(!sink.has_errors());
    let file = emitted.expect("emission should succeed");
    let text = normalised(&file.contents);
    assert!(text.contains("Team{players:value,..source}"));
    assert!(text.contains("compose_traversal(::lambars::optics::VecEach::new())"));
}

#[rstest]
fn traverse_with_reference_is_used_verbatim() {
    let (emitted, _sink) = emit_spec(
        parse_quote! {
            pub trait TeamOpticsSpec: OpticsSpec<Team> {
                #[traverse_with("my_traversals::all_players()")]
                fn players() -> impl Traversal<Team, String>;
            }
        },
        "TeamOpticsSpec",
    );
    let file = emitted.expect("emission should succeed");
    let text = normalised(&file.contents);
    assert!(text.contains("my_traversals::all_players()"));
}

// =============================================================================
// Stubs, pass-through, naming
// =============================================================================

#[rstest]
fn unsupported_kinds_keep_the_declared_surface_as_stubs() {
    let (emitted, sink) = emit_spec(
        parse_quote! {
            pub trait PersonOpticsSpec: OpticsSpec<Person> {
                fn nickname() -> impl Affine<Person, String>;
            }
        },
        "PersonOpticsSpec",
    );
    assert!(!sink.has_errors());
    let file = emitted.expect("stub emission should succeed");
    let parsed = syn::parse_file(&file.contents).unwrap();
    assert_eq!(parsed.items.len(), 1);

    let text = normalised(&file.contents);
    assert!(text.contains("pubfnnickname()->implAffine<Person,String>"));
    assert!(file.contents.contains("not yet supported"));
}

#[rstest]
fn default_method_bodies_are_copied_verbatim() {
    let (emitted, _sink) = emit_spec(
        parse_quote! {
            pub trait PersonOpticsSpec: OpticsSpec<Person> {
                #[wither(method = "with_name", getter = "name")]
                fn name() -> impl Lens<Person, String>;

                fn label(prefix: &str) -> String {
                    format!("{prefix}: person")
                }
            }
        },
        "PersonOpticsSpec",
    );
    let file = emitted.expect("emission should succeed");
    let text = normalised(&file.contents);
    assert!(text.contains("pubfnlabel(prefix:&str)->String"));
    assert!(text.contains(r#"format!("{prefix}:person")"#));
}

#[rstest]
fn spec_names_without_the_suffix_gain_impl() {
    let (emitted, _sink) = emit_spec(
        parse_quote! {
            pub trait PersonOptics: OpticsSpec<Person> {
                #[wither(method = "with_name", getter = "name")]
                fn name() -> impl Lens<Person, String>;
            }
        },
        "PersonOptics",
    );
    assert_eq!(
        emitted.expect("emission should succeed").relative_path,
        "person_optics_impl.rs"
    );
}
