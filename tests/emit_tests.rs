//! Tests for type emission: file naming, content shape, determinism, and
//! the mutable-field gate.
//!
//! Content assertions parse the emitted file back with `syn` or compare
//! whitespace-normalised text, never raw token spacing.

use refract::classify::TypeClassifier;
use refract::diag::{DiagnosticKind, DiagnosticSink};
use refract::emit::type_optics::{EmitOptions, TypeOpticsEmitter};
use refract::emit::{EmittedFile, GENERATED_HEADER};
use refract::frontend::SourceModel;
use refract::strategy::traversal::TraversalRegistry;
use refract::StructuralModel as _;
use rstest::rstest;
use syn::parse_quote;

fn emit_one(file: syn::File, type_name: &str, options: &EmitOptions) -> (Option<EmittedFile>, DiagnosticSink) {
    let mut sink = DiagnosticSink::new();
    let model = SourceModel::from_files(&[file], &mut sink);
    assert!(!sink.has_errors(), "fixture lowering failed: {:?}", sink.diagnostics());

    let path: syn::Path = syn::parse_str(type_name).unwrap();
    let classifier = TypeClassifier::new(&model);
    let descriptor = classifier.classify(model.raw_type(&path).unwrap());

    let registry = TraversalRegistry::standard();
    let runtime: syn::Path = parse_quote!(::lambars::optics);
    let emitter = TypeOpticsEmitter::new(&model, &registry, runtime);
    let emitted = emitter.emit(&descriptor, options, &mut sink);
    (emitted, sink)
}

fn normalised(contents: &str) -> String {
    contents.replace([' ', '\n'], "")
}

fn item_names(contents: &str) -> Vec<String> {
    let parsed = syn::parse_file(contents).expect("emitted file must parse");
    parsed
        .items
        .iter()
        .filter_map(|item| match item {
            syn::Item::Fn(function) => Some(function.sig.ident.to_string()),
            syn::Item::Struct(structure) => Some(structure.ident.to_string()),
            _ => None,
        })
        .collect()
}

// =============================================================================
// Products: lenses, with-mutators, traversals (Scenarios A and D)
// =============================================================================

#[rstest]
fn product_emission_substitutes_only_the_target_field() {
    let (emitted, sink) = emit_one(
        parse_quote! {
            pub struct Point {
                pub x: i32,
                pub y: i32,
            }
        },
        "Point",
        &EmitOptions::default(),
    );
    assert!(!sink.has_errors());
    let file = emitted.expect("product should emit");
    assert_eq!(file.relative_path, "point_optics.rs");
    assert!(file.contents.starts_with(GENERATED_HEADER));

    let text = normalised(&file.contents);
    // Scenario A: setting x rebuilds Point { x: value, y: source.y }.
    assert!(text.contains("Point{x:value,y:source.y}"));
    assert!(text.contains("Point{x:source.x,y:value}"));
    assert_eq!(item_names(&file.contents), ["x", "y", "with_x", "with_y"]);
}

#[rstest]
fn container_fields_gain_traversals_in_declaration_order() {
    let (emitted, sink) = emit_one(
        parse_quote! {
            pub struct Article {
                pub title: String,
                pub tags: Vec<String>,
                pub reviewer: Option<String>,
            }
        },
        "Article",
        &EmitOptions::default(),
    );
    assert!(!sink.has_errors());
    let file = emitted.expect("product should emit");

    // Scenario D: the tags lens composes with the List traversal.
    let text = normalised(&file.contents);
    assert!(text.contains("compose_traversal(::lambars::optics::VecEach::new())"));
    assert!(text.contains("compose_traversal(::lambars::optics::OptionEach::new())"));
    assert!(file.contents.contains("use ::lambars::optics::LensComposeWithTraversal as _;"));

    assert_eq!(
        item_names(&file.contents),
        [
            "title",
            "tags",
            "reviewer",
            "with_title",
            "with_tags",
            "with_reviewer",
            "tags_traversal",
            "reviewer_traversal",
        ]
    );
}

#[rstest]
fn map_traversals_focus_values() {
    let (emitted, sink) = emit_one(
        parse_quote! {
            pub struct Scores {
                pub by_player: HashMap<String, u64>,
            }
        },
        "Scores",
        &EmitOptions::default(),
    );
    assert!(!sink.has_errors());
    let file = emitted.expect("product should emit");
    let parsed = syn::parse_file(&file.contents).unwrap();
    let traversal = parsed
        .items
        .iter()
        .find_map(|item| match item {
            syn::Item::Fn(function) if function.sig.ident == "by_player_traversal" => {
                Some(function)
            }
            _ => None,
        })
        .expect("map field should gain a traversal");
    let rendered = quote::quote!(#traversal).to_string().replace(' ', "");
    assert!(rendered.contains("Traversal<Scores,u64>"));
}

// =============================================================================
// Sums and enumerations (Scenario B)
// =============================================================================

#[rstest]
fn sum_emission_generates_one_prism_per_variant() {
    let (emitted, sink) = emit_one(
        parse_quote! {
            pub enum Shape {
                Circle(f64),
                Square(f64),
            }
        },
        "Shape",
        &EmitOptions::default(),
    );
    assert!(!sink.has_errors());
    let file = emitted.expect("sum should emit");
    assert_eq!(file.relative_path, "shape_optics.rs");
    assert_eq!(item_names(&file.contents), ["circle", "square"]);

    // Scenario B: the circle prism matches only Shape::Circle.
    let text = normalised(&file.contents);
    assert!(text.contains("Shape::Circle(value)=>Some(value)"));
    assert!(text.contains("|value:f64|Shape::Circle(value)"));
}

#[rstest]
fn enumeration_constants_focus_unit() {
    let (emitted, sink) = emit_one(
        parse_quote! {
            pub enum Suit {
                Hearts,
                Spades,
            }
        },
        "Suit",
        &EmitOptions::default(),
    );
    assert!(!sink.has_errors());
    let file = emitted.expect("enumeration should emit");
    assert_eq!(item_names(&file.contents), ["hearts", "spades"]);
    let text = normalised(&file.contents);
    assert!(text.contains("Prism<Suit,()>"));
    assert!(text.contains("Suit::Hearts=>Some(&())"));
}

#[rstest]
fn variant_names_are_case_transformed() {
    let (emitted, _sink) = emit_one(
        parse_quote! {
            pub enum Event {
                KeyPress(char),
                MouseClick(u16),
            }
        },
        "Event",
        &EmitOptions::default(),
    );
    let file = emitted.expect("sum should emit");
    assert_eq!(item_names(&file.contents), ["key_press", "mouse_click"]);
}

// =============================================================================
// Mutable-update types
// =============================================================================

fn date_fixture() -> syn::File {
    parse_quote! {
        pub struct Date {
            year: i32,
        }

        impl Date {
            pub fn year(&self) -> i32 {
                self.year
            }

            pub fn with_year(self, year: i32) -> Self {
                Self { year }
            }

            pub fn set_year(&mut self, year: i32) {
                self.year = year;
            }
        }
    }
}

#[rstest]
fn mutable_fields_are_a_hard_error_by_default() {
    let (emitted, sink) = emit_one(date_fixture(), "Date", &EmitOptions::default());
    assert!(emitted.is_none());
    assert!(sink.has_errors());
    assert_eq!(sink.diagnostics()[0].kind, DiagnosticKind::ClassificationFailure);
}

#[rstest]
fn mutable_fields_can_be_explicitly_overridden() {
    let options = EmitOptions {
        allow_mutable: true,
        ..EmitOptions::default()
    };
    let (emitted, sink) = emit_one(date_fixture(), "Date", &options);
    assert!(!sink.has_errors());
    let file = emitted.expect("override should allow emission");

    let text = normalised(&file.contents);
    assert!(text.contains("source.with_year(value)"));
    assert!(text.contains("|source:&Date|source.year()"));
    assert_eq!(item_names(&file.contents), ["year", "with_year"]);
}

// =============================================================================
// Target modules, determinism, unsupported shapes
// =============================================================================

#[rstest]
fn target_module_maps_to_a_directory() {
    let options = EmitOptions {
        target_module: Some("crate::geometry".to_string()),
        ..EmitOptions::default()
    };
    let (emitted, _sink) = emit_one(
        parse_quote! {
            pub struct Point {
                pub x: i32,
            }
        },
        "Point",
        &options,
    );
    assert_eq!(
        emitted.expect("product should emit").relative_path,
        "geometry/point_optics.rs"
    );
}

#[rstest]
fn the_declaring_module_is_the_default_target() {
    let (emitted, _sink) = emit_one(
        parse_quote! {
            pub mod geometry {
                pub struct Point {
                    pub x: i32,
                }
            }
        },
        "Point",
        &EmitOptions::default(),
    );
    assert_eq!(
        emitted.expect("product should emit").relative_path,
        "geometry/point_optics.rs"
    );
}

#[rstest]
fn identical_descriptors_emit_byte_identical_files() {
    let fixture = || -> syn::File {
        parse_quote! {
            pub struct Order {
                pub id: u64,
                pub lines: Vec<String>,
            }
        }
    };
    let (first, _) = emit_one(fixture(), "Order", &EmitOptions::default());
    let (second, _) = emit_one(fixture(), "Order", &EmitOptions::default());
    assert_eq!(first.unwrap(), second.unwrap());
}

#[rstest]
fn unsupported_shapes_enumerate_alternatives() {
    let (emitted, sink) = emit_one(
        parse_quote! {
            pub struct Opaque(u64);
        },
        "Opaque",
        &EmitOptions::default(),
    );
    assert!(emitted.is_none());
    assert_eq!(sink.diagnostics()[0].kind, DiagnosticKind::ClassificationFailure);
    assert!(sink.diagnostics()[0].message.contains("with_"));
}
