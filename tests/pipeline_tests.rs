//! End-to-end round tests: target discovery, failure isolation, duplicate
//! emission, and round outcomes.

use refract::diag::{DiagnosticKind, DiagnosticSink};
use refract::emit::{Filer, FilerError, MemoryFiler};
use refract::frontend::SourceModel;
use refract::pipeline::{GenerateConfig, Pipeline};
use rstest::rstest;
use syn::parse_quote;

fn run(file: syn::File) -> (MemoryFiler, DiagnosticSink, refract::pipeline::RoundOutcome) {
    let mut sink = DiagnosticSink::new();
    let model = SourceModel::from_files(&[file], &mut sink);
    let pipeline = Pipeline::new(&model, GenerateConfig::default());
    let mut filer = MemoryFiler::new();
    let outcome = pipeline.run_round(&mut filer, &mut sink);
    (filer, sink, outcome)
}

#[rstest]
fn a_round_emits_one_file_per_marked_type() {
    let (filer, sink, outcome) = run(parse_quote! {
        #[import_optics]
        pub struct Point {
            pub x: i32,
            pub y: i32,
        }

        #[import_optics]
        pub enum Shape {
            Circle(f64),
            Square(f64),
        }
    });

    assert!(!sink.has_errors());
    assert_eq!(outcome.emitted, ["point_optics.rs", "shape_optics.rs"]);
    assert!(outcome.skipped.is_empty());
    assert!(filer.file("point_optics.rs").is_some());
    assert!(filer.file("shape_optics.rs").is_some());
}

#[rstest]
fn specs_emit_through_the_same_round() {
    let (filer, sink, outcome) = run(parse_quote! {
        pub struct Person {
            pub name: String,
        }

        pub trait PersonOpticsSpec: OpticsSpec<Person> {
            #[wither(method = "with_name", getter = "name")]
            fn name() -> impl Lens<Person, String>;
        }
    });

    assert!(!sink.has_errors());
    assert_eq!(outcome.emitted, ["person_optics.rs"]);
    assert!(filer.file("person_optics.rs").unwrap().contains("with_name"));
}

#[rstest]
fn one_failing_type_never_blocks_the_others() {
    let (filer, sink, outcome) = run(parse_quote! {
        #[import_optics]
        pub struct Broken(u64);

        #[import_optics]
        pub struct Healthy {
            pub value: u64,
        }
    });

    // The broken type attaches a diagnostic and skips only itself.
    assert!(sink.has_errors());
    assert_eq!(sink.error_count(), 1);
    assert_eq!(outcome.emitted, ["healthy_optics.rs"]);
    assert_eq!(outcome.skipped, ["Broken"]);
    assert!(filer.file("healthy_optics.rs").is_some());
}

#[rstest]
fn a_failing_spec_never_blocks_type_emission() {
    let (filer, sink, outcome) = run(parse_quote! {
        #[import_optics]
        pub struct Point {
            pub x: i32,
        }

        pub trait PointOpticsSpec: OpticsSpec<Point> {
            fn x() -> impl Lens<Point, i32>;
        }
    });

    assert!(sink.has_errors());
    assert_eq!(outcome.emitted, ["point_optics.rs"]);
    assert_eq!(outcome.skipped, ["PointOpticsSpec"]);
    assert!(filer.file("point_optics.rs").is_some());
}

#[rstest]
fn duplicate_emission_is_an_io_failure_on_the_second_writer() {
    // Two types whose names collide on the emitted path.
    let (filer, sink, outcome) = run(parse_quote! {
        pub mod first {
            #[import_optics(target_module = "out")]
            pub struct Point {
                pub x: i32,
            }
        }

        pub mod second {
            #[import_optics(target_module = "out")]
            pub struct Point {
                pub y: i32,
            }
        }
    });

    assert_eq!(outcome.emitted.len(), 1);
    assert_eq!(outcome.skipped.len(), 1);
    assert!(sink
        .diagnostics()
        .iter()
        .any(|diagnostic| diagnostic.kind == DiagnosticKind::IoFailure));
    assert_eq!(filer.len(), 1);
}

#[rstest]
fn marker_options_flow_into_emission() {
    let (filer, sink, _outcome) = run(parse_quote! {
        #[import_optics(target_module = "crate::generated", navigators)]
        pub struct Company {
            pub headquarters: Address,
        }

        #[import_optics]
        pub struct Address {
            pub city: String,
        }
    });

    assert!(!sink.has_errors());
    let contents = filer
        .file("generated/company_optics.rs")
        .expect("marker target module should prefix the path");
    assert!(contents.contains("HeadquartersNavigator"));
}

#[rstest]
fn failing_filers_surface_io_diagnostics() {
    struct RefusingFiler;

    impl Filer for RefusingFiler {
        fn write(&mut self, relative_path: &str, _contents: &str) -> Result<(), FilerError> {
            Err(FilerError::Io {
                path: relative_path.to_string(),
                source: std::io::Error::other("disk full"),
            })
        }
    }

    let mut sink = DiagnosticSink::new();
    let file: syn::File = parse_quote! {
        #[import_optics]
        pub struct Point {
            pub x: i32,
        }
    };
    let model = SourceModel::from_files(&[file], &mut sink);
    let pipeline = Pipeline::new(&model, GenerateConfig::default());
    let mut filer = RefusingFiler;
    let outcome = pipeline.run_round(&mut filer, &mut sink);

    assert!(outcome.emitted.is_empty());
    assert_eq!(outcome.skipped, ["Point"]);
    assert_eq!(sink.diagnostics()[0].kind, DiagnosticKind::IoFailure);
    assert!(sink.diagnostics()[0].message.contains("disk full"));
}
