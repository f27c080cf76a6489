//! The per-round generation driver.
//!
//! One round walks the model's generation targets and runs each type's
//! pipeline (classify, resolve strategies, generate fragments, emit)
//! independently of every other target's. A failed target attaches its
//! diagnostics and skips its own emission; the round carries on. The round
//! as a whole fails when the sink holds any error-severity diagnostic.

use syn::Path;
use tracing::{debug, debug_span, warn};

use crate::classify::TypeClassifier;
use crate::diag::{DiagnosticKind, DiagnosticSink};
use crate::emit::spec_optics::SpecOpticsEmitter;
use crate::emit::type_optics::{EmitOptions, TypeOpticsEmitter};
use crate::emit::{EmittedFile, Filer};
use crate::model::hints::Hint;
use crate::model::structural::{GenerationTarget, StructuralModel};
use crate::model::path_key;
use crate::navigator::NavigatorOptions;
use crate::spec::SpecAnalyser;
use crate::strategy::traversal::TraversalRegistry;

/// Round-wide generation defaults; per-type scope markers override them.
#[derive(Debug, Clone)]
pub struct GenerateConfig {
    /// The crate path emitted optics call into.
    pub runtime_path: Path,
    /// Default target module for emitted files.
    pub target_module: Option<String>,
    /// Default navigator options for types whose marker enables none.
    pub navigators: Option<NavigatorOptions>,
    /// Round-wide mutable-field override.
    pub allow_mutable: bool,
}

impl Default for GenerateConfig {
    fn default() -> Self {
        Self {
            runtime_path: syn::parse_quote!(::lambars::optics),
            target_module: None,
            navigators: None,
            allow_mutable: false,
        }
    }
}

/// What one round produced.
#[derive(Debug, Default)]
pub struct RoundOutcome {
    /// Relative paths of emitted files, in emission order.
    pub emitted: Vec<String>,
    /// Elements that attached diagnostics and skipped emission.
    pub skipped: Vec<String>,
}

/// Drives classification, resolution, and emission for one model.
pub struct Pipeline<'m> {
    model: &'m dyn StructuralModel,
    config: GenerateConfig,
    registry: TraversalRegistry,
}

impl<'m> Pipeline<'m> {
    /// Creates a pipeline with the standard container registry.
    ///
    /// The registry is pipeline-local and rebuilt per pipeline value, so
    /// nothing leaks across rounds.
    #[must_use]
    pub fn new(model: &'m dyn StructuralModel, config: GenerateConfig) -> Self {
        Self {
            model,
            config,
            registry: TraversalRegistry::standard(),
        }
    }

    /// Creates a pipeline over a custom container registry.
    #[must_use]
    pub const fn with_registry(
        model: &'m dyn StructuralModel,
        config: GenerateConfig,
        registry: TraversalRegistry,
    ) -> Self {
        Self {
            model,
            config,
            registry,
        }
    }

    /// The pipeline's container registry, for appending host generators.
    pub fn registry_mut(&mut self) -> &mut TraversalRegistry {
        &mut self.registry
    }

    /// Runs one generation round over every target the model declares.
    pub fn run_round(&self, filer: &mut dyn Filer, sink: &mut DiagnosticSink) -> RoundOutcome {
        let span = debug_span!("generation_round");
        let _guard = span.enter();

        let mut outcome = RoundOutcome::default();
        for target in self.model.targets() {
            match target {
                GenerationTarget::Type(path) => {
                    self.run_type(&path, filer, sink, &mut outcome);
                }
                GenerationTarget::Spec(name) => {
                    self.run_spec(&name, filer, sink, &mut outcome);
                }
            }
        }

        debug!(
            emitted = outcome.emitted.len(),
            skipped = outcome.skipped.len(),
            errors = sink.error_count(),
            "round complete"
        );
        outcome
    }

    fn run_type(
        &self,
        path: &Path,
        filer: &mut dyn Filer,
        sink: &mut DiagnosticSink,
        outcome: &mut RoundOutcome,
    ) {
        let element = path_key(path);
        let Some(raw) = self.model.raw_type(path) else {
            sink.error(
                DiagnosticKind::ClassificationFailure,
                &element,
                "target type is not known to the structural model",
            );
            outcome.skipped.push(element);
            return;
        };

        let classifier = TypeClassifier::new(self.model);
        let descriptor = classifier.classify(raw);
        debug!(target = %element, kind = ?descriptor.kind, "classified");

        let options = self.options_for(&raw.hints);
        let emitter =
            TypeOpticsEmitter::new(self.model, &self.registry, self.config.runtime_path.clone());
        match emitter.emit(&descriptor, &options, sink) {
            Some(file) => Self::write(file, &element, filer, sink, outcome),
            None => {
                warn!(target = %element, "skipped emission");
                outcome.skipped.push(element);
            }
        }
    }

    fn run_spec(
        &self,
        name: &syn::Ident,
        filer: &mut dyn Filer,
        sink: &mut DiagnosticSink,
        outcome: &mut RoundOutcome,
    ) {
        let element = name.to_string();
        let Some(spec) = self.model.raw_spec(name) else {
            sink.error(
                DiagnosticKind::ClassificationFailure,
                &element,
                "target spec is not known to the structural model",
            );
            outcome.skipped.push(element);
            return;
        };

        let analyser = SpecAnalyser::new(self.model);
        let Some(analysis) = analyser.analyse(spec, sink) else {
            warn!(target = %element, "spec analysis failed");
            outcome.skipped.push(element);
            return;
        };
        debug!(target = %element, intents = analysis.intents.len(), "spec analysed");

        let emitter = SpecOpticsEmitter::new(self.config.runtime_path.clone());
        let module = self
            .config
            .target_module
            .as_deref()
            .or(analysis.module.as_deref())
            .map(ToString::to_string);
        let file = emitter.emit(&analysis, module.as_deref());
        Self::write(file, &element, filer, sink, outcome);
    }

    fn write(
        file: EmittedFile,
        element: &str,
        filer: &mut dyn Filer,
        sink: &mut DiagnosticSink,
        outcome: &mut RoundOutcome,
    ) {
        match filer.write(&file.relative_path, &file.contents) {
            Ok(()) => outcome.emitted.push(file.relative_path),
            Err(error) => {
                sink.error(DiagnosticKind::IoFailure, element, error.to_string());
                outcome.skipped.push(element.to_string());
            }
        }
    }

    /// Resolves per-type options: the type's own scope marker wins, the
    /// round config fills the gaps.
    fn options_for(&self, hints: &[Hint]) -> EmitOptions {
        let marker = hints.iter().find_map(|hint| match hint {
            Hint::ImportOptics(import) => Some(import),
            _ => None,
        });

        marker.map_or_else(
            || EmitOptions {
                target_module: self.config.target_module.clone(),
                navigators: self.config.navigators.clone(),
                allow_mutable: self.config.allow_mutable,
            },
            |import| {
                let mut options = EmitOptions::from_import_hint(import);
                if options.target_module.is_none() {
                    options.target_module = self.config.target_module.clone();
                }
                if options.navigators.is_none() {
                    options.navigators = self.config.navigators.clone();
                }
                options.allow_mutable |= self.config.allow_mutable;
                options
            },
        )
    }
}
