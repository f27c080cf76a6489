//! The source-bound structural model.
//!
//! [`SourceModel`] is the binding between the pipeline and the host's real
//! introspection facility: the host parses not-yet-compiled source with
//! `syn` and hands the items over; this module lowers them into the raw
//! structural facts the pipeline queries. The core itself never parses
//! source text.
//!
//! Lowering is two-phase: collect every item first (types, impl blocks,
//! spec traits, scope markers), then assemble: merge impl methods into
//! their types, attach marker hints to the types they import, and register
//! generation targets in declaration order.

pub mod attrs;

use syn::{FnArg, Ident, Item, Path, ReturnType, Type, Visibility};

use self::attrs::extract_hints;
use crate::diag::{DiagnosticKind, DiagnosticSink};
use crate::model::container::ContainerKind;
use crate::model::hints::Hint;
use crate::model::structural::{GenerationTarget, MemoryModel, StructuralModel};
use crate::model::{
    path_key, RawField, RawMethod, RawShape, RawSpecInfo, RawTypeInfo, RawVariant, SelfKind,
    VariantPayload,
};
use crate::spec::SPEC_MARKER;

/// A structural model lowered from host-parsed `syn` files.
#[derive(Debug, Default)]
pub struct SourceModel {
    model: MemoryModel,
}

impl SourceModel {
    /// Lowers a set of parsed files into a model.
    ///
    /// All files of a round must be provided together: impl blocks and
    /// scope markers resolve against types from any file in the set.
    #[must_use]
    pub fn from_files(files: &[syn::File], sink: &mut DiagnosticSink) -> Self {
        let mut collector = Collector::default();
        for file in files {
            collector.walk(&file.items, None, sink);
        }
        Self {
            model: collector.assemble(sink),
        }
    }

    /// Registers a concrete container type as an abstract shape.
    pub fn register_shape_alias(&mut self, path: &Path, kind: ContainerKind) {
        self.model.register_shape_alias(path, kind);
    }

    /// Marks a type navigable without targeting it.
    pub fn mark_navigable(&mut self, path: &Path) {
        self.model.mark_navigable(path);
    }
}

impl StructuralModel for SourceModel {
    fn raw_type(&self, path: &Path) -> Option<&RawTypeInfo> {
        self.model.raw_type(path)
    }

    fn raw_spec(&self, name: &Ident) -> Option<&RawSpecInfo> {
        self.model.raw_spec(name)
    }

    fn shape_alias(&self, path: &Path) -> Option<ContainerKind> {
        self.model.shape_alias(path)
    }

    fn is_navigable(&self, path: &Path) -> bool {
        self.model.is_navigable(path)
    }

    fn targets(&self) -> Vec<GenerationTarget> {
        self.model.targets()
    }
}

#[derive(Default)]
struct Collector {
    types: Vec<RawTypeInfo>,
    impls: Vec<(Path, Vec<RawMethod>)>,
    specs: Vec<RawSpecInfo>,
    /// Type paths imported by markers that list other types.
    imported: Vec<(Path, Hint)>,
}

impl Collector {
    fn walk(&mut self, items: &[Item], module: Option<&str>, sink: &mut DiagnosticSink) {
        for item in items {
            match item {
                Item::Struct(item_struct) => self.collect_struct(item_struct, module, sink),
                Item::Enum(item_enum) => self.collect_enum(item_enum, module, sink),
                Item::Impl(item_impl) => self.collect_impl(item_impl, sink),
                Item::Trait(item_trait) => self.collect_trait(item_trait, module, sink),
                Item::Mod(item_mod) => {
                    if let Some((_, nested)) = &item_mod.content {
                        let nested_module = match module {
                            Some(parent) => format!("{parent}::{}", item_mod.ident),
                            None => item_mod.ident.to_string(),
                        };
                        self.walk(nested, Some(&nested_module), sink);
                    }
                }
                _ => {}
            }
        }
    }

    fn collect_struct(
        &mut self,
        item: &syn::ItemStruct,
        module: Option<&str>,
        sink: &mut DiagnosticSink,
    ) {
        let element = item.ident.to_string();
        let hints = extract_hints(&item.attrs, &element, sink);
        self.note_imports(&hints);

        let shape = match &item.fields {
            syn::Fields::Named(named) => RawShape::Struct {
                fields: named.named.iter().filter_map(raw_field).collect(),
            },
            syn::Fields::Unnamed(unnamed) => RawShape::TupleStruct {
                types: unnamed.unnamed.iter().map(|field| field.ty.clone()).collect(),
            },
            syn::Fields::Unit => RawShape::UnitStruct,
        };

        self.types.push(RawTypeInfo {
            path: qualified_path(module, &item.ident),
            shape,
            methods: Vec::new(),
            hints,
            module: module.map(ToString::to_string),
        });
    }

    fn collect_enum(
        &mut self,
        item: &syn::ItemEnum,
        module: Option<&str>,
        sink: &mut DiagnosticSink,
    ) {
        let element = item.ident.to_string();
        let hints = extract_hints(&item.attrs, &element, sink);
        self.note_imports(&hints);

        let variants = item
            .variants
            .iter()
            .map(|variant| RawVariant {
                name: variant.ident.clone(),
                payload: variant_payload(&variant.fields),
            })
            .collect();

        self.types.push(RawTypeInfo {
            path: qualified_path(module, &item.ident),
            shape: RawShape::Enum { variants },
            methods: Vec::new(),
            hints,
            module: module.map(ToString::to_string),
        });
    }

    fn collect_impl(&mut self, item: &syn::ItemImpl, sink: &mut DiagnosticSink) {
        // Trait impls carry no inherent methods.
        if item.trait_.is_some() {
            return;
        }
        let Type::Path(self_ty) = item.self_ty.as_ref() else {
            return;
        };
        let element = path_key(&self_ty.path);

        let methods = item
            .items
            .iter()
            .filter_map(|impl_item| match impl_item {
                syn::ImplItem::Fn(function) => Some(method_from_impl(function, &element, sink)),
                _ => None,
            })
            .collect();

        self.impls.push((self_ty.path.clone(), methods));
    }

    fn collect_trait(
        &mut self,
        item: &syn::ItemTrait,
        module: Option<&str>,
        sink: &mut DiagnosticSink,
    ) {
        let supertraits: Vec<Path> = item
            .supertraits
            .iter()
            .filter_map(|bound| match bound {
                syn::TypeParamBound::Trait(trait_bound) => Some(trait_bound.path.clone()),
                _ => None,
            })
            .collect();

        let is_spec = supertraits.iter().any(|supertrait| {
            supertrait
                .segments
                .last()
                .is_some_and(|segment| segment.ident == SPEC_MARKER)
        });
        if !is_spec {
            return;
        }

        let element = item.ident.to_string();
        let hints = extract_hints(&item.attrs, &element, sink);
        let methods = item
            .items
            .iter()
            .filter_map(|trait_item| match trait_item {
                syn::TraitItem::Fn(function) => {
                    Some(method_from_trait(function, &element, sink))
                }
                _ => None,
            })
            .collect();

        self.specs.push(RawSpecInfo {
            name: item.ident.clone(),
            supertraits,
            methods,
            hints,
            module: module.map(ToString::to_string),
        });
    }

    fn note_imports(&mut self, hints: &[Hint]) {
        for hint in hints {
            if let Hint::ImportOptics(import) = hint {
                for imported in &import.types {
                    self.imported.push((imported.clone(), hint.clone()));
                }
            }
        }
    }

    fn assemble(mut self, sink: &mut DiagnosticSink) -> MemoryModel {
        // Merge impl methods into their types by final path segment.
        for (impl_path, methods) in self.impls {
            let Some(name) = impl_path.segments.last().map(|segment| segment.ident.clone())
            else {
                continue;
            };
            if let Some(info) = self
                .types
                .iter_mut()
                .find(|info| info.name().is_some_and(|ident| *ident == name))
            {
                info.methods.extend(methods);
            }
        }

        // Attach marker hints to the types they import.
        let imported = std::mem::take(&mut self.imported);
        let mut unknown = Vec::new();
        for (path, hint) in imported {
            let Some(name) = path.segments.last().map(|segment| segment.ident.clone()) else {
                continue;
            };
            match self
                .types
                .iter_mut()
                .find(|info| info.name().is_some_and(|ident| *ident == name))
            {
                Some(info) => {
                    // The attached copy drops the import list: an empty list
                    // is what marks a type as its own generation target.
                    let mut attached = hint;
                    if let Hint::ImportOptics(import) = &mut attached {
                        import.types.clear();
                    }
                    info.hints.push(attached);
                }
                None => unknown.push(path_key(&path)),
            }
        }
        for path in unknown {
            sink.error(
                DiagnosticKind::HintInvalid,
                &path,
                "#[import_optics] names a type not present in the provided sources",
            );
        }

        // Register in declaration order: marked types become targets.
        let mut model = MemoryModel::new();
        for info in self.types {
            let targeted = info.hints.iter().any(
                |hint| matches!(hint, Hint::ImportOptics(import) if import.types.is_empty()),
            );
            if targeted {
                model.add_type(info);
            } else {
                model.add_support_type(info);
            }
        }
        for spec in self.specs {
            model.add_spec(spec);
        }
        model
    }
}

fn raw_field(field: &syn::Field) -> Option<RawField> {
    field.ident.as_ref().map(|ident| RawField {
        name: ident.clone(),
        ty: field.ty.clone(),
        public: matches!(field.vis, Visibility::Public(_)),
    })
}

fn variant_payload(fields: &syn::Fields) -> VariantPayload {
    match fields {
        syn::Fields::Unit => VariantPayload::Unit,
        syn::Fields::Unnamed(unnamed) => {
            let mut types: Vec<Type> =
                unnamed.unnamed.iter().map(|field| field.ty.clone()).collect();
            match types.len() {
                0 => VariantPayload::Unit,
                1 => VariantPayload::Single(types.remove(0)),
                _ => VariantPayload::Tuple(types),
            }
        }
        syn::Fields::Named(named) => VariantPayload::Record(
            named
                .named
                .iter()
                .filter_map(raw_field)
                .map(|mut field| {
                    // Variant fields share the enum's visibility.
                    field.public = true;
                    field
                })
                .collect(),
        ),
    }
}

fn method_from_impl(
    function: &syn::ImplItemFn,
    element: &str,
    sink: &mut DiagnosticSink,
) -> RawMethod {
    let (receiver, params, inputs) = signature_parts(&function.sig);
    RawMethod {
        name: function.sig.ident.clone(),
        receiver,
        params,
        inputs,
        ret: return_type(&function.sig.output),
        public: matches!(function.vis, Visibility::Public(_)),
        generic: !function.sig.generics.params.is_empty(),
        body: None,
        hints: extract_hints(&function.attrs, element, sink),
    }
}

fn method_from_trait(
    function: &syn::TraitItemFn,
    element: &str,
    sink: &mut DiagnosticSink,
) -> RawMethod {
    let (receiver, params, inputs) = signature_parts(&function.sig);
    let method_element = format!("{element}::{}", function.sig.ident);
    RawMethod {
        name: function.sig.ident.clone(),
        receiver,
        params,
        inputs,
        ret: return_type(&function.sig.output),
        public: true,
        generic: !function.sig.generics.params.is_empty(),
        body: function.default.clone(),
        hints: extract_hints(&function.attrs, &method_element, sink),
    }
}

fn signature_parts(signature: &syn::Signature) -> (SelfKind, Vec<Type>, Vec<FnArg>) {
    let mut receiver = SelfKind::None;
    let mut params = Vec::new();
    let mut inputs = Vec::new();

    for input in &signature.inputs {
        match input {
            FnArg::Receiver(this) => {
                receiver = match (&this.reference, &this.mutability) {
                    (Some(_), Some(_)) => SelfKind::RefMut,
                    (Some(_), None) => SelfKind::Ref,
                    (None, _) => SelfKind::Owned,
                };
            }
            FnArg::Typed(typed) => {
                params.push((*typed.ty).clone());
                inputs.push(input.clone());
            }
        }
    }

    (receiver, params, inputs)
}

fn return_type(output: &ReturnType) -> Option<Type> {
    match output {
        ReturnType::Default => None,
        ReturnType::Type(_, ty) => Some((**ty).clone()),
    }
}

fn qualified_path(module: Option<&str>, ident: &Ident) -> Path {
    let mut path = Path::from(ident.clone());
    if let Some(module) = module {
        let mut segments = syn::punctuated::Punctuated::new();
        for segment in module.split("::").filter(|segment| !segment.is_empty()) {
            segments.push(syn::PathSegment::from(Ident::new(segment, ident.span())));
        }
        segments.push(syn::PathSegment::from(ident.clone()));
        path.segments = segments;
    }
    path
}

#[cfg(test)]
mod tests {
    use syn::parse_quote;

    use super::*;
    use crate::model::TypeKind;

    #[test]
    fn marked_types_become_targets_and_impls_merge() {
        let file: syn::File = parse_quote! {
            #[import_optics]
            pub struct Date {
                year: i32,
            }

            impl Date {
                pub fn year(&self) -> i32 {
                    self.year
                }

                pub fn with_year(self, year: i32) -> Self {
                    Self { year, ..self }
                }
            }
        };

        let mut sink = DiagnosticSink::new();
        let model = SourceModel::from_files(&[file], &mut sink);
        assert!(!sink.has_errors());
        assert_eq!(model.targets().len(), 1);

        let info = model.raw_type(&parse_quote!(Date)).unwrap();
        assert_eq!(info.methods.len(), 2);

        let classifier = crate::classify::TypeClassifier::new(&model);
        let descriptor = classifier.classify(info);
        assert_eq!(descriptor.kind, TypeKind::MutableUpdate);
    }

    #[test]
    fn spec_traits_are_recognised_by_their_supertrait() {
        let file: syn::File = parse_quote! {
            pub trait PersonOpticsSpec: OpticsSpec<Person> {
                #[wither(method = "with_name", getter = "name")]
                fn name() -> impl Lens<Person, String>;
            }
        };

        let mut sink = DiagnosticSink::new();
        let model = SourceModel::from_files(&[file], &mut sink);
        let spec = model.raw_spec(&parse_quote!(PersonOpticsSpec)).unwrap();
        assert_eq!(spec.methods.len(), 1);
        assert!(spec.methods[0].body.is_none());
    }

    #[test]
    fn import_markers_target_listed_types() {
        let file: syn::File = parse_quote! {
            #[import_optics(types(Point))]
            pub struct OpticsImports;

            pub struct Point {
                pub x: i32,
                pub y: i32,
            }
        };

        let mut sink = DiagnosticSink::new();
        let model = SourceModel::from_files(&[file], &mut sink);
        assert!(!sink.has_errors());

        // The holder only imports; Point alone is targeted.
        let targets = model.targets();
        assert_eq!(targets.len(), 1);
        assert!(model.raw_type(&parse_quote!(Point)).is_some());
    }

    #[test]
    fn unknown_imported_types_are_diagnosed() {
        let file: syn::File = parse_quote! {
            #[import_optics(types(Missing))]
            pub struct OpticsImports;
        };

        let mut sink = DiagnosticSink::new();
        let _model = SourceModel::from_files(&[file], &mut sink);
        assert!(sink.has_errors());
    }
}
