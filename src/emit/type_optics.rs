//! Per-shape emitters for structurally-described types.
//!
//! One file per analysed type: products get a lens fn, a `with_` mutator,
//! and (where a pluggable generator matches) a traversal fn per field; sums
//! and enumerations get a prism fn per variant; mutable-update types get
//! wither-strategy lenses and mutators. Items are emitted strictly in
//! declaration order.

use proc_macro2::TokenStream;
use quote::quote;
use syn::Path;

use super::{optics_file_stem, relative_path, to_snake_case, EmittedFile, FileBuilder};
use crate::diag::{DiagnosticKind, DiagnosticSink};
use crate::model::hints::ImportOpticsHint;
use crate::model::structural::StructuralModel;
use crate::model::{path_key, FieldDescriptor, TypeDescriptor, TypeKind};
use crate::navigator::{NavigatorGenerator, NavigatorOptions};
use crate::strategy::traversal::{compose_with_lens, focus_type, TraversalRegistry};
use crate::strategy::{copy, prism};

/// Per-type emission options, resolved from the scope marker and the
/// pipeline defaults.
#[derive(Debug, Clone, Default)]
pub struct EmitOptions {
    /// Explicit target module; the type's own module otherwise.
    pub target_module: Option<String>,
    /// Navigator generation, when requested.
    pub navigators: Option<NavigatorOptions>,
    /// Permits mutable-update generation despite detected `set_*` methods.
    pub allow_mutable: bool,
}

impl EmitOptions {
    /// Resolves options from an `#[import_optics]` scope marker.
    #[must_use]
    pub fn from_import_hint(hint: &ImportOpticsHint) -> Self {
        Self {
            target_module: hint.target_module.clone(),
            navigators: hint.navigators.then(|| {
                NavigatorOptions::new(hint.max_depth)
                    .with_include(hint.include_fields.iter().cloned())
                    .with_exclude(hint.exclude_fields.iter().cloned())
            }),
            allow_mutable: hint.allow_mutable,
        }
    }
}

/// Emits optics files for classified types.
pub struct TypeOpticsEmitter<'m, 'r> {
    model: &'m dyn StructuralModel,
    registry: &'r TraversalRegistry,
    runtime: Path,
}

impl<'m, 'r> TypeOpticsEmitter<'m, 'r> {
    /// Creates an emitter generating against `runtime`.
    #[must_use]
    pub const fn new(
        model: &'m dyn StructuralModel,
        registry: &'r TraversalRegistry,
        runtime: Path,
    ) -> Self {
        Self {
            model,
            registry,
            runtime,
        }
    }

    /// Assembles the optics file for one classified type, or attaches a
    /// diagnostic and returns `None` when the type cannot be emitted.
    #[must_use]
    pub fn emit(
        &self,
        descriptor: &TypeDescriptor,
        options: &EmitOptions,
        sink: &mut DiagnosticSink,
    ) -> Option<EmittedFile> {
        let element = path_key(&descriptor.path);

        match descriptor.kind {
            TypeKind::Unsupported => {
                sink.error(
                    DiagnosticKind::ClassificationFailure,
                    &element,
                    "optics cannot be generated for this shape; supported shapes: \
                     structs with all-public named fields, enums, and structs with \
                     `with_*` updater methods paired with accessors",
                );
                None
            }
            TypeKind::MutableUpdate if descriptor.has_mutable_fields && !options.allow_mutable => {
                sink.error(
                    DiagnosticKind::ClassificationFailure,
                    &element,
                    "type declares `set_*` mutators; optics over mutable state are \
                     refused unless the scope marker sets `allow_mutable`",
                );
                None
            }
            TypeKind::Product => Some(self.emit_product(descriptor, options, sink)),
            TypeKind::Sum | TypeKind::Enumeration => Some(self.emit_variants(descriptor, options)),
            TypeKind::MutableUpdate => Some(self.emit_mutable(descriptor, options)),
        }
    }

    fn emit_product(
        &self,
        descriptor: &TypeDescriptor,
        options: &EmitOptions,
        sink: &mut DiagnosticSink,
    ) -> EmittedFile {
        let runtime = &self.runtime;
        let source = &descriptor.path;
        let mut builder = Self::file_builder(descriptor);
        let field_names: Vec<syn::Ident> = descriptor
            .fields
            .iter()
            .map(|field| field.name.clone())
            .collect();

        let navigators = options.navigators.as_ref().map(|navigator_options| {
            NavigatorGenerator::new(self.model, self.runtime.clone(), navigator_options.clone())
        });

        // Lens per field, in declaration order.
        for field in &descriptor.fields {
            let name = &field.name;
            let ty = &field.ty;
            let getter = copy::getter_fragment(source, name, &field.accessor);
            let setter = copy::canonical_setter(source, ty, &field_names, name);
            let lens = copy::lens_expr(runtime, &getter, &setter);
            let doc = format!(
                " Creates a lens for the `{name}` field of `{}`.",
                path_key(source)
            );
            builder.push(quote! {
                #[doc = #doc]
                pub fn #name() -> impl #runtime::Lens<#source, #ty> + Clone {
                    #lens
                }
            });

            if let Some(generator) = navigators.as_ref() {
                if let Some(accessor) = generator.root_accessor(descriptor, field, &lens) {
                    builder.push(accessor);
                }
            }
        }

        // Convenience mutator per field.
        for field in &descriptor.fields {
            builder.import(format!("{}::Lens as _", path_key(runtime)));
            builder.push(Self::with_fn(descriptor, field));
        }

        // Traversal per container field with a matching generator.
        for field in &descriptor.fields {
            self.push_field_traversal(&mut builder, descriptor, field, sink);
        }

        if let Some(generator) = navigators.as_ref() {
            for item in generator.navigator_items(descriptor) {
                builder.push(item);
            }
        }

        Self::finish(descriptor, options, builder)
    }

    fn emit_variants(&self, descriptor: &TypeDescriptor, options: &EmitOptions) -> EmittedFile {
        let runtime = &self.runtime;
        let source = &descriptor.path;
        let mut builder = Self::file_builder(descriptor);

        for variant in &descriptor.variants {
            let method = syn::Ident::new(
                &to_snake_case(&variant.name.to_string()),
                variant.name.span(),
            );
            let focus = prism::variant_focus_type(&variant.payload);
            let body = prism::variant_prism_expr(runtime, source, variant);
            let doc = format!(
                " Creates a prism for the `{}` case of `{}`.",
                variant.name,
                path_key(source)
            );
            builder.push(quote! {
                #[doc = #doc]
                pub fn #method() -> impl #runtime::Prism<#source, #focus> + Clone {
                    #body
                }
            });
        }

        Self::finish(descriptor, options, builder)
    }

    fn emit_mutable(&self, descriptor: &TypeDescriptor, options: &EmitOptions) -> EmittedFile {
        let runtime = &self.runtime;
        let source = &descriptor.path;
        let mut builder = Self::file_builder(descriptor);

        for (field, pair) in descriptor.fields.iter().zip(&descriptor.updaters) {
            let name = &field.name;
            let ty = &field.ty;
            let getter = copy::getter_fragment(source, name, &field.accessor);
            let setter = copy::wither_setter(source, ty, &pair.wither);
            let lens = copy::lens_expr(runtime, &getter, &setter);
            let doc = format!(
                " Creates a lens for the `{name}` field of `{}`, rebuilding through \
                 `{wither}`.",
                path_key(source),
                wither = pair.wither,
            );
            builder.push(quote! {
                #[doc = #doc]
                pub fn #name() -> impl #runtime::Lens<#source, #ty> + Clone {
                    #lens
                }
            });
        }

        for field in &descriptor.fields {
            builder.import(format!("{}::Lens as _", path_key(runtime)));
            builder.push(Self::with_fn(descriptor, field));
        }

        Self::finish(descriptor, options, builder)
    }

    fn with_fn(descriptor: &TypeDescriptor, field: &FieldDescriptor) -> TokenStream {
        let source = &descriptor.path;
        let name = &field.name;
        let ty = &field.ty;
        let method = quote::format_ident!("with_{name}");
        let doc = format!(
            " Creates a new `{}` with an updated `{name}` field, through the \
             `{name}` lens.",
            path_key(source)
        );
        quote! {
            #[doc = #doc]
            pub fn #method(source: #source, value: #ty) -> #source {
                #name().set(source, value)
            }
        }
    }

    fn push_field_traversal(
        &self,
        builder: &mut FileBuilder,
        descriptor: &TypeDescriptor,
        field: &FieldDescriptor,
        sink: &mut DiagnosticSink,
    ) {
        let Some(container) = &field.container else {
            return;
        };
        let Some(generator) = self.registry.resolve(container) else {
            // Isolation: a container without a generator skips its own
            // traversal only.
            sink.note(
                DiagnosticKind::ContainerUndetectable,
                format!("{}::{}", path_key(&descriptor.path), field.name),
                "no registered traversal generator matches this container shape",
            );
            return;
        };
        let Some(focus) = focus_type(&field.ty, generator.focus_argument) else {
            return;
        };

        let runtime = &self.runtime;
        let source = &descriptor.path;
        let name = &field.name;
        let ty = &field.ty;
        let field_names: Vec<syn::Ident> = descriptor
            .fields
            .iter()
            .map(|descriptor_field| descriptor_field.name.clone())
            .collect();
        let getter = copy::getter_fragment(source, name, &field.accessor);
        let setter = copy::canonical_setter(source, ty, &field_names, name);
        let lens = copy::lens_expr(runtime, &getter, &setter);
        let each = (generator.each_expr)(runtime, container);
        let body = compose_with_lens(&lens, &each);
        let method = quote::format_ident!("{name}_traversal");
        let doc = format!(
            " Creates a traversal over every element of the `{name}` field of `{}`.",
            path_key(source)
        );

        builder.import(format!("{}::LensComposeWithTraversal as _", path_key(runtime)));
        builder.push(quote! {
            #[doc = #doc]
            pub fn #method() -> impl #runtime::Traversal<#source, #focus> + Clone {
                #body
            }
        });
    }

    fn file_builder(descriptor: &TypeDescriptor) -> FileBuilder {
        FileBuilder::new(format!("Optics for `{}`.", path_key(&descriptor.path)))
    }

    fn finish(
        descriptor: &TypeDescriptor,
        options: &EmitOptions,
        builder: FileBuilder,
    ) -> EmittedFile {
        let name = descriptor
            .name()
            .map_or_else(|| "type".to_string(), ToString::to_string);
        let stem = optics_file_stem(&name);
        let module = options
            .target_module
            .as_deref()
            .or(descriptor.module.as_deref());
        EmittedFile {
            relative_path: relative_path(module, &stem),
            contents: builder.render(),
        }
    }
}
