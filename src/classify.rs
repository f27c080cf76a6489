//! Shape classification for source types.
//!
//! The classifier turns a [`RawTypeInfo`] into a [`TypeDescriptor`] using a
//! fixed priority order: product shape, then closed sum, then enumeration
//! constants, then the mutable-with-updaters scan, then unsupported. It also
//! owns container detection, in two modes: exact (canonical identities only)
//! and model-aware (consulting the structural model's registered shape
//! aliases so concrete container types read as their abstract shape).
//!
//! Classification is pure: it never reports diagnostics and never performs
//! I/O. Unsupported shapes classify as [`TypeKind::Unsupported`] and are
//! diagnosed downstream by whoever asked for generation.

use syn::{GenericArgument, Ident, PathArguments, Type};

use crate::model::container::{ContainerDescriptor, ContainerKind};
use crate::model::structural::{strip_reference, StructuralModel};
use crate::model::{
    path_key, type_key, Accessor, CopyStrategy, FieldDescriptor, RawShape, RawTypeInfo, RawVariant,
    SelfKind, TypeDescriptor, TypeKind, UpdaterPair, VariantDescriptor,
};

/// Classifies raw types against a structural model.
pub struct TypeClassifier<'m> {
    model: &'m dyn StructuralModel,
}

impl<'m> TypeClassifier<'m> {
    /// Creates a classifier over `model`.
    #[must_use]
    pub const fn new(model: &'m dyn StructuralModel) -> Self {
        Self { model }
    }

    /// Classifies a raw type into a descriptor.
    #[must_use]
    pub fn classify(&self, raw: &RawTypeInfo) -> TypeDescriptor {
        let has_mutable_fields = detect_mutable_fields(raw);

        match &raw.shape {
            RawShape::Struct { fields }
                if !fields.is_empty() && fields.iter().all(|field| field.public) =>
            {
                self.classify_product(raw, has_mutable_fields)
            }
            RawShape::Enum { variants } if !variants.is_empty() => {
                Self::classify_enum(raw, variants, has_mutable_fields)
            }
            _ => self.classify_updater_struct(raw, has_mutable_fields),
        }
    }

    fn classify_product(&self, raw: &RawTypeInfo, has_mutable_fields: bool) -> TypeDescriptor {
        let fields = match &raw.shape {
            RawShape::Struct { fields } => fields
                .iter()
                .map(|field| FieldDescriptor {
                    name: field.name.clone(),
                    ty: field.ty.clone(),
                    accessor: Accessor::Field,
                    copy_strategy: CopyStrategy::CanonicalConstructor,
                    container: self.detect_container_with_model(&field.ty),
                })
                .collect(),
            _ => Vec::new(),
        };

        TypeDescriptor {
            path: raw.path.clone(),
            kind: TypeKind::Product,
            fields,
            variants: Vec::new(),
            updaters: Vec::new(),
            has_mutable_fields,
            module: raw.module.clone(),
        }
    }

    fn classify_enum(
        raw: &RawTypeInfo,
        variants: &[RawVariant],
        has_mutable_fields: bool,
    ) -> TypeDescriptor {
        let kind = if variants.iter().all(|variant| variant.payload.is_unit()) {
            TypeKind::Enumeration
        } else {
            TypeKind::Sum
        };

        TypeDescriptor {
            path: raw.path.clone(),
            kind,
            fields: Vec::new(),
            variants: variants
                .iter()
                .map(|variant| VariantDescriptor {
                    name: variant.name.clone(),
                    payload: variant.payload.clone(),
                })
                .collect(),
            updaters: Vec::new(),
            has_mutable_fields,
            module: raw.module.clone(),
        }
    }

    fn classify_updater_struct(&self, raw: &RawTypeInfo, has_mutable_fields: bool) -> TypeDescriptor {
        let updaters = detect_updaters(raw);
        if updaters.is_empty() {
            return TypeDescriptor {
                path: raw.path.clone(),
                kind: TypeKind::Unsupported,
                fields: Vec::new(),
                variants: Vec::new(),
                updaters: Vec::new(),
                has_mutable_fields,
                module: raw.module.clone(),
            };
        }

        let fields = updaters
            .iter()
            .map(|pair| FieldDescriptor {
                name: pair.field.clone(),
                ty: pair.param_ty.clone(),
                accessor: Accessor::Method(pair.getter.clone()),
                copy_strategy: CopyStrategy::Wither,
                container: self.detect_container_with_model(&pair.param_ty),
            })
            .collect();

        TypeDescriptor {
            path: raw.path.clone(),
            kind: TypeKind::MutableUpdate,
            fields,
            variants: Vec::new(),
            updaters,
            has_mutable_fields,
            module: raw.module.clone(),
        }
    }

    /// Container detection that also recognises registered shape aliases.
    ///
    /// Exact shapes win; otherwise the final path segment is looked up in the
    /// model's alias registry. Raw (unparameterised) uses never match in
    /// either mode.
    #[must_use]
    pub fn detect_container_with_model(&self, ty: &Type) -> Option<ContainerDescriptor> {
        if let Some(descriptor) = detect_container(ty) {
            return Some(descriptor);
        }

        let Type::Path(type_path) = ty else {
            return None;
        };
        if type_path.qself.is_some() {
            return None;
        }
        let kind = self.model.shape_alias(&type_path.path)?;
        let args = type_arguments(ty);
        descriptor_for(kind, &args)
    }
}

/// Exact-shape container detection: only the canonical container identities
/// match (`Vec`, `HashSet`/`BTreeSet`, `Option`, `HashMap`/`BTreeMap`,
/// `[T; N]`), never a concrete implementation.
#[must_use]
pub fn detect_container(ty: &Type) -> Option<ContainerDescriptor> {
    if let Type::Array(array) = ty {
        return Some(ContainerDescriptor::new(
            ContainerKind::Array,
            (*array.elem).clone(),
        ));
    }

    let Type::Path(type_path) = ty else {
        return None;
    };
    if type_path.qself.is_some() {
        return None;
    }
    let segment = type_path.path.segments.last()?;
    let kind = ContainerKind::from_canonical_ident(&segment.ident.to_string())?;
    let args = type_arguments(ty);
    descriptor_for(kind, &args)
}

/// Detects the `with_<field>` updater pairs on a raw type.
///
/// A qualifying updater is public, takes a self receiver and exactly one
/// further parameter, and returns the declaring type (or `Self`). It must
/// pair with a public, parameterless `&self` accessor (`field()`,
/// `get_field()`, or `is_field()`) whose return type is exactly the
/// updater's parameter type, by value or behind a shared borrow. Candidates
/// without an accessor are discarded.
#[must_use]
pub fn detect_updaters(raw: &RawTypeInfo) -> Vec<UpdaterPair> {
    let mut pairs = Vec::new();
    let self_key = path_key(&raw.path);
    let simple_name = raw.name().map(ToString::to_string);

    for method in &raw.methods {
        let name = method.name.to_string();
        let Some(field_name) = name.strip_prefix("with_") else {
            continue;
        };
        // The remainder must itself be a legal field identifier.
        if !field_name
            .chars()
            .next()
            .is_some_and(|first| first.is_ascii_alphabetic() || first == '_')
        {
            continue;
        }
        if !method.public || method.receiver == SelfKind::None || method.params.len() != 1 {
            continue;
        }
        let Some(ret) = &method.ret else {
            continue;
        };
        if !returns_declaring_type(ret, &self_key, simple_name.as_deref()) {
            continue;
        }

        let param_ty = &method.params[0];
        let Some(getter) = find_accessor(raw, field_name, param_ty) else {
            continue;
        };

        pairs.push(UpdaterPair {
            field: Ident::new(field_name, method.name.span()),
            wither: method.name.clone(),
            getter,
            param_ty: param_ty.clone(),
        });
    }

    pairs
}

/// Whether the type has any `set_*` mutator: public, `&mut self`, exactly
/// one parameter, unit return. Detection never blocks classification; it
/// gates a validation error for mutable-update types downstream.
#[must_use]
pub fn detect_mutable_fields(raw: &RawTypeInfo) -> bool {
    raw.methods.iter().any(|method| {
        let name = method.name.to_string();
        name.strip_prefix("set_").is_some_and(|rest| !rest.is_empty())
            && method.public
            && method.receiver == SelfKind::RefMut
            && method.params.len() == 1
            && method.ret.is_none()
    })
}

fn find_accessor(raw: &RawTypeInfo, field_name: &str, expected: &Type) -> Option<Ident> {
    let candidates = [
        field_name.to_string(),
        format!("get_{field_name}"),
        format!("is_{field_name}"),
    ];
    let expected_key = type_key(expected);

    for method in &raw.methods {
        let name = method.name.to_string();
        if !candidates.contains(&name) {
            continue;
        }
        if !method.public || method.receiver != SelfKind::Ref || !method.params.is_empty() {
            continue;
        }
        let Some(ret) = &method.ret else {
            continue;
        };
        if type_key(strip_reference(ret)) == expected_key {
            return Some(method.name.clone());
        }
    }

    None
}

fn returns_declaring_type(ret: &Type, self_key: &str, simple_name: Option<&str>) -> bool {
    let key = type_key(ret);
    key == "Self" || key == self_key || simple_name.is_some_and(|name| key == name)
}

pub(crate) fn type_arguments(ty: &Type) -> Vec<Type> {
    let Type::Path(type_path) = ty else {
        return Vec::new();
    };
    let Some(segment) = type_path.path.segments.last() else {
        return Vec::new();
    };
    let PathArguments::AngleBracketed(arguments) = &segment.arguments else {
        return Vec::new();
    };
    arguments
        .args
        .iter()
        .filter_map(|argument| match argument {
            GenericArgument::Type(ty) => Some(ty.clone()),
            _ => None,
        })
        .collect()
}

fn descriptor_for(kind: ContainerKind, args: &[Type]) -> Option<ContainerDescriptor> {
    match kind {
        ContainerKind::Map => {
            if args.len() >= 2 {
                Some(ContainerDescriptor::for_map(args[0].clone(), args[1].clone()))
            } else {
                None
            }
        }
        ContainerKind::List | ContainerKind::Set | ContainerKind::Optional => args
            .first()
            .map(|focus| ContainerDescriptor::new(kind, focus.clone())),
        // Arrays are matched structurally, never by path.
        ContainerKind::Array => None,
    }
}

#[cfg(test)]
mod tests {
    use syn::parse_quote;

    use super::*;

    #[test]
    fn exact_detection_matches_canonical_shapes() {
        let vec: Type = parse_quote!(Vec<String>);
        let detected = detect_container(&vec).unwrap();
        assert_eq!(detected.kind, ContainerKind::List);
        assert_eq!(type_key(&detected.focus), "String");

        let map: Type = parse_quote!(std::collections::HashMap<String, u64>);
        let detected = detect_container(&map).unwrap();
        assert_eq!(detected.kind, ContainerKind::Map);
        assert_eq!(type_key(&detected.focus), "u64");

        let array: Type = parse_quote!([u8; 16]);
        assert_eq!(detect_container(&array).unwrap().kind, ContainerKind::Array);
    }

    #[test]
    fn raw_containers_never_match() {
        let raw: Type = parse_quote!(Vec);
        assert!(detect_container(&raw).is_none());
    }

    #[test]
    fn concrete_containers_need_an_alias() {
        let concrete: Type = parse_quote!(SmallVec<u8>);
        assert!(detect_container(&concrete).is_none());
    }
}
