//! Container shapes and their descriptors.
//!
//! A container is a field type a traversal can be generated for. The five
//! standard shapes map the canonical std containers; concrete container
//! types outside this table are recognised through the structural model's
//! shape aliases instead.

use syn::Type;

/// The abstract shape of a container type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerKind {
    /// Ordered sequence, canonically `Vec<A>`.
    List,
    /// Unordered unique set, canonically `HashSet<A>` or `BTreeSet<A>`.
    Set,
    /// Zero-or-one, canonically `Option<A>`.
    Optional,
    /// Key-value mapping, canonically `HashMap<K, V>` or `BTreeMap<K, V>`.
    Map,
    /// Fixed-size array `[A; N]`.
    Array,
}

impl ContainerKind {
    /// All standard shapes, used when a diagnostic enumerates alternatives.
    pub const ALL: [Self; 5] = [
        Self::List,
        Self::Set,
        Self::Optional,
        Self::Map,
        Self::Array,
    ];

    /// Which type argument the traversal focuses on.
    ///
    /// For two-argument containers this is a per-kind choice: maps traverse
    /// their values, so `Map` focuses argument 1; every other shape focuses
    /// argument 0.
    #[must_use]
    pub const fn focus_argument(self) -> usize {
        match self {
            Self::Map => 1,
            Self::List | Self::Set | Self::Optional | Self::Array => 0,
        }
    }

    /// How many type arguments the canonical shape carries.
    #[must_use]
    pub const fn arity(self) -> usize {
        match self {
            Self::Map => 2,
            Self::List | Self::Set | Self::Optional | Self::Array => 1,
        }
    }

    /// The canonical name used in diagnostics.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::List => "Vec",
            Self::Set => "HashSet/BTreeSet",
            Self::Optional => "Option",
            Self::Map => "HashMap/BTreeMap",
            Self::Array => "[T; N]",
        }
    }

    /// Maps a canonical container identifier to its shape.
    ///
    /// This is the exact-shape table: only the canonical identities match,
    /// never a concrete implementation registered elsewhere.
    #[must_use]
    pub fn from_canonical_ident(ident: &str) -> Option<Self> {
        match ident {
            "Vec" => Some(Self::List),
            "HashSet" | "BTreeSet" => Some(Self::Set),
            "Option" => Some(Self::Optional),
            "HashMap" | "BTreeMap" => Some(Self::Map),
            _ => None,
        }
    }
}

/// A detected container field: its shape and focus type argument(s).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerDescriptor {
    /// The abstract shape.
    pub kind: ContainerKind,
    /// The type the traversal focuses on.
    pub focus: Type,
    /// The key type, present only for `Map`.
    pub key: Option<Type>,
}

impl ContainerDescriptor {
    /// Creates a descriptor for a single-argument container.
    #[must_use]
    pub const fn new(kind: ContainerKind, focus: Type) -> Self {
        Self {
            kind,
            focus,
            key: None,
        }
    }

    /// Creates a descriptor for a map, focusing the value type.
    #[must_use]
    pub const fn for_map(key: Type, value: Type) -> Self {
        Self {
            kind: ContainerKind::Map,
            focus: value,
            key: Some(key),
        }
    }
}

/// Renders the supported-shape list for diagnostics.
#[must_use]
pub fn supported_shapes() -> String {
    let labels: Vec<&str> = ContainerKind::ALL.iter().map(|kind| kind.label()).collect();
    labels.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_focuses_values() {
        assert_eq!(ContainerKind::Map.focus_argument(), 1);
        assert_eq!(ContainerKind::List.focus_argument(), 0);
    }

    #[test]
    fn canonical_table_rejects_unknown_idents() {
        assert_eq!(
            ContainerKind::from_canonical_ident("Vec"),
            Some(ContainerKind::List)
        );
        assert_eq!(ContainerKind::from_canonical_ident("VecDeque"), None);
        assert_eq!(ContainerKind::from_canonical_ident("ArrayList"), None);
    }
}
