#[macro_use]
mod macros;

use std::fmt;

///
/// PrimitiveKind
///
/// Canonical primitive tag shared by values, criteria and shapes.
/// Variant order is registry order and doubles as the canonical ordering of
/// kind sets.
///

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum PrimitiveKind {
    Bool,
    Number,
    Text,
    Null,
    Undefined,
}

impl PrimitiveKind {
    /// Return the full metadata descriptor for one primitive kind.
    #[must_use]
    pub const fn metadata(self) -> PrimitiveMetadata {
        primitive_kind_registry!(metadata_from_registry, self)
    }

    /// Stable lowercase label used by canonical text and wire formats.
    #[must_use]
    pub const fn label(self) -> &'static str {
        self.metadata().label
    }

    /// Resolve a kind from its stable label.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        primitive_kind_registry!(from_label_from_registry, label)
    }

    #[must_use]
    pub const fn supports_equality(self) -> bool {
        self.metadata().supports_equality
    }

    /// Return whether values of this kind admit interval predicates.
    #[must_use]
    pub const fn supports_ordering(self) -> bool {
        self.metadata().supports_ordering
    }

    #[must_use]
    pub const fn is_nullish(self) -> bool {
        self.metadata().is_nullish
    }

    /// Narrow to the range-capable subset, if this kind is orderable.
    #[must_use]
    pub const fn range_kind(self) -> Option<RangeKind> {
        match self {
            Self::Number => Some(RangeKind::Number),
            Self::Text => Some(RangeKind::Text),
            Self::Bool | Self::Null | Self::Undefined => None,
        }
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

///
/// PrimitiveMetadata
///
/// Capability metadata shared across value, criterion and shape layers.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PrimitiveMetadata {
    pub label: &'static str,
    pub supports_equality: bool,
    pub supports_ordering: bool,
    pub is_nullish: bool,
}

///
/// RangeKind
///
/// Primitive kinds an interval can range over.
///

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum RangeKind {
    Number,
    Text,
}

impl RangeKind {
    #[must_use]
    pub const fn primitive(self) -> PrimitiveKind {
        match self {
            Self::Number => PrimitiveKind::Number,
            Self::Text => PrimitiveKind::Text,
        }
    }
}

impl fmt::Display for RangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.primitive().label())
    }
}

/// Ordered list of all primitive kinds in registry order.
pub const ALL_PRIMITIVE_KINDS: [PrimitiveKind; 5] =
    primitive_kind_registry!(all_kinds_from_registry);

///
/// TESTS
///
