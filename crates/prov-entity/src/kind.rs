//! Per-kind behavior descriptors
//!
//! Each kind enum (artifact, group, process) maps to a [`KindDescriptor`]
//! through an exhaustive match, so a kind cannot exist without naming
//! behavior.

/// Naming behavior for one concrete entity kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KindDescriptor {
    /// Stable lowercase code used in serialization
    pub code: &'static str,
    /// Human-readable label
    pub label: &'static str,
}

impl KindDescriptor {
    /// Build a descriptor
    #[inline]
    #[must_use]
    pub const fn new(code: &'static str, label: &'static str) -> Self {
        Self { code, label }
    }
}
