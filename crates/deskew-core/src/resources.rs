//! Resource kinds and amounts.
//!
//! All accounting in the rebalancer runs over `ResourceAmounts` maps keyed
//! by `ResourceKind`. CPU amounts are carried at milli-unit granularity
//! (1 core = 1000), memory in bytes, pods as a plain count. Extended
//! resources (vendor kinds like `example.com/foo`) use the same integer
//! arithmetic as pods.

use std::collections::BTreeMap;
use std::fmt;

/// A resource kind: one of the three well-known kinds or an arbitrary
/// named extended resource.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
#[serde(into = "String", from = "String")]
pub enum ResourceKind {
    Cpu,
    Memory,
    Pods,
    /// Any other named resource, e.g. `example.com/foo`.
    Extended(String),
}

impl ResourceKind {
    /// The resolved name of the kind.
    pub fn name(&self) -> &str {
        match self {
            ResourceKind::Cpu => "cpu",
            ResourceKind::Memory => "memory",
            ResourceKind::Pods => "pods",
            ResourceKind::Extended(name) => name,
        }
    }

    /// Whether this is one of the three well-known kinds.
    pub fn is_basic(&self) -> bool {
        matches!(self, ResourceKind::Cpu | ResourceKind::Memory | ResourceKind::Pods)
    }

    /// Whether this is a vendor extended resource (domain-qualified name).
    ///
    /// Standard orchestrator kinds carry bare names; extended resources are
    /// always qualified (`vendor.example/thing`). A bare name that is not
    /// cpu/memory/pods is a standard kind this engine does not rebalance.
    pub fn is_extended(&self) -> bool {
        matches!(self, ResourceKind::Extended(name) if name.contains('/'))
    }

    /// The three well-known kinds, in canonical order.
    pub fn basic() -> [ResourceKind; 3] {
        [ResourceKind::Cpu, ResourceKind::Memory, ResourceKind::Pods]
    }

    /// Parse a kind from its name.
    pub fn parse(name: &str) -> ResourceKind {
        match name {
            "cpu" => ResourceKind::Cpu,
            "memory" => ResourceKind::Memory,
            "pods" => ResourceKind::Pods,
            other => ResourceKind::Extended(other.to_string()),
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<String> for ResourceKind {
    fn from(name: String) -> Self {
        ResourceKind::parse(&name)
    }
}

impl From<ResourceKind> for String {
    fn from(kind: ResourceKind) -> Self {
        kind.name().to_string()
    }
}

/// Per-kind integer amounts with deterministic iteration order.
///
/// Amounts are non-negative by construction: subtraction saturates at zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct ResourceAmounts(BTreeMap<ResourceKind, i64>);

impl ResourceAmounts {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Builder-style insert, handy for fixtures and defaults.
    pub fn with(mut self, kind: ResourceKind, amount: i64) -> Self {
        self.set(kind, amount);
        self
    }

    /// The amount for a kind; absent kinds read as zero.
    pub fn get(&self, kind: &ResourceKind) -> i64 {
        self.0.get(kind).copied().unwrap_or(0)
    }

    pub fn set(&mut self, kind: ResourceKind, amount: i64) {
        self.0.insert(kind, amount.max(0));
    }

    pub fn contains(&self, kind: &ResourceKind) -> bool {
        self.0.contains_key(kind)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Add another amounts map into this one, kind by kind.
    pub fn add(&mut self, other: &ResourceAmounts) {
        for (kind, amount) in &other.0 {
            *self.0.entry(kind.clone()).or_insert(0) += amount;
        }
    }

    /// Subtract another amounts map, clamping every kind at zero.
    pub fn saturating_sub(&mut self, other: &ResourceAmounts) {
        for (kind, amount) in &other.0 {
            if let Some(current) = self.0.get_mut(kind) {
                *current = (*current - amount).max(0);
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ResourceKind, i64)> {
        self.0.iter().map(|(k, v)| (k, *v))
    }

    pub fn kinds(&self) -> impl Iterator<Item = &ResourceKind> {
        self.0.keys()
    }
}

impl FromIterator<(ResourceKind, i64)> for ResourceAmounts {
    fn from_iter<I: IntoIterator<Item = (ResourceKind, i64)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k, v.max(0))).collect())
    }
}
