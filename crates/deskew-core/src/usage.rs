//! Node usage accounting — capacity, consumption, and utilization percentages.

use std::collections::BTreeMap;

use crate::resources::{ResourceAmounts, ResourceKind};

/// A node as seen in the cluster snapshot: identity, schedulability, and
/// declared resource amounts.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct NodeInfo {
    pub id: String,
    /// False when the orchestration layer has marked the node unschedulable.
    pub schedulable: bool,
    pub capacity: ResourceAmounts,
    pub allocatable: ResourceAmounts,
}

/// A node annotated with the resources its resident workloads consume and
/// the derived per-kind utilization. Recomputed every run, never persisted.
#[derive(Debug, Clone)]
pub struct NodeUsage {
    pub node: NodeInfo,
    /// Summed requests of all resident workloads, per kind.
    pub usage: ResourceAmounts,
    /// `usage / allocatable * 100`, per kind of interest.
    pub utilization: BTreeMap<ResourceKind, f64>,
}

impl NodeUsage {
    /// Build a `NodeUsage` from a node and its summed workload requests,
    /// deriving utilization for the given kinds.
    pub fn compute(node: NodeInfo, usage: ResourceAmounts, kinds: &[ResourceKind]) -> Self {
        let utilization = utilization_percentages(&node, &usage, kinds);
        Self { node, usage, utilization }
    }

    pub fn utilization_of(&self, kind: &ResourceKind) -> f64 {
        self.utilization.get(kind).copied().unwrap_or(0.0)
    }

    /// Subtract an evicted workload's requests from this node's bookkeeping
    /// and refresh the derived percentages.
    pub fn debit(&mut self, requests: &ResourceAmounts) {
        self.usage.saturating_sub(requests);
        let kinds: Vec<ResourceKind> = self.utilization.keys().cloned().collect();
        self.utilization = utilization_percentages(&self.node, &self.usage, &kinds);
    }
}

/// Per-kind utilization percentage for a node.
///
/// Covers exactly the requested kinds. A kind with zero allocatable yields
/// 0.0 rather than a division fault; such resources are uninteresting for
/// rebalancing. The result is intentionally not clamped to 100 — an
/// over-committed node legally exceeds it.
pub fn utilization_percentages(
    node: &NodeInfo,
    usage: &ResourceAmounts,
    kinds: &[ResourceKind],
) -> BTreeMap<ResourceKind, f64> {
    let mut out = BTreeMap::new();
    for kind in kinds {
        let allocatable = node.allocatable.get(kind);
        let pct = if allocatable <= 0 {
            0.0
        } else {
            usage.get(kind) as f64 / allocatable as f64 * 100.0
        };
        out.insert(kind.clone(), pct);
    }
    out
}
