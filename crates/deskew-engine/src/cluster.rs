//! Collaborator boundaries — workload enumeration and the eviction action.
//!
//! The engine never talks to the orchestration API itself. It reads
//! workloads through `WorkloadLister` and requests removals through
//! `Evictor`; retries, backoff, and policy details (critical workloads,
//! daemon-managed pods) live behind those traits.

use thiserror::Error;

use deskew_core::resources::{ResourceAmounts, ResourceKind};
use deskew_core::usage::NodeInfo;

/// A workload resident on a node, as a removal candidate.
///
/// Owned by the orchestration system; the engine only reads requests and
/// priority and asks the evictor to remove it.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Workload {
    pub id: String,
    pub node_id: String,
    pub priority: i32,
    /// Requested resources per kind (cpu in millis, memory in bytes).
    pub requests: ResourceAmounts,
}

impl Workload {
    /// The amounts an eviction frees up: the declared requests plus the one
    /// pod slot every workload occupies.
    pub fn effective_requests(&self) -> ResourceAmounts {
        let mut requests = self.requests.clone();
        if !requests.contains(&ResourceKind::Pods) {
            requests.set(ResourceKind::Pods, 1);
        }
        requests
    }
}

/// Failure to obtain live state from the cluster. Fatal to the run — the
/// engine cannot proceed without a snapshot — but nothing is persisted, so
/// nothing is corrupted.
#[derive(Debug, Error)]
pub enum ClusterError {
    #[error("failed to list workloads on node {node}: {source}")]
    ListWorkloads {
        node: String,
        #[source]
        source: anyhow::Error,
    },
}

/// Enumerates a node's resident workloads.
///
/// The returned order is preserved by the eviction loop; by convention
/// listers return lowest-priority workloads first so they are considered
/// for removal first.
pub trait WorkloadLister {
    fn workloads_on_node(&self, node: &NodeInfo) -> Result<Vec<Workload>, ClusterError>;
}

/// Evictability parameters resolved from strategy configuration and handed
/// through to the filter collaborator.
#[derive(Debug, Clone, Copy, Default)]
pub struct EvictionOptions {
    /// Workloads at or above this priority are never evicted.
    pub priority_floor: Option<i32>,
    /// Whether the driver checks receiver headroom before each eviction.
    pub node_fit: bool,
}

/// The eviction collaborator: policy filter plus the removal call.
///
/// A failing `evict` is reported through its own channel by the
/// collaborator; the driver logs it and moves on to the next candidate.
pub trait Evictor {
    /// Policy-level protections: priority floor, daemon-managed or critical
    /// workloads. The engine never re-implements this policy.
    fn is_evictable(&self, workload: &Workload, opts: &EvictionOptions) -> bool;

    /// Request removal of the workload from the live cluster.
    fn evict(&mut self, workload: &Workload) -> anyhow::Result<()>;
}
