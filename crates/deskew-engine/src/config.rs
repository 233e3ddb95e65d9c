//! Strategy configuration surface.

use deskew_core::thresholds::ResourceThresholds;

/// Configuration consumed by the strategy entry points.
///
/// Deserialized by the surrounding system from whatever format it carries
/// its policy in; all fields default so partial configs parse.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct StrategyConfig {
    /// Low-water percentages. Nodes below all of these are underutilized.
    pub thresholds: Option<ResourceThresholds>,
    /// High-water percentages. Not applicable to the high-utilization
    /// strategy, which forces it wide open.
    pub target_thresholds: Option<ResourceThresholds>,
    /// Skip the run unless strictly more than this many donor nodes exist.
    pub number_of_nodes: usize,
    /// Interpret the target map as ± deviation from the cluster mean.
    pub use_deviation_thresholds: bool,
    /// Check pooled receiver headroom before each eviction.
    pub node_fit: bool,
    /// Workloads at or above this priority are protected.
    pub priority_floor: Option<i32>,
}

impl StrategyConfig {
    /// The evictability parameters this config resolves to.
    pub fn eviction_options(&self) -> crate::cluster::EvictionOptions {
        crate::cluster::EvictionOptions {
            priority_floor: self.priority_floor,
            node_fit: self.node_fit,
        }
    }
}
