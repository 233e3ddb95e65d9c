//! deskew-core — decision primitives for the cluster rebalancer.
//!
//! Pure building blocks, no I/O:
//!
//! - **`resources`** — resource kinds and per-kind integer amounts
//! - **`usage`** — node snapshots and utilization percentages
//! - **`thresholds`** — low/target percentage maps and their validation
//! - **`classify`** — donor/receiver partitioning over predicates
//!
//! The eviction loop that acts on these decisions lives in `deskew-engine`.

pub mod classify;
pub mod resources;
pub mod thresholds;
pub mod usage;

pub use classify::{above_any_threshold, below_all_thresholds, classify_nodes};
pub use resources::{ResourceAmounts, ResourceKind};
pub use thresholds::{
    ConfigError, PercentageBounds, ResourceThresholds, validate_threshold_map,
    validate_threshold_pair, MAX_PERCENTAGE, MIN_PERCENTAGE,
};
pub use usage::{NodeInfo, NodeUsage, utilization_percentages};
