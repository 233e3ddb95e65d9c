//! deskew-engine — the rebalancer's eviction loop and strategies.
//!
//! One run is a single synchronous pass over a fresh cluster snapshot:
//! validate thresholds, compute per-node utilization, classify donors and
//! receivers, then greedily evict workloads from donors while receivers
//! still have pooled headroom. Nothing persists between runs.
//!
//! # Components
//!
//! - **`config`** — the strategy configuration surface
//! - **`cluster`** — collaborator traits (workload listing, eviction)
//! - **`driver`** — pre-flight guards, the headroom ledger, the loop
//! - **`strategy`** — the high- and low-utilization entry points
//!
//! The pure decision primitives live in `deskew-core`.

pub mod cluster;
pub mod config;
pub mod driver;
pub mod error;
pub mod strategy;

pub use cluster::{ClusterError, EvictionOptions, Evictor, Workload, WorkloadLister};
pub use config::StrategyConfig;
pub use driver::{
    AvailableLedger, ContinueEviction, EvictionDriver, GuardSkip, RunSummary,
    pool_not_exhausted,
};
pub use error::{EngineError, EngineResult};
pub use strategy::{run_high_utilization, run_low_utilization};
