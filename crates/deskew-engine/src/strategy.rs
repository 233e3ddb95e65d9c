//! Strategy entry points — the two utilization polarities.
//!
//! Both variants validate their threshold maps, compute per-node usage from
//! the lister's resident workloads, classify nodes into donors and
//! receivers, and hand the result to the eviction driver. They differ in
//! which map plays which role:
//!
//! - **High utilization**: evict from *under*utilized nodes so the
//!   scheduler can pack workloads more densely. The target map is forced
//!   wide open; receivers are simply schedulable non-donors.
//! - **Low utilization**: evict from *over*utilized nodes (above any target
//!   threshold) toward underutilized receivers (below all low thresholds).

use std::collections::BTreeMap;

use tokio::sync::watch;
use tracing::{debug, info};

use deskew_core::classify::{above_any_threshold, below_all_thresholds, classify_nodes};
use deskew_core::resources::{ResourceAmounts, ResourceKind};
use deskew_core::thresholds::{
    PercentageBounds, ResourceThresholds, validate_threshold_map, validate_threshold_pair,
    MAX_PERCENTAGE, MIN_PERCENTAGE,
};
use deskew_core::usage::{NodeInfo, NodeUsage};

use crate::cluster::{ClusterError, Evictor, WorkloadLister};
use crate::config::StrategyConfig;
use crate::driver::{EvictionDriver, RunSummary, pool_not_exhausted};
use crate::error::{EngineError, EngineResult};

/// Rebalance by draining underutilized nodes.
///
/// Donors are nodes strictly below every configured low threshold;
/// receivers are every other schedulable node. Runs one synchronous pass
/// and reports what it did; guard trips are logged, not errors.
pub fn run_high_utilization(
    config: &StrategyConfig,
    nodes: &[NodeInfo],
    lister: &dyn WorkloadLister,
    evictor: &mut dyn Evictor,
    cancel: watch::Receiver<bool>,
) -> EngineResult<RunSummary> {
    if config.target_thresholds.as_ref().is_some_and(|t| !t.is_empty()) {
        return Err(EngineError::TargetThresholdsNotApplicable);
    }
    let bounds = PercentageBounds::default();
    validate_threshold_map(config.thresholds.as_ref(), bounds, false)?;

    let mut low = config.thresholds.clone().unwrap_or_default();
    low.default_basic(MAX_PERCENTAGE);

    // There is no meaningful ceiling for this direction; the target map
    // exists structurally and is forced wide open for every kind the low
    // map names.
    let mut target = ResourceThresholds::new();
    for kind in low.kinds() {
        target.set(kind.clone(), MAX_PERCENTAGE);
    }

    let kinds: Vec<ResourceKind> = target.kinds().cloned().collect();
    let usages = collect_node_usage(nodes, lister, &kinds)?;

    log_criteria("criteria for a node below low utilization", &low);

    let (donors, receivers) = classify_nodes(
        usages,
        |n| below_all_thresholds(n, &low),
        |n| {
            if !n.node.schedulable {
                debug!(node = %n.node.id, "node unschedulable, not a receiver");
                return false;
            }
            !below_all_thresholds(n, &low)
        },
    );
    info!(
        donors = donors.len(),
        receivers = receivers.len(),
        total = nodes.len(),
        "classified nodes for high-utilization pass"
    );

    let driver = EvictionDriver {
        lister,
        evictor,
        options: config.eviction_options(),
        kinds: &kinds,
        minimum_donors: config.number_of_nodes,
        total_nodes: nodes.len(),
        cancel,
    };
    driver
        .run(donors, &receivers, &target, &pool_not_exhausted)
        .map_err(EngineError::from)
}

/// Rebalance by relieving overutilized nodes.
///
/// Donors are nodes strictly above any target threshold; receivers are
/// schedulable nodes strictly below every low threshold. In deviation mode
/// both maps are reinterpreted as ± offsets from the cluster mean.
pub fn run_low_utilization(
    config: &StrategyConfig,
    nodes: &[NodeInfo],
    lister: &dyn WorkloadLister,
    evictor: &mut dyn Evictor,
    cancel: watch::Receiver<bool>,
) -> EngineResult<RunSummary> {
    let bounds = PercentageBounds::default();
    validate_threshold_pair(
        config.thresholds.as_ref(),
        config.target_thresholds.as_ref(),
        config.use_deviation_thresholds,
        bounds,
    )?;

    let mut low = config.thresholds.clone().unwrap_or_default();
    let mut target = config.target_thresholds.clone().unwrap_or_default();
    // An absent kind defaults to an inert 100% ceiling; in deviation mode
    // the inert value is a zero offset from the mean instead.
    let fill = if config.use_deviation_thresholds { MIN_PERCENTAGE } else { MAX_PERCENTAGE };
    low.default_basic(fill);
    target.default_basic(fill);
    // Both maps cover the same kinds so classification and the ledger agree.
    for kind in low.kinds().cloned().collect::<Vec<_>>() {
        if !target.contains(&kind) {
            target.set(kind, fill);
        }
    }
    for kind in target.kinds().cloned().collect::<Vec<_>>() {
        if !low.contains(&kind) {
            low.set(kind, fill);
        }
    }

    let kinds: Vec<ResourceKind> = target.kinds().cloned().collect();
    let usages = collect_node_usage(nodes, lister, &kinds)?;

    if config.use_deviation_thresholds {
        let mean = mean_utilization(&usages, &kinds);
        (low, target) = deviation_to_absolute(&low, &target, &mean);
        info!(?mean, "interpreting thresholds as deviation from cluster mean");
    }

    log_criteria("criteria for an underutilized receiver", &low);
    log_criteria("criteria for an overutilized donor", &target);

    let (donors, receivers) = classify_nodes(
        usages,
        |n| above_any_threshold(n, &target),
        |n| {
            if !n.node.schedulable {
                debug!(node = %n.node.id, "node unschedulable, not a receiver");
                return false;
            }
            below_all_thresholds(n, &low)
        },
    );
    info!(
        donors = donors.len(),
        receivers = receivers.len(),
        total = nodes.len(),
        "classified nodes for low-utilization pass"
    );

    let driver = EvictionDriver {
        lister,
        evictor,
        options: config.eviction_options(),
        kinds: &kinds,
        minimum_donors: config.number_of_nodes,
        total_nodes: nodes.len(),
        cancel,
    };
    driver
        .run(donors, &receivers, &target, &pool_not_exhausted)
        .map_err(EngineError::from)
}

/// Annotate every node with its summed workload requests and derived
/// utilization. The pod count comes from the number of resident workloads,
/// not their declared requests.
fn collect_node_usage(
    nodes: &[NodeInfo],
    lister: &dyn WorkloadLister,
    kinds: &[ResourceKind],
) -> Result<Vec<NodeUsage>, ClusterError> {
    nodes
        .iter()
        .map(|node| {
            let workloads = lister.workloads_on_node(node)?;
            let mut usage = ResourceAmounts::new();
            for workload in &workloads {
                usage.add(&workload.requests);
            }
            usage.set(ResourceKind::Pods, workloads.len() as i64);
            Ok(NodeUsage::compute(node.clone(), usage, kinds))
        })
        .collect()
}

fn mean_utilization(
    usages: &[NodeUsage],
    kinds: &[ResourceKind],
) -> BTreeMap<ResourceKind, f64> {
    let mut mean = BTreeMap::new();
    if usages.is_empty() {
        return mean;
    }
    for kind in kinds {
        let total: f64 = usages.iter().map(|u| u.utilization_of(kind)).sum();
        mean.insert(kind.clone(), total / usages.len() as f64);
    }
    mean
}

/// Turn ± deviation maps into absolute percentage maps around the mean,
/// clamped to the legal range.
fn deviation_to_absolute(
    low: &ResourceThresholds,
    target: &ResourceThresholds,
    mean: &BTreeMap<ResourceKind, f64>,
) -> (ResourceThresholds, ResourceThresholds) {
    let mut abs_low = ResourceThresholds::new();
    let mut abs_target = ResourceThresholds::new();
    for (kind, offset) in low.iter() {
        let m = mean.get(kind).copied().unwrap_or(0.0);
        abs_low.set(kind.clone(), (m - offset).max(MIN_PERCENTAGE));
    }
    for (kind, offset) in target.iter() {
        let m = mean.get(kind).copied().unwrap_or(0.0);
        abs_target.set(kind.clone(), (m + offset).min(MAX_PERCENTAGE));
    }
    (abs_low, abs_target)
}

fn log_criteria(message: &'static str, thresholds: &ResourceThresholds) {
    info!(
        cpu = thresholds.get(&ResourceKind::Cpu).unwrap_or(MAX_PERCENTAGE),
        memory = thresholds.get(&ResourceKind::Memory).unwrap_or(MAX_PERCENTAGE),
        pods = thresholds.get(&ResourceKind::Pods).unwrap_or(MAX_PERCENTAGE),
        "{message}",
    );
}
