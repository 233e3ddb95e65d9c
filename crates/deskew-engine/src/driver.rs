//! The eviction driver — the greedy loop at the heart of the rebalancer.
//!
//! Given classified donors and receivers, the driver walks each donor's
//! workloads in order, consults the evictability filter and the pooled
//! receiver headroom, performs evictions, and stops once the caller's
//! continuation predicate says no further eviction can land anywhere.

use std::fmt;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use deskew_core::resources::{ResourceAmounts, ResourceKind};
use deskew_core::thresholds::ResourceThresholds;
use deskew_core::usage::NodeUsage;

use crate::cluster::{ClusterError, EvictionOptions, Evictor, WorkloadLister};

/// A named reason the run performed zero evictions. Not an error — the
/// expected common case in a healthy cluster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardSkip {
    /// No node classified as a donor.
    NoDonors,
    /// Too few donors to be worth the churn.
    TooFewDonors { donors: usize, minimum: usize },
    /// Every node is a donor; there is nothing to rebalance against.
    AllNodesDonors,
    /// No schedulable destination exists.
    NoReceivers,
    /// Receivers have no headroom left for some tracked kind.
    PoolExhausted,
}

impl fmt::Display for GuardSkip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GuardSkip::NoDonors => write!(f, "no donor node found"),
            GuardSkip::TooFewDonors { donors, minimum } => {
                write!(f, "donor count {donors} at or below minimum {minimum}")
            }
            GuardSkip::AllNodesDonors => write!(f, "every node is a donor"),
            GuardSkip::NoReceivers => write!(f, "no receiver node available"),
            GuardSkip::PoolExhausted => write!(f, "receiver headroom already exhausted"),
        }
    }
}

/// Outcome of one rebalancing run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Number of successful evictions.
    pub evicted: usize,
    /// The pre-flight guard that ended the run, if one fired.
    pub skipped: Option<GuardSkip>,
    /// Whether the run was cut short by the cancellation signal.
    pub cancelled: bool,
}

impl RunSummary {
    fn skipped(guard: GuardSkip) -> Self {
        Self { evicted: 0, skipped: Some(guard), cancelled: false }
    }
}

/// Pooled remaining headroom across all receivers, per tracked kind.
///
/// One ledger is owned by one run; eviction only ever debits it, so the
/// pool shrinks monotonically and the stop condition cannot un-fire. The
/// debit is not attributed to a specific receiver — final placement is the
/// scheduler's decision, not ours.
#[derive(Debug, Clone)]
pub struct AvailableLedger {
    available: ResourceAmounts,
}

impl AvailableLedger {
    /// Sum each receiver's headroom: `target% × allocatable − usage`,
    /// floored at zero per receiver and per kind.
    pub fn from_receivers(
        receivers: &[NodeUsage],
        target: &ResourceThresholds,
        kinds: &[ResourceKind],
    ) -> Self {
        let mut available = ResourceAmounts::new();
        for kind in kinds {
            let mut total: i64 = 0;
            for receiver in receivers {
                let ceiling = target.get(kind).unwrap_or(deskew_core::MAX_PERCENTAGE);
                let allocatable = receiver.node.allocatable.get(kind);
                let cap = (ceiling * allocatable as f64 / 100.0) as i64;
                total += (cap - receiver.usage.get(kind)).max(0);
            }
            available.set(kind.clone(), total);
        }
        Self { available }
    }

    /// Remaining headroom for a kind; untracked kinds read zero.
    pub fn remaining(&self, kind: &ResourceKind) -> i64 {
        self.available.get(kind)
    }

    /// True once any tracked kind has no headroom left.
    pub fn exhausted(&self) -> bool {
        self.available.iter().any(|(_, amount)| amount <= 0)
    }

    /// Whether the pool still has room for every tracked kind the workload
    /// requests.
    pub fn fits(&self, requests: &ResourceAmounts) -> bool {
        requests
            .iter()
            .filter(|(kind, _)| self.available.contains(kind))
            .all(|(kind, amount)| amount <= self.available.get(kind))
    }

    /// Debit the pool, clamping every kind at zero.
    pub fn debit(&mut self, requests: &ResourceAmounts) {
        self.available.saturating_sub(requests);
    }
}

/// Side-effect-free continuation predicate over current ledger state.
/// A false result stops the current donor and the whole run.
pub type ContinueEviction<'a> = &'a dyn Fn(&NodeUsage, &AvailableLedger) -> bool;

/// The canonical continuation condition: keep going while every tracked
/// kind still has pooled headroom.
pub fn pool_not_exhausted(_donor: &NodeUsage, ledger: &AvailableLedger) -> bool {
    !ledger.exhausted()
}

/// One run of the greedy eviction loop.
pub struct EvictionDriver<'a> {
    pub lister: &'a dyn WorkloadLister,
    pub evictor: &'a mut dyn Evictor,
    pub options: EvictionOptions,
    /// Resource kinds the run tracks (the target map's kinds).
    pub kinds: &'a [ResourceKind],
    /// Skip the run unless strictly more donors than this exist.
    pub minimum_donors: usize,
    /// Total nodes in the snapshot, for the all-donors guard.
    pub total_nodes: usize,
    /// Cancellation signal, checked between donors and between evictions.
    pub cancel: watch::Receiver<bool>,
}

impl EvictionDriver<'_> {
    /// Drive evictions off the donors while receivers have headroom.
    ///
    /// Donors are processed in input order; callers pre-sort if a severity
    /// order matters. Evictions already performed are never rolled back,
    /// including on cancellation.
    pub fn run(
        mut self,
        mut donors: Vec<NodeUsage>,
        receivers: &[NodeUsage],
        target: &ResourceThresholds,
        continue_eviction: ContinueEviction<'_>,
    ) -> Result<RunSummary, ClusterError> {
        if let Some(guard) = self.pre_flight(&donors, receivers) {
            info!(%guard, "nothing to rebalance");
            return Ok(RunSummary::skipped(guard));
        }

        let mut ledger = AvailableLedger::from_receivers(receivers, target, self.kinds);
        if ledger.exhausted() {
            let guard = GuardSkip::PoolExhausted;
            info!(%guard, "nothing to rebalance");
            return Ok(RunSummary::skipped(guard));
        }

        let mut evicted = 0usize;
        let mut cancelled = false;

        'donors: for donor in donors.iter_mut() {
            if *self.cancel.borrow() {
                cancelled = true;
                break;
            }

            let workloads = self.lister.workloads_on_node(&donor.node)?;
            debug!(
                node = %donor.node.id,
                candidates = workloads.len(),
                "processing donor node"
            );

            for workload in &workloads {
                if *self.cancel.borrow() {
                    cancelled = true;
                    break 'donors;
                }
                if !self.evictor.is_evictable(workload, &self.options) {
                    debug!(workload = %workload.id, "workload protected, skipping");
                    continue;
                }

                let requests = workload.effective_requests();
                if self.options.node_fit && !ledger.fits(&requests) {
                    debug!(
                        workload = %workload.id,
                        "no receiver headroom for workload, skipping"
                    );
                    continue;
                }

                match self.evictor.evict(workload) {
                    Ok(()) => {
                        evicted += 1;
                        ledger.debit(&requests);
                        donor.debit(&requests);
                        debug!(
                            workload = %workload.id,
                            node = %donor.node.id,
                            "workload evicted"
                        );
                        if !continue_eviction(donor, &ledger) {
                            info!(
                                node = %donor.node.id,
                                evicted,
                                "continuation condition no longer holds, stopping run"
                            );
                            break 'donors;
                        }
                    }
                    Err(e) => {
                        // Skip and continue; the collaborator reports the
                        // failure through its own channel.
                        warn!(
                            workload = %workload.id,
                            error = %e,
                            "eviction call failed, continuing"
                        );
                    }
                }
            }
        }

        if cancelled {
            info!(evicted, "run cancelled");
        } else {
            info!(evicted, "eviction pass complete");
        }
        Ok(RunSummary { evicted, skipped: None, cancelled })
    }

    fn pre_flight(&self, donors: &[NodeUsage], receivers: &[NodeUsage]) -> Option<GuardSkip> {
        if donors.is_empty() {
            return Some(GuardSkip::NoDonors);
        }
        if donors.len() <= self.minimum_donors {
            return Some(GuardSkip::TooFewDonors {
                donors: donors.len(),
                minimum: self.minimum_donors,
            });
        }
        if donors.len() == self.total_nodes {
            return Some(GuardSkip::AllNodesDonors);
        }
        if receivers.is_empty() {
            return Some(GuardSkip::NoReceivers);
        }
        None
    }
}
