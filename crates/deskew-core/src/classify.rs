//! Node classification — partitioning a snapshot into donors and receivers.
//!
//! The classifier itself knows nothing about thresholds; it runs two
//! caller-supplied predicates over each node in a single pass. The
//! direction-specific predicate helpers live here too.

use crate::thresholds::ResourceThresholds;
use crate::usage::NodeUsage;

/// Partition nodes into `(sources, destinations)`, preserving input order.
///
/// Predicates are evaluated independently; a node satisfying neither lands
/// in neither set (it is "just right", or excluded by the caller's predicate
/// for operational reasons). A node satisfying both counts as a source.
pub fn classify_nodes<S, D>(
    nodes: Vec<NodeUsage>,
    mut is_source: S,
    mut is_destination: D,
) -> (Vec<NodeUsage>, Vec<NodeUsage>)
where
    S: FnMut(&NodeUsage) -> bool,
    D: FnMut(&NodeUsage) -> bool,
{
    let mut sources = Vec::new();
    let mut destinations = Vec::new();
    for node in nodes {
        if is_source(&node) {
            sources.push(node);
        } else if is_destination(&node) {
            destinations.push(node);
        }
    }
    (sources, destinations)
}

/// True iff the node sits strictly below the configured percentage for
/// every kind in the map. The low-utilization donor test.
pub fn below_all_thresholds(usage: &NodeUsage, thresholds: &ResourceThresholds) -> bool {
    thresholds
        .iter()
        .all(|(kind, percent)| usage.utilization_of(kind) < percent)
}

/// True iff the node sits strictly above the configured percentage for at
/// least one kind in the map. The overutilized-donor test.
pub fn above_any_threshold(usage: &NodeUsage, thresholds: &ResourceThresholds) -> bool {
    thresholds
        .iter()
        .any(|(kind, percent)| usage.utilization_of(kind) > percent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::{ResourceAmounts, ResourceKind};
    use crate::usage::NodeInfo;

    fn make_usage(id: &str, cpu_pct: i64, mem_pct: i64) -> NodeUsage {
        let allocatable = ResourceAmounts::new()
            .with(ResourceKind::Cpu, 1000)
            .with(ResourceKind::Memory, 1000);
        let node = NodeInfo {
            id: id.to_string(),
            schedulable: true,
            capacity: allocatable.clone(),
            allocatable,
        };
        let usage = ResourceAmounts::new()
            .with(ResourceKind::Cpu, cpu_pct * 10)
            .with(ResourceKind::Memory, mem_pct * 10);
        NodeUsage::compute(node, usage, &[ResourceKind::Cpu, ResourceKind::Memory])
    }

    fn thresholds(cpu: f64, mem: f64) -> ResourceThresholds {
        ResourceThresholds::new()
            .with(ResourceKind::Cpu, cpu)
            .with(ResourceKind::Memory, mem)
    }

    #[test]
    fn partitions_are_disjoint_and_ordered() {
        let nodes = vec![
            make_usage("cold-1", 10, 10),
            make_usage("hot-1", 90, 90),
            make_usage("cold-2", 20, 20),
            make_usage("mid-1", 50, 50),
        ];
        let low = thresholds(40.0, 40.0);

        let (sources, destinations) = classify_nodes(
            nodes,
            |n| below_all_thresholds(n, &low),
            |n| !below_all_thresholds(n, &low),
        );

        let source_ids: Vec<&str> = sources.iter().map(|n| n.node.id.as_str()).collect();
        let dest_ids: Vec<&str> = destinations.iter().map(|n| n.node.id.as_str()).collect();
        assert_eq!(source_ids, ["cold-1", "cold-2"]);
        assert_eq!(dest_ids, ["hot-1", "mid-1"]);
        assert!(source_ids.iter().all(|id| !dest_ids.contains(id)));
    }

    #[test]
    fn node_matching_neither_predicate_is_dropped() {
        let nodes = vec![make_usage("n1", 50, 50)];
        let (sources, destinations) =
            classify_nodes(nodes, |_| false, |_| false);
        assert!(sources.is_empty());
        assert!(destinations.is_empty());
    }

    #[test]
    fn below_all_requires_every_kind() {
        let low = thresholds(40.0, 40.0);
        // cpu below, memory above: not a low-utilization node.
        assert!(!below_all_thresholds(&make_usage("n1", 10, 80), &low));
        assert!(below_all_thresholds(&make_usage("n2", 10, 10), &low));
    }

    #[test]
    fn comparison_is_strict() {
        let low = thresholds(40.0, 40.0);
        // Exactly at threshold is not below it.
        assert!(!below_all_thresholds(&make_usage("n1", 40, 40), &low));
        // Nor above it.
        assert!(!above_any_threshold(&make_usage("n1", 40, 40), &low));
    }

    #[test]
    fn above_any_needs_one_kind() {
        let target = thresholds(60.0, 60.0);
        assert!(above_any_threshold(&make_usage("n1", 90, 10), &target));
        assert!(!above_any_threshold(&make_usage("n2", 10, 10), &target));
    }

    #[test]
    fn kind_missing_from_utilization_reads_zero() {
        let low = ResourceThresholds::new().with(ResourceKind::Pods, 50.0);
        // Pods were not a kind of interest, so utilization reads 0 — below.
        assert!(below_all_thresholds(&make_usage("n1", 90, 90), &low));
    }
}
