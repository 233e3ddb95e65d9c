//! Threshold maps and their validation.
//!
//! A threshold map assigns a percentage to each resource kind. Strategies
//! carry two: a low-water map and a high/target map. Validation is purely
//! structural and numeric — it never consults live cluster state — and any
//! failure is fatal to the run.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::resources::ResourceKind;

/// Lower bound for a threshold percentage.
pub const MIN_PERCENTAGE: f64 = 0.0;
/// Upper bound for a threshold percentage.
pub const MAX_PERCENTAGE: f64 = 100.0;

/// Threshold misconfiguration. Surfaced to the operator, never retried.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("no resource threshold is configured")]
    NoThresholds,

    #[error("only cpu, memory, or pods thresholds can be specified")]
    UnsupportedKind,

    #[error("{kind} threshold not in [{min}, {max}] range")]
    OutOfRange { kind: ResourceKind, min: f64, max: f64 },
}

/// Per-kind percentage map.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct ResourceThresholds(BTreeMap<ResourceKind, f64>);

impl ResourceThresholds {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    pub fn with(mut self, kind: ResourceKind, percent: f64) -> Self {
        self.0.insert(kind, percent);
        self
    }

    pub fn get(&self, kind: &ResourceKind) -> Option<f64> {
        self.0.get(kind).copied()
    }

    pub fn set(&mut self, kind: ResourceKind, percent: f64) {
        self.0.insert(kind, percent);
    }

    pub fn contains(&self, kind: &ResourceKind) -> bool {
        self.0.contains_key(kind)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ResourceKind, f64)> {
        self.0.iter().map(|(k, v)| (k, *v))
    }

    pub fn kinds(&self) -> impl Iterator<Item = &ResourceKind> {
        self.0.keys()
    }

    /// Fill in cpu/memory/pods with `percent` where absent. Strategies call
    /// this after validation so classification always has the basic kinds.
    pub fn default_basic(&mut self, percent: f64) {
        for kind in ResourceKind::basic() {
            self.0.entry(kind).or_insert(percent);
        }
    }
}

impl FromIterator<(ResourceKind, f64)> for ResourceThresholds {
    fn from_iter<I: IntoIterator<Item = (ResourceKind, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Percentage bounds passed explicitly into validation, so multiple
/// configurations can be validated in parallel in tests.
#[derive(Debug, Clone, Copy)]
pub struct PercentageBounds {
    pub min: f64,
    pub max: f64,
}

impl Default for PercentageBounds {
    fn default() -> Self {
        Self { min: MIN_PERCENTAGE, max: MAX_PERCENTAGE }
    }
}

/// Validate a single threshold map.
///
/// `exempt_upper` lifts the upper bound check — used for the target map in
/// deviation mode, where values above 100 mean "+N points over the mean".
pub fn validate_threshold_map(
    map: Option<&ResourceThresholds>,
    bounds: PercentageBounds,
    exempt_upper: bool,
) -> Result<(), ConfigError> {
    let map = map.ok_or(ConfigError::NoThresholds)?;
    if map.is_empty() {
        return Err(ConfigError::NoThresholds);
    }
    for (kind, percent) in map.iter() {
        if !kind.is_basic() && !kind.is_extended() {
            return Err(ConfigError::UnsupportedKind);
        }
        if percent < bounds.min || (!exempt_upper && percent > bounds.max) {
            return Err(ConfigError::OutOfRange {
                kind: kind.clone(),
                min: bounds.min,
                max: bounds.max,
            });
        }
    }
    Ok(())
}

/// Validate a low/target threshold pair.
///
/// Both maps must be present and non-empty. When `use_deviation` is set the
/// target map is exempt from the upper bound.
pub fn validate_threshold_pair(
    low: Option<&ResourceThresholds>,
    target: Option<&ResourceThresholds>,
    use_deviation: bool,
    bounds: PercentageBounds,
) -> Result<(), ConfigError> {
    validate_threshold_map(low, bounds, false)?;
    validate_threshold_map(target, bounds, use_deviation)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extended() -> ResourceKind {
        ResourceKind::parse("example.com/foo")
    }

    fn bounds() -> PercentageBounds {
        PercentageBounds::default()
    }

    #[test]
    fn absent_map_is_rejected() {
        let err = validate_threshold_map(None, bounds(), false).unwrap_err();
        assert_eq!(err, ConfigError::NoThresholds);
        assert_eq!(err.to_string(), "no resource threshold is configured");
    }

    #[test]
    fn empty_map_is_rejected() {
        let map = ResourceThresholds::new();
        let err = validate_threshold_map(Some(&map), bounds(), false).unwrap_err();
        assert_eq!(err, ConfigError::NoThresholds);
    }

    #[test]
    fn empty_low_with_configured_target_is_rejected() {
        let low = ResourceThresholds::new();
        let target = ResourceThresholds::new()
            .with(ResourceKind::Cpu, 100.0)
            .with(ResourceKind::Memory, 0.0);
        let err = validate_threshold_pair(Some(&low), Some(&target), false, bounds()).unwrap_err();
        assert_eq!(err, ConfigError::NoThresholds);
    }

    #[test]
    fn standard_kind_outside_basic_is_rejected() {
        // ephemeral-storage is a standard kind, not an extended resource.
        let low = ResourceThresholds::new()
            .with(ResourceKind::Cpu, 40.0)
            .with(ResourceKind::parse("ephemeral-storage"), 25.5);
        let err = validate_threshold_map(Some(&low), bounds(), false).unwrap_err();
        assert_eq!(err, ConfigError::UnsupportedKind);
        assert_eq!(err.to_string(), "only cpu, memory, or pods thresholds can be specified");
    }

    #[test]
    fn unqualified_custom_name_is_rejected() {
        let low = ResourceThresholds::new()
            .with(ResourceKind::Cpu, 40.0)
            .with(ResourceKind::parse("coolResource"), 42.0);
        let err = validate_threshold_map(Some(&low), bounds(), false).unwrap_err();
        assert_eq!(err, ConfigError::UnsupportedKind);
    }

    #[test]
    fn unsupported_kind_in_target_map_is_rejected() {
        let low = ResourceThresholds::new().with(ResourceKind::Cpu, 40.0);
        let target = ResourceThresholds::new()
            .with(ResourceKind::Cpu, 40.0)
            .with(ResourceKind::parse("coolResource"), 42.0);
        let err = validate_threshold_pair(Some(&low), Some(&target), false, bounds()).unwrap_err();
        assert_eq!(err, ConfigError::UnsupportedKind);
    }

    #[test]
    fn value_above_hundred_is_rejected() {
        let low = ResourceThresholds::new()
            .with(ResourceKind::Cpu, 110.0)
            .with(ResourceKind::Memory, 80.0);
        let err = validate_threshold_map(Some(&low), bounds(), false).unwrap_err();
        assert_eq!(
            err,
            ConfigError::OutOfRange { kind: ResourceKind::Cpu, min: 0.0, max: 100.0 }
        );
        assert_eq!(err.to_string(), "cpu threshold not in [0, 100] range");
    }

    #[test]
    fn negative_value_is_rejected() {
        let low = ResourceThresholds::new().with(ResourceKind::Memory, -5.0);
        let err = validate_threshold_map(Some(&low), bounds(), false).unwrap_err();
        assert!(matches!(err, ConfigError::OutOfRange { kind: ResourceKind::Memory, .. }));
    }

    #[test]
    fn deviation_mode_exempts_target_upper_bound() {
        let low = ResourceThresholds::new()
            .with(ResourceKind::Cpu, 100.0)
            .with(ResourceKind::Memory, 0.0);
        let target = ResourceThresholds::new()
            .with(ResourceKind::Cpu, 110.0)
            .with(ResourceKind::Memory, 80.0);

        // Rejected as an absolute threshold...
        assert!(validate_threshold_pair(Some(&low), Some(&target), false, bounds()).is_err());
        // ...legal as a deviation from the mean.
        assert!(validate_threshold_pair(Some(&low), Some(&target), true, bounds()).is_ok());
    }

    #[test]
    fn deviation_mode_does_not_exempt_low_map() {
        let low = ResourceThresholds::new().with(ResourceKind::Cpu, 110.0);
        let target = ResourceThresholds::new().with(ResourceKind::Cpu, 50.0);
        assert!(validate_threshold_pair(Some(&low), Some(&target), true, bounds()).is_err());
    }

    #[test]
    fn boundary_values_are_accepted() {
        let map = ResourceThresholds::new()
            .with(ResourceKind::Cpu, 100.0)
            .with(ResourceKind::Memory, 0.0);
        assert!(validate_threshold_map(Some(&map), bounds(), false).is_ok());
    }

    #[test]
    fn basic_and_extended_kinds_mix_freely() {
        let map = ResourceThresholds::new()
            .with(ResourceKind::Cpu, 20.0)
            .with(ResourceKind::Memory, 30.0)
            .with(ResourceKind::Pods, 40.0)
            .with(extended(), 50.0);
        assert!(validate_threshold_map(Some(&map), bounds(), false).is_ok());
    }

    #[test]
    fn extended_only_map_is_accepted() {
        let map = ResourceThresholds::new().with(extended(), 80.0);
        assert!(validate_threshold_map(Some(&map), bounds(), false).is_ok());
    }

    #[test]
    fn default_basic_fills_missing_kinds() {
        let mut map = ResourceThresholds::new().with(ResourceKind::Cpu, 30.0);
        map.default_basic(100.0);

        assert_eq!(map.get(&ResourceKind::Cpu), Some(30.0));
        assert_eq!(map.get(&ResourceKind::Memory), Some(100.0));
        assert_eq!(map.get(&ResourceKind::Pods), Some(100.0));
    }
}
