use serde::Serialize;

use crate::distribution::DistributionResult;
use crate::params::spec::{AVERAGE_VALUE, VOLUME};
use crate::params::{ParameterState, RegistryError, RegistryResult};

/// Headline figures shown next to the chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FunnelSummary {
    /// Average conversion rate as a percentage truncated to two decimals.
    pub average_conversion_percent: f64,
    pub converted_users: u64,
    /// `volume * averageConversionRate * averageValue`, truncated to whole currency units.
    pub total_value: f64,
    pub average_speed: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percentile50: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percentile90: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percentile95: Option<f64>,
}

impl FunnelSummary {
    pub fn new(result: &DistributionResult, state: &ParameterState) -> RegistryResult<Self> {
        let volume = state
            .value(VOLUME)
            .ok_or_else(|| RegistryError::MissingValue(VOLUME.to_string()))?;
        let average_value = state
            .value(AVERAGE_VALUE)
            .ok_or_else(|| RegistryError::MissingValue(AVERAGE_VALUE.to_string()))?;

        Ok(Self {
            average_conversion_percent: (result.average_conversion_rate * 10_000.0).trunc() / 100.0,
            converted_users: result.total_converted,
            total_value: (volume * result.average_conversion_rate * average_value).trunc(),
            average_speed: result.average_speed,
            percentile50: result.percentile50,
            percentile90: result.percentile90,
            percentile95: result.percentile95,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{Overrides, ParameterRegistry, RawValue};

    #[test]
    fn summary_scales_by_volume_and_value() {
        let registry = ParameterRegistry::standard().unwrap();
        let overrides: Overrides = [
            ("volume".to_string(), RawValue::from(20_000.0)),
            ("averageValue".to_string(), RawValue::from(2.5)),
        ]
        .into_iter()
        .collect();
        let state = registry.initialize(&overrides);
        let result = DistributionResult {
            total_converted: 1_234,
            average_conversion_rate: 0.123456,
            ..Default::default()
        };

        let summary = FunnelSummary::new(&result, &state).unwrap();
        assert_eq!(summary.average_conversion_percent, 12.34);
        assert_eq!(summary.converted_users, 1_234);
        assert_eq!(summary.total_value, 6_172.0);
        assert_eq!(summary.percentile50, None);
    }

    #[test]
    fn summary_needs_volume_and_value() {
        let err = FunnelSummary::new(&DistributionResult::default(), &ParameterState::default())
            .unwrap_err();
        assert!(matches!(err, RegistryError::MissingValue(name) if name == "volume"));
    }
}
