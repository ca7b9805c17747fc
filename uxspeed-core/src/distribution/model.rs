use serde::{Deserialize, Serialize};

use crate::params::spec::{
    BOUNCE_RATE_SCALE, BOUNCE_RATE_SHIFT, BOUNCE_TIME_COMPRESSION, BUCKET_SIZE, CONVERSION_DECAY,
    CONVERSION_POVERTY_LINE, ERROR_RATE_DECAY, MAX_CONVERSION_RATE, MAX_ERROR_RATE, MAX_TIME, MU,
    SIGMA, VOLUME,
};
use crate::params::{ParameterState, RegistryError, RegistryResult};

/// Snapshot of the parameters the distribution depends on.
///
/// Display-only parameters are not part of it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelParams {
    pub max_time: f64,
    pub bucket_size: f64,
    pub volume: f64,
    pub mu: f64,
    pub sigma: f64,
    pub max_error_rate: f64,
    pub error_rate_decay: f64,
    pub bounce_time_compression: f64,
    pub bounce_rate_scale: f64,
    pub bounce_rate_shift: f64,
    pub conversion_decay: f64,
    pub max_conversion_rate: f64,
    pub conversion_poverty_line: f64,
}

impl ModelParams {
    pub fn from_state(state: &ParameterState) -> RegistryResult<Self> {
        let read = |name: &str| {
            state
                .value(name)
                .ok_or_else(|| RegistryError::MissingValue(name.to_string()))
        };
        Ok(Self {
            max_time: read(MAX_TIME)?,
            bucket_size: read(BUCKET_SIZE)?,
            volume: read(VOLUME)?,
            mu: read(MU)?,
            sigma: read(SIGMA)?,
            max_error_rate: read(MAX_ERROR_RATE)?,
            error_rate_decay: read(ERROR_RATE_DECAY)?,
            bounce_time_compression: read(BOUNCE_TIME_COMPRESSION)?,
            bounce_rate_scale: read(BOUNCE_RATE_SCALE)?,
            bounce_rate_shift: read(BOUNCE_RATE_SHIFT)?,
            conversion_decay: read(CONVERSION_DECAY)?,
            max_conversion_rate: read(MAX_CONVERSION_RATE)?,
            conversion_poverty_line: read(CONVERSION_POVERTY_LINE)?,
        })
    }

    /// Error percentage at time `t`, decaying exponentially from `max_error_rate`.
    pub fn error_rate(&self, t: f64) -> f64 {
        self.max_error_rate * (-t * self.error_rate_decay).exp()
    }

    /// Bounce percentage at time `t`, growing logarithmically and clamped to `[0, 100]`.
    pub fn bounce_rate(&self, t: f64) -> f64 {
        let rate = (t * self.bounce_time_compression + 1.0).log10() * self.bounce_rate_scale
            + self.bounce_rate_shift;
        rate.clamp(0.0, 100.0)
    }

    /// Conversion percentage at time `t`, decaying from `max_conversion_rate`
    /// towards the poverty line.
    pub fn conversion_rate(&self, t: f64) -> f64 {
        (self.max_conversion_rate - self.conversion_poverty_line)
            * (-t * self.conversion_decay).exp()
            + self.conversion_poverty_line
    }
}

impl<'a> TryFrom<&'a ParameterState> for ModelParams {
    type Error = RegistryError;

    fn try_from(state: &'a ParameterState) -> RegistryResult<Self> {
        Self::from_state(state)
    }
}
