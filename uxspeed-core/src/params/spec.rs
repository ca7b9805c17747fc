use std::fmt;

use serde::{Deserialize, Serialize};

/// Field of a parameter that a write can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bound {
    Value,
    Min,
    Max,
}

impl Bound {
    pub fn as_str(&self) -> &'static str {
        match self {
            Bound::Value => "value",
            Bound::Min => "min",
            Bound::Max => "max",
        }
    }
}

impl fmt::Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// When the owning parameter's value changes, `target.bound` is set to the new value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedLink {
    pub target: String,
    pub bound: Bound,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterSpec {
    pub name: String,
    pub label: String,
    pub description: Option<String>,
    pub units: Option<String>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub step: f64,
    pub initial_value: f64,
    /// Only changes how results are presented, never the simulated distribution.
    pub display_only: bool,
    /// Included when the collaborator layer persists parameters.
    pub serialize: bool,
    pub read_only: bool,
    pub updates: Vec<DerivedLink>,
}

impl ParameterSpec {
    pub fn new(name: impl Into<String>, label: impl Into<String>, initial_value: f64) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            description: None,
            units: None,
            min: None,
            max: None,
            step: 1.0,
            initial_value,
            display_only: false,
            serialize: true,
            read_only: false,
            updates: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_units(mut self, units: impl Into<String>) -> Self {
        self.units = Some(units.into());
        self
    }

    pub fn with_min(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }

    pub fn with_max(mut self, max: f64) -> Self {
        self.max = Some(max);
        self
    }

    pub fn with_step(mut self, step: f64) -> Self {
        self.step = step;
        self
    }

    pub fn display_only(mut self) -> Self {
        self.display_only = true;
        self
    }

    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    pub fn transient(mut self) -> Self {
        self.serialize = false;
        self
    }

    pub fn updates(mut self, target: impl Into<String>, bound: Bound) -> Self {
        self.updates.push(DerivedLink {
            target: target.into(),
            bound,
        });
        self
    }
}

pub const MAX_TIME: &str = "maxTime";
pub const BUCKET_SIZE: &str = "bucketSize";
pub const VOLUME: &str = "volume";
pub const MU: &str = "mu";
pub const SIGMA: &str = "sigma";
pub const MAX_ERROR_RATE: &str = "maxErrorRate";
pub const ERROR_RATE_DECAY: &str = "errorRateDecay";
pub const BOUNCE_TIME_COMPRESSION: &str = "bounceTimeCompression";
pub const BOUNCE_RATE_SCALE: &str = "bounceRateScale";
pub const BOUNCE_RATE_SHIFT: &str = "bounceRateShift";
pub const CONVERSION_DECAY: &str = "conversionDecay";
pub const AVERAGE_VALUE: &str = "averageValue";
pub const MAX_CONVERSION_RATE: &str = "maxConversionRate";
pub const CONVERSION_POVERTY_LINE: &str = "conversionPovertyLine";
pub const DISPLAY_MAX: &str = "displayMax";

/// Built-in parameter table in declaration order.
///
/// The order is significant: initialization applies overrides in this order and
/// each write cascades immediately, so `maxTime` settles the `displayMax` bound
/// and `maxConversionRate` settles the poverty line bound before their consumers.
pub fn standard_specs() -> Vec<ParameterSpec> {
    vec![
        ParameterSpec::new(MAX_TIME, "Max Time", 100.0)
            .with_description("Total time range to calculate distribution for")
            .with_units("seconds")
            .read_only()
            .transient()
            .updates(DISPLAY_MAX, Bound::Max),
        ParameterSpec::new(BUCKET_SIZE, "Bucket Size", 0.5)
            .with_description("Width of a histogram bucket")
            .with_units("seconds")
            .with_min(0.05)
            .with_max(1.0)
            .with_step(0.01),
        ParameterSpec::new(VOLUME, "Number of Users", 100_000.0)
            .with_description("Total number of users")
            .with_min(10_000.0)
            .with_max(1_000_000_000.0),
        ParameterSpec::new(MU, "Base Speed (μ)", 1.5)
            .with_description("'Location' of lognormal speed distribution")
            .with_min(-3.0)
            .with_max(3.0)
            .with_step(0.01),
        ParameterSpec::new(SIGMA, "Variability (σ)", 0.6)
            .with_description("'Scale' of lognormal speed distribution")
            .with_min(0.05)
            .with_max(3.0)
            .with_step(0.01),
        ParameterSpec::new(MAX_ERROR_RATE, "Max Error Rate", 2.0)
            .with_description("Error rate of the fastest experiences")
            .with_units("%")
            .with_min(0.0)
            .with_max(100.0)
            .with_step(0.01),
        ParameterSpec::new(ERROR_RATE_DECAY, "Error Rate Decay", 0.3)
            .with_description("Speed (power) of exponential error rate decay")
            .with_min(0.0)
            .with_max(5.0)
            .with_step(0.01),
        ParameterSpec::new(BOUNCE_TIME_COMPRESSION, "Bounce Time Compression", 1.0)
            .with_description("Multiplier applied to time before the logarithmic bounce curve")
            .with_min(0.01)
            .with_max(10.0)
            .with_step(0.01),
        ParameterSpec::new(BOUNCE_RATE_SCALE, "Bounce Rate Scale", 40.0)
            .with_description("Steepness of the logarithmic bounce curve")
            .with_min(0.0)
            .with_max(200.0)
            .with_step(0.1),
        ParameterSpec::new(BOUNCE_RATE_SHIFT, "Bounce Rate Shift", 5.0)
            .with_description("Bounce rate of an instant experience")
            .with_units("%")
            .with_min(-100.0)
            .with_max(100.0)
            .with_step(0.1),
        ParameterSpec::new(CONVERSION_DECAY, "Conversion Decay", 0.85)
            .with_description("Speed (power) of exponential conversion decay")
            .with_min(0.0)
            .with_max(5.0)
            .with_step(0.01),
        ParameterSpec::new(AVERAGE_VALUE, "Average Value of a Converted User", 10.0)
            .with_units("$")
            .with_min(0.01)
            .with_max(1000.0)
            .with_step(0.01)
            .display_only(),
        ParameterSpec::new(MAX_CONVERSION_RATE, "Max Conversion", 50.0)
            .with_description("Theoretical maximum conversion at a fastest point of 0 seconds")
            .with_units("%")
            .with_min(0.0)
            .with_max(100.0)
            .with_step(0.01)
            .updates(CONVERSION_POVERTY_LINE, Bound::Max),
        ParameterSpec::new(CONVERSION_POVERTY_LINE, "Conversion Poverty Line", 1.2)
            .with_description("Lowest conversion rate of the infinitely slow experiences")
            .with_units("%")
            .with_min(0.0)
            .with_step(0.01),
        ParameterSpec::new(DISPLAY_MAX, "Display Max", 15.0)
            .with_description("Maximum value of speed to display on the chart")
            .with_units("seconds")
            .with_min(2.0)
            .display_only(),
    ]
}
