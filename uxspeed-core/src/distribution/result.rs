use serde::Serialize;

/// Percentile markers placed on the population curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Percentile {
    #[serde(rename = "50")]
    P50,
    #[serde(rename = "90")]
    P90,
    #[serde(rename = "95")]
    P95,
}

impl Percentile {
    pub const ALL: [Percentile; 3] = [Percentile::P50, Percentile::P90, Percentile::P95];

    pub fn fraction(&self) -> f64 {
        match self {
            Percentile::P50 => 0.5,
            Percentile::P90 => 0.9,
            Percentile::P95 => 0.95,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Percentile::P50 => "50%ile",
            Percentile::P90 => "90%ile",
            Percentile::P95 => "95%ile",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            Percentile::P50 => "#fc8d8d",
            Percentile::P90 => "#8dfc8f",
            Percentile::P95 => "#8da3fc",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Annotation {
    pub percentile: Percentile,
    /// Start of the bucket before the one where the threshold was crossed.
    pub x: f64,
    /// User count of the crossing bucket.
    pub y: u64,
    pub text: String,
    pub color: &'static str,
}

impl Annotation {
    pub(crate) fn new(percentile: Percentile, x: f64, y: u64) -> Self {
        Self {
            percentile,
            x,
            y,
            text: format!("{}: {}ms", percentile.label(), (x * 1000.0).round()),
            color: percentile.color(),
        }
    }
}

/// Every sequence is aligned index-for-index with `x`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributionResult {
    pub x: Vec<f64>,
    pub total_population: Vec<u64>,
    pub error_rate_distribution: Vec<f64>,
    pub errored_distribution: Vec<u64>,
    pub bounce_rate_distribution: Vec<f64>,
    pub bounced_distribution: Vec<u64>,
    pub effective_bounce_rate_distribution: Vec<f64>,
    pub conversion_rate_distribution: Vec<f64>,
    pub converted_distribution: Vec<u64>,
    pub effective_conversion_rate_distribution: Vec<f64>,
    pub non_converted_distribution: Vec<u64>,
    pub total_bounced: u64,
    pub total_converted: u64,
    pub total_non_converted: u64,
    pub average_speed: f64,
    pub average_conversion_rate: f64,
    pub average_non_bounced_conversion_rate: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percentile50: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percentile90: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percentile95: Option<f64>,
    pub annotations: Vec<Annotation>,
}

impl DistributionResult {
    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    pub fn percentile(&self, percentile: Percentile) -> Option<f64> {
        match percentile {
            Percentile::P50 => self.percentile50,
            Percentile::P90 => self.percentile90,
            Percentile::P95 => self.percentile95,
        }
    }

    pub fn total_users(&self) -> u64 {
        self.total_population.iter().sum()
    }

    pub fn total_errored(&self) -> u64 {
        self.errored_distribution.iter().sum()
    }

    /// Index range of buckets starting below `display_max` seconds.
    pub fn visible_buckets(&self, display_max: f64) -> std::ops::Range<usize> {
        0..self.x.iter().take_while(|&&t| t < display_max).count()
    }

    pub(crate) fn record_percentile(&mut self, percentile: Percentile, x: f64, y: u64) {
        let slot = match percentile {
            Percentile::P50 => &mut self.percentile50,
            Percentile::P90 => &mut self.percentile90,
            Percentile::P95 => &mut self.percentile95,
        };
        *slot = Some(x);
        self.annotations.push(Annotation::new(percentile, x, y));
    }
}
