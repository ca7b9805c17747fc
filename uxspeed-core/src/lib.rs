pub mod calculator;
pub mod config;
pub mod distribution;
pub mod params;
pub mod summary;

pub use calculator::Calculator;
pub use config::{load_scenario_config, ConfigError, ConfigResult, ScenarioConfig};
pub use distribution::{
    compute, Annotation, DistributionResult, ModelParams, Percentile,
    EMPTY_BUCKET_BOUNCE_RATE, EMPTY_BUCKET_CONVERSION_RATE,
};
pub use params::{
    Bound, DerivedLink, Overrides, ParameterRegistry, ParameterSpec, ParameterState,
    ParameterTable, ParameterValue, RawValue, RegistryError, RegistryResult,
};
pub use summary::FunnelSummary;
