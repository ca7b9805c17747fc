use tracing::debug;

use crate::distribution::{compute, DistributionResult, ModelParams};
use crate::params::{Overrides, ParameterRegistry, ParameterState, RawValue, RegistryResult};
use crate::summary::FunnelSummary;

/// Interactive session: current parameters plus the distribution they produce.
///
/// Edits to display-only parameters keep the previous distribution.
#[derive(Debug, Clone)]
pub struct Calculator {
    registry: ParameterRegistry,
    state: ParameterState,
    result: DistributionResult,
    adjusted: bool,
}

impl Calculator {
    pub fn new(registry: ParameterRegistry, overrides: &Overrides) -> RegistryResult<Self> {
        let state = registry.initialize(overrides);
        let result = compute(&ModelParams::from_state(&state)?);
        Ok(Self {
            registry,
            state,
            result,
            adjusted: false,
        })
    }

    pub fn standard(overrides: &Overrides) -> RegistryResult<Self> {
        Self::new(ParameterRegistry::standard()?, overrides)
    }

    pub fn registry(&self) -> &ParameterRegistry {
        &self.registry
    }

    pub fn state(&self) -> &ParameterState {
        &self.state
    }

    pub fn result(&self) -> &DistributionResult {
        &self.result
    }

    pub fn is_adjusted(&self) -> bool {
        self.adjusted
    }

    pub fn summary(&self) -> RegistryResult<FunnelSummary> {
        FunnelSummary::new(&self.result, &self.state)
    }

    /// Applies one edit and returns the parameter's settled value.
    pub fn set(&mut self, name: &str, raw: impl Into<RawValue>) -> RegistryResult<f64> {
        let value = self.registry.set_value(&mut self.state, name, raw)?;
        if self.registry.affects_distribution(name) {
            self.recompute()?;
        } else {
            debug!(parameter = %name, "display-only change, keeping distribution");
        }
        self.adjusted = true;
        Ok(value)
    }

    /// Returns to the initial values, discarding every override and edit.
    pub fn reset(&mut self) -> RegistryResult<()> {
        self.state = self.registry.initialize(&Overrides::new());
        self.recompute()?;
        self.adjusted = false;
        Ok(())
    }

    fn recompute(&mut self) -> RegistryResult<()> {
        self.result = compute(&ModelParams::from_state(&self.state)?);
        Ok(())
    }
}
