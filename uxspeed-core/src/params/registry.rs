use tracing::{debug, trace};

use super::error::{RegistryError, RegistryResult};
use super::raw::{Overrides, RawValue};
use super::spec::{Bound, ParameterSpec};
use super::state::{ParameterState, ParameterValue};
use super::table::ParameterTable;

/// Owns the parameter table and all writes to a [`ParameterState`].
///
/// Every write parses, clamps and cascades synchronously. Invalid input never
/// surfaces as an error: unparseable text falls back to the spec's initial value
/// and out-of-range numbers are clamped. The only errors are programming errors
/// such as naming a parameter the table does not know.
#[derive(Debug, Clone)]
pub struct ParameterRegistry {
    table: ParameterTable,
}

impl ParameterRegistry {
    pub fn new(table: ParameterTable) -> Self {
        Self { table }
    }

    pub fn standard() -> RegistryResult<Self> {
        Ok(Self::new(ParameterTable::standard()?))
    }

    pub fn table(&self) -> &ParameterTable {
        &self.table
    }

    pub fn spec(&self, name: &str) -> RegistryResult<&ParameterSpec> {
        self.table
            .get(name)
            .ok_or_else(|| RegistryError::UnknownParameter(name.to_string()))
    }

    /// Whether changing `name` changes the computed distribution.
    pub fn affects_distribution(&self, name: &str) -> bool {
        self.table
            .get(name)
            .map(|spec| !spec.display_only)
            .unwrap_or(false)
    }

    /// Builds a state from initial values, applying `overrides` in declared order.
    ///
    /// Overrides that carry no number fall back to the initial value; keys that do
    /// not name a parameter are ignored.
    pub fn initialize(&self, overrides: &Overrides) -> ParameterState {
        for name in overrides.keys() {
            if !self.table.contains(name) {
                debug!(parameter = %name, "ignoring override for unknown parameter");
            }
        }

        let mut state = ParameterState::default();
        for spec in self.table.iter() {
            state.insert(
                spec.name.clone(),
                ParameterValue::new(spec.initial_value, spec.min, spec.max),
            );
        }
        for spec in self.table.iter() {
            let number = overrides
                .get(&spec.name)
                .and_then(RawValue::parse)
                .unwrap_or(spec.initial_value);
            self.write(&mut state, spec, number, Bound::Value);
        }
        state
    }

    /// Sets the value of `name`, then cascades through its derived links.
    ///
    /// Returns the parameter's value after clamping.
    pub fn set_value(
        &self,
        state: &mut ParameterState,
        name: &str,
        raw: impl Into<RawValue>,
    ) -> RegistryResult<f64> {
        self.set(state, name, raw, Bound::Value)
    }

    /// Writes `raw` into the given field of `name`.
    ///
    /// Only writes to [`Bound::Value`] cascade.
    pub fn set(
        &self,
        state: &mut ParameterState,
        name: &str,
        raw: impl Into<RawValue>,
        bound: Bound,
    ) -> RegistryResult<f64> {
        let spec = self.spec(name)?;
        let raw = raw.into();
        let number = match raw.parse() {
            Some(number) => number,
            None => {
                debug!(parameter = %name, input = %raw, fallback = spec.initial_value, "non-numeric input, using initial value");
                spec.initial_value
            }
        };
        Ok(self.write(state, spec, number, bound))
    }

    fn write(&self, state: &mut ParameterState, spec: &ParameterSpec, number: f64, bound: Bound) -> f64 {
        if state.get(&spec.name).is_none() {
            state.insert(
                spec.name.clone(),
                ParameterValue::new(spec.initial_value, spec.min, spec.max),
            );
        }

        let settled = match state.get_mut(&spec.name) {
            Some(entry) => {
                entry.put(bound, number);
                entry.settle();
                *entry
            }
            None => return number,
        };
        if bound == Bound::Value && settled.value != number {
            debug!(
                parameter = %spec.name,
                requested = number,
                value = settled.value,
                min = settled.min,
                max = settled.max,
                "clamped parameter value"
            );
        }

        if bound == Bound::Value {
            for link in &spec.updates {
                // Links were validated against the table at construction.
                if let Some(target) = self.table.get(&link.target) {
                    trace!(source = %spec.name, target = %link.target, bound = %link.bound, number, "cascading parameter link");
                    self.write(state, target, number, link.bound);
                }
            }
        }

        settled.value
    }
}
