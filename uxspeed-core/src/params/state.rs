use std::collections::HashMap;

use super::spec::Bound;

/// Current value and live bounds of one parameter.
///
/// Missing declared bounds are stored as infinities.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParameterValue {
    pub value: f64,
    pub min: f64,
    pub max: f64,
}

impl ParameterValue {
    pub fn new(value: f64, min: Option<f64>, max: Option<f64>) -> Self {
        Self {
            value,
            min: min.unwrap_or(f64::NEG_INFINITY),
            max: max.unwrap_or(f64::INFINITY),
        }
    }

    pub fn get(&self, bound: Bound) -> f64 {
        match bound {
            Bound::Value => self.value,
            Bound::Min => self.min,
            Bound::Max => self.max,
        }
    }

    pub(crate) fn put(&mut self, bound: Bound, number: f64) {
        match bound {
            Bound::Value => self.value = number,
            Bound::Min => self.min = number,
            Bound::Max => self.max = number,
        }
    }

    /// Restores `min <= value <= max`, raising an inverted `max` to `min` first.
    pub(crate) fn settle(&mut self) {
        if self.max < self.min {
            self.max = self.min;
        }
        if self.value < self.min {
            self.value = self.min;
        }
        if self.value > self.max {
            self.value = self.max;
        }
    }
}

/// Current values of every registered parameter.
///
/// Only [`ParameterRegistry`](super::ParameterRegistry) mutates a state; everything
/// else reads it. Lookup is by name; ordered output walks the
/// [`ParameterTable`](super::ParameterTable) instead of this map.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterState {
    values: HashMap<String, ParameterValue>,
}

impl ParameterState {
    pub fn get(&self, name: &str) -> Option<&ParameterValue> {
        self.values.get(name)
    }

    pub fn value(&self, name: &str) -> Option<f64> {
        self.values.get(name).map(|entry| entry.value)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParameterValue)> {
        self.values.iter().map(|(name, entry)| (name.as_str(), entry))
    }

    pub(crate) fn insert(&mut self, name: String, entry: ParameterValue) {
        self.values.insert(name, entry);
    }

    pub(crate) fn get_mut(&mut self, name: &str) -> Option<&mut ParameterValue> {
        self.values.get_mut(name)
    }
}
