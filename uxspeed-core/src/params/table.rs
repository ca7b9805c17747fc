use std::collections::HashMap;

use super::error::{RegistryError, RegistryResult};
use super::spec::{standard_specs, ParameterSpec};

/// Immutable, validated set of parameter specs.
///
/// Construction rejects duplicate names, links to unknown parameters and any
/// cycle in the link graph, so cascades always terminate.
#[derive(Debug, Clone)]
pub struct ParameterTable {
    specs: Vec<ParameterSpec>,
    index: HashMap<String, usize>,
}

#[derive(Clone, Copy, PartialEq)]
enum Visit {
    Pending,
    Active,
    Done,
}

impl ParameterTable {
    pub fn new(specs: Vec<ParameterSpec>) -> RegistryResult<Self> {
        let mut index = HashMap::with_capacity(specs.len());
        for (position, spec) in specs.iter().enumerate() {
            if !spec.step.is_finite() || spec.step <= 0.0 {
                return Err(RegistryError::InvalidStep {
                    name: spec.name.clone(),
                    step: spec.step,
                });
            }
            if let (Some(min), Some(max)) = (spec.min, spec.max) {
                if min > max {
                    return Err(RegistryError::InvalidBounds {
                        name: spec.name.clone(),
                        min,
                        max,
                    });
                }
            }
            if index.insert(spec.name.clone(), position).is_some() {
                return Err(RegistryError::DuplicateParameter {
                    name: spec.name.clone(),
                });
            }
        }

        for spec in &specs {
            for link in &spec.updates {
                if !index.contains_key(&link.target) {
                    return Err(RegistryError::UnknownLinkTarget {
                        source_name: spec.name.clone(),
                        target: link.target.clone(),
                    });
                }
            }
        }

        let table = Self { specs, index };
        table.ensure_acyclic()?;
        Ok(table)
    }

    pub fn standard() -> RegistryResult<Self> {
        Self::new(standard_specs())
    }

    pub fn get(&self, name: &str) -> Option<&ParameterSpec> {
        self.index.get(name).map(|&position| &self.specs[position])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Specs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &ParameterSpec> {
        self.specs.iter()
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    fn ensure_acyclic(&self) -> RegistryResult<()> {
        let mut marks = vec![Visit::Pending; self.specs.len()];
        let mut path = Vec::new();
        for start in 0..self.specs.len() {
            if marks[start] == Visit::Pending {
                self.visit(start, &mut marks, &mut path)?;
            }
        }
        Ok(())
    }

    fn visit(&self, node: usize, marks: &mut [Visit], path: &mut Vec<usize>) -> RegistryResult<()> {
        marks[node] = Visit::Active;
        path.push(node);
        for link in &self.specs[node].updates {
            let next = self.index[&link.target];
            match marks[next] {
                Visit::Done => {}
                Visit::Active => {
                    let from = path.iter().position(|&p| p == next).unwrap_or(0);
                    let mut cycle: Vec<String> = path[from..]
                        .iter()
                        .map(|&p| self.specs[p].name.clone())
                        .collect();
                    cycle.push(self.specs[next].name.clone());
                    return Err(RegistryError::CyclicLinks { path: cycle });
                }
                Visit::Pending => self.visit(next, marks, path)?,
            }
        }
        path.pop();
        marks[node] = Visit::Done;
        Ok(())
    }
}
