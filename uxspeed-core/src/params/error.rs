use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("parameter not found: {0}")]
    UnknownParameter(String),
    #[error("parameter {0} missing from state")]
    MissingValue(String),
    #[error("parameter {name} declared more than once")]
    DuplicateParameter { name: String },
    #[error("parameter {source_name} links to unknown parameter {target}")]
    UnknownLinkTarget { source_name: String, target: String },
    #[error("cyclic parameter links: {}", path.join(" -> "))]
    CyclicLinks { path: Vec<String> },
    #[error("invalid bounds for {name}: min {min} is greater than max {max}")]
    InvalidBounds { name: String, min: f64, max: f64 },
    #[error("invalid step for {name}: {step}")]
    InvalidStep { name: String, step: f64 },
}

pub type RegistryResult<T> = std::result::Result<T, RegistryError>;
