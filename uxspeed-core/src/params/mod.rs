pub mod error;
pub mod raw;
pub mod registry;
pub mod spec;
pub mod state;
pub mod table;

pub use error::{RegistryError, RegistryResult};
pub use raw::{Overrides, RawValue};
pub use registry::ParameterRegistry;
pub use spec::{standard_specs, Bound, DerivedLink, ParameterSpec};
pub use state::{ParameterState, ParameterValue};
pub use table::ParameterTable;
