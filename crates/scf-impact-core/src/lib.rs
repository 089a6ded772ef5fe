pub mod error;
pub mod types;

#[cfg(feature = "impact")]
pub mod impact;

#[cfg(feature = "sensitivity")]
pub mod sensitivity;

#[cfg(feature = "store")]
pub mod store;

pub use error::ImpactError;
pub use types::*;

/// Standard result type for all scf-impact operations
pub type ImpactResult<T> = Result<T, ImpactError>;
