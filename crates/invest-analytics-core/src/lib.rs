pub mod config;
pub mod error;
pub mod normalize;
pub mod series;
pub mod stats;
pub mod types;

#[cfg(feature = "returns")]
pub mod returns;

#[cfg(feature = "correlation")]
pub mod correlation;

#[cfg(feature = "risk")]
pub mod risk;

#[cfg(feature = "rolling")]
pub mod rolling;

#[cfg(feature = "behavioral")]
pub mod behavioral;

#[cfg(feature = "report")]
pub mod report;

pub use config::AnalyticsConfig;
pub use error::AnalyticsError;
pub use types::*;

/// Standard result type for all analytics operations
pub type AnalyticsResult<T> = Result<T, AnalyticsError>;
