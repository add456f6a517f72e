pub mod config;
pub mod engine;
pub mod error;
pub mod feature;
pub mod fixer;
pub mod logging;
pub mod pipeline;

#[cfg(test)]
mod test_support;

pub use config::{BuildConfig, ProjectPaths, RunOptions};
pub use engine::{DissolveKey, GeometryEngine, PlanarEngine};
pub use error::{BuildError, GeometryError};
pub use feature::{Feature, FeatureId, FeatureKind, Properties};
pub use fixer::{FixOptions, fix_file};
pub use pipeline::{BuildSummary, build, build_with};
