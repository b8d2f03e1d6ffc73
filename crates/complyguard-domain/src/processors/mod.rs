//! Stages that prepare the artifact set before compliance checks run.

mod config_checker;
mod config_handlers;
mod license_resolver;

pub use config_checker::ConfigurationChecker;
pub use config_handlers::{AdditionHandler, OverrideHandler, RemovalHandler};
pub use license_resolver::LicenseResolver;
