//! Compliance checkers that do not go through the rule engine.

mod license;
mod security;
mod source;

pub use license::LicenseValidator;
pub use security::SecurityValidator;
pub use source::SourceValidator;
