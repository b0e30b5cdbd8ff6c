//! License file discovery and classification.
//!
//! - [`finder`]: picks license files out of a module directory by name.
//! - [`classifier`]: detects license types from file content.
//! - [`spdx`]: maps detected license identifiers to a [`LicenseRisk`](crate::models::LicenseRisk).

pub mod classifier;
pub mod finder;
pub mod spdx;
