//! Application layer: services and use cases
//!
//! This layer wires domain objects from settings and runs the demo scenarios.

pub mod error;
pub mod services;

pub use error::{ApplicationError, ApplicationResult};
pub use services::{Chain, DemoPackage, FeedingService, PackageService, Serving};
