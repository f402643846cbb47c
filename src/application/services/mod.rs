//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Each service is built from its section of the settings.

mod feeding;
mod package;

pub use feeding::{Chain, FeedingService, Serving};
pub use package::{DemoPackage, PackageService};
