//! Composite weight aggregation and chain-of-responsibility dispatch.
//!
//! - [`domain::PackageArena`]: arena-backed tree of leaves and containers
//!   with recursive weight aggregation.
//! - [`domain::Handler`]: linked handlers that resolve a request or pass it on.
//!
//! The [`application`] services and the [`cli`] wire both into the `gof` demo binary.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod util;
