//! Domain layer: composite package trees and handler chains
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod chain;
pub mod composite;
pub mod error;

pub use chain::{chain_from, Animal, AnimalHandler, Handler, HandlerRef, Successor};
pub use composite::{
    Component, NodeData, PackageArena, PackageNode, NAIL_BOX_WEIGHT, NAIL_WEIGHT,
};
pub use error::{DomainError, DomainResult};
