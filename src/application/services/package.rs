//! Package service
//!
//! Builds the nail-box demo package and reports its weight.

use generational_arena::Index;
use tracing::{debug, info, instrument};

use crate::application::ApplicationResult;
use crate::config::CompositeConfig;
use crate::domain::{DomainResult, PackageArena};

/// The demo package: a big box holding a box of three nails and a box of one nail.
#[derive(Debug)]
pub struct DemoPackage {
    pub arena: PackageArena,
    pub root: Index,
    /// Box with three nails
    pub triple_box: Index,
    /// Box with a single nail
    pub single_box: Index,
}

impl DemoPackage {
    pub fn total_weight(&self) -> DomainResult<u64> {
        self.arena.weight(self.root)
    }
}

/// Service for assembling package trees from settings.
pub struct PackageService {
    config: CompositeConfig,
}

impl PackageService {
    pub fn new(config: CompositeConfig) -> Self {
        Self { config }
    }

    fn nail(&self, arena: &mut PackageArena) -> Index {
        arena.insert_leaf("nail", self.config.nail_weight)
    }

    fn nail_box(&self, arena: &mut PackageArena, label: &str) -> Index {
        arena.insert_container(label, self.config.box_weight)
    }

    /// Fails when the configured weights overflow the package total.
    #[instrument(level = "debug", skip(self))]
    pub fn build_demo(&self) -> ApplicationResult<DemoPackage> {
        let mut arena = PackageArena::new();

        let triple_box = self.nail_box(&mut arena, "nail package 1");
        for _ in 0..3 {
            let nail = self.nail(&mut arena);
            arena.try_add(triple_box, nail)?;
        }

        let single_box = self.nail_box(&mut arena, "nail package 2");
        let nail = self.nail(&mut arena);
        arena.try_add(single_box, nail)?;

        let root = self.nail_box(&mut arena, "big box of nails");
        arena.try_add(root, triple_box)?;
        arena.try_add(root, single_box)?;
        debug!("demo package assembled: {} nodes", arena.len());

        let package = DemoPackage {
            arena,
            root,
            triple_box,
            single_box,
        };
        let total = package.total_weight()?;
        info!(total, "package weighed");
        Ok(package)
    }
}
