//! Seed management for world generation
//!
//! Each noise layer and the erosion pass get their own seed, derived from a
//! master seed. Injecting explicit seeds everywhere keeps the whole pipeline
//! reproducible from a single number.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Seeds for all generation systems.
#[derive(Clone, Copy, Debug)]
pub struct WorldSeeds {
    /// Master seed (used for display/reference)
    pub master: u64,
    /// Plains noise layer
    pub plains: u64,
    /// Hills noise layer
    pub hills: u64,
    /// Mountains noise layer
    pub mountains: u64,
    /// Droplet erosion (start positions and per-droplet RNG streams)
    pub erosion: u64,
}

impl WorldSeeds {
    /// Create seeds from a master seed, deriving all sub-seeds deterministically.
    pub fn from_master(master: u64) -> Self {
        Self {
            master,
            plains: derive_seed(master, "plains"),
            hills: derive_seed(master, "hills"),
            mountains: derive_seed(master, "mountains"),
            erosion: derive_seed(master, "erosion"),
        }
    }
}

impl Default for WorldSeeds {
    fn default() -> Self {
        Self::from_master(rand::random())
    }
}

/// Derive a sub-seed from a master seed and a system name.
fn derive_seed(master: u64, system: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    master.hash(&mut hasher);
    system.hash(&mut hasher);
    hasher.finish()
}

impl std::fmt::Display for WorldSeeds {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "WorldSeeds {{ master: {}, plains: {}, hills: {}, mountains: {}, erosion: {} }}",
            self.master, self.plains, self.hills, self.mountains, self.erosion,
        )
    }
}
