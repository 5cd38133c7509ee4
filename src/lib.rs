//! Tiled-world terrain generation library
//!
//! Re-exports modules for use by binaries and tools.

pub mod biomes;
pub mod chunks;
pub mod config;
pub mod erosion;
pub mod export;
pub mod noise_field;
pub mod river_sand;
pub mod seeds;
pub mod tilemap;
pub mod world;
