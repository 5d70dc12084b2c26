//! Authored data collections.
//!
//! Pure data structures plus their RON loaders. The skill catalog is the
//! only persisted format the core owns.

mod skill_catalog;

pub use skill_catalog::SkillCatalog;
