//! Domain types shared between the runtime and the session collaborator.

pub mod species;

pub use species::{EvolveTarget, Species};
