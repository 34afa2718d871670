// Internal stages of nearest-neighbor graph construction.

pub mod decorate;
pub mod search;
pub mod symmetrize;
pub mod tree;
pub mod weights;
