//! Utility modules

pub mod fuzzy;

pub use fuzzy::{closest_match, process, ratio, token_set_ratio, FuzzyMatch};
