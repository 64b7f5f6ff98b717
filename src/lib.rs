//! VR Tools Library
//!
//! Scene-authoring panels for VR review: fuzzy material matching, batch
//! rename, material assign/export, FBX conversion and a turntable.

pub mod audit;
pub mod config;
pub mod error;
pub mod host;
pub mod matcher;
pub mod review;
pub mod tools;
pub mod utils;
