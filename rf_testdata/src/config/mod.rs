//! Configuration module for the test-data parser
//! Compile-time limits are generated from TOML configuration by build.rs

// Generated from config/<profile>.toml at the workspace root
include!(concat!(env!("OUT_DIR"), "/constants.rs"));

pub mod runtime;
