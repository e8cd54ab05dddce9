//! DVM bridge configuration management
//!
//! This crate provides configuration loading and parsing for the FNE audio bridge:
//! - TOML configuration file parsing
//! - Validated, shared bridge configuration

pub mod bridge_config;
pub mod toml_config;

pub use bridge_config::*;
pub use toml_config::*;
