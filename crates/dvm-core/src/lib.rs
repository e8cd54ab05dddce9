//! Core utilities for the DVM FNE audio bridge
//!
//! This crate provides fundamental types and utilities used across the bridge:
//! - BitBuffer for bit-level field packing
//! - FrameParseErr, the error type of all wire decoders
//! - Common identifiers and constants
//! - Logging setup

pub mod bitbuffer;
pub mod bridge_common;
pub mod debug;
pub mod frame_parse_error;

// Re-export commonly used items
pub use bitbuffer::BitBuffer;
pub use bridge_common::*;
pub use frame_parse_error::FrameParseErr;
