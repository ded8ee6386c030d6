//! Foundation types for Vitrine.
//!
//! This crate contains the host-agnostic types shared by all Vitrine crates:
//! keyboard input, site configuration, and the error type.

pub mod config;
pub mod error;
pub mod input;
