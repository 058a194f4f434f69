//! Common utilities for the Koala renderer.
//!
//! This crate provides shared infrastructure used by the style and layout crates:
//! - **Diagnostics** - deduplicated warnings for unsupported or malformed input,
//!   routed through the [`log`] facade

pub mod warning;
