//! # Engine Module
//!
//! The boundary between this library and the external simulation toolkit, plus the
//! run-level plumbing around it.
//!
//! - **Backend seam** ([`backend`]) - The `PerturbationEngine` trait and the data handed
//!   across it
//! - **Subprocess backend** ([`command`]) - Drives a helper executable, one call per step
//! - **Configuration** ([`config`]) - Run parameters and their builder
//! - **Staging** ([`staging`]) - Renaming outputs and best-effort cleanup
//! - **Progress** ([`progress`]) - Callback-based phase reporting

pub mod backend;
pub mod command;
pub mod config;
pub mod error;
pub mod progress;
pub mod staging;
