//! # Workflows Module
//!
//! High-level entry points that sequence the core and engine layers.
//!
//! - **Prepare Workflow** ([`prepare`]) - Loads the two ligands, obtains an atom mapping,
//!   drives alignment, merging and input generation, writes the mapping log and stages
//!   the five output files.

pub mod prepare;
