//! Provides input/output functionality for FEP preparation.
//!
//! This module covers the mapping file format (read and write), the human-readable
//! mapping log, and a set of lightweight structure readers that extract atom labels
//! from the topology files handed to the external toolkit.

pub mod error;
pub mod formats;
pub mod mapping_file;
pub mod mapping_log;
pub mod mol2;
pub mod pdb;
pub mod prm7;
pub mod traits;
