//! # Core Module
//!
//! Data models and file formats for FEP input preparation.
//!
//! - **Molecular Representation** ([`models`]) - Labeled atom containers and atom mappings
//! - **File I/O** ([`io`]) - Mapping files, mapping logs and structure label readers

pub mod io;
pub mod models;
