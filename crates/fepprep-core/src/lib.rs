//! # fepprep Core Library
//!
//! Preparation of relative free-energy-perturbation (FEP) inputs for a pair of ligands.
//! The expensive chemistry (maximum common substructure search, RMSD alignment and
//! topology merging) is delegated to an external simulation toolkit; this library owns
//! everything around it.
//!
//! ## Architectural Philosophy
//!
//! The library follows a three-layer layout:
//!
//! - **[`core`]: The Foundation.** Stateless data models (`Molecule`, `AtomMapping`,
//!   `Prematch`) and the text formats around them: the mapping file, the mapping log and
//!   the structure readers that supply atom labels.
//!
//! - **[`engine`]: The External Boundary.** The `PerturbationEngine` seam through which the
//!   toolkit is driven, a subprocess-backed implementation of it, run configuration,
//!   progress reporting and the output stager.
//!
//! - **[`workflows`]: The Public API.** The end-to-end `prepare` pipeline that sequences
//!   loading, mapping, alignment, merging, logging and staging.

pub mod core;
pub mod engine;
pub mod workflows;
