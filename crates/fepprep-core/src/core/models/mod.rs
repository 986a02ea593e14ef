//! Data structures describing the two end-state ligands and the correspondence
//! between their atoms.

pub mod atom;
pub mod mapping;
pub mod molecule;
