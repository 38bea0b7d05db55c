//! Provides input/output functionality for molecular geometry formats.
//!
//! XYZ files can be read and written through the [`traits::MolecularFile`] interface;
//! [`format::to_string`] renders a molecule as input for a range of quantum-chemistry
//! programs.

pub mod format;
pub mod traits;
pub mod xyz;
