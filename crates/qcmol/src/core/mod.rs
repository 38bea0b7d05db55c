//! # Core Module
//!
//! Stateless building blocks shared by the alignment engine and by user-facing workflows.
//!
//! ## Architecture
//!
//! - **Reference Data** ([`data`]) - Versioned element table and CODATA physical constants
//! - **Molecular Representation** ([`models`]) - Atoms, fragment partitions and validated molecules
//! - **File I/O** ([`io`]) - XYZ reading/writing and program-specific geometry strings
//! - **Utilities** ([`utils`]) - Centroids, RMSD and distance helpers
//!
//! Everything in this layer is immutable once constructed and safe to share between threads.

pub mod data;
pub mod io;
pub mod models;
pub mod utils;
