//! # Engine Module
//!
//! This module implements the molecular alignment engine: deciding whether two molecule
//! records describe the same rigid structure up to translation, rotation, optional
//! reflection and relabeling of interchangeable atoms.
//!
//! ## Overview
//!
//! A comparison proceeds through cheap structural checks before any geometry is solved.
//! Atoms are grouped into interchangeability classes, the compositions and fragment
//! structures are compared, both geometries are centered and their principal spreads
//! compared, and only then are candidate atom mappings enumerated and solved.
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - Tolerance policy and per-call alignment options
//! - **Frames** ([`frame`]) - Centering, principal axes, rank and the inertia pre-filter
//! - **Fingerprints** - Atom classes and per-atom distance fingerprints used for pruning
//! - **Search** - Lazy enumeration of candidate permutations from frame seeds and anchors
//! - **Solver** - Least-squares proper or improper rotation for a fixed permutation
//! - **Decision** ([`decision`]) - Drives the stages above and produces the verdict
//! - **Results** ([`result`]) - Verdicts, mismatch reasons and the recovered alignment
//! - **Progress Monitoring** ([`progress`]) - Callbacks for batch comparisons
//! - **Error Handling** ([`error`]) - Hard failures of an alignment call
//!
//! ## Key Capabilities
//!
//! - **Symmetry-aware search** enumerating one mapping per distinct anchor placement
//! - **Degenerate geometries** handled by rank fallbacks for points, lines and planes
//! - **Mirror images** accepted only when explicitly allowed
//! - **Fragment-aware matching** with fixed or order-invariant fragment pairing
//! - **Bounded effort** through an optional candidate budget

pub mod config;
pub mod decision;
pub mod error;
pub(crate) mod fingerprint;
pub mod frame;
pub mod progress;
pub mod result;
pub(crate) mod search;
pub(crate) mod solver;
