//! # qcmol Core Library
//!
//! Molecule records for quantum-chemistry workflows, together with an alignment engine that
//! decides whether two records describe the same rigid structure and recovers the atom
//! mapping, rotation and RMSD that superimpose them.
//!
//! ## Architectural Philosophy
//!
//! The library is designed with a strict three-layer architecture to ensure a clear
//! separation of concerns, making it modular, testable, and extensible.
//!
//! - **[`core`]: The Foundation.** Contains stateless data: the element table and CODATA
//!   constants (`data`), validated molecule records and their builder (`models`), geometry
//!   helpers (`utils`), and XYZ reading plus program-specific input rendering (`io`).
//!
//! - **[`engine`]: The Logic Core.** Implements the alignment pipeline: principal frames and the
//!   inertia pre-filter, distance fingerprints, the lazy candidate permutation search, the
//!   rigid solver, and the equivalence decision that ties them together.
//!
//! - **[`workflows`]: The Public API.** This is the highest-level, user-facing layer. It ties the
//!   `engine` and `core` together into single-pair alignment and batch deduplication.
//!
//! ## Example
//!
//! ```
//! use qcmol::core::data::elements::PeriodicTable;
//! use qcmol::core::models::builder::MoleculeBuilder;
//! use qcmol::engine::config::AlignmentConfig;
//! use qcmol::workflows::align;
//!
//! let table = PeriodicTable::new();
//! let mut builder = MoleculeBuilder::new();
//! builder
//!     .atom("O", [0.0, 0.0, 0.0])
//!     .atom("H", [0.0, 1.43, 1.11])
//!     .atom("H", [0.0, -1.43, 1.11]);
//! let water = builder.build(&table).unwrap();
//!
//! let result = align::run(&water, &water, &AlignmentConfig::default(), &table).unwrap();
//! assert!(result.is_equivalent());
//! ```

pub mod core;
pub mod engine;
pub mod workflows;
