//! # Core Models Module
//!
//! Validated molecule records consumed by the alignment engine and produced by the
//! readers in [`crate::core::io`].
//!
//! ## Key Components
//!
//! - [`atom`] - A single atom: element, mass, charge, position in Bohr, ghost flag
//! - [`fragment`] - Disjoint, covering partitions of atoms into fragments
//! - [`molecule`] - The immutable [`Molecule`](molecule::Molecule) record and its errors
//! - [`builder`] - [`MoleculeBuilder`](builder::MoleculeBuilder), which resolves symbols
//!   through an element table, converts units and validates every invariant
//!
//! ## Usage
//!
//! ```
//! use qcmol::core::data::elements::PeriodicTable;
//! use qcmol::core::models::builder::MoleculeBuilder;
//!
//! let mut builder = MoleculeBuilder::new();
//! builder
//!     .atom("O", [0.0, 0.0, 0.0])
//!     .atom("H", [0.0, 1.43, 1.1])
//!     .atom("H", [0.0, -1.43, 1.1]);
//! let water = builder.build(&PeriodicTable::new()).unwrap();
//! assert_eq!(water.formula(), "H2O");
//! ```

pub mod atom;
pub mod builder;
pub mod fragment;
pub mod molecule;
