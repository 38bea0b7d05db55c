//! # Reference Data Module
//!
//! Versioned, read-only reference data consumed by the rest of the crate.
//!
//! - [`elements`] - Element symbols, atomic numbers, isotopic masses and covalent radii,
//!   exposed through the injectable [`elements::ElementTable`] trait
//! - [`constants`] - CODATA physical constants with unit metadata and length-unit conversion

pub mod constants;
pub mod elements;
