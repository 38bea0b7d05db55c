//! # Workflows Module
//!
//! This module provides the high-level entry points that tie the alignment engine and the
//! core data layer together.
//!
//! ## Overview
//!
//! Workflows are the top-level API for users of qcmol. Each one takes validated molecule
//! records, an alignment configuration and an element table, logs what it is doing and
//! returns a self-contained report.
//!
//! ## Architecture
//!
//! - **Alignment Workflow** ([`align`]) - Compares one pair of molecules and returns the
//!   verdict together with the permutation, rotation and RMSD of the best fit.
//! - **Deduplication Workflow** ([`dedup`]) - Collapses a batch of molecules into
//!   structurally distinct representatives, comparing pairs in parallel.
//!
//! ## Key Capabilities
//!
//! - **Simple boolean checks** through [`align::is_equivalent`]
//! - **Progress monitoring** for batch comparisons
//! - **Deterministic results** independent of thread scheduling

pub mod align;
pub mod dedup;
