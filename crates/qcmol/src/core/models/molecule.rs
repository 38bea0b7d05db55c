use super::atom::Atom;
use super::fragment::{FragmentError, FragmentPartition};
use crate::core::data::elements::ElementTableError;
use nalgebra::{Matrix3, Point3, Vector3};
use std::collections::BTreeMap;
use thiserror::Error;

/// Atoms closer than this (in Bohr) are rejected as coincident unless explicitly permitted.
pub const COINCIDENT_ATOM_THRESHOLD: f64 = 1e-6;

#[derive(Debug, Error)]
pub enum MoleculeError {
    #[error("A molecule must contain at least one atom")]
    Empty,
    #[error(transparent)]
    Element(#[from] ElementTableError),
    #[error("Atom {index} has a non-finite coordinate")]
    NonFiniteCoordinate { index: usize },
    #[error("Atom {index} ({symbol}) has non-positive mass {mass}")]
    NonPositiveMass {
        index: usize,
        symbol: String,
        mass: f64,
    },
    #[error("Atoms {first} and {second} coincide (distance {distance:.3e} Bohr)")]
    CoincidentAtoms {
        first: usize,
        second: usize,
        distance: f64,
    },
    #[error("Invalid fragment partition: {0}")]
    Fragment(#[from] FragmentError),
    #[error("Multiplicity must be at least 1, got {0}")]
    InvalidMultiplicity(u32),
    #[error("Fragment charges sum to {fragment_total} but the molecular charge is {molecular}")]
    ChargeMismatch { fragment_total: f64, molecular: f64 },
    #[error("Reordering of length {len} is not a permutation of {atom_count} atoms")]
    InvalidPermutation { len: usize, atom_count: usize },
    #[error("Expected {expected} positions, got {actual}")]
    PositionCountMismatch { expected: usize, actual: usize },
}

/// A validated molecule record.
///
/// Instances are produced by [`MoleculeBuilder`](super::builder::MoleculeBuilder) or the
/// readers in [`crate::core::io`], which guarantee that:
///
/// - there is at least one atom and every coordinate is finite,
/// - every mass is positive and every symbol was resolved by an element table,
/// - the fragment partition is disjoint and covers all atoms,
/// - no two atoms coincide, unless the builder was told to allow it.
///
/// The record is immutable; transformation helpers return new molecules.
#[derive(Debug, Clone, PartialEq)]
pub struct Molecule {
    pub(crate) name: Option<String>,
    pub(crate) atoms: Vec<Atom>,
    pub(crate) molecular_charge: f64,
    pub(crate) molecular_multiplicity: u32,
    pub(crate) fragments: FragmentPartition,
    pub(crate) fix_com: bool,
    pub(crate) fix_orientation: bool,
    pub(crate) fix_symmetry: Option<String>,
}

impl Molecule {
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    pub fn atom(&self, index: usize) -> Option<&Atom> {
        self.atoms.get(index)
    }

    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    /// Always `false` for a validated molecule.
    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    pub fn molecular_charge(&self) -> f64 {
        self.molecular_charge
    }

    pub fn molecular_multiplicity(&self) -> u32 {
        self.molecular_multiplicity
    }

    pub fn fragments(&self) -> &FragmentPartition {
        &self.fragments
    }

    pub fn fix_com(&self) -> bool {
        self.fix_com
    }

    pub fn fix_orientation(&self) -> bool {
        self.fix_orientation
    }

    pub fn fix_symmetry(&self) -> Option<&str> {
        self.fix_symmetry.as_deref()
    }

    pub fn positions(&self) -> Vec<Point3<f64>> {
        self.atoms.iter().map(|a| a.position).collect()
    }

    pub fn masses(&self) -> Vec<f64> {
        self.atoms.iter().map(|a| a.mass).collect()
    }

    pub fn total_mass(&self) -> f64 {
        self.atoms.iter().map(|a| a.mass).sum()
    }

    /// Number of electrons implied by the real atoms and the molecular charge.
    pub fn electron_count(&self) -> i64 {
        let nuclear: u32 = self
            .atoms
            .iter()
            .filter(|a| a.real)
            .map(|a| a.atomic_number)
            .sum();
        nuclear as i64 - self.molecular_charge.round() as i64
    }

    /// Hill-style formula with symbols sorted lexically, e.g. `AgCCaO2`.
    ///
    /// Ghost atoms are counted as well, matching how geometry is written out.
    pub fn formula(&self) -> String {
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for atom in &self.atoms {
            *counts.entry(atom.symbol.as_str()).or_default() += 1;
        }
        counts
            .into_iter()
            .map(|(symbol, count)| {
                if count > 1 {
                    format!("{symbol}{count}")
                } else {
                    symbol.to_string()
                }
            })
            .collect()
    }

    /// Copy of this molecule with every atom moved to a new position.
    pub fn with_positions(&self, positions: &[Point3<f64>]) -> Result<Molecule, MoleculeError> {
        if positions.len() != self.atoms.len() {
            return Err(MoleculeError::PositionCountMismatch {
                expected: self.atoms.len(),
                actual: positions.len(),
            });
        }
        let mut molecule = self.clone();
        for (index, (atom, position)) in molecule.atoms.iter_mut().zip(positions).enumerate() {
            if !position.iter().all(|c| c.is_finite()) {
                return Err(MoleculeError::NonFiniteCoordinate { index });
            }
            atom.position = *position;
        }
        Ok(molecule)
    }

    /// Applies `x -> rotation * x + translation` to every atom.
    pub fn transformed(&self, rotation: &Matrix3<f64>, translation: &Vector3<f64>) -> Molecule {
        let mut molecule = self.clone();
        for atom in &mut molecule.atoms {
            atom.position = Point3::from(rotation * atom.position.coords + translation);
        }
        molecule
    }

    /// Copy with atoms reordered so that new atom `k` is old atom `order[k]`.
    ///
    /// Fragment membership travels with the atoms.
    pub fn reordered(&self, order: &[usize]) -> Result<Molecule, MoleculeError> {
        let atom_count = self.atoms.len();
        let mut seen = vec![false; atom_count];
        let is_permutation = order.len() == atom_count
            && order
                .iter()
                .all(|&i| i < atom_count && !std::mem::replace(&mut seen[i], true));
        if !is_permutation {
            return Err(MoleculeError::InvalidPermutation {
                len: order.len(),
                atom_count,
            });
        }

        let mut molecule = self.clone();
        molecule.atoms = order.iter().map(|&i| self.atoms[i].clone()).collect();
        molecule.fragments = self.fragments.reordered(order);
        Ok(molecule)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::data::elements::PeriodicTable;
    use crate::core::models::builder::MoleculeBuilder;

    fn water() -> Molecule {
        let mut builder = MoleculeBuilder::new();
        builder
            .atom("O", [0.0, 0.0, 0.0])
            .atom("H", [0.0, 1.43, 1.1])
            .atom("H", [0.0, -1.43, 1.1]);
        builder.build(&PeriodicTable::new()).unwrap()
    }

    #[test]
    fn formula_sorts_symbols_and_counts_repeats() {
        assert_eq!(water().formula(), "H2O");

        let mut builder = MoleculeBuilder::new();
        builder
            .atom("Ca", [0.0, 0.0, 0.0])
            .atom("O", [3.0, 0.0, 0.0])
            .atom("Ag", [0.0, 3.0, 0.0])
            .atom("C", [0.0, 0.0, 3.0])
            .atom("O", [3.0, 3.0, 0.0]);
        let molecule = builder.build(&PeriodicTable::new()).unwrap();
        assert_eq!(molecule.formula(), "AgCCaO2");
    }

    #[test]
    fn electron_count_uses_real_atoms_and_charge() {
        assert_eq!(water().electron_count(), 10);
    }

    #[test]
    fn reordered_moves_atoms_and_validates_order() {
        let molecule = water();
        let reordered = molecule.reordered(&[2, 1, 0]).unwrap();
        assert_eq!(reordered.atoms()[2].symbol, "O");
        assert_eq!(reordered.atoms()[0].position, molecule.atoms()[2].position);

        assert!(matches!(
            molecule.reordered(&[0, 0, 1]),
            Err(MoleculeError::InvalidPermutation { .. })
        ));
        assert!(matches!(
            molecule.reordered(&[0, 1]),
            Err(MoleculeError::InvalidPermutation { .. })
        ));
    }

    #[test]
    fn transformed_applies_rotation_then_translation() {
        let molecule = water();
        let rotation = Matrix3::new(0.0, -1.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0);
        let moved = molecule.transformed(&rotation, &Vector3::new(1.0, 0.0, 0.0));
        let h = moved.atoms()[1].position;
        assert!((h.x - (1.0 - 1.43)).abs() < 1e-12);
        assert!(h.y.abs() < 1e-12);
        assert!((h.z - 1.1).abs() < 1e-12);
    }

    #[test]
    fn with_positions_checks_length_and_finiteness() {
        let molecule = water();
        assert!(matches!(
            molecule.with_positions(&[Point3::origin()]),
            Err(MoleculeError::PositionCountMismatch { expected: 3, actual: 1 })
        ));
        let bad = vec![
            Point3::origin(),
            Point3::new(f64::NAN, 0.0, 0.0),
            Point3::new(1.0, 1.0, 1.0),
        ];
        assert!(matches!(
            molecule.with_positions(&bad),
            Err(MoleculeError::NonFiniteCoordinate { index: 1 })
        ));
    }
}
