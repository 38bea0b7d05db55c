use crate::core::models::molecule::{Molecule, MoleculeError};
use nalgebra::{Matrix3, Point3, Vector3};
use std::fmt;

/// Why two molecules were judged different.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MismatchReason {
    /// Atom counts, element/mass multisets or fragment structure differ.
    ShapeMismatch,
    /// Principal spreads differ by more than any admissible alignment allows.
    InertiaMismatch,
    /// Some atom has no partner with a compatible distance fingerprint.
    NoAdmissibleMapping,
    /// Candidates were solved but none fit within tolerance.
    ExceedsTolerance,
}

impl fmt::Display for MismatchReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            MismatchReason::ShapeMismatch => "composition or fragment structure differs",
            MismatchReason::InertiaMismatch => "principal moments of inertia differ",
            MismatchReason::NoAdmissibleMapping => "no admissible atom mapping",
            MismatchReason::ExceedsTolerance => "best fit exceeds tolerance",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verdict {
    Equivalent,
    NotEquivalent(MismatchReason),
    /// The candidate budget ran out before an acceptable fit was found.
    Inconclusive,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Equivalent => f.write_str("equivalent"),
            Verdict::NotEquivalent(reason) => write!(f, "not equivalent ({reason})"),
            Verdict::Inconclusive => f.write_str("inconclusive"),
        }
    }
}

/// Best rigid superposition found for a pair of molecules.
///
/// Reference atom `i` corresponds to mobile atom `permutation[i]`, and
/// `reference[i] ≈ rotation * (mobile[permutation[i]] - mobile_center) + reference_center`.
#[derive(Debug, Clone, PartialEq)]
pub struct Alignment {
    pub permutation: Vec<usize>,
    /// Orthogonal matrix; determinant `-1` when `mirror_used`.
    pub rotation: Matrix3<f64>,
    pub reference_center: Point3<f64>,
    pub mobile_center: Point3<f64>,
    pub rmsd: f64,
    pub max_displacement: f64,
    pub mirror_used: bool,
}

impl Alignment {
    /// Translation of the combined transform `x -> rotation * x + translation`.
    pub fn translation(&self) -> Vector3<f64> {
        self.reference_center.coords - self.rotation * self.mobile_center.coords
    }

    /// Maps a point from the mobile frame into the reference frame.
    pub fn transform_point(&self, point: &Point3<f64>) -> Point3<f64> {
        self.reference_center + self.rotation * (point - self.mobile_center)
    }

    /// The mobile molecule relabeled and moved onto the reference.
    ///
    /// Atom `i` of the returned molecule corresponds to reference atom `i`.
    pub fn apply(&self, mobile: &Molecule) -> Result<Molecule, MoleculeError> {
        let relabeled = mobile.reordered(&self.permutation)?;
        Ok(relabeled.transformed(&self.rotation, &self.translation()))
    }
}

/// Outcome of comparing two molecules. Built fresh for every call.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignmentResult {
    pub verdict: Verdict,
    /// Best alignment found; `None` when no candidate reached the solver.
    pub alignment: Option<Alignment>,
    pub candidates_evaluated: usize,
}

impl AlignmentResult {
    pub fn is_equivalent(&self) -> bool {
        self.verdict == Verdict::Equivalent
    }

    pub(crate) fn rejected(reason: MismatchReason) -> Self {
        Self {
            verdict: Verdict::NotEquivalent(reason),
            alignment: None,
            candidates_evaluated: 0,
        }
    }
}
