use super::config::TolerancePolicy;
use crate::core::models::molecule::Molecule;

/// Interchangeability classes shared by the atoms of two molecules.
///
/// Two atoms share a class when they have the same element symbol and ghost flag and,
/// if isotopes are matched, masses within the mass tolerance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct AtomClasses {
    pub reference: Vec<usize>,
    pub mobile: Vec<usize>,
    pub count: usize,
}

pub(crate) fn classify(
    reference: &Molecule,
    mobile: &Molecule,
    tolerances: &TolerancePolicy,
) -> AtomClasses {
    let mut entries: Vec<(&str, bool, f64, bool, usize)> = reference
        .atoms()
        .iter()
        .enumerate()
        .map(|(i, a)| (a.symbol.as_str(), a.real, a.mass, false, i))
        .chain(
            mobile
                .atoms()
                .iter()
                .enumerate()
                .map(|(i, a)| (a.symbol.as_str(), a.real, a.mass, true, i)),
        )
        .collect();
    entries.sort_by(|a, b| {
        a.0.cmp(b.0)
            .then(a.1.cmp(&b.1))
            .then(a.2.total_cmp(&b.2))
            .then(a.3.cmp(&b.3))
            .then(a.4.cmp(&b.4))
    });

    let mut classes = AtomClasses {
        reference: vec![0; reference.len()],
        mobile: vec![0; mobile.len()],
        count: 0,
    };
    let mut current: Option<(&str, bool, f64)> = None;
    for (symbol, real, mass, is_mobile, index) in entries {
        let starts_new = match current {
            None => true,
            Some((s, r, first_mass)) => {
                s != symbol
                    || r != real
                    || (tolerances.match_isotopes()
                        && mass - first_mass > tolerances.mass_tolerance())
            }
        };
        if starts_new {
            classes.count += 1;
            current = Some((symbol, real, mass));
        }
        let class = classes.count - 1;
        if is_mobile {
            classes.mobile[index] = class;
        } else {
            classes.reference[index] = class;
        }
    }
    classes
}

fn histogram(classes: &[usize], atoms: impl Iterator<Item = usize>, count: usize) -> Vec<usize> {
    let mut counts = vec![0; count];
    for atom in atoms {
        counts[classes[atom]] += 1;
    }
    counts
}

/// Class histogram of every fragment, in fragment order.
pub(crate) fn fragment_signatures(
    molecule: &Molecule,
    classes: &[usize],
    count: usize,
) -> Vec<Vec<usize>> {
    molecule
        .fragments()
        .fragments()
        .iter()
        .map(|fragment| histogram(classes, fragment.atoms.iter().copied(), count))
        .collect()
}

/// Cheap structural comparison done before any geometry is looked at.
pub(crate) fn shapes_match(
    reference: &Molecule,
    mobile: &Molecule,
    classes: &AtomClasses,
    fragment_order_invariant: bool,
) -> bool {
    if reference.len() != mobile.len() {
        return false;
    }
    let ref_counts = histogram(&classes.reference, 0..reference.len(), classes.count);
    let mob_counts = histogram(&classes.mobile, 0..mobile.len(), classes.count);
    if ref_counts != mob_counts {
        return false;
    }

    let mut ref_fragments = fragment_signatures(reference, &classes.reference, classes.count);
    let mut mob_fragments = fragment_signatures(mobile, &classes.mobile, classes.count);
    if ref_fragments.len() != mob_fragments.len() {
        return false;
    }
    if fragment_order_invariant {
        ref_fragments.sort();
        mob_fragments.sort();
    }
    ref_fragments == mob_fragments
}

/// Distances from one atom to every other atom, grouped by class and sorted.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Fingerprint {
    entries: Vec<(usize, f64)>,
}

impl Fingerprint {
    pub fn new(atom: usize, classes: &[usize], distances: &[Vec<f64>]) -> Self {
        let mut entries: Vec<(usize, f64)> = (0..classes.len())
            .filter(|&other| other != atom)
            .map(|other| (classes[other], distances[atom][other]))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0).then(a.1.total_cmp(&b.1)));
        Self { entries }
    }

    /// Largest elementwise deviation, or `None` if any exceeds `tolerance`.
    pub fn deviation(&self, other: &Fingerprint, tolerance: f64) -> Option<f64> {
        if self.entries.len() != other.entries.len() {
            return None;
        }
        let mut worst = 0.0f64;
        for (&(class_a, d_a), &(class_b, d_b)) in self.entries.iter().zip(&other.entries) {
            let diff = (d_a - d_b).abs();
            if class_a != class_b || !(diff <= tolerance) {
                return None;
            }
            worst = worst.max(diff);
        }
        Some(worst)
    }
}

/// Mobile partners admissible for every reference atom, best fingerprint match first.
///
/// `fragment_compatible(i, j)` decides whether reference atom `i` may ever pair with
/// mobile atom `j` on fragment grounds.
pub(crate) fn admissible_partners(
    classes: &AtomClasses,
    reference_distances: &[Vec<f64>],
    mobile_distances: &[Vec<f64>],
    tolerance: f64,
    fragment_compatible: impl Fn(usize, usize) -> bool,
) -> Vec<Vec<usize>> {
    let reference_prints: Vec<Fingerprint> = (0..classes.reference.len())
        .map(|i| Fingerprint::new(i, &classes.reference, reference_distances))
        .collect();
    let mobile_prints: Vec<Fingerprint> = (0..classes.mobile.len())
        .map(|j| Fingerprint::new(j, &classes.mobile, mobile_distances))
        .collect();

    reference_prints
        .iter()
        .enumerate()
        .map(|(i, print)| {
            let mut partners: Vec<(f64, usize)> = mobile_prints
                .iter()
                .enumerate()
                .filter(|&(j, _)| classes.reference[i] == classes.mobile[j])
                .filter(|&(j, _)| fragment_compatible(i, j))
                .filter_map(|(j, other)| print.deviation(other, tolerance).map(|d| (d, j)))
                .collect();
            partners.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
            partners.into_iter().map(|(_, j)| j).collect()
        })
        .collect()
}
