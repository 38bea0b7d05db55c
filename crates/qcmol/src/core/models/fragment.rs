use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum FragmentError {
    #[error("Fragment {0} contains no atoms")]
    EmptyFragment(usize),
    #[error("Atom index {index} is out of range for {atom_count} atoms")]
    IndexOutOfRange { index: usize, atom_count: usize },
    #[error("Atom {0} is assigned to more than one fragment")]
    DuplicateIndex(usize),
    #[error("Atom {0} is not assigned to any fragment")]
    UnassignedAtom(usize),
    #[error("Fragment separators must be strictly increasing and inside (0, {atom_count})")]
    InvalidSeparators { atom_count: usize },
    #[error("Expected {expected} per-fragment {field}, got {actual}")]
    LengthMismatch {
        field: &'static str,
        expected: usize,
        actual: usize,
    },
}

/// A chemically distinct sub-molecule: a set of atom indices with its own charge and multiplicity.
#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    /// Atom indices in ascending order.
    pub atoms: Vec<usize>,
    pub charge: f64,
    pub multiplicity: u32,
}

/// Disjoint, covering partition of a molecule's atoms into fragments.
///
/// Fragment order is significant: unless fragment-order-invariant matching is requested,
/// alignment pairs fragment `k` of one molecule only with fragment `k` of the other.
#[derive(Debug, Clone, PartialEq)]
pub struct FragmentPartition {
    fragments: Vec<Fragment>,
    membership: Vec<usize>,
}

impl FragmentPartition {
    /// A single fragment holding every atom.
    pub fn single(atom_count: usize) -> Self {
        Self {
            fragments: vec![Fragment {
                atoms: (0..atom_count).collect(),
                charge: 0.0,
                multiplicity: 1,
            }],
            membership: vec![0; atom_count],
        }
    }

    /// Contiguous fragments split before each separator index.
    ///
    /// `separators = [3]` on five atoms yields fragments `[0, 1, 2]` and `[3, 4]`.
    pub fn from_separators(atom_count: usize, separators: &[usize]) -> Result<Self, FragmentError> {
        let mut bounds = Vec::with_capacity(separators.len() + 2);
        bounds.push(0);
        for &sep in separators {
            let previous = bounds.last().copied().unwrap_or(0);
            if sep <= previous || sep >= atom_count {
                return Err(FragmentError::InvalidSeparators { atom_count });
            }
            bounds.push(sep);
        }
        bounds.push(atom_count);

        let groups = bounds.windows(2).map(|w| (w[0]..w[1]).collect()).collect();
        Self::from_indices(atom_count, groups)
    }

    /// Explicit fragments. Indices are sorted within each fragment; fragment order is kept.
    pub fn from_indices(atom_count: usize, groups: Vec<Vec<usize>>) -> Result<Self, FragmentError> {
        let mut membership: Vec<Option<usize>> = vec![None; atom_count];
        let mut fragments = Vec::with_capacity(groups.len());

        for (fragment_index, mut atoms) in groups.into_iter().enumerate() {
            if atoms.is_empty() {
                return Err(FragmentError::EmptyFragment(fragment_index));
            }
            atoms.sort_unstable();
            for &atom in &atoms {
                let slot = membership
                    .get_mut(atom)
                    .ok_or(FragmentError::IndexOutOfRange {
                        index: atom,
                        atom_count,
                    })?;
                if slot.is_some() {
                    return Err(FragmentError::DuplicateIndex(atom));
                }
                *slot = Some(fragment_index);
            }
            fragments.push(Fragment {
                atoms,
                charge: 0.0,
                multiplicity: 1,
            });
        }

        let membership = membership
            .into_iter()
            .enumerate()
            .map(|(atom, fragment)| fragment.ok_or(FragmentError::UnassignedAtom(atom)))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            fragments,
            membership,
        })
    }

    pub fn with_charges(
        mut self,
        charges: &[f64],
        multiplicities: &[u32],
    ) -> Result<Self, FragmentError> {
        if charges.len() != self.fragments.len() {
            return Err(FragmentError::LengthMismatch {
                field: "charges",
                expected: self.fragments.len(),
                actual: charges.len(),
            });
        }
        if multiplicities.len() != self.fragments.len() {
            return Err(FragmentError::LengthMismatch {
                field: "multiplicities",
                expected: self.fragments.len(),
                actual: multiplicities.len(),
            });
        }
        for ((fragment, &charge), &multiplicity) in
            self.fragments.iter_mut().zip(charges).zip(multiplicities)
        {
            fragment.charge = charge;
            fragment.multiplicity = multiplicity;
        }
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    pub fn atom_count(&self) -> usize {
        self.membership.len()
    }

    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }

    pub fn fragment_of(&self, atom: usize) -> usize {
        self.membership[atom]
    }

    pub fn membership(&self) -> &[usize] {
        &self.membership
    }

    /// Whether every fragment is a contiguous index range and fragments appear in index order.
    pub fn is_contiguous(&self) -> bool {
        let mut next = 0;
        for fragment in &self.fragments {
            for &atom in &fragment.atoms {
                if atom != next {
                    return false;
                }
                next += 1;
            }
        }
        true
    }

    /// Separator indices for a contiguous partition, `None` otherwise.
    pub fn separators(&self) -> Option<Vec<usize>> {
        if !self.is_contiguous() {
            return None;
        }
        Some(
            self.fragments
                .iter()
                .skip(1)
                .map(|fragment| fragment.atoms[0])
                .collect(),
        )
    }

    /// The partition after reordering atoms so that new atom `k` is old atom `order[k]`.
    pub(crate) fn reordered(&self, order: &[usize]) -> Self {
        let mut new_index = vec![0; order.len()];
        for (new, &old) in order.iter().enumerate() {
            new_index[old] = new;
        }
        let fragments = self
            .fragments
            .iter()
            .map(|fragment| {
                let mut atoms: Vec<usize> = fragment.atoms.iter().map(|&a| new_index[a]).collect();
                atoms.sort_unstable();
                Fragment {
                    atoms,
                    charge: fragment.charge,
                    multiplicity: fragment.multiplicity,
                }
            })
            .collect();
        let membership = order.iter().map(|&old| self.membership[old]).collect();
        Self {
            fragments,
            membership,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_partition_contains_every_atom() {
        let partition = FragmentPartition::single(4);
        assert_eq!(partition.len(), 1);
        assert_eq!(partition.fragments()[0].atoms, vec![0, 1, 2, 3]);
        assert_eq!(partition.separators(), Some(vec![]));
    }

    #[test]
    fn separators_split_contiguous_ranges() {
        let partition = FragmentPartition::from_separators(5, &[3]).unwrap();
        assert_eq!(partition.len(), 2);
        assert_eq!(partition.fragments()[0].atoms, vec![0, 1, 2]);
        assert_eq!(partition.fragments()[1].atoms, vec![3, 4]);
        assert_eq!(partition.fragment_of(4), 1);
        assert_eq!(partition.separators(), Some(vec![3]));
    }

    #[test]
    fn separators_must_be_increasing_and_in_range() {
        assert_eq!(
            FragmentPartition::from_separators(5, &[3, 2]),
            Err(FragmentError::InvalidSeparators { atom_count: 5 })
        );
        assert!(FragmentPartition::from_separators(5, &[0]).is_err());
        assert!(FragmentPartition::from_separators(5, &[5]).is_err());
    }

    #[test]
    fn explicit_fragments_are_sorted_and_validated() {
        let partition = FragmentPartition::from_indices(4, vec![vec![3, 1], vec![0, 2]]).unwrap();
        assert_eq!(partition.fragments()[0].atoms, vec![1, 3]);
        assert_eq!(partition.membership(), &[1, 0, 1, 0]);
        assert!(!partition.is_contiguous());
        assert_eq!(partition.separators(), None);
    }

    #[test]
    fn explicit_fragments_reject_bad_coverage() {
        assert_eq!(
            FragmentPartition::from_indices(3, vec![vec![0, 1]]),
            Err(FragmentError::UnassignedAtom(2))
        );
        assert_eq!(
            FragmentPartition::from_indices(3, vec![vec![0, 1], vec![1, 2]]),
            Err(FragmentError::DuplicateIndex(1))
        );
        assert_eq!(
            FragmentPartition::from_indices(2, vec![vec![0, 1], vec![]]),
            Err(FragmentError::EmptyFragment(1))
        );
        assert_eq!(
            FragmentPartition::from_indices(2, vec![vec![0, 7]]),
            Err(FragmentError::IndexOutOfRange {
                index: 7,
                atom_count: 2
            })
        );
    }

    #[test]
    fn charges_must_match_fragment_count() {
        let partition = FragmentPartition::from_separators(4, &[2]).unwrap();
        let charged = partition.clone().with_charges(&[1.0, -1.0], &[2, 2]).unwrap();
        assert_eq!(charged.fragments()[1].charge, -1.0);
        assert_eq!(charged.fragments()[0].multiplicity, 2);
        assert!(matches!(
            partition.with_charges(&[0.0], &[1, 1]),
            Err(FragmentError::LengthMismatch { field: "charges", .. })
        ));
    }

    #[test]
    fn reordering_moves_atoms_between_indices() {
        let partition = FragmentPartition::from_separators(4, &[2]).unwrap();
        let reordered = partition.reordered(&[3, 2, 1, 0]);
        assert_eq!(reordered.fragments()[0].atoms, vec![2, 3]);
        assert_eq!(reordered.fragments()[1].atoms, vec![0, 1]);
        assert_eq!(reordered.membership(), &[1, 1, 0, 0]);
    }
}
