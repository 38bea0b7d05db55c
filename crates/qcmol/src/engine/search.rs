use super::fingerprint::{AtomClasses, admissible_partners};
use super::frame::NormalizedGeometry;
use nalgebra::{Matrix3, Point3, Vector3};
use std::collections::HashSet;
use tracing::warn;

/// Sign patterns applied to the principal axes when seeding from the frames.
const PROPER_SIGNS: [[f64; 3]; 4] = [
    [1.0, 1.0, 1.0],
    [-1.0, -1.0, 1.0],
    [-1.0, 1.0, -1.0],
    [1.0, -1.0, -1.0],
];
const MAX_ANCHORS: usize = 4;

/// Everything the candidate search needs, precomputed once per comparison.
#[derive(Debug, Clone)]
pub(crate) struct SearchContext {
    reference: Vec<Vector3<f64>>,
    mobile: Vec<Vector3<f64>>,
    seed_frames: Option<(Matrix3<f64>, Matrix3<f64>)>,
    reference_distances: Vec<Vec<f64>>,
    mobile_distances: Vec<Vec<f64>>,
    partners: Vec<Vec<usize>>,
    reference_fragment: Vec<usize>,
    mobile_fragment: Vec<usize>,
    /// `compatible[a][b]`: reference fragment `a` may be paired with mobile fragment `b`.
    compatible: Vec<Vec<bool>>,
    fingerprint_tolerance: f64,
    span_tolerance: f64,
    allow_mirror: bool,
}

pub(crate) struct SearchInputs<'a> {
    pub reference: &'a NormalizedGeometry,
    pub mobile: &'a NormalizedGeometry,
    pub classes: &'a AtomClasses,
    pub reference_fragment: &'a [usize],
    pub mobile_fragment: &'a [usize],
    pub compatible: Vec<Vec<bool>>,
    pub fingerprint_tolerance: f64,
    pub span_tolerance: f64,
    pub allow_mirror: bool,
}

impl SearchContext {
    pub fn new(inputs: SearchInputs<'_>) -> Self {
        let reference_distances = pairwise_distances(&inputs.reference.centered);
        let mobile_distances = pairwise_distances(&inputs.mobile.centered);
        let compatible = inputs.compatible;
        let partners = admissible_partners(
            inputs.classes,
            &reference_distances,
            &mobile_distances,
            inputs.fingerprint_tolerance,
            |i, j| compatible[inputs.reference_fragment[i]][inputs.mobile_fragment[j]],
        );
        let seed_frames = (inputs.reference.frame.is_well_defined()
            && inputs.mobile.frame.is_well_defined())
        .then(|| (inputs.reference.frame.axes, inputs.mobile.frame.axes));

        Self {
            reference: inputs.reference.centered.clone(),
            mobile: inputs.mobile.centered.clone(),
            seed_frames,
            reference_distances,
            mobile_distances,
            partners,
            reference_fragment: inputs.reference_fragment.to_vec(),
            mobile_fragment: inputs.mobile_fragment.to_vec(),
            compatible,
            fingerprint_tolerance: inputs.fingerprint_tolerance,
            span_tolerance: inputs.span_tolerance,
            allow_mirror: inputs.allow_mirror,
        }
    }

    /// Reference atoms without any admissible partner.
    pub fn unmatched_atoms(&self) -> Vec<usize> {
        (0..self.partners.len())
            .filter(|&i| self.partners[i].is_empty())
            .collect()
    }

    pub fn candidates(&self) -> CandidateSearch<'_> {
        CandidateSearch::new(self)
    }

    fn fragment_count(&self) -> (usize, usize) {
        (
            self.compatible.len(),
            self.compatible.first().map_or(0, Vec::len),
        )
    }

    /// Reference atoms whose placement fixes every other atom: the one with the fewest
    /// partners, then repeatedly the atom farthest from the affine span built so far.
    fn anchors(&self) -> Vec<usize> {
        let Some(first) = (0..self.partners.len()).min_by_key(|&i| (self.partners[i].len(), i))
        else {
            return Vec::new();
        };
        let origin = self.reference[first];
        let mut anchors = vec![first];
        let mut basis: Vec<Vector3<f64>> = Vec::new();

        while anchors.len() < MAX_ANCHORS {
            let mut best: Option<(f64, usize, Vector3<f64>)> = None;
            for (i, r) in self.reference.iter().enumerate() {
                let mut residual = r - origin;
                for b in &basis {
                    residual -= b * residual.dot(b);
                }
                let distance = residual.norm();
                if best.as_ref().is_none_or(|(d, _, _)| distance > *d) {
                    best = Some((distance, i, residual));
                }
            }
            match best {
                Some((distance, i, residual)) if distance > self.span_tolerance => {
                    anchors.push(i);
                    basis.push(residual / distance);
                }
                _ => break,
            }
        }
        anchors
    }
}

fn pairwise_distances(points: &[Vector3<f64>]) -> Vec<Vec<f64>> {
    let points: Vec<Point3<f64>> = points.iter().map(|v| Point3::from(*v)).collect();
    crate::core::utils::geometry::distance_matrix(&points)
}

/// Partial bijection between reference and mobile fragments.
#[derive(Debug, Clone)]
struct FragmentMap {
    forward: Vec<Option<usize>>,
    backward: Vec<Option<usize>>,
}

impl FragmentMap {
    fn new(context: &SearchContext) -> Self {
        let (reference, mobile) = context.fragment_count();
        Self {
            forward: vec![None; reference],
            backward: vec![None; mobile],
        }
    }

    /// Records `reference -> mobile` if it is consistent with the pairs seen so far.
    fn bind(&mut self, context: &SearchContext, reference_atom: usize, mobile_atom: usize) -> bool {
        let a = context.reference_fragment[reference_atom];
        let b = context.mobile_fragment[mobile_atom];
        match self.forward[a] {
            Some(bound) => bound == b,
            None if self.backward[b].is_none() && context.compatible[a][b] => {
                self.forward[a] = Some(b);
                self.backward[b] = Some(a);
                true
            }
            None => false,
        }
    }

    fn admits(&self, context: &SearchContext, reference_atom: usize, mobile_atom: usize) -> bool {
        let a = context.reference_fragment[reference_atom];
        let b = context.mobile_fragment[mobile_atom];
        match self.forward[a] {
            Some(bound) => bound == b,
            None => self.backward[b].is_none() && context.compatible[a][b],
        }
    }
}

/// Lazy sequence of candidate permutations, frame seeds first, then one completion per
/// admissible anchor placement.
///
/// Holds only the seeds already produced and the anchor stack; dropping it discards all
/// search state.
pub(crate) struct CandidateSearch<'a> {
    context: &'a SearchContext,
    seed_rotations: Vec<Matrix3<f64>>,
    seed_cursor: usize,
    seeds: HashSet<Vec<usize>>,
    anchors: Vec<usize>,
    cursors: Vec<usize>,
    chosen: Vec<usize>,
}

impl<'a> CandidateSearch<'a> {
    fn new(context: &'a SearchContext) -> Self {
        let seed_rotations = match context.seed_frames {
            Some((reference_axes, mobile_axes)) => {
                let mut signs: Vec<[f64; 3]> = PROPER_SIGNS.to_vec();
                if context.allow_mirror {
                    signs.extend(PROPER_SIGNS.iter().map(|s| s.map(|x| -x)));
                }
                signs
                    .into_iter()
                    .map(|s| {
                        reference_axes
                            * Matrix3::from_diagonal(&Vector3::from(s))
                            * mobile_axes.transpose()
                    })
                    .collect()
            }
            None => Vec::new(),
        };
        let anchors = context.anchors();
        let cursors = if anchors.is_empty() { Vec::new() } else { vec![0] };
        Self {
            context,
            seed_rotations,
            seed_cursor: 0,
            seeds: HashSet::new(),
            anchors,
            cursors,
            chosen: Vec::new(),
        }
    }

    /// Assigns every unassigned reference atom, in index order, its nearest admissible
    /// mobile partner under `rotation`.
    fn complete(&self, rotation: &Matrix3<f64>, fixed: &[(usize, usize)]) -> Option<Vec<usize>> {
        let context = self.context;
        let n = context.reference.len();
        let mut permutation: Vec<Option<usize>> = vec![None; n];
        let mut used = vec![false; context.mobile.len()];
        let mut fragments = FragmentMap::new(context);

        for &(i, j) in fixed {
            if used[j] || !fragments.bind(context, i, j) {
                return None;
            }
            permutation[i] = Some(j);
            used[j] = true;
        }

        let rotated: Vec<Vector3<f64>> = context.mobile.iter().map(|b| rotation * b).collect();
        for i in 0..n {
            if permutation[i].is_some() {
                continue;
            }
            let mut best: Option<(f64, usize)> = None;
            for &j in &context.partners[i] {
                if used[j] || !fragments.admits(context, i, j) {
                    continue;
                }
                let distance = (context.reference[i] - rotated[j]).norm_squared();
                if best.is_none_or(|(d, _)| distance < d) {
                    best = Some((distance, j));
                }
            }
            let (_, j) = best?;
            fragments.bind(context, i, j);
            permutation[i] = Some(j);
            used[j] = true;
        }
        permutation.into_iter().collect()
    }

    fn next_seed(&mut self) -> Option<Vec<usize>> {
        while self.seed_cursor < self.seed_rotations.len() {
            let rotation = self.seed_rotations[self.seed_cursor];
            self.seed_cursor += 1;
            if let Some(permutation) = self.complete(&rotation, &[]) {
                if self.seeds.insert(permutation.clone()) {
                    return Some(permutation);
                }
            }
        }
        None
    }

    fn anchor_admissible(&self, depth: usize, candidate: usize) -> bool {
        let context = self.context;
        let anchor = self.anchors[depth];
        if self.chosen.contains(&candidate) {
            return false;
        }
        let distances_agree = self.chosen.iter().enumerate().all(|(level, &partner)| {
            let expected = context.reference_distances[anchor][self.anchors[level]];
            let actual = context.mobile_distances[candidate][partner];
            (expected - actual).abs() <= context.fingerprint_tolerance
        });
        if !distances_agree {
            return false;
        }
        let mut fragments = FragmentMap::new(context);
        self.anchors
            .iter()
            .zip(&self.chosen)
            .all(|(&i, &j)| fragments.bind(context, i, j))
            && fragments.bind(context, anchor, candidate)
    }

    /// Orthogonal Procrustes rotation over the anchor pairs, reflections included.
    fn anchor_rotation(&self) -> Matrix3<f64> {
        let context = self.context;
        let h = self
            .anchors
            .iter()
            .zip(&self.chosen)
            .fold(Matrix3::zeros(), |acc, (&i, &j)| {
                acc + context.reference[i] * context.mobile[j].transpose()
            });
        anchor_orthogonal_factor(&h)
    }

    fn next_anchored(&mut self) -> Option<Vec<usize>> {
        let context = self.context;
        loop {
            let &cursor = self.cursors.last()?;
            let depth = self.cursors.len() - 1;
            let options = &context.partners[self.anchors[depth]];

            let next = options[cursor.min(options.len())..]
                .iter()
                .position(|&j| self.anchor_admissible(depth, j))
                .map(|offset| cursor + offset);

            let Some(position) = next else {
                self.cursors.pop();
                self.chosen.pop();
                continue;
            };
            if let Some(last) = self.cursors.last_mut() {
                *last = position + 1;
            }
            self.chosen.push(options[position]);

            if self.chosen.len() < self.anchors.len() {
                self.cursors.push(0);
                continue;
            }

            let rotation = self.anchor_rotation();
            let fixed: Vec<(usize, usize)> = self
                .anchors
                .iter()
                .copied()
                .zip(self.chosen.iter().copied())
                .collect();
            let completed = self.complete(&rotation, &fixed);
            self.chosen.pop();
            match completed {
                Some(permutation) if !self.seeds.contains(&permutation) => return Some(permutation),
                _ => {}
            }
        }
    }
}

impl Iterator for CandidateSearch<'_> {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_seed().or_else(|| self.next_anchored())
    }
}

/// Orthogonal factor `U V^T` of the anchor covariance, or the identity when it cannot be
/// decomposed.
fn anchor_orthogonal_factor(h: &Matrix3<f64>) -> Matrix3<f64> {
    if !h.iter().all(|x| x.is_finite()) {
        warn!("Non-finite anchor covariance; using the identity");
        return Matrix3::identity();
    }
    let svd = h.svd(true, true);
    match (svd.u, svd.v_t) {
        (Some(u), Some(v_t)) => u * v_t,
        _ => {
            warn!("SVD of the anchor covariance did not converge; using the identity");
            Matrix3::identity()
        }
    }
}
