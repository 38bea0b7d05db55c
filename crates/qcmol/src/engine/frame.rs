use super::config::TolerancePolicy;
use crate::core::utils::geometry::weighted_centroid;
use nalgebra::{Matrix3, Point3, Vector3};

/// Principal-axis description of a centered geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct PrincipalFrame {
    /// Right-handed orthonormal axes as columns, largest spread first.
    pub axes: Matrix3<f64>,
    /// Principal moments of inertia, ascending. Moment `k` belongs to axis `k`.
    pub moments: [f64; 3],
    /// Root-mean-square extent along each axis, `sqrt(s_k / M)`.
    pub spreads: [f64; 3],
    /// Number of spreads above the displacement tolerance: 0 point, 1 linear, 2 planar, 3 full.
    pub rank: usize,
    /// Axis `k` shares its spread with another axis, so its direction is not unique.
    pub degenerate: [bool; 3],
}

impl PrincipalFrame {
    /// Whether the axes are unique up to sign and can seed a rotation.
    pub fn is_well_defined(&self) -> bool {
        self.rank >= 2 && !self.degenerate.iter().any(|&d| d)
    }
}

/// A geometry translated to its weighted center, with its principal frame.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedGeometry {
    pub center: Point3<f64>,
    pub centered: Vec<Vector3<f64>>,
    pub weights: Vec<f64>,
    pub total_weight: f64,
    pub frame: PrincipalFrame,
}

/// Centers `positions` on their weighted centroid and computes the principal frame.
///
/// `weights` must be positive and as long as `positions`.
pub fn normalize(
    positions: &[Point3<f64>],
    weights: &[f64],
    tolerances: &TolerancePolicy,
) -> NormalizedGeometry {
    let center = weighted_centroid(positions, weights).unwrap_or_else(Point3::origin);
    let centered: Vec<Vector3<f64>> = positions.iter().map(|p| p - center).collect();
    let total_weight: f64 = weights.iter().sum();

    let second_moment = centered
        .iter()
        .zip(weights)
        .fold(Matrix3::zeros(), |acc, (r, &w)| acc + r * r.transpose() * w);
    let eigen = second_moment.symmetric_eigen();

    let mut order = [0usize, 1, 2];
    order.sort_by(|&a, &b| {
        eigen.eigenvalues[b]
            .total_cmp(&eigen.eigenvalues[a])
            .then(a.cmp(&b))
    });
    let s: [f64; 3] = order.map(|k| eigen.eigenvalues[k].max(0.0));
    let trace: f64 = s.iter().sum();
    let moments = s.map(|sk| trace - sk);
    let spreads = s.map(|sk| {
        if total_weight > 0.0 {
            (sk / total_weight).sqrt()
        } else {
            0.0
        }
    });

    let threshold = tolerances.displacement_tolerance();
    let rank = spreads.iter().filter(|&&sigma| sigma > threshold).count();

    let mut degenerate = [false; 3];
    for i in 0..3 {
        for j in 0..3 {
            if i != j && (spreads[i] - spreads[j]).abs() <= threshold {
                degenerate[i] = true;
            }
        }
    }

    let a1 = orient_axis(eigen.eigenvectors.column(order[0]).into_owned(), &centered);
    let a2 = orient_axis(eigen.eigenvectors.column(order[1]).into_owned(), &centered);
    let a3 = a1.cross(&a2);

    NormalizedGeometry {
        center,
        centered,
        weights: weights.to_vec(),
        total_weight,
        frame: PrincipalFrame {
            axes: Matrix3::from_columns(&[a1, a2, a3]),
            moments,
            spreads,
            rank,
            degenerate,
        },
    }
}

/// Flips `axis` so the atom with the largest absolute projection lies on its positive side.
fn orient_axis(axis: Vector3<f64>, centered: &[Vector3<f64>]) -> Vector3<f64> {
    let mut best = 0.0f64;
    let mut sign = 1.0;
    for r in centered {
        let projection = r.dot(&axis);
        if projection.abs() > best {
            best = projection.abs();
            sign = projection.signum();
        }
    }
    axis * sign
}

/// Whether two frames could belong to geometries that align within tolerance.
///
/// Singular values of the weighted coordinate matrix move by at most the weighted
/// residual norm, which is bounded by `sqrt(n * max_weight) * distance_tolerance` for an
/// acceptable fit.
pub fn inertia_compatible(
    reference: &NormalizedGeometry,
    mobile: &NormalizedGeometry,
    tolerances: &TolerancePolicy,
) -> bool {
    let n = reference.centered.len() as f64;
    let max_weight = reference
        .weights
        .iter()
        .chain(&mobile.weights)
        .fold(0.0f64, |m, &w| m.max(w));
    let bound = 1.5 * (n * max_weight).sqrt() * tolerances.distance_tolerance() + 1e-9;

    let root = |g: &NormalizedGeometry, k: usize| g.frame.spreads[k] * g.total_weight.sqrt();
    (0..3).all(|k| (root(reference, k) - root(mobile, k)).abs() <= bound)
}
