use crate::core::utils::geometry::{perpendicular, rotation_to_align};
use nalgebra::{Matrix3, Rotation3, Unit, Vector3};
use tracing::warn;

/// Singular values below this fraction of the largest one count as zero.
const RANK_THRESHOLD: f64 = 1e-10;
/// RMSD difference under which a proper and an improper fit count as tied.
pub(crate) const RMSD_TIE_EPSILON: f64 = 1e-10;

/// Best rigid superposition of a mobile geometry onto a reference under a fixed mapping.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Fit {
    pub rotation: Matrix3<f64>,
    pub rmsd: f64,
    pub max_displacement: f64,
    pub mirror_used: bool,
}

/// Least-squares rotation taking `mobile[permutation[i]]` onto `reference[i]`.
///
/// Both geometries must already be centered. Returns `None` when the covariance or the
/// residuals are not finite.
pub(crate) fn fit(
    reference: &[Vector3<f64>],
    mobile: &[Vector3<f64>],
    permutation: &[usize],
    allow_mirror: bool,
) -> Option<Fit> {
    let h = reference
        .iter()
        .zip(permutation)
        .fold(Matrix3::zeros(), |acc, (a, &j)| acc + a * mobile[j].transpose());

    if !h.iter().all(|x| x.is_finite()) {
        warn!("Non-finite covariance matrix; skipping candidate");
        return None;
    }

    let svd = h.svd(true, true);
    let (Some(u), Some(v_t)) = (svd.u, svd.v_t) else {
        warn!("SVD of the covariance matrix did not converge; skipping candidate");
        return None;
    };

    let mut order = [0usize, 1, 2];
    order.sort_by(|&a, &b| {
        svd.singular_values[b]
            .total_cmp(&svd.singular_values[a])
            .then(a.cmp(&b))
    });
    let largest = svd.singular_values[order[0]];
    let rank = order
        .iter()
        .filter(|&&k| largest > 0.0 && svd.singular_values[k] > largest * RANK_THRESHOLD)
        .count();

    let u1: Vector3<f64> = u.column(order[0]).into_owned();
    let v1: Vector3<f64> = v_t.row(order[0]).transpose();

    let proper = match rank {
        0 => Matrix3::identity(),
        1 => align_directions(&v1, &u1),
        _ => {
            let u2: Vector3<f64> = u.column(order[1]).into_owned();
            let v2: Vector3<f64> = v_t.row(order[1]).transpose();
            let v_frame = Matrix3::from_columns(&[v1, v2, v1.cross(&v2)]);
            let proper = Matrix3::from_columns(&[u1, u2, u1.cross(&u2)]) * v_frame.transpose();
            if allow_mirror {
                let improper =
                    Matrix3::from_columns(&[u1, u2, -u1.cross(&u2)]) * v_frame.transpose();
                let (proper_fit, improper_fit) = (
                    evaluate(reference, mobile, permutation, proper, false)?,
                    evaluate(reference, mobile, permutation, improper, true)?,
                );
                return Some(if improper_fit.rmsd < proper_fit.rmsd - RMSD_TIE_EPSILON {
                    improper_fit
                } else {
                    proper_fit
                });
            }
            proper
        }
    };
    evaluate(reference, mobile, permutation, proper, false)
}

/// Minimal rotation taking direction `from` onto direction `to`.
fn align_directions(from: &Vector3<f64>, to: &Vector3<f64>) -> Matrix3<f64> {
    match rotation_to_align(from, to) {
        Some(rotation) => rotation.into_inner(),
        None if from.dot(to) < 0.0 => {
            let axis = Unit::new_normalize(perpendicular(from));
            Rotation3::from_axis_angle(&axis, std::f64::consts::PI).into_inner()
        }
        None => Matrix3::identity(),
    }
}

fn evaluate(
    reference: &[Vector3<f64>],
    mobile: &[Vector3<f64>],
    permutation: &[usize],
    rotation: Matrix3<f64>,
    mirror_used: bool,
) -> Option<Fit> {
    let mut sum_squared = 0.0;
    let mut max_displacement = 0.0f64;
    for (a, &j) in reference.iter().zip(permutation) {
        let residual = (a - rotation * mobile[j]).norm();
        sum_squared += residual * residual;
        max_displacement = max_displacement.max(residual);
    }
    let rmsd = (sum_squared / reference.len().max(1) as f64).sqrt();
    if !(rmsd.is_finite() && max_displacement.is_finite()) {
        warn!("Non-finite residuals for candidate fit; skipping");
        return None;
    }
    Some(Fit {
        rotation,
        rmsd,
        max_displacement,
        mirror_used,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::utils::geometry::rotation_from_axis_angle;

    fn centered(coords: &[[f64; 3]]) -> Vec<Vector3<f64>> {
        let points: Vec<Vector3<f64>> = coords.iter().map(|&c| Vector3::from(c)).collect();
        let center = points.iter().sum::<Vector3<f64>>() / points.len() as f64;
        points.iter().map(|p| p - center).collect()
    }

    fn tetrahedron() -> Vec<Vector3<f64>> {
        centered(&[[0.0, 0.0, 0.0], [2.0, 0.1, 0.0], [-0.3, 1.6, 0.2], [0.4, -0.2, 2.5]])
    }

    #[test]
    fn recovers_known_rotation() {
        let reference = tetrahedron();
        let applied = rotation_from_axis_angle(&Vector3::new(0.3, -1.0, 0.7), 52.0);
        let mobile: Vec<_> = reference.iter().map(|a| applied * a).collect();

        let result = fit(&reference, &mobile, &[0, 1, 2, 3], false).unwrap();
        assert!(result.rmsd < 1e-10);
        assert!(!result.mirror_used);
        assert!((result.rotation - applied.inverse().into_inner()).norm() < 1e-9);
        assert!((result.rotation.determinant() - 1.0).abs() < 1e-10);
    }

    #[test]
    fn respects_permutation() {
        let reference = tetrahedron();
        let mobile = vec![reference[2], reference[0], reference[3], reference[1]];
        let result = fit(&reference, &mobile, &[1, 3, 0, 2], false).unwrap();
        assert!(result.rmsd < 1e-10);
        assert!(result.max_displacement < 1e-10);
    }

    #[test]
    fn mirror_needs_permission() {
        let reference = tetrahedron();
        let mobile: Vec<_> = reference.iter().map(|a| Vector3::new(-a.x, a.y, a.z)).collect();

        let proper = fit(&reference, &mobile, &[0, 1, 2, 3], false).unwrap();
        assert!(proper.rmsd > 1e-2);
        assert!(!proper.mirror_used);

        let improper = fit(&reference, &mobile, &[0, 1, 2, 3], true).unwrap();
        assert!(improper.rmsd < 1e-10);
        assert!(improper.mirror_used);
        assert!((improper.rotation.determinant() + 1.0).abs() < 1e-10);
    }

    #[test]
    fn planar_geometry_prefers_proper_rotation() {
        let reference = centered(&[[0.0, 0.0, 0.0], [2.0, 0.0, 0.0], [0.0, 3.0, 0.0]]);
        let applied = rotation_from_axis_angle(&Vector3::z(), 30.0);
        let mobile: Vec<_> = reference.iter().map(|a| applied * a).collect();
        let result = fit(&reference, &mobile, &[0, 1, 2], true).unwrap();
        assert!(result.rmsd < 1e-10);
        assert!(!result.mirror_used);
        assert!((result.rotation.determinant() - 1.0).abs() < 1e-10);
    }

    #[test]
    fn linear_and_point_geometries_fall_back() {
        let reference = centered(&[[0.0, 0.0, -1.0], [0.0, 0.0, 1.0]]);
        let mobile = centered(&[[-1.0, 0.0, 0.0], [1.0, 0.0, 0.0]]);
        let result = fit(&reference, &mobile, &[0, 1], false).unwrap();
        assert!(result.rmsd < 1e-10);
        assert!((result.rotation.determinant() - 1.0).abs() < 1e-10);

        let antiparallel = fit(&reference, &reference, &[1, 0], false).unwrap();
        assert!(antiparallel.rmsd < 1e-10);

        let point = fit(&[Vector3::zeros()], &[Vector3::zeros()], &[0], false).unwrap();
        assert_eq!(point.rotation, Matrix3::identity());
        assert_eq!(point.rmsd, 0.0);
    }

    #[test]
    fn non_finite_input_is_skipped() {
        let reference = vec![Vector3::new(f64::NAN, 0.0, 0.0), Vector3::zeros()];
        assert!(fit(&reference, &reference, &[0, 1], false).is_none());
    }
}
