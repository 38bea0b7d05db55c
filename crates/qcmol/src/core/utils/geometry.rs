use nalgebra::{Matrix3, Point3, Rotation3, Unit, Vector3};

pub fn rotation_to_align(from: &Vector3<f64>, to: &Vector3<f64>) -> Option<Rotation3<f64>> {
    Rotation3::rotation_between(from, to)
}

pub fn rotation_from_axis_angle(axis: &Vector3<f64>, angle_degrees: f64) -> Rotation3<f64> {
    Rotation3::from_axis_angle(&Unit::new_normalize(*axis), angle_degrees.to_radians())
}

/// Any unit vector perpendicular to `v`.
pub fn perpendicular(v: &Vector3<f64>) -> Vector3<f64> {
    let helper = if v.x.abs() < 0.9 {
        Vector3::x()
    } else {
        Vector3::y()
    };
    v.cross(&helper).normalize()
}

/// Weighted centroid of `points`. Returns `None` for empty input or a non-positive total weight.
pub fn weighted_centroid(points: &[Point3<f64>], weights: &[f64]) -> Option<Point3<f64>> {
    if points.is_empty() || points.len() != weights.len() {
        return None;
    }
    let total: f64 = weights.iter().sum();
    if !(total > 0.0) {
        return None;
    }
    let sum = points
        .iter()
        .zip(weights)
        .fold(Vector3::zeros(), |acc, (p, &w)| acc + p.coords * w);
    Some(Point3::from(sum / total))
}

pub fn translate(points: &[Point3<f64>], shift: &Vector3<f64>) -> Vec<Point3<f64>> {
    points.iter().map(|p| p + shift).collect()
}

pub fn rotate(points: &[Point3<f64>], rotation: &Matrix3<f64>) -> Vec<Point3<f64>> {
    points.iter().map(|p| Point3::from(rotation * p.coords)).collect()
}

pub fn calculate_rmsd(coords1: &[Point3<f64>], coords2: &[Point3<f64>]) -> Option<f64> {
    if coords1.len() != coords2.len() || coords1.is_empty() {
        return None;
    }
    let n = coords1.len() as f64;
    let squared_dist_sum: f64 = coords1
        .iter()
        .zip(coords2.iter())
        .map(|(p1, p2)| (p1 - p2).norm_squared())
        .sum();
    Some((squared_dist_sum / n).sqrt())
}

/// Largest distance between corresponding points, with the index where it occurs.
pub fn find_max_deviation(
    coords1: &[Point3<f64>],
    coords2: &[Point3<f64>],
) -> Option<(f64, usize)> {
    if coords1.len() != coords2.len() {
        return None;
    }
    coords1
        .iter()
        .zip(coords2)
        .map(|(p1, p2)| (p1 - p2).norm())
        .enumerate()
        .map(|(i, d)| (d, i))
        .max_by(|(d1, _), (d2, _)| d1.partial_cmp(d2).unwrap_or(std::cmp::Ordering::Equal))
}

/// Dense, symmetric matrix of interatomic distances.
pub fn distance_matrix(points: &[Point3<f64>]) -> Vec<Vec<f64>> {
    let n = points.len();
    let mut matrix = vec![vec![0.0; n]; n];
    for i in 0..n {
        for j in (i + 1)..n {
            let d = (points[i] - points[j]).norm();
            matrix[i][j] = d;
            matrix[j][i] = d;
        }
    }
    matrix
}
