use crate::core::data::elements::ElementTable;
use crate::core::models::molecule::Molecule;
use crate::engine::config::AlignmentConfig;
use crate::engine::decision::decide;
use crate::engine::error::AlignmentError;
use crate::engine::result::AlignmentResult;
use tracing::{info, instrument};

/// Compares `mobile` against `reference` and reports the verdict with the best alignment.
#[instrument(skip_all, name = "align_workflow")]
pub fn run<T: ElementTable + ?Sized>(
    reference: &Molecule,
    mobile: &Molecule,
    config: &AlignmentConfig,
    table: &T,
) -> Result<AlignmentResult, AlignmentError> {
    info!(
        "Aligning {} ({}) onto {} ({}).",
        mobile.name().unwrap_or("mobile"),
        mobile.formula(),
        reference.name().unwrap_or("reference"),
        reference.formula()
    );

    let result = decide(reference, mobile, config, table)?;

    match &result.alignment {
        Some(alignment) => info!(
            "Verdict: {} after {} candidates (rmsd = {:.3e} Bohr, mirror = {}).",
            result.verdict, result.candidates_evaluated, alignment.rmsd, alignment.mirror_used
        ),
        None => info!(
            "Verdict: {} after {} candidates.",
            result.verdict, result.candidates_evaluated
        ),
    }
    Ok(result)
}

/// Whether the two molecules are the same rigid structure under `config`.
pub fn is_equivalent<T: ElementTable + ?Sized>(
    reference: &Molecule,
    mobile: &Molecule,
    config: &AlignmentConfig,
    table: &T,
) -> Result<bool, AlignmentError> {
    Ok(decide(reference, mobile, config, table)?.is_equivalent())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::data::elements::PeriodicTable;
    use crate::core::models::builder::MoleculeBuilder;
    use crate::core::utils::geometry::rotation_from_axis_angle;
    use crate::engine::result::{MismatchReason, Verdict};
    use nalgebra::{Rotation3, Vector3};

    fn build(atoms: &[(&str, [f64; 3])]) -> Molecule {
        let mut builder = MoleculeBuilder::new();
        for &(symbol, position) in atoms {
            builder.atom(symbol, position);
        }
        builder.build(&PeriodicTable::new()).unwrap()
    }

    fn moved(
        atoms: &[(&str, [f64; 3])],
        rotation: &Rotation3<f64>,
        shift: [f64; 3],
    ) -> Vec<(String, [f64; 3])> {
        atoms
            .iter()
            .map(|&(symbol, p)| {
                let v = rotation * Vector3::from(p) + Vector3::from(shift);
                (symbol.to_string(), [v.x, v.y, v.z])
            })
            .collect()
    }

    fn build_owned(atoms: &[(String, [f64; 3])]) -> Molecule {
        let borrowed: Vec<(&str, [f64; 3])> =
            atoms.iter().map(|(s, p)| (s.as_str(), *p)).collect();
        build(&borrowed)
    }

    const WATER: [(&str, [f64; 3]); 3] = [
        ("O", [0.0, 0.0, 0.0]),
        ("H", [0.0, 1.43, 1.11]),
        ("H", [0.0, -1.43, 1.11]),
    ];

    const CHFCLBR: [(&str, [f64; 3]); 5] = [
        ("C", [0.0, 0.0, 0.0]),
        ("H", [0.0, 0.0, 2.06]),
        ("F", [2.5, 0.0, -0.8]),
        ("Cl", [-1.6, 2.7, -1.1]),
        ("Br", [-1.9, -3.1, -1.3]),
    ];

    const HYDROGEN_PEROXIDE: [(&str, [f64; 3]); 4] = [
        ("O", [0.0, 1.39, 0.0]),
        ("O", [0.0, -1.39, 0.0]),
        ("H", [1.70, 1.90, 0.0]),
        ("H", [-0.609, -1.90, 1.587]),
    ];

    fn mirrored(atoms: &[(&str, [f64; 3])]) -> Molecule {
        let reflected: Vec<(&str, [f64; 3])> =
            atoms.iter().map(|&(s, [x, y, z])| (s, [-x, y, z])).collect();
        build(&reflected)
    }

    fn hydrogen_halide(halogen: &str, length: f64) -> Molecule {
        let mut builder = MoleculeBuilder::new();
        builder
            .name("hx")
            .atom("H", [0.0, 0.0, 0.0])
            .atom(halogen, [0.0, 0.0, length]);
        builder.build(&PeriodicTable::new()).unwrap()
    }

    #[test]
    fn run_reports_the_alignment() {
        let a = hydrogen_halide("F", 1.73);
        let result = run(&a, &a, &AlignmentConfig::default(), &PeriodicTable::new()).unwrap();
        assert_eq!(result.verdict, Verdict::Equivalent);
        assert_eq!(result.alignment.unwrap().permutation, vec![0, 1]);
    }

    #[test]
    fn is_equivalent_reduces_to_a_bool() {
        let table = PeriodicTable::new();
        let config = AlignmentConfig::default();
        let hf = hydrogen_halide("F", 1.73);
        let hcl = hydrogen_halide("Cl", 2.41);
        assert!(is_equivalent(&hf, &hf, &config, &table).unwrap());
        assert!(!is_equivalent(&hf, &hcl, &config, &table).unwrap());

        let stretched = hydrogen_halide("F", 1.80);
        let result = run(&hf, &stretched, &config, &table).unwrap();
        assert_eq!(result.verdict, Verdict::NotEquivalent(MismatchReason::InertiaMismatch));
    }

    #[test]
    fn identical_copy_maps_onto_itself() {
        let a = build(&WATER);
        let b = a.clone();
        let result = run(&a, &b, &AlignmentConfig::default(), &PeriodicTable::new()).unwrap();
        assert!(result.is_equivalent());
        let alignment = result.alignment.unwrap();
        assert_eq!(alignment.permutation, vec![0, 1, 2]);
        assert!(alignment.rmsd < 1e-10);
    }

    #[test]
    fn rigid_motion_is_undone_by_the_rotation() {
        let applied = rotation_from_axis_angle(&Vector3::new(0.4, -1.2, 0.9), 128.0);
        let a = build(&CHFCLBR);
        let b = build_owned(&moved(&CHFCLBR, &applied, [1.5, -7.0, 3.25]));

        let result = run(&a, &b, &AlignmentConfig::default(), &PeriodicTable::new()).unwrap();
        assert!(result.is_equivalent());
        let alignment = result.alignment.unwrap();
        assert_eq!(alignment.permutation, vec![0, 1, 2, 3, 4]);
        assert!(alignment.rmsd < 1e-8);
        assert!((alignment.rotation - applied.inverse().into_inner()).norm() < 1e-8);
    }

    #[test]
    fn shuffled_order_is_inverted() {
        let shuffle = [3usize, 0, 4, 1, 2];
        let shuffled: Vec<(&str, [f64; 3])> = shuffle.iter().map(|&k| CHFCLBR[k]).collect();
        let a = build(&CHFCLBR);
        let b = build(&shuffled);

        let result = run(&a, &b, &AlignmentConfig::default(), &PeriodicTable::new()).unwrap();
        assert!(result.is_equivalent());
        let permutation = result.alignment.unwrap().permutation;
        for (k, &original) in shuffle.iter().enumerate() {
            assert_eq!(permutation[original], k);
        }
    }

    #[test]
    fn mirror_image_requires_permission() {
        let table = PeriodicTable::new();
        let a = build(&CHFCLBR);
        let b = mirrored(&CHFCLBR);

        let strict = run(&a, &b, &AlignmentConfig::default(), &table).unwrap();
        assert_eq!(strict.verdict, Verdict::NotEquivalent(MismatchReason::ExceedsTolerance));

        let config = AlignmentConfig::builder().allow_mirror(true).build().unwrap();
        let relaxed = run(&a, &b, &config, &table).unwrap();
        assert!(relaxed.is_equivalent());
        let alignment = relaxed.alignment.unwrap();
        assert!(alignment.mirror_used);
        assert!((alignment.rotation.determinant() + 1.0).abs() < 1e-10);
    }

    #[test]
    fn different_elements_evaluate_no_candidates() {
        let a = build(&WATER);
        let b = build(&[
            ("S", [0.0, 0.0, 0.0]),
            ("H", [0.0, 1.43, 1.11]),
            ("H", [0.0, -1.43, 1.11]),
        ]);
        let result = run(&a, &b, &AlignmentConfig::default(), &PeriodicTable::new()).unwrap();
        assert!(!result.is_equivalent());
        assert_eq!(result.candidates_evaluated, 0);
    }

    #[test]
    fn moved_and_reversed_water_is_recovered() {
        let applied = rotation_from_axis_angle(&Vector3::new(1.0, 2.0, 3.0), 37.0);
        let mut mobile_atoms = moved(&WATER, &applied, [5.0, 5.0, 5.0]);
        mobile_atoms.reverse();
        let a = build(&WATER);
        let b = build_owned(&mobile_atoms);

        let result = run(&a, &b, &AlignmentConfig::default(), &PeriodicTable::new()).unwrap();
        assert!(result.is_equivalent());
        let alignment = result.alignment.unwrap();
        assert!(alignment.rmsd < 1e-6);
        assert_eq!(alignment.permutation, vec![2, 1, 0]);

        let superimposed = alignment.apply(&b).unwrap();
        for (expected, actual) in a.atoms().iter().zip(superimposed.atoms()) {
            assert_eq!(expected.symbol, actual.symbol);
            assert!((expected.position - actual.position).norm() < 1e-6);
        }
    }

    #[test]
    fn swapped_identical_halogens_are_equivalent() {
        let phosgene = [
            ("C", [0.0, 0.0, 0.0]),
            ("O", [0.0, 0.0, 2.23]),
            ("Cl", [2.8, 0.0, -1.6]),
            ("Cl", [-2.8, 0.0, -1.6]),
        ];
        let swapped = [phosgene[0], phosgene[1], phosgene[3], phosgene[2]];
        let result = run(
            &build(&phosgene),
            &build(&swapped),
            &AlignmentConfig::default(),
            &PeriodicTable::new(),
        )
        .unwrap();
        assert!(result.is_equivalent());
        assert!(result.alignment.unwrap().rmsd < 1e-8);
    }

    #[test]
    fn repeated_calls_agree() {
        let table = PeriodicTable::new();
        let config = AlignmentConfig::default();
        let applied = rotation_from_axis_angle(&Vector3::new(0.0, 1.0, 1.0), 63.0);
        let mut mobile_atoms = moved(&HYDROGEN_PEROXIDE, &applied, [0.0, 2.0, 0.0]);
        mobile_atoms.swap(0, 1);
        let a = build(&HYDROGEN_PEROXIDE);
        let b = build_owned(&mobile_atoms);

        let first = run(&a, &b, &config, &table).unwrap();
        let second = run(&a, &b, &config, &table).unwrap();
        assert!(first.is_equivalent());
        assert_eq!(first, second);
    }

    #[test]
    fn fragment_order_is_fixed_unless_relaxed() {
        let table = PeriodicTable::new();
        let monomers = [
            ("H", [0.0, 0.0, 0.0]),
            ("F", [0.0, 0.0, 1.73]),
            ("H", [2.9, 1.4, 0.6]),
            ("F", [4.1, 2.7, 0.9]),
        ];
        let mut builder = MoleculeBuilder::new();
        for &(symbol, position) in &monomers {
            builder.atom(symbol, position);
        }
        builder.fragment_separators(&[2]);
        let a = builder.build(&table).unwrap();

        let mut builder = MoleculeBuilder::new();
        for &k in &[2usize, 3, 0, 1] {
            builder.atom(monomers[k].0, monomers[k].1);
        }
        builder.fragment_separators(&[2]);
        let b = builder.build(&table).unwrap();

        let fixed = run(&a, &b, &AlignmentConfig::default(), &table).unwrap();
        assert!(!fixed.is_equivalent());

        let config = AlignmentConfig::builder()
            .fragment_order_invariant(true)
            .build()
            .unwrap();
        let relaxed = run(&a, &b, &config, &table).unwrap();
        assert!(relaxed.is_equivalent());
        assert_eq!(relaxed.alignment.unwrap().permutation, vec![2, 3, 0, 1]);
    }

    #[test]
    fn exhausted_budget_is_inconclusive() {
        let table = PeriodicTable::new();
        let a = build(&HYDROGEN_PEROXIDE);
        let b = mirrored(&HYDROGEN_PEROXIDE);

        let unbounded = run(&a, &b, &AlignmentConfig::default(), &table).unwrap();
        assert_eq!(unbounded.verdict, Verdict::NotEquivalent(MismatchReason::ExceedsTolerance));
        assert!(unbounded.candidates_evaluated >= 2);

        let config = AlignmentConfig::builder().max_candidates(1).build().unwrap();
        let bounded = run(&a, &b, &config, &table).unwrap();
        assert_eq!(bounded.verdict, Verdict::Inconclusive);
        assert_eq!(bounded.candidates_evaluated, 1);
        assert!(bounded.alignment.is_some());
    }

    #[test]
    fn linear_molecule_is_recovered_after_rotation_and_reversal() {
        let carbon_dioxide = [
            ("O", [0.0, 0.0, -2.19]),
            ("C", [0.0, 0.0, 0.0]),
            ("O", [0.0, 0.0, 2.19]),
        ];
        let applied = rotation_from_axis_angle(&Vector3::new(1.0, -0.5, 0.25), 71.0);
        let mut mobile_atoms = moved(&carbon_dioxide, &applied, [-2.0, 0.5, 4.0]);
        mobile_atoms.reverse();
        let a = build(&carbon_dioxide);
        let b = build_owned(&mobile_atoms);

        let result = run(&a, &b, &AlignmentConfig::default(), &PeriodicTable::new()).unwrap();
        assert!(result.is_equivalent());
        let alignment = result.alignment.unwrap();
        assert_eq!(alignment.permutation[1], 1);
        assert!(alignment.rmsd < 1e-6);
    }

    #[test]
    fn single_atom_is_equivalent_after_translation() {
        let a = build(&[("Ne", [0.0, 0.0, 0.0])]);
        let b = build(&[("Ne", [3.0, -1.0, 7.5])]);

        let result = run(&a, &b, &AlignmentConfig::default(), &PeriodicTable::new()).unwrap();
        assert!(result.is_equivalent());
        let alignment = result.alignment.unwrap();
        assert_eq!(alignment.permutation, vec![0]);
        assert!(alignment.rmsd < 1e-10);
    }

    #[test]
    fn isotopes_only_matter_when_matched() {
        let table = PeriodicTable::new();
        let water = build(&WATER);
        let mut builder = MoleculeBuilder::new();
        builder
            .atom(WATER[0].0, WATER[0].1)
            .atom(WATER[1].0, WATER[1].1)
            .isotope("H", 2, WATER[2].1);
        let semiheavy = builder.build(&table).unwrap();

        let strict = run(&water, &semiheavy, &AlignmentConfig::default(), &table).unwrap();
        assert_eq!(strict.verdict, Verdict::NotEquivalent(MismatchReason::ShapeMismatch));

        let config = AlignmentConfig::builder().match_isotopes(false).build().unwrap();
        let loose = run(&water, &semiheavy, &config, &table).unwrap();
        assert!(loose.is_equivalent());
    }

    #[test]
    fn coincident_atoms_still_align() {
        let table = PeriodicTable::new();
        let atoms = [
            ("C", [0.0, 0.0, 0.0]),
            ("H", [0.0, 0.0, 2.06]),
            ("H", [0.0, 0.0, 2.06]),
            ("F", [2.5, 0.0, -0.8]),
            ("Cl", [-1.6, 2.7, -1.1]),
        ];
        let build_coincident = |order: &[usize]| {
            let mut builder = MoleculeBuilder::new();
            builder.allow_coincident(true);
            for &k in order {
                builder.atom(atoms[k].0, atoms[k].1);
            }
            builder.build(&table).unwrap()
        };
        let a = build_coincident(&[0, 1, 2, 3, 4]);
        let b = build_coincident(&[4, 1, 0, 3, 2]);

        let result = run(&a, &b, &AlignmentConfig::default(), &table).unwrap();
        assert!(result.is_equivalent());
        let alignment = result.alignment.unwrap();
        assert_eq!(alignment.permutation[0], 2);
        assert_eq!(alignment.permutation[3], 3);
        assert_eq!(alignment.permutation[4], 0);
        assert!(alignment.rmsd < 1e-8);
    }
}
