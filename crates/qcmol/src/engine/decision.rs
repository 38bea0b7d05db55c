use super::config::AlignmentConfig;
use super::error::AlignmentError;
use super::fingerprint::{classify, fragment_signatures, shapes_match};
use super::frame::{NormalizedGeometry, inertia_compatible, normalize};
use super::result::{Alignment, AlignmentResult, MismatchReason, Verdict};
use super::search::{SearchContext, SearchInputs};
use super::solver::{self, RMSD_TIE_EPSILON};
use crate::core::data::elements::ElementTable;
use crate::core::models::molecule::Molecule;
use tracing::{debug, instrument, trace};

/// Decides whether `mobile` is a rigid relabeling of `reference` and, if so, how.
///
/// Geometric disagreement is a verdict, not an error; only unresolvable element symbols
/// fail the call.
#[instrument(skip_all, name = "alignment_decision", fields(atoms = reference.len()))]
pub fn decide<T: ElementTable + ?Sized>(
    reference: &Molecule,
    mobile: &Molecule,
    config: &AlignmentConfig,
    table: &T,
) -> Result<AlignmentResult, AlignmentError> {
    resolve_symbols(reference, table, "reference")?;
    resolve_symbols(mobile, table, "mobile")?;

    let tolerances = &config.tolerances;
    let classes = classify(reference, mobile, tolerances);
    if !shapes_match(reference, mobile, &classes, config.fragment_order_invariant) {
        debug!("Composition or fragment structure differs.");
        return Ok(AlignmentResult::rejected(MismatchReason::ShapeMismatch));
    }

    let ref_geometry = normalize(&reference.positions(), &weights(reference, config), tolerances);
    let mob_geometry = normalize(&mobile.positions(), &weights(mobile, config), tolerances);
    if !inertia_compatible(&ref_geometry, &mob_geometry, tolerances) {
        debug!(
            "Principal spreads differ: {:?} vs {:?}",
            ref_geometry.frame.spreads, mob_geometry.frame.spreads
        );
        return Ok(AlignmentResult::rejected(MismatchReason::InertiaMismatch));
    }

    let ref_signatures = fragment_signatures(reference, &classes.reference, classes.count);
    let mob_signatures = fragment_signatures(mobile, &classes.mobile, classes.count);
    let compatible: Vec<Vec<bool>> = ref_signatures
        .iter()
        .enumerate()
        .map(|(a, sig_a)| {
            mob_signatures
                .iter()
                .enumerate()
                .map(|(b, sig_b)| {
                    if config.fragment_order_invariant {
                        sig_a == sig_b
                    } else {
                        a == b
                    }
                })
                .collect()
        })
        .collect();

    let context = SearchContext::new(SearchInputs {
        reference: &ref_geometry,
        mobile: &mob_geometry,
        classes: &classes,
        reference_fragment: reference.fragments().membership(),
        mobile_fragment: mobile.fragments().membership(),
        compatible,
        fingerprint_tolerance: tolerances.fingerprint_tolerance(),
        span_tolerance: tolerances.displacement_tolerance(),
        allow_mirror: config.allow_mirror,
    });
    let unmatched = context.unmatched_atoms();
    if !unmatched.is_empty() {
        debug!("Reference atoms without an admissible partner: {:?}", unmatched);
        return Ok(AlignmentResult::rejected(MismatchReason::NoAdmissibleMapping));
    }

    Ok(evaluate_candidates(&context, &ref_geometry, &mob_geometry, config))
}

fn resolve_symbols<T: ElementTable + ?Sized>(
    molecule: &Molecule,
    table: &T,
    role: &'static str,
) -> Result<(), AlignmentError> {
    for atom in molecule.atoms() {
        table
            .resolve(&atom.symbol)
            .map_err(|source| AlignmentError::Element {
                molecule: role,
                source,
            })?;
    }
    Ok(())
}

/// Masses when isotopes are distinguished, uniform otherwise.
fn weights(molecule: &Molecule, config: &AlignmentConfig) -> Vec<f64> {
    if config.tolerances.match_isotopes() {
        molecule.masses()
    } else {
        vec![1.0; molecule.len()]
    }
}

fn is_better(candidate: &Alignment, incumbent: Option<&Alignment>) -> bool {
    let Some(incumbent) = incumbent else {
        return true;
    };
    if candidate.rmsd < incumbent.rmsd - RMSD_TIE_EPSILON {
        return true;
    }
    (candidate.rmsd - incumbent.rmsd).abs() <= RMSD_TIE_EPSILON
        && incumbent.mirror_used
        && !candidate.mirror_used
}

fn evaluate_candidates(
    context: &SearchContext,
    reference: &NormalizedGeometry,
    mobile: &NormalizedGeometry,
    config: &AlignmentConfig,
) -> AlignmentResult {
    let tolerances = &config.tolerances;
    let mut candidates = context.candidates();
    let mut evaluated = 0usize;
    let mut best: Option<Alignment> = None;
    let mut mirror_match: Option<Alignment> = None;
    let mut budget_exhausted = false;

    loop {
        if config.max_candidates.is_some_and(|limit| evaluated >= limit) {
            budget_exhausted = candidates.next().is_some();
            break;
        }
        let Some(permutation) = candidates.next() else {
            break;
        };
        evaluated += 1;

        let Some(fit) = solver::fit(
            &reference.centered,
            &mobile.centered,
            &permutation,
            config.allow_mirror,
        ) else {
            continue;
        };
        trace!(
            "Candidate {}: rmsd = {:.3e}, max displacement = {:.3e}, mirror = {}",
            evaluated, fit.rmsd, fit.max_displacement, fit.mirror_used
        );

        let acceptable = fit.rmsd <= tolerances.distance_tolerance()
            && fit.max_displacement <= tolerances.displacement_tolerance();
        let alignment = Alignment {
            permutation,
            rotation: fit.rotation,
            reference_center: reference.center,
            mobile_center: mobile.center,
            rmsd: fit.rmsd,
            max_displacement: fit.max_displacement,
            mirror_used: fit.mirror_used,
        };

        if acceptable && !alignment.mirror_used {
            debug!("Accepted proper fit after {} candidates.", evaluated);
            return AlignmentResult {
                verdict: Verdict::Equivalent,
                alignment: Some(alignment),
                candidates_evaluated: evaluated,
            };
        }
        if acceptable && mirror_match.is_none() {
            mirror_match = Some(alignment.clone());
        }
        if is_better(&alignment, best.as_ref()) {
            best = Some(alignment);
        }
    }

    if let Some(alignment) = mirror_match {
        debug!("Accepted mirror fit after {} candidates.", evaluated);
        return AlignmentResult {
            verdict: Verdict::Equivalent,
            alignment: Some(alignment),
            candidates_evaluated: evaluated,
        };
    }

    let verdict = if budget_exhausted {
        debug!("Candidate budget of {} exhausted.", evaluated);
        Verdict::Inconclusive
    } else if evaluated == 0 {
        Verdict::NotEquivalent(MismatchReason::NoAdmissibleMapping)
    } else {
        Verdict::NotEquivalent(MismatchReason::ExceedsTolerance)
    };
    AlignmentResult {
        verdict,
        alignment: best,
        candidates_evaluated: evaluated,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::data::elements::{CustomElementTable, ElementRecord, PeriodicTable};
    use crate::core::models::builder::MoleculeBuilder;
    use std::borrow::Cow;

    fn build(atoms: &[(&str, [f64; 3])]) -> Molecule {
        let mut builder = MoleculeBuilder::new();
        for &(symbol, position) in atoms {
            builder.atom(symbol, position);
        }
        builder.build(&PeriodicTable::new()).unwrap()
    }

    fn water() -> Molecule {
        build(&[("O", [0.0, 0.0, 0.0]), ("H", [0.0, 1.43, 1.11]), ("H", [0.0, -1.43, 1.11])])
    }

    #[test]
    fn identical_molecules_are_equivalent() {
        let a = water();
        let result = decide(&a, &a, &AlignmentConfig::default(), &PeriodicTable::new()).unwrap();
        assert!(result.is_equivalent());
        let alignment = result.alignment.unwrap();
        assert!(alignment.rmsd < 1e-10);
        assert!(!alignment.mirror_used);
        assert!(result.candidates_evaluated >= 1);
    }

    #[test]
    fn different_composition_is_rejected_before_searching() {
        let a = water();
        let b = build(&[
            ("S", [0.0, 0.0, 0.0]),
            ("H", [0.0, 1.43, 1.11]),
            ("H", [0.0, -1.43, 1.11]),
        ]);
        let result = decide(&a, &b, &AlignmentConfig::default(), &PeriodicTable::new()).unwrap();
        assert_eq!(result.verdict, Verdict::NotEquivalent(MismatchReason::ShapeMismatch));
        assert_eq!(result.candidates_evaluated, 0);
    }

    #[test]
    fn stretched_bond_fails_the_inertia_prefilter() {
        let a = water();
        let b = build(&[
            ("O", [0.0, 0.0, 0.0]),
            ("H", [0.0, 1.43, 1.11]),
            ("H", [0.0, -1.83, 1.41]),
        ]);
        let result = decide(&a, &b, &AlignmentConfig::default(), &PeriodicTable::new()).unwrap();
        assert_eq!(result.verdict, Verdict::NotEquivalent(MismatchReason::InertiaMismatch));
    }

    #[test]
    fn unknown_symbol_is_a_hard_error() {
        let mut table = CustomElementTable::new("test");
        table.insert(ElementRecord {
            atomic_number: 8,
            symbol: Cow::Borrowed("O"),
            name: Cow::Borrowed("Oxygen"),
            mass: 15.99491461957,
            covalent_radius: None,
        })
        .unwrap();
        let a = water();
        let error = decide(&a, &a, &AlignmentConfig::default(), &table).unwrap_err();
        assert!(matches!(error, AlignmentError::Element { molecule: "reference", .. }));
    }

    #[test]
    fn tie_prefers_proper_then_earliest() {
        let base = Alignment {
            permutation: vec![0],
            rotation: nalgebra::Matrix3::identity(),
            reference_center: nalgebra::Point3::origin(),
            mobile_center: nalgebra::Point3::origin(),
            rmsd: 0.5,
            max_displacement: 0.5,
            mirror_used: true,
        };
        let proper = Alignment {
            mirror_used: false,
            ..base.clone()
        };
        assert!(is_better(&proper, Some(&base)));
        assert!(!is_better(&base, Some(&proper)));
        assert!(!is_better(&proper, Some(&proper)));
        assert!(is_better(&base, None));
    }
}
