use crate::core::data::elements::ElementTable;
use crate::core::models::molecule::Molecule;
use crate::engine::config::AlignmentConfig;
use crate::engine::decision::decide;
use crate::engine::error::AlignmentError;
use crate::engine::progress::{Progress, ProgressReporter};
use rayon::prelude::*;
use tracing::{info, instrument};

/// Outcome of collapsing a batch of molecules into equivalence classes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DedupReport {
    /// Indices of the entries that match no earlier entry, ascending.
    pub representatives: Vec<usize>,
    /// For every entry, the lowest-index earlier entry it matches.
    pub duplicate_of: Vec<Option<usize>>,
}

impl DedupReport {
    pub fn unique_count(&self) -> usize {
        self.representatives.len()
    }

    pub fn is_duplicate(&self, index: usize) -> bool {
        self.duplicate_of.get(index).is_some_and(Option::is_some)
    }
}

/// Finds, for every molecule, the first earlier molecule it is equivalent to.
///
/// Entries are compared in parallel; the report does not depend on scheduling.
#[instrument(skip_all, name = "dedup_workflow", fields(molecules = molecules.len()))]
pub fn run<T: ElementTable + ?Sized>(
    molecules: &[Molecule],
    config: &AlignmentConfig,
    table: &T,
    reporter: &ProgressReporter,
) -> Result<DedupReport, AlignmentError> {
    let n = molecules.len();
    let total_pairs = (n as u64) * (n.saturating_sub(1) as u64) / 2;
    reporter.report(Progress::BatchStart {
        molecules: n,
        total_pairs,
    });
    info!("Deduplicating {} molecules ({} pairs at most).", n, total_pairs);

    let duplicate_of = (0..n)
        .into_par_iter()
        .map(|later| -> Result<Option<usize>, AlignmentError> {
            for earlier in 0..later {
                let equivalent =
                    decide(&molecules[earlier], &molecules[later], config, table)?.is_equivalent();
                reporter.report(Progress::PairCompared {
                    earlier,
                    later,
                    equivalent,
                });
                if equivalent {
                    return Ok(Some(earlier));
                }
            }
            Ok(None)
        })
        .collect::<Result<Vec<_>, AlignmentError>>()?;

    let representatives: Vec<usize> = duplicate_of
        .iter()
        .enumerate()
        .filter(|(_, d)| d.is_none())
        .map(|(i, _)| i)
        .collect();

    info!(
        "Found {} unique structures among {} molecules.",
        representatives.len(),
        n
    );
    reporter.report(Progress::BatchFinish {
        unique: representatives.len(),
    });

    Ok(DedupReport {
        representatives,
        duplicate_of,
    })
}
