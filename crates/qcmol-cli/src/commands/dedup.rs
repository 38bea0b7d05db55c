use super::read_xyz;
use crate::cli::DedupArgs;
use crate::config::resolve_alignment_config;
use crate::error::Result;
use crate::utils::progress::CliProgressHandler;
use qcmol::core::data::elements::PeriodicTable;
use qcmol::engine::progress::ProgressReporter;
use qcmol::workflows::dedup::{self, DedupReport};
use std::fmt::Write;
use std::path::PathBuf;
use tracing::info;

pub fn run(args: DedupArgs) -> Result<()> {
    let config = resolve_alignment_config(&args.options)?;
    let table = PeriodicTable::new();

    let molecules = args
        .inputs
        .iter()
        .map(|path| read_xyz(path, &table).map(|(molecule, _)| molecule))
        .collect::<Result<Vec<_>>>()?;
    info!("Loaded {} geometries.", molecules.len());

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    let report = dedup::run(&molecules, &config, &table, &reporter)?;
    print!("{}", format_report(&args.inputs, &report));
    Ok(())
}

fn format_report(inputs: &[PathBuf], report: &DedupReport) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} of {} geometries are unique:",
        report.unique_count(),
        inputs.len()
    );
    for (index, path) in inputs.iter().enumerate() {
        match report.duplicate_of.get(index).copied().flatten() {
            Some(original) => {
                let _ = writeln!(
                    out,
                    "  {}  duplicate of {}",
                    path.display(),
                    inputs[original].display()
                );
            }
            None => {
                let _ = writeln!(out, "  {}", path.display());
            }
        }
    }
    out
}
