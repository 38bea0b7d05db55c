use super::read_xyz;
use crate::cli::AlignArgs;
use crate::config::resolve_alignment_config;
use crate::error::Result;
use qcmol::core::data::elements::PeriodicTable;
use qcmol::core::io::traits::MolecularFile;
use qcmol::core::io::xyz::{XyzFile, XyzMetadata};
use qcmol::engine::result::AlignmentResult;
use qcmol::workflows::align;
use std::fmt::Write;
use tracing::info;

pub fn run(args: AlignArgs) -> Result<()> {
    let config = resolve_alignment_config(&args.options)?;
    let table = PeriodicTable::new();

    let (reference, _) = read_xyz(&args.reference, &table)?;
    let (mobile, mobile_metadata) = read_xyz(&args.mobile, &table)?;

    let result = align::run(&reference, &mobile, &config, &table)?;
    print!("{}", format_result(&result));

    if let Some(output) = &args.output {
        match &result.alignment {
            Some(alignment) => {
                let aligned = alignment.apply(&mobile)?;
                let metadata = XyzMetadata {
                    comment: Some(format!("aligned onto {}", args.reference.display())),
                    ..mobile_metadata
                };
                XyzFile::write_to_path(&aligned, &metadata, output)?;
                info!("Aligned geometry written to {:?}", output);
            }
            None => {
                println!("No alignment to write; {:?} was not created.", output);
            }
        }
    }

    Ok(())
}

fn format_result(result: &AlignmentResult) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Verdict:              {}", result.verdict);
    let _ = writeln!(out, "Candidates evaluated: {}", result.candidates_evaluated);

    let Some(alignment) = &result.alignment else {
        return out;
    };

    let permutation = alignment
        .permutation
        .iter()
        .map(usize::to_string)
        .collect::<Vec<_>>()
        .join(" ");
    let _ = writeln!(out, "Permutation:          {}", permutation);
    let _ = writeln!(out, "RMSD:                 {:.6e} bohr", alignment.rmsd);
    let _ = writeln!(out, "Max displacement:     {:.6e} bohr", alignment.max_displacement);
    let _ = writeln!(out, "Mirror used:          {}", alignment.mirror_used);
    let _ = writeln!(out, "Rotation:");
    for row in alignment.rotation.row_iter() {
        let _ = writeln!(out, "  {:>12.8} {:>12.8} {:>12.8}", row[0], row[1], row[2]);
    }
    let t = alignment.translation();
    let _ = writeln!(out, "Translation (bohr):   {:.8} {:.8} {:.8}", t.x, t.y, t.z);
    out
}
