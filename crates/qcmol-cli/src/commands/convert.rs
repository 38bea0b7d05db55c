use super::read_xyz;
use crate::cli::ConvertArgs;
use crate::error::Result;
use crate::utils::parser::{parse_dtype, parse_units};
use qcmol::core::data::elements::PeriodicTable;
use qcmol::core::io::format::{FormatOptions, to_string};
use std::fs;
use tracing::info;

pub fn run(args: ConvertArgs) -> Result<()> {
    let dtype = parse_dtype(&args.dtype)?;
    let units = args.units.as_deref().map(parse_units).transpose()?;

    let table = PeriodicTable::new();
    let (molecule, _) = read_xyz(&args.input, &table)?;
    let rendered = to_string(&molecule, dtype, units, &FormatOptions::default())?;

    match &args.output {
        Some(path) => {
            fs::write(path, rendered)?;
            info!("Wrote {} input to {:?}", dtype, path);
        }
        None => print!("{}", rendered),
    }
    Ok(())
}
