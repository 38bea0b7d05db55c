use crate::cli::ElementArgs;
use crate::error::Result;
use qcmol::core::data::elements::{
    CustomElementTable, ElementTable, ElementTableError, PeriodicTable, isotope_alias,
};
use std::fmt::Write;
use tracing::info;

pub fn run(args: ElementArgs) -> Result<()> {
    let report = match &args.table {
        Some(path) => {
            info!("Loading custom element table from {:?}", path);
            let table = CustomElementTable::load_csv(path, &path.to_string_lossy())?;
            describe(&table, &args.symbol, args.isotope)?
        }
        None => describe(&PeriodicTable::new(), &args.symbol, args.isotope)?,
    };
    print!("{}", report);
    Ok(())
}

/// Human-readable summary of one element, or of one of its isotopes.
pub fn describe(
    table: &dyn ElementTable,
    symbol: &str,
    isotope: Option<u32>,
) -> Result<String> {
    let (symbol, alias_mass_number) = isotope_alias(symbol);
    let mass_number = isotope.or(alias_mass_number);
    let record = table.resolve(symbol)?;

    let mass = match mass_number {
        Some(a) => table
            .isotope_mass(symbol, a)
            .ok_or_else(|| ElementTableError::UnknownIsotope {
                symbol: record.symbol.to_string(),
                mass_number: a,
            })?,
        None => record.mass,
    };

    let mut out = String::new();
    match mass_number {
        Some(a) => {
            let _ = writeln!(out, "{}-{} ({})", record.symbol, a, record.name);
        }
        None => {
            let _ = writeln!(out, "{} ({})", record.symbol, record.name);
        }
    }
    let _ = writeln!(out, "  Atomic number:   {}", record.atomic_number);
    let _ = writeln!(out, "  Mass:            {} u", mass);
    match record.covalent_radius {
        Some(radius) => {
            let _ = writeln!(out, "  Covalent radius: {} Angstrom", radius);
        }
        None => {
            let _ = writeln!(out, "  Covalent radius: n/a");
        }
    }
    let _ = writeln!(out, "  Data release:    {}", table.release());
    Ok(out)
}
