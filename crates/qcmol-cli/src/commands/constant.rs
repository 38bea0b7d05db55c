use crate::cli::{ConstantArgs, ConstantsArgs};
use crate::error::Result;
use crate::utils::parser::parse_release;
use qcmol::core::data::constants::{ConstantError, PhysicalConstant, PhysicalConstants};
use std::fmt::Write;

pub fn run_constant(args: ConstantArgs) -> Result<()> {
    let constants = PhysicalConstants::new(parse_release(&args.release)?);
    let constant = constants
        .lookup(&args.name)
        .ok_or_else(|| ConstantError::UnknownConstant(args.name.clone()))?;
    println!("{}", format_constant(&constant));
    Ok(())
}

pub fn run_constants(args: ConstantsArgs) -> Result<()> {
    let constants = PhysicalConstants::new(parse_release(&args.release)?);
    print!("{}", format_table(&constants));
    Ok(())
}

fn format_constant(constant: &PhysicalConstant) -> String {
    format!(
        "{} ({}) = {:e} {}  [{}]",
        constant.name, constant.label, constant.value, constant.units, constant.release
    )
}

fn format_table(constants: &PhysicalConstants) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", constants.release());
    let _ = writeln!(out, "{:<38} {:<16} {:>24}  {}", "Name", "Label", "Value", "Units");
    for constant in constants.iter() {
        let _ = writeln!(
            out,
            "{:<38} {:<16} {:>24e}  {}",
            constant.name, constant.label, constant.value, constant.units
        );
    }
    out
}
