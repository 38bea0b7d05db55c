use qcmol::core::data::constants::{CodataRelease, LengthUnit};
use qcmol::core::io::format::Dtype;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("Unknown output format '{0}'. Expected one of: {list}.", list = dtype_list())]
    UnknownDtype(String),

    #[error("Unknown length unit '{0}'. Expected 'bohr', 'angstrom', 'nm', 'pm' or 'm'.")]
    UnknownUnits(String),

    #[error("Unknown CODATA release '{0}'. Expected 'codata2014' or 'codata2018'.")]
    UnknownRelease(String),
}

fn dtype_list() -> String {
    Dtype::ALL
        .iter()
        .map(|d| d.name())
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn parse_dtype(s: &str) -> Result<Dtype, ParseError> {
    s.parse().map_err(|_| ParseError::UnknownDtype(s.to_string()))
}

pub fn parse_units(s: &str) -> Result<LengthUnit, ParseError> {
    s.parse().map_err(|_| ParseError::UnknownUnits(s.to_string()))
}

pub fn parse_release(s: &str) -> Result<CodataRelease, ParseError> {
    s.parse()
        .map_err(|_| ParseError::UnknownRelease(s.to_string()))
}
