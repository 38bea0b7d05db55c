use qcmol::core::data::constants::ConstantError;
use qcmol::core::data::elements::ElementTableError;
use qcmol::core::io::format::FormatError;
use qcmol::core::io::xyz::XyzError;
use qcmol::core::models::molecule::MoleculeError;
use qcmol::engine::config::ConfigError;
use qcmol::engine::error::AlignmentError;
use crate::utils::parser::ParseError;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Alignment(#[from] AlignmentError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Element data error: {0}")]
    Element(#[from] ElementTableError),

    #[error(transparent)]
    Constant(#[from] ConstantError),

    #[error("Failed to parse file '{path}': {source}", path = path.display())]
    FileParsing {
        path: PathBuf,
        #[source]
        source: XyzError,
    },

    #[error("Failed to write XYZ output: {0}")]
    XyzWrite(#[from] XyzError),

    #[error("Output error: {0}")]
    Format(#[from] FormatError),

    #[error("Invalid molecule: {0}")]
    Molecule(#[from] MoleculeError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid argument: {0}")]
    Argument(String),

    #[error(transparent)]
    Parse(#[from] ParseError),
}
