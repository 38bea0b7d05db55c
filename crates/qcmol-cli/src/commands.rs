pub mod align;
pub mod constant;
pub mod convert;
pub mod dedup;
pub mod element;

use crate::error::{CliError, Result};
use qcmol::core::data::elements::ElementTable;
use qcmol::core::io::traits::MolecularFile;
use qcmol::core::io::xyz::{XyzFile, XyzMetadata};
use qcmol::core::models::molecule::Molecule;
use std::path::Path;
use tracing::debug;

/// Reads an XYZ file, attaching the path to any parse failure.
pub(crate) fn read_xyz(path: &Path, table: &dyn ElementTable) -> Result<(Molecule, XyzMetadata)> {
    debug!("Reading geometry from {:?}", path);
    XyzFile::read_from_path(path, table).map_err(|source| CliError::FileParsing {
        path: path.to_path_buf(),
        source,
    })
}
