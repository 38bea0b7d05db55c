use crate::core::data::elements::ElementTable;
use crate::core::models::molecule::Molecule;
use std::error::Error;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Defines the interface for reading and writing molecular file formats.
///
/// Readers resolve element symbols through an injected [`ElementTable`], so the same
/// file can be read against the built-in periodic table or a custom data release.
pub trait MolecularFile {
    /// Format-specific information that is not part of the [`Molecule`] record.
    type Metadata;

    /// The error type for I/O operations.
    type Error: Error + From<io::Error>;

    /// Reads a molecule from a buffered reader.
    ///
    /// # Arguments
    ///
    /// * `reader` - The buffered reader to read from.
    /// * `table` - Element data used to resolve symbols and default masses.
    ///
    /// # Return
    ///
    /// Returns the parsed molecule and associated metadata.
    ///
    /// # Errors
    ///
    /// Returns an error if parsing fails, the molecule is invalid, or I/O operations
    /// encounter issues.
    fn read_from(
        reader: &mut impl BufRead,
        table: &dyn ElementTable,
    ) -> Result<(Molecule, Self::Metadata), Self::Error>;

    /// Writes a molecule and metadata to a writer.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails or I/O operations encounter issues.
    fn write_to(
        molecule: &Molecule,
        metadata: &Self::Metadata,
        writer: &mut impl Write,
    ) -> Result<(), Self::Error>;

    /// Writes a molecule to a writer with default metadata.
    fn write_molecule_to(molecule: &Molecule, writer: &mut impl Write) -> Result<(), Self::Error>;

    /// Wraps an I/O failure on `path` in the format's error type.
    fn path_error(path: &Path, source: io::Error) -> Self::Error;

    /// Reads a molecule from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error carrying the path if the file cannot be opened, or any error
    /// of [`read_from`](Self::read_from).
    fn read_from_path<P: AsRef<Path>>(
        path: P,
        table: &dyn ElementTable,
    ) -> Result<(Molecule, Self::Metadata), Self::Error> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| Self::path_error(path, e))?;
        let mut reader = BufReader::new(file);
        Self::read_from(&mut reader, table)
    }

    /// Writes a molecule and metadata to a file path.
    fn write_to_path<P: AsRef<Path>>(
        molecule: &Molecule,
        metadata: &Self::Metadata,
        path: P,
    ) -> Result<(), Self::Error> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| Self::path_error(path, e))?;
        let mut writer = BufWriter::new(file);
        Self::write_to(molecule, metadata, &mut writer)?;
        writer.flush().map_err(|e| Self::path_error(path, e))
    }

    /// Writes a molecule to a file path with default metadata.
    fn write_molecule_to_path<P: AsRef<Path>>(
        molecule: &Molecule,
        path: P,
    ) -> Result<(), Self::Error> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| Self::path_error(path, e))?;
        let mut writer = BufWriter::new(file);
        Self::write_molecule_to(molecule, &mut writer)?;
        writer.flush().map_err(|e| Self::path_error(path, e))
    }
}
