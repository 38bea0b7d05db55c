use crate::core::data::constants::LengthUnit;
use crate::core::data::elements::ElementTable;
use crate::core::io::format::{Dtype, FormatError, FormatOptions, to_string};
use crate::core::io::traits::MolecularFile;
use crate::core::models::builder::{AtomSpec, MoleculeBuilder};
use crate::core::models::molecule::{Molecule, MoleculeError};
use std::io::{self, BufRead, Write};
use std::path::Path;
use thiserror::Error;

/// Header information of an XYZ file that is not part of the molecule record.
#[derive(Debug, Clone, PartialEq)]
pub struct XyzMetadata {
    /// Units of the coordinates as written in the file.
    pub units: LengthUnit,
    /// Free-form second line, when it did not carry a charge and multiplicity.
    pub comment: Option<String>,
}

impl Default for XyzMetadata {
    fn default() -> Self {
        Self {
            units: LengthUnit::Angstrom,
            comment: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum XyzError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("File I/O error for '{path}': {source}")]
    File { path: String, source: io::Error },
    #[error("Parse error on line {line}: {kind}")]
    Parse { line: usize, kind: XyzParseErrorKind },
    #[error("Header declares {expected} atoms but {found} atom lines follow")]
    AtomCountMismatch { expected: usize, found: usize },
    #[error("Invalid molecule: {0}")]
    Molecule(#[from] MoleculeError),
    #[error(transparent)]
    Format(#[from] FormatError),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum XyzParseErrorKind {
    #[error("File is missing the atom count line")]
    MissingHeader,
    #[error("Invalid atom count '{0}'")]
    InvalidAtomCount(String),
    #[error("Unknown units '{0}'")]
    UnknownUnits(String),
    #[error("Atom line needs a symbol and three coordinates")]
    TooFewFields,
    #[error("Invalid atom label '{0}'")]
    InvalidAtomLabel(String),
    #[error("Invalid coordinate '{0}'")]
    InvalidCoordinate(String),
}

pub struct XyzFile;

impl MolecularFile for XyzFile {
    type Metadata = XyzMetadata;
    type Error = XyzError;

    fn read_from(
        reader: &mut impl BufRead,
        table: &dyn ElementTable,
    ) -> Result<(Molecule, Self::Metadata), Self::Error> {
        let mut lines = reader.lines().enumerate();
        let parse_err = |line: usize, kind| XyzError::Parse {
            line: line + 1,
            kind,
        };

        let (header_index, header) = match lines.next() {
            Some((i, line)) => (i, line?),
            None => return Err(parse_err(0, XyzParseErrorKind::MissingHeader)),
        };
        let mut header_fields = header.split_whitespace();
        let count_field = header_fields
            .next()
            .ok_or_else(|| parse_err(header_index, XyzParseErrorKind::MissingHeader))?;
        let expected: usize = count_field.parse().map_err(|_| {
            parse_err(
                header_index,
                XyzParseErrorKind::InvalidAtomCount(count_field.to_string()),
            )
        })?;
        let units = match header_fields.next() {
            None => LengthUnit::Angstrom,
            Some(tag) => tag.parse::<LengthUnit>().map_err(|_| {
                parse_err(header_index, XyzParseErrorKind::UnknownUnits(tag.to_string()))
            })?,
        };

        let mut builder = MoleculeBuilder::new();
        builder.units(units);
        let mut metadata = XyzMetadata {
            units,
            comment: None,
        };

        if let Some((_, second)) = lines.next() {
            let second = second?;
            match parse_charge_line(&second) {
                Some((charge, multiplicity, name)) => {
                    builder.charge(charge).multiplicity(multiplicity);
                    if let Some(name) = name {
                        builder.name(name);
                    }
                }
                None => {
                    let comment = second.trim();
                    if !comment.is_empty() {
                        metadata.comment = Some(comment.to_string());
                        if !comment.contains(char::is_whitespace) {
                            builder.name(comment);
                        }
                    }
                }
            }
        }

        for (index, line) in lines {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let spec = parse_atom_line(&line).map_err(|kind| parse_err(index, kind))?;
            builder.push(spec);
        }

        if builder.len() != expected {
            return Err(XyzError::AtomCountMismatch {
                expected,
                found: builder.len(),
            });
        }

        let molecule = builder.build(table)?;
        Ok((molecule, metadata))
    }

    fn write_to(
        molecule: &Molecule,
        metadata: &Self::Metadata,
        writer: &mut impl Write,
    ) -> Result<(), Self::Error> {
        let text = to_string(
            molecule,
            Dtype::XyzPlus,
            Some(metadata.units),
            &FormatOptions::default(),
        )?;
        writer.write_all(text.as_bytes())?;
        Ok(())
    }

    fn write_molecule_to(molecule: &Molecule, writer: &mut impl Write) -> Result<(), Self::Error> {
        Self::write_to(molecule, &XyzMetadata::default(), writer)
    }

    fn path_error(path: &Path, source: io::Error) -> Self::Error {
        XyzError::File {
            path: path.to_string_lossy().to_string(),
            source,
        }
    }
}

/// `<charge> <multiplicity> [name]`; `None` when the line is a free comment.
fn parse_charge_line(line: &str) -> Option<(f64, u32, Option<&str>)> {
    let mut fields = line.split_whitespace();
    let charge: f64 = fields.next()?.parse().ok()?;
    let multiplicity: u32 = fields.next()?.parse().ok()?;
    Some((charge, multiplicity, fields.next()))
}

fn parse_atom_line(line: &str) -> Result<AtomSpec, XyzParseErrorKind> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() < 4 {
        return Err(XyzParseErrorKind::TooFewFields);
    }

    let mut position = [0.0; 3];
    for (slot, field) in position.iter_mut().zip(&fields[1..4]) {
        *slot = field
            .parse()
            .map_err(|_| XyzParseErrorKind::InvalidCoordinate(field.to_string()))?;
    }

    let (symbol, label, real) = split_nucleus(fields[0])?;
    let mut spec = AtomSpec::new(symbol, position).label(label);
    if !real {
        spec = spec.ghost();
    }
    Ok(spec)
}

/// Splits `@He`, `Gh(C_a)` or `H12` into symbol, label and the real flag.
fn split_nucleus(token: &str) -> Result<(&str, &str, bool), XyzParseErrorKind> {
    let invalid = || XyzParseErrorKind::InvalidAtomLabel(token.to_string());

    let (body, real) = if let Some(rest) = token.strip_prefix('@') {
        (rest, false)
    } else if token.get(..3).is_some_and(|p| p.eq_ignore_ascii_case("gh(")) {
        (token[3..].strip_suffix(')').ok_or_else(invalid)?, false)
    } else {
        (token, true)
    };

    let symbol_len = body
        .find(|c: char| !c.is_ascii_alphabetic())
        .unwrap_or(body.len());
    if symbol_len == 0 || symbol_len > 3 {
        return Err(invalid());
    }
    let (symbol, label) = body.split_at(symbol_len);

    let label_ok = match label.strip_prefix('_') {
        Some(rest) => {
            !rest.is_empty() && rest.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        None => label.chars().all(|c| c.is_ascii_digit()),
    };
    if !label_ok {
        return Err(invalid());
    }
    Ok((symbol, label, real))
}
