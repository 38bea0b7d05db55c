//! Molecule-to-string rendering for the input formats of common quantum-chemistry programs.
//!
//! Every layout shares one atom line convention: the nucleus field left-aligned to the
//! coordinate width, followed by three right-aligned fixed-point coordinates, all
//! separated by two spaces.

use crate::core::data::constants::{CodataRelease, LengthUnit, PhysicalConstants};
use crate::core::models::atom::Atom;
use crate::core::models::molecule::Molecule;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use toml::{Table, Value};

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum FormatError {
    #[error("Output format '{0}' is not understood")]
    UnknownDtype(String),
    #[error("Format '{dtype}' cannot express coordinates in {units}")]
    UnsupportedUnits { dtype: Dtype, units: LengthUnit },
}

/// Target program layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dtype {
    Xyz,
    /// XYZ with charge, multiplicity and a unit tag, readable back by
    /// [`XyzFile`](super::xyz::XyzFile).
    XyzPlus,
    Psi4,
    Qchem,
    Orca,
    Nwchem,
    Molpro,
    Cfour,
    Terachem,
    Turbomole,
    Gamess,
    Madness,
    Mrchem,
}

impl Dtype {
    pub const ALL: [Dtype; 13] = [
        Dtype::Xyz,
        Dtype::XyzPlus,
        Dtype::Psi4,
        Dtype::Qchem,
        Dtype::Orca,
        Dtype::Nwchem,
        Dtype::Molpro,
        Dtype::Cfour,
        Dtype::Terachem,
        Dtype::Turbomole,
        Dtype::Gamess,
        Dtype::Madness,
        Dtype::Mrchem,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Dtype::Xyz => "xyz",
            Dtype::XyzPlus => "xyz+",
            Dtype::Psi4 => "psi4",
            Dtype::Qchem => "qchem",
            Dtype::Orca => "orca",
            Dtype::Nwchem => "nwchem",
            Dtype::Molpro => "molpro",
            Dtype::Cfour => "cfour",
            Dtype::Terachem => "terachem",
            Dtype::Turbomole => "turbomole",
            Dtype::Gamess => "gamess",
            Dtype::Madness => "madness",
            Dtype::Mrchem => "mrchem",
        }
    }

    /// Units used when the caller does not ask for specific ones.
    pub fn default_units(self) -> LengthUnit {
        match self {
            Dtype::Xyz | Dtype::XyzPlus => LengthUnit::Angstrom,
            _ => LengthUnit::Bohr,
        }
    }
}

impl fmt::Display for Dtype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Dtype {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        Dtype::ALL
            .into_iter()
            .find(|d| d.name() == lowered)
            .ok_or_else(|| FormatError::UnknownDtype(s.to_string()))
    }
}

/// Layout knobs for [`to_string`].
///
/// `atom_format` and `ghost_format` are templates over the fields `{elem}` (symbol),
/// `{elbl}` (label), `{elez}` (atomic number), `{elea}` (mass number, empty unless the
/// atom is a specific isotope) and `{mass}`. They are honored by the XYZ layouts only;
/// every program layout uses its own fixed nucleus format. An empty ghost format drops
/// ghost atoms from the output.
#[derive(Debug, Clone, PartialEq)]
pub struct FormatOptions {
    pub width: usize,
    pub prec: usize,
    pub atom_format: Option<String>,
    pub ghost_format: Option<String>,
    pub release: CodataRelease,
    /// Energy precision card for MADNESS; omitted when `None`.
    pub eprec: Option<f64>,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            width: 17,
            prec: 12,
            atom_format: None,
            ghost_format: None,
            release: CodataRelease::default(),
            eprec: None,
        }
    }
}

/// Molecule information that a layout cannot express in the string itself.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FormatData {
    /// Molecule fields carried by the string or by `keywords`.
    pub fields: Vec<&'static str>,
    /// Program options, with nested sections spelled `section__option`.
    pub keywords: Table,
}

/// Renders `molecule` in the input layout of `dtype`.
///
/// `units` defaults to [`Dtype::default_units`]. The molecule name defaults to its
/// formula. The returned string always ends with a newline.
///
/// # Errors
///
/// Returns [`FormatError::UnsupportedUnits`] when the layout has no way to declare the
/// requested units.
pub fn to_string(
    molecule: &Molecule,
    dtype: Dtype,
    units: Option<LengthUnit>,
    options: &FormatOptions,
) -> Result<String, FormatError> {
    to_string_with_data(molecule, dtype, units, options).map(|(smol, _)| smol)
}

/// Like [`to_string`], also returning the charge, multiplicity, unit and symmetry
/// settings the program expects as options rather than in the geometry block.
pub fn to_string_with_data(
    molecule: &Molecule,
    dtype: Dtype,
    units: Option<LengthUnit>,
    options: &FormatOptions,
) -> Result<(String, FormatData), FormatError> {
    let units = units.unwrap_or(dtype.default_units());
    let factor =
        PhysicalConstants::new(options.release).conversion_factor(LengthUnit::Bohr, units);
    let name = molecule
        .name()
        .map(str::to_string)
        .unwrap_or_else(|| molecule.formula());
    let tagline = format!("auto-generated by qcmol from molecule {name}");
    let charge = molecule.molecular_charge().trunc() as i64;
    let multiplicity = molecule.molecular_multiplicity();
    let unsupported = || FormatError::UnsupportedUnits { dtype, units };

    let lines = AtomLines {
        molecule,
        factor,
        width: options.width,
        prec: options.prec,
    };
    let mut fields = vec!["atomic_numbers", "geometry", "symbols"];
    let mut keywords = Table::new();

    let smol: Vec<String> = match dtype {
        Dtype::Xyz | Dtype::XyzPlus => {
            let atom_format = options.atom_format.as_deref().unwrap_or("{elem}");
            let ghost_format = options.ghost_format.as_deref().unwrap_or("@{elem}");
            let atoms = lines.render(atom_format, ghost_format, false);
            let tag = match units {
                LengthUnit::Bohr => "au".to_string(),
                LengthUnit::Angstrom => String::new(),
                other => other.name().to_ascii_lowercase(),
            };
            let mut smol = vec![
                format!("{} {}", atoms.len(), tag).trim_end().to_string(),
                format!("{charge} {multiplicity} {name}"),
            ];
            smol.extend(atoms);
            smol
        }
        Dtype::Orca => {
            let header = match units {
                LengthUnit::Bohr => "! Bohrs",
                LengthUnit::Angstrom => "!",
                _ => return Err(unsupported()),
            };
            let mut smol = vec![
                header.to_string(),
                String::new(),
                format!("*xyz {charge} {multiplicity}"),
            ];
            smol.extend(lines.render("{elem}", "{elem}:", false));
            smol.push("*".to_string());
            smol
        }
        Dtype::Cfour => {
            let mut smol = vec![tagline];
            smol.extend(lines.render("{elem}", "GH", false));

            fields.extend(["molecular_charge", "molecular_multiplicity", "real"]);
            keywords.insert("charge".into(), charge.into());
            keywords.insert("multiplicity".into(), i64::from(multiplicity).into());
            let unit_name = match units {
                LengthUnit::Bohr => Some("bohr"),
                LengthUnit::Angstrom => Some("angstrom"),
                _ => None,
            };
            if let Some(unit_name) = unit_name {
                keywords.insert("units".into(), unit_name.into());
            }
            keywords.insert("coordinates".into(), "cartesian".into());
            smol
        }
        Dtype::Molpro => {
            let unit_card = match units {
                LengthUnit::Bohr => "bohr",
                LengthUnit::Angstrom => "angstrom",
                _ => return Err(unsupported()),
            };
            let mut smol = Vec::new();
            if molecule.fix_orientation() || molecule.fix_com() {
                smol.push("{orient,noorient}".to_string());
            }
            match molecule.fix_symmetry() {
                Some(group) if group.eq_ignore_ascii_case("c1") => {
                    smol.push("{symmetry,nosym}".to_string())
                }
                None => smol.push("{symmetry,auto}".to_string()),
                Some(_) => {}
            }
            smol.push(String::new());
            smol.push(format!("{{{unit_card}}}"));
            smol.push("geometry={".to_string());
            smol.extend(lines.render("{elem}", "{elem}", false));
            smol.push("}".to_string());

            let ghosts: Vec<String> = molecule
                .atoms()
                .iter()
                .enumerate()
                .filter(|(_, atom)| !atom.real)
                .map(|(i, _)| (i + 1).to_string())
                .collect();
            if !ghosts.is_empty() {
                smol.push(format!("dummy,{}", ghosts.join(",")));
            }
            smol.push(format!("set,charge={:?}", molecule.molecular_charge()));
            smol.push(format!("set,spin={}", multiplicity.saturating_sub(1)));
            smol
        }
        Dtype::Nwchem => {
            let unit_name = match units {
                LengthUnit::Bohr => "bohr",
                LengthUnit::Angstrom => "angstroms",
                LengthUnit::Nanometer => "nanometers",
                LengthUnit::Picometer => "picometers",
                LengthUnit::Meter => return Err(unsupported()),
            };
            let mut smol = vec![format!("geometry units {unit_name}")];
            smol.extend(lines.render("{elem}{elbl}", "bq{elem}{elbl}", false));
            smol.push(
                molecule
                    .fix_symmetry()
                    .map(|group| format!("symmetry {group}"))
                    .unwrap_or_default(),
            );
            smol.push("end".to_string());

            fields.extend(["molecular_charge", "molecular_multiplicity", "real"]);
            keywords.insert("charge".into(), charge.into());
            if multiplicity != 1 {
                let multiplicity = i64::from(multiplicity);
                keywords.insert("scf__nopen".into(), (multiplicity - 1).into());
                keywords.insert("dft__mult".into(), multiplicity.into());
                keywords.insert("mcscf__multiplicity".into(), multiplicity.into());
            }
            smol
        }
        Dtype::Gamess => {
            let unit_name = match units {
                LengthUnit::Bohr => "bohr",
                LengthUnit::Angstrom => "angs",
                _ => return Err(unsupported()),
            };
            let group = molecule.fix_symmetry().unwrap_or("C1").trim();
            let mut symmetry_card = format!(" {group}");
            if !group.eq_ignore_ascii_case("c1") {
                symmetry_card.push('\n');
            }
            let mut smol = vec![" $data".to_string(), format!(" {tagline}"), symmetry_card];
            smol.extend(lines.render(" {elem}{elbl} {elez}", " {elem} -{elez}", false));
            smol.push(" $end".to_string());

            fields.extend(["molecular_charge", "molecular_multiplicity", "real"]);
            keywords.insert("contrl__icharg".into(), charge.into());
            keywords.insert("contrl__mult".into(), i64::from(multiplicity).into());
            keywords.insert("contrl__units".into(), unit_name.into());
            keywords.insert("contrl__coord".into(), "prinaxis".into());
            smol
        }
        Dtype::Terachem => {
            let tag = match units {
                LengthUnit::Bohr => "au",
                LengthUnit::Angstrom => "",
                _ => return Err(unsupported()),
            };
            let atoms = lines.render("{elem}", "X{elem}", false);
            let mut smol = vec![format!("{} {}", atoms.len(), tag).trim_end().to_string(), name];
            smol.extend(atoms);
            smol
        }
        Dtype::Psi4 => {
            let unit_name = match units {
                LengthUnit::Bohr => "bohr",
                LengthUnit::Angstrom => "angstrom",
                _ => return Err(unsupported()),
            };
            let mut smol = vec![format!("{charge} {multiplicity}")];
            smol.extend(lines.render_fragments("{elem}{elbl}", "Gh({elem}{elbl})"));
            smol.push(format!("units {unit_name}"));
            if molecule.fix_com() {
                smol.push("no_com".to_string());
            }
            if molecule.fix_orientation() {
                smol.push("no_reorient".to_string());
            }

            fields.extend([
                "molecular_charge",
                "molecular_multiplicity",
                "fragments",
                "fragment_charges",
                "fragment_multiplicities",
                "fix_com",
                "fix_orientation",
                "real",
            ]);
            smol
        }
        Dtype::Qchem => {
            if !matches!(units, LengthUnit::Bohr | LengthUnit::Angstrom) {
                return Err(unsupported());
            }
            let mut smol = vec!["$molecule".to_string(), format!("{charge} {multiplicity}")];
            smol.extend(lines.render_fragments("{elem}", "@{elem}"));
            smol.push("$end".to_string());

            fields.extend([
                "fix_com",
                "fix_orientation",
                "fragment_charges",
                "fragment_multiplicities",
                "molecular_charge",
                "molecular_multiplicity",
                "real",
                "units",
            ]);
            keywords.insert(
                "no_reorient".into(),
                (molecule.fix_orientation() || molecule.fix_com()).into(),
            );
            keywords.insert("input_bohr".into(), (units == LengthUnit::Bohr).into());
            if molecule
                .fix_symmetry()
                .is_some_and(|group| group.eq_ignore_ascii_case("c1"))
            {
                keywords.insert("sym_ignore".into(), true.into());
                keywords.insert("symmetry".into(), false.into());
            }
            smol
        }
        Dtype::Turbomole => {
            if units != LengthUnit::Bohr {
                return Err(unsupported());
            }
            let mut smol = vec!["$coord".to_string()];
            smol.extend(
                lines
                    .render("{elem}", "{elem}", true)
                    .into_iter()
                    .map(|line| line.to_lowercase()),
            );
            smol.push("$end".to_string());
            smol
        }
        Dtype::Madness => {
            let unit_name = match units {
                LengthUnit::Bohr => "au",
                LengthUnit::Angstrom => "angstrom",
                _ => return Err(unsupported()),
            };
            let mut smol = vec!["geometry".to_string(), format!("units {unit_name}")];
            if let Some(eprec) = options.eprec {
                smol.push(format!("eprec {eprec}"));
            }
            smol.extend(lines.render("{elem}", "GH", false));
            smol.push("end".to_string());

            fields.extend(["molecular_charge", "molecular_multiplicity"]);
            keywords.insert("charge".into(), charge.into());
            keywords.insert(
                "madqc_json".into(),
                Value::Table(madqc_json(molecule, &name, factor, unit_name, options)),
            );
            if multiplicity != 1 {
                keywords.insert("spin_restricted".into(), false.into());
            }
            smol
        }
        Dtype::Mrchem => {
            let atoms = lines.render("{elem}", "{elem}", false);
            let mut smol = vec![
                "Molecule {".to_string(),
                format!("charge = {charge}"),
                format!("multiplicity = {multiplicity}"),
                format!("translate = {}", molecule.fix_com()),
                "$coords".to_string(),
            ];
            smol.extend(atoms.iter().cloned());
            smol.push("$end\n}".to_string());

            keywords.insert("charge".into(), charge.into());
            keywords.insert("multiplicity".into(), i64::from(multiplicity).into());
            keywords.insert("translate".into(), molecule.fix_com().into());
            keywords.insert("coords".into(), atoms.join("\n").into());
            smol
        }
    };

    let mut out = smol.join("\n");
    out.push('\n');
    Ok((out, FormatData { fields, keywords }))
}

/// Geometry block of a MADNESS JSON input, in the requested units.
fn madqc_json(
    molecule: &Molecule,
    name: &str,
    factor: f64,
    unit_name: &str,
    options: &FormatOptions,
) -> Table {
    let symbols: Vec<Value> = molecule
        .atoms()
        .iter()
        .map(|atom| Value::from(atom.symbol.as_str()))
        .collect();
    let geometry: Vec<Value> = molecule
        .atoms()
        .iter()
        .map(|atom| {
            let xyz: Vec<Value> = atom.position.iter().map(|x| Value::from(x * factor)).collect();
            Value::Array(xyz)
        })
        .collect();

    let mut parameters = Table::new();
    parameters.insert("eprec".into(), options.eprec.unwrap_or(1e-4).into());
    parameters.insert("field".into(), Value::Array(vec![0.0.into(); 3]));
    parameters.insert("no_orient".into(), molecule.fix_orientation().into());
    parameters.insert("psp_calc".into(), false.into());
    parameters.insert("pure_ae".into(), true.into());
    parameters.insert("symtol".into(), (-1e-2).into());
    parameters.insert("core_type".into(), "none".into());
    parameters.insert("units".into(), unit_name.into());

    let mut json = Table::new();
    json.insert("name".into(), name.into());
    json.insert("symbols".into(), Value::Array(symbols));
    json.insert("geometry".into(), Value::Array(geometry));
    json.insert("parameters".into(), Value::Table(parameters));
    json
}

struct AtomLines<'a> {
    molecule: &'a Molecule,
    factor: f64,
    width: usize,
    prec: usize,
}

impl AtomLines<'_> {
    fn line(
        &self,
        atom: &Atom,
        atom_format: &str,
        ghost_format: &str,
        xyze: bool,
    ) -> Option<String> {
        let template = if atom.real { atom_format } else { ghost_format };
        if template.is_empty() {
            return None;
        }
        let width = self.width;
        let prec = self.prec;
        let nucleus = format!("{:<width$}", expand_template(template, atom));
        let coords = atom
            .position
            .iter()
            .map(|x| format!("{:>width$.prec$}", x * self.factor));

        let mut fields: Vec<String> = Vec::with_capacity(4);
        if xyze {
            fields.extend(coords);
            fields.push(nucleus.trim_end().to_string());
        } else {
            fields.push(nucleus);
            fields.extend(coords);
        }
        Some(fields.join("  "))
    }

    fn render(&self, atom_format: &str, ghost_format: &str, xyze: bool) -> Vec<String> {
        self.molecule
            .atoms()
            .iter()
            .filter_map(|atom| self.line(atom, atom_format, ghost_format, xyze))
            .collect()
    }

    /// Atom lines grouped by fragment, with `--` and `charge multiplicity` separators
    /// when there is more than one fragment.
    fn render_fragments(&self, atom_format: &str, ghost_format: &str) -> Vec<String> {
        let partition = self.molecule.fragments();
        let atoms = self.molecule.atoms();
        let mut out = Vec::new();
        for fragment in partition.fragments() {
            if partition.len() > 1 {
                out.push("--".to_string());
                out.push(format!(
                    "{} {}",
                    fragment.charge.trunc() as i64,
                    fragment.multiplicity
                ));
            }
            out.extend(
                fragment
                    .atoms
                    .iter()
                    .filter_map(|&i| self.line(&atoms[i], atom_format, ghost_format, false)),
            );
        }
        out
    }
}

fn expand_template(template: &str, atom: &Atom) -> String {
    template
        .replace("{elem}", &atom.symbol)
        .replace("{elbl}", &atom.label)
        .replace("{elez}", &atom.atomic_number.to_string())
        .replace(
            "{elea}",
            &atom.mass_number.map(|a| a.to_string()).unwrap_or_default(),
        )
        .replace("{mass}", &atom.mass.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::data::elements::PeriodicTable;
    use crate::core::models::builder::{AtomSpec, MoleculeBuilder};

    fn water_bohr() -> Molecule {
        let mut builder = MoleculeBuilder::new();
        builder
            .name("water")
            .atom("O", [0.0, 0.0, 0.25])
            .atom("H", [0.0, 1.5, -1.0])
            .atom("H", [0.0, -1.5, -1.0]);
        builder.build(&PeriodicTable::new()).unwrap()
    }

    #[test]
    fn dtype_parses_case_insensitively() {
        assert_eq!("PSI4".parse::<Dtype>().unwrap(), Dtype::Psi4);
        assert_eq!("xyz+".parse::<Dtype>().unwrap(), Dtype::XyzPlus);
        assert_eq!(
            "madeup".parse::<Dtype>(),
            Err(FormatError::UnknownDtype("madeup".to_string()))
        );
    }

    #[test]
    fn xyz_in_bohr_has_unit_tag_and_fixed_columns() {
        let out = to_string(
            &water_bohr(),
            Dtype::Xyz,
            Some(LengthUnit::Bohr),
            &FormatOptions::default(),
        )
        .unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "3 au");
        assert_eq!(lines[1], "0 1 water");
        assert_eq!(
            lines[2],
            "O                     0.000000000000     0.000000000000     0.250000000000"
        );
        assert_eq!(
            lines[4],
            "H                     0.000000000000    -1.500000000000    -1.000000000000"
        );
        assert!(out.ends_with('\n'));
    }

    #[test]
    fn xyz_defaults_to_angstrom_without_tag() {
        let out =
            to_string(&water_bohr(), Dtype::Xyz, None, &FormatOptions::default()).unwrap();
        assert_eq!(out.lines().next(), Some("3"));
        let b2a = PhysicalConstants::default().bohr2angstroms();
        let expected = format!("{:>17.12}", 1.5 * b2a);
        assert!(out.lines().nth(3).unwrap().contains(&expected));
    }

    #[test]
    fn empty_ghost_format_drops_ghosts() {
        let mut builder = MoleculeBuilder::new();
        builder.atom("He", [0.0, 0.0, 0.0]).ghost("He", [0.0, 0.0, 5.0]);
        let dimer = builder.build(&PeriodicTable::new()).unwrap();

        let options = FormatOptions {
            ghost_format: Some(String::new()),
            ..FormatOptions::default()
        };
        let out = to_string(&dimer, Dtype::Xyz, Some(LengthUnit::Bohr), &options).unwrap();
        assert_eq!(out.lines().count(), 3);
        assert_eq!(out.lines().next(), Some("1 au"));

        let out = to_string(&dimer, Dtype::Xyz, None, &FormatOptions::default()).unwrap();
        assert!(out.lines().nth(3).unwrap().starts_with("@He"));
    }

    #[test]
    fn psi4_writes_fragment_blocks() {
        let mut builder = MoleculeBuilder::new();
        builder
            .push(AtomSpec::new("Ne", [0.0, 0.0, 0.0]).label("1"))
            .ghost("Ar", [0.0, 0.0, 6.0])
            .fragment_separators(&[1])
            .fix_com(true);
        let molecule = builder.build(&PeriodicTable::new()).unwrap();
        let out = to_string(&molecule, Dtype::Psi4, None, &FormatOptions::default()).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "0 1");
        assert_eq!(lines[1], "--");
        assert_eq!(lines[2], "0 1");
        assert!(lines[3].starts_with("Ne1 "));
        assert_eq!(lines[4], "--");
        assert!(lines[6].starts_with("Gh(Ar)"));
        assert_eq!(lines[7], "units bohr");
        assert_eq!(lines[8], "no_com");
        assert_eq!(lines.len(), 9);
    }

    #[test]
    fn psi4_single_fragment_has_no_separators() {
        let out =
            to_string(&water_bohr(), Dtype::Psi4, None, &FormatOptions::default()).unwrap();
        assert!(!out.contains("--"));
        assert_eq!(out.lines().last(), Some("units bohr"));
    }

    #[test]
    fn orca_header_depends_on_units() {
        let out =
            to_string(&water_bohr(), Dtype::Orca, None, &FormatOptions::default()).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "! Bohrs");
        assert_eq!(lines[1], "");
        assert_eq!(lines[2], "*xyz 0 1");
        assert_eq!(lines[6], "*");

        let out = to_string(
            &water_bohr(),
            Dtype::Orca,
            Some(LengthUnit::Angstrom),
            &FormatOptions::default(),
        )
        .unwrap();
        assert!(out.starts_with("!\n"));
    }

    #[test]
    fn molpro_declares_symmetry_ghosts_and_spin() {
        let mut builder = MoleculeBuilder::new();
        builder
            .atom("Li", [0.0, 0.0, 0.0])
            .ghost("H", [0.0, 0.0, 3.0])
            .fix_symmetry("c1");
        let molecule = builder.build(&PeriodicTable::new()).unwrap();
        let out = to_string(&molecule, Dtype::Molpro, None, &FormatOptions::default()).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "{symmetry,nosym}");
        assert_eq!(lines[1], "");
        assert_eq!(lines[2], "{bohr}");
        assert_eq!(lines[3], "geometry={");
        assert_eq!(lines[6], "}");
        assert_eq!(lines[7], "dummy,2");
        assert_eq!(lines[8], "set,charge=0.0");
        assert_eq!(lines[9], "set,spin=1");
    }

    #[test]
    fn turbomole_puts_lowercase_symbol_last_and_requires_bohr() {
        let out =
            to_string(&water_bohr(), Dtype::Turbomole, None, &FormatOptions::default()).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "$coord");
        assert!(lines[1].ends_with("  o"));
        assert_eq!(lines[4], "$end");

        assert_eq!(
            to_string(
                &water_bohr(),
                Dtype::Turbomole,
                Some(LengthUnit::Angstrom),
                &FormatOptions::default()
            ),
            Err(FormatError::UnsupportedUnits {
                dtype: Dtype::Turbomole,
                units: LengthUnit::Angstrom
            })
        );
    }

    #[test]
    fn gamess_writes_nuclear_charges() {
        let out =
            to_string(&water_bohr(), Dtype::Gamess, None, &FormatOptions::default()).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], " $data");
        assert_eq!(lines[1], " auto-generated by qcmol from molecule water");
        assert_eq!(lines[2], " C1");
        assert!(lines[3].starts_with(" O 8 "));
        assert_eq!(lines[6], " $end");
    }

    #[test]
    fn nwchem_keeps_blank_symmetry_line() {
        let out =
            to_string(&water_bohr(), Dtype::Nwchem, None, &FormatOptions::default()).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "geometry units bohr");
        assert_eq!(lines[4], "");
        assert_eq!(lines[5], "end");
    }

    #[test]
    fn terachem_and_mrchem_layouts() {
        let out =
            to_string(&water_bohr(), Dtype::Terachem, None, &FormatOptions::default()).unwrap();
        assert!(out.starts_with("3 au\nwater\n"));

        let out =
            to_string(&water_bohr(), Dtype::Mrchem, None, &FormatOptions::default()).unwrap();
        assert!(out.starts_with(
            "Molecule {\ncharge = 0\nmultiplicity = 1\ntranslate = false\n$coords\n"
        ));
        assert!(out.ends_with("$end\n}\n"));
    }

    #[test]
    fn qchem_and_cfour_layouts() {
        let out =
            to_string(&water_bohr(), Dtype::Qchem, None, &FormatOptions::default()).unwrap();
        assert!(out.starts_with("$molecule\n0 1\n"));
        assert!(out.ends_with("$end\n"));

        let out =
            to_string(&water_bohr(), Dtype::Cfour, None, &FormatOptions::default()).unwrap();
        assert_eq!(
            out.lines().next(),
            Some("auto-generated by qcmol from molecule water")
        );
        assert_eq!(out.lines().count(), 4);
    }

    #[test]
    fn unnamed_molecule_uses_formula() {
        let mut builder = MoleculeBuilder::new();
        builder.atom("N", [0.0, 0.0, 0.0]).atom("N", [0.0, 0.0, 2.1]);
        let molecule = builder.build(&PeriodicTable::new()).unwrap();
        let out = to_string(&molecule, Dtype::Xyz, None, &FormatOptions::default()).unwrap();
        assert_eq!(out.lines().nth(1), Some("0 1 N2"));
    }
    #[test]
    fn madness_layout_declares_units_and_precision() {
        let out =
            to_string(&water_bohr(), Dtype::Madness, None, &FormatOptions::default()).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "geometry");
        assert_eq!(lines[1], "units au");
        assert!(lines[2].starts_with("O "));
        assert_eq!(lines[5], "end");

        let mut builder = MoleculeBuilder::new();
        builder.atom("He", [0.0, 0.0, 0.0]).ghost("He", [0.0, 0.0, 5.0]);
        let dimer = builder.build(&PeriodicTable::new()).unwrap();
        let options = FormatOptions {
            eprec: Some(1e-6),
            ..FormatOptions::default()
        };
        let out = to_string(&dimer, Dtype::Madness, Some(LengthUnit::Angstrom), &options).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[1], "units angstrom");
        assert_eq!(lines[2], "eprec 0.000001");
        assert!(lines[4].starts_with("GH "));

        assert!(matches!(
            to_string(&dimer, Dtype::Madness, Some(LengthUnit::Nanometer), &options),
            Err(FormatError::UnsupportedUnits { dtype: Dtype::Madness, .. })
        ));
    }

    #[test]
    fn mass_number_field_is_empty_for_plain_atoms() {
        let mut builder = MoleculeBuilder::new();
        builder
            .atom("O", [0.0, 0.0, 0.0])
            .isotope("H", 2, [0.0, 1.5, 1.0])
            .atom("D", [0.0, -1.5, 1.0]);
        let molecule = builder.build(&PeriodicTable::new()).unwrap();
        let options = FormatOptions {
            atom_format: Some("{elea}{elem}".to_string()),
            ..FormatOptions::default()
        };
        let out = to_string(&molecule, Dtype::Xyz, None, &options).unwrap();
        let nuclei: Vec<&str> = out
            .lines()
            .skip(2)
            .map(|line| line.split_whitespace().next().unwrap())
            .collect();
        assert_eq!(nuclei, vec!["O", "2H", "2H"]);
    }

    #[test]
    fn keyword_data_for_open_shell_nwchem_and_cfour() {
        let mut builder = MoleculeBuilder::new();
        builder
            .atom("O", [0.0, 0.0, 0.0])
            .atom("O", [0.0, 0.0, 2.28])
            .multiplicity(3);
        let oxygen = builder.build(&PeriodicTable::new()).unwrap();

        let (_, data) =
            to_string_with_data(&oxygen, Dtype::Nwchem, None, &FormatOptions::default()).unwrap();
        assert_eq!(data.keywords["charge"], Value::Integer(0));
        assert_eq!(data.keywords["scf__nopen"], Value::Integer(2));
        assert_eq!(data.keywords["dft__mult"], Value::Integer(3));
        assert_eq!(data.keywords["mcscf__multiplicity"], Value::Integer(3));
        assert!(data.fields.contains(&"molecular_multiplicity"));

        let (_, data) =
            to_string_with_data(&water_bohr(), Dtype::Nwchem, None, &FormatOptions::default())
                .unwrap();
        assert_eq!(data.keywords.len(), 1);

        let (_, data) = to_string_with_data(
            &oxygen,
            Dtype::Cfour,
            Some(LengthUnit::Angstrom),
            &FormatOptions::default(),
        )
        .unwrap();
        assert_eq!(data.keywords["multiplicity"], Value::Integer(3));
        assert_eq!(data.keywords["units"], Value::from("angstrom"));
        assert_eq!(data.keywords["coordinates"], Value::from("cartesian"));
    }

    #[test]
    fn keyword_data_for_gamess_and_qchem() {
        let (_, data) =
            to_string_with_data(&water_bohr(), Dtype::Gamess, None, &FormatOptions::default())
                .unwrap();
        assert_eq!(data.keywords["contrl__icharg"], Value::Integer(0));
        assert_eq!(data.keywords["contrl__mult"], Value::Integer(1));
        assert_eq!(data.keywords["contrl__units"], Value::from("bohr"));
        assert_eq!(data.keywords["contrl__coord"], Value::from("prinaxis"));

        let mut builder = MoleculeBuilder::new();
        builder
            .atom("N", [0.0, 0.0, 0.0])
            .atom("N", [0.0, 0.0, 2.1])
            .fix_com(true)
            .fix_symmetry("c1");
        let nitrogen = builder.build(&PeriodicTable::new()).unwrap();
        let (_, data) = to_string_with_data(
            &nitrogen,
            Dtype::Qchem,
            Some(LengthUnit::Angstrom),
            &FormatOptions::default(),
        )
        .unwrap();
        assert_eq!(data.keywords["no_reorient"], Value::Boolean(true));
        assert_eq!(data.keywords["input_bohr"], Value::Boolean(false));
        assert_eq!(data.keywords["sym_ignore"], Value::Boolean(true));
        assert_eq!(data.keywords["symmetry"], Value::Boolean(false));

        let (_, data) =
            to_string_with_data(&water_bohr(), Dtype::Qchem, None, &FormatOptions::default())
                .unwrap();
        assert_eq!(data.keywords["no_reorient"], Value::Boolean(false));
        assert_eq!(data.keywords["input_bohr"], Value::Boolean(true));
        assert!(!data.keywords.contains_key("sym_ignore"));
    }

    #[test]
    fn keyword_data_for_mrchem_and_madness() {
        let (out, data) =
            to_string_with_data(&water_bohr(), Dtype::Mrchem, None, &FormatOptions::default())
                .unwrap();
        assert_eq!(data.keywords["translate"], Value::Boolean(false));
        let coords = data.keywords["coords"].as_str().unwrap();
        assert_eq!(coords.lines().count(), 3);
        assert!(out.contains(coords));

        let (_, data) =
            to_string_with_data(&water_bohr(), Dtype::Madness, None, &FormatOptions::default())
                .unwrap();
        assert_eq!(data.keywords["charge"], Value::Integer(0));
        assert!(!data.keywords.contains_key("spin_restricted"));
        let json = data.keywords["madqc_json"].as_table().unwrap();
        assert_eq!(json["name"], Value::from("water"));
        assert_eq!(json["symbols"].as_array().unwrap().len(), 3);
        let first = json["geometry"].as_array().unwrap()[0].as_array().unwrap();
        assert_eq!(first[2], Value::Float(0.25));
        let parameters = json["parameters"].as_table().unwrap();
        assert_eq!(parameters["eprec"], Value::Float(1e-4));
        assert_eq!(parameters["units"], Value::from("au"));
    }

    #[test]
    fn layouts_without_program_options_carry_only_fields() {
        for dtype in [Dtype::Xyz, Dtype::Orca, Dtype::Psi4, Dtype::Turbomole] {
            let (_, data) =
                to_string_with_data(&water_bohr(), dtype, None, &FormatOptions::default())
                    .unwrap();
            assert!(data.keywords.is_empty(), "{dtype} should carry no keywords");
            assert_eq!(&data.fields[..3], &["atomic_numbers", "geometry", "symbols"]);
        }
    }
}
