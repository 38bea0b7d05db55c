use super::atom::Atom;
use super::fragment::FragmentPartition;
use super::molecule::{COINCIDENT_ATOM_THRESHOLD, Molecule, MoleculeError};
use crate::core::data::constants::{CodataRelease, LengthUnit, PhysicalConstants};
use crate::core::data::elements::{ElementTable, ElementTableError, isotope_alias};
use nalgebra::Point3;

/// Input description of one atom, resolved against an element table at build time.
#[derive(Debug, Clone, PartialEq)]
pub struct AtomSpec {
    symbol: String,
    label: String,
    position: [f64; 3],
    mass: Option<f64>,
    mass_number: Option<u32>,
    charge: f64,
    real: bool,
}

impl AtomSpec {
    pub fn new(symbol: &str, position: [f64; 3]) -> Self {
        Self {
            symbol: symbol.to_string(),
            label: String::new(),
            position,
            mass: None,
            mass_number: None,
            charge: 0.0,
            real: true,
        }
    }

    pub fn label(mut self, label: &str) -> Self {
        self.label = label.to_string();
        self
    }

    /// Explicit mass in amu; takes precedence over any mass number.
    pub fn mass(mut self, mass: f64) -> Self {
        self.mass = Some(mass);
        self
    }

    pub fn mass_number(mut self, mass_number: u32) -> Self {
        self.mass_number = Some(mass_number);
        self
    }

    pub fn charge(mut self, charge: f64) -> Self {
        self.charge = charge;
        self
    }

    pub fn ghost(mut self) -> Self {
        self.real = false;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
enum FragmentLayout {
    Single,
    Separators(Vec<usize>),
    Explicit(Vec<Vec<usize>>),
}

/// Incremental, validating constructor for [`Molecule`].
///
/// Coordinates are given in the builder's input units (Bohr unless changed with
/// [`units`](Self::units)) and converted to Bohr on [`build`](Self::build). Element
/// symbols, default masses and isotope masses come from the table passed to `build`.
///
/// When fragment charges are not given, a single fragment carries the molecular
/// charge and multi-fragment molecules place it on the first fragment. Missing
/// multiplicities default to the lowest spin consistent with the electron count.
#[derive(Debug, Clone)]
pub struct MoleculeBuilder {
    name: Option<String>,
    units: LengthUnit,
    constants: PhysicalConstants,
    atoms: Vec<AtomSpec>,
    molecular_charge: Option<f64>,
    molecular_multiplicity: Option<u32>,
    fragments: FragmentLayout,
    fragment_charges: Option<Vec<f64>>,
    fragment_multiplicities: Option<Vec<u32>>,
    allow_coincident: bool,
    fix_com: bool,
    fix_orientation: bool,
    fix_symmetry: Option<String>,
}

impl Default for MoleculeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl MoleculeBuilder {
    pub fn new() -> Self {
        Self {
            name: None,
            units: LengthUnit::Bohr,
            constants: PhysicalConstants::default(),
            atoms: Vec::new(),
            molecular_charge: None,
            molecular_multiplicity: None,
            fragments: FragmentLayout::Single,
            fragment_charges: None,
            fragment_multiplicities: None,
            allow_coincident: false,
            fix_com: false,
            fix_orientation: false,
            fix_symmetry: None,
        }
    }

    pub fn name(&mut self, name: &str) -> &mut Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn units(&mut self, units: LengthUnit) -> &mut Self {
        self.units = units;
        self
    }

    /// CODATA release used for unit conversion.
    pub fn release(&mut self, release: CodataRelease) -> &mut Self {
        self.constants = PhysicalConstants::new(release);
        self
    }

    pub fn charge(&mut self, charge: f64) -> &mut Self {
        self.molecular_charge = Some(charge);
        self
    }

    pub fn multiplicity(&mut self, multiplicity: u32) -> &mut Self {
        self.molecular_multiplicity = Some(multiplicity);
        self
    }

    pub fn push(&mut self, spec: AtomSpec) -> &mut Self {
        self.atoms.push(spec);
        self
    }

    pub fn atom(&mut self, symbol: &str, position: [f64; 3]) -> &mut Self {
        self.push(AtomSpec::new(symbol, position))
    }

    pub fn isotope(&mut self, symbol: &str, mass_number: u32, position: [f64; 3]) -> &mut Self {
        self.push(AtomSpec::new(symbol, position).mass_number(mass_number))
    }

    pub fn ghost(&mut self, symbol: &str, position: [f64; 3]) -> &mut Self {
        self.push(AtomSpec::new(symbol, position).ghost())
    }

    pub fn fragment_separators(&mut self, separators: &[usize]) -> &mut Self {
        self.fragments = FragmentLayout::Separators(separators.to_vec());
        self
    }

    pub fn fragments(&mut self, fragments: Vec<Vec<usize>>) -> &mut Self {
        self.fragments = FragmentLayout::Explicit(fragments);
        self
    }

    pub fn fragment_charges(&mut self, charges: &[f64]) -> &mut Self {
        self.fragment_charges = Some(charges.to_vec());
        self
    }

    pub fn fragment_multiplicities(&mut self, multiplicities: &[u32]) -> &mut Self {
        self.fragment_multiplicities = Some(multiplicities.to_vec());
        self
    }

    pub fn allow_coincident(&mut self, allow: bool) -> &mut Self {
        self.allow_coincident = allow;
        self
    }

    pub fn fix_com(&mut self, fix: bool) -> &mut Self {
        self.fix_com = fix;
        self
    }

    pub fn fix_orientation(&mut self, fix: bool) -> &mut Self {
        self.fix_orientation = fix;
        self
    }

    pub fn fix_symmetry(&mut self, point_group: &str) -> &mut Self {
        self.fix_symmetry = Some(point_group.to_string());
        self
    }

    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    /// Resolves, converts and validates the accumulated input.
    ///
    /// # Errors
    ///
    /// Returns [`MoleculeError`] when there are no atoms, a symbol or isotope is not in
    /// `table`, a mass or coordinate is invalid, two atoms coincide, or the fragment
    /// description is inconsistent with the atoms or the molecular charge.
    pub fn build<T: ElementTable + ?Sized>(&self, table: &T) -> Result<Molecule, MoleculeError> {
        if self.atoms.is_empty() {
            return Err(MoleculeError::Empty);
        }

        let to_bohr = self.constants.conversion_factor(self.units, LengthUnit::Bohr);
        let atoms = self
            .atoms
            .iter()
            .enumerate()
            .map(|(index, spec)| resolve_atom(index, spec, table, to_bohr))
            .collect::<Result<Vec<_>, _>>()?;

        if !self.allow_coincident {
            check_coincident(&atoms)?;
        }

        let partition = match &self.fragments {
            FragmentLayout::Single => FragmentPartition::single(atoms.len()),
            FragmentLayout::Separators(separators) => {
                FragmentPartition::from_separators(atoms.len(), separators)?
            }
            FragmentLayout::Explicit(groups) => {
                FragmentPartition::from_indices(atoms.len(), groups.clone())?
            }
        };

        let fragment_charges = match &self.fragment_charges {
            Some(charges) => charges.clone(),
            None => {
                let mut charges = vec![0.0; partition.len()];
                charges[0] = self.molecular_charge.unwrap_or(0.0);
                charges
            }
        };
        let molecular_charge = match self.molecular_charge {
            Some(charge) => {
                let fragment_total: f64 = fragment_charges.iter().sum();
                if (fragment_total - charge).abs() > 1e-8 {
                    return Err(MoleculeError::ChargeMismatch {
                        fragment_total,
                        molecular: charge,
                    });
                }
                charge
            }
            None => fragment_charges.iter().sum(),
        };

        let fragment_multiplicities = match &self.fragment_multiplicities {
            Some(multiplicities) => multiplicities.clone(),
            None => partition
                .fragments()
                .iter()
                .zip(&fragment_charges)
                .map(|(fragment, &charge)| {
                    let members = fragment.atoms.iter().map(|&i| &atoms[i]);
                    let electrons = electron_count(members, charge);
                    lowest_multiplicity(electrons)
                })
                .collect(),
        };
        if let Some(&bad) = fragment_multiplicities.iter().find(|&&m| m == 0) {
            return Err(MoleculeError::InvalidMultiplicity(bad));
        }

        let molecular_multiplicity = match self.molecular_multiplicity {
            Some(0) => return Err(MoleculeError::InvalidMultiplicity(0)),
            Some(multiplicity) => multiplicity,
            None if self.fragment_multiplicities.is_some() => {
                fragment_multiplicities.iter().map(|m| m - 1).sum::<u32>() + 1
            }
            None => lowest_multiplicity(electron_count(atoms.iter(), molecular_charge)),
        };

        let fragments = partition.with_charges(&fragment_charges, &fragment_multiplicities)?;

        Ok(Molecule {
            name: self.name.clone(),
            atoms,
            molecular_charge,
            molecular_multiplicity,
            fragments,
            fix_com: self.fix_com,
            fix_orientation: self.fix_orientation,
            fix_symmetry: self.fix_symmetry.clone(),
        })
    }
}

fn resolve_atom<T: ElementTable + ?Sized>(
    index: usize,
    spec: &AtomSpec,
    table: &T,
    to_bohr: f64,
) -> Result<Atom, MoleculeError> {
    let (symbol, alias_mass_number) = isotope_alias(&spec.symbol);
    let record = table.resolve(symbol)?;

    let mass_number = spec.mass_number.or(alias_mass_number);
    let mass = match (spec.mass, mass_number) {
        (Some(mass), _) => mass,
        (None, Some(mass_number)) => table.isotope_mass(symbol, mass_number).ok_or_else(|| {
            ElementTableError::UnknownIsotope {
                symbol: record.symbol.to_string(),
                mass_number,
            }
        })?,
        (None, None) => record.mass,
    };
    if !(mass.is_finite() && mass > 0.0) {
        return Err(MoleculeError::NonPositiveMass {
            index,
            symbol: record.symbol.to_string(),
            mass,
        });
    }

    let [x, y, z] = spec.position;
    if !(x.is_finite() && y.is_finite() && z.is_finite()) {
        return Err(MoleculeError::NonFiniteCoordinate { index });
    }

    Ok(Atom {
        symbol: record.symbol.to_string(),
        atomic_number: record.atomic_number,
        label: spec.label.clone(),
        mass,
        mass_number,
        charge: spec.charge,
        position: Point3::new(x, y, z) * to_bohr,
        real: spec.real,
    })
}

fn check_coincident(atoms: &[Atom]) -> Result<(), MoleculeError> {
    for (i, a) in atoms.iter().enumerate() {
        for (j, b) in atoms.iter().enumerate().skip(i + 1) {
            let distance = a.distance_to(b);
            if distance < COINCIDENT_ATOM_THRESHOLD {
                return Err(MoleculeError::CoincidentAtoms {
                    first: i,
                    second: j,
                    distance,
                });
            }
        }
    }
    Ok(())
}

fn electron_count<'a>(atoms: impl Iterator<Item = &'a Atom>, charge: f64) -> i64 {
    let nuclear: i64 = atoms.filter(|a| a.real).map(|a| a.atomic_number as i64).sum();
    nuclear - charge.round() as i64
}

fn lowest_multiplicity(electrons: i64) -> u32 {
    if electrons.rem_euclid(2) == 0 { 1 } else { 2 }
}
