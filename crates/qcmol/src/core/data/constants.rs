use phf::{Map, phf_map};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// CODATA recommended-values release backing a [`PhysicalConstants`] instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CodataRelease {
    #[default]
    Codata2014,
    Codata2018,
}

impl CodataRelease {
    pub const ALL: [CodataRelease; 2] = [CodataRelease::Codata2014, CodataRelease::Codata2018];

    fn column(self) -> usize {
        match self {
            CodataRelease::Codata2014 => 0,
            CodataRelease::Codata2018 => 1,
        }
    }
}

impl fmt::Display for CodataRelease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodataRelease::Codata2014 => write!(f, "CODATA 2014"),
            CodataRelease::Codata2018 => write!(f, "CODATA 2018"),
        }
    }
}

impl FromStr for CodataRelease {
    type Err = ConstantError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let compact: String = s
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '-' && *c != '_')
            .collect::<String>()
            .to_ascii_lowercase();
        match compact.as_str() {
            "codata2014" | "2014" => Ok(CodataRelease::Codata2014),
            "codata2018" | "2018" => Ok(CodataRelease::Codata2018),
            _ => Err(ConstantError::UnknownRelease(s.to_string())),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConstantError {
    #[error("Unknown physical constant: '{0}'")]
    UnknownConstant(String),
    #[error("Unknown CODATA release: '{0}'")]
    UnknownRelease(String),
    #[error("Unknown length unit: '{0}'")]
    UnknownUnit(String),
}

/// A physical constant resolved against a specific CODATA release.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhysicalConstant {
    pub name: &'static str,
    pub label: &'static str,
    pub value: f64,
    pub units: &'static str,
    pub release: CodataRelease,
}

struct ConstantEntry {
    name: &'static str,
    label: &'static str,
    units: &'static str,
    values: [f64; 2],
}

static CONSTANTS: [ConstantEntry; 20] = [
    ConstantEntry {
        name: "speed of light in vacuum",
        label: "c",
        units: "m s^-1",
        values: [299792458.0, 299792458.0],
    },
    ConstantEntry {
        name: "planck constant",
        label: "h",
        units: "J s",
        values: [6.626070040e-34, 6.62607015e-34],
    },
    ConstantEntry {
        name: "boltzmann constant",
        label: "kb",
        units: "J K^-1",
        values: [1.38064852e-23, 1.380649e-23],
    },
    ConstantEntry {
        name: "avogadro constant",
        label: "na",
        units: "mol^-1",
        values: [6.022140857e23, 6.02214076e23],
    },
    ConstantEntry {
        name: "elementary charge",
        label: "e",
        units: "C",
        values: [1.6021766208e-19, 1.602176634e-19],
    },
    ConstantEntry {
        name: "electron mass",
        label: "me",
        units: "kg",
        values: [9.10938356e-31, 9.1093837015e-31],
    },
    ConstantEntry {
        name: "atomic mass constant",
        label: "amu2kg",
        units: "kg",
        values: [1.660539040e-27, 1.66053906660e-27],
    },
    ConstantEntry {
        name: "bohr radius",
        label: "a0",
        units: "m",
        values: [0.52917721067e-10, 0.529177210903e-10],
    },
    ConstantEntry {
        name: "hartree energy",
        label: "hartree2j",
        units: "J",
        values: [4.359744650e-18, 4.3597447222071e-18],
    },
    ConstantEntry {
        name: "electric constant",
        label: "e0",
        units: "F m^-1",
        values: [8.854187817e-12, 8.8541878128e-12],
    },
    ConstantEntry {
        name: "fine-structure constant",
        label: "alpha",
        units: "",
        values: [7.2973525664e-3, 7.2973525693e-3],
    },
    ConstantEntry {
        name: "inverse fine-structure constant",
        label: "c_au",
        units: "",
        values: [137.035999139, 137.035999084],
    },
    ConstantEntry {
        name: "bohr to angstroms",
        label: "bohr2angstroms",
        units: "Angstrom",
        values: [0.52917721067, 0.529177210903],
    },
    ConstantEntry {
        name: "hartree to electron volts",
        label: "hartree2ev",
        units: "eV",
        values: [27.21138602, 27.211386245988],
    },
    ConstantEntry {
        name: "hartree to kcal per mol",
        label: "hartree2kcalmol",
        units: "kcal mol^-1",
        values: [627.509474, 627.5094740631],
    },
    ConstantEntry {
        name: "hartree to kj per mol",
        label: "hartree2kjmol",
        units: "kJ mol^-1",
        values: [2625.499638, 2625.4996394799],
    },
    ConstantEntry {
        name: "hartree to wavenumbers",
        label: "hartree2wavenumbers",
        units: "cm^-1",
        values: [219474.6313702, 219474.6313632],
    },
    ConstantEntry {
        name: "hartree to mhz",
        label: "hartree2mhz",
        units: "MHz",
        values: [6.579683920711e9, 6.579683920502e9],
    },
    ConstantEntry {
        name: "electron to atomic mass unit ratio",
        label: "amu2au",
        units: "",
        values: [1822.888486192, 1822.888486209],
    },
    ConstantEntry {
        name: "calorie to joule",
        label: "cal2j",
        units: "J",
        values: [4.184, 4.184],
    },
];

static CONSTANT_INDEX: Map<&'static str, usize> = phf_map! {
    "speed of light in vacuum" => 0, "c" => 0,
    "planck constant" => 1, "h" => 1,
    "boltzmann constant" => 2, "kb" => 2,
    "avogadro constant" => 3, "na" => 3,
    "elementary charge" => 4, "e" => 4,
    "electron mass" => 5, "me" => 5,
    "atomic mass constant" => 6, "amu2kg" => 6,
    "bohr radius" => 7, "a0" => 7,
    "hartree energy" => 8, "hartree2j" => 8,
    "electric constant" => 9, "e0" => 9,
    "fine-structure constant" => 10, "alpha" => 10,
    "inverse fine-structure constant" => 11, "c_au" => 11,
    "bohr to angstroms" => 12, "bohr2angstroms" => 12,
    "hartree to electron volts" => 13, "hartree2ev" => 13,
    "hartree to kcal per mol" => 14, "hartree2kcalmol" => 14,
    "hartree to kj per mol" => 15, "hartree2kjmol" => 15,
    "hartree to wavenumbers" => 16, "hartree2wavenumbers" => 16,
    "hartree to mhz" => 17, "hartree2mhz" => 17,
    "electron to atomic mass unit ratio" => 18, "amu2au" => 18,
    "calorie to joule" => 19, "cal2j" => 19,
};

fn normalize_name(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_ascii_lowercase()
}

/// Length units accepted by molecule builders, readers and writers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LengthUnit {
    #[default]
    Bohr,
    Angstrom,
    Nanometer,
    Picometer,
    Meter,
}

impl LengthUnit {
    pub fn name(self) -> &'static str {
        match self {
            LengthUnit::Bohr => "Bohr",
            LengthUnit::Angstrom => "Angstrom",
            LengthUnit::Nanometer => "nm",
            LengthUnit::Picometer => "pm",
            LengthUnit::Meter => "m",
        }
    }
}

impl fmt::Display for LengthUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for LengthUnit {
    type Err = ConstantError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bohr" | "au" | "a.u." => Ok(LengthUnit::Bohr),
            "angstrom" | "angstroms" | "ang" | "a" => Ok(LengthUnit::Angstrom),
            "nm" | "nanometer" | "nanometers" => Ok(LengthUnit::Nanometer),
            "pm" | "picometer" | "picometers" => Ok(LengthUnit::Picometer),
            "m" | "meter" | "meters" => Ok(LengthUnit::Meter),
            _ => Err(ConstantError::UnknownUnit(s.to_string())),
        }
    }
}

/// Physical constants of one CODATA release.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PhysicalConstants {
    release: CodataRelease,
}

impl PhysicalConstants {
    pub fn new(release: CodataRelease) -> Self {
        Self { release }
    }

    pub fn release(&self) -> CodataRelease {
        self.release
    }

    /// Looks up a constant by full name or short label, ignoring case and repeated whitespace.
    pub fn lookup(&self, name: &str) -> Option<PhysicalConstant> {
        let index = *CONSTANT_INDEX.get(normalize_name(name).as_str())?;
        Some(self.resolve_entry(&CONSTANTS[index]))
    }

    pub fn get(&self, name: &str) -> Result<f64, ConstantError> {
        self.lookup(name)
            .map(|c| c.value)
            .ok_or_else(|| ConstantError::UnknownConstant(name.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = PhysicalConstant> + '_ {
        CONSTANTS.iter().map(|entry| self.resolve_entry(entry))
    }

    pub fn bohr2angstroms(&self) -> f64 {
        CONSTANTS[12].values[self.release.column()]
    }

    /// Multiplicative factor converting a length in `from` units into `to` units.
    pub fn conversion_factor(&self, from: LengthUnit, to: LengthUnit) -> f64 {
        if from == to {
            return 1.0;
        }
        match (from, to) {
            (LengthUnit::Bohr, LengthUnit::Angstrom) => self.bohr2angstroms(),
            (LengthUnit::Angstrom, LengthUnit::Bohr) => 1.0 / self.bohr2angstroms(),
            _ => self.meters_per(from) / self.meters_per(to),
        }
    }

    fn meters_per(&self, unit: LengthUnit) -> f64 {
        match unit {
            LengthUnit::Bohr => CONSTANTS[7].values[self.release.column()],
            LengthUnit::Angstrom => 1e-10,
            LengthUnit::Nanometer => 1e-9,
            LengthUnit::Picometer => 1e-12,
            LengthUnit::Meter => 1.0,
        }
    }

    fn resolve_entry(&self, entry: &ConstantEntry) -> PhysicalConstant {
        PhysicalConstant {
            name: entry.name,
            label: entry.label,
            value: entry.values[self.release.column()],
            units: entry.units,
            release: self.release,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_constant_is_reachable_by_name_and_label() {
        let constants = PhysicalConstants::default();
        for constant in constants.iter() {
            assert_eq!(constants.lookup(constant.name), Some(constant));
            assert_eq!(constants.lookup(constant.label), Some(constant));
        }
        assert_eq!(constants.iter().count(), CONSTANTS.len());
    }

    #[test]
    fn lookup_ignores_case_and_whitespace() {
        let constants = PhysicalConstants::default();
        let c = constants.lookup("  Speed of   LIGHT in vacuum ").unwrap();
        assert_eq!(c.value, 299792458.0);
        assert_eq!(c.units, "m s^-1");
        assert_eq!(constants.lookup("Hartree2kcalmol").unwrap().label, "hartree2kcalmol");
    }

    #[test]
    fn releases_carry_distinct_values() {
        let old = PhysicalConstants::new(CodataRelease::Codata2014);
        let new = PhysicalConstants::new(CodataRelease::Codata2018);
        assert_eq!(old.get("bohr2angstroms").unwrap(), 0.52917721067);
        assert_eq!(new.get("bohr2angstroms").unwrap(), 0.529177210903);
        assert_eq!(new.get("h").unwrap(), 6.62607015e-34);
        assert_eq!(old.lookup("c").unwrap().release, CodataRelease::Codata2014);
    }

    #[test]
    fn unknown_constant_is_an_error() {
        let constants = PhysicalConstants::default();
        assert_eq!(
            constants.get("flux capacitance"),
            Err(ConstantError::UnknownConstant("flux capacitance".to_string()))
        );
    }

    #[test]
    fn release_parses_from_common_spellings() {
        assert_eq!("CODATA 2018".parse(), Ok(CodataRelease::Codata2018));
        assert_eq!("codata2014".parse(), Ok(CodataRelease::Codata2014));
        assert_eq!("2018".parse(), Ok(CodataRelease::Codata2018));
        assert!("codata1998".parse::<CodataRelease>().is_err());
        assert_eq!(CodataRelease::Codata2018.to_string(), "CODATA 2018");
    }

    #[test]
    fn length_conversions_are_consistent() {
        let constants = PhysicalConstants::default();
        let b2a = constants.conversion_factor(LengthUnit::Bohr, LengthUnit::Angstrom);
        let a2b = constants.conversion_factor(LengthUnit::Angstrom, LengthUnit::Bohr);
        assert_eq!(b2a, 0.52917721067);
        assert!((b2a * a2b - 1.0).abs() < 1e-15);
        let nm = constants.conversion_factor(LengthUnit::Angstrom, LengthUnit::Nanometer);
        assert!((nm - 0.1).abs() < 1e-15);
        let pm_to_bohr = constants.conversion_factor(LengthUnit::Picometer, LengthUnit::Bohr);
        assert!((pm_to_bohr * 52.917721067 - 1.0).abs() < 1e-12);
        assert_eq!(constants.conversion_factor(LengthUnit::Meter, LengthUnit::Meter), 1.0);
    }

    #[test]
    fn length_unit_parses_aliases() {
        assert_eq!("au".parse(), Ok(LengthUnit::Bohr));
        assert_eq!("Angstrom".parse(), Ok(LengthUnit::Angstrom));
        assert_eq!("ANG".parse(), Ok(LengthUnit::Angstrom));
        assert!("furlong".parse::<LengthUnit>().is_err());
    }
}
