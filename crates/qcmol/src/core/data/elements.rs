use phf::{Map, phf_map};
use serde::Deserialize;
use std::borrow::Cow;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

/// Release label of the built-in [`PeriodicTable`] data.
pub const PERIODIC_TABLE_RELEASE: &str = "NIST-2011 isotopic masses / Alvarez-2008 covalent radii";

/// A single element entry of an element table.
///
/// Masses are isotopic masses of the most abundant isotope in atomic mass units.
/// Covalent radii are in Angstrom and are absent for elements without a tabulated value.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ElementRecord {
    pub atomic_number: u32,
    pub symbol: Cow<'static, str>,
    pub name: Cow<'static, str>,
    pub mass: f64,
    #[serde(default)]
    pub covalent_radius: Option<f64>,
}

#[derive(Debug, Error)]
pub enum ElementTableError {
    #[error("Element symbol '{0}' is not present in the element table")]
    UnresolvableElement(String),
    #[error("No isotope with mass number {mass_number} is tabulated for '{symbol}'")]
    UnknownIsotope { symbol: String, mass_number: u32 },
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("CSV parsing error for '{path}': {source}")]
    Csv { path: String, source: csv::Error },
    #[error("Invalid element record for '{symbol}': {reason}")]
    InvalidRecord { symbol: String, reason: String },
}

/// Read-only source of element data.
///
/// Alignment and molecule construction take the table as an injected dependency, so
/// synthetic tables can stand in for the built-in dataset.
pub trait ElementTable: Send + Sync {
    /// Human-readable label of the data release backing this table.
    fn release(&self) -> &str;

    /// Looks up an element by symbol. Lookups are case-insensitive.
    fn lookup(&self, symbol: &str) -> Option<&ElementRecord>;

    /// Mass of a specific isotope, if the table carries isotope data.
    fn isotope_mass(&self, _symbol: &str, _mass_number: u32) -> Option<f64> {
        None
    }

    fn resolve(&self, symbol: &str) -> Result<&ElementRecord, ElementTableError> {
        self.lookup(symbol)
            .ok_or_else(|| ElementTableError::UnresolvableElement(symbol.to_string()))
    }
}

/// Canonicalizes an element symbol: first letter uppercase, remainder lowercase.
pub fn normalize_symbol(symbol: &str) -> Option<String> {
    let trimmed = symbol.trim();
    let mut chars = trimmed.chars();
    let first = chars.next()?;
    if !first.is_ascii_alphabetic() || !chars.clone().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    let mut normalized = String::with_capacity(trimmed.len());
    normalized.push(first.to_ascii_uppercase());
    normalized.extend(chars.map(|c| c.to_ascii_lowercase()));
    Some(normalized)
}

/// Splits hydrogen isotope shorthands into element symbol and mass number.
///
/// `D` is deuterium and `T` is tritium; every other symbol is returned unchanged.
pub fn isotope_alias(symbol: &str) -> (&str, Option<u32>) {
    match symbol.trim() {
        "D" | "d" => ("H", Some(2)),
        "T" | "t" => ("H", Some(3)),
        other => (other, None),
    }
}

macro_rules! element {
    ($z:expr, $symbol:expr, $name:expr, $mass:expr, $radius:expr) => {
        ElementRecord {
            atomic_number: $z,
            symbol: Cow::Borrowed($symbol),
            name: Cow::Borrowed($name),
            mass: $mass,
            covalent_radius: $radius,
        }
    };
}

static ELEMENTS: [ElementRecord; 118] = [
    element!(1, "H", "Hydrogen", 1.00782503223, Some(0.31)),
    element!(2, "He", "Helium", 4.00260325413, Some(0.28)),
    element!(3, "Li", "Lithium", 7.0160034366, Some(1.28)),
    element!(4, "Be", "Beryllium", 9.012183065, Some(0.96)),
    element!(5, "B", "Boron", 11.00930536, Some(0.84)),
    element!(6, "C", "Carbon", 12.0, Some(0.76)),
    element!(7, "N", "Nitrogen", 14.00307400443, Some(0.71)),
    element!(8, "O", "Oxygen", 15.99491461957, Some(0.66)),
    element!(9, "F", "Fluorine", 18.99840316273, Some(0.57)),
    element!(10, "Ne", "Neon", 19.9924401762, Some(0.58)),
    element!(11, "Na", "Sodium", 22.989769282, Some(1.66)),
    element!(12, "Mg", "Magnesium", 23.985041697, Some(1.41)),
    element!(13, "Al", "Aluminium", 26.98153853, Some(1.21)),
    element!(14, "Si", "Silicon", 27.97692653465, Some(1.11)),
    element!(15, "P", "Phosphorus", 30.97376199842, Some(1.07)),
    element!(16, "S", "Sulfur", 31.9720711744, Some(1.05)),
    element!(17, "Cl", "Chlorine", 34.968852682, Some(1.02)),
    element!(18, "Ar", "Argon", 39.9623831237, Some(1.06)),
    element!(19, "K", "Potassium", 38.9637064864, Some(2.03)),
    element!(20, "Ca", "Calcium", 39.962590863, Some(1.76)),
    element!(21, "Sc", "Scandium", 44.95590828, Some(1.70)),
    element!(22, "Ti", "Titanium", 47.94794198, Some(1.60)),
    element!(23, "V", "Vanadium", 50.94395704, Some(1.53)),
    element!(24, "Cr", "Chromium", 51.94050623, Some(1.39)),
    element!(25, "Mn", "Manganese", 54.93804391, Some(1.39)),
    element!(26, "Fe", "Iron", 55.93493633, Some(1.32)),
    element!(27, "Co", "Cobalt", 58.93319429, Some(1.26)),
    element!(28, "Ni", "Nickel", 57.93534241, Some(1.24)),
    element!(29, "Cu", "Copper", 62.92959772, Some(1.32)),
    element!(30, "Zn", "Zinc", 63.92914201, Some(1.22)),
    element!(31, "Ga", "Gallium", 68.9255735, Some(1.22)),
    element!(32, "Ge", "Germanium", 73.921177761, Some(1.20)),
    element!(33, "As", "Arsenic", 74.92159457, Some(1.19)),
    element!(34, "Se", "Selenium", 79.9165218, Some(1.20)),
    element!(35, "Br", "Bromine", 78.9183376, Some(1.20)),
    element!(36, "Kr", "Krypton", 83.9114977282, Some(1.16)),
    element!(37, "Rb", "Rubidium", 84.9117897379, Some(2.20)),
    element!(38, "Sr", "Strontium", 87.9056125, Some(1.95)),
    element!(39, "Y", "Yttrium", 88.9058403, Some(1.90)),
    element!(40, "Zr", "Zirconium", 89.9046977, Some(1.75)),
    element!(41, "Nb", "Niobium", 92.906373, Some(1.64)),
    element!(42, "Mo", "Molybdenum", 97.90540482, Some(1.54)),
    element!(43, "Tc", "Technetium", 97.9072124, Some(1.47)),
    element!(44, "Ru", "Ruthenium", 101.9043441, Some(1.46)),
    element!(45, "Rh", "Rhodium", 102.905498, Some(1.42)),
    element!(46, "Pd", "Palladium", 105.9034804, Some(1.39)),
    element!(47, "Ag", "Silver", 106.9050916, Some(1.45)),
    element!(48, "Cd", "Cadmium", 113.90336509, Some(1.44)),
    element!(49, "In", "Indium", 114.903878776, Some(1.42)),
    element!(50, "Sn", "Tin", 119.90220163, Some(1.39)),
    element!(51, "Sb", "Antimony", 120.903812, Some(1.39)),
    element!(52, "Te", "Tellurium", 129.906222748, Some(1.38)),
    element!(53, "I", "Iodine", 126.9044719, Some(1.39)),
    element!(54, "Xe", "Xenon", 131.9041550856, Some(1.40)),
    element!(55, "Cs", "Caesium", 132.905451961, Some(2.44)),
    element!(56, "Ba", "Barium", 137.905247, Some(2.15)),
    element!(57, "La", "Lanthanum", 138.9063563, Some(2.07)),
    element!(58, "Ce", "Cerium", 139.9054431, Some(2.04)),
    element!(59, "Pr", "Praseodymium", 140.9076576, Some(2.03)),
    element!(60, "Nd", "Neodymium", 141.907729, Some(2.01)),
    element!(61, "Pm", "Promethium", 144.9127559, Some(1.99)),
    element!(62, "Sm", "Samarium", 151.9197397, Some(1.98)),
    element!(63, "Eu", "Europium", 152.921238, Some(1.98)),
    element!(64, "Gd", "Gadolinium", 157.9241123, Some(1.96)),
    element!(65, "Tb", "Terbium", 158.9253547, Some(1.94)),
    element!(66, "Dy", "Dysprosium", 163.9291819, Some(1.92)),
    element!(67, "Ho", "Holmium", 164.9303288, Some(1.92)),
    element!(68, "Er", "Erbium", 165.9302995, Some(1.89)),
    element!(69, "Tm", "Thulium", 168.9342179, Some(1.90)),
    element!(70, "Yb", "Ytterbium", 173.9388664, Some(1.87)),
    element!(71, "Lu", "Lutetium", 174.9407752, Some(1.87)),
    element!(72, "Hf", "Hafnium", 179.946557, Some(1.75)),
    element!(73, "Ta", "Tantalum", 180.9479958, Some(1.70)),
    element!(74, "W", "Tungsten", 183.95093092, Some(1.62)),
    element!(75, "Re", "Rhenium", 186.9557501, Some(1.51)),
    element!(76, "Os", "Osmium", 191.961477, Some(1.44)),
    element!(77, "Ir", "Iridium", 192.9629216, Some(1.41)),
    element!(78, "Pt", "Platinum", 194.9647917, Some(1.36)),
    element!(79, "Au", "Gold", 196.96656879, Some(1.36)),
    element!(80, "Hg", "Mercury", 201.9706434, Some(1.32)),
    element!(81, "Tl", "Thallium", 204.9744278, Some(1.45)),
    element!(82, "Pb", "Lead", 207.9766525, Some(1.46)),
    element!(83, "Bi", "Bismuth", 208.9803991, Some(1.48)),
    element!(84, "Po", "Polonium", 208.9824308, Some(1.40)),
    element!(85, "At", "Astatine", 209.9871479, Some(1.50)),
    element!(86, "Rn", "Radon", 222.0175782, Some(1.50)),
    element!(87, "Fr", "Francium", 223.019736, Some(2.60)),
    element!(88, "Ra", "Radium", 226.0254103, Some(2.21)),
    element!(89, "Ac", "Actinium", 227.0277523, Some(2.15)),
    element!(90, "Th", "Thorium", 232.0380558, Some(2.06)),
    element!(91, "Pa", "Protactinium", 231.0358842, Some(2.00)),
    element!(92, "U", "Uranium", 238.0507884, Some(1.96)),
    element!(93, "Np", "Neptunium", 237.0481736, Some(1.90)),
    element!(94, "Pu", "Plutonium", 244.0642053, Some(1.87)),
    element!(95, "Am", "Americium", 243.0613813, Some(1.80)),
    element!(96, "Cm", "Curium", 247.0703541, Some(1.69)),
    element!(97, "Bk", "Berkelium", 247.0703073, None),
    element!(98, "Cf", "Californium", 251.0795886, None),
    element!(99, "Es", "Einsteinium", 252.08298, None),
    element!(100, "Fm", "Fermium", 257.0951061, None),
    element!(101, "Md", "Mendelevium", 258.0984315, None),
    element!(102, "No", "Nobelium", 259.10103, None),
    element!(103, "Lr", "Lawrencium", 262.10961, None),
    element!(104, "Rf", "Rutherfordium", 267.12179, None),
    element!(105, "Db", "Dubnium", 268.12567, None),
    element!(106, "Sg", "Seaborgium", 271.13393, None),
    element!(107, "Bh", "Bohrium", 272.13826, None),
    element!(108, "Hs", "Hassium", 270.13429, None),
    element!(109, "Mt", "Meitnerium", 276.15159, None),
    element!(110, "Ds", "Darmstadtium", 281.16451, None),
    element!(111, "Rg", "Roentgenium", 280.16514, None),
    element!(112, "Cn", "Copernicium", 285.17712, None),
    element!(113, "Nh", "Nihonium", 284.17873, None),
    element!(114, "Fl", "Flerovium", 289.19042, None),
    element!(115, "Mc", "Moscovium", 288.19274, None),
    element!(116, "Lv", "Livermorium", 293.20449, None),
    element!(117, "Ts", "Tennessine", 292.20746, None),
    element!(118, "Og", "Oganesson", 294.21392, None),
];

static SYMBOL_INDEX: Map<&'static str, usize> = phf_map! {
    "H" => 0, "He" => 1, "Li" => 2, "Be" => 3, "B" => 4, "C" => 5, "N" => 6, "O" => 7, "F" => 8,
    "Ne" => 9, "Na" => 10, "Mg" => 11, "Al" => 12, "Si" => 13, "P" => 14, "S" => 15, "Cl" => 16,
    "Ar" => 17, "K" => 18, "Ca" => 19, "Sc" => 20, "Ti" => 21, "V" => 22, "Cr" => 23,
    "Mn" => 24, "Fe" => 25, "Co" => 26, "Ni" => 27, "Cu" => 28, "Zn" => 29, "Ga" => 30,
    "Ge" => 31, "As" => 32, "Se" => 33, "Br" => 34, "Kr" => 35, "Rb" => 36, "Sr" => 37,
    "Y" => 38, "Zr" => 39, "Nb" => 40, "Mo" => 41, "Tc" => 42, "Ru" => 43, "Rh" => 44,
    "Pd" => 45, "Ag" => 46, "Cd" => 47, "In" => 48, "Sn" => 49, "Sb" => 50, "Te" => 51,
    "I" => 52, "Xe" => 53, "Cs" => 54, "Ba" => 55, "La" => 56, "Ce" => 57, "Pr" => 58,
    "Nd" => 59, "Pm" => 60, "Sm" => 61, "Eu" => 62, "Gd" => 63, "Tb" => 64, "Dy" => 65,
    "Ho" => 66, "Er" => 67, "Tm" => 68, "Yb" => 69, "Lu" => 70, "Hf" => 71, "Ta" => 72,
    "W" => 73, "Re" => 74, "Os" => 75, "Ir" => 76, "Pt" => 77, "Au" => 78, "Hg" => 79,
    "Tl" => 80, "Pb" => 81, "Bi" => 82, "Po" => 83, "At" => 84, "Rn" => 85, "Fr" => 86,
    "Ra" => 87, "Ac" => 88, "Th" => 89, "Pa" => 90, "U" => 91, "Np" => 92, "Pu" => 93,
    "Am" => 94, "Cm" => 95, "Bk" => 96, "Cf" => 97, "Es" => 98, "Fm" => 99, "Md" => 100,
    "No" => 101, "Lr" => 102, "Rf" => 103, "Db" => 104, "Sg" => 105, "Bh" => 106, "Hs" => 107,
    "Mt" => 108, "Ds" => 109, "Rg" => 110, "Cn" => 111, "Nh" => 112, "Fl" => 113, "Mc" => 114,
    "Lv" => 115, "Ts" => 116, "Og" => 117,
};

static ISOTOPE_MASSES: Map<&'static str, f64> = phf_map! {
    "H1" => 1.00782503223, "H2" => 2.01410177812, "H3" => 3.0160492779,
    "He3" => 3.0160293201, "He4" => 4.00260325413,
    "Li6" => 6.0151228874, "Li7" => 7.0160034366,
    "B10" => 10.01293695, "B11" => 11.00930536,
    "C12" => 12.0, "C13" => 13.00335483507, "C14" => 14.0032419884,
    "N14" => 14.00307400443, "N15" => 15.00010889888,
    "O16" => 15.99491461957, "O17" => 16.9991317565, "O18" => 17.99915961286,
    "F19" => 18.99840316273,
    "P31" => 30.97376199842,
    "S32" => 31.9720711744, "S33" => 32.9714589098, "S34" => 33.967867004,
    "Cl35" => 34.968852682, "Cl37" => 36.965902602,
    "Br79" => 78.9183376, "Br81" => 80.9162897,
};

/// The built-in periodic table covering elements 1 through 118.
///
/// This is a zero-sized handle over static data; copies are free and share nothing mutable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PeriodicTable;

impl PeriodicTable {
    pub fn new() -> Self {
        Self
    }

    pub fn by_atomic_number(&self, atomic_number: u32) -> Option<&'static ElementRecord> {
        let index = usize::try_from(atomic_number).ok()?.checked_sub(1)?;
        ELEMENTS.get(index)
    }

    pub fn elements(&self) -> impl Iterator<Item = &'static ElementRecord> {
        ELEMENTS.iter()
    }
}

impl ElementTable for PeriodicTable {
    fn release(&self) -> &str {
        PERIODIC_TABLE_RELEASE
    }

    fn lookup(&self, symbol: &str) -> Option<&ElementRecord> {
        let normalized = normalize_symbol(symbol)?;
        SYMBOL_INDEX
            .get(normalized.as_str())
            .map(|&index| &ELEMENTS[index])
    }

    fn isotope_mass(&self, symbol: &str, mass_number: u32) -> Option<f64> {
        let record = self.lookup(symbol)?;
        ISOTOPE_MASSES
            .get(format!("{}{}", record.symbol, mass_number).as_str())
            .copied()
    }
}

/// An element table held in memory, typically loaded from CSV.
///
/// The CSV layout uses the headers `symbol,name,atomic_number,mass,covalent_radius`;
/// an empty `covalent_radius` field means no radius is tabulated.
#[derive(Debug, Clone, Default)]
pub struct CustomElementTable {
    release: String,
    records: HashMap<String, ElementRecord>,
    isotopes: HashMap<(String, u32), f64>,
}

impl CustomElementTable {
    pub fn new(release: &str) -> Self {
        Self {
            release: release.to_string(),
            ..Self::default()
        }
    }

    pub fn from_records(
        release: &str,
        records: impl IntoIterator<Item = ElementRecord>,
    ) -> Result<Self, ElementTableError> {
        let mut table = Self::new(release);
        for record in records {
            table.insert(record)?;
        }
        Ok(table)
    }

    pub fn load_csv(path: &Path, release: &str) -> Result<Self, ElementTableError> {
        let mut reader = csv::Reader::from_path(path).map_err(|e| ElementTableError::Csv {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;

        let mut table = Self::new(release);
        for result in reader.deserialize::<ElementRecord>() {
            let record = result.map_err(|e| ElementTableError::Csv {
                path: path.to_string_lossy().to_string(),
                source: e,
            })?;
            table.insert(record)?;
        }
        Ok(table)
    }

    pub fn insert(&mut self, mut record: ElementRecord) -> Result<(), ElementTableError> {
        let symbol = normalize_symbol(&record.symbol).ok_or_else(|| {
            ElementTableError::InvalidRecord {
                symbol: record.symbol.to_string(),
                reason: "symbol must be alphabetic".to_string(),
            }
        })?;
        if !(record.mass.is_finite() && record.mass > 0.0) {
            return Err(ElementTableError::InvalidRecord {
                symbol,
                reason: format!("mass must be positive, got {}", record.mass),
            });
        }
        record.symbol = Cow::Owned(symbol.clone());
        self.records.insert(symbol, record);
        Ok(())
    }

    pub fn with_isotope(
        mut self,
        symbol: &str,
        mass_number: u32,
        mass: f64,
    ) -> Result<Self, ElementTableError> {
        let record = self.resolve(symbol)?;
        let key = (record.symbol.to_string(), mass_number);
        self.isotopes.insert(key, mass);
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl ElementTable for CustomElementTable {
    fn release(&self) -> &str {
        &self.release
    }

    fn lookup(&self, symbol: &str) -> Option<&ElementRecord> {
        self.records.get(normalize_symbol(symbol)?.as_str())
    }

    fn isotope_mass(&self, symbol: &str, mass_number: u32) -> Option<f64> {
        let record = self.lookup(symbol)?;
        self.isotopes
            .get(&(record.symbol.to_string(), mass_number))
            .copied()
    }
}
