use nalgebra::Point3;

/// A single atom of a molecule record.
///
/// Positions are Cartesian coordinates in Bohr. The element symbol is always the
/// canonical spelling from the element table that resolved it (e.g. `Cl`, never `CL`).
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    /// Canonical element symbol.
    pub symbol: String,
    /// Atomic number of the element.
    pub atomic_number: u32,
    /// Optional user label appended to the symbol in some formats (e.g. `_a`, `1`).
    pub label: String,
    /// Atomic or isotopic mass in atomic mass units.
    pub mass: f64,
    /// Mass number when the atom was given as a specific isotope.
    pub mass_number: Option<u32>,
    /// Formal charge in elementary charge units.
    pub charge: f64,
    /// Cartesian position in Bohr.
    pub position: Point3<f64>,
    /// `false` for ghost atoms, which carry a basis but no nucleus or electrons.
    pub real: bool,
}

impl Atom {
    /// Creates a real, unlabeled, neutral atom.
    pub fn new(symbol: &str, atomic_number: u32, mass: f64, position: Point3<f64>) -> Self {
        Self {
            symbol: symbol.to_string(),
            atomic_number,
            label: String::new(),
            mass,
            mass_number: None,
            charge: 0.0,
            position,
            real: true,
        }
    }

    pub fn is_ghost(&self) -> bool {
        !self.real
    }

    pub fn distance_to(&self, other: &Atom) -> f64 {
        (self.position - other.position).norm()
    }
}
