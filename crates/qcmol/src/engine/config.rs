use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

pub const DEFAULT_DISTANCE_TOLERANCE: f64 = 1.0e-3;
pub const DEFAULT_MASS_TOLERANCE: f64 = 1.0e-3;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("TOML parsing error for '{path}': {source}")]
    Toml {
        path: String,
        source: toml::de::Error,
    },
}

/// Numeric tolerances governing when two geometries count as the same.
///
/// Only the distance and mass tolerances are free parameters; every other tolerance is
/// derived from the distance tolerance so that the search never prunes a mapping the
/// decision would accept.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TolerancePolicy {
    distance_tolerance: f64,
    mass_tolerance: f64,
    match_isotopes: bool,
}

impl Default for TolerancePolicy {
    fn default() -> Self {
        Self {
            distance_tolerance: DEFAULT_DISTANCE_TOLERANCE,
            mass_tolerance: DEFAULT_MASS_TOLERANCE,
            match_isotopes: true,
        }
    }
}

impl TolerancePolicy {
    pub fn new(
        distance_tolerance: f64,
        mass_tolerance: f64,
        match_isotopes: bool,
    ) -> Result<Self, ConfigError> {
        if !(distance_tolerance.is_finite() && distance_tolerance > 0.0) {
            return Err(ConfigError::InvalidParameter {
                name: "distance_tolerance",
                reason: format!("must be a positive number, got {distance_tolerance}"),
            });
        }
        if !(mass_tolerance.is_finite() && mass_tolerance >= 0.0) {
            return Err(ConfigError::InvalidParameter {
                name: "mass_tolerance",
                reason: format!("must be a non-negative number, got {mass_tolerance}"),
            });
        }
        Ok(Self {
            distance_tolerance,
            mass_tolerance,
            match_isotopes,
        })
    }

    /// RMSD acceptance threshold, in Bohr.
    pub fn distance_tolerance(&self) -> f64 {
        self.distance_tolerance
    }

    /// Maximum accepted residual of any single atom.
    pub fn displacement_tolerance(&self) -> f64 {
        2.0 * self.distance_tolerance
    }

    /// Allowed deviation between corresponding interatomic distances.
    pub fn fingerprint_tolerance(&self) -> f64 {
        2.0 * self.displacement_tolerance()
    }

    /// Angular resolution at distance `extent` from the center, in radians.
    pub fn angle_tolerance(&self, extent: f64) -> f64 {
        if extent <= self.distance_tolerance {
            return std::f64::consts::FRAC_PI_2;
        }
        (self.distance_tolerance / extent).asin()
    }

    pub fn mass_tolerance(&self) -> f64 {
        self.mass_tolerance
    }

    pub fn match_isotopes(&self) -> bool {
        self.match_isotopes
    }
}

/// Everything that controls one alignment call.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AlignmentConfig {
    pub tolerances: TolerancePolicy,
    /// Permit improper rotations, so mirror images count as equivalent.
    pub allow_mirror: bool,
    /// Permit whole fragments to be matched out of order.
    pub fragment_order_invariant: bool,
    /// Upper bound on candidate permutations handed to the solver.
    pub max_candidates: Option<usize>,
}

impl AlignmentConfig {
    pub fn builder() -> AlignmentConfigBuilder {
        AlignmentConfigBuilder::new()
    }

    /// Loads a configuration from a TOML file with kebab-case keys.
    ///
    /// Missing keys keep their defaults; unknown keys are rejected.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        let file: AlignmentConfigFile = toml::from_str(&content).map_err(|e| ConfigError::Toml {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        file.into_builder().build()
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct AlignmentConfigFile {
    distance_tolerance: Option<f64>,
    mass_tolerance: Option<f64>,
    match_isotopes: Option<bool>,
    allow_mirror: Option<bool>,
    fragment_order_invariant: Option<bool>,
    max_candidates: Option<usize>,
}

impl AlignmentConfigFile {
    fn into_builder(self) -> AlignmentConfigBuilder {
        AlignmentConfigBuilder {
            distance_tolerance: self.distance_tolerance,
            mass_tolerance: self.mass_tolerance,
            match_isotopes: self.match_isotopes,
            allow_mirror: self.allow_mirror,
            fragment_order_invariant: self.fragment_order_invariant,
            max_candidates: self.max_candidates,
        }
    }
}

#[derive(Default)]
pub struct AlignmentConfigBuilder {
    distance_tolerance: Option<f64>,
    mass_tolerance: Option<f64>,
    match_isotopes: Option<bool>,
    allow_mirror: Option<bool>,
    fragment_order_invariant: Option<bool>,
    max_candidates: Option<usize>,
}

impl AlignmentConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn distance_tolerance(mut self, tolerance: f64) -> Self {
        self.distance_tolerance = Some(tolerance);
        self
    }
    pub fn mass_tolerance(mut self, tolerance: f64) -> Self {
        self.mass_tolerance = Some(tolerance);
        self
    }
    pub fn match_isotopes(mut self, enabled: bool) -> Self {
        self.match_isotopes = Some(enabled);
        self
    }
    pub fn allow_mirror(mut self, enabled: bool) -> Self {
        self.allow_mirror = Some(enabled);
        self
    }
    pub fn fragment_order_invariant(mut self, enabled: bool) -> Self {
        self.fragment_order_invariant = Some(enabled);
        self
    }
    pub fn max_candidates(mut self, limit: usize) -> Self {
        self.max_candidates = Some(limit);
        self
    }

    pub fn build(self) -> Result<AlignmentConfig, ConfigError> {
        let tolerances = TolerancePolicy::new(
            self.distance_tolerance.unwrap_or(DEFAULT_DISTANCE_TOLERANCE),
            self.mass_tolerance.unwrap_or(DEFAULT_MASS_TOLERANCE),
            self.match_isotopes.unwrap_or(true),
        )?;
        if self.max_candidates == Some(0) {
            return Err(ConfigError::InvalidParameter {
                name: "max_candidates",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(AlignmentConfig {
            tolerances,
            allow_mirror: self.allow_mirror.unwrap_or(false),
            fragment_order_invariant: self.fragment_order_invariant.unwrap_or(false),
            max_candidates: self.max_candidates,
        })
    }
}
