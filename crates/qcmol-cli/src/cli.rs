use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "qcmol developers",
    version,
    about = "qcmol CLI - Element and CODATA lookups, geometry conversion, \
             and permutation-invariant molecular alignment.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Set the number of threads for batch comparisons.
    /// Defaults to the number of available logical cores.
    #[arg(short = 'j', long, global = true, value_name = "NUM")]
    pub threads: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the record of a chemical element, optionally for a specific isotope.
    Element(ElementArgs),
    /// Show a single physical constant.
    Constant(ConstantArgs),
    /// List every physical constant of a CODATA release.
    Constants(ConstantsArgs),
    /// Decide whether two XYZ geometries are the same molecule and report the alignment.
    Align(AlignArgs),
    /// Collapse a set of XYZ geometries into structurally distinct representatives.
    Dedup(DedupArgs),
    /// Render an XYZ geometry as input for a quantum-chemistry program.
    Convert(ConvertArgs),
}

/// Arguments for the `element` subcommand.
#[derive(Args, Debug)]
pub struct ElementArgs {
    /// Element symbol, case-insensitive (e.g., 'Cl', 'D').
    #[arg(required = true)]
    pub symbol: String,

    /// Mass number of the isotope to report.
    #[arg(long, value_name = "A")]
    pub isotope: Option<u32>,

    /// Use a custom element table (CSV: symbol,name,atomic_number,mass,covalent_radius).
    #[arg(long, value_name = "PATH")]
    pub table: Option<PathBuf>,
}

/// Arguments for the `constant` subcommand.
#[derive(Args, Debug)]
pub struct ConstantArgs {
    /// Constant name or alias (e.g., 'bohr2angstroms', 'hartree2kcalmol', 'c').
    #[arg(required = true)]
    pub name: String,

    /// CODATA release to read the value from.
    #[arg(long, default_value = "codata2014", value_name = "RELEASE")]
    pub release: String,
}

/// Arguments for the `constants` subcommand.
#[derive(Args, Debug)]
pub struct ConstantsArgs {
    /// CODATA release to list.
    #[arg(long, default_value = "codata2014", value_name = "RELEASE")]
    pub release: String,
}

/// Options shared by every command that compares geometries.
#[derive(Args, Debug, Clone)]
pub struct AlignmentOptions {
    /// Path to an alignment configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Accept mirror images as equivalent, overriding the config file.
    #[arg(long)]
    pub allow_mirror: bool,

    /// Allow whole fragments to be matched out of order, overriding the config file.
    #[arg(long)]
    pub fragment_order_invariant: bool,

    /// Override the RMSD acceptance threshold, in Bohr.
    #[arg(long, value_name = "FLOAT")]
    pub distance_tolerance: Option<f64>,

    /// Treat isotopes of the same element as interchangeable.
    #[arg(long)]
    pub ignore_isotopes: bool,

    /// Stop after this many candidate permutations.
    #[arg(long, value_name = "INT")]
    pub max_candidates: Option<usize>,
}

/// Arguments for the `align` subcommand.
#[derive(Args, Debug)]
pub struct AlignArgs {
    /// Reference geometry (XYZ).
    #[arg(required = true, value_name = "REFERENCE")]
    pub reference: PathBuf,

    /// Geometry to be moved onto the reference (XYZ).
    #[arg(required = true, value_name = "MOBILE")]
    pub mobile: PathBuf,

    #[command(flatten)]
    pub options: AlignmentOptions,

    /// Write the relabeled, superimposed mobile geometry to this XYZ file.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,
}

/// Arguments for the `dedup` subcommand.
#[derive(Args, Debug)]
pub struct DedupArgs {
    /// Geometries to compare (XYZ), in priority order.
    #[arg(required = true, num_args(1..), value_name = "FILES")]
    pub inputs: Vec<PathBuf>,

    #[command(flatten)]
    pub options: AlignmentOptions,
}

/// Arguments for the `convert` subcommand.
#[derive(Args, Debug)]
pub struct ConvertArgs {
    /// Input geometry (XYZ).
    #[arg(required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Target layout (xyz, xyz+, psi4, qchem, orca, nwchem, molpro, cfour, terachem,
    /// turbomole, gamess, madness, mrchem).
    #[arg(short, long, required = true, value_name = "DTYPE")]
    pub dtype: String,

    /// Coordinate units of the output; defaults to the program's convention.
    #[arg(short, long, value_name = "UNITS")]
    pub units: Option<String>,

    /// Write to this file instead of standard output.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,
}
