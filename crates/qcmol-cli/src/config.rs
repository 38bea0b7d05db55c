use crate::cli::AlignmentOptions;
use crate::error::{CliError, Result};
use qcmol::engine::config::{AlignmentConfig, TolerancePolicy};
use tracing::debug;

/// Builds the alignment configuration for one command: the config file (or the library
/// defaults) with command-line flags applied on top.
pub fn resolve_alignment_config(options: &AlignmentOptions) -> Result<AlignmentConfig> {
    let mut config = match &options.config {
        Some(path) => {
            debug!("Loading alignment configuration from {:?}", path);
            AlignmentConfig::load(path)?
        }
        None => AlignmentConfig::default(),
    };

    if options.allow_mirror {
        config.allow_mirror = true;
    }
    if options.fragment_order_invariant {
        config.fragment_order_invariant = true;
    }
    if let Some(limit) = options.max_candidates {
        if limit == 0 {
            return Err(CliError::Argument(
                "--max-candidates must be at least 1".to_string(),
            ));
        }
        config.max_candidates = Some(limit);
    }
    if options.distance_tolerance.is_some() || options.ignore_isotopes {
        let current = config.tolerances;
        config.tolerances = TolerancePolicy::new(
            options
                .distance_tolerance
                .unwrap_or(current.distance_tolerance()),
            current.mass_tolerance(),
            current.match_isotopes() && !options.ignore_isotopes,
        )?;
    }

    debug!("Resolved alignment configuration: {:?}", config);
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn options() -> AlignmentOptions {
        AlignmentOptions {
            config: None,
            allow_mirror: false,
            fragment_order_invariant: false,
            distance_tolerance: None,
            ignore_isotopes: false,
            max_candidates: None,
        }
    }

    #[test]
    fn defaults_without_file_or_flags() {
        let config = resolve_alignment_config(&options()).unwrap();
        assert_eq!(config, AlignmentConfig::default());
    }

    #[test]
    fn flags_override_file_values() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "distance-tolerance = 1e-2\nmass-tolerance = 0.2\nmax-candidates = 10"
        )
        .unwrap();

        let mut opts = options();
        opts.config = Some(file.path().to_path_buf());
        opts.allow_mirror = true;
        opts.distance_tolerance = Some(5e-4);
        opts.ignore_isotopes = true;

        let config = resolve_alignment_config(&opts).unwrap();
        assert!(config.allow_mirror);
        assert_eq!(config.max_candidates, Some(10));
        assert_eq!(config.tolerances.distance_tolerance(), 5e-4);
        assert_eq!(config.tolerances.mass_tolerance(), 0.2);
        assert!(!config.tolerances.match_isotopes());
    }

    #[test]
    fn invalid_overrides_are_rejected() {
        let mut opts = options();
        opts.max_candidates = Some(0);
        assert!(matches!(
            resolve_alignment_config(&opts),
            Err(CliError::Argument(_))
        ));

        let mut opts = options();
        opts.distance_tolerance = Some(-1.0);
        assert!(matches!(
            resolve_alignment_config(&opts),
            Err(CliError::Config(_))
        ));
    }
}
