//! Configuration for the manager commands
//!
//! Parameter overrides come from a file given on the command line or through
//! `CAMBUFFER_PARAMS`.

use anyhow::{Context, Result};
use cambuffer_core::launch::{fakecam_launch, LaunchDescriptor};
use cambuffer_core::params::ParameterSet;
use std::path::{Path, PathBuf};

/// Environment variable naming a parameter override file
pub const PARAMS_ENV: &str = "CAMBUFFER_PARAMS";

/// Configuration precedence for the override file
/// 1. Command line flag (highest)
/// 2. Environment variable
/// 3. No overrides (lowest)
pub fn resolve_params_file(flag: Option<PathBuf>, env_var: Option<PathBuf>) -> Option<PathBuf> {
    flag.or(env_var)
}

pub fn params_file_from_env() -> Option<PathBuf> {
    std::env::var_os(PARAMS_ENV)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

/// The fakecam descriptor with the override file, if any, merged into each node
pub fn load_descriptor(params_file: Option<&Path>) -> Result<LaunchDescriptor> {
    let descriptor = fakecam_launch();
    let Some(path) = params_file else {
        return Ok(descriptor);
    };

    tracing::debug!("applying parameter overrides from {}", path.display());
    descriptor
        .with_overrides(|identity| ParameterSet::load_from_disk(path, identity))
        .with_context(|| format!("Failed to load parameter overrides from {:?}", path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_config_precedence() {
        let flag = Some(PathBuf::from("flag.yaml"));
        let env = Some(PathBuf::from("env.yaml"));
        assert_eq!(resolve_params_file(flag.clone(), env.clone()), flag);
        assert_eq!(resolve_params_file(None, env.clone()), env);
        assert_eq!(resolve_params_file(None, None), None);
    }

    #[test]
    fn test_load_without_overrides() {
        assert_eq!(load_descriptor(None).unwrap(), fakecam_launch());
    }

    #[test]
    fn test_load_with_overrides() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "fps = 15").unwrap();

        let descriptor = load_descriptor(Some(file.path())).unwrap();
        let params = descriptor.nodes()[0].parameters();
        assert_eq!(params.get_int("fps"), Some(15));
        assert_eq!(params.get_int("width"), Some(640));
    }

    #[test]
    fn test_fully_qualified_selector_applies() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(
            file,
            "/**:\n  ros__parameters:\n    fps: 10\n/fakecam_node:\n  ros__parameters:\n    fps: 12"
        )
        .unwrap();

        let descriptor = load_descriptor(Some(file.path())).unwrap();
        assert_eq!(descriptor.nodes()[0].parameters().get_int("fps"), Some(12));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        assert!(load_descriptor(Some(Path::new("/nonexistent/params.yaml"))).is_err());
    }
}
