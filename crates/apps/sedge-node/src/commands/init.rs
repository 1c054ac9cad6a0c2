//! Write a default configuration file.

use std::path::Path;
use tracing::info;

use crate::config::NodeConfig;
use crate::error::{NodeError, NodeResult};

/// Execute the init command.
pub fn init(config_path: &Path, force: bool) -> NodeResult<String> {
    if config_path.exists() && !force {
        return Err(NodeError::AlreadyExists(config_path.to_path_buf()));
    }

    NodeConfig::default().save(config_path)?;
    info!(path = %config_path.display(), "Configuration written");

    Ok(format!(
        "Wrote default configuration to {}\nSet the [accounts] section before starting a node.",
        config_path.display()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_init_writes_loadable_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("sedge.toml");

        let message = init(&path, false).unwrap();
        assert!(message.contains("sedge.toml"));
        assert_eq!(NodeConfig::load(&path).unwrap(), NodeConfig::default());
    }

    #[test]
    fn test_init_refuses_overwrite() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("sedge.toml");
        std::fs::write(&path, "[exchange]\nindicator_threshold = 9\n").unwrap();

        let err = init(&path, false).unwrap_err();
        assert!(matches!(err, NodeError::AlreadyExists(_)));
        // Untouched
        assert_eq!(
            NodeConfig::load(&path).unwrap().exchange.indicator_threshold,
            9
        );
    }

    #[test]
    fn test_init_force_overwrites() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("sedge.toml");
        std::fs::write(&path, "[exchange]\nindicator_threshold = 9\n").unwrap();

        init(&path, true).unwrap();
        assert_eq!(
            NodeConfig::load(&path).unwrap().exchange.indicator_threshold,
            5
        );
    }
}
