use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::CenturionConfig;

pub const DEFAULT_CONFIG_PATHS: &[&str] = &["centurion.toml", "config/centurion.toml"];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("invalid config field {field}: {message}")]
    Invalid { field: &'static str, message: String },
}

pub fn load_config(path: Option<PathBuf>) -> Result<CenturionConfig, ConfigError> {
    let candidate_paths = match path {
        Some(p) => vec![p],
        None => DEFAULT_CONFIG_PATHS
            .iter()
            .map(PathBuf::from)
            .collect::<Vec<PathBuf>>(),
    };

    for candidate in candidate_paths {
        if let Some(config) = try_load_file(&candidate)? {
            return Ok(config);
        }
    }

    Ok(CenturionConfig::default())
}

fn try_load_file(path: &Path) -> Result<Option<CenturionConfig>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }

    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let config: CenturionConfig =
        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

    Ok(Some(config))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = load_config(Some(PathBuf::from("definitely/not/here.toml")))
            .expect("load default config");
        assert_eq!(config.global.commitment, "confirmed");
        assert_eq!(config.global.lander.max_retries, 0);
        assert!(!config.global.wallet.allow_delegated);
    }

    #[test]
    fn template_parses_with_expected_defaults() {
        let template = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/centurion.toml"));
        let config: CenturionConfig = toml::from_str(template).expect("parse template");
        assert!(config.global.wallet.private_key.is_empty());
        assert!(config.global.multisig.create_key.is_empty());
        assert_eq!(config.global.multisig.vault_index, 0);
        assert_eq!(config.global.compute_budget.unit_limit, 0);
        assert_eq!(config.global.logging.level, "info");
    }

    #[test]
    fn partial_config_keeps_section_defaults() {
        let mut file = tempfile::NamedTempFile::new().expect("create temp config");
        writeln!(
            file,
            "[global]\nrpc_url = \"http://localhost:8899\"\n\n[global.multisig]\ncreate_key = \"11111111111111111111111111111111\"\nvault_index = 2\n"
        )
        .expect("write temp config");

        let config = load_config(Some(file.path().to_path_buf())).expect("load config");
        assert_eq!(config.global.rpc_url, "http://localhost:8899");
        assert_eq!(config.global.multisig.vault_index, 2);
        // 未出现的段落保持默认值
        assert_eq!(config.global.commitment, "confirmed");
        assert!(!config.global.lander.skip_preflight);
    }

    #[test]
    fn malformed_toml_reports_parse_error_with_path() {
        let mut file = tempfile::NamedTempFile::new().expect("create temp config");
        writeln!(file, "[global\nrpc_url = ").expect("write temp config");

        let err = load_config(Some(file.path().to_path_buf())).expect_err("parse should fail");
        match err {
            ConfigError::Parse { path, .. } => assert_eq!(path, file.path()),
            other => panic!("unexpected error: {other}"),
        }
    }
}
