use std::path::Path;

use tracing::debug;

use crate::{Error, HostbridgeConfig, Result};

/// Parse a configuration document.
pub fn from_toml_str(raw: &str) -> Result<HostbridgeConfig> {
    Ok(toml::from_str(raw)?)
}

/// Read and parse a configuration file.
pub fn load(path: &Path) -> Result<HostbridgeConfig> {
    let raw = std::fs::read_to_string(path).map_err(|source| Error::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config = from_toml_str(&raw)?;
    debug!(path = %path.display(), "loaded hostbridge config");
    Ok(config)
}

/// Like [`load`], but falls back to defaults when no path is given.
pub fn load_or_default(path: Option<&Path>) -> Result<HostbridgeConfig> {
    match path {
        Some(path) => load(path),
        None => Ok(HostbridgeConfig::default()),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use {super::*, std::io::Write};

    #[test]
    fn empty_document_yields_defaults() {
        let config = from_toml_str("").unwrap();
        assert_eq!(config, HostbridgeConfig::default());
        assert_eq!(config.bridge.first_request_id, 0);
        assert_eq!(
            config.bridge.max_payload_bytes,
            Some(hostbridge_protocol::MAX_PAYLOAD_BYTES)
        );
        assert_eq!(config.logging.filter, "info");
    }

    #[test]
    fn sections_override_defaults() {
        let config = from_toml_str(
            r#"
            [bridge]
            first_request_id = 100
            max_payload_bytes = 64

            [logging]
            filter = "hostbridge_runtime=debug"
            json = true
            "#,
        )
        .unwrap();
        let options = config.runtime_options();
        assert_eq!(options.first_request_id, 100);
        assert_eq!(options.max_payload_bytes, Some(64));
        assert!(config.logging.json);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = from_toml_str("[bridge]\nfirst_id = 1\n").unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }

    #[test]
    fn load_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[bridge]\nfirst_request_id = 5").unwrap();
        let config = load(file.path()).unwrap();
        assert_eq!(config.bridge.first_request_id, 5);
    }

    #[test]
    fn load_missing_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        let err = load(&path).unwrap_err();
        assert!(err.to_string().contains("absent.toml"));
    }

    #[test]
    fn load_or_default_without_path() {
        assert_eq!(load_or_default(None).unwrap(), HostbridgeConfig::default());
    }
}
