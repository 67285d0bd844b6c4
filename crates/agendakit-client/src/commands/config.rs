//! The `config` subcommand family.

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

/// Prints the merged configuration as TOML.
///
/// The output parses back with `--config`, so it doubles as a template.
pub fn dump(config: &ClientConfig) -> ClientResult<()> {
    let rendered = toml::to_string_pretty(config)
        .map_err(|e| ClientError::Config(format!("failed to serialize config: {}", e)))?;
    print!("{}", rendered);

    Ok(())
}

/// Rejects configs the other commands would trip over.
pub fn validate(config: &ClientConfig) -> ClientResult<()> {
    if config.server.timeout == 0 {
        return Err(ClientError::Config(
            "server.timeout must be at least 1 second".to_string(),
        ));
    }

    if let Some(ref socket_path) = config.server.socket_path
        && let Some(parent) = socket_path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        return Err(ClientError::Config(format!(
            "server.socket_path directory does not exist: {}",
            parent.display()
        )));
    }

    println!("config ok");
    Ok(())
}

/// Prints the path `load` reads from.
pub fn path() -> ClientResult<()> {
    println!("{}", ClientConfig::default_path().display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn default_config_validates() {
        assert!(validate(&ClientConfig::default()).is_ok());
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let mut config = ClientConfig::default();
        config.server.timeout = 0;

        let result = validate(&config);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("timeout"));
    }

    #[test]
    fn missing_socket_directory_is_rejected() {
        let mut config = ClientConfig::default();
        config.server.socket_path = Some(PathBuf::from("/nonexistent/dir/agendakit.sock"));

        let result = validate(&config);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("does not exist"));
    }

    #[test]
    fn socket_in_existing_directory_validates() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = ClientConfig::default();
        config.server.socket_path = Some(dir.path().join("agendakit.sock"));

        assert!(validate(&config).is_ok());
    }

    #[test]
    fn dump_round_trips_through_toml() {
        let mut config = ClientConfig::default();
        config.session = Some("weekly".to_string());

        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: ClientConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.session.as_deref(), Some("weekly"));
        assert_eq!(parsed.server.timeout, config.server.timeout);
    }
}
