//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use crate::config::schema::ServerConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Parse(e) => Some(e),
            ConfigError::Validation(_) => None,
        }
    }
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ServerConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    parse_config(&content)
}

/// Parse and validate configuration text.
pub fn parse_config(content: &str) -> Result<ServerConfig, ConfigError> {
    let config: ServerConfig = toml::from_str(content).map_err(ConfigError::Parse)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
[listener]
bind_address = "127.0.0.1:8000"

[routing]
options_fallback = false

[[routes]]
endpoint = "GET /articles/:slug"
description = "One article"
available_media_types = ["text/html", "application/json"]
available_languages = ["en", "fr"]

[routes.response]
template = "Article :slug"

[[routes]]
endpoint = "POST /articles"
accepted_media_types = ["application/json"]
headers = { authorization = "Bearer *" }

[routes.response]
status = 201

[[aliases]]
from = "/posts/:slug"
to = "/articles/:slug"

[[response_headers]]
pattern = "/articles/**"
headers = { cache-control = "max-age=60" }
"#;

    #[test]
    fn test_parse_sample() {
        let config = parse_config(SAMPLE).unwrap();
        assert_eq!(config.listener.bind_address, "127.0.0.1:8000");
        assert_eq!(config.listener.request_timeout_secs, 30);
        assert!(!config.routing.options_fallback);
        assert_eq!(config.routes.len(), 2);
        assert_eq!(config.routes[0].response.status, 200);
        assert_eq!(config.routes[0].response.template.as_deref(), Some("Article :slug"));
        assert_eq!(config.routes[1].response.status, 201);
        assert_eq!(config.routes[1].headers["authorization"], "Bearer *");
        assert_eq!(config.aliases[0].to, "/articles/:slug");
        assert_eq!(config.response_headers[0].headers["cache-control"], "max-age=60");
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = parse_config("").unwrap();
        assert!(config.routes.is_empty());
        assert!(config.routing.options_fallback);
        assert_eq!(config.observability.log_level, "info");
    }

    #[test]
    fn test_errors() {
        assert!(matches!(parse_config("routes = 3"), Err(ConfigError::Parse(_))));
        let err = parse_config("[[routes]]\nendpoint = \"FETCH /x\"").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref e) if e.len() == 1));
        assert!(err.to_string().starts_with("Validation failed: "));
    }
}
