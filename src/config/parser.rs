use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Loads and parses a configuration file from the given path
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use site_mirror::config::load_config;
///
/// let config = load_config(Path::new("mirror.toml")).unwrap();
/// println!("Starting at: {}", config.crawler.start_url);
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parses and validates configuration from a TOML string
pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(content)?;
    validate(&config)?;
    Ok(config)
}

/// Hex-encoded SHA-256 fingerprint of configuration text
///
/// Logged at startup so a mirror can be traced back to the exact
/// configuration that produced it.
pub fn config_fingerprint(content: &str) -> String {
    hex::encode(Sha256::digest(content.as_bytes()))
}

/// Loads a configuration and fingerprints the same text it was parsed from
pub fn load_config_with_hash(path: &Path) -> Result<(Config, String), ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config = parse_config(&content)?;
    Ok((config, config_fingerprint(&content)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_valid_config() {
        let config_content = r#"
[crawler]
start-url = "http://books.toscrape.com/index.html"
request-timeout-secs = 15
connect-timeout-secs = 5

[user-agent]
crawler-name = "TestMirror"
crawler-version = "1.0"
contact-url = "https://example.com/about"
contact-email = "admin@example.com"

[output]
root-dir = "./mirror"
failure-report = "failed.txt"

[scope]
sidebar = "aside.sidebar"
main-content = "article.product_page"
"#;

        let file = create_temp_config(config_content);
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.crawler.request_timeout_secs, 15);
        assert_eq!(config.crawler.connect_timeout_secs, 5);
        assert_eq!(config.user_agent.crawler_name, "TestMirror");
        assert_eq!(config.output.root_dir, "./mirror");
        assert_eq!(config.output.failure_report, "failed.txt");
        assert_eq!(config.scope.sidebar, "aside.sidebar");
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let file = create_temp_config("");
        let config = load_config(file.path()).unwrap();

        assert_eq!(
            config.crawler.start_url,
            "http://books.toscrape.com/index.html"
        );
        assert_eq!(config.output.root_dir, "Output");
        assert_eq!(config.user_agent.crawler_name, "site-mirror");
    }

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        let config = parse_config(
            r#"
[crawler]
start-url = "http://127.0.0.1:8080/index.html"
"#,
        )
        .unwrap();

        assert_eq!(config.crawler.start_url, "http://127.0.0.1:8080/index.html");
        assert_eq!(config.crawler.request_timeout_secs, 30);
        assert_eq!(config.scope.main_content, "article.product_page");
    }

    #[test]
    fn test_load_config_with_invalid_path() {
        let result = load_config(Path::new("/nonexistent/mirror.toml"));
        assert!(matches!(result.unwrap_err(), ConfigError::Io(_)));
    }

    #[test]
    fn test_load_config_with_invalid_toml() {
        let file = create_temp_config("this is not valid TOML {{{");
        let result = load_config(file.path());
        assert!(matches!(result.unwrap_err(), ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_config_with_validation_error() {
        let config_content = r#"
[crawler]
start-url = "ftp://books.toscrape.com/index.html"
"#;

        let file = create_temp_config(config_content);
        let result = load_config(file.path());
        assert!(result.is_err());
    }

    #[test]
    fn test_different_content_different_fingerprint() {
        assert_eq!(config_fingerprint("content 1"), config_fingerprint("content 1"));
        assert_ne!(config_fingerprint("content 1"), config_fingerprint("content 2"));
    }

    #[test]
    fn test_load_config_with_hash() {
        let content = "[output]\nroot-dir = \"out\"\n";
        let file = create_temp_config(content);
        let (config, hash) = load_config_with_hash(file.path()).unwrap();
        assert_eq!(config.output.root_dir, "out");
        assert_eq!(hash, config_fingerprint(content));
    }

    #[test]
    fn test_fingerprint_of_empty_config() {
        assert_eq!(
            config_fingerprint(""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }
}
