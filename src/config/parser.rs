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

/// Computes a SHA-256 hash of the configuration file content
///
/// Logged at startup so two exports can be tied back to the settings that
/// produced them.
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    Ok(hex::encode(hasher.finalize()))
}

/// Loads a configuration and returns both the config and its hash
pub fn load_config_with_hash(path: &Path) -> Result<(Config, String), ConfigError> {
    let config = load_config(path)?;
    let hash = compute_config_hash(path)?;
    Ok((config, hash))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CountyFilter;
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
[site]
base-url = "https://directory.example.ie"

[fetch]
min-interval-ms = 500
interval-jitter-ms = 0
max-attempts = 5
proxies = ["http://10.0.0.1:8080", "http://10.0.0.2:8080"]

[crawl]
max-pages = 40
page-delay-min-ms = 100
page-delay-max-ms = 200
county-filter = "strict"
enrich-details = false

[output]
directory = "./exports"
"#;

        let file = create_temp_config(config_content);
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.site.base_url, "https://directory.example.ie");
        assert_eq!(config.fetch.min_interval_ms, 500);
        assert_eq!(config.fetch.max_attempts, 5);
        assert_eq!(config.fetch.proxies.len(), 2);
        assert_eq!(config.crawl.max_pages, 40);
        assert_eq!(config.crawl.county_filter, CountyFilter::Strict);
        assert!(!config.crawl.enrich_details);
        assert_eq!(config.output.directory, "./exports");
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config.site.base_url, "https://www.goldenpages.ie");
        assert_eq!(config.fetch.min_interval_ms, 2000);
        assert_eq!(config.fetch.max_attempts, 3);
        assert_eq!(config.fetch.rate_limit_backoff_secs, 5);
        assert_eq!(config.fetch.error_backoff_secs, 2);
        assert_eq!(config.crawl.max_pages, 500);
        assert_eq!(config.crawl.county_filter, CountyFilter::WhenCounty);
        assert!(config.crawl.enrich_details);
    }

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        let config = parse_config("[fetch]\nmax-attempts = 7\n").unwrap();
        assert_eq!(config.fetch.max_attempts, 7);
        assert_eq!(config.fetch.timeout_secs, 30);
        assert!(config.fetch.rotate_on_forbidden);
    }

    #[test]
    fn test_load_config_with_invalid_path() {
        let result = load_config(Path::new("/nonexistent/harvester.toml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_load_config_with_invalid_toml() {
        let file = create_temp_config("this is not valid TOML {{{");
        let result = load_config(file.path());
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_unknown_county_filter_is_parse_error() {
        let result = parse_config("[crawl]\ncounty-filter = \"sometimes\"\n");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_config_with_validation_error() {
        let file = create_temp_config("[fetch]\nmax-attempts = 0\n");
        let result = load_config(file.path());
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_compute_config_hash() {
        let file = create_temp_config("test content");

        let hash1 = compute_config_hash(file.path()).unwrap();
        let hash2 = compute_config_hash(file.path()).unwrap();

        assert_eq!(hash1, hash2);
        assert_eq!(hash1.len(), 64);
    }

    #[test]
    fn test_different_content_different_hash() {
        let file1 = create_temp_config("content 1");
        let file2 = create_temp_config("content 2");

        let hash1 = compute_config_hash(file1.path()).unwrap();
        let hash2 = compute_config_hash(file2.path()).unwrap();

        assert_ne!(hash1, hash2);
    }
}
