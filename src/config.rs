use anyhow::{Context, Result};
use regex::Regex;
use serde::Deserialize;
use std::{env, fs, path::Path};
use tracing::info;

pub const CONFIG_PATH_ENV: &str = "CONFIG_PATH";

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    pub webserver: Webserver,
    pub color: String,
    #[serde(rename = "featureFlags")]
    pub feature_flags: FeatureFlags,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Webserver {
    pub port: u16,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct FeatureFlags {
    /// Mounts `/ready`, `/up` and `/health`. Disabled, the service behaves like a plain color API.
    #[serde(rename = "enableProbes")]
    pub enable_probes: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            webserver: Webserver::default(),
            color: "blue".to_string(),
            feature_flags: FeatureFlags::default(),
        }
    }
}

impl Default for Webserver {
    fn default() -> Self {
        Webserver { port: 3000 }
    }
}

impl Default for FeatureFlags {
    fn default() -> Self {
        FeatureFlags {
            enable_probes: true,
        }
    }
}

/// Loads the config file named by `CONFIG_PATH`, or the built-in defaults when it is unset.
pub fn load_config_from_env() -> Result<Config> {
    match env::var_os(CONFIG_PATH_ENV) {
        Some(path) => load_config(path),
        None => {
            info!("{} not set, using default config", CONFIG_PATH_ENV);
            Ok(Config::default())
        }
    }
}

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    info!("Loading config from file {}", path.as_ref().display());
    let yaml_str = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

    let expanded = expand_env_vars(&yaml_str)?;

    let config = serde_yaml_ng::from_str(&expanded)
        .context("Failed to parse YAML config after environment variable expansion")?;

    Ok(config)
}

/// Replaces `${VAR}` placeholders with environment variables values.
/// Returns an error naming the first variable that is not set.
fn expand_env_vars(input: &str) -> Result<String> {
    let re =
        Regex::new(r"\$\{([^}]+)}").context("Invalid regex pattern for env var substitution")?;

    let mut missing = None;
    let result = re.replace_all(input, |caps: &regex::Captures| {
        env::var(&caps[1]).unwrap_or_else(|_| {
            missing.get_or_insert_with(|| caps[1].to_string());
            String::new()
        })
    });

    if let Some(name) = missing {
        anyhow::bail!("Missing environment variable: {}", name);
    }

    Ok(result.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn test_expand_env_vars_success() {
        unsafe {
            env::set_var("COLOR_API_TEST_VAR", "value123");
        }
        let input = "This is a test: ${COLOR_API_TEST_VAR}";
        let expanded = expand_env_vars(input).expect("Expansion should succeed");
        assert_eq!(expanded, "This is a test: value123");
        unsafe {
            env::remove_var("COLOR_API_TEST_VAR");
        }
    }

    #[test]
    fn test_expand_env_vars_missing_var() {
        let input = "This will fail: ${COLOR_API_MISSING_VAR}";
        let err = expand_env_vars(input).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Missing environment variable: COLOR_API_MISSING_VAR"
        );
    }

    #[test]
    fn test_expand_env_vars_reports_first_missing_var() {
        unsafe {
            env::set_var("COLOR_API_PRESENT_VAR", "here");
        }
        let input = "${COLOR_API_PRESENT_VAR} ${COLOR_API_FIRST_MISSING} ${COLOR_API_SECOND_MISSING}";
        let err = expand_env_vars(input).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Missing environment variable: COLOR_API_FIRST_MISSING"
        );
        unsafe {
            env::remove_var("COLOR_API_PRESENT_VAR");
        }
    }

    #[test]
    fn test_expand_env_vars_no_vars() {
        let input = "No variables here";
        let expanded = expand_env_vars(input).expect("Expansion should succeed");
        assert_eq!(expanded, input);
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.webserver.port, 3000);
        assert_eq!(config.color, "blue");
        assert!(config.feature_flags.enable_probes);
    }

    #[test]
    fn test_load_config_file() {
        unsafe {
            env::set_var("COLOR_API_TEST_COLOR", "green");
        }
        let yaml_content = r#"
        webserver:
          port: 8080
        color: ${COLOR_API_TEST_COLOR}
        featureFlags:
          enableProbes: false
        "#;

        let tmp_file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
        let path = tmp_file.path();
        fs::write(path, yaml_content).expect("Failed to write to temp file");

        let config = load_config(path).expect("Should load config");

        assert_eq!(config.webserver.port, 8080);
        assert_eq!(config.color, "green");
        assert!(!config.feature_flags.enable_probes);
        unsafe {
            env::remove_var("COLOR_API_TEST_COLOR");
        }
    }

    #[test]
    fn test_load_partial_config_file_keeps_defaults() {
        let tmp_file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
        fs::write(tmp_file.path(), "color: red\n").expect("Failed to write to temp file");

        let config = load_config(tmp_file.path()).expect("Should load config");

        assert_eq!(config.color, "red");
        assert_eq!(config.webserver.port, 3000);
        assert!(config.feature_flags.enable_probes);
    }

    #[test]
    fn test_load_config_from_env_reads_config_path() {
        let tmp_file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
        fs::write(
            tmp_file.path(),
            "webserver:\n  port: 9090\ncolor: purple\n",
        )
        .expect("Failed to write to temp file");
        unsafe {
            env::set_var(CONFIG_PATH_ENV, tmp_file.path());
        }

        let config = load_config_from_env();

        unsafe {
            env::remove_var(CONFIG_PATH_ENV);
        }
        let config = config.expect("Should load config from CONFIG_PATH");
        assert_eq!(config.webserver.port, 9090);
        assert_eq!(config.color, "purple");
        assert!(config.feature_flags.enable_probes);
    }

    #[test]
    fn test_load_config_missing_file() {
        let err = load_config("/nonexistent/color-api.yaml").unwrap_err();
        assert!(err.to_string().starts_with("Failed to read config file"));
    }
}
