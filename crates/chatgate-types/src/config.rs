//! Configuration for the chatgate gateway.
//!
//! Loaded from `{data_dir}/config.toml` when present; every field has a
//! default so a missing file yields a working configuration. The data
//! directory is resolved from `CHATGATE_DATA_DIR`, falling back to
//! `~/.chatgate`.

use serde::{Deserialize, Serialize};

use std::path::{Path, PathBuf};

/// Top-level configuration for the chatgate gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Base URL of the external connector sidecar.
    #[serde(default = "default_sidecar_url")]
    pub sidecar_url: String,

    /// Delay before a scheduled connector reinitialization, in seconds.
    #[serde(default = "default_reinit_delay_secs")]
    pub reinit_delay_secs: u64,

    /// Policy for excluding automated-assistant contacts from listings.
    #[serde(default)]
    pub exclusion: ExclusionPolicy,
}

fn default_sidecar_url() -> String {
    "http://127.0.0.1:3001".to_string()
}

fn default_reinit_delay_secs() -> u64 {
    2
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            sidecar_url: default_sidecar_url(),
            reinit_delay_secs: default_reinit_delay_secs(),
            exclusion: ExclusionPolicy::default(),
        }
    }
}

/// Resolve the chatgate data directory.
///
/// `CHATGATE_DATA_DIR` wins; otherwise `$HOME/.chatgate`.
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("CHATGATE_DATA_DIR") {
        return PathBuf::from(dir);
    }
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    Path::new(&home).join(".chatgate")
}

/// Tunable policy for filtering out automated-assistant contacts.
///
/// A contact is excluded when its display name contains any keyword
/// (case-insensitive) or its number falls in the reserved assistant
/// number block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExclusionPolicy {
    /// Case-insensitive name substrings that mark a contact as automated.
    #[serde(default = "default_keywords")]
    pub keywords: Vec<String>,

    /// Digit prefix of the reserved assistant number range.
    #[serde(default = "default_reserved_prefix")]
    pub reserved_prefix: String,

    /// Minimum digits after the prefix for a number to be in the range.
    #[serde(default = "default_reserved_min_digits")]
    pub reserved_min_digits: usize,
}

fn default_keywords() -> Vec<String> {
    [
        "ai", "bot", "meta", "coach", "tutor", "mentor", "guru", "genie", "trivia", "game",
        "assistant", "sidekick", "starter", "editor", "master", "detective", "robot",
    ]
    .iter()
    .map(|s| (*s).to_string())
    .collect()
}

fn default_reserved_prefix() -> String {
    "1313555".to_string()
}

fn default_reserved_min_digits() -> usize {
    4
}

impl Default for ExclusionPolicy {
    fn default() -> Self {
        Self {
            keywords: default_keywords(),
            reserved_prefix: default_reserved_prefix(),
            reserved_min_digits: default_reserved_min_digits(),
        }
    }
}

impl ExclusionPolicy {
    /// Whether a contact with the given name and number should be excluded.
    ///
    /// Contacts with neither a name nor a number are excluded outright.
    pub fn is_excluded(&self, name: Option<&str>, number: Option<&str>) -> bool {
        let name = name.map(str::trim).filter(|s| !s.is_empty());
        let number = number.map(str::trim).filter(|s| !s.is_empty());

        if name.is_none() && number.is_none() {
            return true;
        }

        if let Some(name) = name {
            let lower = name.to_lowercase();
            if self.keywords.iter().any(|kw| lower.contains(&kw.to_lowercase())) {
                return true;
            }
        }

        if let Some(number) = number
            && let Some(rest) = number.strip_prefix(self.reserved_prefix.as_str())
            && rest.len() >= self.reserved_min_digits
            && rest.chars().all(|c| c.is_ascii_digit())
        {
            return true;
        }

        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults_from_empty_toml() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.reinit_delay_secs, 2);
        assert!(!config.exclusion.keywords.is_empty());
    }

    #[test]
    fn test_config_override() {
        let config: AppConfig = toml::from_str(
            r#"
            sidecar_url = "http://10.0.0.5:9000"
            reinit_delay_secs = 5

            [exclusion]
            keywords = ["spam"]
            "#,
        )
        .unwrap();
        assert_eq!(config.sidecar_url, "http://10.0.0.5:9000");
        assert_eq!(config.reinit_delay_secs, 5);
        assert_eq!(config.exclusion.keywords, vec!["spam"]);
    }

    #[test]
    fn test_keyword_exclusion_is_case_insensitive() {
        let policy = ExclusionPolicy::default();
        assert!(policy.is_excluded(Some("Business Coach Bot"), Some("447911123456")));
        assert!(policy.is_excluded(Some("META ai"), None));
        assert!(!policy.is_excluded(Some("Alice"), Some("447911123456")));
    }

    #[test]
    fn test_reserved_number_range_excluded_regardless_of_name() {
        let policy = ExclusionPolicy::default();
        assert!(policy.is_excluded(Some("Alice"), Some("13135551234")));
        // Too few digits after the prefix: not in the reserved block.
        assert!(!policy.is_excluded(Some("Alice"), Some("1313555123")));
    }

    #[test]
    fn test_nameless_numberless_contact_excluded() {
        let policy = ExclusionPolicy::default();
        assert!(policy.is_excluded(None, None));
        assert!(policy.is_excluded(Some("  "), Some("")));
    }
}
