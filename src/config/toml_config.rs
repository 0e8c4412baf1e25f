use crate::cloudflare::policy::RateLimits;
use crate::cloudflare::DEFAULT_API_URL;
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{Result, SyncError};
use crate::utils::validation::{
    validate_non_empty_string, validate_path, validate_range, validate_url, Validate,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    /// List name -> source URL. At least one entry is required.
    pub lists: BTreeMap<String, String>,
    #[serde(default)]
    pub sync: SyncSection,
    #[serde(default)]
    pub cloudflare: CloudflareSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncSection {
    #[serde(default = "default_name_prefix")]
    pub name_prefix: String,
    #[serde(default = "default_tld_name_prefix")]
    pub tld_name_prefix: String,
    #[serde(default = "default_whitelist_file")]
    pub whitelist_file: String,
    #[serde(default = "default_tld_file")]
    pub tld_file: String,
    #[serde(default = "default_tmp_dir")]
    pub tmp_dir: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CloudflareSection {
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default = "default_list_op_delay_ms")]
    pub list_op_delay_ms: u64,
    #[serde(default = "default_pre_create_pause_secs")]
    pub pre_create_pause_secs: u64,
}

fn default_name_prefix() -> String {
    "[CFPihole] Block Ads".to_string()
}

fn default_tld_name_prefix() -> String {
    "[CFPihole] Block TLDs".to_string()
}

fn default_whitelist_file() -> String {
    "whitelist.txt".to_string()
}

fn default_tld_file() -> String {
    "tldlist.txt".to_string()
}

fn default_tmp_dir() -> String {
    "./tmp".to_string()
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_list_op_delay_ms() -> u64 {
    1500
}

fn default_pre_create_pause_secs() -> u64 {
    60
}

impl Default for SyncSection {
    fn default() -> Self {
        Self {
            name_prefix: default_name_prefix(),
            tld_name_prefix: default_tld_name_prefix(),
            whitelist_file: default_whitelist_file(),
            tld_file: default_tld_file(),
            tmp_dir: default_tmp_dir(),
        }
    }
}

impl Default for CloudflareSection {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            list_op_delay_ms: default_list_op_delay_ms(),
            pre_create_pause_secs: default_pre_create_pause_secs(),
        }
    }
}

impl TomlConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(SyncError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| SyncError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR_NAME}` placeholders with environment values; unset
    /// variables are left as-is so validation can flag them.
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").unwrap();

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        if self.lists.is_empty() {
            return Err(SyncError::MissingConfigError {
                field: "lists".to_string(),
            });
        }

        for (name, url) in &self.lists {
            validate_url(&format!("lists.{}", name), url)?;
        }

        validate_url("cloudflare.api_url", &self.cloudflare.api_url)?;
        validate_path("sync.tmp_dir", &self.sync.tmp_dir)?;
        validate_non_empty_string("sync.name_prefix", &self.sync.name_prefix)?;
        validate_non_empty_string("sync.tld_name_prefix", &self.sync.tld_name_prefix)?;

        validate_range(
            "cloudflare.list_op_delay_ms",
            self.cloudflare.list_op_delay_ms,
            0,
            60_000,
        )?;
        validate_range(
            "cloudflare.pre_create_pause_secs",
            self.cloudflare.pre_create_pause_secs,
            0,
            600,
        )?;

        Ok(())
    }

    pub fn api_url(&self) -> &str {
        &self.cloudflare.api_url
    }

    pub fn rate_limits(&self) -> RateLimits {
        RateLimits {
            list_op_delay: Duration::from_millis(self.cloudflare.list_op_delay_ms),
            pre_create_pause: Duration::from_secs(self.cloudflare.pre_create_pause_secs),
        }
    }
}

impl ConfigProvider for TomlConfig {
    fn list_sources(&self) -> &BTreeMap<String, String> {
        &self.lists
    }

    fn whitelist_file(&self) -> &str {
        &self.sync.whitelist_file
    }

    fn tld_file(&self) -> &str {
        &self.sync.tld_file
    }

    fn tmp_dir(&self) -> &str {
        &self.sync.tmp_dir
    }

    fn name_prefix(&self) -> &str {
        &self.sync.name_prefix
    }

    fn tld_name_prefix(&self) -> &str {
        &self.sync.tld_name_prefix
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
