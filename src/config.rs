use std::collections::HashSet;
use std::fmt;
use std::path::Path;

use serde::Deserialize;
use tracing::warn;

use crate::cli::Cli;
use crate::error::{Error, Result};
use crate::sponsor::SponsorTemplate;

pub const DEFAULT_CONFIG_FILE: &str = "pullrin.toml";
pub const DEFAULT_NAME: &str = "pullrin";
pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";
pub const DEFAULT_HTTP_TIMEOUT: u64 = 30;
pub const DEFAULT_SPONSOR_TEMPLATE: &str =
    "この投稿は、『{{ phrase }}』、{{ name }}の提供でお送りします。";

/// One configuration layer. Used for both the TOML file and the environment.
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub name: Option<String>,
    pub icon_url: Option<String>,
    pub github_owner: Option<String>,
    pub github_repo: Option<String>,
    pub github_token: Option<String>,
    pub github_api_url: Option<String>,
    pub reviewers: Option<Vec<String>>,
    pub slack_api_token: Option<String>,
    pub slack_channel: Option<String>,
    pub sponsor_api_url: Option<String>,
    pub sponsor_template: Option<String>,
    pub http_timeout: Option<u64>,
    pub dry_run: Option<bool>,
}

#[derive(Clone, PartialEq)]
pub struct Config {
    pub name: String,
    pub icon_url: Option<String>,
    pub github_owner: String,
    pub github_repo: String,
    pub github_token: String,
    pub github_api_url: String,
    pub reviewers: Vec<String>,
    pub slack_api_token: Option<String>,
    pub slack_channel: Option<String>,
    pub sponsor_api_url: Option<String>,
    pub sponsor_template: String,
    pub http_timeout: u64,
    pub dry_run: bool,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("name", &self.name)
            .field("icon_url", &self.icon_url)
            .field("github_owner", &self.github_owner)
            .field("github_repo", &self.github_repo)
            .field("github_token", &redact(&self.github_token))
            .field("github_api_url", &self.github_api_url)
            .field("reviewers", &self.reviewers)
            .field(
                "slack_api_token",
                &self.slack_api_token.as_deref().map(redact),
            )
            .field("slack_channel", &self.slack_channel)
            .field("sponsor_api_url", &self.sponsor_api_url)
            .field("sponsor_template", &self.sponsor_template)
            .field("http_timeout", &self.http_timeout)
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

fn redact(secret: &str) -> &'static str {
    if secret.is_empty() { "" } else { "<redacted>" }
}

impl Config {
    /// Load config with precedence CLI > environment > file > defaults.
    pub fn load(cli: &Cli) -> Result<Self> {
        let file_config = match cli.config.as_deref() {
            Some(path) => {
                let path = Path::new(path);
                if !path.exists() {
                    return Err(Error::ConfigNotFound(path.to_path_buf()));
                }
                parse_config(&std::fs::read_to_string(path)?)?
            }
            None => {
                let path = Path::new(DEFAULT_CONFIG_FILE);
                if path.exists() {
                    parse_config(&std::fs::read_to_string(path)?)?
                } else {
                    ConfigFile::default()
                }
            }
        };
        let env_config = env_layer(|key| std::env::var(key).ok())?;

        let config = merge(file_config, env_config, cli);
        validate_config(&config)?;
        Ok(config)
    }
}

pub fn parse_config(content: &str) -> Result<ConfigFile> {
    let config: ConfigFile = toml::from_str(content)?;
    validate(&config)?;
    Ok(config)
}

/// Read the `PULLRIN_*` environment. Empty values count as unset.
pub fn env_layer<F>(lookup: F) -> Result<ConfigFile>
where
    F: Fn(&str) -> Option<String>,
{
    let var = |key: &str| lookup(key).filter(|v| !v.is_empty());

    let http_timeout = match var("PULLRIN_HTTP_TIMEOUT") {
        Some(raw) => Some(raw.parse::<u64>().map_err(|e| {
            Error::ConfigValidation(format!("PULLRIN_HTTP_TIMEOUT must be a number: {e}"))
        })?),
        None => None,
    };

    let config = ConfigFile {
        name: var("PULLRIN_NAME"),
        icon_url: var("PULLRIN_ICON_URL"),
        github_owner: var("PULLRIN_GITHUB_OWNER"),
        github_repo: var("PULLRIN_GITHUB_REPO"),
        github_token: var("PULLRIN_GITHUB_TOKEN"),
        github_api_url: var("PULLRIN_GITHUB_API_URL"),
        reviewers: var("PULLRIN_GITHUB_REVIEWERS")
            .map(|raw| raw.split(',').map(str::to_string).collect()),
        slack_api_token: var("PULLRIN_SLACK_API_TOKEN"),
        slack_channel: var("PULLRIN_SLACK_CHANNEL"),
        sponsor_api_url: var("PULLRIN_SPONSOR_API_URL"),
        sponsor_template: var("PULLRIN_SPONSOR_TEMPLATE"),
        http_timeout,
        dry_run: None,
    };
    validate(&config)?;
    Ok(config)
}

fn validate(config: &ConfigFile) -> Result<()> {
    if let Some(timeout) = config.http_timeout
        && timeout == 0
    {
        return Err(Error::ConfigValidation(
            "http_timeout must be > 0".to_string(),
        ));
    }
    if let Some(ref template) = config.sponsor_template {
        SponsorTemplate::new(template)?;
    }
    Ok(())
}

fn validate_config(config: &Config) -> Result<()> {
    let required = [
        ("github_owner", "PULLRIN_GITHUB_OWNER", &config.github_owner),
        ("github_repo", "PULLRIN_GITHUB_REPO", &config.github_repo),
        ("github_token", "PULLRIN_GITHUB_TOKEN", &config.github_token),
    ];
    for (key, env, value) in required {
        if value.is_empty() {
            return Err(Error::ConfigValidation(format!(
                "{key} is required (set {env})"
            )));
        }
    }

    if config.http_timeout == 0 {
        return Err(Error::ConfigValidation(
            "http_timeout must be > 0".to_string(),
        ));
    }

    if !config.dry_run {
        if config.slack_api_token.is_none() {
            return Err(Error::ConfigValidation(
                "slack_api_token is required unless --dry-run (set PULLRIN_SLACK_API_TOKEN)"
                    .to_string(),
            ));
        }
        if config.slack_channel.is_none() {
            return Err(Error::ConfigValidation(
                "slack_channel is required unless --dry-run (set PULLRIN_SLACK_CHANNEL)"
                    .to_string(),
            ));
        }
    }
    Ok(())
}

/// Trim entries and drop blanks. Duplicates are kept and shown twice.
pub fn normalize_reviewers(reviewers: Vec<String>) -> Vec<String> {
    let reviewers: Vec<String> = reviewers
        .into_iter()
        .map(|r| r.trim().to_string())
        .filter(|r| !r.is_empty())
        .collect();

    let mut seen = HashSet::new();
    for reviewer in &reviewers {
        if !seen.insert(reviewer.as_str()) {
            warn!(reviewer = %reviewer, "reviewer listed more than once");
        }
    }
    reviewers
}

pub fn merge(file: ConfigFile, env: ConfigFile, cli: &Cli) -> Config {
    Config {
        name: cli
            .name
            .clone()
            .or(env.name)
            .or(file.name)
            .unwrap_or_else(|| DEFAULT_NAME.to_string()),
        icon_url: cli.icon_url.clone().or(env.icon_url).or(file.icon_url),
        github_owner: cli
            .github_owner
            .clone()
            .or(env.github_owner)
            .or(file.github_owner)
            .unwrap_or_default(),
        github_repo: cli
            .github_repo
            .clone()
            .or(env.github_repo)
            .or(file.github_repo)
            .unwrap_or_default(),
        github_token: env.github_token.or(file.github_token).unwrap_or_default(),
        github_api_url: cli
            .github_api_url
            .clone()
            .or(env.github_api_url)
            .or(file.github_api_url)
            .unwrap_or_else(|| DEFAULT_GITHUB_API_URL.to_string()),
        reviewers: normalize_reviewers(
            cli.reviewers
                .clone()
                .or(env.reviewers)
                .or(file.reviewers)
                .unwrap_or_default(),
        ),
        slack_api_token: env.slack_api_token.or(file.slack_api_token),
        slack_channel: cli
            .slack_channel
            .clone()
            .or(env.slack_channel)
            .or(file.slack_channel),
        sponsor_api_url: cli
            .sponsor_url
            .clone()
            .or(env.sponsor_api_url)
            .or(file.sponsor_api_url),
        sponsor_template: env
            .sponsor_template
            .or(file.sponsor_template)
            .unwrap_or_else(|| DEFAULT_SPONSOR_TEMPLATE.to_string()),
        http_timeout: cli
            .http_timeout
            .or(env.http_timeout)
            .or(file.http_timeout)
            .unwrap_or(DEFAULT_HTTP_TIMEOUT),
        dry_run: cli.dry_run || file.dry_run.unwrap_or(false),
    }
}
