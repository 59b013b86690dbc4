use clap::Parser;

/// pullrin — post the review status of open pull requests to Slack
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "pullrin", version, about)]
pub struct Cli {
    /// Path to config file (default: ./pullrin.toml if present)
    #[arg(long)]
    pub config: Option<String>,

    /// Print the Slack payload to stdout instead of posting it
    #[arg(long)]
    pub dry_run: bool,

    /// Repository owner (user or organization)
    #[arg(long)]
    pub github_owner: Option<String>,

    /// Repository name
    #[arg(long)]
    pub github_repo: Option<String>,

    /// GitHub API base URL (for GitHub Enterprise)
    #[arg(long)]
    pub github_api_url: Option<String>,

    /// Comma-separated reviewer logins, in display order
    #[arg(long, value_delimiter = ',')]
    pub reviewers: Option<Vec<String>>,

    /// Slack channel to post to
    #[arg(long)]
    pub slack_channel: Option<String>,

    /// Display name of the posted message
    #[arg(long)]
    pub name: Option<String>,

    /// Icon URL of the posted message
    #[arg(long)]
    pub icon_url: Option<String>,

    /// Sponsor endpoint returning {"name": ..., "phrase": ...}
    #[arg(long)]
    pub sponsor_url: Option<String>,

    /// HTTP timeout in seconds
    #[arg(long)]
    pub http_timeout: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bare() {
        let cli = Cli::parse_from(["pullrin"]);
        assert!(!cli.dry_run);
        assert!(cli.config.is_none());
        assert!(cli.reviewers.is_none());
    }

    #[test]
    fn test_parse_reviewers_list() {
        let cli = Cli::parse_from(["pullrin", "--reviewers", "alice,bob,carol"]);
        assert_eq!(
            cli.reviewers,
            Some(vec![
                "alice".to_string(),
                "bob".to_string(),
                "carol".to_string()
            ])
        );
    }

    #[test]
    fn test_parse_all_overrides() {
        let cli = Cli::parse_from([
            "pullrin",
            "--dry-run",
            "--config",
            "/tmp/pullrin.toml",
            "--github-owner",
            "acme",
            "--github-repo",
            "widgets",
            "--github-api-url",
            "https://ghe.example.com/api/v3",
            "--slack-channel",
            "#reviews",
            "--name",
            "reviewbot",
            "--icon-url",
            "https://example.com/icon.png",
            "--sponsor-url",
            "https://example.com/sponsor",
            "--http-timeout",
            "5",
        ]);
        assert!(cli.dry_run);
        assert_eq!(cli.config.as_deref(), Some("/tmp/pullrin.toml"));
        assert_eq!(cli.github_owner.as_deref(), Some("acme"));
        assert_eq!(cli.github_repo.as_deref(), Some("widgets"));
        assert_eq!(
            cli.github_api_url.as_deref(),
            Some("https://ghe.example.com/api/v3")
        );
        assert_eq!(cli.slack_channel.as_deref(), Some("#reviews"));
        assert_eq!(cli.name.as_deref(), Some("reviewbot"));
        assert_eq!(cli.icon_url.as_deref(), Some("https://example.com/icon.png"));
        assert_eq!(cli.sponsor_url.as_deref(), Some("https://example.com/sponsor"));
        assert_eq!(cli.http_timeout, Some(5));
    }
}
