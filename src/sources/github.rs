use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::reaction::{Reaction, ReactionSet};
use crate::review::ChangeRequest;

use super::ChangeRequestSource;

const PER_PAGE: usize = 100;
const MAX_PAGES: usize = 10;
const USER_AGENT: &str = concat!("pullrin/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Deserialize)]
struct GhUser {
    login: String,
}

#[derive(Debug, Deserialize)]
struct GhPullRequest {
    number: u64,
    title: String,
    user: GhUser,
    html_url: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct GhReaction {
    user: GhUser,
    content: Reaction,
}

/// Abstraction over the GitHub REST API for testability.
pub trait GitHubClient {
    fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<serde_json::Value>;

    /// Fetch every page of a list endpoint, stopping at the first short page.
    fn get_all(&self, path: &str) -> Result<Vec<serde_json::Value>> {
        let per_page = PER_PAGE.to_string();
        let mut items = Vec::new();
        for page in 1..=MAX_PAGES {
            let page = page.to_string();
            let value = self.get(path, &[("per_page", &per_page), ("page", &page)])?;
            let batch = match value {
                serde_json::Value::Array(batch) => batch,
                other => {
                    return Err(Error::GitHub(format!(
                        "expected a list from {path}, got: {other}"
                    )));
                }
            };
            let len = batch.len();
            items.extend(batch);
            if len < PER_PAGE {
                break;
            }
        }
        Ok(items)
    }
}

/// Real REST client over `ureq` with bearer-token auth.
struct DefaultGitHubClient {
    agent: ureq::Agent,
    api_url: String,
    token: String,
}

impl GitHubClient for DefaultGitHubClient {
    fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<serde_json::Value> {
        let url = format!("{}{path}", self.api_url.trim_end_matches('/'));
        let mut request = self
            .agent
            .get(&url)
            .set("Authorization", &format!("Bearer {}", self.token))
            .set("Accept", "application/vnd.github+json")
            .set("X-GitHub-Api-Version", "2022-11-28")
            .set("User-Agent", USER_AGENT);
        for (key, value) in query {
            request = request.query(key, value);
        }

        match request.call() {
            Ok(response) => response
                .into_json()
                .map_err(|e| Error::GitHub(format!("failed to parse response from {path}: {e}"))),
            Err(ureq::Error::Status(code, response)) => {
                let body = response.into_string().unwrap_or_default();
                Err(Error::GitHub(format!("GET {path} returned {code}: {body}")))
            }
            Err(e) => Err(Error::GitHub(format!("GET {path} failed: {e}"))),
        }
    }
}

pub struct GitHubSource {
    owner: String,
    repo: String,
    client: Box<dyn GitHubClient>,
}

impl GitHubSource {
    pub fn new(config: &Config) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(config.http_timeout))
            .build();
        Self {
            owner: config.github_owner.clone(),
            repo: config.github_repo.clone(),
            client: Box::new(DefaultGitHubClient {
                agent,
                api_url: config.github_api_url.clone(),
                token: config.github_token.clone(),
            }),
        }
    }

    pub fn with_client(owner: &str, repo: &str, client: Box<dyn GitHubClient>) -> Self {
        Self {
            owner: owner.to_string(),
            repo: repo.to_string(),
            client,
        }
    }

    fn repo_path(&self, rest: &str) -> String {
        format!("/repos/{}/{}/{rest}", self.owner, self.repo)
    }

    fn fetch_list<T: DeserializeOwned>(&self, rest: &str) -> Result<Vec<T>> {
        let path = self.repo_path(rest);
        self.client
            .get_all(&path)?
            .into_iter()
            .map(|item| {
                serde_json::from_value(item)
                    .map_err(|e| Error::GitHub(format!("failed to parse {path}: {e}")))
            })
            .collect()
    }

    fn parse_pull_request(pr: GhPullRequest) -> ChangeRequest {
        ChangeRequest {
            number: pr.number,
            title: pr.title,
            author: pr.user.login,
            url: pr.html_url,
            created_at: pr.created_at,
            updated_at: pr.updated_at,
        }
    }
}

impl ChangeRequestSource for GitHubSource {
    fn fetch_open_change_requests(&self) -> Result<Vec<ChangeRequest>> {
        let pulls: Vec<GhPullRequest> = self.fetch_list("pulls?state=open")?;
        let change_requests: Vec<ChangeRequest> =
            pulls.into_iter().map(Self::parse_pull_request).collect();
        debug!(count = change_requests.len(), "fetched open pull requests");
        Ok(change_requests)
    }

    fn fetch_reactions(&self, number: u64) -> Result<ReactionSet> {
        let reactions: Vec<GhReaction> = self.fetch_list(&format!("issues/{number}/reactions"))?;
        let set: ReactionSet = reactions
            .into_iter()
            .map(|r| (r.user.login, r.content))
            .collect();
        debug!(number, users = set.len(), "fetched reactions");
        Ok(set)
    }

    fn fetch_comment_count(&self, number: u64) -> Result<u64> {
        let issue_comments = self
            .client
            .get_all(&self.repo_path(&format!("issues/{number}/comments")))?
            .len();
        let review_comments = self
            .client
            .get_all(&self.repo_path(&format!("pulls/{number}/comments")))?
            .len();
        let count = (issue_comments + review_comments) as u64;
        debug!(number, count, "fetched comment count");
        Ok(count)
    }
}
