#![allow(dead_code)]

use std::cell::RefCell;

use chrono::{TimeZone, Utc};

use pullrin::chat::ChatSink;
use pullrin::config::{Config, DEFAULT_GITHUB_API_URL, DEFAULT_SPONSOR_TEMPLATE};
use pullrin::error::Result;
use pullrin::render::Message;
use pullrin::review::ChangeRequest;

/// Sensible default `Config` for tests. Callers can override fields via struct update syntax.
pub fn default_test_config() -> Config {
    Config {
        name: "pullrin".to_string(),
        icon_url: None,
        github_owner: "acme".to_string(),
        github_repo: "widgets".to_string(),
        github_token: "ghp_test".to_string(),
        github_api_url: DEFAULT_GITHUB_API_URL.to_string(),
        reviewers: vec!["alice".to_string(), "bob".to_string(), "carol".to_string()],
        slack_api_token: Some("xoxb-test".to_string()),
        slack_channel: Some("#reviews".to_string()),
        sponsor_api_url: None,
        sponsor_template: DEFAULT_SPONSOR_TEMPLATE.to_string(),
        http_timeout: 30,
        dry_run: false,
    }
}

pub fn make_change_request(number: u64, title: &str, author: &str) -> ChangeRequest {
    let at = Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap();
    ChangeRequest {
        number,
        title: title.to_string(),
        author: author.to_string(),
        url: format!("https://github.com/acme/widgets/pull/{number}"),
        created_at: at,
        updated_at: at,
    }
}

/// Records every posted message.
#[derive(Default)]
pub struct RecordingSink {
    pub posted: RefCell<Vec<Message>>,
}

impl ChatSink for &RecordingSink {
    fn post(&self, message: &Message) -> Result<()> {
        self.posted.borrow_mut().push(message.clone());
        Ok(())
    }
}
