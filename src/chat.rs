use std::io::Write;
use std::time::Duration;

use tracing::{debug, info};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::render::Message;

const SLACK_API_URL: &str = "https://slack.com/api";

/// Where rendered messages are delivered.
pub trait ChatSink {
    fn post(&self, message: &Message) -> Result<()>;
}

/// Abstraction over Slack Web API calls for testability.
pub trait SlackClient {
    fn call(&self, method: &str, body: &serde_json::Value) -> Result<serde_json::Value>;
}

struct DefaultSlackClient {
    agent: ureq::Agent,
    token: String,
}

impl SlackClient for DefaultSlackClient {
    fn call(&self, method: &str, body: &serde_json::Value) -> Result<serde_json::Value> {
        let response = self
            .agent
            .post(&format!("{SLACK_API_URL}/{method}"))
            .set("Authorization", &format!("Bearer {}", self.token))
            .set("Content-Type", "application/json; charset=utf-8")
            .send_json(body)
            .map_err(|e| Error::Slack(format!("{method} request failed: {e}")))?;

        let json: serde_json::Value = response
            .into_json()
            .map_err(|e| Error::Slack(format!("failed to parse {method} response: {e}")))?;

        if json.get("ok").and_then(|v| v.as_bool()) != Some(true) {
            let reason = json
                .get("error")
                .and_then(|v| v.as_str())
                .unwrap_or("unknown error");
            return Err(Error::Slack(format!("{method} failed: {reason}")));
        }
        Ok(json)
    }
}

/// Posts messages with `chat.postMessage` under a custom name and icon.
pub struct SlackSink {
    channel: String,
    username: String,
    icon_url: Option<String>,
    client: Box<dyn SlackClient>,
}

impl SlackSink {
    pub fn new(config: &Config) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(config.http_timeout))
            .build();
        Self {
            channel: config.slack_channel.clone().unwrap_or_default(),
            username: config.name.clone(),
            icon_url: config.icon_url.clone(),
            client: Box::new(DefaultSlackClient {
                agent,
                token: config.slack_api_token.clone().unwrap_or_default(),
            }),
        }
    }

    pub fn with_client(
        channel: &str,
        username: &str,
        icon_url: Option<&str>,
        client: Box<dyn SlackClient>,
    ) -> Self {
        Self {
            channel: channel.to_string(),
            username: username.to_string(),
            icon_url: icon_url.map(str::to_string),
            client,
        }
    }
}

impl ChatSink for SlackSink {
    fn post(&self, message: &Message) -> Result<()> {
        let body = build_payload(
            Some(&self.channel),
            &self.username,
            self.icon_url.as_deref(),
            message,
        );
        let response = self.client.call("chat.postMessage", &body)?;
        debug!(ts = ?response.get("ts"), "slack accepted message");
        info!(
            channel = %self.channel,
            attachments = message.attachments.len(),
            "posted to slack"
        );
        Ok(())
    }
}

/// Prints the payload instead of posting it.
pub struct StdoutSink {
    username: String,
    icon_url: Option<String>,
}

impl StdoutSink {
    pub fn new(config: &Config) -> Self {
        Self {
            username: config.name.clone(),
            icon_url: config.icon_url.clone(),
        }
    }
}

impl ChatSink for StdoutSink {
    fn post(&self, message: &Message) -> Result<()> {
        let body = build_payload(None, &self.username, self.icon_url.as_deref(), message);
        let pretty = serde_json::to_string_pretty(&body)
            .map_err(|e| Error::Slack(format!("failed to serialize payload: {e}")))?;
        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "{pretty}")?;
        Ok(())
    }
}

pub fn build_payload(
    channel: Option<&str>,
    username: &str,
    icon_url: Option<&str>,
    message: &Message,
) -> serde_json::Value {
    let mut body = serde_json::json!({
        "text": message.text,
        "username": username,
        "attachments": message.attachments,
    });
    if let Some(channel) = channel {
        body["channel"] = serde_json::Value::from(channel);
    }
    if let Some(icon_url) = icon_url {
        body["icon_url"] = serde_json::Value::from(icon_url);
    }
    body
}
