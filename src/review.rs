use std::fmt::Write as _;

use chrono::{DateTime, Local, TimeZone, Utc};
use serde::Serialize;

use crate::reaction::{Icon, ReactionSet, icon_for};

/// Timestamp layout used in footers (RFC 1123 style, numeric offset).
pub const TIMESTAMP_FORMAT: &str = "%a, %d %b %Y %H:%M:%S %z";

#[derive(Debug, Clone, PartialEq)]
pub struct ChangeRequest {
    pub number: u64,
    pub title: String,
    pub author: String,
    pub url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Good,
    Warning,
}

impl Color {
    pub fn as_str(self) -> &'static str {
        match self {
            Color::Good => "good",
            Color::Warning => "warning",
        }
    }
}

/// A Slack legacy attachment: one card per pull request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Attachment {
    pub color: Color,
    pub title: String,
    pub title_link: String,
    pub text: String,
    pub footer: String,
}

/// Review status of a single pull request against the configured reviewers.
#[derive(Debug, Clone, Copy)]
pub struct ReviewStatusItem<'a> {
    change_request: &'a ChangeRequest,
    reactions: &'a ReactionSet,
    reviewers: &'a [String],
    comment_count: u64,
}

impl<'a> ReviewStatusItem<'a> {
    pub fn new(
        change_request: &'a ChangeRequest,
        reactions: &'a ReactionSet,
        reviewers: &'a [String],
        comment_count: u64,
    ) -> Self {
        Self {
            change_request,
            reactions,
            reviewers,
            comment_count,
        }
    }

    pub fn is_author(&self, reviewer: &str) -> bool {
        reviewer == self.change_request.author
    }

    pub fn icon_for(&self, reviewer: &str) -> Icon {
        icon_for(self.is_author(reviewer), self.reactions.get(reviewer))
    }

    /// True when no reviewer is still pending. An empty reviewer list is
    /// trivially complete.
    pub fn is_complete(&self) -> bool {
        self.reviewers
            .iter()
            .all(|reviewer| !self.icon_for(reviewer).is_pending())
    }

    pub fn color(&self) -> Color {
        if self.is_complete() {
            Color::Good
        } else {
            Color::Warning
        }
    }

    pub fn title(&self) -> String {
        let mut title = format!(
            "#{} {}",
            self.change_request.number, self.change_request.title
        );
        if self.comment_count > 0 {
            let _ = write!(title, " :speech_balloon: {}", self.comment_count);
        }
        title
    }

    /// `name :icon: ` per reviewer in list order; the author is emphasized.
    pub fn reaction_table(&self) -> String {
        let mut table = String::new();
        for reviewer in self.reviewers {
            let icon = self.icon_for(reviewer);
            if self.is_author(reviewer) {
                let _ = write!(table, "*{reviewer}* {icon} ");
            } else {
                let _ = write!(table, "{reviewer} {icon} ");
            }
        }
        table
    }

    pub fn footer(&self) -> String {
        self.footer_in(&Local)
    }

    /// Footer with timestamps rendered in `tz`. Equality is judged on the
    /// formatted values, so sub-second edits do not count as updates.
    pub fn footer_in<Tz>(&self, tz: &Tz) -> String
    where
        Tz: TimeZone,
        Tz::Offset: std::fmt::Display,
    {
        let created_at = self
            .change_request
            .created_at
            .with_timezone(tz)
            .format(TIMESTAMP_FORMAT)
            .to_string();
        let updated_at = self
            .change_request
            .updated_at
            .with_timezone(tz)
            .format(TIMESTAMP_FORMAT)
            .to_string();

        if created_at == updated_at {
            format!("Created at {created_at}.")
        } else {
            format!("Created at {created_at}. Updated at {updated_at}.")
        }
    }

    pub fn to_attachment(&self) -> Attachment {
        Attachment {
            color: self.color(),
            title: self.title(),
            title_link: self.change_request.url.clone(),
            text: self.reaction_table(),
            footer: self.footer(),
        }
    }
}
