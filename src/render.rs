use std::collections::HashMap;

use serde::Serialize;

use crate::reaction::ReactionSet;
use crate::review::{Attachment, ChangeRequest, ReviewStatusItem};

/// Posted when no pull request is open.
pub const ALL_CLEAR_TEXT: &str = ":nico:";
/// Posted instead of the report when any fetch fails.
pub const FAILURE_TEXT: &str = ":skull:";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Message {
    pub text: String,
    pub attachments: Vec<Attachment>,
}

impl Message {
    pub fn all_clear() -> Self {
        Self {
            text: ALL_CLEAR_TEXT.to_string(),
            attachments: Vec::new(),
        }
    }

    pub fn failure() -> Self {
        Self {
            text: FAILURE_TEXT.to_string(),
            attachments: Vec::new(),
        }
    }

    pub fn is_all_clear(&self) -> bool {
        self.attachments.is_empty() && self.text == ALL_CLEAR_TEXT
    }
}

/// Render one attachment per pull request, in input order. All data must be
/// fetched beforehand; missing lookups mean no reactions and no comments.
pub fn render(
    change_requests: &[ChangeRequest],
    reactions: &HashMap<u64, ReactionSet>,
    reviewers: &[String],
    comment_counts: &HashMap<u64, u64>,
) -> Message {
    if change_requests.is_empty() {
        return Message::all_clear();
    }

    let empty = ReactionSet::new();
    let attachments = change_requests
        .iter()
        .map(|cr| {
            let reaction_set = reactions.get(&cr.number).unwrap_or(&empty);
            let comment_count = comment_counts.get(&cr.number).copied().unwrap_or(0);
            ReviewStatusItem::new(cr, reaction_set, reviewers, comment_count).to_attachment()
        })
        .collect();

    Message {
        text: String::new(),
        attachments,
    }
}
