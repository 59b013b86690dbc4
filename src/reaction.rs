use std::collections::HashMap;
use std::fmt;

use serde::Deserialize;

/// A reaction left on a pull request, as reported by GitHub's `content` field.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum Reaction {
    ThumbsUp,
    ThumbsDown,
    Laugh,
    Confused,
    Heart,
    Hooray,
    /// Anything outside the scored vocabulary (`rocket`, `eyes`, typos).
    Unrecognized(String),
}

impl Reaction {
    pub fn from_content(content: &str) -> Self {
        match content {
            "+1" => Reaction::ThumbsUp,
            "-1" => Reaction::ThumbsDown,
            "laugh" => Reaction::Laugh,
            "confused" => Reaction::Confused,
            "heart" => Reaction::Heart,
            "hooray" => Reaction::Hooray,
            other => Reaction::Unrecognized(other.to_string()),
        }
    }
}

impl From<String> for Reaction {
    fn from(content: String) -> Self {
        Reaction::from_content(&content)
    }
}

/// Status icon shown next to a reviewer's name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Icon {
    Author,
    ThumbsUp,
    ThumbsDown,
    Smile,
    Confused,
    Heart,
    Tada,
    Pending,
}

impl Icon {
    /// Slack emoji name, without colons.
    pub fn shortcode(self) -> &'static str {
        match self {
            Icon::Author => "god",
            Icon::ThumbsUp => "+1",
            Icon::ThumbsDown => "-1",
            Icon::Smile => "smile",
            Icon::Confused => "confused",
            Icon::Heart => "heart",
            Icon::Tada => "tada",
            Icon::Pending => "space",
        }
    }

    pub fn is_pending(self) -> bool {
        self == Icon::Pending
    }
}

impl fmt::Display for Icon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, ":{}:", self.shortcode())
    }
}

/// Classify a reviewer's state. Authors are exempt from reacting and always
/// get the author icon; everything unscored degrades to pending.
pub fn icon_for(is_author: bool, reaction: Option<&Reaction>) -> Icon {
    if is_author {
        return Icon::Author;
    }
    match reaction {
        Some(Reaction::ThumbsUp) => Icon::ThumbsUp,
        Some(Reaction::ThumbsDown) => Icon::ThumbsDown,
        Some(Reaction::Laugh) => Icon::Smile,
        Some(Reaction::Confused) => Icon::Confused,
        Some(Reaction::Heart) => Icon::Heart,
        Some(Reaction::Hooray) => Icon::Tada,
        Some(Reaction::Unrecognized(_)) | None => Icon::Pending,
    }
}

/// One reaction per user. Later entries replace earlier ones.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReactionSet {
    by_user: HashMap<String, Reaction>,
}

impl ReactionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, user: impl Into<String>, reaction: Reaction) {
        self.by_user.insert(user.into(), reaction);
    }

    pub fn get(&self, user: &str) -> Option<&Reaction> {
        self.by_user.get(user)
    }

    pub fn len(&self) -> usize {
        self.by_user.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_user.is_empty()
    }
}

impl<U: Into<String>> FromIterator<(U, Reaction)> for ReactionSet {
    fn from_iter<I: IntoIterator<Item = (U, Reaction)>>(iter: I) -> Self {
        let mut set = ReactionSet::new();
        for (user, reaction) in iter {
            set.insert(user, reaction);
        }
        set
    }
}
