use std::collections::HashMap;

use tracing::{debug, info, warn};

use crate::chat::ChatSink;
use crate::error::Result;
use crate::render::{Message, render};
use crate::sources::ChangeRequestSource;
use crate::sponsor::Sponsorship;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// A status card was posted for each open pull request.
    Reported { open: usize },
    /// Nothing open; the all-clear message was posted.
    AllClear,
}

pub struct Orchestrator<S, K> {
    source: S,
    sink: K,
    reviewers: Vec<String>,
    sponsorship: Option<Sponsorship>,
}

impl<S: ChangeRequestSource, K: ChatSink> Orchestrator<S, K> {
    pub fn new(source: S, sink: K, reviewers: Vec<String>) -> Self {
        Self {
            source,
            sink,
            reviewers,
            sponsorship: None,
        }
    }

    pub fn with_sponsorship(mut self, sponsorship: Sponsorship) -> Self {
        self.sponsorship = Some(sponsorship);
        self
    }

    /// Fetch everything, then render. Any fetch failure aborts the whole
    /// message; nothing partial is returned.
    pub fn build_message(&self) -> Result<Message> {
        let change_requests = self.source.fetch_open_change_requests()?;
        info!(count = change_requests.len(), "open pull requests");
        if change_requests.is_empty() {
            return Ok(Message::all_clear());
        }

        let mut reactions = HashMap::new();
        let mut comment_counts = HashMap::new();
        for cr in &change_requests {
            debug!(number = cr.number, title = %cr.title, "collecting review status");
            reactions.insert(cr.number, self.source.fetch_reactions(cr.number)?);
            comment_counts.insert(cr.number, self.source.fetch_comment_count(cr.number)?);
        }

        let mut message = render(
            &change_requests,
            &reactions,
            &self.reviewers,
            &comment_counts,
        );
        if let Some(line) = self.sponsorship.as_ref().and_then(Sponsorship::line) {
            message.text = line;
        }
        Ok(message)
    }

    /// Post the report, or the failure sentinel if it could not be built.
    /// A build error is returned after the sentinel goes out.
    pub fn run_once(&self) -> Result<RunOutcome> {
        match self.build_message() {
            Ok(message) => {
                let outcome = if message.is_all_clear() {
                    RunOutcome::AllClear
                } else {
                    RunOutcome::Reported {
                        open: message.attachments.len(),
                    }
                };
                self.sink.post(&message)?;
                Ok(outcome)
            }
            Err(e) => {
                warn!(error = %e, "failed to build report, posting failure notice");
                if let Err(post_err) = self.sink.post(&Message::failure()) {
                    warn!(error = %post_err, "failed to post failure notice");
                }
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::reaction::{Reaction, ReactionSet};
    use crate::render::{ALL_CLEAR_TEXT, FAILURE_TEXT};
    use crate::review::{ChangeRequest, Color};
    use crate::sponsor::{Sponsor, SponsorSource, SponsorTemplate};
    use chrono::{TimeZone, Utc};
    use std::cell::RefCell;

    #[derive(Default)]
    struct MockSource {
        change_requests: Vec<ChangeRequest>,
        reactions: HashMap<u64, Vec<(String, Reaction)>>,
        comments: HashMap<u64, u64>,
        fail_reactions_for: Option<u64>,
        fail_listing: bool,
    }

    impl ChangeRequestSource for MockSource {
        fn fetch_open_change_requests(&self) -> Result<Vec<ChangeRequest>> {
            if self.fail_listing {
                return Err(Error::GitHub("GET /pulls returned 401".to_string()));
            }
            Ok(self.change_requests.clone())
        }

        fn fetch_reactions(&self, number: u64) -> Result<ReactionSet> {
            if self.fail_reactions_for == Some(number) {
                return Err(Error::GitHub(format!("reactions for #{number} failed")));
            }
            Ok(self
                .reactions
                .get(&number)
                .cloned()
                .unwrap_or_default()
                .into_iter()
                .collect())
        }

        fn fetch_comment_count(&self, number: u64) -> Result<u64> {
            Ok(self.comments.get(&number).copied().unwrap_or(0))
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        posted: RefCell<Vec<Message>>,
    }

    impl ChatSink for &RecordingSink {
        fn post(&self, message: &Message) -> Result<()> {
            self.posted.borrow_mut().push(message.clone());
            Ok(())
        }
    }

    struct FixedSponsor;

    impl SponsorSource for FixedSponsor {
        fn fetch(&self) -> Result<Sponsor> {
            Ok(Sponsor {
                name: "ACME".to_string(),
                phrase: "Ship it".to_string(),
            })
        }
    }

    fn make_change_request(number: u64, title: &str, author: &str) -> ChangeRequest {
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

    fn reviewers() -> Vec<String> {
        vec!["alice".to_string(), "bob".to_string(), "carol".to_string()]
    }

    #[test]
    fn test_all_clear_when_nothing_open() {
        let sink = RecordingSink::default();
        let orchestrator = Orchestrator::new(MockSource::default(), &sink, reviewers());

        assert_eq!(orchestrator.run_once().unwrap(), RunOutcome::AllClear);
        let posted = sink.posted.borrow();
        assert_eq!(posted.len(), 1);
        assert_eq!(posted[0].text, ALL_CLEAR_TEXT);
        assert!(posted[0].attachments.is_empty());
    }

    #[test]
    fn test_reports_each_open_pull_request() {
        let source = MockSource {
            change_requests: vec![
                make_change_request(42, "Fix bug", "alice"),
                make_change_request(7, "Add feature", "bob"),
            ],
            reactions: HashMap::from([(
                42,
                vec![
                    ("bob".to_string(), Reaction::ThumbsUp),
                    ("carol".to_string(), Reaction::Heart),
                ],
            )]),
            comments: HashMap::from([(7, 3)]),
            ..Default::default()
        };
        let sink = RecordingSink::default();
        let orchestrator = Orchestrator::new(source, &sink, reviewers());

        assert_eq!(
            orchestrator.run_once().unwrap(),
            RunOutcome::Reported { open: 2 }
        );
        let posted = sink.posted.borrow();
        let message = &posted[0];
        assert_eq!(message.text, "");
        assert_eq!(message.attachments.len(), 2);
        assert_eq!(message.attachments[0].color, Color::Good);
        assert_eq!(message.attachments[0].title, "#42 Fix bug");
        assert_eq!(message.attachments[1].color, Color::Warning);
        assert_eq!(
            message.attachments[1].title,
            "#7 Add feature :speech_balloon: 3"
        );
        assert_eq!(
            message.attachments[1].text,
            "alice :space: *bob* :god: carol :space: "
        );
    }

    #[test]
    fn test_fetch_failure_posts_failure_sentinel_only() {
        let source = MockSource {
            change_requests: vec![
                make_change_request(1, "One", "alice"),
                make_change_request(2, "Two", "alice"),
            ],
            fail_reactions_for: Some(2),
            ..Default::default()
        };
        let sink = RecordingSink::default();
        let orchestrator = Orchestrator::new(source, &sink, reviewers());

        let err = orchestrator.run_once().unwrap_err();
        assert!(err.to_string().contains("reactions for #2 failed"));
        let posted = sink.posted.borrow();
        assert_eq!(posted.len(), 1);
        assert_eq!(posted[0].text, FAILURE_TEXT);
        assert!(posted[0].attachments.is_empty());
    }

    #[test]
    fn test_listing_failure_posts_failure_sentinel() {
        let source = MockSource {
            fail_listing: true,
            ..Default::default()
        };
        let sink = RecordingSink::default();
        let orchestrator = Orchestrator::new(source, &sink, reviewers());

        assert!(orchestrator.run_once().is_err());
        assert_eq!(sink.posted.borrow()[0].text, FAILURE_TEXT);
    }

    #[test]
    fn test_sponsor_line_becomes_summary_text() {
        let source = MockSource {
            change_requests: vec![make_change_request(1, "One", "alice")],
            ..Default::default()
        };
        let sink = RecordingSink::default();
        let orchestrator = Orchestrator::new(source, &sink, reviewers()).with_sponsorship(
            Sponsorship::new(
                Box::new(FixedSponsor),
                SponsorTemplate::new("{{ phrase }} / {{ name }}").unwrap(),
            ),
        );

        let message = orchestrator.build_message().unwrap();
        assert_eq!(message.text, "Ship it / ACME");
        assert_eq!(message.attachments.len(), 1);
    }

    #[test]
    fn test_sponsor_not_used_when_all_clear() {
        let sink = RecordingSink::default();
        let orchestrator = Orchestrator::new(MockSource::default(), &sink, reviewers())
            .with_sponsorship(Sponsorship::new(
                Box::new(FixedSponsor),
                SponsorTemplate::new("{{ name }}").unwrap(),
            ));

        let message = orchestrator.build_message().unwrap();
        assert_eq!(message.text, ALL_CLEAR_TEXT);
    }
}
