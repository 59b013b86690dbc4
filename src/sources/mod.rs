pub mod github;

use crate::error::Result;
use crate::reaction::ReactionSet;
use crate::review::ChangeRequest;

/// Where open pull requests and their review signals come from.
pub trait ChangeRequestSource {
    /// List open pull requests, in the order the host returns them.
    fn fetch_open_change_requests(&self) -> Result<Vec<ChangeRequest>>;

    /// Reactions on the pull request itself, one per user (last wins).
    fn fetch_reactions(&self, number: u64) -> Result<ReactionSet>;

    /// Conversation comments plus review comments.
    fn fetch_comment_count(&self, number: u64) -> Result<u64>;
}
