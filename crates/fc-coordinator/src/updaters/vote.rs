//! Optimistic vote arithmetic
//!
//! A vote toggles or flips the viewer's vote on a post or reply. The cached
//! `points` and `voteStatus` are patched locally:
//!
//! | cached status | vote  | points       | new status |
//! |---------------|-------|--------------|------------|
//! | none          | v     | `p + v`      | `v`        |
//! | v             | v     | `p - v`      | none       |
//! | -v            | v     | `p + 2v`     | `v`        |

use super::{SkipReason, UpdateOutcome};
use crate::documents::{POST_TYPENAME, REPLY_TYPENAME};
use crate::mutation::VoteValue;
use fc_store::{Cache, Fragment, FragmentData};
use serde_json::Value;

const POINTS: &str = "points";
const VOTE_STATUS: &str = "voteStatus";
const READ_FIELDS: &[&str] = &["id", POINTS, VOTE_STATUS];
const WRITE_FIELDS: &[&str] = &[POINTS, VOTE_STATUS];

/// Entity type a vote applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteTarget {
    /// `vote(postId)`
    Post,
    /// `voteReply(replyId)`
    Reply,
}

impl VoteTarget {
    /// Fragment read before patching
    #[must_use]
    pub const fn read_fragment(self) -> Fragment {
        match self {
            Self::Post => Fragment::new(POST_TYPENAME, READ_FIELDS),
            Self::Reply => Fragment::new(REPLY_TYPENAME, READ_FIELDS),
        }
    }

    /// Fragment written by the patch
    #[must_use]
    pub const fn write_fragment(self) -> Fragment {
        match self {
            Self::Post => Fragment::new(POST_TYPENAME, WRITE_FIELDS),
            Self::Reply => Fragment::new(REPLY_TYPENAME, WRITE_FIELDS),
        }
    }
}

/// Points and viewer vote of one entity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoteTally {
    /// Total points
    pub points: i64,
    /// Viewer's current vote
    pub vote_status: Option<VoteValue>,
}

impl VoteTally {
    /// Create tally
    #[inline]
    #[must_use]
    pub const fn new(points: i64, vote_status: Option<VoteValue>) -> Self {
        Self {
            points,
            vote_status,
        }
    }

    /// Read from fragment data; `None` if `points` is not an integer
    ///
    /// A status other than 1 or -1 counts as no vote.
    #[must_use]
    pub fn from_fragment(data: &FragmentData) -> Option<Self> {
        let points = data.get(POINTS)?.as_i64()?;
        let vote_status = data
            .get(VOTE_STATUS)
            .and_then(Value::as_i64)
            .and_then(|status| VoteValue::try_from(status).ok());
        Some(Self::new(points, vote_status))
    }

    /// Tally after the viewer votes `value`
    #[must_use]
    pub fn apply(self, value: VoteValue) -> Self {
        let delta = value.as_i64();
        match self.vote_status {
            Some(current) if current == value => Self::new(self.points.saturating_sub(delta), None),
            Some(_) => Self::new(self.points.saturating_add(2 * delta), Some(value)),
            None => Self::new(self.points.saturating_add(delta), Some(value)),
        }
    }

    /// Fragment data carrying `points` and `voteStatus`
    #[must_use]
    pub fn to_fragment(&self) -> FragmentData {
        let mut data = FragmentData::new();
        data.insert(POINTS.to_string(), Value::from(self.points));
        data.insert(
            VOTE_STATUS.to_string(),
            self.vote_status.map_or(Value::Null, |status| Value::from(status.as_i64())),
        );
        data
    }
}

/// Patch the cached tally of `target` entity `id` for a vote of `value`
pub fn update_vote(cache: &mut dyn Cache, target: VoteTarget, id: i64, value: VoteValue) -> UpdateOutcome {
    let id = id.to_string();
    let Some(data) = cache.read_fragment(&target.read_fragment(), &id) else {
        tracing::debug!(?target, id = %id, "vote target not cached");
        return UpdateOutcome::Skipped(SkipReason::NotCached);
    };
    let Some(tally) = VoteTally::from_fragment(&data) else {
        tracing::debug!(?target, id = %id, "vote target has no readable points");
        return UpdateOutcome::Skipped(SkipReason::IncompleteFragment);
    };

    let next = tally.apply(value);
    cache.write_fragment(&target.write_fragment(), &id, &next.to_fragment());
    tracing::trace!(?target, id = %id, from = tally.points, to = next.points, "vote applied");
    UpdateOutcome::Applied
}

#[cfg(test)]
mod tests {
    use super::*;
    use fc_store::{EntityKey, FieldKey, NormalizedCache};
    use serde_json::json;

    fn cached_post(points: i64, vote_status: Value) -> NormalizedCache {
        let mut cache = NormalizedCache::new();
        cache
            .write_entities(&json!({
                "__typename": "Post",
                "id": 5,
                "title": "hello",
                "points": points,
                "voteStatus": vote_status
            }))
            .unwrap();
        cache
    }

    fn tally_of(cache: &NormalizedCache) -> VoteTally {
        let data = cache.read_fragment(&VoteTarget::Post.read_fragment(), "5").unwrap();
        VoteTally::from_fragment(&data).unwrap()
    }

    #[test]
    fn fresh_upvote() {
        assert_eq!(
            VoteTally::new(10, None).apply(VoteValue::Up),
            VoteTally::new(11, Some(VoteValue::Up))
        );
    }

    #[test]
    fn same_direction_retracts() {
        assert_eq!(
            VoteTally::new(10, Some(VoteValue::Down)).apply(VoteValue::Down),
            VoteTally::new(11, None)
        );
    }

    #[test]
    fn opposite_direction_flips_twice() {
        assert_eq!(
            VoteTally::new(10, Some(VoteValue::Down)).apply(VoteValue::Up),
            VoteTally::new(12, Some(VoteValue::Up))
        );
    }

    #[test]
    fn unknown_status_counts_as_unset() {
        let mut data = FragmentData::new();
        data.insert(POINTS.into(), json!(4));
        data.insert(VOTE_STATUS.into(), json!(0));
        assert_eq!(VoteTally::from_fragment(&data), Some(VoteTally::new(4, None)));
    }

    #[test]
    fn patch_writes_points_and_status_only() {
        let mut cache = cached_post(3, Value::Null);
        let outcome = update_vote(&mut cache, VoteTarget::Post, 5, VoteValue::Up);

        assert_eq!(outcome, UpdateOutcome::Applied);
        assert_eq!(tally_of(&cache), VoteTally::new(4, Some(VoteValue::Up)));
        let key = EntityKey::entity("Post", "5");
        assert_eq!(cache.read_field(&key, &FieldKey::plain("title")), Some(json!("hello")));
    }

    #[test]
    fn non_integer_points_skip_patch() {
        let mut cache = NormalizedCache::new();
        cache
            .write_entities(&json!({"__typename": "Post", "id": 5, "points": "many"}))
            .unwrap();
        let outcome = update_vote(&mut cache, VoteTarget::Post, 5, VoteValue::Up);
        assert_eq!(outcome, UpdateOutcome::Skipped(SkipReason::IncompleteFragment));
        assert_eq!(
            cache.read_field(&EntityKey::entity("Post", "5"), &FieldKey::plain("points")),
            Some(json!("many"))
        );
    }

    #[test]
    fn reply_target_uses_reply_records() {
        let mut cache = NormalizedCache::new();
        cache
            .write_entities(&json!({"__typename": "Reply", "id": 5, "points": 0, "voteStatus": null}))
            .unwrap();
        assert!(update_vote(&mut cache, VoteTarget::Reply, 5, VoteValue::Down).is_applied());
        assert_eq!(
            cache.read_field(&EntityKey::entity("Reply", "5"), &FieldKey::plain("points")),
            Some(json!(-1))
        );
        assert_eq!(
            update_vote(&mut cache, VoteTarget::Post, 5, VoteValue::Down),
            UpdateOutcome::Skipped(SkipReason::NotCached)
        );
    }
}
