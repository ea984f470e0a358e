//! Topic discovery - filtering and ranking posts filed under a topic.

use std::str::FromStr;

use chrono::{DateTime, Utc};

use crate::domain::{Post, PostView, Topic};
use crate::error::DomainError;
use crate::lifecycle::PostStatus;

/// Maximum number of posts returned by a topic listing.
pub const PAGE_SIZE: usize = 5;

/// Which posts of a topic to list, by status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TopicFilter {
    #[default]
    All,
    Live,
    Expired,
}

impl FromStr for TopicFilter {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(TopicFilter::All),
            "live" => Ok(TopicFilter::Live),
            "expired" => Ok(TopicFilter::Expired),
            other => Err(DomainError::InvalidInput(format!(
                "Unknown filter '{}', expected all, live or expired",
                other
            ))),
        }
    }
}

/// Ranking modifier for a topic listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterestOrder {
    /// The single live post with the highest interest score.
    Highest,
}

impl FromStr for InterestOrder {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "highest" => Ok(InterestOrder::Highest),
            other => Err(DomainError::InvalidInput(format!(
                "Unknown interest order '{}', expected highest",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TopicQuery {
    pub topic: Topic,
    pub filter: TopicFilter,
    pub interest: Option<InterestOrder>,
}

impl TopicQuery {
    pub fn new(topic: Topic) -> Self {
        Self {
            topic,
            filter: TopicFilter::All,
            interest: None,
        }
    }

    pub fn with_filter(mut self, filter: TopicFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn highest_interest(mut self) -> Self {
        self.interest = Some(InterestOrder::Highest);
        self
    }

    /// Most posts this query can return.
    pub fn limit(&self) -> usize {
        match self.interest {
            Some(InterestOrder::Highest) => 1,
            None => PAGE_SIZE,
        }
    }

    /// Wrap a selected post the way this query presents it.
    pub fn view(&self, post: Post) -> PostView {
        match self.interest {
            Some(InterestOrder::Highest) => PostView::summary(post),
            None => PostView::Full(post),
        }
    }
}

/// Pick the posts `query` selects at `now`, in the order they are listed.
///
/// `posts` must be in creation order. With [`InterestOrder::Highest`] the
/// status filter is ignored: only live posts compete and equal scores keep
/// creation order.
pub fn select_posts<I>(posts: I, query: &TopicQuery, now: DateTime<Utc>) -> Vec<Post>
where
    I: IntoIterator<Item = Post>,
{
    let on_topic = posts.into_iter().filter(|post| post.has_topic(query.topic));

    match query.interest {
        Some(InterestOrder::Highest) => {
            let mut live: Vec<Post> = on_topic
                .filter(|post| post.status_at(now) == PostStatus::Live)
                .collect();
            // sort_by is stable, so ties stay in creation order
            live.sort_by(|a, b| b.interest_score.cmp(&a.interest_score));
            live.truncate(query.limit());
            live
        }
        None => on_topic
            .filter(|post| match query.filter {
                TopicFilter::All => true,
                TopicFilter::Live => post.status_at(now) == PostStatus::Live,
                TopicFilter::Expired => post.status_at(now) == PostStatus::Expired,
            })
            .take(query.limit())
            .collect(),
    }
}

/// Run `query` over `posts`; the highest-interest winner comes back as a
/// summary without its ledger.
pub fn select(posts: Vec<Post>, query: &TopicQuery, now: DateTime<Utc>) -> Vec<PostView> {
    select_posts(posts, query, now)
        .into_iter()
        .map(|post| query.view(post))
        .collect()
}
