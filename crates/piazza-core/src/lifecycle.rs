//! Post lifecycle - live/expired status and time remaining.
//!
//! Everything here is a pure function of a post and the instant passed in.
//! Nothing is cached; callers read the clock once per operation and hand the
//! value down.

use std::fmt;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::Post;

const MILLIS_PER_MINUTE: i64 = 60_000;
const MILLIS_PER_SECOND: i64 = 1_000;

/// Whether a post still accepts interactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PostStatus {
    Live,
    Expired,
}

impl PostStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostStatus::Live => "Live",
            PostStatus::Expired => "Expired",
        }
    }
}

impl fmt::Display for PostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Deadline of a post created at `created_at` that lives for `duration_minutes`.
pub fn expiration_for(created_at: DateTime<Utc>, duration_minutes: u32) -> DateTime<Utc> {
    created_at + TimeDelta::minutes(i64::from(duration_minutes))
}

/// `Live` strictly before the deadline, `Expired` from the deadline onwards.
pub fn status(post: &Post, now: DateTime<Utc>) -> PostStatus {
    if now < post.expiration_time {
        PostStatus::Live
    } else {
        PostStatus::Expired
    }
}

/// Whole minutes and leftover whole seconds until a deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemainingTime {
    pub minutes: i64,
    pub seconds: i64,
}

impl fmt::Display for RemainingTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} minutes and {} seconds", self.minutes, self.seconds)
    }
}

/// Time left before `post` expires.
///
/// Only meaningful for live posts. Past the deadline it saturates at zero.
pub fn remaining_time(post: &Post, now: DateTime<Utc>) -> RemainingTime {
    let delta = (post.expiration_time - now).num_milliseconds().max(0);
    RemainingTime {
        minutes: delta / MILLIS_PER_MINUTE,
        seconds: (delta % MILLIS_PER_MINUTE) / MILLIS_PER_SECOND,
    }
}
