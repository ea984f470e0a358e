use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Discussion topics a post can be filed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Topic {
    Politics,
    Health,
    Sport,
    Tech,
}

impl Topic {
    pub const ALL: [Topic; 4] = [Topic::Politics, Topic::Health, Topic::Sport, Topic::Tech];

    pub fn as_str(&self) -> &'static str {
        match self {
            Topic::Politics => "Politics",
            Topic::Health => "Health",
            Topic::Sport => "Sport",
            Topic::Tech => "Tech",
        }
    }

    /// Parse a list of wire names, failing on the first unknown one.
    pub fn parse_list<I, S>(names: I) -> Result<Vec<Topic>, DomainError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        names.into_iter().map(|name| name.as_ref().parse()).collect()
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Topic {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Topic::ALL
            .into_iter()
            .find(|topic| topic.as_str() == s)
            .ok_or_else(|| {
                DomainError::InvalidInput(format!(
                    "Unknown topic '{}', expected one of Politics, Health, Sport, Tech",
                    s
                ))
            })
    }
}
