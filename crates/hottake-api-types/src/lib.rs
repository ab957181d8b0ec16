//! Wire types shared by the hottake server and its clients.
//!
//! The feed endpoint speaks plain JSON arrays of [`Post`]; sort modes travel
//! as lowercase names in query strings and as numeric indices in client-side
//! preference storage. Both representations live here so the two sides can
//! never drift apart.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::OffsetDateTime;
use uuid::Uuid;

/// The six feed orderings, in the order the client's sort button cycles
/// through them. The discriminant is the persisted preference index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortMode {
    New = 0,
    Random = 1,
    Popular = 2,
    Disagreed = 3,
    Agreed = 4,
    Old = 5,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown sort mode `{0}`")]
pub struct UnknownSortMode(pub String);

impl SortMode {
    pub const COUNT: usize = 6;

    const ALL: [SortMode; Self::COUNT] = [
        SortMode::New,
        SortMode::Random,
        SortMode::Popular,
        SortMode::Disagreed,
        SortMode::Agreed,
        SortMode::Old,
    ];

    /// Lowercase name used as the `sort` query parameter.
    pub fn as_str(self) -> &'static str {
        match self {
            SortMode::New => "new",
            SortMode::Random => "random",
            SortMode::Popular => "popular",
            SortMode::Disagreed => "disagreed",
            SortMode::Agreed => "agreed",
            SortMode::Old => "old",
        }
    }

    /// Stable preference index, 0..6.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Restore a mode from a persisted index. Out-of-range values wrap,
    /// matching how the original client treated stale stored preferences.
    pub fn from_index(index: usize) -> Self {
        Self::ALL[index % Self::COUNT]
    }

    /// The mode the sort button advances to.
    pub fn next(self) -> Self {
        Self::from_index(self.index() + 1)
    }

    pub fn parse(name: &str) -> Result<Self, UnknownSortMode> {
        match name.to_ascii_lowercase().as_str() {
            "new" => Ok(SortMode::New),
            "random" => Ok(SortMode::Random),
            "popular" => Ok(SortMode::Popular),
            "disagreed" => Ok(SortMode::Disagreed),
            "agreed" => Ok(SortMode::Agreed),
            "old" => Ok(SortMode::Old),
            other => Err(UnknownSortMode(other.to_string())),
        }
    }
}

impl Default for SortMode {
    fn default() -> Self {
        SortMode::New
    }
}

impl std::str::FromStr for SortMode {
    type Err = UnknownSortMode;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value)
    }
}

impl std::fmt::Display for SortMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single take as it appears on the wire.
///
/// `agree` and `disagree` carry the anonymous identifiers that reacted;
/// `reports` is an opaque log owned by the moderation collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub title: String,
    pub agree: Vec<String>,
    pub disagree: Vec<String>,
    pub votes: i64,
    pub interactions: i64,
    pub reports: serde_json::Value,
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePostRequest {
    pub title: String,
}

/// Error payload returned by every 4xx/5xx response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: String,
}
