//! Repository traits describing persistence adapters.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use hottake_api_types::SortMode;

use crate::domain::{entities::TakeRecord, takes::NewTake};

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("resource not found")]
    NotFound,
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
    #[error("database timeout")]
    Timeout,
    #[error("store connection is not ready")]
    NotReady,
}

impl RepoError {
    pub fn from_persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }
}

/// One offset-addressed slice of the sorted feed.
///
/// `seed` keys the deterministic shuffle behind [`SortMode::Random`]; every
/// request issued under the same seed sees one consistent ordering, so
/// offset paging partitions the feed without duplicates or gaps.
#[derive(Debug, Clone)]
pub struct FeedPageRequest {
    pub sort: SortMode,
    pub offset: u64,
    pub limit: u32,
    pub seed: String,
}

#[async_trait]
pub trait TakesRepo: Send + Sync {
    async fn list_takes(&self, page: &FeedPageRequest) -> Result<Vec<TakeRecord>, RepoError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<TakeRecord>, RepoError>;

    async fn insert_take(&self, take: NewTake) -> Result<TakeRecord, RepoError>;
}
