//! Take lifecycle service: creation and retrieval by id.

use std::sync::Arc;

use metrics::counter;
use thiserror::Error;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::application::repos::{RepoError, TakesRepo};
use crate::domain::{entities::TakeRecord, error::DomainError, takes::NewTake};

#[derive(Debug, Error)]
pub enum TakeError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    /// The supplied id does not parse as an identifier at all.
    #[error("Invalid arguments provided")]
    InvalidId,
    #[error("Post not found")]
    NotFound,
    #[error(transparent)]
    Repo(#[from] RepoError),
}

#[derive(Clone)]
pub struct TakeService {
    takes: Arc<dyn TakesRepo>,
}

impl TakeService {
    pub fn new(takes: Arc<dyn TakesRepo>) -> Self {
        Self { takes }
    }

    /// Validate and persist a new take. The stored record comes back with
    /// its assigned id, zeroed counters, and empty reaction sets.
    pub async fn create(&self, title: &str) -> Result<TakeRecord, TakeError> {
        let take = NewTake::new(title.to_string(), OffsetDateTime::now_utc())?;
        let record = self.takes.insert_take(take).await?;
        counter!("hottake_takes_created_total").increment(1);
        Ok(record)
    }

    pub async fn get(&self, raw_id: &str) -> Result<TakeRecord, TakeError> {
        let id = Uuid::parse_str(raw_id).map_err(|_| TakeError::InvalidId)?;
        match self.takes.find_by_id(id).await? {
            Some(record) => Ok(record),
            None => Err(TakeError::NotFound),
        }
    }
}
