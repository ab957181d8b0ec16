//! Feed query service: deterministic pages of takes keyed by sort and offset.

use std::sync::Arc;

use metrics::counter;
use once_cell::sync::Lazy;
use thiserror::Error;
use uuid::Uuid;

use hottake_api_types::{SortMode, UnknownSortMode};

use crate::application::repos::{FeedPageRequest, RepoError, TakesRepo};
use crate::domain::entities::TakeRecord;

/// Seed substituted when a client does not pin its own random ordering.
/// Stable for the lifetime of the process, so offset paging over `random`
/// stays consistent even for clients that never send a seed.
static PROCESS_SEED: Lazy<String> = Lazy::new(|| Uuid::new_v4().simple().to_string());

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("{0}")]
    UnknownSort(#[from] UnknownSortMode),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

#[derive(Clone)]
pub struct FeedService {
    takes: Arc<dyn TakesRepo>,
    page_size: u32,
}

impl FeedService {
    pub fn new(takes: Arc<dyn TakesRepo>, page_size: u32) -> Self {
        Self { takes, page_size }
    }

    /// Serve one feed page. An omitted sort name means [`SortMode::New`];
    /// an unrecognized one is a client error. Offsets past the end of the
    /// feed yield an empty page, never an error.
    pub async fn list_page(
        &self,
        sort_name: Option<&str>,
        offset: u64,
        seed: Option<&str>,
    ) -> Result<Vec<TakeRecord>, FeedError> {
        let sort = match sort_name {
            Some(name) => SortMode::parse(name)?,
            None => SortMode::default(),
        };

        let request = FeedPageRequest {
            sort,
            offset,
            limit: self.page_size,
            seed: seed.unwrap_or(PROCESS_SEED.as_str()).to_string(),
        };

        let page = self.takes.list_takes(&request).await?;
        counter!("hottake_feed_pages_total", "sort" => sort.as_str()).increment(1);
        Ok(page)
    }
}
