//! Client feed state machine: the accumulated post list, current sort
//! mode, and the "more data available" flag, driven by three triggers —
//! mount, sort-mode change, and load-more.

#![deny(clippy::all, clippy::pedantic)]

use sha2::{Digest, Sha256};
use uuid::Uuid;

use hottake_api_types::{Post, SortMode};

use crate::client::{ApiClient, CliError};
use crate::session::Session;

/// Tag captured when a fetch is issued. A response is applied only while
/// its tag still matches the controller state, so a page that arrives
/// after a sort-mode change is discarded instead of appended to the wrong
/// list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTag {
    epoch: u64,
    sort: SortMode,
}

pub struct FeedController {
    api: ApiClient,
    session: Session,
    seed: String,
    posts: Vec<Post>,
    has_more: bool,
    epoch: u64,
}

impl FeedController {
    pub fn new(api: ApiClient, session: Session) -> Self {
        let seed = shuffle_seed(session.uuid());
        Self {
            api,
            session,
            seed,
            posts: Vec::new(),
            has_more: false,
            epoch: 0,
        }
    }

    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn sort(&self) -> SortMode {
        self.session.sort()
    }

    /// Take over from the initial server-provided page. A persisted
    /// non-default sort preference wins over the initial page and triggers
    /// a fresh page-0 fetch for that mode.
    pub async fn mount(&mut self, initial: Vec<Post>) -> Result<(), CliError> {
        let sort = self.session.sort();
        if sort == SortMode::default() {
            self.posts = initial;
        } else {
            let tag = self.tag(sort);
            let page = self.fetch(sort, 0).await?;
            self.apply_replace(tag, page);
        }
        self.has_more = !self.posts.is_empty();
        Ok(())
    }

    /// Advance to the next sort mode, persist it, and start the feed over
    /// with page 0 of the new ordering.
    pub async fn cycle_sort(&mut self) -> Result<SortMode, CliError> {
        let next = self.session.sort().next();
        self.session.set_sort(next)?;
        // Fence off any fetch still in flight for the previous mode.
        self.epoch += 1;

        let tag = self.tag(next);
        let page = self.fetch(next, 0).await?;
        self.apply_replace(tag, page);
        Ok(next)
    }

    /// Fetch the page after the accumulated posts. Returns `true` when new
    /// posts were appended; once an empty page comes back `has_more` turns
    /// false and no further fetches are issued.
    pub async fn load_more(&mut self) -> Result<bool, CliError> {
        if !self.has_more {
            return Ok(false);
        }

        let sort = self.session.sort();
        let tag = self.tag(sort);
        let offset = self.posts.len();
        let page = self.fetch(sort, offset).await?;
        Ok(self.apply_append(tag, page))
    }

    pub(crate) fn tag(&self, sort: SortMode) -> FetchTag {
        FetchTag {
            epoch: self.epoch,
            sort,
        }
    }

    fn is_current(&self, tag: FetchTag) -> bool {
        tag.epoch == self.epoch && tag.sort == self.session.sort()
    }

    pub(crate) fn apply_replace(&mut self, tag: FetchTag, page: Vec<Post>) {
        if !self.is_current(tag) {
            return;
        }
        self.has_more = !page.is_empty();
        self.posts = page;
    }

    pub(crate) fn apply_append(&mut self, tag: FetchTag, page: Vec<Post>) -> bool {
        if !self.is_current(tag) {
            return false;
        }
        if page.is_empty() {
            self.has_more = false;
            return false;
        }
        self.has_more = true;
        self.posts.extend(page);
        true
    }

    async fn fetch(&self, sort: SortMode, offset: usize) -> Result<Vec<Post>, CliError> {
        let seed = (sort == SortMode::Random).then_some(self.seed.as_str());
        self.api.list_posts(sort, offset, seed).await
    }
}

/// One shuffle per run: the anonymous identity plus a fresh nonce pins the
/// random ordering for this session without repeating it across runs.
fn shuffle_seed(identity: Uuid) -> String {
    let mut hasher = Sha256::new();
    hasher.update(identity.as_bytes());
    hasher.update(Uuid::new_v4().as_bytes());
    let digest = hasher.finalize();
    hex::encode(&digest[..8])
}
