use std::sync::Arc;

use async_trait::async_trait;
use sqlx::{Postgres, QueryBuilder};
use time::OffsetDateTime;
use uuid::Uuid;

use hottake_api_types::SortMode;

use crate::{
    application::repos::{FeedPageRequest, RepoError, TakesRepo},
    domain::{entities::TakeRecord, takes::NewTake},
    infra::{
        error::InfraError,
        gateway::StoreGateway,
    },
};

use super::{PostgresRepositories, map_sqlx_error};

const TAKE_COLUMNS: &str = "id, title, agree, disagree, votes, interactions, reports, created_at";

#[derive(sqlx::FromRow)]
struct TakeRow {
    id: Uuid,
    title: String,
    agree: Vec<String>,
    disagree: Vec<String>,
    votes: i64,
    interactions: i64,
    reports: serde_json::Value,
    created_at: OffsetDateTime,
}

impl From<TakeRow> for TakeRecord {
    fn from(row: TakeRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            agree: row.agree,
            disagree: row.disagree,
            votes: row.votes,
            interactions: row.interactions,
            reports: row.reports,
            created_at: row.created_at,
        }
    }
}

impl PostgresRepositories {
    async fn fetch_feed_page(&self, page: &FeedPageRequest) -> Result<Vec<TakeRecord>, RepoError> {
        let offset: i64 = page
            .offset
            .try_into()
            .map_err(|_| RepoError::invalid_input("offset exceeds supported range"))?;

        let mut qb = QueryBuilder::<Postgres>::new("SELECT ");
        qb.push(TAKE_COLUMNS);
        qb.push(" FROM takes");

        // Every ordering ends in `id` so pagination is total even when the
        // leading sort key ties.
        match page.sort {
            SortMode::New => {
                qb.push(" ORDER BY created_at DESC, id DESC");
            }
            SortMode::Old => {
                qb.push(" ORDER BY created_at ASC, id ASC");
            }
            SortMode::Popular => {
                qb.push(" ORDER BY votes DESC, created_at DESC, id DESC");
            }
            SortMode::Agreed => {
                qb.push(" ORDER BY cardinality(agree) DESC, created_at DESC, id DESC");
            }
            SortMode::Disagreed => {
                qb.push(" ORDER BY cardinality(disagree) DESC, created_at DESC, id DESC");
            }
            SortMode::Random => {
                // One seed pins one shuffle, so consecutive offsets under a
                // fixed seed partition the feed exactly.
                qb.push(" ORDER BY md5(");
                qb.push_bind(page.seed.clone());
                qb.push(" || id::text), id");
            }
        }

        qb.push(" LIMIT ");
        qb.push_bind(i64::from(page.limit));
        qb.push(" OFFSET ");
        qb.push_bind(offset);

        let rows = qb
            .build_query_as::<TakeRow>()
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(TakeRecord::from).collect())
    }

    async fn find_take(&self, id: Uuid) -> Result<Option<TakeRecord>, RepoError> {
        let row = sqlx::query_as::<_, TakeRow>(
            "SELECT id, title, agree, disagree, votes, interactions, reports, created_at \
             FROM takes WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(TakeRecord::from))
    }

    async fn store_take(&self, take: NewTake) -> Result<TakeRecord, RepoError> {
        let row = sqlx::query_as::<_, TakeRow>(
            "INSERT INTO takes (title, created_at) VALUES ($1, $2) \
             RETURNING id, title, agree, disagree, votes, interactions, reports, created_at",
        )
        .bind(take.title)
        .bind(take.created_at)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.into())
    }
}

#[async_trait]
impl TakesRepo for PostgresRepositories {
    async fn list_takes(&self, page: &FeedPageRequest) -> Result<Vec<TakeRecord>, RepoError> {
        self.fetch_feed_page(page).await
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<TakeRecord>, RepoError> {
        self.find_take(id).await
    }

    async fn insert_take(&self, take: NewTake) -> Result<TakeRecord, RepoError> {
        self.store_take(take).await
    }
}

/// [`TakesRepo`] served through the store gateway: every call acquires the
/// shared handle first, so the connection is established lazily on first
/// use and reused by every later request.
pub struct GatewayTakes {
    gateway: Arc<StoreGateway<Arc<PostgresRepositories>>>,
}

impl GatewayTakes {
    pub fn new(gateway: Arc<StoreGateway<Arc<PostgresRepositories>>>) -> Self {
        Self { gateway }
    }

    async fn store(&self) -> Result<Arc<PostgresRepositories>, RepoError> {
        self.gateway.acquire().await.map_err(|err| match err {
            InfraError::StoreNotReady => RepoError::NotReady,
            other => RepoError::from_persistence(other),
        })
    }
}

#[async_trait]
impl TakesRepo for GatewayTakes {
    async fn list_takes(&self, page: &FeedPageRequest) -> Result<Vec<TakeRecord>, RepoError> {
        self.store().await?.fetch_feed_page(page).await
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<TakeRecord>, RepoError> {
        self.store().await?.find_take(id).await
    }

    async fn insert_take(&self, take: NewTake) -> Result<TakeRecord, RepoError> {
        self.store().await?.store_take(take).await
    }
}
