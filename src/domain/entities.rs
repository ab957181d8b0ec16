//! Domain entities mirrored from persistent storage.

use serde::Serialize;
use time::OffsetDateTime;
use uuid::Uuid;

/// A persisted take.
///
/// `agree` and `disagree` hold the anonymous identifiers that reacted; the
/// reaction collaborator keeps membership unique and disjoint. `reports` is
/// an opaque log owned by moderation and is never inspected by the feed
/// core. `created_at` is assigned once at insertion and serves as the sort
/// key for the chronological modes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TakeRecord {
    pub id: Uuid,
    pub title: String,
    pub agree: Vec<String>,
    pub disagree: Vec<String>,
    pub votes: i64,
    pub interactions: i64,
    pub reports: serde_json::Value,
    pub created_at: OffsetDateTime,
}
