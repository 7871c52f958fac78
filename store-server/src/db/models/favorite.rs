//! Favorite Mark Model

use super::serde_helpers;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// Presence of a record means "favorited"; absence means not.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Favorite {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<RecordId>,
    #[serde(with = "serde_helpers::record_id")]
    pub owner: RecordId,
    #[serde(with = "serde_helpers::record_id")]
    pub product: RecordId,
}
