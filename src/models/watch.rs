use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// One price-target condition. Inactive rows are kept as history and are
/// never re-armed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Watch {
    #[serde(rename = "_id")]
    pub id: ObjectId,

    /// Transport-supplied owner identity (Telegram user id).
    pub user_id: i64,
    pub symbol: String,

    /// Strictly positive; validated before insert, never mutated after.
    pub target_price: f64,

    pub active: bool,

    pub created_at: i64,
    pub deactivated_at: Option<i64>,
}
