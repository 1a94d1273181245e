use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::auth::guard::Owned;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Memo {
    pub id: Uuid,
    pub course_id: Uuid,
    pub user_id: Uuid,
    pub content: String,
    /// Seconds into the course video; fixed once the memo is written
    pub video_timestamp: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Owned for Memo {
    const KIND: &'static str = "memo";

    fn owner_id(&self) -> Uuid {
        self.user_id
    }
}

#[derive(Debug, Clone)]
pub struct NewMemo {
    pub course_id: Uuid,
    pub user_id: Uuid,
    pub content: String,
    pub video_timestamp: Option<i32>,
}
