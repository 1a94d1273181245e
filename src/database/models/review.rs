use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::auth::guard::Owned;
use crate::auth::Actor;
use crate::types::Operation;

pub const MIN_RATING: i32 = 1;
pub const MAX_RATING: i32 = 5;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Review {
    pub id: Uuid,
    pub course_id: Uuid,
    pub user_id: Uuid,
    pub rating: i32,
    pub content: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Owned for Review {
    const KIND: &'static str = "review";

    fn owner_id(&self) -> Uuid {
        self.user_id
    }

    fn admin_override(actor: &Actor, op: Operation) -> bool {
        op == Operation::Delete && actor.role.overrides_review_deletion()
    }
}

#[derive(Debug, Clone)]
pub struct NewReview {
    pub course_id: Uuid,
    pub user_id: Uuid,
    pub rating: i32,
    pub content: Option<String>,
}
