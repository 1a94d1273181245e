use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::auth::{Actor, Role};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub login: String,
    pub user_name: String,
    pub role: String,
    pub level_id: Option<i32>,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Build the request actor, or `None` when the stored role is unknown
    pub fn to_actor(&self) -> Option<Actor> {
        let role = Role::parse(&self.role)?;
        Some(Actor::new(self.id, self.user_name.clone(), role, self.level_id))
    }
}
