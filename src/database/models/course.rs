use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::auth::guard::Owned;
use crate::auth::Actor;
use crate::types::Operation;

/// A course as read back from the store, joined with its instructor and
/// enrollment count
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Course {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub level_id: i32,
    pub instructor_id: Uuid,
    pub instructor_name: String,
    pub image_url: Option<String>,
    pub video_url: Option<String>,
    pub enrollment_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Owned for Course {
    const KIND: &'static str = "course";

    fn owner_id(&self) -> Uuid {
        self.instructor_id
    }

    // Admins may edit any course but deleting stays with the instructor
    fn admin_override(actor: &Actor, op: Operation) -> bool {
        op == Operation::Edit && actor.role.overrides_course_edit()
    }
}

/// Writable course attributes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseForm {
    pub title: String,
    #[serde(default)]
    pub content: String,
    pub level_id: i32,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub video_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Level {
    pub id: i32,
    pub name: String,
}
