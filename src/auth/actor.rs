use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Level assumed for learners who have not been placed yet
pub const DEFAULT_LEVEL: i32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Learner,
    Instructor,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Learner => "learner",
            Role::Instructor => "instructor",
            Role::Admin => "admin",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "learner" | "role_learner" => Some(Role::Learner),
            "instructor" | "role_instructor" => Some(Role::Instructor),
            "admin" | "role_admin" => Some(Role::Admin),
            _ => None,
        }
    }

    /// Learners only see courses up to their own level
    pub fn has_level_ceiling(&self) -> bool {
        matches!(self, Role::Learner)
    }

    /// Admins may remove any review, whoever wrote it
    pub fn overrides_review_deletion(&self) -> bool {
        matches!(self, Role::Admin)
    }

    /// Admins may edit any course
    pub fn overrides_course_edit(&self) -> bool {
        matches!(self, Role::Admin)
    }

    pub fn can_author_courses(&self) -> bool {
        matches!(self, Role::Instructor | Role::Admin)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The authenticated user a request acts as.
///
/// Services receive this explicitly; nothing looks it up from ambient state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: Uuid,
    pub name: String,
    pub role: Role,
    pub level_id: Option<i32>,
}

impl Actor {
    pub fn new(id: Uuid, name: impl Into<String>, role: Role, level_id: Option<i32>) -> Self {
        Self {
            id,
            name: name.into(),
            role,
            level_id,
        }
    }

    /// Highest course level this actor may list, if any limit applies
    pub fn level_ceiling(&self) -> Option<i32> {
        if self.role.has_level_ceiling() {
            Some(self.level_id.unwrap_or(DEFAULT_LEVEL))
        } else {
            None
        }
    }
}
