//! Response shapes for the HTTP layer

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::database::models::{Course, Memo, Review};

/// Seconds as `mm:ss`, or `hh:mm:ss` from one hour up. Absent reads as `00:00`.
pub fn format_timestamp(seconds: Option<i32>) -> String {
    let Some(total) = seconds.filter(|s| *s >= 0) else {
        return "00:00".to_string();
    };
    let (hours, minutes, secs) = (total / 3600, (total % 3600) / 60, total % 60);
    if hours > 0 {
        format!("{:02}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{:02}:{:02}", minutes, secs)
    }
}

/// Edited when the update landed more than a second after creation
pub fn is_modified(created_at: DateTime<Utc>, updated_at: DateTime<Utc>) -> bool {
    (updated_at - created_at).num_milliseconds().abs() > 1000
}

#[derive(Debug, Clone, Serialize)]
pub struct MemoView {
    pub id: Uuid,
    pub course_id: Uuid,
    pub user_id: Uuid,
    pub content: String,
    pub video_timestamp: Option<i32>,
    pub formatted_timestamp: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub is_modified: bool,
}

impl From<Memo> for MemoView {
    fn from(memo: Memo) -> Self {
        Self {
            formatted_timestamp: format_timestamp(memo.video_timestamp),
            is_modified: is_modified(memo.created_at, memo.updated_at),
            id: memo.id,
            course_id: memo.course_id,
            user_id: memo.user_id,
            content: memo.content,
            video_timestamp: memo.video_timestamp,
            created_at: memo.created_at,
            updated_at: memo.updated_at,
        }
    }
}

pub fn memo_views(memos: Vec<Memo>) -> Vec<MemoView> {
    memos.into_iter().map(MemoView::from).collect()
}

/// Aggregate review figures shown next to a course
#[derive(Debug, Clone, Serialize)]
pub struct ReviewSummary {
    pub course_id: Uuid,
    pub average_rating: f64,
    pub review_count: i64,
    pub can_write: bool,
    pub mine: Option<Review>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CourseDetail {
    #[serde(flatten)]
    pub course: Course,
    pub average_rating: f64,
    pub review_count: i64,
}
