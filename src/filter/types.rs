use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Which field a keyword is matched against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchType {
    Title,
    Instructor,
}

impl SearchType {
    /// Unrecognized discriminators yield `None`, meaning "no keyword filter"
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "title" => Some(SearchType::Title),
            "instructor" => Some(SearchType::Instructor),
            _ => None,
        }
    }
}

/// Optional course search inputs as they arrive from a request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseSearch {
    pub search_type: Option<String>,
    pub kw: Option<String>,
    pub level_id: Option<i32>,
}

impl CourseSearch {
    pub fn keyword(search_type: &str, kw: &str) -> Self {
        Self {
            search_type: Some(search_type.to_string()),
            kw: Some(kw.to_string()),
            level_id: None,
        }
    }

    pub fn with_level(mut self, level_id: i32) -> Self {
        self.level_id = Some(level_id);
        self
    }
}

/// One independently testable predicate over courses.
///
/// Text conditions hold the keyword already lower-cased.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CourseCondition {
    LevelAtMost(i32),
    LevelEq(i32),
    TitleContains(String),
    InstructorNameContains(String),
    InstructorIs(Uuid),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CourseOrder {
    #[default]
    Newest,
    MostEnrolled,
    Random,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn to_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone)]
pub struct FilterOrderInfo {
    pub column: &'static str,
    pub sort: SortDirection,
}

/// Positional parameter bound alongside generated SQL
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    Int(i64),
    Text(String),
    Uuid(Uuid),
}

#[derive(Debug, Clone)]
pub struct SqlResult {
    pub query: String,
    pub params: Vec<SqlParam>,
}
