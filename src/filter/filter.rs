use crate::auth::Actor;
use crate::database::models::Course;

use super::filter_where::FilterWhere;
use super::types::{CourseCondition, CourseSearch, SearchType, SqlResult};

/// A conjunction of course conditions.
///
/// The same value drives the SQL `WHERE` clause and in-memory matching, so a
/// filter can be checked without a database.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CourseFilter {
    conditions: Vec<CourseCondition>,
}

impl CourseFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the listing filter for `actor` from the optional search inputs.
    ///
    /// Each category contributes at most one condition and all of them are
    /// ANDed together.
    pub fn build(actor: Option<&Actor>, search: &CourseSearch) -> Self {
        let mut filter = Self::new();

        if let Some(ceiling) = actor.and_then(Actor::level_ceiling) {
            filter.push(CourseCondition::LevelAtMost(ceiling));
        }

        if let Some(kw) = search.kw.as_deref().map(str::trim).filter(|kw| !kw.is_empty()) {
            let needle = kw.to_lowercase();
            match search.search_type.as_deref().and_then(SearchType::parse) {
                Some(SearchType::Title) => {
                    filter.push(CourseCondition::TitleContains(needle));
                }
                Some(SearchType::Instructor) => {
                    filter.push(CourseCondition::InstructorNameContains(needle));
                }
                None => {}
            }
        }

        if let Some(level_id) = search.level_id.filter(|id| *id > 0) {
            filter.push(CourseCondition::LevelEq(level_id));
        }

        filter
    }

    pub fn push(&mut self, condition: CourseCondition) -> &mut Self {
        self.conditions.push(condition);
        self
    }

    pub fn with(mut self, condition: CourseCondition) -> Self {
        self.push(condition);
        self
    }

    pub fn conditions(&self) -> &[CourseCondition] {
        &self.conditions
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn matches(&self, course: &Course) -> bool {
        self.conditions.iter().all(|condition| match condition {
            CourseCondition::LevelAtMost(max) => course.level_id <= *max,
            CourseCondition::LevelEq(level) => course.level_id == *level,
            CourseCondition::TitleContains(needle) => course.title.to_lowercase().contains(needle.as_str()),
            CourseCondition::InstructorNameContains(needle) => {
                course.instructor_name.to_lowercase().contains(needle.as_str())
            }
            CourseCondition::InstructorIs(id) => course.instructor_id == *id,
        })
    }

    /// Render the `WHERE` body with parameters numbered from `$1`
    pub fn to_where_sql(&self) -> SqlResult {
        let (query, params) = FilterWhere::generate(&self.conditions, 0);
        SqlResult { query, params }
    }
}
