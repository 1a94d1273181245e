use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use crate::auth::guard;
use crate::auth::Actor;
use crate::database::models::{Memo, NewMemo};
use crate::database::{CourseStore, MemoStore, RecordStore};
use crate::services::error::{ServiceError, ServiceResult};
use crate::types::Operation;

/// Private per-course notes, optionally pinned to a point in the course video
#[derive(Clone)]
pub struct MemoService {
    store: Arc<dyn RecordStore>,
}

impl MemoService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    pub async fn create(
        &self,
        actor: &Actor,
        course_id: Uuid,
        content: &str,
        video_timestamp: Option<i32>,
    ) -> ServiceResult<Memo> {
        self.require_course(course_id).await?;
        let content = validate_content(content)?;
        if matches!(video_timestamp, Some(t) if t < 0) {
            return Err(ServiceError::validation("video_timestamp", "Video timestamp must not be negative"));
        }

        let memo = self
            .store
            .insert_memo(NewMemo {
                course_id,
                user_id: actor.id,
                content,
                video_timestamp,
            })
            .await?;
        info!(memo = %memo.id, course = %course_id, actor = %actor.id, "created memo");
        Ok(memo)
    }

    pub async fn get(&self, id: Uuid) -> ServiceResult<Memo> {
        guard::resolve(self.store.find_memo(id).await?)
    }

    /// The actor's memos on a course, newest first
    pub async fn list_for_course(&self, actor: &Actor, course_id: Uuid) -> ServiceResult<Vec<Memo>> {
        self.require_course(course_id).await?;
        Ok(self.store.memos_for_course(course_id, actor.id).await?)
    }

    /// The actor's memos on a course in video order; memos without a
    /// timestamp come last
    pub async fn timeline_for_course(&self, actor: &Actor, course_id: Uuid) -> ServiceResult<Vec<Memo>> {
        self.require_course(course_id).await?;
        Ok(self.store.memos_by_timestamp(course_id, actor.id).await?)
    }

    pub async fn list_mine(&self, actor: &Actor) -> ServiceResult<Vec<Memo>> {
        Ok(self.store.memos_for_user(actor.id).await?)
    }

    pub async fn count_for_course(&self, actor: &Actor, course_id: Uuid) -> ServiceResult<i64> {
        self.require_course(course_id).await?;
        Ok(self.store.count_memos(course_id, actor.id).await?)
    }

    /// Replace a memo's content. The video timestamp is never touched.
    pub async fn update(&self, actor: &Actor, id: Uuid, content: &str) -> ServiceResult<Memo> {
        let found = self.store.find_memo(id).await?;
        guard::authorize(actor, found, Operation::Edit)?;
        let content = validate_content(content)?;

        let memo = self.store.update_memo_content(id, &content).await?;
        info!(memo = %id, actor = %actor.id, "updated memo");
        Ok(memo)
    }

    pub async fn delete(&self, actor: &Actor, id: Uuid) -> ServiceResult<()> {
        let found = self.store.find_memo(id).await?;
        guard::authorize(actor, found, Operation::Delete)?;

        self.store.delete_memo(id).await?;
        info!(memo = %id, actor = %actor.id, "deleted memo");
        Ok(())
    }

    async fn require_course(&self, course_id: Uuid) -> ServiceResult<()> {
        guard::resolve(self.store.find_course(course_id).await?).map(|_| ())
    }
}

fn validate_content(content: &str) -> ServiceResult<String> {
    if content.trim().is_empty() {
        return Err(ServiceError::validation("content", "Memo content is required"));
    }
    Ok(content.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Role;
    use crate::testing::TestContext;

    #[tokio::test]
    async fn content_edit_keeps_the_video_timestamp() {
        let ctx = TestContext::new().await;
        let course = ctx.course("Rust", 1).await;
        let svc = ctx.memos();
        let learner = TestContext::actor(&ctx.learner);

        let memo = svc.create(&learner, course.id, "ownership", Some(125)).await.unwrap();
        let edited = svc.update(&learner, memo.id, "borrowing").await.unwrap();

        assert_eq!(edited.content, "borrowing");
        assert_eq!(edited.video_timestamp, Some(125));
        assert_eq!(svc.get(memo.id).await.unwrap().video_timestamp, Some(125));
    }

    #[tokio::test]
    async fn create_validates_input() {
        let ctx = TestContext::new().await;
        let course = ctx.course("Rust", 1).await;
        let svc = ctx.memos();
        let learner = TestContext::actor(&ctx.learner);

        let err = svc.create(&learner, Uuid::new_v4(), "note", None).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));

        let err = svc.create(&learner, course.id, "   ", None).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation { ref field, .. } if field == "content"));

        let err = svc.create(&learner, course.id, "note", Some(-1)).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation { ref field, .. } if field == "video_timestamp"));

        assert_eq!(svc.count_for_course(&learner, course.id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn only_the_author_edits_or_deletes() {
        let ctx = TestContext::new().await;
        let course = ctx.course("Rust", 1).await;
        let svc = ctx.memos();
        let author = TestContext::actor(&ctx.learner);
        let admin = TestContext::actor(&ctx.admin);
        let memo = svc.create(&author, course.id, "mine", None).await.unwrap();

        let err = svc.update(&admin, memo.id, "theirs").await.unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));
        let err = svc.delete(&admin, memo.id).await.unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));

        let err = svc.delete(&admin, Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));

        svc.delete(&author, memo.id).await.unwrap();
        assert!(matches!(svc.get(memo.id).await, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn timeline_puts_untimed_memos_last() {
        let ctx = TestContext::new().await;
        let course = ctx.course("Rust", 1).await;
        let svc = ctx.memos();
        let learner = TestContext::actor(&ctx.learner);

        svc.create(&learner, course.id, "untimed", None).await.unwrap();
        svc.create(&learner, course.id, "late", Some(300)).await.unwrap();
        svc.create(&learner, course.id, "early", Some(5)).await.unwrap();

        let timeline = svc.timeline_for_course(&learner, course.id).await.unwrap();
        let order: Vec<&str> = timeline.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(order, vec!["early", "late", "untimed"]);

        let newest = svc.list_for_course(&learner, course.id).await.unwrap();
        assert_eq!(newest[0].content, "early");
    }

    #[tokio::test]
    async fn listings_are_scoped_to_the_actor() {
        let ctx = TestContext::new().await;
        let rust = ctx.course("Rust", 1).await;
        let go = ctx.course("Go", 1).await;
        let svc = ctx.memos();
        let me = TestContext::actor(&ctx.learner);
        let other = TestContext::actor(&ctx.user("other", Role::Learner, None).await);

        svc.create(&me, rust.id, "a", None).await.unwrap();
        svc.create(&me, go.id, "b", None).await.unwrap();
        svc.create(&other, rust.id, "c", None).await.unwrap();

        assert_eq!(svc.list_for_course(&me, rust.id).await.unwrap().len(), 1);
        assert_eq!(svc.list_mine(&me).await.unwrap().len(), 2);
        assert_eq!(svc.count_for_course(&other, rust.id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn counting_on_a_missing_course_is_not_found() {
        let ctx = TestContext::new().await;
        let me = TestContext::actor(&ctx.learner);

        let err = ctx.memos().count_for_course(&me, Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }
}
