//! 内存存储实现
//!
//! HashMap + RwLock 的 RecordStore 后端，不持久化。
//! 用于单元测试注入隔离的存储实例，也可作为临时部署后端
//! （database.url = "memory"）。

use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;

use crate::errors::{LPSystemError, Result};
use crate::models::{
    courses::entities::Course,
    progress::entities::{CourseProgress, PromotionProgress},
    promotions::entities::Promotion,
    submissions::entities::ExerciseSubmission,
    users::{entities::User, entities::UserRole, responses::UserRoleCounts},
};
use crate::storage::RecordStore;

#[derive(Default)]
pub struct MemoryRecordStore {
    users: RwLock<HashMap<i64, User>>,
    courses: RwLock<HashMap<i64, Course>>,
    promotions: RwLock<HashMap<i64, Promotion>>,
    // 键为 (promotion_id, student_id)
    progress: RwLock<HashMap<(i64, i64), PromotionProgress>>,
    submissions: RwLock<Vec<ExerciseSubmission>>,
    next_progress_id: AtomicI64,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self {
            next_progress_id: AtomicI64::new(1),
            ..Default::default()
        }
    }

    // 以下 insert_* 方法供测试和临时部署初始化数据使用

    pub fn insert_user(&self, user: User) {
        self.users.write().expect("users lock").insert(user.id, user);
    }

    pub fn insert_course(&self, course: Course) {
        self.courses
            .write()
            .expect("courses lock")
            .insert(course.id, course);
    }

    pub fn insert_promotion(&self, promotion: Promotion) {
        self.promotions
            .write()
            .expect("promotions lock")
            .insert(promotion.id, promotion);
    }

    pub fn insert_progress(&self, record: PromotionProgress) {
        let id = record.id.max(self.next_progress_id.fetch_add(1, Ordering::SeqCst));
        let mut record = record;
        record.id = id;
        self.progress
            .write()
            .expect("progress lock")
            .insert((record.promotion_id, record.student_id), record);
    }

    pub fn insert_submission(&self, submission: ExerciseSubmission) {
        self.submissions
            .write()
            .expect("submissions lock")
            .push(submission);
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>> {
        Ok(self.users.read().expect("users lock").get(&id).cloned())
    }

    async fn count_users_by_role(&self) -> Result<UserRoleCounts> {
        let users = self.users.read().expect("users lock");
        let mut counts = UserRoleCounts::default();
        for user in users.values() {
            match user.role {
                UserRole::Student => counts.students += 1,
                UserRole::Teacher => counts.teachers += 1,
                UserRole::Staff => counts.staff += 1,
                UserRole::Admin => counts.admins += 1,
            }
        }
        Ok(counts)
    }

    async fn find_users_by_promotion(
        &self,
        promotion_id: i64,
        role: Option<UserRole>,
    ) -> Result<Vec<User>> {
        let users = self.users.read().expect("users lock");
        let mut result: Vec<User> = users
            .values()
            .filter(|u| u.current_promotion_id == Some(promotion_id))
            .filter(|u| role.as_ref().is_none_or(|r| &u.role == r))
            .cloned()
            .collect();
        result.sort_by_key(|u| u.id);
        Ok(result)
    }

    async fn count_active_users_since(
        &self,
        since: chrono::DateTime<chrono::Utc>,
    ) -> Result<i64> {
        let users = self.users.read().expect("users lock");
        Ok(users
            .values()
            .filter(|u| u.last_login.is_some_and(|t| t >= since))
            .count() as i64)
    }

    async fn find_course_by_id(&self, id: i64) -> Result<Option<Course>> {
        Ok(self.courses.read().expect("courses lock").get(&id).cloned())
    }

    async fn find_courses_by_ids(&self, ids: &[i64]) -> Result<Vec<Course>> {
        let courses = self.courses.read().expect("courses lock");
        Ok(ids
            .iter()
            .filter_map(|id| courses.get(id).cloned())
            .collect())
    }

    async fn find_courses_by_instructor_or_collaborator(
        &self,
        user_id: i64,
    ) -> Result<Vec<Course>> {
        let courses = self.courses.read().expect("courses lock");
        let mut result: Vec<Course> = courses
            .values()
            .filter(|c| c.instructor_id == user_id || c.collaborator_ids.contains(&user_id))
            .cloned()
            .collect();
        result.sort_by_key(|c| c.id);
        Ok(result)
    }

    async fn count_courses(&self) -> Result<i64> {
        Ok(self.courses.read().expect("courses lock").len() as i64)
    }

    async fn find_promotions_containing_course(&self, course_id: i64) -> Result<Vec<Promotion>> {
        let promotions = self.promotions.read().expect("promotions lock");
        let mut result: Vec<Promotion> = promotions
            .values()
            .filter(|p| p.course_ids.contains(&course_id))
            .cloned()
            .collect();
        result.sort_by_key(|p| p.id);
        Ok(result)
    }

    async fn list_promotions(&self, limit: u64) -> Result<Vec<Promotion>> {
        let promotions = self.promotions.read().expect("promotions lock");
        let mut result: Vec<Promotion> = promotions.values().cloned().collect();
        result.sort_by_key(|p| p.id);
        result.truncate(limit as usize);
        Ok(result)
    }

    async fn count_promotions(&self) -> Result<i64> {
        Ok(self.promotions.read().expect("promotions lock").len() as i64)
    }

    async fn count_students_in_promotion(&self, promotion_id: i64) -> Result<i64> {
        let users = self.users.read().expect("users lock");
        Ok(users
            .values()
            .filter(|u| {
                u.current_promotion_id == Some(promotion_id) && u.role == UserRole::Student
            })
            .count() as i64)
    }

    async fn find_or_create_progress(
        &self,
        promotion_id: i64,
        student_id: i64,
    ) -> Result<PromotionProgress> {
        if let Some(existing) = self
            .progress
            .read()
            .expect("progress lock")
            .get(&(promotion_id, student_id))
        {
            return Ok(existing.clone());
        }

        let course_ids = self
            .promotions
            .read()
            .expect("promotions lock")
            .get(&promotion_id)
            .map(|p| p.course_ids.clone())
            .ok_or_else(|| LPSystemError::not_found(format!("班期不存在: {promotion_id}")))?;

        let now = chrono::Utc::now();
        let record = PromotionProgress {
            id: self.next_progress_id.fetch_add(1, Ordering::SeqCst),
            promotion_id,
            student_id,
            courses: course_ids.iter().map(|&id| CourseProgress::empty(id)).collect(),
            created_at: now,
            updated_at: now,
        };

        self.progress
            .write()
            .expect("progress lock")
            .insert((promotion_id, student_id), record.clone());
        Ok(record)
    }

    async fn find_progress_by_promotion(
        &self,
        promotion_id: i64,
    ) -> Result<Vec<PromotionProgress>> {
        let progress = self.progress.read().expect("progress lock");
        let mut result: Vec<PromotionProgress> = progress
            .values()
            .filter(|p| p.promotion_id == promotion_id)
            .cloned()
            .collect();
        result.sort_by_key(|p| p.id);
        Ok(result)
    }

    async fn save_progress(&self, record: PromotionProgress) -> Result<PromotionProgress> {
        let mut record = record;
        record.updated_at = chrono::Utc::now();
        self.progress
            .write()
            .expect("progress lock")
            .insert((record.promotion_id, record.student_id), record.clone());
        Ok(record)
    }

    async fn count_progress_records(&self) -> Result<i64> {
        Ok(self.progress.read().expect("progress lock").len() as i64)
    }

    async fn find_submissions_by_student(
        &self,
        student_id: i64,
    ) -> Result<Vec<ExerciseSubmission>> {
        let submissions = self.submissions.read().expect("submissions lock");
        Ok(submissions
            .iter()
            .filter(|s| s.student_id == student_id)
            .cloned()
            .collect())
    }

    async fn find_submissions_by_exercise_ids(
        &self,
        exercise_ids: &[String],
    ) -> Result<Vec<ExerciseSubmission>> {
        let submissions = self.submissions.read().expect("submissions lock");
        Ok(submissions
            .iter()
            .filter(|s| exercise_ids.contains(&s.exercise_id))
            .cloned()
            .collect())
    }

    async fn count_submissions(&self) -> Result<i64> {
        Ok(self.submissions.read().expect("submissions lock").len() as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::promotions::entities::PromotionStatus;

    fn promotion(id: i64, course_ids: Vec<i64>) -> Promotion {
        let now = chrono::Utc::now();
        Promotion {
            id,
            name: format!("2025-P{id}"),
            course_ids,
            status: PromotionStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_find_or_create_progress_initializes_promotion_courses() {
        let store = MemoryRecordStore::new();
        store.insert_promotion(promotion(1, vec![10, 20]));

        let record = store.find_or_create_progress(1, 100).await.unwrap();
        assert_eq!(record.courses.len(), 2);
        assert!(record.course_progress(10).is_some());
        assert!(record.course_progress(20).is_some());

        // 第二次调用拿到同一条记录
        let again = store.find_or_create_progress(1, 100).await.unwrap();
        assert_eq!(again.id, record.id);
        assert_eq!(store.count_progress_records().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_find_or_create_progress_unknown_promotion_fails() {
        let store = MemoryRecordStore::new();
        assert!(store.find_or_create_progress(9, 100).await.is_err());
    }
}
