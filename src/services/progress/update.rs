//! 进度更新引擎
//!
//! 把一次增量学习事件合并进学生的单课程进度，并维持
//! progress_percentage 与课程结构一致。
//!
//! 合并语义：
//! - completed_sections / completed_exercises 做集合并集，重复标记
//!   同一小节是幂等的；
//! - time_spent 每次调用累加——同一请求重放对时长不幂等，这是
//!   有意保留并在此注明的不对称，客户端重试以完成集合为准；
//! - last_activity_at 每次成功调用都刷新为当前时间。

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::debug;

use super::{ProgressService, structure};
use crate::models::progress::requests::UpdateProgressRequest;
use crate::models::progress::responses::UpdateProgressResponse;
use crate::models::progress::entities::{CourseProgress, ProgressStatus};
use crate::models::{ApiResponse, ErrorCode, ServiceError};
use crate::services::service_error_to_response;
use crate::storage::RecordStore;

/// 应用一次进度更新
///
/// 前置条件：学生存在且有当前班期，目标课程在班期进度记录里。
/// 失败以 ServiceError 返回（StudentNotEnrolled / CourseNotInPromotion /
/// InvalidUpdateType），不会 panic。
pub async fn apply_update(
    store: &dyn RecordStore,
    student_id: i64,
    course_id: i64,
    update: UpdateProgressRequest,
) -> Result<UpdateProgressResponse, ServiceError> {
    let user = store
        .find_user_by_id(student_id)
        .await?
        .ok_or_else(|| ServiceError::user_not_found(student_id))?;

    let promotion_id = user
        .current_promotion_id
        .ok_or_else(|| ServiceError::student_not_enrolled(student_id))?;

    let mut record = store.find_or_create_progress(promotion_id, student_id).await?;

    let entry = record
        .course_progress_mut(course_id)
        .ok_or_else(|| ServiceError::course_not_in_promotion(course_id))?;

    let now = chrono::Utc::now();
    let mut recompute = false;

    match update.update_type.as_deref() {
        Some(UpdateProgressRequest::TYPE_SECTION_COMPLETE) => {
            let section_id = update.section_id.clone().ok_or_else(|| {
                ServiceError::new(ErrorCode::BadRequest, "section_complete 缺少 section_id")
            })?;
            entry.completed_sections.insert(section_id);
            entry.time_spent += update.time_spent.unwrap_or(0).max(0);
            recompute = true;
        }
        Some(UpdateProgressRequest::TYPE_EXERCISE_COMPLETE) => {
            let exercise_id = update.exercise_id.clone().ok_or_else(|| {
                ServiceError::new(ErrorCode::BadRequest, "exercise_complete 缺少 exercise_id")
            })?;
            if let Some(meta) = structure::find_exercise_meta(&exercise_id) {
                debug!("完成练习 '{}' (课程 {})", meta.title, meta.course_id);
            }
            entry.completed_exercises.insert(exercise_id);
            entry.time_spent += update.time_spent.unwrap_or(0).max(0);
            recompute = true;
        }
        Some(other) => {
            return Err(ServiceError::invalid_update_type(other));
        }
        None => {
            // 无类型的部分合并：集合取并集，时长累加，
            // 显式给出的百分比直接采用（不重算）
            if let Some(sections) = update.completed_sections {
                entry.completed_sections.extend(sections);
            }
            if let Some(exercises) = update.completed_exercises {
                entry.completed_exercises.extend(exercises);
            }
            entry.time_spent += update.time_spent.unwrap_or(0).max(0);
            if let Some(percentage) = update.progress_percentage {
                entry.progress_percentage = percentage.min(100);
            }
        }
    }

    entry.last_activity_at = Some(now);

    if recompute {
        recompute_percentage(store, course_id, entry).await;
    }

    // 百分比驱动课程状态；dropped 由运营流程设置，这里不碰
    if entry.status != ProgressStatus::Dropped {
        entry.status = if entry.progress_percentage >= 100 {
            ProgressStatus::Completed
        } else {
            ProgressStatus::Active
        };
    }

    let response = UpdateProgressResponse {
        course_id,
        progress_percentage: entry.progress_percentage,
        time_spent: entry.time_spent,
        completed_sections: entry.completed_sections.len() as u32,
        completed_exercises: entry.completed_exercises.len() as u32,
        last_activity_at: now,
    };

    store.save_progress(record).await?;

    Ok(response)
}

/// 按课程结构重算百分比
///
/// progress_percentage = min(100, round(100 * 已完成小节数 / 小节总数))。
/// 结构加载失败或课程无小节时保持原值不变，不让结构问题
/// 阻塞进度记录本身。
async fn recompute_percentage(
    store: &dyn RecordStore,
    course_id: i64,
    entry: &mut CourseProgress,
) {
    let structure = match structure::load_course_structure(store, course_id).await {
        Ok(Some(s)) => s,
        Ok(None) => {
            debug!("课程 {} 结构缺失，保持原百分比", course_id);
            return;
        }
        Err(e) => {
            debug!("课程 {} 结构加载失败: {}，保持原百分比", course_id, e);
            return;
        }
    };

    if structure.total_sections == 0 {
        return;
    }

    let completed = entry.completed_sections.len() as f64;
    let total = structure.total_sections as f64;
    let percentage = (100.0 * completed / total).round().min(100.0);
    entry.progress_percentage = percentage as u8;

    entry.total_chapters = structure.total_chapters;
    entry.chapters_completed = structure
        .section_ids_by_chapter
        .iter()
        .filter(|sections| {
            !sections.is_empty()
                && sections
                    .iter()
                    .all(|id| entry.completed_sections.contains(id))
        })
        .count() as u32;
}

/// HTTP 包装：状态码映射在这里完成
pub async fn update_student_progress(
    service: &ProgressService,
    request: &HttpRequest,
    student_id: i64,
    course_id: i64,
    payload: UpdateProgressRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match apply_update(storage.as_ref(), student_id, course_id, payload).await {
        Ok(response) => Ok(HttpResponse::Ok().json(ApiResponse::success(response, "更新成功"))),
        Err(err) => Ok(service_error_to_response(&err)),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::models::courses::entities::{
        Chapter, ContentItem, ContentKind, Course, CourseStatus, Section,
    };
    use crate::models::promotions::entities::{Promotion, PromotionStatus};
    use crate::models::users::entities::{User, UserRole, UserStatus};
    use crate::storage::memory::MemoryRecordStore;

    fn student(id: i64, promotion_id: Option<i64>) -> User {
        let now = chrono::Utc::now();
        User {
            id,
            username: format!("student{id}"),
            email: format!("student{id}@example.com"),
            role: UserRole::Student,
            status: UserStatus::Active,
            display_name: None,
            current_promotion_id: promotion_id,
            last_login: Some(now),
            created_at: now,
            updated_at: now,
        }
    }

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

    // section_count 个小节平铺在一个章节里
    fn course(id: i64, section_count: usize) -> Course {
        let now = chrono::Utc::now();
        let sections = (1..=section_count)
            .map(|i| Section {
                id: format!("s{i}"),
                title: format!("小节 {i}"),
                contents: vec![ContentItem {
                    id: format!("ex{i}"),
                    title: format!("练习 {i}"),
                    kind: ContentKind::Exercise,
                }],
            })
            .collect();
        Course {
            id,
            title: format!("课程 {id}"),
            instructor_id: 1,
            collaborator_ids: vec![],
            status: CourseStatus::Published,
            chapters: vec![Chapter {
                id: "c1".to_string(),
                title: "第一章".to_string(),
                sections,
            }],
            created_at: now,
            updated_at: now,
        }
    }

    fn store_with(course_id: i64, section_count: usize) -> MemoryRecordStore {
        let store = MemoryRecordStore::new();
        store.insert_user(student(100, Some(1)));
        store.insert_promotion(promotion(1, vec![course_id]));
        store.insert_course(course(course_id, section_count));
        store
    }

    #[tokio::test]
    async fn test_section_complete_is_idempotent_on_sets_additive_on_time() {
        let store = store_with(8101, 10);

        let first = apply_update(
            &store,
            100,
            8101,
            UpdateProgressRequest::section_complete("s1", 30),
        )
        .await
        .unwrap();
        assert_eq!(first.completed_sections, 1);
        assert_eq!(first.time_spent, 30);
        assert_eq!(first.progress_percentage, 10); // 1/10

        // 重放同一事件：集合不变，时长继续累加
        let second = apply_update(
            &store,
            100,
            8101,
            UpdateProgressRequest::section_complete("s1", 30),
        )
        .await
        .unwrap();
        assert_eq!(second.completed_sections, 1);
        assert_eq!(second.time_spent, 60);
        assert_eq!(second.progress_percentage, 10);
    }

    #[tokio::test]
    async fn test_time_spent_accumulates_over_prior_value() {
        let store = store_with(8102, 10);

        // 先积累 60 分钟
        apply_update(
            &store,
            100,
            8102,
            UpdateProgressRequest::merge(None, None, Some(60), None),
        )
        .await
        .unwrap();

        let result = apply_update(
            &store,
            100,
            8102,
            UpdateProgressRequest::section_complete("s1", 30),
        )
        .await
        .unwrap();
        assert_eq!(result.time_spent, 90);
        assert_eq!(result.completed_sections, 1);
    }

    #[tokio::test]
    async fn test_percentage_stays_within_bounds() {
        let store = store_with(8103, 2);

        // 完成的小节数超过结构里的小节总数（结构后来缩减过的场景）
        for section in ["s1", "s2", "s9"] {
            let result = apply_update(
                &store,
                100,
                8103,
                UpdateProgressRequest::section_complete(section, 5),
            )
            .await
            .unwrap();
            assert!(result.progress_percentage <= 100);
        }

        let record = store.find_or_create_progress(1, 100).await.unwrap();
        let entry = record.course_progress(8103).unwrap();
        assert_eq!(entry.progress_percentage, 100);
    }

    #[tokio::test]
    async fn test_completing_all_sections_marks_completed() {
        let store = store_with(8104, 2);

        apply_update(
            &store,
            100,
            8104,
            UpdateProgressRequest::section_complete("s1", 10),
        )
        .await
        .unwrap();
        let result = apply_update(
            &store,
            100,
            8104,
            UpdateProgressRequest::section_complete("s2", 10),
        )
        .await
        .unwrap();
        assert_eq!(result.progress_percentage, 100);

        let record = store.find_or_create_progress(1, 100).await.unwrap();
        let entry = record.course_progress(8104).unwrap();
        assert_eq!(entry.status, ProgressStatus::Completed);
        assert_eq!(entry.chapters_completed, 1);
        assert_eq!(entry.total_chapters, 1);
    }

    #[tokio::test]
    async fn test_missing_course_structure_leaves_percentage_unchanged() {
        let store = MemoryRecordStore::new();
        store.insert_user(student(100, Some(1)));
        // 班期引用的课程没有对应课程记录
        store.insert_promotion(promotion(1, vec![8105]));

        let result = apply_update(
            &store,
            100,
            8105,
            UpdateProgressRequest::section_complete("s1", 15),
        )
        .await
        .unwrap();
        assert_eq!(result.progress_percentage, 0);
        assert_eq!(result.completed_sections, 1);
        assert_eq!(result.time_spent, 15);
    }

    #[tokio::test]
    async fn test_exercise_complete_merges_exercises() {
        let store = store_with(8106, 4);

        let result = apply_update(
            &store,
            100,
            8106,
            UpdateProgressRequest::exercise_complete("ex1", Some(95.0), 20),
        )
        .await
        .unwrap();
        assert_eq!(result.completed_exercises, 1);
        assert_eq!(result.completed_sections, 0);
        // 百分比按小节算，练习完成不会推进它
        assert_eq!(result.progress_percentage, 0);
    }

    #[tokio::test]
    async fn test_untyped_merge_unions_sets_without_recompute() {
        let store = store_with(8107, 10);

        apply_update(
            &store,
            100,
            8107,
            UpdateProgressRequest::section_complete("s1", 10),
        )
        .await
        .unwrap();

        let sections: BTreeSet<String> =
            ["s1", "s2"].iter().map(|s| s.to_string()).collect();
        let result = apply_update(
            &store,
            100,
            8107,
            UpdateProgressRequest::merge(Some(sections), None, Some(5), Some(42)),
        )
        .await
        .unwrap();
        // 并集：s1 已存在，集合变成 {s1, s2}
        assert_eq!(result.completed_sections, 2);
        // 无类型合并不重算，直接采用显式给出的百分比
        assert_eq!(result.progress_percentage, 42);
        assert_eq!(result.time_spent, 15);
    }

    #[tokio::test]
    async fn test_unknown_user_fails() {
        let store = store_with(8108, 2);
        let err = apply_update(
            &store,
            999,
            8108,
            UpdateProgressRequest::section_complete("s1", 5),
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::UserNotFound);
    }

    #[tokio::test]
    async fn test_student_without_promotion_fails() {
        let store = MemoryRecordStore::new();
        store.insert_user(student(101, None));

        let err = apply_update(
            &store,
            101,
            8109,
            UpdateProgressRequest::section_complete("s1", 5),
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::StudentNotEnrolled);
    }

    #[tokio::test]
    async fn test_course_outside_promotion_fails() {
        let store = store_with(8110, 2);
        let err = apply_update(
            &store,
            100,
            7777,
            UpdateProgressRequest::section_complete("s1", 5),
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::CourseNotInPromotion);
    }

    #[tokio::test]
    async fn test_unknown_update_type_fails() {
        let store = store_with(8111, 2);
        let mut payload = UpdateProgressRequest::section_complete("s1", 5);
        payload.update_type = Some("bogus".to_string());

        let err = apply_update(&store, 100, 8111, payload).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidUpdateType);
    }

    #[tokio::test]
    async fn test_section_complete_without_section_id_fails() {
        let store = store_with(8112, 2);
        let payload = UpdateProgressRequest {
            update_type: Some(UpdateProgressRequest::TYPE_SECTION_COMPLETE.to_string()),
            section_id: None,
            exercise_id: None,
            score: None,
            time_spent: Some(5),
            completed_sections: None,
            completed_exercises: None,
            progress_percentage: None,
        };

        let err = apply_update(&store, 100, 8112, payload).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::BadRequest);
    }
}
