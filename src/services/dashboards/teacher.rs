//! 教师仪表盘聚合
//!
//! 讲师/协作者课程 → 引用这些课程的班期 → 班期学生及其进度，
//! 产出教学统计、单课程分析行（选课数、平均进度、提交平均分）
//! 和截断的学生进度扁平列表。

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::collections::{HashMap, HashSet};

use super::DashboardService;
use crate::config::AppConfig;
use crate::models::dashboards::responses::{
    CourseMetricsRow, RecentActivity, StudentProgressRow, TeacherDashboardResponse, TeachingStats,
};
use crate::models::progress::entities::PromotionProgress;
use crate::models::users::entities::UserRole;
use crate::models::{ApiResponse, ServiceError};
use crate::services::progress::structure;
use crate::services::{query_guard, service_error_to_response};
use crate::storage::RecordStore;

// 学生进度扁平列表上限
const STUDENT_PROGRESS_LIMIT: usize = 10;
// 最近活动条目上限
const RECENT_ACTIVITY_LIMIT: usize = 5;

pub async fn compute_teacher_dashboard(
    store: &dyn RecordStore,
    teacher_id: i64,
) -> Result<TeacherDashboardResponse, ServiceError> {
    store
        .find_user_by_id(teacher_id)
        .await?
        .ok_or_else(|| ServiceError::user_not_found(teacher_id))?;

    let courses = store
        .find_courses_by_instructor_or_collaborator(teacher_id)
        .await?;

    let config = AppConfig::get();
    if query_guard::check(
        courses.len(),
        config.dashboard.guard.teacher_course_limit,
        "teacher_courses",
    ) {
        return Ok(query_guard::fallback_teacher_dashboard());
    }

    let course_ids: HashSet<i64> = courses.iter().map(|c| c.id).collect();

    // 收集引用教师课程的班期（按 ID 去重）
    let mut promotions = HashMap::new();
    for course in &courses {
        for promotion in store.find_promotions_containing_course(course.id).await? {
            promotions.entry(promotion.id).or_insert(promotion);
        }
    }

    // 班期进度记录与学生名册
    let mut progress_records: Vec<PromotionProgress> = Vec::new();
    let mut student_names: HashMap<i64, String> = HashMap::new();
    for promotion_id in promotions.keys() {
        let records = store.find_progress_by_promotion(*promotion_id).await?;
        progress_records.extend(records);

        for user in store
            .find_users_by_promotion(*promotion_id, Some(UserRole::Student))
            .await?
        {
            let name = user.display_name.unwrap_or(user.username);
            student_names.insert(user.id, name);
        }
    }

    if query_guard::check(
        progress_records.len(),
        config.dashboard.guard.joined_progress_limit,
        "teacher_joined_progress",
    ) {
        return Ok(query_guard::fallback_teacher_dashboard());
    }

    // 每个 (学生, 教师课程) 的进度条目
    struct JoinedEntry {
        student_id: i64,
        course_id: i64,
        progress_percentage: u8,
        last_activity_at: Option<chrono::DateTime<chrono::Utc>>,
    }

    let mut joined: Vec<JoinedEntry> = Vec::new();
    let mut students: HashSet<i64> = HashSet::new();
    for record in &progress_records {
        for entry in &record.courses {
            if course_ids.contains(&entry.course_id) {
                students.insert(record.student_id);
                joined.push(JoinedEntry {
                    student_id: record.student_id,
                    course_id: entry.course_id,
                    progress_percentage: entry.progress_percentage,
                    last_activity_at: entry.last_activity_at,
                });
            }
        }
    }

    let average_progress = if joined.is_empty() {
        0
    } else {
        let sum: i64 = joined.iter().map(|e| e.progress_percentage as i64).sum();
        ((sum as f64) / (joined.len() as f64)).round() as i64
    };

    // 单课程分析行 + 待评分计数
    let mut course_metrics = Vec::with_capacity(courses.len());
    let mut pending_grading: i64 = 0;
    for course in &courses {
        let entries: Vec<&JoinedEntry> =
            joined.iter().filter(|e| e.course_id == course.id).collect();
        let enrolled_students = entries.len() as i64;
        let course_average = if entries.is_empty() {
            0
        } else {
            let sum: i64 = entries.iter().map(|e| e.progress_percentage as i64).sum();
            ((sum as f64) / (entries.len() as f64)).round() as i64
        };

        // 结构缓存给出课程的练习 ID，再聚合这些练习的提交
        let average_score = match structure::load_course_structure(store, course.id).await? {
            Some(structure) if !structure.exercise_ids.is_empty() => {
                let submissions = store
                    .find_submissions_by_exercise_ids(&structure.exercise_ids)
                    .await?;
                pending_grading += submissions.iter().filter(|s| !s.is_graded()).count() as i64;

                let scores: Vec<f64> = submissions.iter().filter_map(|s| s.score).collect();
                if scores.is_empty() {
                    None
                } else {
                    Some(scores.iter().sum::<f64>() / scores.len() as f64)
                }
            }
            _ => None,
        };

        course_metrics.push(CourseMetricsRow {
            course_id: course.id,
            course_title: course.title.clone(),
            enrolled_students,
            average_progress: course_average,
            average_score,
        });
    }

    let course_titles: HashMap<i64, String> =
        courses.iter().map(|c| (c.id, c.title.clone())).collect();

    // 按最近活动排序的学生进度扁平列表（截断）
    joined.sort_by_key(|e| std::cmp::Reverse(e.last_activity_at));
    let student_progress: Vec<StudentProgressRow> = joined
        .iter()
        .take(STUDENT_PROGRESS_LIMIT)
        .map(|e| StudentProgressRow {
            student_id: e.student_id,
            student_name: student_names
                .get(&e.student_id)
                .cloned()
                .unwrap_or_else(|| format!("学生 {}", e.student_id)),
            course_id: e.course_id,
            course_title: course_titles
                .get(&e.course_id)
                .cloned()
                .unwrap_or_else(|| format!("课程 {}", e.course_id)),
            progress_percentage: e.progress_percentage,
            last_activity_at: e.last_activity_at,
        })
        .collect();

    let recent_activity: Vec<RecentActivity> = joined
        .iter()
        .filter(|e| e.last_activity_at.is_some())
        .take(RECENT_ACTIVITY_LIMIT)
        .map(|e| RecentActivity {
            course_id: e.course_id,
            course_title: course_titles
                .get(&e.course_id)
                .cloned()
                .unwrap_or_else(|| format!("课程 {}", e.course_id)),
            action: "progress_update".to_string(),
            timestamp: e.last_activity_at.unwrap_or_else(chrono::Utc::now),
        })
        .collect();

    Ok(TeacherDashboardResponse {
        teaching_stats: TeachingStats {
            total_courses: courses.len() as i64,
            total_students: students.len() as i64,
            average_progress,
            pending_grading,
        },
        course_metrics,
        recent_activity,
        student_progress,
    })
}

/// HTTP 包装：教师仪表盘始终以当前登录用户为主体
pub async fn get_teacher_dashboard(
    service: &DashboardService,
    request: &HttpRequest,
    teacher_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let provider = service.get_provider();

    match provider.teacher_dashboard(storage.as_ref(), teacher_id).await {
        Ok(response) => Ok(HttpResponse::Ok().json(ApiResponse::success(response, "查询成功"))),
        Err(err) => Ok(service_error_to_response(&err)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::courses::entities::{
        Chapter, ContentItem, ContentKind, Course, CourseStatus, Section,
    };
    use crate::models::progress::entities::CourseProgress;
    use crate::models::promotions::entities::{Promotion, PromotionStatus};
    use crate::models::submissions::entities::ExerciseSubmission;
    use crate::models::users::entities::{User, UserStatus};
    use crate::storage::memory::MemoryRecordStore;

    fn user(id: i64, role: UserRole, promotion_id: Option<i64>) -> User {
        let now = chrono::Utc::now();
        User {
            id,
            username: format!("user{id}"),
            email: format!("user{id}@example.com"),
            role,
            status: UserStatus::Active,
            display_name: Some(format!("用户{id}")),
            current_promotion_id: promotion_id,
            last_login: Some(now),
            created_at: now,
            updated_at: now,
        }
    }

    fn teacher_course(id: i64, instructor_id: i64) -> Course {
        let now = chrono::Utc::now();
        Course {
            id,
            title: format!("课程 {id}"),
            instructor_id,
            collaborator_ids: vec![],
            status: CourseStatus::Published,
            chapters: vec![Chapter {
                id: "c1".to_string(),
                title: "第一章".to_string(),
                sections: vec![Section {
                    id: "s1".to_string(),
                    title: "1.1".to_string(),
                    contents: vec![ContentItem {
                        id: format!("ex-{id}-1"),
                        title: "练习".to_string(),
                        kind: ContentKind::Exercise,
                    }],
                }],
            }],
            created_at: now,
            updated_at: now,
        }
    }

    fn submission(student_id: i64, exercise_id: &str, course_id: i64, score: Option<f64>) -> ExerciseSubmission {
        let now = chrono::Utc::now();
        ExerciseSubmission {
            id: 0,
            student_id,
            exercise_id: exercise_id.to_string(),
            course_id,
            submitted_at: now,
            score,
            is_correct: score.map(|s| s >= 60.0),
            graded_at: score.map(|_| now),
        }
    }

    fn seed_progress(
        store: &MemoryRecordStore,
        promotion_id: i64,
        student_id: i64,
        entries: Vec<(i64, u8)>,
    ) {
        let now = chrono::Utc::now();
        let courses = entries
            .into_iter()
            .map(|(course_id, pct)| {
                let mut entry = CourseProgress::empty(course_id);
                entry.progress_percentage = pct;
                entry.last_activity_at = Some(now);
                entry
            })
            .collect();
        store.insert_progress(crate::models::progress::entities::PromotionProgress {
            id: 0,
            promotion_id,
            student_id,
            courses,
            created_at: now,
            updated_at: now,
        });
    }

    #[tokio::test]
    async fn test_teacher_dashboard_joins_courses_promotions_and_progress() {
        let store = MemoryRecordStore::new();
        store.insert_user(user(1, UserRole::Teacher, None));
        store.insert_user(user(100, UserRole::Student, Some(1)));
        store.insert_user(user(101, UserRole::Student, Some(1)));
        store.insert_course(teacher_course(9401, 1));
        store.insert_promotion(Promotion {
            id: 1,
            name: "2025-P1".to_string(),
            course_ids: vec![9401],
            status: PromotionStatus::Active,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        });
        seed_progress(&store, 1, 100, vec![(9401, 40)]);
        seed_progress(&store, 1, 101, vec![(9401, 60)]);
        store.insert_submission(submission(100, "ex-9401-1", 9401, Some(80.0)));
        store.insert_submission(submission(101, "ex-9401-1", 9401, None));

        let dashboard = compute_teacher_dashboard(&store, 1).await.unwrap();
        let stats = &dashboard.teaching_stats;
        assert_eq!(stats.total_courses, 1);
        assert_eq!(stats.total_students, 2);
        assert_eq!(stats.average_progress, 50);
        assert_eq!(stats.pending_grading, 1);

        assert_eq!(dashboard.course_metrics.len(), 1);
        let metrics = &dashboard.course_metrics[0];
        assert_eq!(metrics.enrolled_students, 2);
        assert_eq!(metrics.average_progress, 50);
        assert_eq!(metrics.average_score, Some(80.0));

        assert_eq!(dashboard.student_progress.len(), 2);
        // 学生名来自名册
        assert!(dashboard
            .student_progress
            .iter()
            .any(|r| r.student_name == "用户100"));
    }

    #[tokio::test]
    async fn test_teacher_with_no_courses_gets_empty_dashboard() {
        let store = MemoryRecordStore::new();
        store.insert_user(user(2, UserRole::Teacher, None));

        let dashboard = compute_teacher_dashboard(&store, 2).await.unwrap();
        assert_eq!(dashboard.teaching_stats.total_courses, 0);
        assert_eq!(dashboard.teaching_stats.total_students, 0);
        assert_eq!(dashboard.teaching_stats.average_progress, 0);
        assert!(dashboard.course_metrics.is_empty());
        assert!(dashboard.student_progress.is_empty());
    }

    #[tokio::test]
    async fn test_guard_trips_on_course_count() {
        let store = MemoryRecordStore::new();
        store.insert_user(user(3, UserRole::Teacher, None));
        for id in 9501..9526 {
            store.insert_course(teacher_course(id, 3)); // 25 门课，阈值 20
        }

        let dashboard = compute_teacher_dashboard(&store, 3).await.unwrap();
        assert_eq!(dashboard.course_metrics.len(), 1);
        assert_eq!(dashboard.teaching_stats.total_courses, 1);
    }

    #[tokio::test]
    async fn test_student_progress_list_is_capped() {
        let store = MemoryRecordStore::new();
        store.insert_user(user(4, UserRole::Teacher, None));
        store.insert_course(teacher_course(9601, 4));
        store.insert_promotion(Promotion {
            id: 2,
            name: "2025-P2".to_string(),
            course_ids: vec![9601],
            status: PromotionStatus::Active,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        });
        for student_id in 200..215 {
            store.insert_user(user(student_id, UserRole::Student, Some(2)));
            seed_progress(&store, 2, student_id, vec![(9601, 50)]);
        }

        let dashboard = compute_teacher_dashboard(&store, 4).await.unwrap();
        assert_eq!(dashboard.student_progress.len(), STUDENT_PROGRESS_LIMIT);
        assert_eq!(dashboard.teaching_stats.total_students, 15);
    }
}
