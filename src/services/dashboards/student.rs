//! 学生仪表盘聚合
//!
//! find-or-create 进度记录 → 统计 → 课程行（联课程标题）→
//! 最近活动 → 成就。没有班期的学生返回全零有效载荷而不是错误；
//! 不存在的用户才是错误。

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::collections::HashMap;

use super::DashboardService;
use crate::config::AppConfig;
use crate::models::dashboards::responses::{
    CourseProgressRow, LearningStats, RecentActivity, StudentDashboardResponse,
};
use crate::models::progress::entities::CourseProgress;
use crate::models::submissions::entities::ExerciseSubmission;
use crate::models::{ApiResponse, ServiceError};
use crate::services::{achievements, query_guard, service_error_to_response};
use crate::storage::RecordStore;

// 最近活动条目上限
const RECENT_ACTIVITY_LIMIT: usize = 5;

pub async fn compute_student_dashboard(
    store: &dyn RecordStore,
    student_id: i64,
) -> Result<StudentDashboardResponse, ServiceError> {
    let user = store
        .find_user_by_id(student_id)
        .await?
        .ok_or_else(|| ServiceError::user_not_found(student_id))?;

    // 没有班期不是错误：返回全零有效载荷
    let promotion_id = match user.current_promotion_id {
        Some(id) => id,
        None => return Ok(zero_state()),
    };

    let record = store.find_or_create_progress(promotion_id, student_id).await?;

    let config = AppConfig::get();
    if query_guard::check(
        record.courses.len(),
        config.dashboard.guard.student_enrollment_limit,
        "student_enrollments",
    ) {
        return Ok(query_guard::fallback_student_dashboard());
    }

    let courses = &record.courses;
    let total_courses = courses.len() as i64;
    let completed_courses = courses.iter().filter(|c| c.is_completed()).count() as i64;
    let active_courses = courses.iter().filter(|c| c.is_active()).count() as i64;
    let average_progress = mean_percentage(courses);
    let total_time_spent: i64 = courses.iter().map(|c| c.time_spent).sum();

    let titles = load_course_titles(store, courses).await?;

    let course_progress: Vec<CourseProgressRow> = courses
        .iter()
        .map(|c| CourseProgressRow {
            course_id: c.course_id,
            course_title: title_of(&titles, c.course_id),
            progress_percentage: c.progress_percentage,
            completed_sections: c.completed_sections.len() as u32,
            completed_exercises: c.completed_exercises.len() as u32,
            time_spent: c.time_spent,
            last_activity_at: c.last_activity_at,
        })
        .collect();

    let recent_activity = build_recent_activity(courses, &titles);
    let weekly_progress_estimated =
        estimate_weekly_progress(courses, config.dashboard.assumed_sections_per_course);

    let mut achievements = achievements::evaluate_course_achievements(
        completed_courses,
        total_courses,
        average_progress,
    );

    // 练习类成就从提交记录派生
    let submissions = store.find_submissions_by_student(student_id).await?;
    let completed_exercises: i64 = courses
        .iter()
        .map(|c| c.completed_exercises.len() as i64)
        .sum();
    let scored: Vec<f64> = submissions.iter().filter_map(|s| s.score).collect();
    let average_score = if scored.is_empty() {
        None
    } else {
        Some(scored.iter().sum::<f64>() / scored.len() as f64)
    };
    achievements.extend(achievements::evaluate_exercise_achievements(
        completed_exercises,
        submission_day_streak(&submissions),
        average_score,
    ));

    Ok(StudentDashboardResponse {
        learning_stats: LearningStats {
            total_courses,
            active_courses,
            completed_courses,
            average_progress,
            total_time_spent,
            weekly_progress_estimated,
        },
        course_progress,
        recent_activity,
        achievements,
    })
}

fn zero_state() -> StudentDashboardResponse {
    StudentDashboardResponse {
        learning_stats: LearningStats {
            total_courses: 0,
            active_courses: 0,
            completed_courses: 0,
            average_progress: 0,
            total_time_spent: 0,
            weekly_progress_estimated: 0,
        },
        course_progress: vec![],
        recent_activity: vec![],
        achievements: vec![],
    }
}

fn mean_percentage(courses: &[CourseProgress]) -> i64 {
    if courses.is_empty() {
        return 0;
    }
    let sum: i64 = courses.iter().map(|c| c.progress_percentage as i64).sum();
    ((sum as f64) / (courses.len() as f64)).round() as i64
}

/// 周进度启发式：最近 7 天有活动的课程按小节完成度加权后的占比
///
/// 聚合路径不加载课程结构，分母用配置的每课程小节数假设值，
/// 单门课程的权重封顶 1.0。粗粒度估计，不是真实的周学习量测量，
/// 字段名带 estimated 后缀。
fn estimate_weekly_progress(courses: &[CourseProgress], assumed_sections_per_course: u32) -> i64 {
    if courses.is_empty() {
        return 0;
    }
    let week_ago = chrono::Utc::now() - chrono::Duration::days(7);
    let assumed = assumed_sections_per_course.max(1) as f64;
    let credit: f64 = courses
        .iter()
        .filter(|c| c.last_activity_at.is_some_and(|t| t >= week_ago))
        .map(|c| (c.completed_sections.len() as f64 / assumed).min(1.0))
        .sum();
    ((100.0 * credit) / (courses.len() as f64)).round() as i64
}

/// 连续提交天数：从最近一次提交的日期起往回数连续有提交的天数
fn submission_day_streak(submissions: &[ExerciseSubmission]) -> i64 {
    let days: std::collections::BTreeSet<chrono::NaiveDate> = submissions
        .iter()
        .map(|s| s.submitted_at.date_naive())
        .collect();
    let mut cursor = match days.iter().next_back() {
        Some(latest) => *latest,
        None => return 0,
    };
    let mut streak = 0i64;
    while days.contains(&cursor) {
        streak += 1;
        match cursor.pred_opt() {
            Some(prev) => cursor = prev,
            None => break,
        }
    }
    streak
}

pub(super) async fn load_course_titles(
    store: &dyn RecordStore,
    courses: &[CourseProgress],
) -> Result<HashMap<i64, String>, ServiceError> {
    let ids: Vec<i64> = courses.iter().map(|c| c.course_id).collect();
    let found = store.find_courses_by_ids(&ids).await?;
    Ok(found.into_iter().map(|c| (c.id, c.title)).collect())
}

pub(super) fn title_of(titles: &HashMap<i64, String>, course_id: i64) -> String {
    titles
        .get(&course_id)
        .cloned()
        .unwrap_or_else(|| format!("课程 {course_id}"))
}

fn build_recent_activity(
    courses: &[CourseProgress],
    titles: &HashMap<i64, String>,
) -> Vec<RecentActivity> {
    let mut with_activity: Vec<&CourseProgress> = courses
        .iter()
        .filter(|c| c.last_activity_at.is_some())
        .collect();
    with_activity.sort_by_key(|c| std::cmp::Reverse(c.last_activity_at));

    with_activity
        .into_iter()
        .take(RECENT_ACTIVITY_LIMIT)
        .map(|c| RecentActivity {
            course_id: c.course_id,
            course_title: title_of(titles, c.course_id),
            action: if c.is_completed() {
                "course_completed".to_string()
            } else {
                "progress_update".to_string()
            },
            timestamp: c.last_activity_at.unwrap_or_else(chrono::Utc::now),
        })
        .collect()
}

/// HTTP 包装
pub async fn get_student_dashboard(
    service: &DashboardService,
    request: &HttpRequest,
    student_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let provider = service.get_provider();

    match provider.student_dashboard(storage.as_ref(), student_id).await {
        Ok(response) => Ok(HttpResponse::Ok().json(ApiResponse::success(response, "查询成功"))),
        Err(err) => Ok(service_error_to_response(&err)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ErrorCode;
    use crate::models::courses::entities::{Course, CourseStatus};
    use crate::models::progress::entities::{PromotionProgress, ProgressStatus};
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
            display_name: Some(format!("学生{id}")),
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

    fn bare_course(id: i64, title: &str) -> Course {
        let now = chrono::Utc::now();
        Course {
            id,
            title: title.to_string(),
            instructor_id: 1,
            collaborator_ids: vec![],
            status: CourseStatus::Published,
            chapters: vec![],
            created_at: now,
            updated_at: now,
        }
    }

    fn progress_entry(course_id: i64, percentage: u8) -> CourseProgress {
        let mut entry = CourseProgress::empty(course_id);
        entry.progress_percentage = percentage;
        entry.last_activity_at = Some(chrono::Utc::now());
        entry.status = if percentage >= 100 {
            ProgressStatus::Completed
        } else {
            ProgressStatus::Active
        };
        entry
    }

    fn seed_progress(store: &MemoryRecordStore, promotion_id: i64, student_id: i64, entries: Vec<CourseProgress>) {
        let now = chrono::Utc::now();
        store.insert_progress(PromotionProgress {
            id: 0,
            promotion_id,
            student_id,
            courses: entries,
            created_at: now,
            updated_at: now,
        });
    }

    #[tokio::test]
    async fn test_zero_state_for_student_without_promotion() {
        let store = MemoryRecordStore::new();
        store.insert_user(student(100, None));

        let dashboard = compute_student_dashboard(&store, 100).await.unwrap();
        assert_eq!(dashboard.learning_stats.total_courses, 0);
        assert_eq!(dashboard.learning_stats.average_progress, 0);
        assert!(dashboard.course_progress.is_empty());
        assert!(dashboard.recent_activity.is_empty());
        assert!(dashboard.achievements.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_student_is_an_error() {
        let store = MemoryRecordStore::new();
        let err = compute_student_dashboard(&store, 999).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::UserNotFound);
    }

    #[tokio::test]
    async fn test_worked_example_80_and_100_percent() {
        let store = MemoryRecordStore::new();
        store.insert_user(student(100, Some(1)));
        store.insert_promotion(promotion(1, vec![11, 12]));
        store.insert_course(bare_course(11, "Rust 入门"));
        store.insert_course(bare_course(12, "网络编程"));
        seed_progress(
            &store,
            1,
            100,
            vec![progress_entry(11, 80), progress_entry(12, 100)],
        );

        let dashboard = compute_student_dashboard(&store, 100).await.unwrap();
        let stats = &dashboard.learning_stats;
        assert_eq!(stats.total_courses, 2);
        assert_eq!(stats.active_courses, 1);
        assert_eq!(stats.completed_courses, 1);
        assert_eq!(stats.average_progress, 90);

        let ids: Vec<&str> = dashboard
            .achievements
            .iter()
            .map(|a| a.id.as_str())
            .collect();
        assert_eq!(ids, vec!["course_completer"]);

        // 课程行联上了标题
        let row = dashboard
            .course_progress
            .iter()
            .find(|r| r.course_id == 11)
            .unwrap();
        assert_eq!(row.course_title, "Rust 入门");
    }

    #[tokio::test]
    async fn test_guard_trips_at_25_enrollments_with_threshold_20() {
        let store = MemoryRecordStore::new();
        store.insert_user(student(100, Some(1)));
        let course_ids: Vec<i64> = (9201..9226).collect(); // 25 门课
        store.insert_promotion(promotion(1, course_ids.clone()));
        seed_progress(
            &store,
            1,
            100,
            course_ids
                .iter()
                .map(|&id| progress_entry(id, 50))
                .collect(),
        );

        let dashboard = compute_student_dashboard(&store, 100).await.unwrap();
        // 降级结果形状：一门课程、一条活动、一个成就
        assert_eq!(dashboard.course_progress.len(), 1);
        assert_eq!(dashboard.recent_activity.len(), 1);
        assert_eq!(dashboard.achievements.len(), 1);
        assert_eq!(dashboard.learning_stats.total_courses, 1);
    }

    #[tokio::test]
    async fn test_exercise_achievements_from_submissions() {
        let store = MemoryRecordStore::new();
        store.insert_user(student(100, Some(1)));
        store.insert_promotion(promotion(1, vec![9451]));
        store.insert_course(bare_course(9451, "算法基础"));

        let mut entry = progress_entry(9451, 40);
        entry.completed_exercises.insert("ex-1".to_string());
        seed_progress(&store, 1, 100, vec![entry]);

        // 连续五天各一次提交，平均分 92
        let now = chrono::Utc::now();
        for day in 0..5 {
            store.insert_submission(ExerciseSubmission {
                id: day + 1,
                student_id: 100,
                course_id: 9451,
                exercise_id: format!("ex-{day}"),
                submitted_at: now - chrono::Duration::days(day),
                score: Some(92.0),
                is_correct: Some(true),
                graded_at: Some(now),
            });
        }

        let dashboard = compute_student_dashboard(&store, 100).await.unwrap();
        let ids: Vec<&str> = dashboard
            .achievements
            .iter()
            .map(|a| a.id.as_str())
            .collect();
        assert_eq!(ids, vec!["first_steps", "streak_master", "excellence"]);
    }

    #[test]
    fn test_weekly_progress_weights_recent_courses_by_assumed_sections() {
        let now = chrono::Utc::now();

        let mut recent = CourseProgress::empty(1);
        recent.last_activity_at = Some(now);
        for n in 0..5 {
            recent.completed_sections.insert(format!("s{n}"));
        }

        let mut stale = CourseProgress::empty(2);
        stale.last_activity_at = Some(now - chrono::Duration::days(30));
        for n in 0..10 {
            stale.completed_sections.insert(format!("s{n}"));
        }

        // 近一周活跃的课程按 5/10 小节计入，一个月前的活动不计入
        assert_eq!(estimate_weekly_progress(&[recent.clone()], 10), 50);
        assert_eq!(estimate_weekly_progress(&[recent.clone(), stale], 10), 25);

        // 完成小节数超过假设值时权重封顶
        let mut saturated = recent;
        for n in 5..15 {
            saturated.completed_sections.insert(format!("s{n}"));
        }
        assert_eq!(estimate_weekly_progress(&[saturated], 10), 100);

        assert_eq!(estimate_weekly_progress(&[], 10), 0);
    }

    #[tokio::test]
    async fn test_recent_activity_capped_at_five() {
        let store = MemoryRecordStore::new();
        store.insert_user(student(100, Some(1)));
        let course_ids: Vec<i64> = (9301..9309).collect(); // 8 门课，低于阈值
        store.insert_promotion(promotion(1, course_ids.clone()));
        seed_progress(
            &store,
            1,
            100,
            course_ids
                .iter()
                .map(|&id| progress_entry(id, 30))
                .collect(),
        );

        let dashboard = compute_student_dashboard(&store, 100).await.unwrap();
        assert_eq!(dashboard.recent_activity.len(), 5);
        assert_eq!(dashboard.course_progress.len(), 8);
    }
}
