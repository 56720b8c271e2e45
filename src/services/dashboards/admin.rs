//! 管理员仪表盘聚合
//!
//! 平台级计数（按角色的用户数、课程/班期/进度/提交总数）、
//! 参与度、课程热度与表现排行，以及静态的协作服务健康块
//! （本服务不做真实健康探测）。

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::collections::HashMap;

use super::DashboardService;
use crate::config::AppConfig;
use crate::models::dashboards::responses::{
    AdminCourseMetrics, AdminDashboardResponse, PlatformStats, PopularCourseRow, SystemHealth,
    TopCourseRow, UserBreakdown,
};
use crate::models::{ApiResponse, ServiceError};
use crate::services::{query_guard, service_error_to_response};
use crate::storage::RecordStore;

// 活跃用户的统计窗口（天）
const ACTIVE_USER_WINDOW_DAYS: i64 = 30;
// 排行榜长度
const COURSE_RANKING_LIMIT: usize = 5;
// 排行聚合触达的班期上限
const PROMOTION_SCAN_LIMIT: u64 = 200;

pub async fn compute_admin_dashboard(
    store: &dyn RecordStore,
) -> Result<AdminDashboardResponse, ServiceError> {
    let role_counts = store.count_users_by_role().await?;
    let total_users = role_counts.total();
    let total_courses = store.count_courses().await?;
    let total_promotions = store.count_promotions().await?;
    let total_progress_records = store.count_progress_records().await?;
    let total_submissions = store.count_submissions().await?;

    let since = chrono::Utc::now() - chrono::Duration::days(ACTIVE_USER_WINDOW_DAYS);
    let active_users = store.count_active_users_since(since).await?;
    let platform_engagement = if total_users > 0 {
        ((100.0 * active_users as f64) / (total_users as f64)).round() as i64
    } else {
        0
    };

    let course_metrics = compute_course_rankings(store).await?;

    Ok(AdminDashboardResponse {
        platform_stats: PlatformStats {
            total_users,
            total_courses,
            total_promotions,
            total_progress_records,
            total_submissions,
            platform_engagement,
        },
        user_breakdown: UserBreakdown {
            students: role_counts.students,
            teachers: role_counts.teachers,
            staff: role_counts.staff,
            admins: role_counts.admins,
        },
        course_metrics,
        system_health: SystemHealth::default(),
    })
}

/// 课程热度（按班期选课人数合计）与表现（按完成率）排行
///
/// 联表部分是管理员视图里唯一可能放大的查询，进度记录数
/// 超阈值时换成最小降级块，计数部分不受影响。
async fn compute_course_rankings(
    store: &dyn RecordStore,
) -> Result<AdminCourseMetrics, ServiceError> {
    let promotions = store.list_promotions(PROMOTION_SCAN_LIMIT).await?;

    // course_id → 合计选课人数
    let mut enrollments: HashMap<i64, i64> = HashMap::new();
    // course_id → (完成数, 进度条目数)
    let mut completion: HashMap<i64, (i64, i64)> = HashMap::new();
    let mut joined_progress = 0usize;

    let config = AppConfig::get();
    for promotion in &promotions {
        let students = store.count_students_in_promotion(promotion.id).await?;
        for course_id in &promotion.course_ids {
            *enrollments.entry(*course_id).or_insert(0) += students;
        }

        let records = store.find_progress_by_promotion(promotion.id).await?;
        joined_progress += records.len();
        if query_guard::check(
            joined_progress,
            config.dashboard.guard.joined_progress_limit,
            "admin_joined_progress",
        ) {
            return Ok(query_guard::fallback_admin_course_metrics());
        }

        for record in &records {
            for entry in &record.courses {
                let slot = completion.entry(entry.course_id).or_insert((0, 0));
                if entry.is_completed() {
                    slot.0 += 1;
                }
                slot.1 += 1;
            }
        }
    }

    let mut popular: Vec<(i64, i64)> = enrollments.into_iter().collect();
    popular.sort_by_key(|(course_id, count)| (std::cmp::Reverse(*count), *course_id));
    popular.truncate(COURSE_RANKING_LIMIT);

    let mut performing: Vec<(i64, i64)> = completion
        .into_iter()
        .map(|(course_id, (completed, total))| {
            let rate = if total > 0 {
                ((100.0 * completed as f64) / (total as f64)).round() as i64
            } else {
                0
            };
            (course_id, rate)
        })
        .collect();
    performing.sort_by_key(|(course_id, rate)| (std::cmp::Reverse(*rate), *course_id));
    performing.truncate(COURSE_RANKING_LIMIT);

    // 联标题
    let mut ids: Vec<i64> = popular.iter().map(|(id, _)| *id).collect();
    ids.extend(performing.iter().map(|(id, _)| *id));
    ids.sort_unstable();
    ids.dedup();
    let titles: HashMap<i64, String> = store
        .find_courses_by_ids(&ids)
        .await?
        .into_iter()
        .map(|c| (c.id, c.title))
        .collect();
    let title_of = |course_id: i64| {
        titles
            .get(&course_id)
            .cloned()
            .unwrap_or_else(|| format!("课程 {course_id}"))
    };

    Ok(AdminCourseMetrics {
        most_popular: popular
            .into_iter()
            .map(|(course_id, count)| PopularCourseRow {
                course_id,
                course_title: title_of(course_id),
                enrollments: count,
            })
            .collect(),
        top_performing: performing
            .into_iter()
            .map(|(course_id, rate)| TopCourseRow {
                course_id,
                course_title: title_of(course_id),
                completion_rate: rate,
            })
            .collect(),
    })
}

/// HTTP 包装
pub async fn get_admin_dashboard(
    service: &DashboardService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let provider = service.get_provider();

    match provider.admin_dashboard(storage.as_ref()).await {
        Ok(response) => Ok(HttpResponse::Ok().json(ApiResponse::success(response, "查询成功"))),
        Err(err) => Ok(service_error_to_response(&err)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::courses::entities::{Course, CourseStatus};
    use crate::models::progress::entities::{CourseProgress, PromotionProgress};
    use crate::models::promotions::entities::{Promotion, PromotionStatus};
    use crate::models::users::entities::{User, UserRole, UserStatus};
    use crate::storage::memory::MemoryRecordStore;

    fn user(id: i64, role: UserRole, promotion_id: Option<i64>, recent_login: bool) -> User {
        let now = chrono::Utc::now();
        User {
            id,
            username: format!("user{id}"),
            email: format!("user{id}@example.com"),
            role,
            status: UserStatus::Active,
            display_name: None,
            current_promotion_id: promotion_id,
            last_login: if recent_login {
                Some(now)
            } else {
                Some(now - chrono::Duration::days(90))
            },
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

    fn seed_progress(
        store: &MemoryRecordStore,
        promotion_id: i64,
        student_id: i64,
        entries: Vec<(i64, u8)>,
    ) {
        let now = chrono::Utc::now();
        store.insert_progress(PromotionProgress {
            id: 0,
            promotion_id,
            student_id,
            courses: entries
                .into_iter()
                .map(|(course_id, pct)| {
                    let mut entry = CourseProgress::empty(course_id);
                    entry.progress_percentage = pct;
                    entry
                })
                .collect(),
            created_at: now,
            updated_at: now,
        });
    }

    #[tokio::test]
    async fn test_admin_dashboard_counts_and_engagement() {
        let store = MemoryRecordStore::new();
        store.insert_user(user(1, UserRole::Admin, None, true));
        store.insert_user(user(2, UserRole::Teacher, None, false));
        store.insert_user(user(100, UserRole::Student, Some(1), true));
        store.insert_user(user(101, UserRole::Student, Some(1), false));
        store.insert_course(bare_course(9701, "热门课"));
        store.insert_promotion(Promotion {
            id: 1,
            name: "2025-P1".to_string(),
            course_ids: vec![9701],
            status: PromotionStatus::Active,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        });
        seed_progress(&store, 1, 100, vec![(9701, 100)]);
        seed_progress(&store, 1, 101, vec![(9701, 20)]);

        let dashboard = compute_admin_dashboard(&store).await.unwrap();
        let stats = &dashboard.platform_stats;
        assert_eq!(stats.total_users, 4);
        assert_eq!(stats.total_courses, 1);
        assert_eq!(stats.total_promotions, 1);
        assert_eq!(stats.total_progress_records, 2);
        // 4 个用户中 2 个在 30 天窗口内登录过
        assert_eq!(stats.platform_engagement, 50);

        assert_eq!(dashboard.user_breakdown.students, 2);
        assert_eq!(dashboard.user_breakdown.teachers, 1);
        assert_eq!(dashboard.user_breakdown.admins, 1);

        // 排行：9701 选课人数 2，完成率 50%
        let popular = &dashboard.course_metrics.most_popular;
        assert_eq!(popular.len(), 1);
        assert_eq!(popular[0].course_id, 9701);
        assert_eq!(popular[0].enrollments, 2);
        assert_eq!(popular[0].course_title, "热门课");

        let performing = &dashboard.course_metrics.top_performing;
        assert_eq!(performing[0].completion_rate, 50);

        // 静态健康块
        assert_eq!(dashboard.system_health.database, "healthy");
    }

    #[tokio::test]
    async fn test_empty_platform_yields_zeroes() {
        let store = MemoryRecordStore::new();
        let dashboard = compute_admin_dashboard(&store).await.unwrap();
        assert_eq!(dashboard.platform_stats.total_users, 0);
        assert_eq!(dashboard.platform_stats.platform_engagement, 0);
        assert!(dashboard.course_metrics.most_popular.is_empty());
        assert!(dashboard.course_metrics.top_performing.is_empty());
    }

    #[tokio::test]
    async fn test_rankings_degrade_when_progress_volume_exceeds_limit() {
        let store = MemoryRecordStore::new();
        store.insert_promotion(Promotion {
            id: 3,
            name: "2025-P3".to_string(),
            course_ids: vec![9801],
            status: PromotionStatus::Active,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        });
        // 105 条进度记录，超过默认阈值 100
        for student_id in 1000..1105 {
            seed_progress(&store, 3, student_id, vec![(9801, 50)]);
        }

        let dashboard = compute_admin_dashboard(&store).await.unwrap();
        // 计数部分仍是真实值
        assert_eq!(dashboard.platform_stats.total_progress_records, 105);
        // 排行块被降级为最小形状
        assert_eq!(dashboard.course_metrics.most_popular.len(), 1);
        assert_eq!(dashboard.course_metrics.most_popular[0].course_id, 0);
    }
}
