//! 课程分析
//!
//! 扫描引用课程的全部班期和班期下的进度记录，产出四个固定
//! 进度区间桶、完成率/流失率和带趋势方向的表现指标列表。
//!
//! 不变量：四桶互不重叠、边界闭合，计数之和恒等于选课总人数。

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::AnalyticsService;
use crate::config::AppConfig;
use crate::models::analytics::responses::{
    CourseAnalyticsResponse, CourseOverview, EngagementMetric, PerformanceMetric, ProgressBucket,
    Trend,
};
use crate::models::progress::entities::{CourseProgress, ProgressStatus};
use crate::models::{ApiResponse, ServiceError};
use crate::services::{query_guard, service_error_to_response};
use crate::storage::RecordStore;

pub async fn compute_course_analytics(
    store: &dyn RecordStore,
    course_id: i64,
) -> Result<CourseAnalyticsResponse, ServiceError> {
    let course = store
        .find_course_by_id(course_id)
        .await?
        .ok_or_else(|| ServiceError::course_not_found(course_id))?;

    let promotions = store.find_promotions_containing_course(course_id).await?;

    // 收集该课程在各班期下的进度条目
    let mut entries: Vec<CourseProgress> = Vec::new();
    let config = AppConfig::get();
    for promotion in &promotions {
        let records = store.find_progress_by_promotion(promotion.id).await?;
        for record in records {
            if let Some(entry) = record.course_progress(course_id) {
                entries.push(entry.clone());
            }
        }
        if query_guard::check(
            entries.len(),
            config.dashboard.guard.joined_progress_limit,
            "course_analytics_progress",
        ) {
            return Ok(query_guard::fallback_course_analytics(
                course_id,
                &course.title,
            ));
        }
    }

    let total = entries.len() as i64;
    let completed = entries.iter().filter(|e| e.is_completed()).count() as i64;
    let dropped = entries
        .iter()
        .filter(|e| e.status == ProgressStatus::Dropped)
        .count() as i64;

    let average_progress = if total > 0 {
        let sum: i64 = entries.iter().map(|e| e.progress_percentage as i64).sum();
        ((sum as f64) / (total as f64)).round() as i64
    } else {
        0
    };
    let completion_rate = ratio_percentage(completed, total);
    let dropout_rate = ratio_percentage(dropped, total);

    let progress_distribution = bucket_distribution(&entries);

    let average_time_spent = if total > 0 {
        entries.iter().map(|e| e.time_spent).sum::<i64>() as f64 / total as f64
    } else {
        0.0
    };

    // 固定顺序的表现指标；趋势是阈值启发式，不是时间序列回归
    let performance_metrics = vec![
        PerformanceMetric {
            metric: "average_progress".to_string(),
            value: average_progress as f64,
            trend: progress_trend(average_progress),
        },
        PerformanceMetric {
            metric: "completion_rate".to_string(),
            value: completion_rate as f64,
            trend: completion_trend(completion_rate),
        },
        PerformanceMetric {
            metric: "average_time_spent_minutes".to_string(),
            value: average_time_spent,
            trend: Trend::Stable,
        },
    ];

    let week_ago = chrono::Utc::now() - chrono::Duration::days(7);
    let active_last_week = entries
        .iter()
        .filter(|e| e.last_activity_at.is_some_and(|t| t >= week_ago))
        .count() as i64;
    let participating = entries
        .iter()
        .filter(|e| e.progress_percentage > 0 || !e.completed_sections.is_empty())
        .count() as i64;

    let engagement_metrics = vec![
        EngagementMetric {
            metric: "active_students_7d".to_string(),
            value: active_last_week as f64,
        },
        EngagementMetric {
            metric: "participation_rate".to_string(),
            value: ratio_percentage(participating, total) as f64,
        },
        EngagementMetric {
            metric: "average_time_spent_minutes".to_string(),
            value: average_time_spent,
        },
    ];

    Ok(CourseAnalyticsResponse {
        overview: CourseOverview {
            course_id,
            course_title: course.title,
            total_enrollments: total,
            average_progress,
            completion_rate,
            dropout_rate,
        },
        progress_distribution,
        performance_metrics,
        engagement_metrics,
    })
}

fn ratio_percentage(part: i64, total: i64) -> i64 {
    if total > 0 {
        ((100.0 * part as f64) / (total as f64)).round() as i64
    } else {
        0
    }
}

/// 四个固定闭区间：[0,25] [26,50] [51,75] [76,100]
fn bucket_distribution(entries: &[CourseProgress]) -> Vec<ProgressBucket> {
    let mut counts = [0i64; 4];
    for entry in entries {
        let index = match entry.progress_percentage {
            0..=25 => 0,
            26..=50 => 1,
            51..=75 => 2,
            _ => 3,
        };
        counts[index] += 1;
    }

    ["0-25", "26-50", "51-75", "76-100"]
        .iter()
        .zip(counts)
        .map(|(range, count)| ProgressBucket {
            range: range.to_string(),
            count,
        })
        .collect()
}

// 趋势启发式阈值
fn progress_trend(average_progress: i64) -> Trend {
    match average_progress {
        70.. => Trend::Up,
        40..=69 => Trend::Stable,
        _ => Trend::Down,
    }
}

fn completion_trend(completion_rate: i64) -> Trend {
    match completion_rate {
        50.. => Trend::Up,
        20..=49 => Trend::Stable,
        _ => Trend::Down,
    }
}

/// HTTP 包装
pub async fn get_course_analytics(
    service: &AnalyticsService,
    request: &HttpRequest,
    course_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let provider = service.get_provider();

    match provider.course_analytics(storage.as_ref(), course_id).await {
        Ok(response) => Ok(HttpResponse::Ok().json(ApiResponse::success(response, "查询成功"))),
        Err(err) => Ok(service_error_to_response(&err)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ErrorCode;
    use crate::models::courses::entities::{Course, CourseStatus};
    use crate::models::progress::entities::PromotionProgress;
    use crate::models::promotions::entities::{Promotion, PromotionStatus};
    use crate::storage::memory::MemoryRecordStore;

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

    fn seed_student_progress(
        store: &MemoryRecordStore,
        promotion_id: i64,
        student_id: i64,
        course_id: i64,
        percentage: u8,
        status: ProgressStatus,
    ) {
        let now = chrono::Utc::now();
        let mut entry = CourseProgress::empty(course_id);
        entry.progress_percentage = percentage;
        entry.status = status;
        entry.last_activity_at = Some(now);
        store.insert_progress(PromotionProgress {
            id: 0,
            promotion_id,
            student_id,
            courses: vec![entry],
            created_at: now,
            updated_at: now,
        });
    }

    fn setup(course_id: i64, percentages: &[u8]) -> MemoryRecordStore {
        let store = MemoryRecordStore::new();
        store.insert_course(bare_course(course_id, "分析课程"));
        store.insert_promotion(Promotion {
            id: 1,
            name: "2025-P1".to_string(),
            course_ids: vec![course_id],
            status: PromotionStatus::Active,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        });
        for (i, &pct) in percentages.iter().enumerate() {
            let status = if pct >= 100 {
                ProgressStatus::Completed
            } else {
                ProgressStatus::Active
            };
            seed_student_progress(&store, 1, 1000 + i as i64, course_id, pct, status);
        }
        store
    }

    #[tokio::test]
    async fn test_worked_example_30_60_90() {
        let store = setup(9901, &[30, 60, 90]);

        let analytics = compute_course_analytics(&store, 9901).await.unwrap();
        assert_eq!(analytics.overview.total_enrollments, 3);
        assert_eq!(analytics.overview.average_progress, 60);

        // [0,25]=0, [26,50]=1 (30), [51,75]=1 (60), [76,100]=1 (90)
        let counts: Vec<i64> = analytics
            .progress_distribution
            .iter()
            .map(|b| b.count)
            .collect();
        assert_eq!(counts, vec![0, 1, 1, 1]);
    }

    #[tokio::test]
    async fn test_buckets_sum_to_total_enrollments() {
        let store = setup(9902, &[0, 12, 25, 26, 49, 51, 75, 76, 99, 100]);

        let analytics = compute_course_analytics(&store, 9902).await.unwrap();
        let sum: i64 = analytics
            .progress_distribution
            .iter()
            .map(|b| b.count)
            .sum();
        assert_eq!(sum, analytics.overview.total_enrollments);
        // 边界值落在闭区间里
        let counts: Vec<i64> = analytics
            .progress_distribution
            .iter()
            .map(|b| b.count)
            .collect();
        assert_eq!(counts, vec![3, 2, 2, 3]);
    }

    #[tokio::test]
    async fn test_completion_and_dropout_rates() {
        let store = MemoryRecordStore::new();
        store.insert_course(bare_course(9903, "分析课程"));
        store.insert_promotion(Promotion {
            id: 1,
            name: "2025-P1".to_string(),
            course_ids: vec![9903],
            status: PromotionStatus::Active,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        });
        seed_student_progress(&store, 1, 1001, 9903, 100, ProgressStatus::Completed);
        seed_student_progress(&store, 1, 1002, 9903, 40, ProgressStatus::Active);
        seed_student_progress(&store, 1, 1003, 9903, 10, ProgressStatus::Dropped);
        seed_student_progress(&store, 1, 1004, 9903, 60, ProgressStatus::Active);

        let analytics = compute_course_analytics(&store, 9903).await.unwrap();
        assert_eq!(analytics.overview.completion_rate, 25); // 1/4
        assert_eq!(analytics.overview.dropout_rate, 25); // 1/4
    }

    #[tokio::test]
    async fn test_unknown_course_is_not_found() {
        let store = MemoryRecordStore::new();
        let err = compute_course_analytics(&store, 9904).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::CourseNotFound);
    }

    #[tokio::test]
    async fn test_course_without_enrollments_yields_zeroes() {
        let store = MemoryRecordStore::new();
        store.insert_course(bare_course(9905, "空课程"));

        let analytics = compute_course_analytics(&store, 9905).await.unwrap();
        assert_eq!(analytics.overview.total_enrollments, 0);
        assert_eq!(analytics.overview.average_progress, 0);
        assert_eq!(analytics.overview.completion_rate, 0);
        let sum: i64 = analytics
            .progress_distribution
            .iter()
            .map(|b| b.count)
            .sum();
        assert_eq!(sum, 0);
        assert_eq!(analytics.progress_distribution.len(), 4);
    }

    #[tokio::test]
    async fn test_performance_metrics_order_is_fixed() {
        let store = setup(9906, &[80, 90]);

        let analytics = compute_course_analytics(&store, 9906).await.unwrap();
        let names: Vec<&str> = analytics
            .performance_metrics
            .iter()
            .map(|m| m.metric.as_str())
            .collect();
        assert_eq!(
            names,
            vec![
                "average_progress",
                "completion_rate",
                "average_time_spent_minutes"
            ]
        );
        // avg 85 → 启发式趋势 Up
        assert_eq!(analytics.performance_metrics[0].trend, Trend::Up);
    }

    #[tokio::test]
    async fn test_guard_degrades_on_large_progress_volume() {
        let store = MemoryRecordStore::new();
        store.insert_course(bare_course(9907, "大课程"));
        store.insert_promotion(Promotion {
            id: 1,
            name: "2025-P1".to_string(),
            course_ids: vec![9907],
            status: PromotionStatus::Active,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        });
        for student_id in 2000..2105 {
            seed_student_progress(&store, 1, student_id, 9907, 50, ProgressStatus::Active);
        }

        let analytics = compute_course_analytics(&store, 9907).await.unwrap();
        // 降级：单人样本，桶和仍等于总人数
        assert_eq!(analytics.overview.total_enrollments, 1);
        let sum: i64 = analytics
            .progress_distribution
            .iter()
            .map(|b| b.count)
            .sum();
        assert_eq!(sum, 1);
    }
}
