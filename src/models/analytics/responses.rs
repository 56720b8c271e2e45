use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// 课程分析概览
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/analytics.ts")]
pub struct CourseOverview {
    pub course_id: i64,
    pub course_title: String,
    pub total_enrollments: i64,
    pub average_progress: i64,
    // round(100 * 完成人数 / 总人数)，无人选课时为 0
    pub completion_rate: i64,
    // 按 dropped 状态统计
    pub dropout_rate: i64,
}

/// 进度区间桶
///
/// 固定四个闭区间 [0,25] [26,50] [51,75] [76,100]，互不重叠，
/// 四桶计数之和恒等于选课总人数。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/analytics.ts")]
pub struct ProgressBucket {
    pub range: String,
    pub count: i64,
}

/// 趋势方向（粗粒度启发式，不是时间序列回归）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "../frontend/src/types/generated/analytics.ts")]
pub enum Trend {
    Up,
    Stable,
    Down,
}

/// 表现指标条目（固定顺序返回）
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/analytics.ts")]
pub struct PerformanceMetric {
    pub metric: String,
    pub value: f64,
    pub trend: Trend,
}

/// 参与度指标条目
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/analytics.ts")]
pub struct EngagementMetric {
    pub metric: String,
    pub value: f64,
}

/// 课程分析响应
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/analytics.ts")]
pub struct CourseAnalyticsResponse {
    pub overview: CourseOverview,
    pub progress_distribution: Vec<ProgressBucket>,
    pub performance_metrics: Vec<PerformanceMetric>,
    pub engagement_metrics: Vec<EngagementMetric>,
}
