use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// 进度更新响应
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/progress.ts")]
pub struct UpdateProgressResponse {
    pub course_id: i64,
    pub progress_percentage: u8,
    // 累计学习时长（分钟）
    pub time_spent: i64,
    pub completed_sections: u32,
    pub completed_exercises: u32,
    pub last_activity_at: chrono::DateTime<chrono::Utc>,
}
