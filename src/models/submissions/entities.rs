use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 练习提交实体
//
// 提交后不可变，评分字段由外部评分子系统回写。
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/submission.ts")]
pub struct ExerciseSubmission {
    pub id: i64,
    pub student_id: i64,
    pub course_id: i64,
    pub exercise_id: String,
    pub submitted_at: chrono::DateTime<chrono::Utc>,
    // 以下字段评分后才有值
    pub score: Option<f64>,
    pub is_correct: Option<bool>,
    pub graded_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl ExerciseSubmission {
    pub fn is_graded(&self) -> bool {
        self.graded_at.is_some()
    }
}
