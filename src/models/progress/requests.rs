use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 进度更新请求
//
// 三种形态共用一个结构：
// - type = "section_complete"：需要 section_id
// - type = "exercise_complete"：需要 exercise_id，可带 score
// - type 缺省：按字段做部分合并（completed_sections 等做并集）
//
// 未知的 type 值是业务错误（InvalidUpdateType），不是反序列化错误。
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/progress.ts")]
pub struct UpdateProgressRequest {
    #[serde(rename = "type")]
    pub update_type: Option<String>,
    pub section_id: Option<String>,
    pub exercise_id: Option<String>,
    pub score: Option<f64>,
    // 本次学习时长（分钟），每次调用累加
    pub time_spent: Option<i64>,
    // 部分合并形态的字段
    pub completed_sections: Option<BTreeSet<String>>,
    pub completed_exercises: Option<BTreeSet<String>>,
    pub progress_percentage: Option<u8>,
}

impl UpdateProgressRequest {
    pub const TYPE_SECTION_COMPLETE: &'static str = "section_complete";
    pub const TYPE_EXERCISE_COMPLETE: &'static str = "exercise_complete";

    pub fn section_complete(section_id: impl Into<String>, time_spent: i64) -> Self {
        Self {
            update_type: Some(Self::TYPE_SECTION_COMPLETE.to_string()),
            section_id: Some(section_id.into()),
            exercise_id: None,
            score: None,
            time_spent: Some(time_spent),
            completed_sections: None,
            completed_exercises: None,
            progress_percentage: None,
        }
    }

    pub fn exercise_complete(
        exercise_id: impl Into<String>,
        score: Option<f64>,
        time_spent: i64,
    ) -> Self {
        Self {
            update_type: Some(Self::TYPE_EXERCISE_COMPLETE.to_string()),
            section_id: None,
            exercise_id: Some(exercise_id.into()),
            score,
            time_spent: Some(time_spent),
            completed_sections: None,
            completed_exercises: None,
            progress_percentage: None,
        }
    }

    pub fn merge(
        completed_sections: Option<BTreeSet<String>>,
        completed_exercises: Option<BTreeSet<String>>,
        time_spent: Option<i64>,
        progress_percentage: Option<u8>,
    ) -> Self {
        Self {
            update_type: None,
            section_id: None,
            exercise_id: None,
            score: None,
            time_spent,
            completed_sections,
            completed_exercises,
            progress_percentage,
        }
    }
}
