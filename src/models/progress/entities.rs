use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 单课程进度状态
#[derive(Debug, Clone, Serialize, PartialEq, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "../frontend/src/types/generated/progress.ts")]
pub enum ProgressStatus {
    Active,    // 学习中
    Completed, // 已完成
    Dropped,   // 已放弃
}

impl Default for ProgressStatus {
    fn default() -> Self {
        ProgressStatus::Active
    }
}

impl<'de> Deserialize<'de> for ProgressStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        match s.as_str() {
            "active" => Ok(ProgressStatus::Active),
            "completed" => Ok(ProgressStatus::Completed),
            "dropped" => Ok(ProgressStatus::Dropped),
            _ => Err(serde::de::Error::custom(format!(
                "无效的进度状态: '{s}'. 支持的状态: active, completed, dropped"
            ))),
        }
    }
}

impl std::fmt::Display for ProgressStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProgressStatus::Active => write!(f, "active"),
            ProgressStatus::Completed => write!(f, "completed"),
            ProgressStatus::Dropped => write!(f, "dropped"),
        }
    }
}

// 单课程进度
//
// completed_sections / completed_exercises 使用集合语义：
// 重复标记已完成的小节是幂等的。time_spent 单调不减，按次累加。
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/progress.ts")]
pub struct CourseProgress {
    pub course_id: i64,
    // 始终位于 [0, 100]，由进度更新引擎根据课程结构重算
    pub progress_percentage: u8,
    pub chapters_completed: u32,
    pub total_chapters: u32,
    #[serde(default)]
    pub completed_sections: BTreeSet<String>,
    #[serde(default)]
    pub completed_exercises: BTreeSet<String>,
    // 累计学习时长（分钟）
    pub time_spent: i64,
    #[serde(default)]
    pub status: ProgressStatus,
    pub last_activity_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl CourseProgress {
    /// 按班期课程列表初始化的空进度
    pub fn empty(course_id: i64) -> Self {
        Self {
            course_id,
            progress_percentage: 0,
            chapters_completed: 0,
            total_chapters: 0,
            completed_sections: BTreeSet::new(),
            completed_exercises: BTreeSet::new(),
            time_spent: 0,
            status: ProgressStatus::Active,
            last_activity_at: None,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.progress_percentage >= 100
    }

    pub fn is_active(&self) -> bool {
        self.progress_percentage > 0 && self.progress_percentage < 100
    }
}

// 班期进度记录（即选课记录）
//
// 每个 (promotion_id, student_id) 一条，首次访问时懒创建，
// courses 为班期课程列表对应的 CourseProgress 数组（JSON 列）。
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/progress.ts")]
pub struct PromotionProgress {
    pub id: i64,
    pub promotion_id: i64,
    pub student_id: i64,
    #[serde(default)]
    pub courses: Vec<CourseProgress>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl PromotionProgress {
    pub fn course_progress(&self, course_id: i64) -> Option<&CourseProgress> {
        self.courses.iter().find(|c| c.course_id == course_id)
    }

    pub fn course_progress_mut(&mut self, course_id: i64) -> Option<&mut CourseProgress> {
        self.courses.iter_mut().find(|c| c.course_id == course_id)
    }
}
