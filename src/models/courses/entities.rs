use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 课程状态
#[derive(Debug, Clone, Serialize, PartialEq, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "../frontend/src/types/generated/course.ts")]
pub enum CourseStatus {
    Draft,     // 草稿
    Published, // 已发布
}

impl<'de> Deserialize<'de> for CourseStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        match s.as_str() {
            "draft" => Ok(CourseStatus::Draft),
            "published" => Ok(CourseStatus::Published),
            _ => Err(serde::de::Error::custom(format!(
                "无效的课程状态: '{s}'. 支持的状态: draft, published"
            ))),
        }
    }
}

impl std::fmt::Display for CourseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CourseStatus::Draft => write!(f, "draft"),
            CourseStatus::Published => write!(f, "published"),
        }
    }
}

impl std::str::FromStr for CourseStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(CourseStatus::Draft),
            "published" => Ok(CourseStatus::Published),
            _ => Err(format!("Invalid course status: {s}")),
        }
    }
}

// 内容类型
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "../frontend/src/types/generated/course.ts")]
pub enum ContentKind {
    Lesson,   // 课文
    Video,    // 视频
    Exercise, // 练习
}

// 内容项（章节树叶子）
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/course.ts")]
pub struct ContentItem {
    pub id: String,
    pub title: String,
    pub kind: ContentKind,
}

// 小节
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/course.ts")]
pub struct Section {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub contents: Vec<ContentItem>,
}

// 章节
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/course.ts")]
pub struct Chapter {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub sections: Vec<Section>,
}

// 课程实体
//
// 由课程编辑子系统维护，本服务只读。章节树用于统计小节数量和
// 定位练习 ID，进度百分比的分母来自这里。
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/course.ts")]
pub struct Course {
    pub id: i64,
    pub title: String,
    pub instructor_id: i64,
    #[serde(default)]
    pub collaborator_ids: Vec<i64>,
    pub status: CourseStatus,
    #[serde(default)]
    pub chapters: Vec<Chapter>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl Course {
    /// 统计章节树中的小节总数
    pub fn total_sections(&self) -> usize {
        self.chapters.iter().map(|c| c.sections.len()).sum()
    }

    /// 收集章节树中所有练习的内容 ID
    pub fn exercise_ids(&self) -> Vec<String> {
        self.chapters
            .iter()
            .flat_map(|c| c.sections.iter())
            .flat_map(|s| s.contents.iter())
            .filter(|item| item.kind == ContentKind::Exercise)
            .map(|item| item.id.clone())
            .collect()
    }
}
