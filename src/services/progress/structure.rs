//! 课程结构缓存
//!
//! 进度百分比的分母（小节总数）和练习 ID 列表都来自课程章节树
//! 的遍历。两个进程内缓存避免每次更新/聚合都重走一遍树：
//! - 课程 ID → 课程结构（小节数、按章节的小节 ID、练习 ID 列表）
//! - 练习 ID → 练习元数据（所属课程、标题）
//!
//! 缓存有界、非权威，TTL 过期后按需重建。

use std::sync::Arc;

use once_cell::sync::Lazy;

use crate::errors::Result;
use crate::models::courses::entities::{ContentKind, Course};
use crate::storage::RecordStore;

// 缓存容量上限（条目数），超出后由 moka 按 LRU 淘汰
pub const STRUCTURE_CACHE_CAPACITY: u64 = 256;
pub const EXERCISE_META_CACHE_CAPACITY: u64 = 4096;
// 课程结构可能被课程编辑子系统修改，短 TTL 控制陈旧窗口
const STRUCTURE_CACHE_TTL_SECS: u64 = 300;

/// 章节树遍历出的课程结构摘要
#[derive(Debug, Clone)]
pub struct CourseStructure {
    pub course_id: i64,
    pub total_sections: u32,
    pub total_chapters: u32,
    // 每章节的小节 ID 列表，用于统计已完成章节数
    pub section_ids_by_chapter: Vec<Vec<String>>,
    pub exercise_ids: Vec<String>,
}

/// 练习元数据
#[derive(Debug, Clone)]
pub struct ExerciseMeta {
    pub course_id: i64,
    pub title: String,
}

static STRUCTURE_CACHE: Lazy<moka::sync::Cache<i64, Arc<CourseStructure>>> = Lazy::new(|| {
    moka::sync::Cache::builder()
        .max_capacity(STRUCTURE_CACHE_CAPACITY)
        .time_to_live(std::time::Duration::from_secs(STRUCTURE_CACHE_TTL_SECS))
        .build()
});

static EXERCISE_META_CACHE: Lazy<moka::sync::Cache<String, Arc<ExerciseMeta>>> =
    Lazy::new(|| {
        moka::sync::Cache::builder()
            .max_capacity(EXERCISE_META_CACHE_CAPACITY)
            .time_to_live(std::time::Duration::from_secs(STRUCTURE_CACHE_TTL_SECS))
            .build()
    });

/// 遍历章节树构建结构摘要，同时填充练习元数据缓存
fn build_structure(course: &Course) -> CourseStructure {
    let mut section_ids_by_chapter = Vec::with_capacity(course.chapters.len());
    let mut exercise_ids = Vec::new();

    for chapter in &course.chapters {
        let mut section_ids = Vec::with_capacity(chapter.sections.len());
        for section in &chapter.sections {
            section_ids.push(section.id.clone());
            for item in &section.contents {
                if item.kind == ContentKind::Exercise {
                    exercise_ids.push(item.id.clone());
                    EXERCISE_META_CACHE.insert(
                        item.id.clone(),
                        Arc::new(ExerciseMeta {
                            course_id: course.id,
                            title: item.title.clone(),
                        }),
                    );
                }
            }
        }
        section_ids_by_chapter.push(section_ids);
    }

    CourseStructure {
        course_id: course.id,
        total_sections: section_ids_by_chapter.iter().map(|s| s.len() as u32).sum(),
        total_chapters: course.chapters.len() as u32,
        section_ids_by_chapter,
        exercise_ids,
    }
}

/// 加载课程结构（缓存优先）
///
/// 课程不存在返回 Ok(None)；存储层故障向上传播，由调用方决定
/// 是失败还是保持原值。
pub async fn load_course_structure(
    store: &dyn RecordStore,
    course_id: i64,
) -> Result<Option<Arc<CourseStructure>>> {
    if let Some(cached) = STRUCTURE_CACHE.get(&course_id) {
        return Ok(Some(cached));
    }

    let course = match store.find_course_by_id(course_id).await? {
        Some(course) => course,
        None => return Ok(None),
    };

    let structure = Arc::new(build_structure(&course));
    STRUCTURE_CACHE.insert(course_id, structure.clone());
    Ok(Some(structure))
}

/// 查询练习元数据（仅命中已遍历过的课程）
pub fn find_exercise_meta(exercise_id: &str) -> Option<Arc<ExerciseMeta>> {
    EXERCISE_META_CACHE.get(exercise_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::courses::entities::{
        Chapter, ContentItem, CourseStatus, Section,
    };
    use crate::storage::memory::MemoryRecordStore;

    fn course_with_structure(id: i64) -> Course {
        let now = chrono::Utc::now();
        Course {
            id,
            title: format!("课程 {id}"),
            instructor_id: 1,
            collaborator_ids: vec![],
            status: CourseStatus::Published,
            chapters: vec![
                Chapter {
                    id: "c1".to_string(),
                    title: "第一章".to_string(),
                    sections: vec![
                        Section {
                            id: "s1".to_string(),
                            title: "1.1".to_string(),
                            contents: vec![ContentItem {
                                id: "ex1".to_string(),
                                title: "练习一".to_string(),
                                kind: ContentKind::Exercise,
                            }],
                        },
                        Section {
                            id: "s2".to_string(),
                            title: "1.2".to_string(),
                            contents: vec![ContentItem {
                                id: "l1".to_string(),
                                title: "课文".to_string(),
                                kind: ContentKind::Lesson,
                            }],
                        },
                    ],
                },
                Chapter {
                    id: "c2".to_string(),
                    title: "第二章".to_string(),
                    sections: vec![Section {
                        id: "s3".to_string(),
                        title: "2.1".to_string(),
                        contents: vec![],
                    }],
                },
            ],
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_structure_walk_counts_sections_and_exercises() {
        let store = MemoryRecordStore::new();
        store.insert_course(course_with_structure(9001));

        let structure = load_course_structure(&store, 9001)
            .await
            .unwrap()
            .expect("course exists");
        assert_eq!(structure.total_sections, 3);
        assert_eq!(structure.total_chapters, 2);
        assert_eq!(structure.exercise_ids, vec!["ex1".to_string()]);

        // 遍历时顺带填充了练习元数据缓存
        let meta = find_exercise_meta("ex1").expect("meta cached");
        assert_eq!(meta.course_id, 9001);
        assert_eq!(meta.title, "练习一");
    }

    #[tokio::test]
    async fn test_missing_course_returns_none() {
        let store = MemoryRecordStore::new();
        let structure = load_course_structure(&store, 9002).await.unwrap();
        assert!(structure.is_none());
    }

    #[tokio::test]
    async fn test_cache_hit_does_not_refetch() {
        let store = MemoryRecordStore::new();
        store.insert_course(course_with_structure(9003));

        let first = load_course_structure(&store, 9003).await.unwrap().unwrap();
        let second = load_course_structure(&store, 9003).await.unwrap().unwrap();
        // 第二次命中缓存，拿到同一份结构
        assert!(Arc::ptr_eq(&first, &second));
    }
}
