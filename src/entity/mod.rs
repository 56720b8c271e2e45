//! SeaORM 实体定义
//!
//! 这些实体用于数据库操作，与 models 模块中的业务实体分离。
//! Storage 层使用这些实体进行 CRUD 操作，然后转换为 models 中的业务实体。
//! 章节树、班期课程列表、课程进度列表等文档型字段以 JSON 文本列存储。

pub mod prelude;

pub mod courses;
pub mod promotion_progress;
pub mod promotions;
pub mod submissions;
pub mod users;
