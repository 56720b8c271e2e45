//! SeaORM 存储实现
//!
//! 统一的数据库存储层，支持 SQLite、PostgreSQL 和 MySQL。

mod courses;
mod progress;
mod promotions;
mod submissions;
mod users;

use crate::config::AppConfig;
use crate::errors::{LPSystemError, Result};
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::time::Duration;
use tracing::info;

/// SeaORM 存储实现
#[derive(Clone)]
pub struct SeaOrmStorage {
    pub(crate) db: DatabaseConnection,
}

impl SeaOrmStorage {
    /// 创建新的 SeaORM 存储实例
    pub async fn new_async() -> Result<Self> {
        let config = AppConfig::get();
        let db_url = Self::build_database_url(&config.database.url)?;

        // 根据数据库类型选择连接方式
        let db = if db_url.starts_with("sqlite://") {
            Self::connect_sqlite(&db_url, config).await?
        } else {
            Self::connect_generic(&db_url, config).await?
        };

        // 运行迁移
        Migrator::up(&db, None)
            .await
            .map_err(|e| LPSystemError::database_operation(format!("数据库迁移失败: {e}")))?;

        info!("SeaORM 存储初始化完成，数据库: {}", db_url);

        Ok(Self { db })
    }

    /// SQLite 专用连接（WAL + pragma 优化）
    async fn connect_sqlite(url: &str, config: &AppConfig) -> Result<DatabaseConnection> {
        use sea_orm::SqlxSqliteConnector;
        use sea_orm::sqlx::sqlite::{
            SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous,
        };
        use std::str::FromStr;

        let opt = SqliteConnectOptions::from_str(url)
            .map_err(|e| LPSystemError::database_config(format!("SQLite URL 解析失败: {e}")))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(5))
            .pragma("cache_size", "-64000")
            .pragma("temp_store", "memory")
            .pragma("mmap_size", "536870912")
            .pragma("wal_autocheckpoint", "1000");

        let pool = SqlitePoolOptions::new()
            .max_connections(config.database.pool_size)
            .min_connections(1)
            .test_before_acquire(true)
            .acquire_timeout(Duration::from_secs(config.database.timeout))
            .idle_timeout(Duration::from_secs(300))
            .connect_with(opt)
            .await
            .map_err(|e| LPSystemError::database_connection(format!("SQLite 连接失败: {e}")))?;

        Ok(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool))
    }

    /// 通用连接（PostgreSQL、MySQL 等）
    async fn connect_generic(url: &str, config: &AppConfig) -> Result<DatabaseConnection> {
        let mut opt = ConnectOptions::new(url);
        opt.max_connections(config.database.pool_size)
            .min_connections(5)
            .connect_timeout(Duration::from_secs(config.database.timeout))
            .acquire_timeout(Duration::from_secs(config.database.timeout))
            .idle_timeout(Duration::from_secs(600))
            .max_lifetime(Duration::from_secs(1800))
            .sqlx_logging(false)
            .sqlx_logging_level(tracing::log::LevelFilter::Debug);

        Database::connect(opt)
            .await
            .map_err(|e| LPSystemError::database_connection(format!("无法连接到数据库: {e}")))
    }

    /// 从 URL 自动推断数据库类型并构建连接 URL
    fn build_database_url(url: &str) -> Result<String> {
        if url.starts_with("sqlite://") {
            Ok(url.to_string())
        } else if url.ends_with(".db") || url.ends_with(".sqlite") || url == ":memory:" {
            Ok(format!("sqlite://{}?mode=rwc", url))
        } else if url.starts_with("postgres://")
            || url.starts_with("postgresql://")
            || url.starts_with("mysql://")
            || url.starts_with("mariadb://")
        {
            Ok(url.to_string())
        } else {
            Err(LPSystemError::database_config(format!(
                "无法从 URL 推断数据库类型: {url}. 支持: sqlite://, postgres://, mysql://, 或 .db/.sqlite 文件路径"
            )))
        }
    }
}

// RecordStore trait 实现
use crate::models::{
    courses::entities::Course,
    progress::entities::PromotionProgress,
    promotions::entities::Promotion,
    submissions::entities::ExerciseSubmission,
    users::{entities::User, entities::UserRole, responses::UserRoleCounts},
};
use crate::storage::RecordStore;
use async_trait::async_trait;

#[async_trait]
impl RecordStore for SeaOrmStorage {
    // 用户模块
    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>> {
        self.find_user_by_id_impl(id).await
    }

    async fn count_users_by_role(&self) -> Result<UserRoleCounts> {
        self.count_users_by_role_impl().await
    }

    async fn find_users_by_promotion(
        &self,
        promotion_id: i64,
        role: Option<UserRole>,
    ) -> Result<Vec<User>> {
        self.find_users_by_promotion_impl(promotion_id, role).await
    }

    async fn count_active_users_since(
        &self,
        since: chrono::DateTime<chrono::Utc>,
    ) -> Result<i64> {
        self.count_active_users_since_impl(since).await
    }

    // 课程模块
    async fn find_course_by_id(&self, id: i64) -> Result<Option<Course>> {
        self.find_course_by_id_impl(id).await
    }

    async fn find_courses_by_ids(&self, ids: &[i64]) -> Result<Vec<Course>> {
        self.find_courses_by_ids_impl(ids).await
    }

    async fn find_courses_by_instructor_or_collaborator(
        &self,
        user_id: i64,
    ) -> Result<Vec<Course>> {
        self.find_courses_by_instructor_or_collaborator_impl(user_id)
            .await
    }

    async fn count_courses(&self) -> Result<i64> {
        self.count_courses_impl().await
    }

    // 班期模块
    async fn find_promotions_containing_course(&self, course_id: i64) -> Result<Vec<Promotion>> {
        self.find_promotions_containing_course_impl(course_id).await
    }

    async fn list_promotions(&self, limit: u64) -> Result<Vec<Promotion>> {
        self.list_promotions_impl(limit).await
    }

    async fn count_promotions(&self) -> Result<i64> {
        self.count_promotions_impl().await
    }

    async fn count_students_in_promotion(&self, promotion_id: i64) -> Result<i64> {
        self.count_students_in_promotion_impl(promotion_id).await
    }

    // 进度模块
    async fn find_or_create_progress(
        &self,
        promotion_id: i64,
        student_id: i64,
    ) -> Result<PromotionProgress> {
        self.find_or_create_progress_impl(promotion_id, student_id)
            .await
    }

    async fn find_progress_by_promotion(
        &self,
        promotion_id: i64,
    ) -> Result<Vec<PromotionProgress>> {
        self.find_progress_by_promotion_impl(promotion_id).await
    }

    async fn save_progress(&self, record: PromotionProgress) -> Result<PromotionProgress> {
        self.save_progress_impl(record).await
    }

    async fn count_progress_records(&self) -> Result<i64> {
        self.count_progress_records_impl().await
    }

    // 提交模块
    async fn find_submissions_by_student(
        &self,
        student_id: i64,
    ) -> Result<Vec<ExerciseSubmission>> {
        self.find_submissions_by_student_impl(student_id).await
    }

    async fn find_submissions_by_exercise_ids(
        &self,
        exercise_ids: &[String],
    ) -> Result<Vec<ExerciseSubmission>> {
        self.find_submissions_by_exercise_ids_impl(exercise_ids)
            .await
    }

    async fn count_submissions(&self) -> Result<i64> {
        self.count_submissions_impl().await
    }
}
