use super::SeaOrmStorage;
use crate::entity::users::{Column, Entity as Users};
use crate::errors::{LPSystemError, Result};
use crate::models::users::{
    entities::{User, UserRole},
    responses::UserRoleCounts,
};
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder};

impl SeaOrmStorage {
    /// 通过 ID 获取用户
    pub async fn find_user_by_id_impl(&self, id: i64) -> Result<Option<User>> {
        let result = Users::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| LPSystemError::database_operation(format!("查询用户失败: {e}")))?;

        Ok(result.map(|m| m.into_user()))
    }

    /// 按角色统计用户数量
    pub async fn count_users_by_role_impl(&self) -> Result<UserRoleCounts> {
        let mut counts = UserRoleCounts::default();
        for role in UserRole::all_roles() {
            let count = Users::find()
                .filter(Column::Role.eq(role.to_string()))
                .count(&self.db)
                .await
                .map_err(|e| {
                    LPSystemError::database_operation(format!("统计用户数量失败: {e}"))
                })? as i64;
            match role {
                UserRole::Student => counts.students = count,
                UserRole::Teacher => counts.teachers = count,
                UserRole::Staff => counts.staff = count,
                UserRole::Admin => counts.admins = count,
            }
        }
        Ok(counts)
    }

    /// 列出班期内的用户（可按角色过滤）
    pub async fn find_users_by_promotion_impl(
        &self,
        promotion_id: i64,
        role: Option<UserRole>,
    ) -> Result<Vec<User>> {
        let mut select = Users::find().filter(Column::CurrentPromotionId.eq(promotion_id));

        if let Some(role) = role {
            select = select.filter(Column::Role.eq(role.to_string()));
        }

        let result = select
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| LPSystemError::database_operation(format!("查询班期用户失败: {e}")))?;

        Ok(result.into_iter().map(|m| m.into_user()).collect())
    }

    /// 统计某时间点后登录过的用户数
    pub async fn count_active_users_since_impl(
        &self,
        since: chrono::DateTime<chrono::Utc>,
    ) -> Result<i64> {
        let count = Users::find()
            .filter(Column::LastLogin.gte(since.timestamp()))
            .count(&self.db)
            .await
            .map_err(|e| LPSystemError::database_operation(format!("统计活跃用户失败: {e}")))?;

        Ok(count as i64)
    }
}
