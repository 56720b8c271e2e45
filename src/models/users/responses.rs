use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// 按角色统计的用户数量
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/user.ts")]
pub struct UserRoleCounts {
    pub students: i64,
    pub teachers: i64,
    pub staff: i64,
    pub admins: i64,
}

impl UserRoleCounts {
    pub fn total(&self) -> i64 {
        self.students + self.teachers + self.staff + self.admins
    }
}
