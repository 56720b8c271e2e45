//! 预导入模块，方便使用

pub use super::courses::{ActiveModel as CourseActiveModel, Entity as Courses, Model as CourseModel};
pub use super::promotion_progress::{
    ActiveModel as PromotionProgressActiveModel, Entity as PromotionProgressRecords,
    Model as PromotionProgressModel,
};
pub use super::promotions::{
    ActiveModel as PromotionActiveModel, Entity as Promotions, Model as PromotionModel,
};
pub use super::submissions::{
    ActiveModel as SubmissionActiveModel, Entity as Submissions, Model as SubmissionModel,
};
pub use super::users::{ActiveModel as UserActiveModel, Entity as Users, Model as UserModel};
