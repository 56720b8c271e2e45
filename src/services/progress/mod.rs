pub mod structure;
pub mod update;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::progress::requests::UpdateProgressRequest;
use crate::storage::RecordStore;

pub struct ProgressService {
    storage: Option<Arc<dyn RecordStore>>,
}

impl ProgressService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    /// 注入指定存储（测试用）
    #[cfg(test)]
    pub fn with_storage(storage: Arc<dyn RecordStore>) -> Self {
        Self {
            storage: Some(storage),
        }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> Arc<dyn RecordStore> {
        if let Some(storage) = &self.storage {
            storage.clone()
        } else {
            request
                .app_data::<actix_web::web::Data<Arc<dyn RecordStore>>>()
                .expect("Storage not found in app data")
                .get_ref()
                .clone()
        }
    }

    pub async fn update_student_progress(
        &self,
        request: &HttpRequest,
        student_id: i64,
        course_id: i64,
        payload: UpdateProgressRequest,
    ) -> ActixResult<HttpResponse> {
        update::update_student_progress(self, request, student_id, course_id, payload).await
    }
}
