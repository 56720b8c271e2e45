pub mod course;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::services::dashboards::provider::{self, DashboardProvider};
use crate::storage::RecordStore;

pub struct AnalyticsService {
    storage: Option<Arc<dyn RecordStore>>,
}

impl AnalyticsService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
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

    pub(crate) fn get_provider(&self) -> Arc<dyn DashboardProvider> {
        provider::create_provider()
    }

    pub async fn get_course_analytics(
        &self,
        request: &HttpRequest,
        course_id: i64,
    ) -> ActixResult<HttpResponse> {
        course::get_course_analytics(self, request, course_id).await
    }
}
