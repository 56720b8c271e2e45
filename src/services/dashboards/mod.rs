pub mod admin;
pub mod placeholder;
pub mod provider;
pub mod student;
pub mod teacher;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::storage::RecordStore;
use provider::DashboardProvider;

pub struct DashboardService {
    storage: Option<Arc<dyn RecordStore>>,
    provider: Option<Arc<dyn DashboardProvider>>,
}

impl DashboardService {
    pub fn new_lazy() -> Self {
        Self {
            storage: None,
            provider: None,
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

    pub(crate) fn get_provider(&self) -> Arc<dyn DashboardProvider> {
        if let Some(provider) = &self.provider {
            provider.clone()
        } else {
            provider::create_provider()
        }
    }

    pub async fn get_student_dashboard(
        &self,
        request: &HttpRequest,
        student_id: i64,
    ) -> ActixResult<HttpResponse> {
        student::get_student_dashboard(self, request, student_id).await
    }

    pub async fn get_teacher_dashboard(
        &self,
        request: &HttpRequest,
        teacher_id: i64,
    ) -> ActixResult<HttpResponse> {
        teacher::get_teacher_dashboard(self, request, teacher_id).await
    }

    pub async fn get_admin_dashboard(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        admin::get_admin_dashboard(self, request).await
    }
}
