pub mod dispatch;
pub mod list;
pub mod read;
pub mod socket;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use std::sync::Arc;

use crate::models::notifications::{NotificationListParams, NotificationSocketQuery};
use crate::storage::Storage;

pub use dispatch::NotificationDispatcher;

pub struct NotificationService {
    storage: Option<Arc<dyn Storage>>,
}

super::service_handles!(NotificationService);

impl NotificationService {
    pub async fn list_notifications(
        &self,
        params: NotificationListParams,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        list::list_notifications(self, params, request).await
    }

    pub async fn unread_count(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        list::unread_count(self, request).await
    }

    pub async fn mark_read(&self, id: i64, request: &HttpRequest) -> ActixResult<HttpResponse> {
        read::mark_read(self, id, request).await
    }

    pub async fn mark_all_read(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        read::mark_all_read(self, request).await
    }

    pub async fn delete_notification(
        &self,
        id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        read::delete_notification(self, id, request).await
    }

    pub async fn connect(
        &self,
        query: NotificationSocketQuery,
        body: web::Payload,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        socket::connect(self, query, body, request).await
    }
}
