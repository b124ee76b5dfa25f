pub mod hub;
pub mod rooms;
pub mod signaling;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use std::sync::Arc;

use crate::models::PaginationQuery;
use crate::models::live::{CreateLiveRoomRequest, LiveSocketQuery};
use crate::storage::Storage;

/// 直播间管理与信令转发
pub struct LiveService {
    storage: Option<Arc<dyn Storage>>,
}

super::service_handles!(LiveService);

impl LiveService {
    pub async fn create_room(
        &self,
        body: CreateLiveRoomRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        rooms::create_room(self, body, request).await
    }

    pub async fn active_rooms(
        &self,
        query: PaginationQuery,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        rooms::active_rooms(self, query, request).await
    }

    pub async fn my_rooms(
        &self,
        query: PaginationQuery,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        rooms::my_rooms(self, query, request).await
    }

    pub async fn get_room(&self, room_id: &str, request: &HttpRequest) -> ActixResult<HttpResponse> {
        rooms::get_room(self, room_id, request).await
    }

    pub async fn join_room(&self, room_id: &str, request: &HttpRequest) -> ActixResult<HttpResponse> {
        rooms::join_room(self, room_id, request).await
    }

    pub async fn leave_room(&self, room_id: &str, request: &HttpRequest) -> ActixResult<HttpResponse> {
        rooms::leave_room(self, room_id, request).await
    }

    pub async fn end_room(&self, room_id: &str, request: &HttpRequest) -> ActixResult<HttpResponse> {
        rooms::end_room(self, room_id, request).await
    }

    pub fn ice_servers(&self) -> HttpResponse {
        rooms::ice_servers()
    }

    pub async fn connect(
        &self,
        query: LiveSocketQuery,
        body: web::Payload,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        signaling::connect(self, query, body, request).await
    }
}
