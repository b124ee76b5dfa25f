use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use tracing::warn;

use super::NotificationService;
use crate::models::notifications::NotificationSocketQuery;
use crate::services::socket_user;
use crate::services::websocket::WebSocketService;

/// 通知推送握手，认证通过后交给连接管理器
pub async fn connect(
    service: &NotificationService,
    query: NotificationSocketQuery,
    body: web::Payload,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let cache = service.get_cache(request);

    let user = match socket_user(&query.token, &storage, &cache).await {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };

    // 计数失败不拒绝连接，客户端会再走 REST
    let unread = storage
        .count_unread_notifications(user.id)
        .await
        .unwrap_or_else(|e| {
            warn!("Failed to count unread notifications for user {}: {e}", user.id);
            0
        });

    let (response, session, stream) = actix_ws::handle(request, body)?;
    actix_web::rt::spawn(WebSocketService::handle_connection(
        user.id, unread, session, stream,
    ));
    Ok(response)
}
