use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{DynamicConfig, SystemService};
use crate::models::ApiResponse;
use crate::models::system::PublicSiteSettings;

/// 获取公开站点设置（只读，无需登录）
pub async fn get_settings(service: &SystemService, _req: &HttpRequest) -> ActixResult<HttpResponse> {
    let config = service.get_config();

    let response = PublicSiteSettings {
        site_name: DynamicConfig::site_name().await,
        site_description: DynamicConfig::site_description().await,
        contact_email: DynamicConfig::contact_email().await,
        allow_registration: DynamicConfig::allow_registration().await,
        maintenance_mode: DynamicConfig::maintenance_mode().await,
        environment: config.app.environment.clone(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    };

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        response,
        "Settings retrieved successfully",
    )))
}
