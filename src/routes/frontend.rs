//! 内嵌的前端单页应用
//!
//! 构建产物通过 rust-embed 打包进二进制；`./frontend-custom/` 下的同名文件优先，
//! 方便不重新编译就替换页面。未知路径回退到 `index.html`，`/api/` 下的未知路径返回 JSON 404。

use std::borrow::Cow;
use std::path::Path;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use rust_embed::Embed;

use crate::models::{ApiResponse, ErrorCode};
use crate::services::system::DynamicConfig;

const INDEX: &str = "index.html";
const OVERRIDE_DIR: &str = "./frontend-custom";

#[derive(Embed)]
#[folder = "frontend/dist/"]
struct WebClient;

fn extension(path: &str) -> &str {
    Path::new(path)
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or("")
}

fn content_type(path: &str) -> &'static str {
    match extension(path) {
        "html" => "text/html; charset=utf-8",
        "js" | "mjs" => "application/javascript; charset=utf-8",
        "css" => "text/css; charset=utf-8",
        "json" | "map" | "webmanifest" => "application/json",
        "svg" => "image/svg+xml",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "webp" => "image/webp",
        "ico" => "image/x-icon",
        "woff" => "font/woff",
        "woff2" => "font/woff2",
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        "vtt" => "text/vtt; charset=utf-8",
        "wasm" => "application/wasm",
        "txt" => "text/plain; charset=utf-8",
        _ => "application/octet-stream",
    }
}

/// 构建工具给这些文件名带了 hash，可以长期缓存
fn is_fingerprinted(path: &str) -> bool {
    path.starts_with("assets/")
        && matches!(
            extension(path),
            "js" | "mjs" | "css" | "woff" | "woff2" | "png" | "jpg" | "jpeg" | "svg" | "webp"
        )
}

fn load(path: &str) -> Option<Cow<'static, [u8]>> {
    if path.contains("..") {
        return None;
    }
    if let Ok(data) = std::fs::read(Path::new(OVERRIDE_DIR).join(path)) {
        return Some(Cow::Owned(data));
    }
    WebClient::get(path).map(|file| file.data)
}

/// 首页标题跟随站点设置
async fn render_index(data: &[u8]) -> Vec<u8> {
    let site_name = DynamicConfig::site_name().await;
    String::from_utf8_lossy(data)
        .replace("%SITE_NAME%", &site_name)
        .replace("%BASE_PATH%", "")
        .into_bytes()
}

pub async fn serve_frontend(req: HttpRequest) -> ActixResult<HttpResponse> {
    let tail = req.match_info().query("tail").trim_start_matches('/');

    if tail == "api" || tail.starts_with("api/") {
        return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::NotFound,
            "API endpoint not found",
        )));
    }

    let requested = if tail.is_empty() { INDEX } else { tail };
    let (path, data) = match load(requested) {
        Some(data) => (requested, data),
        None => match load(INDEX) {
            Some(data) => (INDEX, data),
            None => {
                return Ok(HttpResponse::NotFound()
                    .content_type("text/plain; charset=utf-8")
                    .body("Web client is not available"));
            }
        },
    };

    let mut response = HttpResponse::Ok();
    response.content_type(content_type(path));
    if is_fingerprinted(path) {
        response.insert_header(("Cache-Control", "public, max-age=31536000, immutable"));
    } else {
        response.insert_header(("Cache-Control", "no-cache"));
    }

    if path == INDEX {
        Ok(response.body(render_index(&data).await))
    } else {
        Ok(response.body(data.into_owned()))
    }
}

/// 必须最后注册，匹配所有 GET
pub fn configure_frontend_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/{tail:.*}", web::get().to(serve_frontend));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_types() {
        assert_eq!(content_type("index.html"), "text/html; charset=utf-8");
        assert_eq!(content_type("assets/app.mjs"), "application/javascript; charset=utf-8");
        assert_eq!(content_type("lesson.vtt"), "text/vtt; charset=utf-8");
        assert_eq!(content_type("blob"), "application/octet-stream");
    }

    #[test]
    fn test_only_hashed_assets_cached() {
        assert!(is_fingerprinted("assets/index-4f2a.js"));
        assert!(!is_fingerprinted("index.html"));
        assert!(!is_fingerprinted("favicon.svg"));
    }

    #[test]
    fn test_parent_paths_refused() {
        assert!(load("../Cargo.toml").is_none());
    }
}
