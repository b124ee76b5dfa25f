use actix_cors::Cors;
use actix_web::http::Method;
use actix_web::middleware::DefaultHeaders;
use actix_web::{App, HttpServer, web};
use dotenv::dotenv;
use human_panic::setup_panic;
use tracing::{debug, warn};

use rust_learnhub::config::{AppConfig, CorsConfig};
use rust_learnhub::models::AppStartTime;
use rust_learnhub::routes;
use rust_learnhub::runtime::lifetime;
use rust_learnhub::services::system::DynamicConfig;
use rust_learnhub::utils::{json_error_handler, query_error_handler};

/// `*` 表示放开对应维度
fn build_cors(config: &CorsConfig) -> Cors {
    let mut cors = Cors::default().max_age(config.max_age);

    if config.allowed_origins.iter().any(|o| o == "*") {
        cors = cors.allow_any_origin();
    } else {
        for origin in &config.allowed_origins {
            cors = cors.allowed_origin(origin);
        }
    }

    if config.allowed_methods.iter().any(|m| m == "*") {
        cors = cors.allow_any_method();
    } else {
        let methods = config
            .allowed_methods
            .iter()
            .filter_map(|m| Method::from_bytes(m.to_uppercase().as_bytes()).ok());
        cors = cors.allowed_methods(methods);
    }

    if config.allowed_headers.iter().any(|h| h == "*") {
        cors.allow_any_header()
    } else {
        cors.allowed_headers(config.allowed_headers.iter().map(String::as_str))
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();

    let app_start_time = AppStartTime {
        start_datetime: chrono::Utc::now(),
    };

    setup_panic!();
    AppConfig::init().expect("Failed to initialize configuration");
    let config = AppConfig::get();

    // 日志：开发环境带源码位置，其余环境输出 JSON
    let (non_blocking_writer, _guard) = tracing_appender::non_blocking(std::io::stdout());
    let tracing_builder = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(&config.app.log_level))
        .with_writer(non_blocking_writer)
        .with_level(true);

    if config.is_development() {
        tracing_builder
            .with_ansi(true)
            .with_file(true)
            .with_line_number(true)
            .init();
    } else {
        tracing_builder.json().init();
    }

    warn!(
        "Starting {} v{} ({})",
        config.app.system_name,
        env!("CARGO_PKG_VERSION"),
        config.app.environment
    );

    let startup = lifetime::startup::prepare_server_startup().await;
    let storage = startup.storage.clone();
    let cache = startup.cache.clone();

    debug!(
        "Startup finished in {} ms",
        chrono::Utc::now()
            .signed_duration_since(app_start_time.start_datetime)
            .num_milliseconds()
    );
    warn!("Using {} worker threads", config.server.workers);

    // 预检缓存时间可在后台修改，重启后生效
    let cors_config = CorsConfig {
        max_age: DynamicConfig::cors_max_age().await,
        ..config.cors.clone()
    };

    let server = HttpServer::new(move || {
        App::new()
            .wrap(build_cors(&cors_config))
            .wrap(
                DefaultHeaders::new()
                    .add(("X-Content-Type-Options", "nosniff"))
                    .add(("Cache-Control", "no-cache, no-store, must-revalidate")),
            )
            .app_data(web::QueryConfig::default().error_handler(query_error_handler))
            .app_data(web::JsonConfig::default().error_handler(json_error_handler))
            .app_data(web::PayloadConfig::new(config.server.limits.max_payload_size))
            .app_data(web::Data::new(storage.clone()))
            .app_data(web::Data::new(cache.clone()))
            .app_data(web::Data::new(app_start_time.clone()))
            .configure(routes::configure_auth_routes)
            .configure(routes::configure_catalog_routes)
            .configure(routes::configure_learning_routes)
            .configure(routes::configure_payment_routes)
            .configure(routes::configure_notification_routes)
            .configure(routes::configure_admin_routes)
            .configure(routes::configure_teacher_routes)
            .configure(routes::configure_live_routes)
            .configure(routes::configure_system_routes)
            // 兜底，必须最后
            .configure(routes::configure_frontend_routes)
    })
    .keep_alive(config.server.timeouts.keep_alive())
    .client_request_timeout(config.server.timeouts.client_request())
    .client_disconnect_timeout(config.server.timeouts.client_disconnect())
    .workers(config.server.workers);

    #[cfg(unix)]
    let server = match config.unix_socket_path() {
        Some(socket_path) => {
            warn!("Listening on unix socket {}", socket_path);
            if std::path::Path::new(socket_path).exists() {
                std::fs::remove_file(socket_path)?;
            }
            server.bind_uds(socket_path)?
        }
        None => {
            let bind_address = config.server_bind_address();
            warn!("Listening on http://{}", bind_address);
            server.bind(bind_address)?
        }
    };

    #[cfg(not(unix))]
    let server = {
        let bind_address = config.server_bind_address();
        warn!("Listening on http://{}", bind_address);
        server.bind(bind_address)?
    };

    let server = server.run();
    let handle = server.handle();

    tokio::select! {
        res = server => res?,
        _ = lifetime::shutdown::listen_for_shutdown() => {
            handle.stop(true).await;
            warn!("Server stopped");
        }
    }

    Ok(())
}
