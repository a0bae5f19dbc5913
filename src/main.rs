use std::net::SocketAddr;

use axum::http::{header, HeaderValue};
use quiz_inference_backend::config::Config;
use quiz_inference_backend::inference::Pipeline;
use quiz_inference_backend::logging::{init_tracing, LogConfig};
use quiz_inference_backend::model::load_artifacts;
use quiz_inference_backend::response::panic_response;
use quiz_inference_backend::routes::build_router;
use quiz_inference_backend::state::AppState;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // 先初始化日志，配置解析中的告警才不会丢失
    init_tracing(&LogConfig::from_env());

    let config = Config::from_env();
    let variant_cfg = &config.variant;
    tracing::info!(
        variant = %variant_cfg.variant,
        model_path = %variant_cfg.model_path,
        encoder_path = ?variant_cfg.encoder_path,
        total_questions = variant_cfg.total_questions,
        provincia_dificultad_required = variant_cfg.provincia_dificultad_required,
        "Starting quiz-inference-backend"
    );

    let loaded = load_artifacts(&variant_cfg.model_path, variant_cfg.encoder_path.as_deref())
        .unwrap_or_else(|e| panic!("FATAL: Failed to load model artifacts: {e}"));

    // 启动自检：模型列、编码器与字段表必须一致，否则拒绝启动
    let pipeline = Pipeline::new(variant_cfg.pipeline_settings(), loaded.handle)
        .unwrap_or_else(|e| panic!("FATAL: Model artifacts do not match the request schema: {e}"));
    if pipeline.is_ready() {
        tracing::info!("Pipeline ready");
    } else {
        tracing::warn!("Pipeline running without a model, /predecir will answer MODEL_NOT_LOADED");
    }

    let state = AppState::new(pipeline, loaded.status);

    let app = build_router(state)
        .layer(build_cors_layer(&config))
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ));

    let addr = SocketAddr::new(config.host, config.port);
    tracing::info!(%addr, "Listening");
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind TCP listener");

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!(error = %e, "HTTP server crashed");
    }

    tracing::info!("Shutdown complete");
}

fn build_cors_layer(config: &Config) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .allow_methods(Any);

    if config.cors_origins.iter().any(|o| o.trim() == "*") {
        // 通配符模式仅用于开发环境
        return base.allow_origin(Any);
    }

    let origins = config
        .cors_origins
        .iter()
        .map(|origin| {
            origin.trim().parse::<HeaderValue>().unwrap_or_else(|e| {
                panic!(
                    "FATAL: Invalid CORS origin '{origin}': {e}. \
                     Fix the CORS_ORIGIN environment variable."
                )
            })
        })
        .collect::<Vec<_>>();

    base.allow_origin(AllowOrigin::list(origins))
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        let mut sigterm = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler");
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {},
            _ = sigterm.recv() => {},
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }

    tracing::info!("Shutdown signal received");
}
