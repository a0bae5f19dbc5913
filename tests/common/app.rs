use axum::Router;
use tempfile::TempDir;

use quiz_inference_backend::config::{Config, VariantConfig};
use quiz_inference_backend::inference::{Pipeline, Variant};
use quiz_inference_backend::model::load_artifacts;
use quiz_inference_backend::routes::build_router;
use quiz_inference_backend::state::AppState;

use super::fixtures;

pub struct TestApp {
    pub app: Router,
    pub state: AppState,
    pub config: Config,
    _temp_dir: TempDir,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Artifacts {
    /// Model (and codec, for difficulty) written to disk.
    Present,
    /// Nothing on disk; the service runs but cannot predict.
    Missing,
}

// 直接构造 Config，避免使用 set_var 造成多线程测试环境变量竞态
fn test_config(variant: Variant, dir: &TempDir) -> Config {
    let mut variant_cfg = VariantConfig::for_variant(variant);
    variant_cfg.model_path = dir.path().join("modelo.json").to_string_lossy().to_string();
    variant_cfg.encoder_path = variant_cfg
        .encoder_path
        .map(|_| dir.path().join("label_encoder.json").to_string_lossy().to_string());

    Config {
        host: std::net::IpAddr::V4(std::net::Ipv4Addr::new(127, 0, 0, 1)),
        port: 5000,
        cors_origins: vec!["http://localhost:5173".to_string()],
        variant: variant_cfg,
    }
}

pub fn spawn_with(variant: Variant, artifacts: Artifacts, tweak: impl FnOnce(&mut VariantConfig)) -> TestApp {
    let temp_dir = tempfile::tempdir().expect("tempdir");
    let mut config = test_config(variant, &temp_dir);
    tweak(&mut config.variant);

    if artifacts == Artifacts::Present {
        let (model, codec) = if variant.is_scoring() {
            (fixtures::scoring_model(), None)
        } else {
            (fixtures::difficulty_model(), Some(fixtures::difficulty_codec()))
        };
        fixtures::write_json(temp_dir.path(), "modelo.json", &model);
        if let Some(codec) = codec {
            fixtures::write_json(temp_dir.path(), "label_encoder.json", &codec);
        }
    }

    let loaded = load_artifacts(
        &config.variant.model_path,
        config.variant.encoder_path.as_deref(),
    )
    .expect("load artifacts");
    let pipeline =
        Pipeline::new(config.variant.pipeline_settings(), loaded.handle).expect("schema check");
    let state = AppState::new(pipeline, loaded.status);
    let app = build_router(state.clone());

    TestApp {
        app,
        state,
        config,
        _temp_dir: temp_dir,
    }
}

pub fn spawn_test_app(variant: Variant) -> TestApp {
    spawn_with(variant, Artifacts::Present, |_| {})
}

pub fn spawn_without_model(variant: Variant) -> TestApp {
    spawn_with(variant, Artifacts::Missing, |_| {})
}
