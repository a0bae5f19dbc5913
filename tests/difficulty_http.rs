mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::app::{spawn_test_app, spawn_without_model};
use common::fixtures::difficulty_request;
use common::http::{assert_json_error, predict};
use quiz_inference_backend::inference::Variant;

#[tokio::test]
async fn it_predicts_next_difficulty_label() {
    let app = spawn_test_app(Variant::Difficulty);

    let (status, _, body) = predict(&app.app, difficulty_request()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "dificultad_siguiente_pregunta": "medio" }));
}

#[tokio::test]
async fn it_label_follows_the_answer_and_streak() {
    let app = spawn_test_app(Variant::Difficulty);

    let mut wrong = difficulty_request();
    wrong["respuesta_correcta"] = json!(0);
    let (_, _, body) = predict(&app.app, wrong).await;
    assert_eq!(body["dificultad_siguiente_pregunta"], "facil");

    let mut streak = difficulty_request();
    streak["racha_aciertos"] = json!(4);
    streak["dificultad_pregunta_anterior"] = json!("dificil");
    let (_, _, body) = predict(&app.app, streak).await;
    assert_eq!(body["dificultad_siguiente_pregunta"], "dificil");
}

#[tokio::test]
async fn it_rejects_unseen_category() {
    let app = spawn_test_app(Variant::Difficulty);

    let mut payload = difficulty_request();
    payload["dificultad_pregunta_anterior"] = json!("imposible");
    let (status, _, body) = predict(&app.app, payload).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_json_error(&body, "UNKNOWN_CATEGORY");
    assert!(body["error"].as_str().unwrap().contains("imposible"));
}

#[tokio::test]
async fn it_category_must_be_a_string() {
    let app = spawn_test_app(Variant::Difficulty);

    let mut payload = difficulty_request();
    payload["dificultad_pregunta_anterior"] = json!(2);
    let (status, _, body) = predict(&app.app, payload).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_json_error(&body, "INVALID_DATA_TYPES");
}

#[tokio::test]
async fn it_difficulty_age_bounds() {
    let app = spawn_test_app(Variant::Difficulty);

    let mut young = difficulty_request();
    young["edad"] = json!(0);
    let (status, _, _) = predict(&app.app, young).await;
    assert_eq!(status, StatusCode::OK);

    let mut old = difficulty_request();
    old["edad"] = json!(19);
    let (status, _, body) = predict(&app.app, old).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_json_error(&body, "INVALID_AGE");
}

#[tokio::test]
async fn it_all_difficulty_fields_are_required() {
    let app = spawn_test_app(Variant::Difficulty);

    let mut payload = difficulty_request();
    payload.as_object_mut().unwrap().remove("tiempo_respuesta");
    payload.as_object_mut().unwrap().remove("nro_ronda");
    let (status, _, body) = predict(&app.app, payload).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_json_error(&body, "MISSING_FIELDS");
    assert_eq!(body["campos_opcionales"], json!([]));
}

#[tokio::test]
async fn it_missing_codec_disables_predictions() {
    let app = spawn_without_model(Variant::Difficulty);

    let (status, _, body) = predict(&app.app, difficulty_request()).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_json_error(&body, "MODEL_NOT_LOADED");
}
