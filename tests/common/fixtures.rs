use std::path::{Path, PathBuf};

use serde_json::{json, Value};

/// Linear scorer over the scoring columns:
/// `100 - 2*tiempo + 10*provincia + edad - 5*vidas + 50*es_correcto`.
pub fn scoring_model() -> Value {
    json!({
        "kind": "linear_regression",
        "feature_names": [
            "tiempo_respuesta",
            "provincia_dificultad",
            "edad",
            "vidas_usadas",
            "es_correcto"
        ],
        "coefficients": [-2.0, 10.0, 1.0, -5.0, 50.0],
        "intercept": 100.0
    })
}

/// Raw score `scoring_model` produces for the given request values.
pub fn expected_raw(tiempo: f64, provincia: f64, edad: f64, vidas: f64, correcto: f64) -> f64 {
    100.0 - 2.0 * tiempo + 10.0 * provincia + edad - 5.0 * vidas + 50.0 * correcto
}

/// Single-tree classifier over the difficulty columns. Wrong answers step
/// down to "facil"; right answers go to "medio" with a short streak and
/// "dificil" once the streak exceeds one.
pub fn difficulty_model() -> Value {
    json!({
        "kind": "tree_ensemble",
        "task": "classification",
        "n_classes": 3,
        "feature_names": [
            "edad",
            "nro_ronda",
            "vidas_usadas_ronda",
            "racha_aciertos",
            "dificultad_pregunta_anterior",
            "respuesta_correcta",
            "tiempo_respuesta"
        ],
        "trees": [[
            {"feature": 5, "threshold": 0.5, "left": 1, "right": 2},
            {"value": [0.0, 1.0, 0.0]},
            {"feature": 3, "threshold": 1.5, "left": 3, "right": 4},
            {"value": [0.0, 0.0, 1.0]},
            {"value": [1.0, 0.0, 0.0]}
        ]]
    })
}

pub fn difficulty_codec() -> Value {
    json!({ "classes": ["dificil", "facil", "medio"] })
}

pub fn write_json(dir: &Path, name: &str, value: &Value) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, serde_json::to_vec_pretty(value).expect("serialize fixture"))
        .expect("write fixture");
    path
}

pub fn scoring_request() -> Value {
    json!({
        "tiempo_respuesta": 8.5,
        "provincia_dificultad": 3,
        "edad": 10,
        "vidas_usadas": 1,
        "es_correcto": 1
    })
}

pub fn difficulty_request() -> Value {
    json!({
        "edad": 9,
        "nro_ronda": 2,
        "vidas_usadas_ronda": 0,
        "racha_aciertos": 1,
        "dificultad_pregunta_anterior": "facil",
        "respuesta_correcta": 1,
        "tiempo_respuesta": 5.0
    })
}
