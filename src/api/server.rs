use axum::Json;
use serde_json::{json, Value};

/// GET /api/health - 健康检查
pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "build_time": env!("BUILD_TIME"),
    }))
}

#[cfg(test)]
mod tests {
    use crate::api::test_support::{app, get, send_json};
    use axum::http::StatusCode;

    #[tokio::test]
    async fn test_health_reports_version() {
        let (app, _) = app().await;
        let (status, body) = send_json(&app, get("/api/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
        assert!(body["build_time"].as_str().unwrap().ends_with("UTC"));
    }
}
