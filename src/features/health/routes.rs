use axum::{routing::get, Router};

use crate::features::health::handlers;

pub fn routes() -> Router {
    Router::new().route("/api/health", get(handlers::health_check))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum_test::TestServer;
    use serde_json::Value;

    #[tokio::test]
    async fn test_health_reports_ok() {
        let server = TestServer::new(routes()).unwrap();

        let response = server.get("/api/health").await;

        response.assert_status_ok();
        let body = response.json::<Value>();
        assert_eq!(body["status"], "ok");
        assert!(body["message"].is_string());
        assert!(body["timestamp"].is_string());
    }
}
