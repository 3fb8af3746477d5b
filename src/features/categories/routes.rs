use std::sync::Arc;

use axum::{middleware::from_fn_with_state, routing::get, Router};

use crate::core::middleware::optional_auth_middleware;
use crate::features::auth::JwtValidator;
use crate::features::categories::handlers;
use crate::features::categories::services::CategoryService;

/// Create routes for the categories feature
///
/// Reads are public (hidden categories only for admins); create, update and
/// delete require an admin session.
pub fn routes(service: Arc<CategoryService>, validator: Arc<JwtValidator>) -> Router {
    Router::new()
        .route(
            "/api/categories",
            get(handlers::list_categories).post(handlers::create_category),
        )
        .route("/api/categories/tree", get(handlers::category_tree))
        .route("/api/categories/slug-preview", get(handlers::preview_slug))
        .route(
            "/api/categories/slug/{slug}",
            get(handlers::get_category_by_slug),
        )
        .route(
            "/api/categories/{id}",
            get(handlers::get_category)
                .put(handlers::update_category)
                .delete(handlers::delete_category),
        )
        .route_layer(from_fn_with_state(validator, optional_auth_middleware))
        .with_state(service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::auth::model::UserRole;
    use crate::features::categories::store::InMemoryCategoryStore;
    use crate::shared::test_helpers::{category_service, mint_token, mint_token_with, TEST_JWT_SECRET};
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::{json, Value};
    use std::time::Duration;

    fn server() -> (TestServer, Arc<InMemoryCategoryStore>) {
        let (service, store) = category_service();
        let validator = Arc::new(JwtValidator::new(
            TEST_JWT_SECRET,
            None,
            Duration::from_secs(0),
        ));
        let server = TestServer::new(routes(service, validator)).unwrap();
        (server, store)
    }

    fn admin_token() -> String {
        mint_token("admin-1", UserRole::Admin)
    }

    async fn create(server: &TestServer, body: Value) -> Value {
        let response = server
            .post("/api/categories")
            .authorization_bearer(admin_token())
            .json(&body)
            .await;
        response.assert_status(StatusCode::CREATED);
        response.json::<Value>()
    }

    #[tokio::test]
    async fn test_create_returns_201_with_defaults() {
        let (server, _) = server();

        let body = create(&server, json!({ "name": "Công nghệ", "description": "x" })).await;

        assert_eq!(body["message"], "Category created successfully");
        assert_eq!(body["data"]["slug"], "cong-nghe");
        assert_eq!(body["data"]["icon"], "📁");
        assert_eq!(body["data"]["color"], "#2563EB");
        assert_eq!(body["data"]["isPublished"], true);
        assert_eq!(body["data"]["status"], "active");
    }

    #[tokio::test]
    async fn test_mutations_require_admin() {
        let (server, store) = server();
        let body = json!({ "name": "Ops", "description": "x" });

        let anonymous = server.post("/api/categories").json(&body).await;
        anonymous.assert_status(StatusCode::UNAUTHORIZED);

        let user_token = mint_token("user-1", UserRole::User);
        let forbidden = server
            .post("/api/categories")
            .authorization_bearer(&user_token)
            .json(&body)
            .await;
        forbidden.assert_status(StatusCode::FORBIDDEN);
        assert!(forbidden.json::<Value>()["error"].is_string());
        assert_eq!(store.len().await, 0);

        let created = create(&server, body).await;
        let id = created["data"]["id"].as_str().unwrap().to_string();

        server
            .put(&format!("/api/categories/{}", id))
            .authorization_bearer(&user_token)
            .json(&json!({ "name": "Ops", "slug": "hacked", "description": "x" }))
            .await
            .assert_status(StatusCode::FORBIDDEN);

        server
            .delete(&format!("/api/categories/{}", id))
            .authorization_bearer(&user_token)
            .await
            .assert_status(StatusCode::FORBIDDEN);

        let still_there = server.get(&format!("/api/categories/{}", id)).await;
        still_there.assert_status_ok();
        assert_eq!(still_there.json::<Value>()["data"]["slug"], "ops");
    }

    #[tokio::test]
    async fn test_invalid_or_expired_token_is_401() {
        let (server, _) = server();

        server
            .get("/api/categories")
            .authorization_bearer("not-a-jwt")
            .await
            .assert_status(StatusCode::UNAUTHORIZED);

        let expired = mint_token_with("admin-1", UserRole::Admin, TEST_JWT_SECRET, -3600, None);
        server
            .get("/api/categories")
            .authorization_bearer(expired)
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_validation_error_names_the_field() {
        let (server, store) = server();

        let response = server
            .post("/api/categories")
            .authorization_bearer(admin_token())
            .json(&json!({ "name": "AI", "description": "   " }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body = response.json::<Value>();
        assert_eq!(body["field"], "description");
        assert!(body["error"].as_str().unwrap().contains("description"));
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test]
    async fn test_duplicate_slug_is_400() {
        let (server, _) = server();
        create(&server, json!({ "name": "Design", "description": "x" })).await;

        let response = server
            .post("/api/categories")
            .authorization_bearer(admin_token())
            .json(&json!({ "name": "Other", "slug": "design", "description": "x" }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(response.json::<Value>()["field"], "slug");
    }

    #[tokio::test]
    async fn test_malformed_id_is_400_and_unknown_id_is_404() {
        let (server, _) = server();

        let malformed = server.get("/api/categories/not-a-uuid").await;
        malformed.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(malformed.json::<Value>(), json!({ "error": "invalid id" }));

        server
            .delete("/api/categories/not-a-uuid")
            .authorization_bearer(admin_token())
            .await
            .assert_status(StatusCode::BAD_REQUEST);

        let missing = server
            .get(&format!("/api/categories/{}", uuid::Uuid::new_v4()))
            .await;
        missing.assert_status(StatusCode::NOT_FOUND);
        assert!(missing.json::<Value>()["error"].is_string());
    }

    #[tokio::test]
    async fn test_list_paginates_and_searches() {
        let (server, _) = server();
        for (order, name) in ["AI one", "AI two", "AI three"].iter().enumerate() {
            create(
                &server,
                json!({ "name": name, "description": "x", "order": order }),
            )
            .await;
        }
        create(&server, json!({ "name": "Cooking", "description": "food" })).await;

        let response = server
            .get("/api/categories")
            .add_query_param("search", "ai")
            .add_query_param("page", 2)
            .add_query_param("limit", 1)
            .await;

        response.assert_status_ok();
        let body = response.json::<Value>();
        assert_eq!(body["data"].as_array().unwrap().len(), 1);
        assert_eq!(body["data"][0]["name"], "AI two");
        assert_eq!(
            body["pagination"],
            json!({ "page": 2, "limit": 1, "total": 3, "pages": 3 })
        );
    }

    #[tokio::test]
    async fn test_huge_page_number_returns_empty_page() {
        let (server, _) = server();
        create(&server, json!({ "name": "Only", "description": "x" })).await;

        let response = server
            .get("/api/categories")
            .add_query_param("page", i64::MAX)
            .add_query_param("limit", 100)
            .await;

        response.assert_status_ok();
        let body = response.json::<Value>();
        assert_eq!(body["data"], json!([]));
        assert_eq!(body["pagination"]["total"], 1);
        assert_eq!(body["pagination"]["page"], i64::MAX);
    }

    #[tokio::test]
    async fn test_public_list_omits_hidden_parent() {
        let (server, _) = server();
        let hidden = create(
            &server,
            json!({ "name": "Secret Merger Plans", "description": "x", "isPublished": false }),
        )
        .await;
        create(
            &server,
            json!({ "name": "Press kit", "description": "x", "parentId": hidden["data"]["id"] }),
        )
        .await;

        let public = server.get("/api/categories").await.json::<Value>();
        assert_eq!(public["data"][0]["slug"], "press-kit");
        assert_eq!(public["data"][0]["parent"], Value::Null);
        assert!(!public.to_string().contains("secret-merger-plans"));

        let admin = server
            .get("/api/categories/slug/press-kit")
            .authorization_bearer(admin_token())
            .await
            .json::<Value>();
        assert_eq!(admin["data"]["parent"]["slug"], "secret-merger-plans");
    }

    #[tokio::test]
    async fn test_hidden_categories_visible_to_admin_only() {
        let (server, _) = server();
        let draft = create(
            &server,
            json!({ "name": "Draft", "description": "x", "isPublished": false }),
        )
        .await;
        let path = format!("/api/categories/{}", draft["data"]["id"].as_str().unwrap());

        server.get(&path).await.assert_status(StatusCode::NOT_FOUND);
        server
            .get(&path)
            .authorization_bearer(admin_token())
            .await
            .assert_status_ok();

        let public = server.get("/api/categories").await.json::<Value>();
        assert_eq!(public["pagination"]["total"], 0);

        let admin = server
            .get("/api/categories")
            .authorization_bearer(admin_token())
            .await
            .json::<Value>();
        assert_eq!(admin["pagination"]["total"], 1);

        let opted_out = server
            .get("/api/categories")
            .add_query_param("includeHidden", false)
            .authorization_bearer(admin_token())
            .await
            .json::<Value>();
        assert_eq!(opted_out["pagination"]["total"], 0);
    }

    #[tokio::test]
    async fn test_slug_change_end_to_end() {
        let (server, _) = server();
        let created = create(&server, json!({ "name": "Công nghệ", "description": "x" })).await;
        let id = created["data"]["id"].as_str().unwrap().to_string();
        assert_eq!(created["data"]["slug"], "cong-nghe");

        let response = server
            .put(&format!("/api/categories/{}", id))
            .authorization_bearer(admin_token())
            .json(&json!({ "name": "Công nghệ", "slug": "technology", "description": "x" }))
            .await;
        response.assert_status_ok();
        assert_eq!(response.json::<Value>()["message"], "Category updated successfully");

        server
            .get("/api/categories/slug/cong-nghe")
            .await
            .assert_status(StatusCode::NOT_FOUND);

        let found = server.get("/api/categories/slug/technology").await;
        found.assert_status_ok();
        assert_eq!(found.json::<Value>()["data"]["id"], id.as_str());
    }

    #[tokio::test]
    async fn test_cyclic_parent_is_400() {
        let (server, _) = server();
        let root = create(&server, json!({ "name": "Root", "description": "x" })).await;
        let root_id = root["data"]["id"].as_str().unwrap().to_string();
        let child = create(
            &server,
            json!({ "name": "Child", "description": "x", "parentId": root_id }),
        )
        .await;
        assert_eq!(child["data"]["parent"]["slug"], "root");

        let response = server
            .put(&format!("/api/categories/{}", root_id))
            .authorization_bearer(admin_token())
            .json(&json!({
                "name": "Root",
                "slug": "root",
                "description": "x",
                "parentId": child["data"]["id"]
            }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(response.json::<Value>()["field"], "parentId");
    }

    #[tokio::test]
    async fn test_delete_flow() {
        let (server, store) = server();
        let parent = create(&server, json!({ "name": "Parent", "description": "x" })).await;
        let parent_id = parent["data"]["id"].as_str().unwrap().to_string();
        let child = create(
            &server,
            json!({ "name": "Child", "description": "x", "parentId": parent_id }),
        )
        .await;

        server
            .delete(&format!("/api/categories/{}", parent_id))
            .authorization_bearer(admin_token())
            .await
            .assert_status(StatusCode::CONFLICT);
        assert_eq!(store.len().await, 2);

        let response = server
            .delete(&format!(
                "/api/categories/{}",
                child["data"]["id"].as_str().unwrap()
            ))
            .authorization_bearer(admin_token())
            .await;
        response.assert_status_ok();
        assert_eq!(
            response.json::<Value>(),
            json!({ "message": "Category deleted successfully" })
        );

        server
            .delete(&format!("/api/categories/{}", parent_id))
            .authorization_bearer(admin_token())
            .await
            .assert_status_ok();
        server
            .get(&format!("/api/categories/{}", parent_id))
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_tree_and_slug_preview() {
        let (server, _) = server();
        let root = create(&server, json!({ "name": "Engineering", "description": "x" })).await;
        create(
            &server,
            json!({ "name": "Backend", "description": "x", "parentId": root["data"]["id"] }),
        )
        .await;

        let tree = server.get("/api/categories/tree").await.json::<Value>();
        assert_eq!(tree["data"][0]["slug"], "engineering");
        assert_eq!(tree["data"][0]["children"][0]["slug"], "backend");

        let preview = server
            .get("/api/categories/slug-preview")
            .add_query_param("name", "Quy trình làm việc")
            .await
            .json::<Value>();
        assert_eq!(preview["data"]["slug"], "quy-trinh-lam-viec");
    }
}
