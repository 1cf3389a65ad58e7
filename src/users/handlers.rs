use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::instrument;

use crate::state::AppState;
use crate::users::dto::{
    CreateUser, CreateUserRequest, UpdateUserRequest, UserListResponse, UserResponse,
};
use crate::users::error::{UserError, UserResult};
use crate::users::validate::FieldError;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route(
            "/users/:id",
            get(get_user).put(update_user).delete(delete_user),
        )
}

/// Request-level required check: every missing create field is rejected here,
/// before the service is invoked.
fn required_fields(payload: CreateUserRequest) -> Result<CreateUser, UserError> {
    let mut missing = Vec::new();
    if payload.name.is_none() {
        missing.push(FieldError::new("name", "is required"));
    }
    if payload.email.is_none() {
        missing.push(FieldError::new("email", "is required"));
    }
    if payload.password.is_none() {
        missing.push(FieldError::new("password", "is required"));
    }
    if !missing.is_empty() {
        return Err(UserError::Validation(missing));
    }
    Ok(CreateUser {
        name: payload.name.unwrap_or_default(),
        email: payload.email.unwrap_or_default(),
        password: payload.password.unwrap_or_default(),
    })
}

#[instrument(skip(state))]
async fn list_users(State(state): State<AppState>) -> UserResult<Json<UserListResponse>> {
    let users = state.users.list_users().await?;
    Ok(Json(UserListResponse {
        users: users.into_iter().map(UserResponse::from).collect(),
    }))
}

#[instrument(skip(state))]
async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> UserResult<Json<UserResponse>> {
    let user = state.users.get_user(&id).await?;
    Ok(Json(user.into()))
}

#[instrument(skip(state, payload))]
async fn create_user(
    State(state): State<AppState>,
    Json(payload): Json<CreateUserRequest>,
) -> UserResult<(StatusCode, Json<UserResponse>)> {
    let input = required_fields(payload)?;
    let user = state.users.create_user(input).await?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

#[instrument(skip(state, payload))]
async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateUserRequest>,
) -> UserResult<Json<UserResponse>> {
    let user = state.users.update_user(&id, payload.into()).await?;
    Ok(Json(user.into()))
}

#[instrument(skip(state))]
async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> UserResult<StatusCode> {
    state.users.delete_user(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use axum::Router;
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tower::ServiceExt; // for oneshot()

    use crate::app::build_app;
    use crate::state::AppState;

    fn app() -> Router {
        build_app(AppState::fake())
    }

    fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap()
    }

    fn empty_request(method: &str, uri: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    async fn body_json(body: Body) -> Value {
        let bytes = body.collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn ada_payload() -> Value {
        json!({ "name": "Ada", "email": "ada@x.com", "password": "secret1" })
    }

    #[tokio::test]
    async fn full_crud_scenario() {
        let app = app();

        // create
        let response = app
            .clone()
            .oneshot(json_request("POST", "/users", ada_payload()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let created = body_json(response.into_body()).await;
        let id = created["id"].as_str().unwrap().to_string();
        assert!(!id.is_empty());
        assert_eq!(created["name"], "Ada");
        assert_eq!(created["email"], "ada@x.com");
        assert_eq!(created["created_at"], created["updated_at"]);

        // read back: the same object the create returned
        let response = app
            .clone()
            .oneshot(empty_request("GET", &format!("/users/{id}")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response.into_body()).await, created);

        // partial update: name only
        let response = app
            .clone()
            .oneshot(json_request(
                "PUT",
                &format!("/users/{id}"),
                json!({ "name": "Ada L" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let updated = body_json(response.into_body()).await;
        assert_eq!(updated["name"], "Ada L");
        assert_eq!(updated["email"], "ada@x.com");

        // delete
        let response = app
            .clone()
            .oneshot(empty_request("DELETE", &format!("/users/{id}")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        // gone
        let response = app
            .oneshot(empty_request("GET", &format!("/users/{id}")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn create_without_required_fields_is_rejected_before_the_service() {
        let app = app();

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/users",
                json!({ "email": "ada@x.com" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response.into_body()).await;
        let message = body["message"].as_str().unwrap();
        assert!(message.contains("name"));
        assert!(message.contains("password"));

        // nothing was stored
        let response = app.oneshot(empty_request("GET", "/users")).await.unwrap();
        let body = body_json(response.into_body()).await;
        assert_eq!(body["users"].as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn create_with_short_password_is_400() {
        let app = app();

        let response = app
            .oneshot(json_request(
                "POST",
                "/users",
                json!({ "name": "Ada", "email": "ada@x.com", "password": "12345" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response.into_body()).await;
        assert!(body["message"].as_str().unwrap().contains("password"));
    }

    #[tokio::test]
    async fn duplicate_email_is_409() {
        let app = app();

        let response = app
            .clone()
            .oneshot(json_request("POST", "/users", ada_payload()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = app
            .oneshot(json_request("POST", "/users", ada_payload()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn malformed_id_reads_as_not_found() {
        let app = app();

        let response = app
            .clone()
            .oneshot(empty_request("GET", "/users/not-an-object-id"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = app
            .oneshot(empty_request("DELETE", "/users/not-an-object-id"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn unknown_json_fields_are_silently_dropped() {
        let app = app();

        let mut payload = ada_payload();
        payload["role"] = json!("admin");
        let response = app
            .clone()
            .oneshot(json_request("POST", "/users", payload))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let created = body_json(response.into_body()).await;
        assert!(created.get("role").is_none());

        let id = created["id"].as_str().unwrap();
        let response = app
            .oneshot(json_request(
                "PUT",
                &format!("/users/{id}"),
                json!({ "name": "Ada L", "id": "hijack", "unknown": true }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let updated = body_json(response.into_body()).await;
        assert_eq!(updated["id"], id);
        assert_eq!(updated["name"], "Ada L");
    }

    #[tokio::test]
    async fn responses_never_contain_the_password() {
        let app = app();

        let response = app
            .clone()
            .oneshot(json_request("POST", "/users", ada_payload()))
            .await
            .unwrap();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        assert!(!String::from_utf8_lossy(&bytes).contains("password"));

        let response = app.oneshot(empty_request("GET", "/users")).await.unwrap();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        assert!(!String::from_utf8_lossy(&bytes).contains("password"));
    }

    #[tokio::test]
    async fn health_is_reachable() {
        let response = app()
            .oneshot(empty_request("GET", "/health"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
