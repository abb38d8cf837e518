//! Example "todo" resource mounted by the demo binary.
//!
//! Nothing is persisted: each action shows how a handler reports success or
//! one of the error variants.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Request};
use axum::http::header::LOCATION;
use axum::http::{HeaderValue, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Map, Value};

use api_server::errors::HttpError;
use api_server::http::{FullBaseUrl, RequestContext};

pub fn router() -> Router {
    Router::new()
        .route("/todos", get(retrieve_todo_list).post(create_todo))
        .route(
            "/todos/{todo_id}",
            get(retrieve_todo).put(update_todo).delete(delete_todo),
        )
        .route_layer(middleware::from_fn(require_authentication))
}

async fn require_authentication(request: Request, next: Next) -> Result<Response, HttpError> {
    // Unauthorized example:
    // return Err(HttpError::unauthorized().auth_bearer(None, None, None));
    Ok(next.run(request).await)
}

async fn retrieve_todo_list() -> Json<Value> {
    // ...retrieve from backend...
    Json(json!([
        {"id": 1, "title": "Do something", "isComplete": true},
        {"id": 2, "title": "Do something else", "isComplete": false},
    ]))
}

async fn create_todo(
    FullBaseUrl(base_url): FullBaseUrl,
    ctx: RequestContext,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Response, HttpError> {
    let Json(body) = body?;
    let mut todo = match validate_todo(body) {
        Ok(todo) => todo,
        Err(err) => {
            tracing::error!(req_id = %ctx.request_id, "Invalid todo body");
            return Err(err);
        }
    };

    // ...save in backend...
    let id = "3";
    todo.insert("id".to_string(), Value::from(id));

    let location = HeaderValue::from_str(&format!("{base_url}/todos/{id}"))
        .map_err(|_| HttpError::internal_server_error())?;
    Ok((StatusCode::CREATED, [(LOCATION, location)], Json(Value::Object(todo))).into_response())
}

async fn retrieve_todo(Path(todo_id): Path<String>) -> Json<Value> {
    Json(fetch_todo(&todo_id))
}

async fn update_todo(Path(todo_id): Path<String>) -> Result<Json<Value>, HttpError> {
    let _todo = fetch_todo(&todo_id);
    // Resource is forbidden to this user
    Err(HttpError::forbidden())
}

async fn delete_todo(Path(todo_id): Path<String>) -> Result<StatusCode, HttpError> {
    let _todo = fetch_todo(&todo_id);
    // Method is not allowed for this user
    Err(HttpError::method_not_allowed())
}

fn fetch_todo(id: &str) -> Value {
    json!({"id": id, "title": "Do something", "isComplete": false})
}

/// Keep the known properties of a todo and check their types.
fn validate_todo(body: Value) -> Result<Map<String, Value>, HttpError> {
    let Value::Object(fields) = body else {
        return Err(invalid().with_field_error("data", "is the wrong type"));
    };

    let todo: Map<String, Value> = fields
        .into_iter()
        .filter(|(k, _)| matches!(k.as_str(), "id" | "title" | "isComplete"))
        .collect();

    let mut problems: Vec<(&str, &str)> = Vec::new();
    match todo.get("title") {
        None => problems.push(("data.title", "is required")),
        Some(Value::String(s)) if s.chars().count() > 255 => {
            problems.push(("data.title", "has longer length than allowed"))
        }
        Some(Value::String(_)) => {}
        Some(_) => problems.push(("data.title", "is the wrong type")),
    }
    match todo.get("id") {
        Some(Value::String(s)) if s.chars().count() > 64 => {
            problems.push(("data.id", "has longer length than allowed"))
        }
        Some(Value::String(_)) | None => {}
        Some(_) => problems.push(("data.id", "is the wrong type")),
    }
    if todo.get("isComplete").is_some_and(|v| !v.is_boolean()) {
        problems.push(("data.isComplete", "is the wrong type"));
    }

    if problems.is_empty() {
        return Ok(todo);
    }
    Err(problems
        .into_iter()
        .fold(invalid(), |err, (field, message)| err.with_field_error(field, message)))
}

fn invalid() -> HttpError {
    HttpError::unprocessable_entity().with_message("Invalid todo resource body")
}
