use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use todo_api::v1::{CreateTodo, Message, TodoCreated, TodoList, TodoView, UpdateTodo};
use tracing::info;

use crate::{
    error::ApiError,
    store::{NewTodo, TodoId, TodoStore},
    AppState,
};

pub fn router<S: TodoStore>() -> Router<Arc<AppState<S>>> {
    Router::new()
        .route("/todo", get(list_todos::<S>).post(create_todo::<S>))
        .route("/todo/", get(list_todos::<S>).post(create_todo::<S>))
        .route("/todo/:id", put(update_todo::<S>).delete(delete_todo::<S>))
}

async fn list_todos<S: TodoStore>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<TodoList>, ApiError> {
    let todos = state
        .store
        .find_all()
        .await
        .map_err(ApiError::storage("Error fetching todos"))?;

    Ok(Json(TodoList {
        data: todos.into_iter().map(TodoView::from).collect(),
    }))
}

async fn create_todo<S: TodoStore>(
    State(state): State<Arc<AppState<S>>>,
    payload: Result<Json<CreateTodo>, JsonRejection>,
) -> Result<(StatusCode, Json<TodoCreated>), ApiError> {
    let Json(todo) = payload?;
    if todo.title.is_empty() {
        return Err(ApiError::MissingTitle);
    }

    let id = state
        .store
        .insert(NewTodo::now(todo.title.clone()))
        .await
        .map_err(ApiError::storage("Failed saving the todo"))?;

    info!(
        id = %id,
        title = %todo.title,
        "created todo"
    );

    Ok((
        StatusCode::CREATED,
        Json(TodoCreated {
            message: String::from("Todo created successfully"),
            todo_id: id.to_string(),
        }),
    ))
}

async fn update_todo<S: TodoStore>(
    State(state): State<Arc<AppState<S>>>,
    id: Result<Path<String>, PathRejection>,
    payload: Result<Json<UpdateTodo>, JsonRejection>,
) -> Result<Json<Message>, ApiError> {
    let id = parse_id(&state.store, id)?;
    let Json(todo) = payload?;
    if todo.title.is_empty() {
        return Err(ApiError::MissingTitle);
    }

    state
        .store
        .update(&id, &todo.title, todo.completed)
        .await
        .map_err(ApiError::storage("Failed to update todo"))?;

    info!(
        id = %id,
        title = %todo.title,
        completed = todo.completed,
        "updated todo"
    );

    Ok(Json(Message::new("Todo updated successfully")))
}

async fn delete_todo<S: TodoStore>(
    State(state): State<Arc<AppState<S>>>,
    id: Result<Path<String>, PathRejection>,
) -> Result<Json<Message>, ApiError> {
    let id = parse_id(&state.store, id)?;

    state
        .store
        .delete(&id)
        .await
        .map_err(ApiError::storage("Failed to delete todo"))?;

    info!(id = %id, "deleted todo");

    Ok(Json(Message::new("Todo deleted successfully")))
}

fn parse_id<S: TodoStore>(
    store: &S,
    raw: Result<Path<String>, PathRejection>,
) -> Result<TodoId, ApiError> {
    // undecodable ids are as invalid as malformed ones
    let Ok(Path(raw)) = raw else {
        return Err(ApiError::InvalidId);
    };
    store.parse_id(raw.trim()).ok_or(ApiError::InvalidId)
}
