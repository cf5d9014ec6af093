//! User API endpoints

use api_types::user::{UserNew, UserRename, UserView};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{ServerError, server::ServerState};

fn view(user: engine::User) -> UserView {
    UserView {
        id: user.id,
        name: user.name,
        created_at: user.created_at,
    }
}

/// Handle requests for creating a new user
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<UserNew>,
) -> Result<(StatusCode, Json<UserView>), ServerError> {
    let user = state.engine.create_user(&payload.name).await?;
    Ok((StatusCode::CREATED, Json(view(user))))
}

pub async fn list(State(state): State<ServerState>) -> Result<Json<Vec<UserView>>, ServerError> {
    let users = state.engine.list_users().await?;
    Ok(Json(users.into_iter().map(view).collect()))
}

pub async fn get(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<UserView>, ServerError> {
    let user = state.engine.user(id).await?;
    Ok(Json(view(user)))
}

pub async fn rename(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UserRename>,
) -> Result<Json<UserView>, ServerError> {
    let user = state.engine.rename_user(id, &payload.name).await?;
    Ok(Json(view(user)))
}

/// Delete a user. Fails with 409 while expenses still refer to it.
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_user(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
