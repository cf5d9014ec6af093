//! Expense category API endpoints

use api_types::category::{CategoriesInitialized, CategoryNew, CategoryUpdate, CategoryView};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{ServerError, server::ServerState};

fn view(category: engine::Category) -> CategoryView {
    CategoryView {
        id: category.id,
        name: category.name,
        description: category.description,
        is_default: category.is_default,
        created_at: category.created_at,
    }
}

pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<CategoryNew>,
) -> Result<(StatusCode, Json<CategoryView>), ServerError> {
    let category = state
        .engine
        .create_category(
            &payload.name,
            payload.description.as_deref(),
            payload.is_default,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(view(category))))
}

pub async fn list(
    State(state): State<ServerState>,
) -> Result<Json<Vec<CategoryView>>, ServerError> {
    let categories = state.engine.list_categories().await?;
    Ok(Json(categories.into_iter().map(view).collect()))
}

pub async fn get(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CategoryView>, ServerError> {
    let category = state.engine.category(id).await?;
    Ok(Json(view(category)))
}

pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CategoryUpdate>,
) -> Result<Json<CategoryView>, ServerError> {
    let category = state
        .engine
        .update_category(id, &payload.name, payload.description.as_deref())
        .await?;
    Ok(Json(view(category)))
}

pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_category(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Seed the default categories on an empty registry.
pub async fn init_defaults(
    State(state): State<ServerState>,
) -> Result<Json<CategoriesInitialized>, ServerError> {
    let created = state.engine.init_default_categories().await?;
    Ok(Json(CategoriesInitialized { created }))
}
