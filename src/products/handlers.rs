use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use super::{
    dto::{
        DataResponse, ListQuery, ListResponse, MessageResponse, Pagination, ProductPayload,
        PAGE_SIZE,
    },
    repo_types::Product,
};
use crate::{
    auth::{claims::Role, extractors::AuthUser},
    error::ApiError,
    state::AppState,
};

pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(list_products).post(create_product))
        .route(
            "/products/:id",
            get(get_product).put(update_product).delete(delete_product),
        )
}

fn body(
    payload: Result<Json<ProductPayload>, JsonRejection>,
) -> Result<ProductPayload, ApiError> {
    payload
        .map(|Json(p)| p)
        .map_err(|e| ApiError::BadRequest(e.body_text()))
}

/// Ids that are not UUIDs cannot name a stored product.
fn product_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::NotFound("Product"))
}

#[instrument(skip(state, query), fields(user_id = %user.0.subject))]
pub async fn list_products(
    State(state): State<AppState>,
    user: AuthUser,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<ListResponse<Product>>, ApiError> {
    let q = query.map(|Query(q)| q).unwrap_or_else(|e| {
        debug!(error = %e.body_text(), "unreadable list query, using page 1");
        ListQuery::default()
    });
    let page = q.page();
    let result = state
        .products
        .list(page, PAGE_SIZE)
        .await
        .map_err(|e| ApiError::internal("Failed to fetch products", e))?;

    Ok(Json(ListResponse {
        success: true,
        data: result.items,
        pagination: Pagination::new(result.total, page, PAGE_SIZE),
    }))
}

#[instrument(skip(state, payload), fields(user_id = %user.0.subject))]
pub async fn create_product(
    State(state): State<AppState>,
    user: AuthUser,
    payload: Result<Json<ProductPayload>, JsonRejection>,
) -> Result<(StatusCode, Json<DataResponse<Product>>), ApiError> {
    let input = body(payload)?.validate()?;
    let product = state
        .products
        .create(input)
        .await
        .map_err(|e| ApiError::internal("Failed to create product", e))?;

    info!(product_id = %product.id, ndc = %product.ndc, "product created");
    Ok((StatusCode::CREATED, Json(DataResponse::ok(product))))
}

#[instrument(skip(state), fields(user_id = %user.0.subject))]
pub async fn get_product(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<DataResponse<Product>>, ApiError> {
    let id = product_id(&id)?;
    state
        .products
        .get(id)
        .await
        .map_err(|e| ApiError::internal("Failed to fetch product", e))?
        .map(|p| Json(DataResponse::ok(p)))
        .ok_or(ApiError::NotFound("Product"))
}

#[instrument(skip(state, payload), fields(user_id = %user.0.subject))]
pub async fn update_product(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    payload: Result<Json<ProductPayload>, JsonRejection>,
) -> Result<Json<DataResponse<Product>>, ApiError> {
    let id = product_id(&id)?;
    let input = body(payload)?.validate()?;
    let product = state
        .products
        .update(id, input)
        .await
        .map_err(|e| ApiError::internal("Failed to update product", e))?
        .ok_or(ApiError::NotFound("Product"))?;

    info!(product_id = %product.id, "product updated");
    Ok(Json(DataResponse::ok(product)))
}

#[instrument(skip(state), fields(user_id = %user.0.subject))]
pub async fn delete_product(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let admin = user.require(Role::Admin)?;
    let id = product_id(&id)?;
    let deleted = state
        .products
        .delete(id)
        .await
        .map_err(|e| ApiError::internal("Failed to delete product", e))?;
    if !deleted {
        return Err(ApiError::NotFound("Product"));
    }

    info!(product_id = %id, admin_id = %admin.subject, "product deleted");
    Ok(Json(MessageResponse {
        success: true,
        message: "Product deleted",
    }))
}
