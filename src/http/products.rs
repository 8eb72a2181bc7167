use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use super::{AdminUser, ApiError, AppState, CurrentUser, DocumentId};
use crate::clients::{page_number, search_keyword, ProductPage};
use crate::domain::Product;
use crate::product_actor::{ProductUpdate, ReviewInput};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogParams {
    keyword: Option<String>,
    page_number: Option<String>,
}

pub async fn list_products(
    State(state): State<AppState>,
    params: Result<Query<CatalogParams>, QueryRejection>,
) -> Result<Json<ProductPage>, ApiError> {
    let Query(params) = params?;
    let keyword = search_keyword(params.keyword.as_deref());
    let page = page_number(params.page_number.as_deref());
    Ok(Json(state.products.list_products(keyword, page).await?))
}

pub async fn top_products(State(state): State<AppState>) -> Result<Json<Vec<Product>>, ApiError> {
    Ok(Json(state.products.top_products().await?))
}

pub async fn get_product(State(state): State<AppState>, DocumentId(id): DocumentId) -> Result<Json<Product>, ApiError> {
    Ok(Json(state.products.get_product(id).await?))
}

pub async fn create_product(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
) -> Result<(StatusCode, Json<Product>), ApiError> {
    let product = state.products.create_sample_product(admin.id).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

pub async fn update_product(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
    DocumentId(id): DocumentId,
    payload: Result<Json<ProductUpdate>, JsonRejection>,
) -> Result<(StatusCode, Json<Product>), ApiError> {
    let Json(update) = payload?;
    let product = state.products.update_product(id, update).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

pub async fn delete_product(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
    DocumentId(id): DocumentId,
) -> Result<Json<Value>, ApiError> {
    state.products.delete_product(id).await?;
    Ok(Json(json!({ "message": "Product removed" })))
}

pub async fn create_review(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    DocumentId(id): DocumentId,
    payload: Result<Json<ReviewInput>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let Json(input) = payload?;
    state.products.add_review(id, &user, input).await?;
    Ok((StatusCode::CREATED, Json(json!({ "message": "Review added" }))))
}
