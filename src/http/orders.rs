use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};

use super::{AdminUser, ApiError, AppState, CurrentUser, DocumentId};
use crate::domain::Order;
use crate::order_actor::{OrderInput, PaymentInput};

pub async fn create_order(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    payload: Result<Json<OrderInput>, JsonRejection>,
) -> Result<(StatusCode, Json<Order>), ApiError> {
    let Json(input) = payload?;
    let order = state.orders.create_order(input.into_create(user.id)).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

pub async fn my_orders(State(state): State<AppState>, CurrentUser(user): CurrentUser) -> Result<Json<Vec<Order>>, ApiError> {
    Ok(Json(state.orders.orders_for_user(user.id).await?))
}

pub async fn get_order(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    DocumentId(id): DocumentId,
) -> Result<Json<Order>, ApiError> {
    Ok(Json(state.orders.get_order_for(id, &user).await?))
}

pub async fn pay_order(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    DocumentId(id): DocumentId,
    payload: Result<Json<PaymentInput>, JsonRejection>,
) -> Result<Json<Order>, ApiError> {
    let Json(payment) = payload?;
    Ok(Json(state.orders.pay_order(id, &user, payment.into()).await?))
}

pub async fn deliver_order(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
    DocumentId(id): DocumentId,
) -> Result<Json<Order>, ApiError> {
    Ok(Json(state.orders.deliver_order(id).await?))
}

pub async fn list_orders(State(state): State<AppState>, AdminUser(_): AdminUser) -> Result<Json<Vec<Order>>, ApiError> {
    Ok(Json(state.orders.all_orders().await?))
}
