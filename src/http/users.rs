use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use axum_extra::extract::cookie::CookieJar;
use serde_json::{json, Value};

use super::extract::{clear_session, session_cookie};
use super::{AdminUser, ApiError, AppState, CurrentUser, DocumentId};
use crate::domain::{User, UserSummary};
use crate::user_actor::{AdminUserUpdate, LoginInput, ProfileUpdate, RegisterInput};

fn with_session(state: &AppState, jar: CookieJar, user: &User) -> Result<CookieJar, ApiError> {
    let token = state.tokens.issue(user.id)?;
    Ok(jar.add(session_cookie(token, state.tokens.ttl(), state.config.production)))
}

pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    payload: Result<Json<RegisterInput>, JsonRejection>,
) -> Result<(StatusCode, CookieJar, Json<UserSummary>), ApiError> {
    let Json(input) = payload?;
    let user = state.users.register(input).await?;
    let jar = with_session(&state, jar, &user)?;
    Ok((StatusCode::CREATED, jar, Json(UserSummary::from(&user))))
}

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    payload: Result<Json<LoginInput>, JsonRejection>,
) -> Result<(CookieJar, Json<UserSummary>), ApiError> {
    let Json(input) = payload?;
    let user = state.users.authenticate(input).await?;
    let jar = with_session(&state, jar, &user)?;
    Ok((jar, Json(UserSummary::from(&user))))
}

pub async fn logout(jar: CookieJar) -> (CookieJar, Json<Value>) {
    (clear_session(jar), Json(json!({ "message": "Logged out successfully" })))
}

pub async fn profile(CurrentUser(user): CurrentUser) -> Json<UserSummary> {
    Json(UserSummary::from(&user))
}

pub async fn update_profile(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    payload: Result<Json<ProfileUpdate>, JsonRejection>,
) -> Result<Json<UserSummary>, ApiError> {
    let Json(update) = payload?;
    let user = state.users.update_profile(user.id, update).await?;
    Ok(Json(UserSummary::from(&user)))
}

pub async fn list_users(State(state): State<AppState>, AdminUser(_): AdminUser) -> Result<Json<Vec<User>>, ApiError> {
    Ok(Json(state.users.list_users().await?))
}

pub async fn get_user(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
    DocumentId(id): DocumentId,
) -> Result<Json<User>, ApiError> {
    Ok(Json(state.users.get_user(id).await?))
}

pub async fn update_user(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
    DocumentId(id): DocumentId,
    payload: Result<Json<AdminUserUpdate>, JsonRejection>,
) -> Result<Json<UserSummary>, ApiError> {
    let Json(update) = payload?;
    let user = state.users.update_user(id, update).await?;
    Ok(Json(UserSummary::from(&user)))
}

pub async fn delete_user(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
    DocumentId(id): DocumentId,
) -> Result<Json<Value>, ApiError> {
    state.users.delete_user(id).await?;
    Ok(Json(json!({ "message": "User removed" })))
}
