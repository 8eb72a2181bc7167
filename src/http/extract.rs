//! Request extractors: the authenticated caller, admin gate and document ids.

use axum::{
    extract::{FromRequestParts, Path},
    http::request::Parts,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use tracing::debug;
use uuid::Uuid;

use super::{ApiError, AppState};
use crate::auth::{AuthError, TOKEN_COOKIE};
use crate::domain::User;
use crate::user_actor::UserError;

/// The user behind the request's `token` cookie.
pub struct CurrentUser(pub User);

#[axum::async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let token = jar
            .get(TOKEN_COOKIE)
            .map(|cookie| cookie.value())
            .filter(|value| !value.is_empty())
            .ok_or(AuthError::MissingToken)?;

        let user_id = state.tokens.verify(token)?;
        match state.users.get_user(user_id).await {
            Ok(user) => Ok(CurrentUser(user)),
            Err(UserError::NotFound(_)) => {
                debug!(%user_id, "Token subject no longer exists");
                Err(AuthError::InvalidToken.into())
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// A [`CurrentUser`] with the admin flag set.
pub struct AdminUser(pub User);

#[axum::async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;
        if !user.is_admin {
            return Err(AuthError::NotAdmin.into());
        }
        Ok(AdminUser(user))
    }
}

/// The `:id` path segment, parsed as a document id. Anything unparsable is
/// answered with 404 "Invalid ID".
pub struct DocumentId(pub Uuid);

#[axum::async_trait]
impl<S: Send + Sync> FromRequestParts<S> for DocumentId {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiError::invalid_id(""))?;
        Uuid::parse_str(&raw).map(DocumentId).map_err(|_| ApiError::invalid_id(&raw))
    }
}

/// The session cookie set at login and registration.
pub fn session_cookie(token: String, max_age: chrono::Duration, secure: bool) -> Cookie<'static> {
    Cookie::build((TOKEN_COOKIE, token))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Strict)
        .path("/")
        .max_age(time::Duration::seconds(max_age.num_seconds()))
        .build()
}

/// Overwrites the session cookie with an expired, empty one.
pub fn clear_session(jar: CookieJar) -> CookieJar {
    let mut cookie = Cookie::build((TOKEN_COOKIE, "")).http_only(true).path("/").build();
    cookie.make_removal();
    jar.add(cookie)
}
