use std::fmt::Debug;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Request, State,
    },
    http::{StatusCode, Uri},
    middleware::Next,
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::Serialize;
use tracing::{error, warn};

use super::AppState;
use crate::auth::AuthError;
use crate::order_actor::OrderError;
use crate::product_actor::ProductError;
use crate::user_actor::UserError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    InvalidId,
    BadRequest,
    Conflict,
    Unauthorized,
    Forbidden,
    Internal,
}

impl ErrorKind {
    pub fn status(self) -> StatusCode {
        match self {
            ErrorKind::NotFound | ErrorKind::InvalidId => StatusCode::NOT_FOUND,
            ErrorKind::BadRequest => StatusCode::BAD_REQUEST,
            ErrorKind::Conflict => StatusCode::CONFLICT,
            ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorKind::Forbidden => StatusCode::FORBIDDEN,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// A failed request as the client sees it. `detail` is only rendered
/// outside production.
#[derive(Debug, Clone)]
pub struct ApiError {
    pub kind: ErrorKind,
    pub message: String,
    detail: String,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    message: String,
    stack: Option<String>,
}

impl ApiError {
    pub fn new(kind: ErrorKind, message: impl Into<String>, source: &impl Debug) -> Self {
        Self {
            kind,
            message: message.into(),
            detail: format!("{source:?}"),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        let message = message.into();
        Self::new(ErrorKind::NotFound, message.clone(), &message)
    }

    /// The 404 for anything no route or static file answers.
    pub fn route_not_found(uri: &Uri) -> Self {
        let target = uri.path_and_query().map_or(uri.path(), |pq| pq.as_str());
        Self::not_found(format!("Not Found - {target}"))
    }

    pub fn invalid_id(raw: &str) -> Self {
        Self::new(ErrorKind::InvalidId, "Invalid ID", &format!("cannot parse document id {raw:?}"))
    }

    fn body(&self, production: bool) -> ErrorBody {
        ErrorBody {
            message: self.message.clone(),
            stack: (!production).then(|| self.detail.clone()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = self.body(true);
        (self.kind.status(), Extension(self), Json(body)).into_response()
    }
}

/// Re-renders every [`ApiError`] response with the stack shown or hidden
/// according to the production flag. Bare 404/405 responses from the router
/// or the static file service become the route-not-found error.
pub async fn render_errors(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let path = uri.path().to_string();
    let mut response = next.run(request).await;

    let error = match response.extensions_mut().remove::<ApiError>() {
        Some(error) => error,
        None if matches!(response.status(), StatusCode::NOT_FOUND | StatusCode::METHOD_NOT_ALLOWED) => {
            ApiError::route_not_found(&uri)
        }
        None => return response,
    };
    if error.kind == ErrorKind::Internal {
        error!(%method, %path, message = %error.message, detail = %error.detail, "Request failed");
    } else {
        warn!(%method, %path, status = error.kind.status().as_u16(), message = %error.message, "Request rejected");
    }
    (error.kind.status(), Json(error.body(state.config.production))).into_response()
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::new(ErrorKind::BadRequest, rejection.body_text(), &rejection)
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::new(ErrorKind::BadRequest, rejection.body_text(), &rejection)
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        let kind = match err {
            AuthError::MissingToken | AuthError::InvalidToken => ErrorKind::Unauthorized,
            AuthError::NotAdmin => ErrorKind::Forbidden,
            AuthError::Signing(_) => ErrorKind::Internal,
        };
        ApiError::new(kind, err.to_string(), &err)
    }
}

impl From<ProductError> for ApiError {
    fn from(err: ProductError) -> Self {
        let (kind, message) = match &err {
            ProductError::NotFound(_) => (ErrorKind::NotFound, "Product not found".to_string()),
            ProductError::CatalogEmpty => (ErrorKind::NotFound, err.to_string()),
            ProductError::AlreadyReviewed => (ErrorKind::Conflict, err.to_string()),
            ProductError::InvalidRating(_) | ProductError::CreationFailed(_) => (ErrorKind::BadRequest, err.to_string()),
            ProductError::DatabaseError(_) | ProductError::ActorCommunicationError(_) => {
                (ErrorKind::Internal, err.to_string())
            }
        };
        ApiError::new(kind, message, &err)
    }
}

impl From<OrderError> for ApiError {
    fn from(err: OrderError) -> Self {
        let (kind, message) = match &err {
            OrderError::NotFound(_) => (ErrorKind::NotFound, "Order not found".to_string()),
            OrderError::NoItems | OrderError::InvalidUser(_) => (ErrorKind::BadRequest, err.to_string()),
            OrderError::NotOwner(_) => (ErrorKind::Forbidden, "Not authorized to view this order".to_string()),
            OrderError::DatabaseError(_) | OrderError::ActorCommunicationError(_) => {
                (ErrorKind::Internal, err.to_string())
            }
        };
        ApiError::new(kind, message, &err)
    }
}

impl From<UserError> for ApiError {
    fn from(err: UserError) -> Self {
        let (kind, message) = match &err {
            UserError::NotFound(_) => (ErrorKind::NotFound, "User not found".to_string()),
            UserError::AlreadyExists(_) | UserError::CannotDeleteAdmin | UserError::ValidationError(_) => {
                (ErrorKind::BadRequest, err.to_string())
            }
            UserError::InvalidCredentials => (ErrorKind::Unauthorized, err.to_string()),
            UserError::HashError(_) | UserError::ActorCommunicationError(_) => (ErrorKind::Internal, err.to_string()),
        };
        ApiError::new(kind, message, &err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_errors_map_to_statuses() {
        let cases: Vec<(ApiError, StatusCode)> = vec![
            (ProductError::NotFound("x".into()).into(), StatusCode::NOT_FOUND),
            (ProductError::AlreadyReviewed.into(), StatusCode::CONFLICT),
            (ProductError::InvalidRating("abc".into()).into(), StatusCode::BAD_REQUEST),
            (OrderError::NoItems.into(), StatusCode::BAD_REQUEST),
            (OrderError::NotOwner("x".into()).into(), StatusCode::FORBIDDEN),
            (UserError::InvalidCredentials.into(), StatusCode::UNAUTHORIZED),
            (UserError::CannotDeleteAdmin.into(), StatusCode::BAD_REQUEST),
            (AuthError::NotAdmin.into(), StatusCode::FORBIDDEN),
            (AuthError::MissingToken.into(), StatusCode::UNAUTHORIZED),
            (UserError::ActorCommunicationError("closed".into()).into(), StatusCode::INTERNAL_SERVER_ERROR),
            (ApiError::invalid_id("nope"), StatusCode::NOT_FOUND),
        ];
        for (error, status) in cases {
            assert_eq!(error.kind.status(), status, "{}", error.message);
        }
    }

    #[test]
    fn route_not_found_keeps_the_query_string() {
        let uri: Uri = "/api/nowhere?page=2".parse().unwrap();
        let error = ApiError::route_not_found(&uri);
        assert_eq!(error.kind, ErrorKind::NotFound);
        assert_eq!(error.message, "Not Found - /api/nowhere?page=2");
    }

    #[test]
    fn stack_is_hidden_in_production() {
        let error = ApiError::from(ProductError::AlreadyReviewed);
        assert_eq!(error.message, "Product already reviewed");
        assert!(error.body(true).stack.is_none());
        assert_eq!(error.body(false).stack.as_deref(), Some("AlreadyReviewed"));
    }
}
