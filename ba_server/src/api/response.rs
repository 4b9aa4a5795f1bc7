//! Response envelope, error mapping and envelope-aware extractors.
//!
//! Success: `{status, success: true, message, data}`, with `totalItems`,
//! `totalPages`, `prepage` and `nextpage` added for paginated lists.
//! Failure: `{status, success: false, message}`.

use axum::{
    Json,
    extract::{
        FromRequest, FromRequestParts, Path, Query, Request,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use betting_admin::{AdminError, ErrorKind, Page};
use serde::{Serialize, de::DeserializeOwned};

/// Success envelope
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope<T> {
    pub status: u16,
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(flatten, skip_serializing_if = "Option::is_none")]
    pub page: Option<PageMeta>,
}

/// Pagination fields of a list envelope
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub page_number: u32,
    pub perpage: u32,
    pub total_items: i64,
    pub total_pages: i64,
    pub prepage: Option<String>,
    pub nextpage: Option<String>,
}

/// Handler result
pub type ApiResult = Result<Response, ApiError>;

fn envelope<T: Serialize>(
    status: StatusCode,
    message: impl Into<String>,
    data: Option<T>,
    page: Option<PageMeta>,
) -> Response {
    let body = Envelope {
        status: status.as_u16(),
        success: true,
        message: message.into(),
        data,
        page,
    };
    (status, Json(body)).into_response()
}

/// 200 with a payload
pub fn ok<T: Serialize>(message: impl Into<String>, data: T) -> ApiResult {
    Ok(envelope(StatusCode::OK, message, Some(data), None))
}

/// 201 with the created payload
pub fn created<T: Serialize>(message: impl Into<String>, data: T) -> ApiResult {
    Ok(envelope(StatusCode::CREATED, message, Some(data), None))
}

/// 200 without a payload
pub fn done(message: impl Into<String>) -> ApiResult {
    Ok(envelope::<()>(StatusCode::OK, message, None, None))
}

/// 200 with one page of items; links keep `path`
pub fn paginated<T: Serialize>(message: impl Into<String>, page: Page<T>, path: &str) -> ApiResult {
    let meta = PageMeta {
        page_number: page.page_number,
        perpage: page.perpage,
        total_items: page.total_items,
        total_pages: page.total_pages,
        prepage: page.previous_link(path),
        nextpage: page.next_link(path),
    };
    Ok(envelope(StatusCode::OK, message, Some(page.items), Some(meta)))
}

/// Error rendered as the failure envelope
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }
}

/// HTTP status for an error kind
pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::Validation => StatusCode::BAD_REQUEST,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorKind::Forbidden => StatusCode::FORBIDDEN,
        ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<AdminError> for ApiError {
    fn from(err: AdminError) -> Self {
        let kind = err.kind();
        match kind {
            ErrorKind::Internal => tracing::error!("Internal error: {}", err),
            ErrorKind::Unauthorized | ErrorKind::Forbidden => {
                tracing::warn!("Access refused: {}", err)
            }
            _ => tracing::debug!("Request failed: {}", err),
        }
        Self::new(status_for(kind), err.client_message())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(serde_json::json!({
            "status": self.status.as_u16(),
            "success": false,
            "message": self.message,
        }));
        (self.status, body).into_response()
    }
}

/// JSON body whose rejection uses the failure envelope
#[derive(Debug)]
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(ApiJson(value))
    }
}

/// Query string whose rejection uses the failure envelope
#[derive(Debug)]
pub struct ApiQuery<T>(pub T);

impl<S, T> FromRequestParts<S> for ApiQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state).await?;
        Ok(ApiQuery(value))
    }
}

/// Path parameters whose rejection uses the failure envelope
#[derive(Debug)]
pub struct ApiPath<T>(pub T);

impl<S, T> FromRequestParts<S> for ApiPath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state).await?;
        Ok(ApiPath(value))
    }
}
