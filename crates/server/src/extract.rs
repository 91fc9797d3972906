//! Request extractors whose rejections go through [`ServerError`].
//!
//! They behave like axum's `Json`, `Path` and `Query`, but a malformed body,
//! id or query string becomes a 400 with the usual `{ "error": ... }` body.

use axum::{
    extract::{
        FromRequest, FromRequestParts, Request,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::request::Parts,
};
use serde::de::DeserializeOwned;

use crate::ServerError;

pub struct JsonBody<T>(pub T);

pub struct PathParam<T>(pub T);

pub struct QueryParams<T>(pub T);

impl From<JsonRejection> for ServerError {
    fn from(rejection: JsonRejection) -> Self {
        ServerError::Generic(format!("invalid request body: {}", rejection.body_text()))
    }
}

impl From<PathRejection> for ServerError {
    fn from(rejection: PathRejection) -> Self {
        ServerError::Generic(format!("invalid path: {}", rejection.body_text()))
    }
}

impl From<QueryRejection> for ServerError {
    fn from(rejection: QueryRejection) -> Self {
        ServerError::Generic(format!("invalid query: {}", rejection.body_text()))
    }
}

impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ServerError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let axum::Json(value) = axum::Json::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}

impl<S, T> FromRequestParts<S> for PathParam<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = ServerError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let axum::extract::Path(value) =
            axum::extract::Path::<T>::from_request_parts(parts, state).await?;
        Ok(Self(value))
    }
}

impl<S, T> FromRequestParts<S> for QueryParams<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ServerError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let axum::extract::Query(value) =
            axum::extract::Query::<T>::from_request_parts(parts, state).await?;
        Ok(Self(value))
    }
}

#[cfg(test)]
mod tests {
    use axum::{
        Router,
        body::Body,
        http::{Request, StatusCode, header},
        response::IntoResponse,
        routing::post,
    };
    use serde::Deserialize;
    use tower::ServiceExt;
    use uuid::Uuid;

    use super::*;

    #[derive(Deserialize)]
    struct Window {
        #[allow(dead_code)]
        from: chrono::NaiveDate,
    }

    async fn handler(
        PathParam(_id): PathParam<Uuid>,
        QueryParams(_q): QueryParams<Window>,
        JsonBody(_body): JsonBody<Window>,
    ) -> impl IntoResponse {
        StatusCode::NO_CONTENT
    }

    async fn call(uri: &str, body: &str) -> (StatusCode, String, String) {
        let app = Router::new().route("/items/{id}", post(handler));
        let res = app
            .oneshot(
                Request::post(uri)
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = res.status();
        let content_type = res
            .headers()
            .get(header::CONTENT_TYPE)
            .map(|v| v.to_str().unwrap().to_string())
            .unwrap_or_default();
        let bytes = http_body_util::BodyExt::collect(res.into_body())
            .await
            .unwrap()
            .to_bytes();
        (status, content_type, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn well_formed_request_passes() {
        let id = Uuid::new_v4();
        let (status, _, _) = call(
            &format!("/items/{id}?from=2025-03-01"),
            r#"{"from":"2025-03-01"}"#,
        )
        .await;
        assert_eq!(status, StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn rejections_are_json_400s() {
        let id = Uuid::new_v4();
        for (uri, body, prefix) in [
            ("/items/not-a-uuid?from=2025-03-01".to_string(), r#"{"from":"2025-03-01"}"#, "invalid path"),
            (format!("/items/{id}?from=yesterday"), r#"{"from":"2025-03-01"}"#, "invalid query"),
            (format!("/items/{id}?from=2025-03-01"), r#"{"from":"2025-13-01"}"#, "invalid request body"),
            (format!("/items/{id}?from=2025-03-01"), "not json", "invalid request body"),
        ] {
            let (status, content_type, text) = call(&uri, body).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
            assert_eq!(content_type, "application/json");
            let body: serde_json::Value = serde_json::from_str(&text).unwrap();
            assert!(body["error"].as_str().unwrap().starts_with(prefix), "{text}");
        }
    }
}
