//! Request decoding into untyped [`Fields`].

use axum::Form;
use axum::body::Bytes;
use axum::extract::{FromRequest, Query, Request};
use axum::http::{Method, header};

use crate::domain::Fields;
use crate::error::ApiError;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Extracts the request's fields.
///
/// - `GET` / `HEAD`: the query string.
/// - Form-encoded bodies: the form pairs.
/// - Any other body: a JSON object.
///
/// Decoding failures reject with [`ApiError::Decode`] (400); JSON values of
/// an unsupported kind reject with [`ApiError::Validation`] (400).
#[derive(Debug)]
pub struct RequestFields(pub Fields);

impl<S> FromRequest<S> for RequestFields
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if req.method() == Method::GET || req.method() == Method::HEAD {
            let Query(pairs) = Query::<Vec<(String, String)>>::try_from_uri(req.uri())
                .map_err(|rejection| ApiError::Decode(rejection.body_text()))?;
            return Ok(Self(Fields::from_pairs(pairs)));
        }

        if is_form(&req) {
            let Form(pairs) = Form::<Vec<(String, String)>>::from_request(req, state)
                .await
                .map_err(|rejection| ApiError::Decode(rejection.body_text()))?;
            return Ok(Self(Fields::from_pairs(pairs)));
        }

        let body = Bytes::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::Decode(rejection.body_text()))?;
        let object: serde_json::Map<String, serde_json::Value> = serde_json::from_slice(&body)
            .map_err(|err| ApiError::Decode(format!("Invalid JSON body: {err}")))?;
        Ok(Self(Fields::from_json(object)?))
    }
}

fn is_form(req: &Request) -> bool {
    req.headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with(FORM_CONTENT_TYPE))
}
