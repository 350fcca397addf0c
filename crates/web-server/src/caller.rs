use crate::error::AppError;
use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use core_types::Address;

pub const CALLER_HEADER: &str = "x-caller";

/// The account a request acts as, taken from the `x-caller` header.
#[derive(Debug, Clone, Copy)]
pub struct Caller(pub Address);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for Caller {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(CALLER_HEADER)
            .ok_or_else(|| AppError::BadRequest(format!("missing {} header", CALLER_HEADER)))?
            .to_str()
            .map_err(|_| AppError::BadRequest(format!("{} header is not valid text", CALLER_HEADER)))?;

        raw.parse::<Address>()
            .map(Caller)
            .map_err(|e| AppError::BadRequest(e.to_string()))
    }
}
