//! JSON body extractor that runs `validator` rules before the handler sees the payload.

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;
use validator::Validate;

use super::format_validation_errors;
use crate::errors::AppError;

/// Deserialized and validated JSON body.
///
/// ```rust,ignore
/// use storefront::api::extractors::ValidatedJson;
/// use storefront::domain::AccountForm;
///
/// async fn update(ValidatedJson(form): ValidatedJson<AccountForm>) {
///     // every field rule already passed
/// }
/// ```
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| AppError::validation(e.body_text()))?;

        value
            .validate()
            .map_err(|e| AppError::validation(format_validation_errors(&e)))?;

        Ok(ValidatedJson(value))
    }
}
