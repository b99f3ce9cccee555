use axum::async_trait;
use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use axum::Json;

use crate::utils::error::AppError;

/// JSON body extractor that folds every rejection into the error taxonomy.
///
/// The stock `Json` extractor answers data-shape failures with 422 and only
/// syntax failures with 400; a malformed body of either kind is an invalid
/// argument here, so both surface as 400 with the standard error envelope.
pub struct AppJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for AppJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(AppJson(value)),
            Err(rejection) => Err(AppError::InvalidArgument(rejection.body_text())),
        }
    }
}
