use crate::errors::AppError;
use axum::extract::{FromRequest, Json, Request};
use serde::de::DeserializeOwned;
use validator::Validate;

/// JSON body run through `validator` before the handler sees it.
///
/// ```ignore
/// #[derive(Deserialize, Validate)]
/// struct AddToCart {
///     #[validate(range(min = 1))]
///     quantity: i32,
/// }
///
/// async fn add(ValidatedJson(input): ValidatedJson<AddToCart>) { /* ... */ }
/// ```
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(data) = Json::<T>::from_request(req, state).await?;
        data.validate()?;
        Ok(ValidatedJson(data))
    }
}
