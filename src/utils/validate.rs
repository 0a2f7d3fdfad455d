//! Extractors that deserialize a payload and then run its `validator` rules.
//!
//! Deserialization failures surface as the matching rejection conversion
//! (400/422); rule failures become `AppError::ValidationErrors` (422).

use axum::extract::rejection::{FormRejection, JsonRejection, QueryRejection};
use axum::extract::{Form, FromRequest, FromRequestParts, Json, Query, Request};
use axum::http::request::Parts;
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> AppResult<Self> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        value.validate()?;
        Ok(ValidatedJson(value))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedForm<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedForm<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
    Form<T>: FromRequest<S, Rejection = FormRejection>,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> AppResult<Self> {
        let Form(value) = Form::<T>::from_request(req, state).await?;
        value.validate()?;
        Ok(ValidatedForm(value))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedQuery<T>(pub T);

impl<T, S> FromRequestParts<S> for ValidatedQuery<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> AppResult<Self> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|e: QueryRejection| AppError::from(e))?;
        value.validate()?;
        Ok(ValidatedQuery(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Method, header};
    use serde::Deserialize;

    #[derive(Debug, Deserialize, Validate)]
    struct LoginForm {
        #[validate(email(message = "Invalid email format"))]
        username: String,
        #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
        password: String,
    }

    #[derive(Debug, Deserialize, Validate)]
    struct Paging {
        #[validate(range(min = 1, max = 100))]
        size: u32,
    }

    fn form_request(body: &'static str, content_type: &str) -> Request {
        Request::builder()
            .method(Method::POST)
            .uri("/test")
            .header(header::CONTENT_TYPE, content_type)
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_valid_form() {
        let req = form_request(
            "username=a%40example.com&password=long-enough",
            "application/x-www-form-urlencoded",
        );
        let ValidatedForm(form) = ValidatedForm::<LoginForm>::from_request(req, &())
            .await
            .unwrap();
        assert_eq!(form.username, "a@example.com");
    }

    #[tokio::test]
    async fn test_form_rule_failures_are_collected() {
        let req = form_request(
            "username=nope&password=short",
            "application/x-www-form-urlencoded",
        );
        match ValidatedForm::<LoginForm>::from_request(req, &()).await {
            Err(AppError::ValidationErrors { errors }) => {
                let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
                assert_eq!(fields, vec!["password", "username"]);
            }
            other => panic!("expected ValidationErrors, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_json_missing_field_is_unprocessable() {
        let req = form_request(r#"{"username":"a@example.com"}"#, "application/json");
        let result = ValidatedJson::<LoginForm>::from_request(req, &()).await;
        assert!(matches!(result, Err(AppError::UnprocessableContent { .. })));
    }

    #[tokio::test]
    async fn test_json_wrong_content_type_is_bad_request() {
        let req = form_request(r#"{"username":"a"}"#, "text/plain");
        let result = ValidatedJson::<LoginForm>::from_request(req, &()).await;
        assert!(matches!(result, Err(AppError::BadRequest { .. })));
    }

    #[tokio::test]
    async fn test_query_range_is_checked() {
        let req = Request::builder().uri("/test?size=500").body(Body::empty()).unwrap();
        let (mut parts, _) = req.into_parts();
        let result = ValidatedQuery::<Paging>::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(AppError::ValidationErrors { .. })));

        let req = Request::builder().uri("/test?size=5").body(Body::empty()).unwrap();
        let (mut parts, _) = req.into_parts();
        let ValidatedQuery(q) = ValidatedQuery::<Paging>::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        assert_eq!(q.size, 5);
    }
}
