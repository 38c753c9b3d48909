use std::fmt;

use async_graphql::{ErrorExtensions, SimpleObject};
use serde::{Deserialize, Serialize};

#[derive(Debug)]
pub enum AppError {
    DatabaseError(String),
    UpstreamError(String),
    ConfigError(String),
    HashingError(String),
    SessionStoreError(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::DatabaseError(msg) => write!(f, "Database error: {}", msg),
            AppError::UpstreamError(msg) => write!(f, "Catalog API error: {}", msg),
            AppError::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            AppError::HashingError(msg) => write!(f, "Password hashing error: {}", msg),
            AppError::SessionStoreError(msg) => write!(f, "Session store error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        AppError::DatabaseError(e.to_string())
    }
}

impl From<sqlx::migrate::MigrateError> for AppError {
    fn from(e: sqlx::migrate::MigrateError) -> Self {
        AppError::DatabaseError(format!("migration failed: {}", e))
    }
}

impl From<redis::RedisError> for AppError {
    fn from(e: redis::RedisError) -> Self {
        AppError::SessionStoreError(e.to_string())
    }
}

impl From<reqwest::Error> for AppError {
    fn from(e: reqwest::Error) -> Self {
        AppError::UpstreamError(e.to_string())
    }
}

/// A single user-attributable problem, reported against the input field
/// that caused it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, SimpleObject)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Validation and authentication failures of a mutation.
///
/// Checks fail fast, so in practice this holds a single entry, but the list
/// shape is what the structured reporting mode hands back to clients.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self(vec![FieldError::new(field, message)])
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.0
    }

    pub fn into_inner(self) -> Vec<FieldError> {
        self.0
    }

    pub fn first_message(&self) -> &str {
        self.0
            .first()
            .map(|e| e.message.as_str())
            .unwrap_or("Invalid input")
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<String> = self
            .0
            .iter()
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect();
        write!(f, "{}", messages.join(", "))
    }
}

impl std::error::Error for ValidationErrors {}

/// Thrown rendering: the first problem becomes the GraphQL error message,
/// the field rides along in the extensions.
impl From<ValidationErrors> for async_graphql::Error {
    fn from(errors: ValidationErrors) -> Self {
        let field = errors
            .errors()
            .first()
            .map(|e| e.field.clone())
            .unwrap_or_default();

        async_graphql::Error::new(errors.first_message()).extend_with(|_, ext| {
            ext.set("code", "BAD_USER_INPUT");
            ext.set("field", field.clone());
        })
    }
}

/// Outcome of a service-layer mutation.
#[derive(Debug)]
pub enum ServiceError {
    /// User-attributable: bad input or bad credentials.
    Invalid(ValidationErrors),
    /// Infrastructure failure that has to surface to the caller.
    Internal(AppError),
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceError::Invalid(errors) => write!(f, "{}", errors),
            ServiceError::Internal(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for ServiceError {}

impl From<ValidationErrors> for ServiceError {
    fn from(errors: ValidationErrors) -> Self {
        ServiceError::Invalid(errors)
    }
}

impl From<AppError> for ServiceError {
    fn from(e: AppError) -> Self {
        ServiceError::Internal(e)
    }
}

impl From<sqlx::Error> for ServiceError {
    fn from(e: sqlx::Error) -> Self {
        ServiceError::Internal(e.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_errors_render_first_message() {
        let errors = ValidationErrors::single("email", "Email already taken.");
        assert_eq!(errors.first_message(), "Email already taken.");
        assert_eq!(errors.to_string(), "email: Email already taken.");
    }

    #[test]
    fn test_graphql_error_carries_field_extension() {
        let errors = ValidationErrors::single("password", "Incorrect password.");
        let gql: async_graphql::Error = errors.into();
        assert_eq!(gql.message, "Incorrect password.");

        let extensions = gql.extensions.expect("extensions set");
        assert_eq!(
            extensions.get("field"),
            Some(&async_graphql::Value::from("password"))
        );
    }

    #[test]
    fn test_sqlx_error_maps_to_database_error() {
        let e: AppError = sqlx::Error::RowNotFound.into();
        assert!(matches!(e, AppError::DatabaseError(_)));
    }
}
