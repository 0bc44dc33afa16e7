//! Uniform tagged result contract returned by every exposed service
//! operation. Faults never cross this boundary raw: database and internal
//! errors are logged here and replaced with a generic message.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::log_error;
use crate::shared::errors::{AppError, AppResult};

#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<BTreeMap<String, String>>,
}

impl<T> ApiResponse<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
            errors: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
            errors: None,
        }
    }

    pub fn from_error(error: AppError) -> Self {
        match error {
            AppError::Validation(fields) => Self {
                success: false,
                message: "Validation failed".to_string(),
                data: None,
                errors: Some(fields.into_map()),
            },
            AppError::NotFound(message)
            | AppError::Conflict(message)
            | AppError::Unauthorized(message) => Self::failure(message),
            AppError::Database(detail) | AppError::Internal(detail) => {
                log_error!("Unexpected failure surfaced to caller: {}", detail);
                Self::failure("Something went wrong, please try again later")
            }
        }
    }

    pub fn from_result(result: AppResult<T>, ok_message: impl Into<String>) -> Self {
        match result {
            Ok(data) => Self::ok(ok_message, data),
            Err(error) => Self::from_error(error),
        }
    }

    /// Field error lookup, mainly for assertions at call sites and in tests.
    pub fn field_error(&self, field: &str) -> Option<&str> {
        self.errors
            .as_ref()
            .and_then(|map| map.get(field))
            .map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::errors::FieldErrors;

    #[test]
    fn ok_carries_data_and_no_errors() {
        let response = ApiResponse::ok("created", 42);
        assert!(response.success);
        assert_eq!(response.data, Some(42));
        assert!(response.errors.is_none());
    }

    #[test]
    fn validation_error_becomes_field_map() {
        let mut fields = FieldErrors::new();
        fields.add("genre_ids", "At least one genre is required");
        let response: ApiResponse<()> = ApiResponse::from_error(AppError::Validation(fields));

        assert!(!response.success);
        assert_eq!(
            response.field_error("genre_ids"),
            Some("At least one genre is required")
        );
    }

    #[test]
    fn database_detail_is_masked() {
        let response: ApiResponse<()> =
            ApiResponse::from_error(AppError::Database("connection refused at 10.0.0.3".into()));
        assert!(!response.success);
        assert!(!response.message.contains("10.0.0.3"));
    }

    #[test]
    fn wire_shape_omits_absent_data_and_errors() {
        let response: ApiResponse<u32> = ApiResponse::failure("Anime not found");
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"success": false, "message": "Anime not found"})
        );

        let response = ApiResponse::ok("Anime created", 7);
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["data"], 7);
        assert!(value.get("errors").is_none());
    }

    #[test]
    fn conflict_message_is_surfaced_verbatim() {
        let response: ApiResponse<()> =
            ApiResponse::from_error(AppError::Conflict("Genre 'Action' is used by 2 anime".into()));
        assert_eq!(response.message, "Genre 'Action' is used by 2 anime");
    }
}
