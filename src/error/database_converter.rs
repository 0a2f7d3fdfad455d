use crate::error::{AppError, ConstraintParser};
use diesel::result::{DatabaseErrorInformation, DatabaseErrorKind, Error as DieselError};

/// Turns Diesel errors into `AppError`s.
///
/// Constraint violations are client mistakes (duplicate email, dangling
/// reference) and must never surface as a 500.
pub struct DatabaseErrorConverter;

impl DatabaseErrorConverter {
    pub fn convert_diesel_error(error: DieselError, operation: &str) -> AppError {
        match error {
            DieselError::DatabaseError(kind, info) => {
                Self::convert_database_error(kind, info.as_ref(), operation)
            }
            DieselError::NotFound => AppError::not_found("resource", "id", "unknown"),
            other => AppError::Database {
                operation: operation.to_string(),
                source: anyhow::Error::from(other),
            },
        }
    }

    fn convert_database_error(
        kind: DatabaseErrorKind,
        info: &(dyn DatabaseErrorInformation + Send + Sync),
        operation: &str,
    ) -> AppError {
        let message = info.message();
        let constraint = info.constraint_name();

        let converted = match kind {
            DatabaseErrorKind::UniqueViolation => {
                ConstraintParser::parse_unique_violation(message, constraint).map(
                    |(entity, field, value)| AppError::Duplicate {
                        entity,
                        field,
                        value,
                    },
                )
            }
            DatabaseErrorKind::NotNullViolation => {
                ConstraintParser::parse_not_null_violation(message, constraint).map(
                    |(entity, field)| AppError::Validation {
                        field,
                        reason: format!("Field is required for {entity}"),
                    },
                )
            }
            DatabaseErrorKind::ForeignKeyViolation => {
                ConstraintParser::parse_foreign_key_violation(message, constraint).map(
                    |(entity, field, value)| AppError::Validation {
                        field,
                        reason: format!("Invalid reference from {entity} with value '{value}'"),
                    },
                )
            }
            DatabaseErrorKind::CheckViolation => {
                ConstraintParser::parse_check_violation(message, constraint).map(
                    |(entity, field)| AppError::Validation {
                        field,
                        reason: format!("Check constraint failed for {entity}"),
                    },
                )
            }
            _ => None,
        };

        converted.unwrap_or_else(|| AppError::Database {
            operation: operation.to_string(),
            source: anyhow::anyhow!("{kind:?}: {message}"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FakeInfo {
        message: String,
        constraint: Option<String>,
    }

    impl DatabaseErrorInformation for FakeInfo {
        fn message(&self) -> &str {
            &self.message
        }
        fn details(&self) -> Option<&str> {
            None
        }
        fn hint(&self) -> Option<&str> {
            None
        }
        fn table_name(&self) -> Option<&str> {
            None
        }
        fn column_name(&self) -> Option<&str> {
            None
        }
        fn constraint_name(&self) -> Option<&str> {
            self.constraint.as_deref()
        }
        fn statement_position(&self) -> Option<i32> {
            None
        }
    }

    fn db_error(kind: DatabaseErrorKind, message: &str, constraint: Option<&str>) -> DieselError {
        DieselError::DatabaseError(
            kind,
            Box::new(FakeInfo {
                message: message.to_string(),
                constraint: constraint.map(str::to_string),
            }),
        )
    }

    #[test]
    fn test_duplicate_email_is_a_client_error() {
        let error = db_error(
            DatabaseErrorKind::UniqueViolation,
            "duplicate key value violates unique constraint \"users_email_key\"\nDETAIL: Key (email)=(ada@example.com) already exists.",
            Some("users_email_key"),
        );
        let converted = DatabaseErrorConverter::convert_diesel_error(error, "insert user");
        match converted {
            AppError::Duplicate { entity, field, value } => {
                assert_eq!(entity, "users");
                assert_eq!(field, "email");
                assert_eq!(value, "ada@example.com");
            }
            other => panic!("expected Duplicate, got {other:?}"),
        }
    }

    #[test]
    fn test_foreign_key_violation_becomes_validation() {
        let error = db_error(
            DatabaseErrorKind::ForeignKeyViolation,
            "insert or update on table \"documents\" violates foreign key constraint \"documents_owner_id_fkey\"\nDETAIL: Key (owner_id)=(999) is not present in table \"users\".",
            Some("documents_owner_id_fkey"),
        );
        match DatabaseErrorConverter::convert_diesel_error(error, "insert document") {
            AppError::Validation { field, reason } => {
                assert_eq!(field, "owner_id");
                assert!(reason.contains("999"));
            }
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    #[test]
    fn test_not_found_maps_to_not_found() {
        let converted = DatabaseErrorConverter::convert_diesel_error(DieselError::NotFound, "find");
        assert!(matches!(converted, AppError::NotFound { .. }));
    }

    #[test]
    fn test_unparseable_violation_falls_back_to_database_error() {
        let error = db_error(DatabaseErrorKind::UniqueViolation, "opaque failure", None);
        let converted = DatabaseErrorConverter::convert_diesel_error(error, "insert thing");
        assert!(matches!(converted, AppError::Database { ref operation, .. } if operation == "insert thing"));
    }
}
