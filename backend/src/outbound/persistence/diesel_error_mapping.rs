//! Classification of Diesel failures shared by the repositories.
//!
//! Each repository turns a [`DieselFailure`] into its own port error. Driver
//! detail is logged at debug level and never copied into the port error.

use diesel::result::{DatabaseErrorInformation, DatabaseErrorKind, Error as DieselError};
use tracing::debug;

/// Coarse failure categories the repositories distinguish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum DieselFailure {
    /// The connection dropped mid-operation.
    Connection,
    /// A unique constraint rejected the write.
    UniqueViolation { constraint: Option<String> },
    /// A foreign key constraint rejected the write.
    ForeignKeyViolation { constraint: Option<String> },
    /// A check constraint rejected the write.
    CheckViolation { constraint: Option<String> },
    /// Anything else.
    Query { message: &'static str },
}

/// Classify a Diesel error.
pub(crate) fn classify_diesel_error(error: DieselError, operation: &'static str) -> DieselFailure {
    match &error {
        DieselError::DatabaseError(kind, info) => debug!(
            operation,
            ?kind,
            message = info.message(),
            constraint = info.constraint_name(),
            "diesel operation failed"
        ),
        _ => debug!(
            operation,
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            DieselFailure::Connection
        }
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            DieselFailure::UniqueViolation {
                constraint: constraint_of(info.as_ref()),
            }
        }
        DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, info) => {
            DieselFailure::ForeignKeyViolation {
                constraint: constraint_of(info.as_ref()),
            }
        }
        DieselError::DatabaseError(DatabaseErrorKind::CheckViolation, info) => {
            DieselFailure::CheckViolation {
                constraint: constraint_of(info.as_ref()),
            }
        }
        DieselError::NotFound => DieselFailure::Query {
            message: "record not found",
        },
        DieselError::QueryBuilderError(_) => DieselFailure::Query {
            message: "database query error",
        },
        _ => DieselFailure::Query {
            message: "database error",
        },
    }
}

fn constraint_of(info: &(dyn DatabaseErrorInformation + Send + Sync)) -> Option<String> {
    info.constraint_name().map(str::to_owned)
}

/// Whether a constraint name reported by PostgreSQL equals `expected`.
pub(crate) fn constraint_is(constraint: Option<&str>, expected: &str) -> bool {
    constraint.is_some_and(|name| name.eq_ignore_ascii_case(expected))
}

#[cfg(test)]
pub(crate) mod test_errors {
    //! Constructors for Diesel database errors in unit tests.

    use diesel::result::{DatabaseErrorInformation, DatabaseErrorKind, Error as DieselError};

    #[derive(Debug)]
    struct ConstraintInfo {
        constraint: Option<&'static str>,
    }

    impl DatabaseErrorInformation for ConstraintInfo {
        fn message(&self) -> &str {
            "constraint violated"
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
            self.constraint
        }

        fn statement_position(&self) -> Option<i32> {
            None
        }
    }

    pub(crate) fn database_error(
        kind: DatabaseErrorKind,
        constraint: Option<&'static str>,
    ) -> DieselError {
        DieselError::DatabaseError(kind, Box::new(ConstraintInfo { constraint }))
    }
}
