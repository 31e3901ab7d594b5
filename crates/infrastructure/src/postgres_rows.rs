//! Error mapping shared by the PostgreSQL adapters.

use std::fmt::Display;

use chapterdesk_application::PageRequest;
use chapterdesk_core::AppError;

const UNIQUE_VIOLATION: &str = "23505";

/// Returns whether the error is a unique-constraint violation.
pub(crate) fn is_unique_violation(error: &sqlx::Error) -> bool {
    matches!(
        error,
        sqlx::Error::Database(database_error)
            if database_error.code().as_deref() == Some(UNIQUE_VIOLATION)
    )
}

/// Wraps a driver error for the given operation.
pub(crate) fn internal(operation: &'static str) -> impl FnOnce(sqlx::Error) -> AppError {
    move |error| AppError::Internal(format!("failed to {operation}: {error}"))
}

/// Maps a unique violation to `Conflict` and anything else to `Internal`.
pub(crate) fn conflict_or_internal(
    error: sqlx::Error,
    operation: &str,
    conflict_message: impl FnOnce() -> String,
) -> AppError {
    if is_unique_violation(&error) {
        return AppError::Conflict(conflict_message());
    }

    AppError::Internal(format!("failed to {operation}: {error}"))
}

/// Reports a stored column value that no longer decodes into its domain type.
pub(crate) fn corrupt_column(column: &'static str) -> impl FnOnce(AppError) -> AppError {
    move |error: AppError| corrupt(column, error)
}

fn corrupt(column: &str, error: impl Display) -> AppError {
    AppError::Internal(format!("stored value in column '{column}' is invalid: {error}"))
}

/// Converts an unsigned domain count into a PostgreSQL integer.
pub(crate) fn to_i32(column: &'static str, value: u32) -> Result<i32, AppError> {
    i32::try_from(value)
        .map_err(|_| AppError::Validation(format!("{column} value {value} is out of range")))
}

/// Converts a PostgreSQL integer into an unsigned domain count.
pub(crate) fn to_u32(column: &'static str, value: i32) -> Result<u32, AppError> {
    u32::try_from(value).map_err(|error| corrupt(column, error))
}

/// Converts a PostgreSQL bigint into an unsigned domain count.
pub(crate) fn to_u64(column: &'static str, value: i64) -> Result<u64, AppError> {
    u64::try_from(value).map_err(|error| corrupt(column, error))
}

/// Returns the `LIMIT` and `OFFSET` values of a page request.
pub(crate) fn page_bounds(page: &PageRequest) -> Result<(i64, i64), AppError> {
    let offset = i64::try_from(page.offset())
        .map_err(|_| AppError::Validation(format!("page {} is out of range", page.page())))?;

    Ok((i64::from(page.size()), offset))
}
