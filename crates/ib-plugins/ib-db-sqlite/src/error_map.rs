//! Maps sqlx failures into the ib-core error taxonomy.
//!
//! The mapping happens exactly once, at the query-helper boundary:
//! UNIQUE and FOREIGN KEY constraint failures become conflicts, pool
//! trouble and everything else becomes an internal error. Not-found is
//! never produced here; helpers use `fetch_optional` and report absence
//! with the entity name and id they know.

use ib_core::AppError;

pub(crate) fn map_sqlx_err(err: sqlx::Error) -> AppError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = db_err.message().to_string();
            // SQLite reports constraints in the message text:
            // "UNIQUE constraint failed: users.username"
            // "FOREIGN KEY constraint failed"
            if msg.contains("UNIQUE constraint failed")
                || msg.contains("FOREIGN KEY constraint failed")
            {
                AppError::Conflict(msg)
            } else {
                AppError::Internal(msg)
            }
        }
        sqlx::Error::PoolTimedOut => AppError::Internal("connection pool exhausted".to_string()),
        sqlx::Error::PoolClosed => AppError::Internal("connection pool is closed".to_string()),
        other => AppError::Internal(other.to_string()),
    }
}

pub(crate) trait SqlxResultExt<T> {
    fn map_db(self) -> ib_core::Result<T>;
}

impl<T> SqlxResultExt<T> for std::result::Result<T, sqlx::Error> {
    fn map_db(self) -> ib_core::Result<T> {
        self.map_err(map_sqlx_err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_timeout_is_internal() {
        let err = map_sqlx_err(sqlx::Error::PoolTimedOut);
        assert!(matches!(err, AppError::Internal(_)));
    }
}
