//! # Session
//!
//! The unit of work.
//!
//! A [`Session`] bounds the lifetime of one storage connection to the
//! lifetime of one logical operation. Query helpers in [`crate::queries`]
//! take `&mut SqliteConnection` and never finalize anything themselves;
//! whoever began the session owns its lifecycle. Composing several helpers
//! on one session is the sanctioned way to make a write plus a read-back of
//! the same row atomic.
//!
//! Finalization happens exactly once per session:
//! - `commit()` consumes the session, so a second commit is unrepresentable.
//! - Dropping without commit rolls back and closes; every early `?` return
//!   in an operation takes this path, and the original error propagates
//!   unchanged. Failures during that drop-rollback are swallowed as
//!   "already finalized" and never mask the first error.
//!
//! Results handed back across a session boundary are plain owned structs,
//! fully read out of their rows before the scope ends; nothing returned
//! here keeps a reference to live storage.

use sqlx::{Sqlite, SqliteConnection, SqlitePool, Transaction};

use crate::error_map::SqlxResultExt;
use ib_core::Result;

pub(crate) struct Session {
    tx: Transaction<'static, Sqlite>,
}

impl Session {
    /// Acquires a new scope from the pool. The only blocking point of an
    /// operation: may wait on the bounded pool up to its acquire timeout.
    pub(crate) async fn begin(pool: &SqlitePool) -> Result<Self> {
        let tx = pool.begin().await.map_db()?;
        Ok(Session { tx })
    }

    /// The live connection, for passing down to query helpers.
    pub(crate) fn conn(&mut self) -> &mut SqliteConnection {
        &mut self.tx
    }

    /// Commits and closes the scope. Consuming `self` guarantees at most
    /// one finalization; read-only callers simply drop the session instead,
    /// which rolls back and closes.
    pub(crate) async fn commit(self) -> Result<()> {
        self.tx.commit().await.map_db()
    }
}
