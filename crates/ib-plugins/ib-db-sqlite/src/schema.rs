//! Schema bootstrap.
//!
//! Idempotent by construction: every statement is `IF NOT EXISTS`, so
//! running it against an existing database is a no-op, not an error. The
//! binary calls this through [`crate::SqliteBoardStore::connect`] before
//! any operation is served.
//!
//! Cascade rules: deleting a post deletes every post referencing it as
//! parent; deleting a section or a user deletes its posts. Foreign-key
//! enforcement is switched on per connection in the pool options.

use sqlx::SqliteConnection;

use crate::error_map::SqlxResultExt;
use ib_core::Result;

const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS sections (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        image_ref TEXT
    )",
    "CREATE TABLE IF NOT EXISTS users (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        username TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL,
        email TEXT NOT NULL UNIQUE
    )",
    "CREATE TABLE IF NOT EXISTS motds (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        motd TEXT NOT NULL UNIQUE
    )",
    "CREATE TABLE IF NOT EXISTS posts (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        title TEXT NOT NULL,
        user_id INTEGER REFERENCES users(id) ON DELETE CASCADE,
        content TEXT,
        image_ref TEXT,
        parent_id INTEGER REFERENCES posts(id) ON DELETE CASCADE,
        section_id INTEGER NOT NULL REFERENCES sections(id) ON DELETE CASCADE,
        created_at TEXT NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS idx_posts_section_created ON posts (section_id, created_at)",
    "CREATE INDEX IF NOT EXISTS idx_posts_parent_created ON posts (parent_id, created_at)",
];

pub(crate) async fn create_all(conn: &mut SqliteConnection) -> Result<()> {
    for statement in SCHEMA {
        sqlx::query(statement).execute(&mut *conn).await.map_db()?;
    }
    Ok(())
}
