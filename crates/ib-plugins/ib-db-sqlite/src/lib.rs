//! # ib-db-sqlite
//!
//! sqlx/SQLite implementation of the `ib-core` `BoardStore` port.
//!
//! Each public operation acquires one [`session::Session`] (a transactional
//! scope from the pool), runs its queries through the scope-reusing helpers
//! in [`queries`], and hands back fully-materialized value snapshots.
//! Commit happens on the success path of write operations; every other exit
//! rolls back. Listing operations share the offset [`pagination`] engine.

mod error_map;
mod pagination;
mod queries;
mod schema;
mod session;

use std::str::FromStr;
use std::time::Duration;

use argon2::password_hash::{rand_core::OsRng, PasswordHasher, SaltString};
use argon2::Argon2;
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;

use error_map::SqlxResultExt;
use ib_core::{AppError, BoardStore, Motd, NewPost, Post, Result, Section, UpdatePost, User};
use pagination::Page;
use queries::PostFilter;
use session::Session;

pub struct SqliteBoardStore {
    pool: SqlitePool,
}

impl SqliteBoardStore {
    /// Connects to the given SQLite URL, creating the database file when
    /// missing, and bootstraps the schema.
    ///
    /// WAL journaling for concurrent reads; foreign keys switched on per
    /// connection (SQLite defaults them off, and the cascade rules depend
    /// on them).
    pub async fn connect(url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)
            .map_db()?
            .journal_mode(SqliteJournalMode::Wal)
            .foreign_keys(true)
            .create_if_missing(true);

        // An in-memory database exists per connection; pin the pool to a
        // single connection so every scope sees the same store.
        let max_connections = if url.contains(":memory:") { 1 } else { 5 };

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(30))
            .connect_with(options)
            .await
            .map_db()?;

        log::info!("database pool ready ({max_connections} connections)");

        let store = SqliteBoardStore { pool };
        store.create_schema().await?;
        Ok(store)
    }

    /// Idempotent: creating already-existing tables is a no-op.
    async fn create_schema(&self) -> Result<()> {
        let mut session = Session::begin(&self.pool).await?;
        schema::create_all(session.conn()).await?;
        session.commit().await
    }
}

#[async_trait]
impl BoardStore for SqliteBoardStore {
    async fn create_post(&self, new: NewPost) -> Result<i64> {
        let mut session = Session::begin(&self.pool).await?;
        let id = queries::insert_post(session.conn(), &new).await?;
        // Read the row back on the same session: insert and verification
        // commit or roll back together, and the returned id is known to
        // name a fully-materialized row.
        let stored = queries::select_post(session.conn(), id)
            .await?
            .ok_or_else(|| AppError::not_found("post", id))?;
        session.commit().await?;
        log::debug!("created post {} in section {}", stored.id, stored.section_id);
        Ok(id)
    }

    async fn get_threads(
        &self,
        section_id: Option<i64>,
        page: i64,
        size: i64,
        ascending: bool,
    ) -> Result<Vec<Post>> {
        let page = Page::new(page, size)?;
        let filter = PostFilter::Threads { section_id };
        let mut session = Session::begin(&self.pool).await?;
        let total = queries::count_posts(session.conn(), &filter).await?;
        pagination::check_range(&page, pagination::max_pages(total, size))?;
        queries::select_post_page(session.conn(), &filter, &page, ascending).await
    }

    async fn thread_max_pages(&self, section_id: Option<i64>, size: i64) -> Result<i64> {
        pagination::ensure_positive_size(size)?;
        let filter = PostFilter::Threads { section_id };
        let mut session = Session::begin(&self.pool).await?;
        let total = queries::count_posts(session.conn(), &filter).await?;
        Ok(pagination::max_pages(total, size))
    }

    async fn get_thread_by_id(&self, id: i64) -> Result<Post> {
        let mut session = Session::begin(&self.pool).await?;
        queries::select_post(session.conn(), id)
            .await?
            .ok_or_else(|| AppError::not_found("post", id))
    }

    async fn update_thread_by_id(&self, id: i64, update: UpdatePost) -> Result<()> {
        let mut session = Session::begin(&self.pool).await?;
        let touched = queries::update_post(session.conn(), id, &update).await?;
        if touched == 0 {
            // Absent id is an explicit error, never a silent no-op.
            return Err(AppError::not_found("post", id));
        }
        session.commit().await
    }

    async fn delete_thread_by_id(&self, id: i64) -> Result<()> {
        let mut session = Session::begin(&self.pool).await?;
        let removed = queries::delete_post(session.conn(), id).await?;
        session.commit().await?;
        if removed > 0 {
            log::debug!("deleted post {id} and its descendants");
        }
        Ok(())
    }

    async fn get_comments_by_thread_id(
        &self,
        parent_id: i64,
        page: i64,
        size: i64,
    ) -> Result<Vec<Post>> {
        let page = Page::new(page, size)?;
        let filter = PostFilter::Comments { parent_id };
        let mut session = Session::begin(&self.pool).await?;
        let total = queries::count_posts(session.conn(), &filter).await?;
        pagination::check_range(&page, pagination::max_pages(total, size))?;
        // Comments list newest first.
        queries::select_post_page(session.conn(), &filter, &page, false).await
    }

    async fn comment_max_pages(&self, parent_id: i64, size: i64) -> Result<i64> {
        pagination::ensure_positive_size(size)?;
        let filter = PostFilter::Comments { parent_id };
        let mut session = Session::begin(&self.pool).await?;
        let total = queries::count_posts(session.conn(), &filter).await?;
        Ok(pagination::max_pages(total, size))
    }

    async fn get_random_post(&self) -> Result<Post> {
        let mut session = Session::begin(&self.pool).await?;
        queries::select_random_post(session.conn())
            .await?
            .ok_or_else(|| AppError::not_found("post", "any"))
    }

    async fn create_section(&self, name: &str) -> Result<i64> {
        let mut session = Session::begin(&self.pool).await?;
        let id = queries::insert_section(session.conn(), name).await?;
        session.commit().await?;
        Ok(id)
    }

    async fn get_all_sections(&self) -> Result<Vec<Section>> {
        let mut session = Session::begin(&self.pool).await?;
        queries::select_sections(session.conn()).await
    }

    async fn get_section_by_id(&self, id: i64) -> Result<Section> {
        let mut session = Session::begin(&self.pool).await?;
        queries::select_section(session.conn(), id)
            .await?
            .ok_or_else(|| AppError::not_found("section", id))
    }

    async fn create_motd(&self, text: &str) -> Result<i64> {
        let mut session = Session::begin(&self.pool).await?;
        let id = queries::insert_motd(session.conn(), text).await?;
        session.commit().await?;
        Ok(id)
    }

    async fn get_random_motd(&self) -> Result<Motd> {
        let mut session = Session::begin(&self.pool).await?;
        queries::select_random_motd(session.conn())
            .await?
            .ok_or_else(|| AppError::not_found("motd", "any"))
    }

    async fn register_user(&self, username: &str, password: &str, email: &str) -> Result<i64> {
        // Hash before any query is built; the raw password never reaches
        // the storage engine.
        let salt = SaltString::generate(&mut OsRng);
        let password_hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::Internal(e.to_string()))?
            .to_string();

        let mut session = Session::begin(&self.pool).await?;
        let id = queries::insert_user(session.conn(), username, &password_hash, email).await?;
        session.commit().await?;
        log::info!("registered user {username} as id {id}");
        Ok(id)
    }

    async fn get_user_by_id(&self, id: i64) -> Result<User> {
        let mut session = Session::begin(&self.pool).await?;
        queries::select_user_by_id(session.conn(), id)
            .await?
            .ok_or_else(|| AppError::not_found("user", id))
    }

    async fn get_user_by_username(&self, username: &str) -> Result<User> {
        let mut session = Session::begin(&self.pool).await?;
        queries::select_user_by_username(session.conn(), username)
            .await?
            .ok_or_else(|| AppError::not_found("user", username))
    }

    async fn user_exists(&self, username: &str) -> Result<bool> {
        let mut session = Session::begin(&self.pool).await?;
        queries::username_taken(session.conn(), username).await
    }
}
