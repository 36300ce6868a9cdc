//! # Core Traits (Ports)
//!
//! Any plugin must implement these traits to be used by the binary.

use async_trait::async_trait;
use crate::error::Result;
use crate::models::{Motd, NewPost, Post, Section, UpdatePost, User};

/// Data persistence contract for posts, sections, users and motds.
///
/// Every method is one logical operation: it runs inside its own
/// transactional scope and returns detached value snapshots. Callers never
/// see a live storage handle.
#[async_trait]
pub trait BoardStore: Send + Sync {
    // Post operations
    /// Inserts one post and returns its assigned id. Referential integrity
    /// of `section_id` / `parent_id` is enforced by the storage engine's
    /// foreign keys, not pre-checked here.
    async fn create_post(&self, new: NewPost) -> Result<i64>;
    /// Posts with no parent, optionally filtered by section, ordered by
    /// creation time, offset-paginated.
    async fn get_threads(
        &self,
        section_id: Option<i64>,
        page: i64,
        size: i64,
        ascending: bool,
    ) -> Result<Vec<Post>>;
    /// Number of pages the thread listing currently spans for `size`.
    async fn thread_max_pages(&self, section_id: Option<i64>, size: i64) -> Result<i64>;
    async fn get_thread_by_id(&self, id: i64) -> Result<Post>;
    /// Full replace of the mutable fields; `NotFound` when the id is absent.
    async fn update_thread_by_id(&self, id: i64, update: UpdatePost) -> Result<()>;
    /// Deletes the post and cascades to every post referencing it as
    /// parent. Absent id is a no-op success.
    async fn delete_thread_by_id(&self, id: i64) -> Result<()>;
    /// Comments attached to `parent_id`, newest first, offset-paginated.
    /// A parent with zero comments yields an empty page 0, not an error.
    async fn get_comments_by_thread_id(
        &self,
        parent_id: i64,
        page: i64,
        size: i64,
    ) -> Result<Vec<Post>>;
    async fn comment_max_pages(&self, parent_id: i64, size: i64) -> Result<i64>;
    /// Uniform-random selection over all posts, threads and comments alike.
    async fn get_random_post(&self) -> Result<Post>;

    // Section operations
    async fn create_section(&self, name: &str) -> Result<i64>;
    async fn get_all_sections(&self) -> Result<Vec<Section>>;
    async fn get_section_by_id(&self, id: i64) -> Result<Section>;

    // Motd operations
    async fn create_motd(&self, text: &str) -> Result<i64>;
    /// Uniform-random selection; `NotFound` when the table is empty.
    async fn get_random_motd(&self) -> Result<Motd>;

    // User operations
    /// Hashes the password before storage; the raw password never reaches
    /// a query. Duplicate username or email is a `Conflict`.
    async fn register_user(&self, username: &str, password: &str, email: &str) -> Result<i64>;
    async fn get_user_by_id(&self, id: i64) -> Result<User>;
    async fn get_user_by_username(&self, username: &str) -> Result<User>;
    async fn user_exists(&self, username: &str) -> Result<bool>;
}

/// Media storage contract for handling uploads.
///
/// The store hands back an opaque `image_ref`; the data layer persists and
/// returns it verbatim and never interprets it.
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Validates and saves raw bytes, returns the `image_ref`.
    async fn save_upload(&self, data: Vec<u8>) -> Result<String>;
    /// Reads the original bytes back for serving.
    async fn open(&self, image_ref: &str) -> Result<Vec<u8>>;
    /// Reads the thumbnail generated alongside the original.
    async fn open_thumbnail(&self, image_ref: &str) -> Result<Vec<u8>>;
    /// Public URL for the original media.
    fn url(&self, image_ref: &str) -> String;
    /// Public URL for the thumbnail.
    fn thumbnail_url(&self, image_ref: &str) -> String;
}
