//! # Domain Models
//!
//! These structs represent the core entities of Ironboard.
//! Every value handed out by a store is a fully-materialized snapshot:
//! it owns all of its fields and keeps no connection to live storage.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Display name used when a post carries no user reference.
pub const ANONYMOUS: &str = "Anonymous";

/// A forum message. A post with no `parent_id` is a *thread*; a post whose
/// `parent_id` names another post is a *comment* on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    pub title: String,
    /// Authorship by account reference. `None` renders as [`ANONYMOUS`].
    pub user_id: Option<i64>,
    pub content: Option<String>,
    /// Opaque identifier owned by the media pipeline; stored verbatim.
    pub image_ref: Option<String>,
    pub parent_id: Option<i64>,
    pub section_id: i64,
    /// Server-assigned at insert time; the sort key for listings.
    pub created_at: DateTime<Utc>,
}

impl Post {
    pub fn is_thread(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// Input for creating a post. The id and timestamp are assigned by the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPost {
    pub title: String,
    pub user_id: Option<i64>,
    pub content: Option<String>,
    pub image_ref: Option<String>,
    pub parent_id: Option<i64>,
    pub section_id: i64,
}

/// Full replacement of the mutable fields of one post.
/// `id` and `created_at` never change; `parent_id` is immutable too, a
/// comment cannot be re-attached to another thread.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdatePost {
    pub title: String,
    pub user_id: Option<i64>,
    pub content: Option<String>,
    pub image_ref: Option<String>,
    pub section_id: i64,
}

/// A named forum category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub id: i64,
    pub name: String,
    pub image_ref: Option<String>,
}

/// An account. `password_hash` is an argon2 PHC string; the raw password is
/// never persisted anywhere.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub email: String,
}

/// A message-of-the-day record. Bodies are unique.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Motd {
    pub id: i64,
    pub motd: String,
}
