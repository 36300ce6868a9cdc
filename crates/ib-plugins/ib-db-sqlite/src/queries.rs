//! Scope-reusing query helpers.
//!
//! Every function here takes `&mut SqliteConnection` and issues queries
//! against the caller's session without committing, rolling back, or
//! closing it. This is the composition point: an operation that needs a
//! write and a read-back of the same row to be atomic calls two helpers on
//! one session. Row data is mapped into owned ib-core structs before the
//! helper returns, so nothing downstream depends on the scope staying open.

use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteArguments, SqliteRow};
use sqlx::{Row, Sqlite, SqliteConnection};

use crate::error_map::SqlxResultExt;
use crate::pagination::Page;
use ib_core::{Motd, NewPost, Post, Result, Section, UpdatePost, User};

type Query<'q> = sqlx::query::Query<'q, Sqlite, SqliteArguments<'q>>;

const POST_COLUMNS: &str = "id, title, user_id, content, image_ref, parent_id, section_id, created_at";

/// The two filter shapes of the self-referential hierarchy: threads have no
/// parent, comments name one.
pub(crate) enum PostFilter {
    Threads { section_id: Option<i64> },
    Comments { parent_id: i64 },
}

impl PostFilter {
    fn where_sql(&self) -> &'static str {
        match self {
            PostFilter::Threads { section_id: Some(_) } => "parent_id IS NULL AND section_id = ?",
            PostFilter::Threads { section_id: None } => "parent_id IS NULL",
            PostFilter::Comments { .. } => "parent_id = ?",
        }
    }

    fn bind_to<'q>(&self, query: Query<'q>) -> Query<'q> {
        match *self {
            PostFilter::Threads { section_id: Some(id) } => query.bind(id),
            PostFilter::Threads { section_id: None } => query,
            PostFilter::Comments { parent_id } => query.bind(parent_id),
        }
    }
}

fn post_from_row(row: &SqliteRow) -> Result<Post> {
    Ok(Post {
        id: row.try_get("id").map_db()?,
        title: row.try_get("title").map_db()?,
        user_id: row.try_get("user_id").map_db()?,
        content: row.try_get("content").map_db()?,
        image_ref: row.try_get("image_ref").map_db()?,
        parent_id: row.try_get("parent_id").map_db()?,
        section_id: row.try_get("section_id").map_db()?,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at").map_db()?,
    })
}

// ── Posts ────────────────────────────────────────────────────────────────────

pub(crate) async fn insert_post(conn: &mut SqliteConnection, new: &NewPost) -> Result<i64> {
    // The timestamp is assigned here, not by the caller: it is the sort key
    // for every listing and must be set at insert time.
    let created_at = Utc::now();
    let result = sqlx::query(
        "INSERT INTO posts (title, user_id, content, image_ref, parent_id, section_id, created_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(new.title.as_str())
    .bind(new.user_id)
    .bind(new.content.as_deref())
    .bind(new.image_ref.as_deref())
    .bind(new.parent_id)
    .bind(new.section_id)
    .bind(created_at)
    .execute(&mut *conn)
    .await
    .map_db()?;
    Ok(result.last_insert_rowid())
}

pub(crate) async fn select_post(conn: &mut SqliteConnection, id: i64) -> Result<Option<Post>> {
    let sql = format!("SELECT {POST_COLUMNS} FROM posts WHERE id = ?");
    let row = sqlx::query(&sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await
        .map_db()?;
    row.as_ref().map(post_from_row).transpose()
}

pub(crate) async fn count_posts(
    conn: &mut SqliteConnection,
    filter: &PostFilter,
) -> Result<Option<i64>> {
    let sql = format!("SELECT COUNT(*) AS n FROM posts WHERE {}", filter.where_sql());
    let row = filter
        .bind_to(sqlx::query(&sql))
        .fetch_optional(&mut *conn)
        .await
        .map_db()?;
    match row {
        Some(row) => Ok(Some(row.try_get("n").map_db()?)),
        None => Ok(None),
    }
}

pub(crate) async fn select_post_page(
    conn: &mut SqliteConnection,
    filter: &PostFilter,
    page: &Page,
    ascending: bool,
) -> Result<Vec<Post>> {
    // The id tiebreak keeps the order deterministic when two rows share a
    // creation timestamp; ids are monotonic, so it agrees with insert order.
    let dir = if ascending { "ASC" } else { "DESC" };
    let sql = format!(
        "SELECT {POST_COLUMNS} FROM posts WHERE {} \
         ORDER BY created_at {dir}, id {dir} LIMIT ? OFFSET ?",
        filter.where_sql()
    );
    let rows = filter
        .bind_to(sqlx::query(&sql))
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&mut *conn)
        .await
        .map_db()?;
    rows.iter().map(post_from_row).collect()
}

/// Returns the number of rows touched; zero means the id was absent.
pub(crate) async fn update_post(
    conn: &mut SqliteConnection,
    id: i64,
    update: &UpdatePost,
) -> Result<u64> {
    let result = sqlx::query(
        "UPDATE posts SET title = ?, user_id = ?, content = ?, image_ref = ?, section_id = ? \
         WHERE id = ?",
    )
    .bind(update.title.as_str())
    .bind(update.user_id)
    .bind(update.content.as_deref())
    .bind(update.image_ref.as_deref())
    .bind(update.section_id)
    .bind(id)
    .execute(&mut *conn)
    .await
    .map_db()?;
    Ok(result.rows_affected())
}

/// Descendants go with it via the `parent_id` cascade.
pub(crate) async fn delete_post(conn: &mut SqliteConnection, id: i64) -> Result<u64> {
    let result = sqlx::query("DELETE FROM posts WHERE id = ?")
        .bind(id)
        .execute(&mut *conn)
        .await
        .map_db()?;
    Ok(result.rows_affected())
}

pub(crate) async fn select_random_post(conn: &mut SqliteConnection) -> Result<Option<Post>> {
    let sql = format!("SELECT {POST_COLUMNS} FROM posts ORDER BY RANDOM() LIMIT 1");
    let row = sqlx::query(&sql).fetch_optional(&mut *conn).await.map_db()?;
    row.as_ref().map(post_from_row).transpose()
}

// ── Sections ─────────────────────────────────────────────────────────────────

fn section_from_row(row: &SqliteRow) -> Result<Section> {
    Ok(Section {
        id: row.try_get("id").map_db()?,
        name: row.try_get("name").map_db()?,
        image_ref: row.try_get("image_ref").map_db()?,
    })
}

pub(crate) async fn insert_section(conn: &mut SqliteConnection, name: &str) -> Result<i64> {
    let result = sqlx::query("INSERT INTO sections (name) VALUES (?)")
        .bind(name)
        .execute(&mut *conn)
        .await
        .map_db()?;
    Ok(result.last_insert_rowid())
}

pub(crate) async fn select_sections(conn: &mut SqliteConnection) -> Result<Vec<Section>> {
    let rows = sqlx::query("SELECT id, name, image_ref FROM sections ORDER BY id")
        .fetch_all(&mut *conn)
        .await
        .map_db()?;
    rows.iter().map(section_from_row).collect()
}

pub(crate) async fn select_section(
    conn: &mut SqliteConnection,
    id: i64,
) -> Result<Option<Section>> {
    let row = sqlx::query("SELECT id, name, image_ref FROM sections WHERE id = ?")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await
        .map_db()?;
    row.as_ref().map(section_from_row).transpose()
}

// ── Motds ────────────────────────────────────────────────────────────────────

pub(crate) async fn insert_motd(conn: &mut SqliteConnection, text: &str) -> Result<i64> {
    let result = sqlx::query("INSERT INTO motds (motd) VALUES (?)")
        .bind(text)
        .execute(&mut *conn)
        .await
        .map_db()?;
    Ok(result.last_insert_rowid())
}

pub(crate) async fn select_random_motd(conn: &mut SqliteConnection) -> Result<Option<Motd>> {
    let row = sqlx::query("SELECT id, motd FROM motds ORDER BY RANDOM() LIMIT 1")
        .fetch_optional(&mut *conn)
        .await
        .map_db()?;
    match row {
        Some(row) => Ok(Some(Motd {
            id: row.try_get("id").map_db()?,
            motd: row.try_get("motd").map_db()?,
        })),
        None => Ok(None),
    }
}

// ── Users ────────────────────────────────────────────────────────────────────

fn user_from_row(row: &SqliteRow) -> Result<User> {
    Ok(User {
        id: row.try_get("id").map_db()?,
        username: row.try_get("username").map_db()?,
        password_hash: row.try_get("password_hash").map_db()?,
        email: row.try_get("email").map_db()?,
    })
}

pub(crate) async fn insert_user(
    conn: &mut SqliteConnection,
    username: &str,
    password_hash: &str,
    email: &str,
) -> Result<i64> {
    let result = sqlx::query("INSERT INTO users (username, password_hash, email) VALUES (?, ?, ?)")
        .bind(username)
        .bind(password_hash)
        .bind(email)
        .execute(&mut *conn)
        .await
        .map_db()?;
    Ok(result.last_insert_rowid())
}

pub(crate) async fn select_user_by_id(
    conn: &mut SqliteConnection,
    id: i64,
) -> Result<Option<User>> {
    let row = sqlx::query("SELECT id, username, password_hash, email FROM users WHERE id = ?")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await
        .map_db()?;
    row.as_ref().map(user_from_row).transpose()
}

pub(crate) async fn select_user_by_username(
    conn: &mut SqliteConnection,
    username: &str,
) -> Result<Option<User>> {
    let row = sqlx::query("SELECT id, username, password_hash, email FROM users WHERE username = ?")
        .bind(username)
        .fetch_optional(&mut *conn)
        .await
        .map_db()?;
    row.as_ref().map(user_from_row).transpose()
}

pub(crate) async fn username_taken(conn: &mut SqliteConnection, username: &str) -> Result<bool> {
    let row = sqlx::query("SELECT COUNT(*) AS n FROM users WHERE username = ?")
        .bind(username)
        .fetch_one(&mut *conn)
        .await
        .map_db()?;
    let n: i64 = row.try_get("n").map_db()?;
    Ok(n > 0)
}
