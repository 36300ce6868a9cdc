//! # ib-api Handlers
//!
//! This module coordinates the flow between HTTP requests and core traits.
//! Handlers stay thin: parse, call one or two store operations, shape the
//! JSON response. All policy lives behind the `BoardStore` port.

use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};
use futures_util::TryStreamExt;
use serde::{Deserialize, Serialize};

use crate::error::{bad_request, ApiError};
use ib_core::{AppError, BoardStore, MediaStore, NewPost, Post, UpdatePost, ANONYMOUS};

/// State shared across all actix-web workers.
pub struct AppState {
    pub store: Box<dyn BoardStore>,
    pub media: Box<dyn MediaStore>,
}

type ApiResult = Result<HttpResponse, ApiError>;

const DEFAULT_PAGE_SIZE: i64 = 50;

// ── DTOs ─────────────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct PostDto {
    id: i64,
    title: String,
    user_id: Option<i64>,
    content: Option<String>,
    image_ref: Option<String>,
    parent_id: Option<i64>,
    section_id: i64,
    created_at: chrono::DateTime<chrono::Utc>,
    is_thread: bool,
}

impl From<&Post> for PostDto {
    fn from(post: &Post) -> Self {
        PostDto {
            id: post.id,
            title: post.title.clone(),
            user_id: post.user_id,
            content: post.content.clone(),
            image_ref: post.image_ref.clone(),
            parent_id: post.parent_id,
            section_id: post.section_id,
            created_at: post.created_at,
            is_thread: post.is_thread(),
        }
    }
}

#[derive(Deserialize)]
pub struct ThreadsQuery {
    section_id: Option<i64>,
    #[serde(default)]
    page: i64,
    #[serde(default = "default_page_size")]
    size: i64,
    #[serde(default)]
    ascending: bool,
}

fn default_page_size() -> i64 {
    DEFAULT_PAGE_SIZE
}

#[derive(Deserialize)]
pub struct RegisterRequest {
    username: String,
    password: String,
    email: String,
}

// ── Handlers ─────────────────────────────────────────────────────────────────

pub async fn index() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "message": "ironboard" }))
}

/// Creates a thread or, when `parent_id` is set, a comment.
pub async fn create_post(data: web::Data<AppState>, body: web::Json<NewPost>) -> ApiResult {
    let id = data.store.create_post(body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "post_id": id })))
}

/// Paginated thread listing; `page_amount` reports the best-effort current
/// page count for the same filter and size.
pub async fn list_threads(data: web::Data<AppState>, query: web::Query<ThreadsQuery>) -> ApiResult {
    let threads = data
        .store
        .get_threads(query.section_id, query.page, query.size, query.ascending)
        .await?;
    let page_amount = data
        .store
        .thread_max_pages(query.section_id, query.size)
        .await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "threads": threads.iter().map(PostDto::from).collect::<Vec<_>>(),
        "size": threads.len(),
        "page": query.page,
        "page_amount": page_amount,
        "ascending_order": query.ascending,
    })))
}

pub async fn random_post(data: web::Data<AppState>) -> ApiResult {
    let post = data.store.get_random_post().await?;
    Ok(HttpResponse::Ok().json(PostDto::from(&post)))
}

/// One post plus the first page of its comments and a resolved author name.
pub async fn view_post(data: web::Data<AppState>, path: web::Path<i64>) -> ApiResult {
    let id = path.into_inner();
    let post = data.store.get_thread_by_id(id).await?;
    let comments = data
        .store
        .get_comments_by_thread_id(id, 0, DEFAULT_PAGE_SIZE)
        .await?;

    let author = match post.user_id {
        Some(user_id) => match data.store.get_user_by_id(user_id).await {
            Ok(user) => user.username,
            // The account can vanish between the two reads; render it as
            // anonymous rather than failing the whole view.
            Err(AppError::NotFound(_, _)) => ANONYMOUS.to_string(),
            Err(err) => return Err(err.into()),
        },
        None => ANONYMOUS.to_string(),
    };

    let mut body = serde_json::to_value(PostDto::from(&post))
        .map_err(|e| ApiError(AppError::Internal(e.to_string())))?;
    body["author"] = serde_json::Value::String(author);
    body["comments"] = serde_json::to_value(comments.iter().map(PostDto::from).collect::<Vec<_>>())
        .map_err(|e| ApiError(AppError::Internal(e.to_string())))?;
    Ok(HttpResponse::Ok().json(body))
}

pub async fn update_post(
    data: web::Data<AppState>,
    path: web::Path<i64>,
    body: web::Json<UpdatePost>,
) -> ApiResult {
    data.store
        .update_thread_by_id(path.into_inner(), body.into_inner())
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

pub async fn delete_post(data: web::Data<AppState>, path: web::Path<i64>) -> ApiResult {
    data.store.delete_thread_by_id(path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

pub async fn list_sections(data: web::Data<AppState>) -> ApiResult {
    let sections = data.store.get_all_sections().await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "sections": sections })))
}

pub async fn view_section(data: web::Data<AppState>, path: web::Path<i64>) -> ApiResult {
    let section = data.store.get_section_by_id(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(section))
}

pub async fn motd(data: web::Data<AppState>) -> ApiResult {
    let motd = data.store.get_random_motd().await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "motd": motd.motd })))
}

pub async fn register(data: web::Data<AppState>, body: web::Json<RegisterRequest>) -> ApiResult {
    let id = data
        .store
        .register_user(&body.username, &body.password, &body.email)
        .await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "user_id": id })))
}

/// Public account view; the password hash never leaves the store boundary.
pub async fn view_user(data: web::Data<AppState>, path: web::Path<String>) -> ApiResult {
    let user = data.store.get_user_by_username(&path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "id": user.id,
        "username": user.username,
        "email": user.email,
    })))
}

/// Accepts a multipart field named `image`, hands the bytes to the media
/// pipeline, and returns the opaque ref for use in `create_post`.
pub async fn upload_image(data: web::Data<AppState>, mut payload: Multipart) -> ApiResult {
    while let Some(mut field) = payload
        .try_next()
        .await
        .map_err(|e| bad_request(format!("malformed multipart payload: {e}")))?
    {
        if field.name() != "image" {
            continue;
        }
        let mut bytes = Vec::new();
        while let Some(chunk) = field
            .try_next()
            .await
            .map_err(|e| bad_request(format!("upload interrupted: {e}")))?
        {
            bytes.extend_from_slice(&chunk);
        }
        let image_ref = data.media.save_upload(bytes).await?;
        return Ok(HttpResponse::Ok().json(serde_json::json!({
            "image_ref": image_ref,
            "url": data.media.url(&image_ref),
            "thumbnail_url": data.media.thumbnail_url(&image_ref),
        })));
    }
    Err(bad_request("missing multipart field 'image'"))
}

pub async fn serve_image(data: web::Data<AppState>, path: web::Path<String>) -> ApiResult {
    let bytes = data.media.open(&path.into_inner()).await?;
    let mime = match image::guess_format(&bytes) {
        Ok(image::ImageFormat::Png) => "image/png",
        Ok(image::ImageFormat::Jpeg) => "image/jpeg",
        Ok(image::ImageFormat::Gif) => "image/gif",
        Ok(image::ImageFormat::WebP) => "image/webp",
        _ => "application/octet-stream",
    };
    Ok(HttpResponse::Ok().content_type(mime).body(bytes))
}

/// Thumbnails are always webp, whatever the original format was.
pub async fn serve_thumbnail(data: web::Data<AppState>, path: web::Path<String>) -> ApiResult {
    let bytes = data.media.open_thumbnail(&path.into_inner()).await?;
    Ok(HttpResponse::Ok().content_type("image/webp").body(bytes))
}
