//! # ib-api
//!
//! The web routing and orchestration layer for Ironboard.

pub mod error;
pub mod handlers;
pub mod middleware;

use actix_web::web;

pub use error::ApiError;
pub use handlers::AppState;

/// Configures the routes for the board API.
///
/// Scoped configuration so the main binary can mount the API under a
/// different prefix if needed (e.g., /api/v1/).
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("")
            .route("/", web::get().to(handlers::index))
            // Posts: threads and comments share one table and one endpoint
            .route("/post", web::post().to(handlers::create_post))
            // Registered before /post/{id} so "random" is not parsed as an id
            .route("/post/random", web::get().to(handlers::random_post))
            .route("/post/{id}", web::get().to(handlers::view_post))
            .route("/post/{id}", web::put().to(handlers::update_post))
            .route("/post/{id}", web::delete().to(handlers::delete_post))
            .route("/threads", web::get().to(handlers::list_threads))
            // Sections
            .route("/sections", web::get().to(handlers::list_sections))
            .route("/section/{id}", web::get().to(handlers::view_section))
            // Motd
            .route("/motd", web::get().to(handlers::motd))
            // Users
            .route("/register", web::post().to(handlers::register))
            .route("/user/{username}", web::get().to(handlers::view_user))
            // Media
            .route("/upload/image", web::post().to(handlers::upload_image))
            .route("/image/{image_ref}", web::get().to(handlers::serve_image))
            .route("/thumb/{image_ref}", web::get().to(handlers::serve_thumbnail)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{http::StatusCode, test, App};
    use ib_core::BoardStore;
    use ib_db_sqlite::SqliteBoardStore;
    use ib_storage_local::LocalMediaStore;

    async fn state() -> (web::Data<AppState>, tempfile::TempDir) {
        let store = SqliteBoardStore::connect("sqlite::memory:")
            .await
            .expect("in-memory store");
        let dir = tempfile::tempdir().expect("tempdir");
        let media = LocalMediaStore::new(dir.path().to_path_buf());
        let state = web::Data::new(AppState {
            store: Box::new(store),
            media: Box::new(media),
        });
        (state, dir)
    }

    #[actix_web::test]
    async fn test_thread_listing_reports_page_amount() {
        let (state, _dir) = state().await;
        let section = state.store.create_section("General").await.unwrap();
        for i in 0..3 {
            state
                .store
                .create_post(ib_core::NewPost {
                    title: format!("t{i}"),
                    user_id: None,
                    content: None,
                    image_ref: None,
                    parent_id: None,
                    section_id: section,
                })
                .await
                .unwrap();
        }

        let app =
            test::init_service(App::new().app_data(state.clone()).configure(configure_routes))
                .await;

        let req = test::TestRequest::get()
            .uri(&format!(
                "/threads?section_id={section}&page=0&size=2&ascending=true"
            ))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["threads"].as_array().unwrap().len(), 2);
        assert_eq!(body["page_amount"], 2);
        assert_eq!(body["ascending_order"], true);
    }

    #[actix_web::test]
    async fn test_out_of_range_page_is_bad_request() {
        let (state, _dir) = state().await;
        state.store.create_section("General").await.unwrap();

        let app =
            test::init_service(App::new().app_data(state.clone()).configure(configure_routes))
                .await;

        let req = test::TestRequest::get()
            .uri("/threads?page=7&size=10")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_duplicate_registration_is_conflict() {
        let (state, _dir) = state().await;
        let app =
            test::init_service(App::new().app_data(state.clone()).configure(configure_routes))
                .await;

        let payload = serde_json::json!({
            "username": "alice", "password": "secret", "email": "a@x.com"
        });
        let req = test::TestRequest::post()
            .uri("/register")
            .set_json(&payload)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let req = test::TestRequest::post()
            .uri("/register")
            .set_json(&payload)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);
    }

    #[actix_web::test]
    async fn test_missing_post_is_not_found() {
        let (state, _dir) = state().await;
        let app =
            test::init_service(App::new().app_data(state.clone()).configure(configure_routes))
                .await;

        let req = test::TestRequest::get().uri("/post/404").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_uploaded_image_thumbnail_is_served() {
        use ib_core::MediaStore;

        let (state, _dir) = state().await;
        let img = image::RgbImage::new(4, 4);
        let mut buf = std::io::Cursor::new(Vec::new());
        img.write_to(&mut buf, image::ImageFormat::Png).unwrap();
        let image_ref = state.media.save_upload(buf.into_inner()).await.unwrap();

        let app =
            test::init_service(App::new().app_data(state.clone()).configure(configure_routes))
                .await;

        let req = test::TestRequest::get()
            .uri(&format!("/thumb/{image_ref}"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers().get("content-type").unwrap(),
            "image/webp"
        );
    }

    #[actix_web::test]
    async fn test_empty_motd_table_is_not_found() {
        let (state, _dir) = state().await;
        let app =
            test::init_service(App::new().app_data(state.clone()).configure(configure_routes))
                .await;

        let req = test::TestRequest::get().uri("/motd").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
