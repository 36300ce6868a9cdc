//! ironboard/crates/ib-core/src/lib.rs
//!
//! The central domain logic and interface definitions for Ironboard.

pub mod error;
pub mod models;
pub mod traits;

// Re-exporting for easier access in other crates
pub use error::*;
pub use models::*;
pub use traits::*;

#[cfg(test)]
mod tests {
    use super::models::*;

    #[test]
    fn test_thread_vs_comment() {
        let thread = Post {
            id: 1,
            title: "Hello Rust!".to_string(),
            user_id: None,
            content: Some("first".to_string()),
            image_ref: None,
            parent_id: None,
            section_id: 1,
            created_at: chrono::Utc::now(),
        };
        assert!(thread.is_thread());

        let comment = Post {
            parent_id: Some(thread.id),
            ..thread.clone()
        };
        assert!(!comment.is_thread());
    }

    #[test]
    fn test_error_display_names_entity_and_id() {
        let err = super::error::AppError::not_found("post", 42);
        assert_eq!(err.to_string(), "post not found with id 42");
    }
}
