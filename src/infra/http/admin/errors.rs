use axum::http::StatusCode;

use crate::application::{
    admin::posts::AdminPostError,
    repos::{RepoError, StorageError},
};
use crate::domain::uploads::ImageValidationError;

pub(super) fn admin_error_status(err: &AdminPostError) -> StatusCode {
    match err {
        AdminPostError::Validation { .. } => StatusCode::BAD_REQUEST,
        AdminPostError::InvalidImage(ImageValidationError::TooLarge { .. }) => {
            StatusCode::PAYLOAD_TOO_LARGE
        }
        AdminPostError::InvalidImage(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
        AdminPostError::Upload(StorageError::Timeout) => StatusCode::GATEWAY_TIMEOUT,
        AdminPostError::Upload(StorageError::Unauthorized) => StatusCode::UNAUTHORIZED,
        AdminPostError::Upload(_) => StatusCode::BAD_GATEWAY,
        AdminPostError::NotFound { .. } => StatusCode::NOT_FOUND,
        AdminPostError::Repo(RepoError::Unauthorized) => StatusCode::UNAUTHORIZED,
        AdminPostError::Repo(RepoError::InvalidInput { .. }) => StatusCode::BAD_REQUEST,
        AdminPostError::Repo(RepoError::NotFound) => StatusCode::NOT_FOUND,
        AdminPostError::Repo(RepoError::Timeout) => StatusCode::GATEWAY_TIMEOUT,
        AdminPostError::Repo(RepoError::Persistence(_)) => StatusCode::BAD_GATEWAY,
    }
}

/// Banner text shown to the operator.
pub(super) fn admin_error_message(err: &AdminPostError) -> String {
    match err {
        AdminPostError::Validation { message } => capitalize(message),
        AdminPostError::InvalidImage(inner) => format!("Error uploading image: {inner}"),
        AdminPostError::Upload(inner) => format!("Error uploading image: {inner}"),
        AdminPostError::NotFound { .. } => "Post not found.".to_string(),
        AdminPostError::Repo(inner) => format!("Error saving post: {inner}"),
    }
}

/// Banner text for a failed delete; repository failures name the delete.
pub(super) fn delete_error_message(err: &AdminPostError) -> String {
    match err {
        AdminPostError::Repo(inner) => format!("Error deleting post: {inner}"),
        other => admin_error_message(other),
    }
}

fn capitalize(message: &str) -> String {
    let mut chars = message.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_message_is_capitalised() {
        let err = AdminPostError::Validation {
            message: "title is required".into(),
        };
        assert_eq!(admin_error_message(&err), "Title is required");
        assert_eq!(admin_error_status(&err), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn upload_failures_name_the_upload() {
        let err = AdminPostError::Upload(StorageError::Rejected {
            status: 400,
            message: "Bucket not found".into(),
        });
        assert_eq!(
            admin_error_message(&err),
            "Error uploading image: storage rejected the object (400): Bucket not found"
        );
        assert_eq!(admin_error_status(&err), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn delete_failures_name_the_delete() {
        let err = AdminPostError::Repo(RepoError::Timeout);
        assert!(admin_error_message(&err).starts_with("Error saving post: "));
        assert!(delete_error_message(&err).starts_with("Error deleting post: "));
        assert_eq!(admin_error_status(&err), StatusCode::GATEWAY_TIMEOUT);

        let missing = AdminPostError::NotFound { id: 4 };
        assert_eq!(delete_error_message(&missing), "Post not found.");
    }
}
