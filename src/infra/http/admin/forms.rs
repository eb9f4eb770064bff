//! Admin form payloads.

use axum::http::StatusCode;
use axum_extra::extract::Multipart;
use axum_extra::extract::multipart::MultipartError;
use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

use crate::application::admin::posts::{ImageUpload, SavePostCommand};
use crate::presentation::admin::views::AdminFormView;

const SOURCE: &str = "infra::http::admin::forms";
const IMAGE_FIELD: &str = "image";

#[derive(Debug, Error)]
pub(super) enum FormPayloadError {
    #[error("the uploaded data exceeds the request size limit")]
    PayloadTooLarge,
    #[error("the form data could not be read")]
    InvalidFormData,
    #[error("no image was attached")]
    MissingImage,
}

impl FormPayloadError {
    pub(super) fn status(&self) -> StatusCode {
        match self {
            FormPayloadError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            FormPayloadError::InvalidFormData | FormPayloadError::MissingImage => {
                StatusCode::BAD_REQUEST
            }
        }
    }
}

impl From<MultipartError> for FormPayloadError {
    fn from(err: MultipartError) -> Self {
        let status = err.status();
        warn!(
            target = SOURCE,
            status = status.as_u16(),
            error = %err,
            "failed to read multipart payload"
        );
        match status {
            StatusCode::PAYLOAD_TOO_LARGE => FormPayloadError::PayloadTooLarge,
            _ => FormPayloadError::InvalidFormData,
        }
    }
}

/// Fields of the create/edit form.
#[derive(Debug, Clone, Default)]
pub(super) struct PostForm {
    pub(super) form_token: String,
    pub(super) title: String,
    pub(super) content: String,
    pub(super) image_url: String,
    pub(super) upload: Option<ImageUpload>,
}

impl PostForm {
    pub(super) fn into_command(self, id: Option<i64>) -> SavePostCommand {
        SavePostCommand {
            id,
            title: self.title,
            content: self.content,
            image_url: Some(self.image_url).filter(|url| !url.trim().is_empty()),
            upload: self.upload,
        }
    }

    /// Form values to re-render after a failed submit. The stored image URL
    /// is the one the form was submitted with.
    pub(super) fn to_view(&self, id: Option<i64>) -> AdminFormView {
        AdminFormView {
            editing_id: id,
            title: self.title.clone(),
            content: self.content.clone(),
            image_url: self.image_url.clone(),
            form_token: self.form_token.clone(),
        }
    }
}

pub(super) async fn read_post_form(mut multipart: Multipart) -> Result<PostForm, FormPayloadError> {
    let mut form = PostForm::default();

    while let Some(field) = multipart.next_field().await? {
        match field.name() {
            Some("form_token") => form.form_token = field.text().await?.trim().to_string(),
            Some("title") => form.title = field.text().await?,
            Some("content") => form.content = field.text().await?,
            Some("image_url") => form.image_url = field.text().await?.trim().to_string(),
            Some(IMAGE_FIELD) => {
                let filename = field
                    .file_name()
                    .map(|value| value.to_string())
                    .filter(|value| !value.trim().is_empty());
                let content_type = field.content_type().map(|mime| mime.to_string());
                let data = field.bytes().await?;

                // Browsers send an empty part when no file was chosen.
                if let Some(filename) = filename.filter(|_| !data.is_empty()) {
                    form.upload = Some(ImageUpload {
                        filename,
                        content_type,
                        data,
                    });
                }
            }
            _ => continue,
        }
    }

    Ok(form)
}

pub(super) async fn read_image_upload(
    mut multipart: Multipart,
) -> Result<ImageUpload, FormPayloadError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }

        let filename = field
            .file_name()
            .map(|value| value.to_string())
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| "image".to_string());
        let content_type = field.content_type().map(|mime| mime.to_string());
        let data = field.bytes().await?;

        return Ok(ImageUpload {
            filename,
            content_type,
            data,
        });
    }

    Err(FormPayloadError::MissingImage)
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct TokenForm {
    pub(super) form_token: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_image_url_becomes_none() {
        let form = PostForm {
            title: "Hello".into(),
            content: "<p>Hi</p>".into(),
            image_url: "  ".into(),
            ..PostForm::default()
        };
        let command = form.into_command(Some(4));
        assert_eq!(command.id, Some(4));
        assert_eq!(command.image_url, None);
        assert!(command.upload.is_none());
    }
}
