use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Method, StatusCode, header};
use serde_json::json;

use crate::application::repos::{ObjectStorage, StorageError};
use crate::domain::auth::AccessToken;

use super::{BackendClient, CallError};

const SERVICE: &str = "storage";
const OBJECT_CACHE_CONTROL: &str = "max-age=3600";

impl From<CallError> for StorageError {
    fn from(err: CallError) -> Self {
        match err {
            CallError::Timeout => StorageError::Timeout,
            CallError::Status { status, message } => match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => StorageError::Unauthorized,
                status if status.is_client_error() => StorageError::Rejected {
                    status: status.as_u16(),
                    message,
                },
                _ => StorageError::Unavailable(format!("{status}: {message}")),
            },
            other => StorageError::Unavailable(other.to_string()),
        }
    }
}

#[async_trait]
impl ObjectStorage for BackendClient {
    async fn upload(
        &self,
        token: &AccessToken,
        object_name: &str,
        content_type: &str,
        data: Bytes,
    ) -> Result<(), StorageError> {
        let url = self.endpoint(&format!(
            "storage/v1/object/{}/{object_name}",
            self.images_bucket
        ))?;

        let request = self
            .request(Method::POST, url, Some(token))
            .header(header::CONTENT_TYPE, content_type)
            .header(header::CACHE_CONTROL, OBJECT_CACHE_CONTROL)
            .header("x-upsert", "false")
            .body(data);
        self.send(SERVICE, request).await?;
        Ok(())
    }

    fn public_url(&self, object_name: &str) -> String {
        let path = format!(
            "storage/v1/object/public/{}/{object_name}",
            self.images_bucket
        );
        match self.base_url.join(&path) {
            Ok(url) => url.to_string(),
            Err(_) => format!("{}{path}", self.base_url),
        }
    }

    async fn remove(&self, token: &AccessToken, object_name: &str) -> Result<(), StorageError> {
        let url = self.endpoint(&format!("storage/v1/object/{}", self.images_bucket))?;
        let request = self
            .request(Method::DELETE, url, Some(token))
            .json(&json!({ "prefixes": [object_name] }));
        self.send(SERVICE, request).await?;
        Ok(())
    }
}
