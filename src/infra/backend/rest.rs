//! Posts table access through the backend's PostgREST endpoint.

use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use url::Url;
use uuid::Uuid;

use crate::application::repos::{
    CreatePostParams, PostsRepo, PostsWriteRepo, RepoError, UpdatePostParams,
};
use crate::domain::{auth::AccessToken, entities::PostRecord};

use super::{BackendClient, CallError};

const SERVICE: &str = "rest";
const RETURN_REPRESENTATION: &str = "return=representation";

#[derive(Debug, Deserialize)]
struct PostRow {
    id: i64,
    title: String,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    image_url: Option<String>,
    #[serde(default)]
    author_name: Option<String>,
    #[serde(default)]
    user_id: Option<Uuid>,
    #[serde(default)]
    slug: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    created_at: OffsetDateTime,
}

impl From<PostRow> for PostRecord {
    fn from(row: PostRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            content: row.content.unwrap_or_default(),
            image_url: row.image_url,
            author_name: row.author_name,
            user_id: row.user_id,
            slug: row.slug,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
struct NewPostRow<'a> {
    title: &'a str,
    content: &'a str,
    image_url: Option<&'a str>,
    author_name: Option<&'a str>,
    user_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    slug: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct PostPatch<'a> {
    title: &'a str,
    content: &'a str,
    image_url: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    slug: Option<&'a str>,
}

impl From<CallError> for RepoError {
    fn from(err: CallError) -> Self {
        match err {
            CallError::Timeout => RepoError::Timeout,
            CallError::Status { status, message } => match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => RepoError::Unauthorized,
                StatusCode::BAD_REQUEST
                | StatusCode::CONFLICT
                | StatusCode::UNPROCESSABLE_ENTITY => RepoError::InvalidInput { message },
                _ => RepoError::Persistence(format!("{status}: {message}")),
            },
            other => RepoError::from_persistence(other),
        }
    }
}

impl BackendClient {
    fn table_url(&self) -> Result<Url, CallError> {
        self.endpoint(&format!("rest/v1/{}", self.posts_table))
    }

    fn row_url(&self, id: i64) -> Result<Url, CallError> {
        let mut url = self.table_url()?;
        url.query_pairs_mut().append_pair("id", &format!("eq.{id}"));
        Ok(url)
    }

    async fn rows(
        &self,
        method: Method,
        url: Url,
        token: Option<&AccessToken>,
        body: Option<serde_json::Value>,
    ) -> Result<Vec<PostRecord>, RepoError> {
        let mut request = self.request(method, url, token);
        if let Some(body) = body {
            request = request.json(&body);
        }
        request = request.header("Prefer", RETURN_REPRESENTATION);

        let rows: Vec<PostRow> = self.send_json(SERVICE, request).await?;
        Ok(rows.into_iter().map(PostRecord::from).collect())
    }
}

fn to_body<T: Serialize>(value: &T) -> Result<serde_json::Value, RepoError> {
    serde_json::to_value(value).map_err(RepoError::from_persistence)
}

#[async_trait]
impl PostsRepo for BackendClient {
    async fn list_posts(&self) -> Result<Vec<PostRecord>, RepoError> {
        let mut url = self.table_url()?;
        url.query_pairs_mut()
            .append_pair("select", "*")
            .append_pair("order", "created_at.desc");
        self.rows(Method::GET, url, None, None).await
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<PostRecord>, RepoError> {
        let mut url = self.table_url()?;
        url.query_pairs_mut()
            .append_pair("select", "*")
            .append_pair("id", &format!("eq.{id}"))
            .append_pair("limit", "1");
        let rows = self.rows(Method::GET, url, None, None).await?;
        Ok(rows.into_iter().next())
    }
}

#[async_trait]
impl PostsWriteRepo for BackendClient {
    async fn create_post(
        &self,
        token: &AccessToken,
        params: CreatePostParams,
    ) -> Result<PostRecord, RepoError> {
        let row = NewPostRow {
            title: &params.title,
            content: &params.content,
            image_url: params.image_url.as_deref(),
            author_name: params.author_name.as_deref(),
            user_id: params.user_id,
            slug: params.slug.as_deref(),
        };
        let body = to_body(&[row])?;

        let rows = self
            .rows(Method::POST, self.table_url()?, Some(token), Some(body))
            .await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| RepoError::from_persistence("insert returned no row"))
    }

    async fn update_post(
        &self,
        token: &AccessToken,
        params: UpdatePostParams,
    ) -> Result<PostRecord, RepoError> {
        let mut url = self.row_url(params.id)?;
        if let Some(owner) = params.owner {
            url.query_pairs_mut()
                .append_pair("user_id", &format!("eq.{owner}"));
        }

        let patch = PostPatch {
            title: &params.title,
            content: &params.content,
            image_url: params.image_url.as_deref(),
            slug: params.slug.as_deref(),
        };
        let body = to_body(&patch)?;

        let rows = self.rows(Method::PATCH, url, Some(token), Some(body)).await?;
        rows.into_iter().next().ok_or(RepoError::NotFound)
    }

    async fn delete_post(&self, token: &AccessToken, id: i64) -> Result<(), RepoError> {
        let rows = self
            .rows(Method::DELETE, self.row_url(id)?, Some(token), None)
            .await?;
        if rows.is_empty() {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}
