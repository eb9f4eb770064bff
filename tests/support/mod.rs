#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::{
    Arc, Mutex,
    atomic::{AtomicBool, AtomicI64, Ordering},
};

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Method, Request, header},
};
use bytes::Bytes;
use http_body_util::BodyExt;
use time::{Duration, OffsetDateTime, macros::datetime};
use url::Url;
use uuid::Uuid;

use bagusblog::application::{
    admin::{AdminPostService, SubmissionGuard},
    auth::{AuthError, AuthGateway, AuthService},
    editor::EditorConfig,
    feed::FeedService,
    repos::{
        CreatePostParams, ObjectStorage, PostsRepo, PostsWriteRepo, RepoError, StorageError,
        UpdatePostParams,
    },
    site::SiteProfile,
};
use bagusblog::domain::{
    auth::{AccessToken, AuthSession, SessionUser},
    entities::PostRecord,
};
use bagusblog::infra::http::{self, HttpState, SessionCookies};

pub const VALID_TOKEN: &str = "valid-token";
pub const REFRESHED_TOKEN: &str = "refreshed-token";
pub const VALID_REFRESH: &str = "refresh-ok";
pub const OWNER_EMAIL: &str = "owner@example.com";
pub const OWNER_PASSWORD: &str = "correct horse";
pub const CDN_BASE: &str = "https://cdn.test/blog-images/";
pub const BOUNDARY: &str = "bagusblog-test-boundary";

pub fn owner() -> SessionUser {
    SessionUser {
        id: Uuid::from_u128(7),
        email: Some(OWNER_EMAIL.to_string()),
        display_name: Some("Bagus".to_string()),
    }
}

pub fn post(id: i64, title: &str, created_at: OffsetDateTime) -> PostRecord {
    PostRecord {
        id,
        title: title.to_string(),
        content: format!("<p>Body of {title}</p>"),
        image_url: None,
        author_name: Some("Bagus".to_string()),
        user_id: Some(owner().id),
        slug: None,
        created_at,
    }
}

pub fn tiny_png() -> Vec<u8> {
    let mut bytes = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
    bytes.extend_from_slice(&[0, 0, 0, 0x0D]);
    bytes.extend_from_slice(b"IHDR");
    bytes.extend_from_slice(&4u32.to_be_bytes());
    bytes.extend_from_slice(&4u32.to_be_bytes());
    bytes.extend_from_slice(&[8, 6, 0, 0, 0]);
    bytes
}

/// Posts table kept in memory. Rows come back in id order, not by date.
#[derive(Default)]
pub struct MemoryPosts {
    rows: Mutex<BTreeMap<i64, PostRecord>>,
    next_id: AtomicI64,
    pub fail_writes: AtomicBool,
}

impl MemoryPosts {
    pub fn with_rows(rows: Vec<PostRecord>) -> Self {
        let next = rows.iter().map(|row| row.id).max().unwrap_or(0);
        Self {
            rows: Mutex::new(rows.into_iter().map(|row| (row.id, row)).collect()),
            next_id: AtomicI64::new(next),
            fail_writes: AtomicBool::new(false),
        }
    }

    pub fn get(&self, id: i64) -> Option<PostRecord> {
        self.rows.lock().unwrap().get(&id).cloned()
    }

    pub fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    fn check_writable(&self) -> Result<(), RepoError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            Err(RepoError::Persistence("simulated write failure".into()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl PostsRepo for MemoryPosts {
    async fn list_posts(&self) -> Result<Vec<PostRecord>, RepoError> {
        Ok(self.rows.lock().unwrap().values().cloned().collect())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<PostRecord>, RepoError> {
        Ok(self.get(id))
    }
}

#[async_trait]
impl PostsWriteRepo for MemoryPosts {
    async fn create_post(
        &self,
        _token: &AccessToken,
        params: CreatePostParams,
    ) -> Result<PostRecord, RepoError> {
        self.check_writable()?;
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let record = PostRecord {
            id,
            title: params.title,
            content: params.content,
            image_url: params.image_url,
            author_name: params.author_name,
            user_id: Some(params.user_id),
            slug: params.slug,
            created_at: datetime!(2026-01-01 00:00 UTC) + Duration::days(id),
        };
        self.rows.lock().unwrap().insert(id, record.clone());
        Ok(record)
    }

    async fn update_post(
        &self,
        _token: &AccessToken,
        params: UpdatePostParams,
    ) -> Result<PostRecord, RepoError> {
        self.check_writable()?;
        let mut rows = self.rows.lock().unwrap();
        let row = rows.get_mut(&params.id).ok_or(RepoError::NotFound)?;
        if params.owner.is_some() && row.user_id != params.owner {
            return Err(RepoError::NotFound);
        }
        row.title = params.title;
        row.content = params.content;
        row.image_url = params.image_url;
        row.slug = params.slug;
        Ok(row.clone())
    }

    async fn delete_post(&self, _token: &AccessToken, id: i64) -> Result<(), RepoError> {
        self.check_writable()?;
        self.rows
            .lock()
            .unwrap()
            .remove(&id)
            .map(|_| ())
            .ok_or(RepoError::NotFound)
    }
}

#[derive(Default)]
pub struct MemoryStorage {
    objects: Mutex<BTreeMap<String, Bytes>>,
    pub fail_uploads: AtomicBool,
}

impl MemoryStorage {
    pub fn object_names(&self) -> Vec<String> {
        self.objects.lock().unwrap().keys().cloned().collect()
    }
}

#[async_trait]
impl ObjectStorage for MemoryStorage {
    async fn upload(
        &self,
        _token: &AccessToken,
        object_name: &str,
        _content_type: &str,
        data: Bytes,
    ) -> Result<(), StorageError> {
        if self.fail_uploads.load(Ordering::SeqCst) {
            return Err(StorageError::Rejected {
                status: 400,
                message: "Bucket not found".into(),
            });
        }
        self.objects
            .lock()
            .unwrap()
            .insert(object_name.to_string(), data);
        Ok(())
    }

    fn public_url(&self, object_name: &str) -> String {
        format!("{CDN_BASE}{object_name}")
    }

    async fn remove(&self, _token: &AccessToken, object_name: &str) -> Result<(), StorageError> {
        self.objects.lock().unwrap().remove(object_name);
        Ok(())
    }
}

/// Accepts [`VALID_TOKEN`] and [`REFRESHED_TOKEN`]; refreshes [`VALID_REFRESH`].
#[derive(Default)]
pub struct StubAuth;

fn session_with(access: &str) -> AuthSession {
    AuthSession {
        access_token: AccessToken::new(access),
        refresh_token: VALID_REFRESH.to_string(),
        expires_in: 3600,
        user: owner(),
    }
}

#[async_trait]
impl AuthGateway for StubAuth {
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, AuthError> {
        if email == OWNER_EMAIL && password == OWNER_PASSWORD {
            Ok(session_with(VALID_TOKEN))
        } else {
            Err(AuthError::InvalidCredentials {
                message: "Invalid login credentials".into(),
            })
        }
    }

    async fn get_user(&self, token: &AccessToken) -> Result<SessionUser, AuthError> {
        match token.as_str() {
            VALID_TOKEN | REFRESHED_TOKEN => Ok(owner()),
            _ => Err(AuthError::Unauthorized),
        }
    }

    async fn refresh_session(&self, refresh_token: &str) -> Result<AuthSession, AuthError> {
        if refresh_token == VALID_REFRESH {
            Ok(session_with(REFRESHED_TOKEN))
        } else {
            Err(AuthError::Unauthorized)
        }
    }

    async fn sign_out(&self, _token: &AccessToken) -> Result<(), AuthError> {
        Ok(())
    }
}

pub fn site_profile() -> SiteProfile {
    SiteProfile {
        brand_title: "BagusBlog".into(),
        tagline: "Notes".into(),
        footer_copy: "BagusBlog".into(),
        public_site_url: Url::parse("https://blog.example/").unwrap(),
        fallback_author: "Admin".into(),
        sanitize_content: true,
    }
}

pub struct TestApp {
    pub router: Router,
    pub posts: Arc<MemoryPosts>,
    pub storage: Arc<MemoryStorage>,
    pub submissions: SubmissionGuard,
}

impl TestApp {
    pub fn new(rows: Vec<PostRecord>) -> Self {
        let posts = Arc::new(MemoryPosts::with_rows(rows));
        let storage = Arc::new(MemoryStorage::default());
        let site = site_profile();
        let editor = EditorConfig::default();
        let submissions = SubmissionGuard::new();

        let reader: Arc<dyn PostsRepo> = posts.clone();
        let writer: Arc<dyn PostsWriteRepo> = posts.clone();
        let object_storage: Arc<dyn ObjectStorage> = storage.clone();

        let state = HttpState {
            feed: Arc::new(FeedService::new(reader.clone(), site.clone(), editor.clone())),
            admin: Arc::new(
                AdminPostService::new(reader, writer, object_storage).with_upload_limit(1024 * 1024),
            ),
            auth: Arc::new(AuthService::new(Arc::new(StubAuth))),
            submissions: submissions.clone(),
            editor: Arc::new(editor),
            site: Arc::new(site),
            cookies: SessionCookies::new(false),
            upload_body_limit: 2 * 1024 * 1024,
        };

        Self {
            router: http::build_router(state),
            posts,
            storage,
            submissions,
        }
    }
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .expect("request should build")
}

pub fn signed_in(mut request: Request<Body>) -> Request<Body> {
    request.headers_mut().insert(
        header::COOKIE,
        format!("bagusblog-access-token={VALID_TOKEN}")
            .parse()
            .expect("cookie header"),
    );
    request
}

pub fn form_post(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .expect("request should build")
}

/// Builder for `multipart/form-data` bodies.
#[derive(Default)]
pub struct MultipartBody {
    bytes: Vec<u8>,
}

impl MultipartBody {
    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.bytes.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
        self
    }

    pub fn file(mut self, name: &str, filename: &str, content_type: &str, data: &[u8]) -> Self {
        self.bytes.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        self.bytes.extend_from_slice(data);
        self.bytes.extend_from_slice(b"\r\n");
        self
    }

    pub fn into_request(mut self, uri: &str) -> Request<Body> {
        self.bytes
            .extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(self.bytes))
            .expect("request should build")
    }
}

pub async fn body_to_string(body: Body) -> String {
    let bytes = body.collect().await.expect("collect body").to_bytes();
    String::from_utf8(bytes.to_vec()).expect("utf8 body")
}

pub fn location(response: &axum::response::Response) -> Option<&str> {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
}

pub fn set_cookies(response: &axum::response::Response) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok().map(str::to_string))
        .collect()
}
