use std::{future::IntoFuture, process, sync::Arc, time::Duration};

use bagusblog::{
    application::{
        admin::{AdminPostService, SubmissionGuard},
        auth::{AuthEvent, AuthGateway, AuthService},
        editor::EditorConfig,
        error::AppError,
        feed::FeedService,
        repos::{ObjectStorage, PostsRepo, PostsWriteRepo},
        site::SiteProfile,
    },
    config,
    infra::{
        backend::BackendClient,
        error::InfraError,
        http::{self, HttpState, SessionCookies},
        telemetry,
    },
};
use tokio::sync::broadcast::error::RecvError;
use tracing::{Dispatch, Level, debug, dispatcher, error, info, warn};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()
        .map_err(|err| AppError::unexpected(format!("failed to load configuration: {err}")))?;

    telemetry::init(&settings.logging).map_err(AppError::from)?;

    match cli_args.command {
        Some(config::Command::CheckBackend(_)) => run_check_backend(&settings).await,
        Some(config::Command::Serve(_)) | None => run_serve(settings).await,
    }
}

async fn run_check_backend(settings: &config::Settings) -> Result<(), AppError> {
    let client = BackendClient::from_settings(&settings.backend)?;
    client.check_health().await?;
    info!(
        target = "bagusblog::check_backend",
        backend = %client.base_url(),
        table = %settings.backend.posts_table,
        "backend reachable"
    );
    Ok(())
}

async fn run_serve(settings: config::Settings) -> Result<(), AppError> {
    let backend = Arc::new(BackendClient::from_settings(&settings.backend)?);
    let state = build_http_state(&settings, backend);

    let events = spawn_auth_event_logger(&state.auth);
    let result = serve_http(&settings, state).await;
    events.abort();

    result
}

fn build_http_state(settings: &config::Settings, backend: Arc<BackendClient>) -> HttpState {
    let reader: Arc<dyn PostsRepo> = backend.clone();
    let writer: Arc<dyn PostsWriteRepo> = backend.clone();
    let storage: Arc<dyn ObjectStorage> = backend.clone();
    let gateway: Arc<dyn AuthGateway> = backend;

    let site = SiteProfile::from(&settings.site);
    let editor = EditorConfig::default();
    let max_upload_bytes = settings.uploads.max_request_bytes.get();

    let feed = FeedService::new(reader.clone(), site.clone(), editor.clone());
    let admin = AdminPostService::new(reader, writer, storage)
        .with_owner_scope(settings.site.scope_updates_to_owner)
        .with_upload_limit(max_upload_bytes)
        .with_fallback_author(settings.site.fallback_author.clone());

    HttpState {
        feed: Arc::new(feed),
        admin: Arc::new(admin),
        auth: Arc::new(AuthService::new(gateway)),
        submissions: SubmissionGuard::new(),
        editor: Arc::new(editor),
        site: Arc::new(site),
        cookies: SessionCookies::new(settings.session.secure_cookies),
        upload_body_limit: usize::try_from(max_upload_bytes).unwrap_or(usize::MAX),
    }
}

fn spawn_auth_event_logger(auth: &AuthService) -> tokio::task::JoinHandle<()> {
    let mut events = auth.on_auth_state_change();
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(AuthEvent::SignedIn { user }) => {
                    info!(target = "bagusblog::auth", user_id = %user.id, "signed in");
                }
                Ok(AuthEvent::TokenRefreshed { user }) => {
                    debug!(target = "bagusblog::auth", user_id = %user.id, "session refreshed");
                }
                Ok(AuthEvent::SignedOut) => {
                    info!(target = "bagusblog::auth", "signed out");
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(target = "bagusblog::auth", skipped, "auth event listener lagged");
                }
                Err(RecvError::Closed) => break,
            }
        }
    })
}

async fn serve_http(settings: &config::Settings, state: HttpState) -> Result<(), AppError> {
    let router = http::build_router(state);
    let listener = tokio::net::TcpListener::bind(settings.server.addr)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;

    info!(
        target = "bagusblog::serve",
        addr = %settings.server.addr,
        "listening"
    );

    let server = axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .into_future();
    let grace = settings.server.graceful_shutdown;

    tokio::select! {
        result = server => {
            result.map_err(|err| AppError::unexpected(format!("server error: {err}")))
        }
        _ = shutdown_deadline(grace) => {
            warn!(
                target = "bagusblog::serve",
                grace_seconds = grace.as_secs(),
                "graceful shutdown timed out; dropping open connections"
            );
            Ok(())
        }
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(target = "bagusblog::serve", error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!(target = "bagusblog::serve", "shutdown signal received");
}

async fn shutdown_deadline(grace: Duration) {
    if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
    tokio::time::sleep(grace).await;
}
