use super::*;

#[test]
fn cli_overrides_take_highest_precedence() {
    let mut raw = RawSettings::default();
    raw.server.port = Some(4000);
    raw.logging.level = Some("info".to_string());
    raw.backend.url = Some("https://from-file.supabase.co".to_string());

    let overrides = ServeOverrides {
        server_port: Some(4321),
        log_level: Some("debug".to_string()),
        backend: BackendOverrides {
            backend_url: Some("https://from-cli.supabase.co".to_string()),
            backend_anon_key: None,
        },
        ..Default::default()
    };

    raw.apply_serve_overrides(&overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert_eq!(settings.server.addr.port(), 4321);
    assert_eq!(settings.logging.level, LevelFilter::DEBUG);
    assert_eq!(
        settings.backend.url.as_ref().map(Url::as_str),
        Some("https://from-cli.supabase.co/")
    );
}

#[test]
fn defaults_cover_backend_and_site() {
    let settings = Settings::from_raw(RawSettings::default()).expect("valid settings");

    assert!(settings.backend.url.is_none());
    assert_eq!(settings.backend.posts_table, "posts");
    assert_eq!(settings.backend.images_bucket, "blog-images");
    assert_eq!(
        settings.uploads.max_request_bytes.get(),
        DEFAULT_UPLOAD_REQUEST_LIMIT_BYTES
    );
    assert_eq!(settings.site.brand_title, "BagusBlog");
    assert_eq!(settings.site.public_site_url.as_str(), "http://127.0.0.1:3000/");
    assert!(!settings.site.sanitize_content);
    assert!(!settings.site.scope_updates_to_owner);
    assert!(!settings.session.secure_cookies);
}

#[test]
fn base_urls_gain_trailing_slash() {
    let mut raw = RawSettings::default();
    raw.backend.url = Some(" https://project.supabase.co/base ".to_string());
    raw.site.public_site_url = Some("https://blog.example".to_string());

    let settings = Settings::from_raw(raw).expect("valid settings");
    assert_eq!(
        settings.backend.url.as_ref().map(Url::as_str),
        Some("https://project.supabase.co/base/")
    );
    assert_eq!(settings.site.public_site_url.as_str(), "https://blog.example/");
}

#[test]
fn rejects_non_http_backend_url() {
    let mut raw = RawSettings::default();
    raw.backend.url = Some("ftp://project.example".to_string());

    let err = Settings::from_raw(raw).expect_err("ftp is rejected");
    assert!(matches!(err, LoadError::Invalid { key: "backend.url", .. }));
}

#[test]
fn blank_anon_key_is_treated_as_missing() {
    let mut raw = RawSettings::default();
    raw.backend.anon_key = Some("   ".to_string());
    let settings = Settings::from_raw(raw).expect("valid settings");
    assert!(settings.backend.anon_key.is_none());
}

#[test]
fn backend_debug_redacts_anon_key() {
    let mut raw = RawSettings::default();
    raw.backend.anon_key = Some("super-secret".to_string());
    let settings = Settings::from_raw(raw).expect("valid settings");
    let rendered = format!("{:?}", settings.backend);
    assert!(!rendered.contains("super-secret"));
    assert!(rendered.contains("<redacted>"));
}

#[test]
fn cli_json_logging_enforces_format() {
    let mut raw = RawSettings::default();
    let overrides = ServeOverrides {
        log_json: Some(true),
        ..Default::default()
    };

    raw.apply_serve_overrides(&overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert!(matches!(settings.logging.format, LogFormat::Json));
}

#[test]
fn zero_upload_limit_is_invalid() {
    let mut raw = RawSettings::default();
    raw.uploads.max_request_bytes = Some(0);
    assert!(Settings::from_raw(raw).is_err());
}

#[test]
fn default_to_serve_command() {
    let args = CliArgs::parse_from(["bagusblog"]);
    let command = args
        .command
        .unwrap_or(Command::Serve(Box::<ServeArgs>::default()));
    assert!(matches!(command, Command::Serve(_)));
}

#[test]
fn parse_check_backend_arguments() {
    let args = CliArgs::parse_from([
        "bagusblog",
        "check-backend",
        "--backend-url",
        "https://project.supabase.co",
        "--backend-anon-key",
        "anon",
    ]);

    match args.command.expect("check-backend command") {
        Command::CheckBackend(overrides) => {
            assert_eq!(
                overrides.backend_url.as_deref(),
                Some("https://project.supabase.co")
            );
            assert_eq!(overrides.backend_anon_key.as_deref(), Some("anon"));
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn parse_serve_arguments() {
    let args = CliArgs::parse_from([
        "bagusblog",
        "serve",
        "--server-port",
        "8080",
        "--session-secure-cookies",
        "true",
    ]);

    match args.command.expect("serve command") {
        Command::Serve(serve) => {
            assert_eq!(serve.overrides.server_port, Some(8080));
            assert_eq!(serve.overrides.session_secure_cookies, Some(true));
        }
        other => panic!("unexpected command: {other:?}"),
    }
}
