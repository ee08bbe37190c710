//! CLI command implementations

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use rollcall::{
    build_http_client, AuthError, AuthOptions, AuthSession, CaptureError, CaptureSession,
    Destination, FileSessionStore, HttpAttendanceSink, Navigator, Portal, SessionStore,
    UserNotifier,
};
use rollconf::{ConfigSources, RollConfig};

use crate::camera::FileStillCamera;

/// Prints alerts the way the in-page dialogs did.
struct ConsoleNotifier;

impl UserNotifier for ConsoleNotifier {
    fn alert(&self, message: &str) {
        eprintln!("{}", message.yellow());
    }
}

/// Prints the post-login destination instead of navigating a page.
struct ConsoleNavigator;

impl Navigator for ConsoleNavigator {
    fn navigate(&self, destination: Destination) {
        println!(
            "{} Continue at {}",
            "Signed in.".green(),
            destination.as_path()
        );
    }
}

fn auth_options(config: &RollConfig) -> AuthOptions {
    AuthOptions {
        timeout_secs: config.server.timeout_secs,
        accept_invalid_certs: config.server.accept_invalid_certs,
        verbose_login: config.diagnostics.verbose_login,
    }
}

fn session_store(config: &RollConfig) -> FileSessionStore {
    FileSessionStore::new(config.paths.session_file.clone())
}

/// Sign in to a portal and persist the session on success.
pub async fn login(
    config: &RollConfig,
    user: &str,
    portal: Portal,
    password: Option<String>,
) -> Result<()> {
    let password = match password {
        Some(password) => password,
        None => dialoguer::Password::new()
            .with_prompt("Password")
            .interact()
            .context("failed to read password")?,
    };

    let auth = AuthSession::with_options(
        &config.server.base_url,
        auth_options(config),
        Arc::new(session_store(config)),
        Arc::new(ConsoleNavigator),
        Arc::new(ConsoleNotifier),
    )?;

    match auth.login(user, &password, portal).await {
        Ok(outcome) => {
            tracing::debug!(roles = ?outcome.roles, "login complete");
            Ok(())
        }
        // The notifier already showed the message
        Err(AuthError::AuthenticationFailed { .. }) | Err(AuthError::AuthorizationMismatch { .. }) => {
            std::process::exit(1);
        }
        Err(other) => Err(other.into()),
    }
}

/// Capture a frame from the image file and submit it with the code.
pub async fn attend(config: &RollConfig, code: &str, image: PathBuf) -> Result<()> {
    let http = build_http_client(&auth_options(config))
        .context("failed to build HTTP client")?;
    let sink = HttpAttendanceSink::with_client(&config.server.base_url, http);

    let mut capture = CaptureSession::new(
        Arc::new(FileStillCamera::new(image)),
        Arc::new(sink),
        Arc::new(ConsoleNotifier),
    );

    if let Err(err) = run_capture(&mut capture, code).await {
        match err {
            // The notifier already showed the message
            CaptureError::CameraAccessDenied { .. } | CaptureError::IncompleteSubmission => {
                std::process::exit(1);
            }
            other => return Err(other.into()),
        }
    }
    Ok(())
}

async fn run_capture(capture: &mut CaptureSession, code: &str) -> Result<(), CaptureError> {
    capture.start_camera().await?;
    capture.capture_image().await?;
    let receipt = capture.submit(code).await?;
    println!("{}", receipt.green());
    Ok(())
}

/// Show the stored session, if any.
pub fn session(config: &RollConfig) -> Result<()> {
    let store = session_store(config);
    let Some(session) = store.load()? else {
        println!("No stored session.");
        return Ok(());
    };

    let shown: String = session.token.chars().take(12).collect();
    println!("Token:   {shown}...");
    println!("Roles:   {}", session.roles.join(", "));
    println!(
        "Issued:  {}",
        session.issued_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    match session.expires_at() {
        Some(_) if session.is_expired() => {
            println!("Expires: {} ({})", session.expiry_date, "expired".red());
        }
        Some(_) => {
            println!("Expires: {} ({})", session.expiry_date, "valid".green());
        }
        None => {
            println!("Expires: {} (unrecognized format)", session.expiry_date);
        }
    }
    Ok(())
}

/// Drop the stored session.
pub fn logout(config: &RollConfig) -> Result<()> {
    session_store(config).clear()?;
    println!("Session cleared.");
    Ok(())
}

/// Print the effective configuration and where each piece came from.
pub fn show_config(config: &RollConfig, sources: &ConfigSources) {
    print!("{}", config.to_toml());
    println!();
    println!("# Sources");
    if sources.files.is_empty() && sources.env_overrides.is_empty() {
        println!("#   defaults only");
    }
    for file in &sources.files {
        println!("#   file: {}", file.display());
    }
    for var in &sources.env_overrides {
        println!("#   env:  {var}");
    }
}
