pub mod auth;
pub mod error;
pub mod routes;
pub mod state;

use axum::middleware;
use axum::routing::{delete, get, post, put};
use axum::Router;
use std::path::PathBuf;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use vault_core::config::Config;
use vault_core::Vault;

pub use state::AppState;

/// Build the axum Router with all API routes and middleware.
/// Used by `serve()` and available for integration testing.
pub fn build_router(app_state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Session
        .route("/api/health", get(routes::login::health))
        .route("/api/login", post(routes::login::login))
        .route("/api/logout", post(routes::login::logout))
        .route("/api/profile", post(routes::login::update_profile))
        // Commands
        .route(
            "/api/commands",
            get(routes::commands::list_commands).post(routes::commands::create_command),
        )
        .route(
            "/api/commands/{id}",
            get(routes::commands::get_command)
                .put(routes::commands::update_command)
                .delete(routes::commands::delete_command),
        )
        .route(
            "/api/commands/{id}/tags",
            put(routes::commands::set_command_tags),
        )
        .route(
            "/api/commands/{id}/steps",
            get(routes::steps::get_steps).put(routes::steps::save_steps),
        )
        .route("/api/commands/{id}/mode", put(routes::commands::set_mode))
        .route(
            "/api/commands/{id}/render",
            get(routes::commands::render_command),
        )
        // Placeholder registry
        .route(
            "/api/placeholders",
            get(routes::placeholders::list_placeholders)
                .post(routes::placeholders::create_placeholder),
        )
        .route(
            "/api/placeholders/{id}",
            put(routes::placeholders::rename_placeholder)
                .delete(routes::placeholders::delete_placeholder),
        )
        // Value sets
        .route(
            "/api/placeholder-sets",
            get(routes::placeholder_sets::list_sets).post(routes::placeholder_sets::create_set),
        )
        .route(
            "/api/placeholder-sets/{id}",
            put(routes::placeholder_sets::rename_set).delete(routes::placeholder_sets::delete_set),
        )
        .route(
            "/api/placeholder-sets/{id}/values",
            get(routes::placeholder_sets::list_values).put(routes::placeholder_sets::put_values),
        )
        .route(
            "/api/placeholder-values/{id}",
            delete(routes::placeholder_sets::delete_value),
        )
        // Tags
        .route(
            "/api/tags",
            get(routes::tags::list_tags).post(routes::tags::create_tag),
        )
        .route(
            "/api/tags/{id}",
            put(routes::tags::rename_tag).delete(routes::tags::delete_tag),
        )
        // Notes
        .route(
            "/api/notes",
            get(routes::notes::list_notes).post(routes::notes::create_note),
        )
        .route(
            "/api/notes/{id}",
            get(routes::notes::get_note)
                .put(routes::notes::update_note)
                .delete(routes::notes::delete_note),
        )
        .route("/api/notes/{id}/tags", put(routes::notes::set_note_tags))
        // Search and substitution
        .route("/api/search", get(routes::search::search))
        .route("/api/substitute", post(routes::substitute::substitute_text))
        .layer(middleware::from_fn_with_state(
            app_state.clone(),
            auth::session_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state)
}

/// Open the configured vault under `root`, seeding first-run data when the
/// config asks for it. The operator account is always ensured.
pub fn open_state(root: PathBuf) -> anyhow::Result<(Config, AppState)> {
    let config = Config::load(&root)?;
    let mut vault = Vault::open(&config.database_path(&root))?;
    if config.seed_defaults {
        vault.seed_defaults()?;
    } else {
        vault.ensure_default_user()?;
    }
    Ok((config, AppState::new(root, vault)))
}

/// Start the API server on `host:port`.
pub async fn serve(root: PathBuf, host: &str, port: u16, open_browser: bool) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind((host, port)).await?;
    serve_on(root, listener, open_browser).await
}

/// Start the API server on a pre-bound listener.
///
/// Unlike `serve`, this accepts a `TcpListener` that was already bound so the
/// caller can read the actual port before starting (useful when `port = 0` and
/// the OS picks a free port).
pub async fn serve_on(
    root: PathBuf,
    listener: tokio::net::TcpListener,
    open_browser: bool,
) -> anyhow::Result<()> {
    let (config, app_state) = open_state(root)?;
    for w in config.validate() {
        tracing::warn!("{}", w.message);
    }
    let addr = listener.local_addr()?;
    let app = build_router(app_state);

    tracing::info!("cmdvault listening on http://{addr}");

    if open_browser {
        let url = format!("http://{addr}");
        let _ = open::that(&url);
    }

    axum::serve(listener, app).await?;
    Ok(())
}
