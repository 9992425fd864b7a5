//! # Server Configuration
//!
//! Shared application state, the router and the OpenAPI document.

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, patch, post},
};
use sea_orm::DatabaseConnection;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use utoipa::{
    Modify, OpenApi,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

use crate::config::{AppConfig, ConfigError};
use crate::handlers;
use crate::mail::{LogMailer, Mailer, SendGridMailer};
use crate::pagination::PaginationUriBuilder;
use crate::storage::{ImageStore, LocalImageStore, MAX_IMAGE_BYTES};
use crate::telemetry::trace_context_middleware;

/// Request bodies above this size are rejected before reaching a handler.
const BODY_LIMIT_BYTES: usize = MAX_IMAGE_BYTES + 64 * 1024;

/// Application state containing shared resources
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub db: DatabaseConnection,
    pub uri_builder: Arc<PaginationUriBuilder>,
    pub image_store: Arc<dyn ImageStore>,
    pub mailer: Arc<dyn Mailer>,
}

impl AppState {
    /// Wires the default collaborators: the local image store, and SendGrid
    /// when an API key is configured (otherwise mail is only logged).
    pub fn from_config(config: Arc<AppConfig>, db: DatabaseConnection) -> Result<Self> {
        let uri_builder = PaginationUriBuilder::new(&config.public_base_url).map_err(|source| {
            ConfigError::InvalidPublicBaseUrl {
                value: config.public_base_url.clone(),
                source,
            }
        })?;

        let mailer: Arc<dyn Mailer> = if config.sendgrid_api_key.is_some() {
            Arc::new(SendGridMailer::from_config(&config).context("failed to build mail client")?)
        } else {
            tracing::info!("ONG_SENDGRID_API_KEY not set, outgoing mail will only be logged");
            Arc::new(LogMailer)
        };

        let image_store: Arc<dyn ImageStore> = Arc::new(LocalImageStore::from_config(&config));

        Ok(Self {
            config,
            db,
            uri_builder: Arc::new(uri_builder),
            image_store,
            mailer,
        })
    }
}

/// Creates and configures the Axum application router
pub fn create_app(state: AppState) -> Router {
    let uploads = ServeDir::new(&state.config.upload_dir);

    Router::new()
        .route("/", get(handlers::root))
        .route("/healthz", get(handlers::healthz))
        .route("/users", get(handlers::users::list_users))
        .route(
            "/users/{id}",
            patch(handlers::users::update_user).delete(handlers::users::delete_user),
        )
        .route("/auth/me", get(handlers::auth::me))
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/login", post(handlers::auth::login))
        .nest_service("/uploads", uploads)
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/openapi.json", ApiDoc::openapi()))
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_context_middleware))
}

/// Serves the API until Ctrl-C
pub async fn run_server(config: Arc<AppConfig>, db: DatabaseConnection) -> Result<()> {
    let addr = config
        .bind_addr()
        .with_context(|| format!("invalid server address '{}'", config.api_bind_addr))?;

    let state = AppState::from_config(Arc::clone(&config), db)?;
    let app = create_app(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!(%addr, profile = %config.profile, "server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
    }
}

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Token returned by /auth/login or /auth/register"))
                        .build(),
                ),
            );
        }
    }
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::root,
        crate::handlers::healthz,
        crate::handlers::users::list_users,
        crate::handlers::users::delete_user,
        crate::handlers::users::update_user,
        crate::handlers::auth::me,
        crate::handlers::auth::register,
        crate::handlers::auth::login,
    ),
    components(
        schemas(
            crate::models::ServiceInfo,
            crate::handlers::HealthStatus,
            crate::error::ApiError,
            crate::handlers::users::UserDto,
            crate::handlers::users::UpdateUserForm,
            crate::handlers::auth::LoginRequest,
            crate::handlers::auth::RegisterForm,
            crate::handlers::auth::AuthResponseDto,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "root", description = "Service information and health"),
        (name = "users", description = "User administration"),
        (name = "auth", description = "Registration and login"),
    ),
    info(
        title = "ONG Backend API",
        description = "Users and authentication for the organization's content site",
        version = env!("CARGO_PKG_VERSION"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_lists_every_route() {
        let doc = ApiDoc::openapi();
        for path in ["/", "/healthz", "/users", "/users/{id}", "/auth/me", "/auth/register", "/auth/login"] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }

    #[test]
    fn multipart_forms_document_camel_case_fields() {
        use utoipa::openapi::{RefOr, schema::Schema};

        let components = ApiDoc::openapi().components.expect("components");
        for (form, field) in [("RegisterForm", "firstName"), ("UpdateUserForm", "lastName")] {
            let Some(RefOr::T(Schema::Object(object))) = components.schemas.get(form) else {
                panic!("{form} is not an object schema");
            };
            assert!(object.properties.contains_key(field), "{form} lacks {field}");
            assert!(!object.properties.contains_key("first_name"));
        }
    }
}
