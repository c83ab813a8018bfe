use std::sync::Arc;
use std::time::Duration;

use auth::Authenticator;
use auth::PasswordHasher;
use axum::body::Body;
use axum::http::Request;
use axum::http::Response;
use axum::middleware;
use axum::routing::get;
use axum::routing::patch;
use axum::routing::post;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::Span;

use super::handlers::auth::login;
use super::handlers::auth::refresh_token;
use super::handlers::entities;
use super::handlers::entities::Creatable;
use super::handlers::entities::Editable;
use super::handlers::entities::Resource;
use super::handlers::users::lookup_user;
use super::handlers::users::register_user;
use super::handlers::users::update_user;
use super::middleware::authenticate as auth_middleware;
use crate::domain::auth::ports::AuthServicePort;
use crate::domain::auth::service::AuthService;
use crate::domain::entity::ports::EntityRepository;
use crate::domain::entity::ports::LifecyclePort;
use crate::domain::entity::service::LifecycleService;
use crate::domain::invoice::models::Invoice;
use crate::domain::issuer::models::Issuer;
use crate::domain::recipient::models::Recipient;
use crate::domain::role::models::Role;
use crate::domain::user::models::User;
use crate::domain::user::ports::UserServicePort;
use crate::domain::user::service::UserService;

#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<dyn AuthServicePort>,
    pub user_service: Arc<dyn UserServicePort>,
    pub users: Arc<dyn LifecyclePort<User>>,
    pub issuers: Arc<dyn LifecyclePort<Issuer>>,
    pub recipients: Arc<dyn LifecyclePort<Recipient>>,
    pub roles: Arc<dyn LifecyclePort<Role>>,
    pub invoices: Arc<dyn LifecyclePort<Invoice>>,
}

impl AppState {
    /// Wire the domain services over one repository per record type.
    pub fn build<UR, IR, RR, RoR, InR>(
        users: Arc<UR>,
        issuers: Arc<IR>,
        recipients: Arc<RR>,
        roles: Arc<RoR>,
        invoices: Arc<InR>,
        password_hasher: PasswordHasher,
        authenticator: Authenticator,
        reject_inactive_subjects: bool,
    ) -> Self
    where
        UR: EntityRepository<User>,
        IR: EntityRepository<Issuer>,
        RR: EntityRepository<Recipient>,
        RoR: EntityRepository<Role>,
        InR: EntityRepository<Invoice>,
    {
        let user_service = Arc::new(UserService::with_hasher(users, password_hasher));
        let auth_service = AuthService::new(Arc::clone(&user_service), authenticator)
            .reject_inactive_subjects(reject_inactive_subjects);

        Self {
            auth_service: Arc::new(auth_service),
            user_service: Arc::clone(&user_service) as Arc<dyn UserServicePort>,
            users: user_service,
            issuers: Arc::new(LifecycleService::new(issuers)),
            recipients: Arc::new(LifecycleService::new(recipients)),
            roles: Arc::new(LifecycleService::new(roles)),
            invoices: Arc::new(LifecycleService::new(invoices)),
        }
    }
}

/// List and fetch routes of a collection.
fn read_routes<E: Resource>(router: Router<AppState>) -> Router<AppState> {
    let base = format!("/{}", E::COLLECTION);

    router
        .route(&base, get(entities::list::<E>))
        .route(&format!("{}/", base), get(entities::list::<E>))
        .route(&format!("{}/:id", base), get(entities::get_one::<E>))
}

/// Read, search and status routes of a collection.
fn lifecycle_routes<E: Resource>(router: Router<AppState>) -> Router<AppState> {
    let base = format!("/{}", E::COLLECTION);

    read_routes::<E>(router)
        .route(&format!("{}/search", base), get(entities::search::<E>))
        .route(&format!("{}/:id/activate", base), patch(entities::activate::<E>))
        .route(&format!("{}/:id/deactivate", base), patch(entities::deactivate::<E>))
}

/// Create routes of a collection, with and without the trailing slash.
fn create_routes<E: Creatable>(router: Router<AppState>) -> Router<AppState> {
    let base = format!("/{}", E::COLLECTION);

    router
        .route(&base, post(entities::create::<E>))
        .route(&format!("{}/", base), post(entities::create::<E>))
}

/// Full set of routes for a collection created and patched through the generic handlers.
fn editable_routes<E: Editable>(router: Router<AppState>) -> Router<AppState> {
    let base = format!("/{}", E::COLLECTION);

    create_routes::<E>(lifecycle_routes::<E>(router))
        .route(&format!("{}/:id", base), patch(entities::update::<E>))
}

/// Invoices are registered and read back, never edited or deactivated.
fn invoice_routes(router: Router<AppState>) -> Router<AppState> {
    create_routes::<Invoice>(read_routes::<Invoice>(router))
        .route("/invoices/register", post(entities::create::<Invoice>))
}

pub fn create_router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/auth/token", post(login))
        .route("/users", post(register_user))
        .route("/users/", post(register_user));

    let mut protected_routes = Router::new()
        .route("/auth/refresh_token", post(refresh_token))
        .route("/users/lookup", get(lookup_user))
        .route("/users/:id", patch(update_user));
    protected_routes = lifecycle_routes::<User>(protected_routes);
    protected_routes = editable_routes::<Issuer>(protected_routes);
    protected_routes = editable_routes::<Recipient>(protected_routes);
    protected_routes = editable_routes::<Role>(protected_routes);
    protected_routes = invoice_routes(protected_routes);

    let protected_routes = protected_routes.route_layer(middleware::from_fn_with_state(
        state.clone(),
        auth_middleware,
    ));

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                version = ?request.version(),
            )
        })
        .on_request(|request: &Request<Body>, _span: &Span| {
            tracing::info!(
                method = %request.method(),
                uri = %request.uri(),
                "Request started"
            );
        })
        .on_response(
            |response: &Response<Body>, latency: Duration, _span: &Span| {
                tracing::info!(
                    status = response.status().as_u16(),
                    latency_ms = latency.as_millis(),
                    "Request completed"
                );
            },
        );

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(trace_layer)
        .layer(CorsLayer::permissive())
        .with_state(state)
}
