//! Axum route configuration and API documentation.
//!
//! Routes are assembled through `utoipa-axum` so the OpenAPI document stays
//! in sync with the handlers; Swagger UI is served at `/swagger-ui`. The
//! WebSocket upgrade endpoint is mounted as a plain route since it has no
//! JSON schema to document.

use std::sync::Arc;

use axum::{routing::get, Router};
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_axum::{router::OpenApiRouter, routes};
use utoipa_swagger_ui::SwaggerUi;

use crate::server::{controller, state::AppState};

pub const AUTH_TAG: &str = "auth";
pub const EVENT_TAG: &str = "events";
pub const PAYMENT_TAG: &str = "payments";
pub const TICKET_TAG: &str = "tickets";
pub const NOTIFICATION_TAG: &str = "notifications";
pub const REALTIME_TAG: &str = "realtime";

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Ticketboard API",
        description = "Ticketing and event management backend"
    ),
    tags(
        (name = AUTH_TAG, description = "Account registration and sessions"),
        (name = EVENT_TAG, description = "Event listings and status transitions"),
        (name = PAYMENT_TAG, description = "Payment recording and settlement"),
        (name = TICKET_TAG, description = "Ticket issuance, verification and redemption"),
        (name = NOTIFICATION_TAG, description = "Stored user notifications"),
        (name = REALTIME_TAG, description = "Live updates over WebSocket")
    )
)]
struct ApiDoc;

pub fn router(state: AppState) -> Router {
    // Spread-out per-IP rate limit; falls back to the library default
    // (stricter) if the configured values are rejected.
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(2)
            .burst_size(30)
            .finish()
            .unwrap_or_default(),
    );

    let (api_router, api) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .routes(routes!(controller::auth::register))
        .routes(routes!(controller::auth::login))
        .routes(routes!(controller::auth::logout))
        .routes(routes!(controller::auth::me))
        .routes(routes!(controller::event::feed))
        .routes(routes!(controller::event::create_event))
        .routes(routes!(controller::event::get_event))
        .routes(routes!(controller::event::update_event_status))
        .routes(routes!(controller::payment::create_payment))
        .routes(routes!(controller::payment::confirm_payment))
        .routes(routes!(controller::payment::list_payments))
        .routes(routes!(controller::payment::get_payment))
        .routes(routes!(controller::ticket::issue_ticket))
        .routes(routes!(controller::ticket::my_tickets))
        .routes(routes!(controller::ticket::verify_ticket))
        .routes(routes!(controller::ticket::redeem_ticket))
        .routes(routes!(controller::ticket::get_ticket))
        .routes(routes!(controller::ticket::scan_history))
        .routes(routes!(controller::ticket::cancel_ticket))
        .routes(routes!(controller::notification::list_notifications))
        .routes(routes!(controller::notification::mark_notification_read))
        .routes(routes!(controller::notification::mark_all_notifications_read))
        .routes(routes!(controller::notification::broadcast_notification))
        .routes(routes!(controller::realtime::broadcast))
        .routes(routes!(controller::realtime::notify_event_update))
        .routes(routes!(controller::realtime::connection_stats))
        .split_for_parts();

    let api_router = api_router
        .route("/api/realtime/ws", get(controller::realtime::websocket))
        .with_state(state);

    api_router
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", api))
        .layer(CorsLayer::permissive())
        .layer(GovernorLayer::new(governor_conf))
}
