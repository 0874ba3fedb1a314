// region:    --- Imports
use crate::handlers::{auctioneer, auth, general, listings};
use crate::state::AppState;
use axum::extract::DefaultBodyLimit;
use axum::http::HeaderValue;
use axum::routing::{get, patch, post};
use axum::Router;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::warn;

// endregion: --- Imports

// region:    --- Router
fn cors(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.is_empty() {
        return layer.allow_origin(Any);
    }
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("{:<12} --> 잘못된 CORS origin 무시: {}", "Main", origin);
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(origins))
}

pub fn router(state: AppState) -> Router {
    let general_routes = Router::new()
        .route("/site-detail", get(general::get_site_detail))
        .route("/subscribe", post(general::subscribe))
        .route("/reviews", get(general::get_reviews));

    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/verify-email", post(auth::verify_email))
        .route(
            "/resend-verification-email",
            post(auth::resend_verification_email),
        )
        .route("/send-password-reset-otp", post(auth::send_password_reset_otp))
        .route("/set-new-password", post(auth::set_new_password))
        .route("/login", post(auth::login))
        .route("/refresh", post(auth::refresh))
        .route("/logout", get(auth::logout));

    let listing_routes = Router::new()
        .route("/", get(listings::get_listings))
        .route("/detail/:slug", get(listings::get_listing_detail))
        .route(
            "/detail/:slug/bids",
            get(listings::get_listing_bids).post(listings::place_bid),
        )
        .route(
            "/watchlist",
            get(listings::get_watchlist).post(listings::toggle_watchlist),
        )
        .route("/categories", get(listings::get_categories))
        .route("/categories/:slug", get(listings::get_category_listings));

    let auctioneer_routes = Router::new()
        .route(
            "/",
            get(auctioneer::get_profile).put(auctioneer::update_profile),
        )
        .route(
            "/listings",
            get(auctioneer::get_listings).post(auctioneer::create_listing),
        )
        .route("/listings/:slug", patch(auctioneer::update_listing))
        .route("/listings/:slug/bids", get(auctioneer::get_listing_bids));

    let cors = cors(&state.config.cors_allowed_origins);

    Router::new()
        .nest("/api/v7/general", general_routes)
        .nest("/api/v7/auth", auth_routes)
        .nest("/api/v7/listings", listing_routes)
        .nest("/api/v7/auctioneer", auctioneer_routes)
        .layer(cors)
        .layer(DefaultBodyLimit::max(1024 * 1024 * 2))
        .with_state(state)
}
// endregion: --- Router
