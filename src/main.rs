use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    routing::{get, patch, post},
    Router,
};
use redis::Client as RedisClient;
use tower::ServiceBuilder;
use tower_http::cors::{AllowHeaders, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lounge_menu_api::{
    config::Config,
    db,
    middleware::auth::JwtSecret,
    routes,
    services::images::ImageStore,
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Arc::new(Config::from_env()?);

    let pool = db::create_pool(&config.database_url).await?;
    db::run_migrations(&pool).await?;
    info!("Database connected and migrations applied");

    let redis_conn = RedisClient::open(config.redis_url.as_str())?
        .get_multiplexed_async_connection()
        .await?;
    info!("Redis connected");

    let images = ImageStore::new(&config.media_dir, &config.public_base_url, config.max_upload_bytes);
    tokio::fs::create_dir_all(images.media_dir()).await?;

    let state = AppState {
        db: pool,
        redis: redis_conn,
        config: config.clone(),
        images,
    };

    // Localhost is always allowed for development; CORS_ORIGIN adds the deployed front-end.
    let allowed = config.cors_origin.clone();
    let cors_origin = AllowOrigin::predicate(move |origin: &HeaderValue, _| {
        let Ok(o) = origin.to_str() else {
            return false;
        };
        if o.starts_with("http://localhost") || o.starts_with("http://127.0.0.1") {
            return true;
        }
        allowed.as_deref() == Some(o)
    });

    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(AllowHeaders::list([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            header::ACCEPT,
        ]))
        .allow_origin(cors_origin);

    let jwt_secret = JwtSecret(config.jwt_secret.clone());

    let api = Router::new()
        .route("/health", get(routes::health::health_check))
        // Auth
        .route("/auth/login", post(routes::auth::login))
        .route("/auth/me", get(routes::auth::me))
        .route("/auth/logout", post(routes::auth::logout))
        // Categories
        .route("/admin/categories", get(routes::categories::list_categories).post(routes::categories::create_category))
        .route("/admin/categories/reorder", post(routes::categories::reorder_categories))
        .route(
            "/admin/categories/{id}",
            get(routes::categories::get_category)
                .patch(routes::categories::update_category)
                .delete(routes::categories::delete_category),
        )
        // Sections
        .route("/admin/sections", get(routes::sections::list_sections).post(routes::sections::create_section))
        .route("/admin/sections/reorder", post(routes::sections::reorder_sections))
        .route(
            "/admin/sections/{id}",
            get(routes::sections::get_section)
                .patch(routes::sections::update_section)
                .delete(routes::sections::delete_section),
        )
        .route("/admin/sections/{id}/enabled", patch(routes::sections::set_section_enabled))
        // Menu items
        .route("/admin/menu-items", get(routes::menu_items::list_menu_items).post(routes::menu_items::create_menu_item))
        .route(
            "/admin/menu-items/{id}",
            get(routes::menu_items::get_menu_item)
                .patch(routes::menu_items::update_menu_item)
                .delete(routes::menu_items::delete_menu_item),
        )
        .route("/admin/menu-items/{id}/availability", patch(routes::menu_items::set_menu_item_availability))
        .route("/admin/menu-items/{id}/enabled", patch(routes::menu_items::set_menu_item_enabled))
        // Temporary prices
        .route(
            "/admin/menu-items/{id}/temporary-prices",
            get(routes::temporary_prices::list_temporary_prices)
                .post(routes::temporary_prices::create_temporary_price),
        )
        .route("/admin/menu-items/{id}/temporary-prices/schedule", get(routes::temporary_prices::price_schedule))
        .route(
            "/admin/menu-items/{id}/temporary-prices/{tp_id}",
            patch(routes::temporary_prices::update_temporary_price)
                .delete(routes::temporary_prices::delete_temporary_price),
        )
        .route(
            "/admin/menu-items/{id}/temporary-prices/{tp_id}/enabled",
            patch(routes::temporary_prices::set_temporary_price_enabled),
        )
        .route(
            "/admin/menu-items/{id}/temporary-prices/{tp_id}/duplicate",
            post(routes::temporary_prices::duplicate_temporary_price),
        )
        // Uploads
        .route("/admin/uploads", post(routes::media::upload_image))
        // Public menu
        .route("/public/categories", get(routes::public::list_categories))
        .route("/public/categories/{slug}", get(routes::public::category_by_slug))
        .route("/public/sitemap", get(routes::public::sitemap));

    let app = Router::new()
        .nest("/api/v1", api)
        .route("/media/{*path}", get(routes::media::serve_media))
        .route("/metrics", get(routes::metrics::metrics_handler))
        .layer(axum::Extension(jwt_secret))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        // Multipart overhead on top of the largest accepted image
        .layer(DefaultBodyLimit::max(config.max_upload_bytes + 1024 * 1024))
        .with_state(state);

    let addr = format!("{}:{}", config.host, config.port);
    info!("lounge menu API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
