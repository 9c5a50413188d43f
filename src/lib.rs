pub mod application;
pub mod config;
pub mod db;
pub mod domain;
pub mod errors;
pub mod handlers;
pub mod infrastructure;
pub mod schema;

use actix_web::{middleware::Logger, web, App, HttpServer};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub use config::Config;
pub use db::{create_pool, DbPool};

use application::cart_service::CartService;
use application::order_service::OrderCreationService;
use application::payment_service::PaymentService;
use application::shipment_service::ShipmentSyncService;
use infrastructure::cart_repo::DieselCartRepository;
use infrastructure::gateway_client::HttpPaymentGateway;
use infrastructure::inventory_repo::DieselInventoryRepository;
use infrastructure::order_repo::DieselOrderRepository;
use infrastructure::shipment_repo::DieselShipmentRepository;
use infrastructure::shipping_client::HttpShippingProvider;

pub type CartSvc = CartService<DieselCartRepository, DieselInventoryRepository>;
pub type OrderSvc =
    OrderCreationService<DieselCartRepository, DieselInventoryRepository, DieselOrderRepository>;
pub type PaymentSvc = PaymentService<DieselOrderRepository, HttpPaymentGateway>;
pub type ShipmentSvc =
    ShipmentSyncService<DieselOrderRepository, DieselShipmentRepository, HttpShippingProvider>;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Run any pending Diesel migrations against the pool's database.
pub fn run_migrations(pool: &DbPool) {
    let mut conn = pool.get().expect("Failed to get DB connection for migrations");
    conn.run_pending_migrations(MIGRATIONS)
        .expect("Failed to run database migrations");
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::cart::add,
        handlers::cart::update,
        handlers::cart::remove,
        handlers::cart::clear,
        handlers::cart::get,
        handlers::orders::checkout,
        handlers::orders::get,
        handlers::payments::create_charge,
        handlers::payments::create_card_token,
        handlers::shipments::sync,
        handlers::shipments::quote,
    ),
    components(schemas(
        handlers::cart::AddToCartRequest,
        handlers::cart::UpdateCartItemRequest,
        handlers::cart::CartItemResponse,
        handlers::cart::CartResponse,
        handlers::orders::AddressDto,
        handlers::orders::CheckoutRequest,
        handlers::orders::OrderItemResponse,
        handlers::orders::OrderResponse,
        handlers::payments::PayerDto,
        handlers::payments::CreateChargeRequest,
        handlers::payments::ChargeResponse,
        handlers::payments::CardTokenRequest,
        handlers::payments::CardTokenResponse,
        handlers::shipments::ShipmentResponse,
        handlers::shipments::QuoteResponse,
    ))
)]
pub struct ApiDoc;

/// Build and return an actix-web `Server` bound to `config.host:config.port`.
///
/// The caller is responsible for `.await`-ing (or `tokio::spawn`-ing) the
/// returned server.
pub fn build_server(pool: DbPool, config: Config) -> std::io::Result<actix_web::dev::Server> {
    let gateway = HttpPaymentGateway::new(&config.gateway_base_url, &config.gateway_token)
        .map_err(|e| std::io::Error::other(e.to_string()))?;
    let shipping = HttpShippingProvider::new(&config.shipping_base_url, &config.shipping_token)
        .map_err(|e| std::io::Error::other(e.to_string()))?;

    let cart_svc = web::Data::new(CartService::new(
        DieselCartRepository::new(pool.clone()),
        DieselInventoryRepository::new(pool.clone()),
    ));
    let order_svc = web::Data::new(OrderCreationService::new(
        DieselCartRepository::new(pool.clone()),
        DieselInventoryRepository::new(pool.clone()),
        DieselOrderRepository::new(pool.clone()),
    ));
    let payment_svc = web::Data::new(PaymentService::new(
        DieselOrderRepository::new(pool.clone()),
        gateway,
        config.webhook_lookup_retry(),
    ));
    let shipment_svc = web::Data::new(ShipmentSyncService::new(
        DieselOrderRepository::new(pool.clone()),
        DieselShipmentRepository::new(pool),
        shipping,
        config.tracking_poll_retry(),
    ));
    let config_data = web::Data::new(config.clone());

    Ok(HttpServer::new(move || {
        App::new()
            .app_data(cart_svc.clone())
            .app_data(order_svc.clone())
            .app_data(payment_svc.clone())
            .app_data(shipment_svc.clone())
            .app_data(config_data.clone())
            .wrap(Logger::default())
            .service(
                web::scope("/cart")
                    .route("", web::get().to(handlers::cart::get))
                    .route("", web::delete().to(handlers::cart::clear))
                    .route("/add", web::post().to(handlers::cart::add))
                    .route("/update", web::patch().to(handlers::cart::update))
                    .route("/item", web::delete().to(handlers::cart::remove)),
            )
            .service(
                web::scope("/order")
                    .route("/checkout", web::post().to(handlers::orders::checkout))
                    .route("/{id}", web::get().to(handlers::orders::get)),
            )
            .service(
                web::scope("/payments")
                    .route("/charge", web::post().to(handlers::payments::create_charge))
                    .route(
                        "/card_token",
                        web::post().to(handlers::payments::create_card_token),
                    ),
            )
            .service(
                web::scope("/webhook")
                    .route("/payment", web::post().to(handlers::payments::webhook)),
            )
            .service(
                web::scope("/shipment")
                    .route("/sync", web::get().to(handlers::shipments::sync)),
            )
            .service(
                web::scope("/shipping")
                    .route("/quote", web::get().to(handlers::shipments::quote)),
            )
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", ApiDoc::openapi()),
            )
    })
    .bind((config.host.clone(), config.port))?
    .run())
}
