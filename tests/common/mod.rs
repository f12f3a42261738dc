#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use rust_decimal::Decimal;
use sea_orm::DatabaseConnection;
use storefront_api::{
    config::AppConfig,
    db::{self, DbConfig},
    events::{self, EventSender},
    handlers::AppServices,
    services::catalog::{CreateOptionInput, CreateOptionValueInput, CreateProductInput},
    AppState,
};
use tokio::sync::mpsc;
use uuid::Uuid;

/// Helper harness spinning up application state backed by an in-memory
/// SQLite database. One connection per pool keeps every test on its own
/// isolated database.
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    _event_task: tokio::task::JoinHandle<()>,
}

impl TestApp {
    /// Construct a new test application with fresh database state.
    pub async fn new() -> Self {
        let db_config = DbConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
            min_connections: 1,
            ..Default::default()
        };

        let pool = db::establish_connection_with_config(&db_config)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");
        let db_arc = Arc::new(pool);

        let (event_tx, event_rx) = mpsc::channel(64);
        let event_sender = EventSender::new(event_tx);
        let event_task = tokio::spawn(events::process_events(event_rx));

        let services = AppServices::new(db_arc.clone(), Arc::new(event_sender.clone()));
        let cfg = AppConfig::new(
            "sqlite::memory:".to_string(),
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
        );

        let state = AppState {
            db: db_arc,
            config: cfg,
            event_sender,
            services,
        };
        let router = storefront_api::app(state.clone());

        Self {
            router,
            state,
            _event_task: event_task,
        }
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.state.db
    }
}

/// Create a product with the given base price and optional explicit stock.
pub async fn create_product(app: &TestApp, price: Decimal, stock: Option<i32>) -> Uuid {
    app.state
        .services
        .products
        .create_product(CreateProductInput {
            name: "Camiseta básica".to_string(),
            price,
            stock,
            is_active: true,
        })
        .await
        .expect("failed to create test product")
        .id
}

/// Create an option on a product.
pub async fn create_option(app: &TestApp, product_id: Uuid, name: &str, position: i32) -> Uuid {
    app.state
        .services
        .options
        .create_option(CreateOptionInput {
            product_id,
            name: name.to_string(),
            position,
        })
        .await
        .expect("failed to create test option")
        .id
}

/// Create a visible value under an option.
pub async fn create_value(app: &TestApp, option_id: Uuid, value: &str, position: i32) -> Uuid {
    app.state
        .services
        .options
        .create_option_value(CreateOptionValueInput {
            option_id,
            value: value.to_string(),
            swatch_hex: None,
            position,
            visible: true,
        })
        .await
        .expect("failed to create test value")
        .id
}
