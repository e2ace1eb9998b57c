use anyhow::Result;
use sea_orm::DatabaseConnection;
use std::sync::Arc;

use axum::Router;
use tower_http::cors::CorsLayer;

use crate::{
    config::config::Config,
    core::state::AppState,
    database::connect::{connect_database, run_migrations},
    routes::create_routers,
};

pub async fn create_server(config: Config) -> Result<(Router<()>, DatabaseConnection)> {
    let db_conn = connect_database(config.clone()).await?;
    run_migrations(&db_conn).await?;

    let state = AppState {
        database: db_conn.clone(),
        config,
    };

    let app = create_routers(Arc::new(state)).layer(CorsLayer::permissive());

    Ok((app, db_conn))
}
