use std::net::{IpAddr, SocketAddr};

use anyhow::Result;
use dotenvy::dotenv;
use orgdeck::{config::config::Config, core::server::create_server, core::sweeps::spawn_sweeps};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();
    dotenv().ok();

    let config = Config::load_envs().expect("Failed to load envs");

    let port: u16 = config.port;
    let server_ip: IpAddr = config
        .server_ip
        .parse()
        .unwrap_or(IpAddr::from([0, 0, 0, 0]));
    let addr = SocketAddr::new(server_ip, port);

    let (server, db_conn) = create_server(config.clone()).await?;

    spawn_sweeps(db_conn, config);
    info!("Maintenance sweeps scheduled");

    let server = axum_server::bind(addr).serve(server.into_make_service());
    info!("Server starting on {}", addr);

    if let Err(e) = server.await {
        error!("Server failed: {}", e);
    }

    Ok(())
}
