//! FlightSurety Oracle Server
//!
//! Registers a pool of simulated oracles with the FlightSuretyApp contract,
//! answers its `OracleRequest` events with random flight statuses and
//! serves the Dapp API.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::sync::mpsc;
use tokio::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use flightsurety_oracle::config::OracleConfig;
use flightsurety_oracle::ledger::{
    FlightSuretyApp, GasLimits, OracleRequestPoller, RpcClient, RpcFlightSuretyApp,
};
use flightsurety_oracle::routes;
use flightsurety_oracle::services::OracleService;

const EVENT_CHANNEL_CAPACITY: usize = 256;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = OracleConfig::load().context("failed to load configuration")?;
    info!(
        network = %config.network,
        rpc_url = %config.rpc_url,
        app_address = %config.app_address,
        oracles = config.oracle_count,
        "configuration loaded"
    );

    // Serve the API independently of the oracle tasks
    let addr = SocketAddr::from(([127, 0, 0, 1], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("Server starting on {}", addr);
    let server = tokio::spawn(async move { axum::serve(listener, routes::app()).await });

    let rpc = RpcClient::new(config.rpc_url.clone());
    let app: Arc<dyn FlightSuretyApp> = Arc::new(RpcFlightSuretyApp::new(
        rpc.clone(),
        config.app_address,
        GasLimits {
            register: config.register_gas,
            response: config.response_gas,
        },
    ));

    let service = OracleService::connect(app, config.oracle_count, config.failure_policy)
        .await
        .context("failed to acquire default account")?;
    let summary = service
        .register_oracles()
        .await
        .context("oracle registration failed")?;
    info!(
        account = %summary.account,
        fee = %summary.fee,
        registered = summary.registered,
        "oracles ready"
    );

    let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
    let poller = OracleRequestPoller::new(
        rpc,
        config.app_address,
        config.from_block,
        Duration::from_millis(config.poll_interval_ms),
    );
    tokio::spawn(poller.run(tx));
    tokio::spawn(async move {
        let stats = service.run(rx).await;
        warn!(?stats, "oracle responder exited");
    });

    server.await.context("HTTP server task failed")??;
    Ok(())
}
