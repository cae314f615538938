use crypto_market_api::api::{BridgeState, CoinsState, ExchangesState, KlineState};
use crypto_market_api::database::repositories::{
    CoinsRepository, CoinsRepositoryImpl, KlineRepository, KlineRepositoryImpl,
    TradingPairsRepository, TradingPairsRepositoryImpl,
};
use crypto_market_api::exchanges::{BinanceClient, BybitClient, ExchangeClient, MexcClient};
use crypto_market_api::jobs::KlineSyncJob;
use crypto_market_api::{
    create_router, establish_connection_pools, CoinsValidator, Config, ExchangesDataCollector,
    KlineDataCollector,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Load environment variables from .env file (if present)
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "crypto_market_api=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    // Establish database connection pools
    let pools = match establish_connection_pools(
        &config.coins_database_url,
        &config.kline_database_url,
        config.pool_size,
    ) {
        Ok(pools) => pools,
        Err(e) => {
            tracing::error!("Failed to establish database connections: {}", e);
            std::process::exit(1);
        }
    };

    // Create repositories
    let pools_clone = pools.clone();
    let coins_repository = Arc::new(CoinsRepositoryImpl::new(move || {
        pools_clone.get_coins_conn()
    })) as Arc<dyn CoinsRepository>;

    let pools_clone = pools.clone();
    let trading_pairs_repository = Arc::new(TradingPairsRepositoryImpl::new(move || {
        pools_clone.get_coins_conn()
    })) as Arc<dyn TradingPairsRepository>;

    let pools_clone = pools.clone();
    let kline_repository = Arc::new(KlineRepositoryImpl::new(move || {
        pools_clone.get_kline_conn()
    })) as Arc<dyn KlineRepository>;

    // Exchange clients in fallback priority order
    let http = reqwest::Client::new();
    let exchanges_collector = Arc::new(ExchangesDataCollector::new(vec![
        Arc::new(BinanceClient::new(http.clone())) as Arc<dyn ExchangeClient>,
        Arc::new(BybitClient::new(http.clone())),
        Arc::new(MexcClient::new(http)),
    ]));

    let validator = Arc::new(CoinsValidator::new(coins_repository.clone()));

    let kline_collector = Arc::new(KlineDataCollector::new(
        coins_repository.clone(),
        trading_pairs_repository.clone(),
        kline_repository.clone(),
        exchanges_collector.clone(),
    ));

    // Periodic kline refresh
    if config.kline_sync_enabled {
        initialize_cron_scheduler(kline_collector.clone(), config.kline_sync_cron.clone()).await;
    } else {
        tracing::info!("Kline sync job disabled (KLINE_SYNC_ENABLED=false)");
    }

    let app = create_router(
        CoinsState {
            coins_repository,
            trading_pairs_repository,
            validator,
        },
        KlineState { kline_repository },
        ExchangesState {
            collector: exchanges_collector,
        },
        BridgeState {
            collector: kline_collector,
        },
    );

    let listener = match tokio::net::TcpListener::bind(&config.bind_address).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("Failed to bind {}: {}", config.bind_address, e);
            std::process::exit(1);
        }
    };

    tracing::info!(
        "Crypto Market API server running on http://{}",
        config.bind_address
    );
    tracing::info!("Health check: http://{}/health", config.bind_address);
    tracing::info!("Swagger UI: http://{}/swagger-ui", config.bind_address);

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Initialize cron scheduler for the periodic kline refresh
async fn initialize_cron_scheduler(collector: Arc<KlineDataCollector>, cron_expression: String) {
    use tokio_cron_scheduler::JobScheduler;

    tracing::info!("Initializing cron scheduler...");

    let scheduler = match JobScheduler::new().await {
        Ok(scheduler) => scheduler,
        Err(e) => {
            tracing::error!("Failed to create cron scheduler: {}", e);
            return;
        }
    };

    let job = KlineSyncJob::new(collector, cron_expression);
    if let Err(e) = job.register(&scheduler).await {
        tracing::error!("Failed to register kline sync job: {}", e);
        return;
    }

    if let Err(e) = scheduler.start().await {
        tracing::error!("Failed to start cron scheduler: {}", e);
        return;
    }

    tracing::info!("Cron scheduler started");

    // The scheduler runs in the background for the process lifetime
    std::mem::forget(scheduler);
}
