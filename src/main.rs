use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use billbook::{
  domain::calendar::{Clock, SystemClock},
  domain::invoice::{InvoiceService, InvoiceServiceDependencies},
  domain::recurring::{RecurringService, RecurringServiceDependencies},
  infrastructure::{
    config::Config,
    persistence::postgres::{
      PostgresBusinessProfileRepository, PostgresClientRepository,
      PostgresInvoiceLineItemRepository, PostgresInvoiceRepository,
      PostgresRecurringScheduleRepository,
    },
    scheduler::DueSweepRunner,
  },
};

async fn shutdown_signal() {
  let ctrl_c = async {
    if let Err(e) = signal::ctrl_c().await {
      tracing::error!("Failed to listen for Ctrl+C: {}", e);
      std::future::pending::<()>().await;
    }
  };

  #[cfg(unix)]
  let terminate = async {
    match signal::unix::signal(signal::unix::SignalKind::terminate()) {
      Ok(mut sigterm) => {
        sigterm.recv().await;
      }
      Err(e) => {
        tracing::error!("Failed to install SIGTERM handler: {}", e);
        std::future::pending::<()>().await;
      }
    }
  };

  #[cfg(not(unix))]
  let terminate = std::future::pending::<()>();

  tokio::select! {
    _ = ctrl_c => {},
    _ = terminate => {},
  }

  tracing::info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialize environment variables from .env file
  dotenvy::dotenv().ok();

  tracing_subscriber::registry()
    .with(
      tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "billbook=debug,sqlx=warn".into()),
    )
    .with(tracing_subscriber::fmt::layer())
    .init();

  tracing::info!("Starting billbook");

  let config = Config::load().context("Failed to load configuration")?;
  tracing::info!("Configuration loaded successfully");

  let db_pool = tokio::time::timeout(
    Duration::from_secs(config.database.connect_timeout_seconds),
    PgPoolOptions::new()
      .max_connections(config.database.max_connections)
      .acquire_timeout(Duration::from_secs(config.database.acquire_timeout_seconds))
      .connect(&config.database.url),
  )
  .await
  .with_context(|| {
    format!(
      "Database connection timed out after {} seconds. Is PostgreSQL running?",
      config.database.connect_timeout_seconds
    )
  })?
  .context("Failed to connect to database")?;

  tracing::info!("Database connection pool created");

  sqlx::migrate!("./migrations")
    .run(&db_pool)
    .await
    .context("Failed to run database migrations")?;
  tracing::info!("Database migrations completed");

  let clock: Arc<dyn Clock> = Arc::new(SystemClock);

  let invoice_service = Arc::new(InvoiceService::new(InvoiceServiceDependencies {
    invoice_repo: Arc::new(PostgresInvoiceRepository::new(db_pool.clone())),
    line_item_repo: Arc::new(PostgresInvoiceLineItemRepository::new(db_pool.clone())),
    client_repo: Arc::new(PostgresClientRepository::new(db_pool.clone())),
    business_repo: Arc::new(PostgresBusinessProfileRepository::new(db_pool.clone())),
    clock: clock.clone(),
  }));

  let recurring_service = Arc::new(RecurringService::new(RecurringServiceDependencies {
    schedule_repo: Arc::new(PostgresRecurringScheduleRepository::new(db_pool.clone())),
    client_repo: Arc::new(PostgresClientRepository::new(db_pool.clone())),
    invoice_service,
    clock,
  }));

  if !config.scheduler.enabled {
    tracing::info!("Recurring invoice scheduler disabled by configuration");
    db_pool.close().await;
    return Ok(());
  }

  let run_at = config.scheduler.run_at_time()?;
  let shutdown = CancellationToken::new();
  let runner = tokio::spawn(
    DueSweepRunner::new(recurring_service, run_at)
      .run_on_startup(config.scheduler.run_on_startup)
      .run(shutdown.clone()),
  );

  shutdown_signal().await;
  shutdown.cancel();
  runner.await.context("Scheduler task panicked")?;

  db_pool.close().await;
  tracing::info!("billbook stopped");
  Ok(())
}
