use anyhow::Context;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fieldcrm::domain::automation::AutomationService;
use fieldcrm::domain::crm::PipelineSettings;
use fieldcrm::infrastructure::config::Config;
use fieldcrm::infrastructure::persistence::mongo::{
  MongoAmcRepository, MongoCallLogRepository, MongoInvoiceRepository, MongoLeadRepository,
  MongoTaskRepository,
};
use fieldcrm::infrastructure::scheduler::AutomationScheduler;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialize environment variables from .env file
  dotenvy::dotenv().ok();

  // Initialize tracing subscriber for logging
  tracing_subscriber::registry()
    .with(
      tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "fieldcrm=debug".into()),
    )
    .with(tracing_subscriber::fmt::layer())
    .init();

  tracing::info!("Starting fieldcrm automation worker");

  // Load configuration
  let config = Config::load().context("Failed to load configuration")?;
  tracing::info!("Configuration loaded successfully");

  // Connect to the document store with a timeout
  tracing::info!("Connecting to database: {}", config.database.url);

  let client = tokio::time::timeout(
    Duration::from_secs(config.database.connect_timeout_seconds),
    mongodb::Client::with_uri_str(&config.database.url),
  )
  .await
  .with_context(|| {
    format!(
      "Database connection timed out after {} seconds. Is MongoDB running?",
      config.database.connect_timeout_seconds
    )
  })?
  .context("Failed to connect to database")?;

  let db = client.database(&config.database.name);
  db.run_command(mongodb::bson::doc! { "ping": 1 }, None)
    .await
    .context("Database ping failed")?;
  tracing::info!("Database connection established");

  // Initialize repositories
  let lead_repo = Arc::new(MongoLeadRepository::new(&db));
  let call_log_repo = Arc::new(MongoCallLogRepository::new(&db));
  let invoice_repo = Arc::new(MongoInvoiceRepository::new(&db));
  let amc_repo = Arc::new(MongoAmcRepository::new(&db));
  let task_repo = Arc::new(MongoTaskRepository::new(&db));

  invoice_repo
    .init_indexes()
    .await
    .context("Failed to create invoice indexes")?;
  amc_repo
    .init_indexes()
    .await
    .context("Failed to create contract indexes")?;
  task_repo
    .init_indexes()
    .await
    .context("Failed to create task indexes")?;
  tracing::info!("Database indexes initialized");

  // Initialize the automation engine
  let automation = Arc::new(AutomationService::new(
    lead_repo,
    call_log_repo,
    invoice_repo,
    amc_repo,
    task_repo,
    PipelineSettings::default(),
  ));

  // Start the per-job interval loops
  let scheduler = Arc::new(AutomationScheduler::new(automation, config.scheduler.clone()));
  let handles = scheduler.spawn_all();
  tracing::info!(jobs = handles.len(), "Automation scheduler started");

  tokio::signal::ctrl_c()
    .await
    .context("Failed to listen for shutdown signal")?;
  tracing::info!("Shutdown signal received, stopping");

  for handle in handles {
    handle.abort();
  }

  Ok(())
}
