mod jobs;

use tokio_cron_scheduler::{Job, JobScheduler};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tutorhub_jobs=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting TutorHub background jobs...");

    // Initialize database pool
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = tutorhub_db::create_pool(&database_url).await?;

    tracing::info!("✓ Database connection established");

    // Initialize job scheduler
    let scheduler = JobScheduler::new().await?;

    // Completion sweep (every 1 minute): past SCHEDULED bookings become
    // COMPLETED so finished lessons unlock follow-up bookings.
    let pool_clone = pool.clone();
    let completion_job = Job::new_async("0 * * * * *", move |_uuid, _l| {
        let pool = pool_clone.clone();
        Box::pin(async move {
            tracing::debug!("Running complete_finished_bookings job");
            if let Err(e) = jobs::complete_finished_bookings(&pool).await {
                tracing::error!("complete_finished_bookings job failed: {}", e);
            }
        })
    })?;

    scheduler.add(completion_job).await?;

    tracing::info!("✓ Registered job: complete_finished_bookings (every 1 minute)");

    // Start scheduler
    scheduler.start().await?;

    tracing::info!("✓ Job scheduler started");

    // Keep the process running
    loop {
        tokio::time::sleep(std::time::Duration::from_secs(3600)).await;
    }
}
