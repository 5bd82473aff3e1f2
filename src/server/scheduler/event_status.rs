use chrono::Utc;
use sea_orm::DatabaseConnection;
use tokio_cron_scheduler::{Job, JobScheduler};

use crate::server::{data::event::EventRepository, error::AppError};

/// Starts the event status scheduler.
///
/// This scheduler runs every minute and sweeps published events whose end
/// date has passed into `completed` status, so feeds and ticket verification
/// stop treating finished events as active without any manual transition.
///
/// # Arguments
/// - `db`: Database connection
pub async fn start_scheduler(db: DatabaseConnection) -> Result<(), AppError> {
    let scheduler = JobScheduler::new().await?;

    let job_db = db.clone();

    // Schedule job to run every minute
    let job = Job::new_async("0 * * * * *", move |_uuid, _lock| {
        let db = job_db.clone();

        Box::pin(async move {
            if let Err(e) = complete_finished_events(&db).await {
                tracing::error!("Error completing finished events: {}", e);
            }
        })
    })?;

    scheduler.add(job).await?;
    scheduler.start().await?;

    tracing::info!("Event status scheduler started");

    Ok(())
}

/// Transitions published events whose end date has passed to completed.
async fn complete_finished_events(db: &DatabaseConnection) -> Result<(), AppError> {
    let repo = EventRepository::new(db);

    let completed = repo.mark_completed_before(Utc::now()).await?;

    if completed > 0 {
        tracing::info!("Marked {} finished events as completed", completed);
    }

    Ok(())
}
