//! Background worker that enriches and records accepted clicks.

use std::sync::Arc;
use tokio::sync::{Semaphore, mpsc};
use tracing::{debug, info, warn};

use crate::application::services::ClickRecorder;
use crate::domain::click_event::ClickJob;
use crate::enrichment::RequestEnricher;

/// Consumes [`ClickJob`]s until every sender is dropped.
///
/// Up to `concurrency` jobs are processed at once; each one is enriched
/// (client IP, geolocation, user agent, referrer) and stored through the
/// [`ClickRecorder`]. A failed job is logged and counted, then forgotten.
///
/// Once the channel closes the worker waits for the in-flight jobs before
/// returning, so awaiting its handle after the server stopped drains the queue.
pub async fn run_click_worker(
    mut rx: mpsc::Receiver<ClickJob>,
    enricher: Arc<RequestEnricher>,
    recorder: Arc<ClickRecorder>,
    concurrency: usize,
) {
    let concurrency = concurrency.max(1);
    let permits = Arc::new(Semaphore::new(concurrency));

    info!(concurrency, "Click worker started");

    while let Some(job) = rx.recv().await {
        let Ok(permit) = permits.clone().acquire_owned().await else {
            break;
        };

        let enricher = enricher.clone();
        let recorder = recorder.clone();

        tokio::spawn(async move {
            process_job(job, &enricher, &recorder).await;
            drop(permit);
        });
    }

    // Every permit back means every spawned job finished.
    if permits.acquire_many(concurrency as u32).await.is_err() {
        warn!("Click worker semaphore closed before drain");
    }

    info!("Click worker stopped");
}

/// Enriches and records a single job. Returns whether a click row was written.
pub async fn process_job(
    job: ClickJob,
    enricher: &RequestEnricher,
    recorder: &ClickRecorder,
) -> bool {
    let enriched = enricher.enrich(&job.context).await;

    match recorder
        .record(job.link_id, enriched, job.is_qr_code, job.accepted_at)
        .await
    {
        Ok(click) => {
            debug!(link_id = job.link_id, click_id = click.id, "Click recorded");
            metrics::counter!("clicks_recorded_total").increment(1);
            true
        }
        Err(e) => {
            warn!(link_id = job.link_id, error = %e, "Failed to record click");
            metrics::counter!("clicks_failed_total").increment(1);
            false
        }
    }
}
