use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use sqlx::PgPool;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

use super::social::SocialPublisher;
use super::sweeps::{flag_overdue_invoices, follow_up_new_leads, publish_due_posts};
use super::JobQueue;
use crate::config::JobSettings;

/// Spawns one interval loop per periodic sweep.
pub fn spawn_scheduler(
    pool: PgPool,
    queue: JobQueue,
    publisher: Arc<dyn SocialPublisher>,
    settings: &JobSettings,
) -> Vec<JoinHandle<()>> {
    let mut handles = Vec::with_capacity(3);

    {
        let (pool, queue) = (pool.clone(), queue.clone());
        handles.push(every(settings.lead_follow_up_interval, "lead follow-up", move || {
            let (pool, queue) = (pool.clone(), queue.clone());
            async move { follow_up_new_leads(&pool, &queue).await.map(|_| ()) }
        }));
    }

    {
        let (pool, queue) = (pool.clone(), queue.clone());
        handles.push(every(
            settings.invoice_reminder_interval,
            "invoice reminders",
            move || {
                let (pool, queue) = (pool.clone(), queue.clone());
                async move { flag_overdue_invoices(&pool, &queue).await.map(|_| ()) }
            },
        ));
    }

    handles.push(every(settings.content_post_interval, "content posting", move || {
        let (pool, publisher) = (pool.clone(), publisher.clone());
        async move { publish_due_posts(&pool, publisher.as_ref()).await.map(|_| ()) }
    }));

    handles
}

/// Runs `task` every `period`, starting one period from now. Errors are logged
/// and the loop keeps going.
fn every<F, Fut, E>(period: Duration, name: &'static str, task: F) -> JoinHandle<()>
where
    F: Fn() -> Fut + Send + 'static,
    Fut: Future<Output = Result<(), E>> + Send + 'static,
    E: std::fmt::Display + Send + 'static,
{
    tokio::spawn(async move {
        info!("Scheduled '{name}' every {}s", period.as_secs());
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        ticker.tick().await; // first tick fires immediately

        loop {
            ticker.tick().await;
            if let Err(e) = task().await {
                warn!("Scheduled '{name}' failed: {e}");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test(start_paused = true)]
    async fn test_every_waits_one_period_then_repeats() {
        let runs = Arc::new(AtomicUsize::new(0));
        let counter = runs.clone();
        let handle = every(Duration::from_secs(60), "test", move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok::<(), String>(())
            }
        });

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_secs(31)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 1);

        tokio::time::sleep(Duration::from_secs(120)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 3);

        handle.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn test_every_survives_errors() {
        let runs = Arc::new(AtomicUsize::new(0));
        let counter = runs.clone();
        let handle = every(Duration::from_secs(10), "failing", move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err::<(), String>("boom".to_string())
            }
        });

        tokio::time::sleep(Duration::from_secs(35)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 3);
        handle.abort();
    }
}
