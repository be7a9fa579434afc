use redis::aio::MultiplexedConnection;
use tracing::debug;

use super::{Job, JobError};

pub const QUEUE_KEY: &str = "opsdesk:jobs";

/// Producer/consumer handle over a Redis list (`LPUSH` in, `BRPOP` out).
#[derive(Clone)]
pub struct JobQueue {
    client: redis::Client,
}

impl JobQueue {
    pub fn new(client: redis::Client) -> Self {
        Self { client }
    }

    async fn connection(&self) -> Result<MultiplexedConnection, JobError> {
        Ok(self.client.get_multiplexed_async_connection().await?)
    }

    pub async fn enqueue(&self, job: &Job) -> Result<(), JobError> {
        let payload = serde_json::to_string(job)?;
        let mut conn = self.connection().await?;
        redis::cmd("LPUSH")
            .arg(QUEUE_KEY)
            .arg(&payload)
            .query_async::<_, ()>(&mut conn)
            .await?;
        debug!("Enqueued {} job", job.kind());
        Ok(())
    }

    /// Blocks up to `timeout_secs` for the next raw payload.
    ///
    /// Returns the raw string so the worker can log and drop payloads that no
    /// longer decode.
    pub async fn pop_raw(
        &self,
        conn: &mut MultiplexedConnection,
        timeout_secs: u64,
    ) -> Result<Option<String>, JobError> {
        let popped: Option<(String, String)> = redis::cmd("BRPOP")
            .arg(QUEUE_KEY)
            .arg(timeout_secs)
            .query_async(conn)
            .await?;
        Ok(popped.map(|(_, payload)| payload))
    }

    /// Dedicated connection for a blocking consumer.
    pub async fn consumer_connection(&self) -> Result<MultiplexedConnection, JobError> {
        self.connection().await
    }
}
