use async_trait::async_trait;
use futures_util::Stream;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

const PROBE_TIMEOUT: Duration = Duration::from_secs(2);
/// Shortest period a scheduled task runs at.
pub const MIN_PERIOD: Duration = Duration::from_secs(1);

/// A periodic background task. Dropping the handle aborts it.
pub struct ScheduledTask {
    handle: JoinHandle<()>,
}

impl ScheduledTask {
    /// Runs `tick` right away and then once per `period`, never more often
    /// than [`MIN_PERIOD`]. Ticks never overlap.
    pub fn every<F, Fut>(period: Duration, mut tick: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        if period < MIN_PERIOD {
            tracing::warn!(?period, "schedule period too short, using {MIN_PERIOD:?}");
        }
        let period = period.max(MIN_PERIOD);
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                tick().await;
            }
        });
        Self { handle }
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for ScheduledTask {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[async_trait]
pub trait OnlineProbe: Send + Sync {
    async fn is_online(&self) -> bool;
}

/// Treats the upstream as reachable when a HEAD request gets any answer.
pub struct HttpOnlineProbe {
    http: reqwest::Client,
    url: Option<String>,
}

impl HttpOnlineProbe {
    pub fn new(url: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            url,
        }
    }
}

#[async_trait]
impl OnlineProbe for HttpOnlineProbe {
    async fn is_online(&self) -> bool {
        // Without an upstream there is nothing to probe; let the fetch report it.
        let Some(url) = self.url.as_deref() else {
            return true;
        };
        match self.http.head(url).timeout(PROBE_TIMEOUT).send().await {
            Ok(_) => true,
            Err(err) => {
                tracing::warn!(error = %err, "upstream unreachable, skipping refresh");
                false
            }
        }
    }
}

/// Receiving end of a refresher. The refresh task lives as long as this does.
pub struct Subscription<T> {
    rx: mpsc::Receiver<T>,
    _task: ScheduledTask,
}

impl<T: Send + 'static> Subscription<T> {
    pub async fn next(&mut self) -> Option<T> {
        self.rx.recv().await
    }

    pub fn into_stream(self) -> impl Stream<Item = T> + Send {
        futures_util::stream::unfold(self, |mut subscription| async move {
            let item = subscription.next().await?;
            Some((item, subscription))
        })
    }
}

/// Produces a fresh value every `period` while `probe` reports the upstream
/// online. Offline ticks are skipped, not queued.
pub fn spawn_refresher<T, F, Fut>(
    period: Duration,
    probe: Arc<dyn OnlineProbe>,
    produce: F,
) -> Subscription<T>
where
    T: Send + 'static,
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = T> + Send + 'static,
{
    let (tx, rx) = mpsc::channel(1);
    let produce = Arc::new(produce);
    let task = ScheduledTask::every(period, move || {
        let tx = tx.clone();
        let probe = probe.clone();
        let produce = produce.clone();
        async move {
            if !probe.is_online().await {
                return;
            }
            let value = (*produce)().await;
            if tx.send(value).await.is_err() {
                tracing::debug!("refresh subscriber gone");
            }
        }
    });
    Subscription { rx, _task: task }
}
