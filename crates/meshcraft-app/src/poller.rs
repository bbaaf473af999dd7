/*
[INPUT]:  PrinterStore, device id, cancellation token
[OUTPUT]: Background refresh of one printer at the status-dependent interval
[POS]:    Runtime layer - owns the poll timer a printer screen would otherwise own
[UPDATE]: When changing poll scheduling or teardown semantics
*/

use std::sync::Arc;

use meshcraft_adapter::PrinterApi;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::printer_store::PrinterStore;

/// Handle to a running poll loop. Dropping it cancels the loop.
#[derive(Debug)]
pub struct PrinterPoller {
    device_id: String,
    shutdown: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl PrinterPoller {
    /// Enable polling on `store` and start refreshing `device_id`.
    ///
    /// The first fetch happens immediately; each following one waits for
    /// the interval derived from the freshly fetched status.
    pub fn spawn<B>(store: Arc<PrinterStore<B>>, device_id: impl Into<String>) -> Self
    where
        B: PrinterApi + ?Sized + 'static,
    {
        Self::spawn_with_token(store, device_id, CancellationToken::new())
    }

    /// Same as [`spawn`](Self::spawn) but stopped by a child of `parent`
    pub fn spawn_with_token<B>(
        store: Arc<PrinterStore<B>>,
        device_id: impl Into<String>,
        parent: CancellationToken,
    ) -> Self
    where
        B: PrinterApi + ?Sized + 'static,
    {
        let device_id = device_id.into();
        let shutdown = parent.child_token();
        store.set_polling_enabled(true);

        let handle = tokio::spawn(run_poll_loop(store, device_id.clone(), shutdown.clone()));
        info!(%device_id, "printer polling started");

        Self {
            device_id,
            shutdown,
            handle: Some(handle),
        }
    }

    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().is_none_or(|h| h.is_finished())
    }

    /// Cancel the timer and any outstanding request, then wait for the loop to exit
    pub async fn stop(mut self) {
        self.shutdown.cancel();
        if let Some(handle) = self.handle.take() {
            if let Err(err) = handle.await {
                warn!(device_id = %self.device_id, error = %err, "poll loop ended abnormally");
            }
        }
    }
}

impl Drop for PrinterPoller {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

async fn run_poll_loop<B>(
    store: Arc<PrinterStore<B>>,
    device_id: String,
    shutdown: CancellationToken,
) where
    B: PrinterApi + ?Sized,
{
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            result = store.fetch_printer_detail(&device_id) => {
                if let Err(err) = result {
                    // error already recorded in the snapshot; keep polling
                    debug!(%device_id, error = %err, "poll tick failed");
                }
            }
        }

        if !store.is_polling_enabled() {
            break;
        }

        let interval = store.next_poll_interval();
        debug!(%device_id, interval_ms = interval.as_millis() as u64, "next poll scheduled");
        tokio::select! {
            _ = shutdown.cancelled() => break,
            _ = tokio::time::sleep(interval) => {}
        }

        if !store.is_polling_enabled() {
            break;
        }
    }

    store.set_polling_enabled(false);
    info!(%device_id, "printer polling stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::printer_store::PollingPolicy;
    use crate::testing::{FakeBackend, printer};
    use meshcraft_adapter::PrinterStatus;
    use std::time::Duration;

    fn fast_store(fake: Arc<FakeBackend>) -> Arc<PrinterStore<FakeBackend>> {
        Arc::new(PrinterStore::with_policy(
            fake,
            PollingPolicy {
                printing: Duration::from_millis(10),
                idle: Duration::from_millis(60),
            },
        ))
    }

    #[tokio::test]
    async fn test_polls_faster_while_printing() {
        let fake = Arc::new(FakeBackend::with_printers(vec![printer(
            "d1",
            PrinterStatus::Printing,
        )]));
        let store = fast_store(fake.clone());

        let poller = PrinterPoller::spawn(store.clone(), "d1");
        tokio::time::sleep(Duration::from_millis(100)).await;
        poller.stop().await;

        // roughly every 10ms while printing
        assert!(fake.calls("detail:d1") >= 4, "calls: {}", fake.calls("detail:d1"));
        assert!(!store.is_polling_enabled());
    }

    #[tokio::test]
    async fn test_polls_slower_when_idle() {
        let fake = Arc::new(FakeBackend::with_printers(vec![printer(
            "d1",
            PrinterStatus::Idle,
        )]));
        let store = fast_store(fake.clone());

        let poller = PrinterPoller::spawn(store.clone(), "d1");
        tokio::time::sleep(Duration::from_millis(100)).await;
        poller.stop().await;

        // immediate fetch plus at most one after 60ms
        assert!(fake.calls("detail:d1") <= 2);
    }

    #[tokio::test]
    async fn test_stop_cancels_outstanding_request() {
        let fake = Arc::new(FakeBackend::default());
        fake.script_detail(
            Duration::from_millis(200),
            Some(printer("d1", PrinterStatus::Printing)),
        );
        let store = fast_store(fake.clone());

        let poller = PrinterPoller::spawn(store.clone(), "d1");
        tokio::time::sleep(Duration::from_millis(20)).await;
        poller.stop().await;

        // the slow response never landed
        assert!(store.snapshot().current_printer.is_none());
        assert!(!store.is_polling_enabled());
    }

    #[tokio::test]
    async fn test_stop_mid_request_clears_loading() {
        let fake = Arc::new(FakeBackend::default());
        fake.script_detail(
            Duration::from_millis(200),
            Some(printer("d1", PrinterStatus::Printing)),
        );
        let store = fast_store(fake.clone());

        let poller = PrinterPoller::spawn(store.clone(), "d1");
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(store.snapshot().loading);
        poller.stop().await;
        tokio::time::sleep(Duration::from_millis(300)).await;

        let snap = store.snapshot();
        assert!(!snap.loading);
        assert!(snap.current_printer.is_none());
        assert!(!store.is_polling_enabled());
    }

    #[tokio::test]
    async fn test_disabling_polling_ends_loop() {
        let fake = Arc::new(FakeBackend::with_printers(vec![printer(
            "d1",
            PrinterStatus::Printing,
        )]));
        let store = fast_store(fake.clone());

        let poller = PrinterPoller::spawn(store.clone(), "d1");
        tokio::time::sleep(Duration::from_millis(25)).await;
        store.set_polling_enabled(false);
        tokio::time::sleep(Duration::from_millis(40)).await;

        assert!(poller.is_finished());
        let calls = fake.calls("detail:d1");
        tokio::time::sleep(Duration::from_millis(40)).await;
        assert_eq!(fake.calls("detail:d1"), calls);
    }

    #[tokio::test]
    async fn test_parent_token_cancels_poller() {
        let fake = Arc::new(FakeBackend::with_printers(vec![printer(
            "d1",
            PrinterStatus::Printing,
        )]));
        let store = fast_store(fake);
        let parent = CancellationToken::new();

        let poller = PrinterPoller::spawn_with_token(store.clone(), "d1", parent.clone());
        parent.cancel();
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(poller.is_finished());
        assert_eq!(poller.device_id(), "d1");
    }
}
