/*
[INPUT]:  PrinterApi backend, user actions (bind/unbind/print), poll ticks
[OUTPUT]: PrinterSnapshot broadcast via `watch` + polling interval decisions
[POS]:    State layer - single owner of printer list, current printer, polling flag
[UPDATE]: When printer operations, polling intervals, or fencing rules change
*/

use std::collections::HashMap;
use std::sync::atomic::AtomicUsize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use meshcraft_adapter::validation::{normalize_bind_code, normalize_device_name};
use meshcraft_adapter::{
    MeshcraftError, PrintTaskCreated, PrinterApi, PrinterRecord, PrinterStatus,
};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::error::{ErrorNotice, StoreError};
use crate::loading::LoadingGuard;

pub const PRINTING_POLL_INTERVAL: Duration = Duration::from_millis(5_000);
pub const IDLE_POLL_INTERVAL: Duration = Duration::from_millis(10_000);

/// Poll interval for a printer in `status`, using the default policy
pub fn polling_interval(status: PrinterStatus) -> Duration {
    PollingPolicy::default().interval_for(status)
}

/// How often to refresh a printer depending on what it is doing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollingPolicy {
    pub printing: Duration,
    pub idle: Duration,
}

impl Default for PollingPolicy {
    fn default() -> Self {
        Self {
            printing: PRINTING_POLL_INTERVAL,
            idle: IDLE_POLL_INTERVAL,
        }
    }
}

impl PollingPolicy {
    pub fn interval_for(&self, status: PrinterStatus) -> Duration {
        match status {
            PrinterStatus::Printing => self.printing,
            PrinterStatus::Idle
            | PrinterStatus::Paused
            | PrinterStatus::Offline
            | PrinterStatus::Error => self.idle,
        }
    }
}

/// Everything a printer screen renders from
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PrinterSnapshot {
    pub printers: Vec<PrinterRecord>,
    pub current_printer: Option<PrinterRecord>,
    #[serde(skip)]
    pub loading: bool,
    #[serde(skip)]
    pub error: Option<ErrorNotice>,
    #[serde(skip)]
    pub polling_enabled: bool,
}

/// Latest issued request number per target; older responses are dropped
#[derive(Debug, Default)]
struct Fences {
    list: u64,
    details: HashMap<String, u64>,
}

impl Fences {
    fn issue_list(&mut self) -> u64 {
        self.list += 1;
        self.list
    }

    fn issue_detail(&mut self, device_id: &str) -> u64 {
        let seq = self.details.entry(device_id.to_string()).or_insert(0);
        *seq += 1;
        *seq
    }

    fn is_latest_detail(&self, device_id: &str, seq: u64) -> bool {
        self.details.get(device_id) == Some(&seq)
    }

    fn invalidate_detail(&mut self, device_id: &str) {
        self.issue_detail(device_id);
    }

    fn invalidate_all(&mut self) {
        self.list += 1;
        for seq in self.details.values_mut() {
            *seq += 1;
        }
    }
}

pub struct PrinterStore<B: ?Sized> {
    backend: Arc<B>,
    policy: PollingPolicy,
    state: watch::Sender<PrinterSnapshot>,
    fences: Mutex<Fences>,
    active_reads: AtomicUsize,
}

fn loading_flag(s: &mut PrinterSnapshot) -> &mut bool {
    &mut s.loading
}

impl<B: PrinterApi + ?Sized> PrinterStore<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self::with_policy(backend, PollingPolicy::default())
    }

    pub fn with_policy(backend: Arc<B>, policy: PollingPolicy) -> Self {
        let (state, _rx) = watch::channel(PrinterSnapshot::default());
        Self {
            backend,
            policy,
            state,
            fences: Mutex::new(Fences::default()),
            active_reads: AtomicUsize::new(0),
        }
    }

    /// Receive every snapshot change
    pub fn subscribe(&self) -> watch::Receiver<PrinterSnapshot> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> PrinterSnapshot {
        self.state.borrow().clone()
    }

    pub fn policy(&self) -> PollingPolicy {
        self.policy
    }

    fn fences(&self) -> MutexGuard<'_, Fences> {
        self.fences.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replace the printer list. On failure the previous list stays and `error` is set.
    pub async fn fetch_printers(&self) -> Result<Vec<PrinterRecord>, StoreError> {
        let seq = self.fences().issue_list();
        let _loading = LoadingGuard::begin(&self.state, &self.active_reads, loading_flag);

        let result = self.backend.list_printers().await;
        if self.fences().list != seq {
            debug!(seq, "discarding superseded printer list response");
            return result.map_err(StoreError::from);
        }

        match result {
            Ok(printers) => {
                info!(count = printers.len(), "printer list refreshed");
                self.state.send_modify(|s| {
                    s.printers = printers.clone();
                    s.error = None;
                });
                Ok(printers)
            }
            Err(err) => {
                warn!(error = %err, "failed to fetch printers; keeping previous list");
                self.record_failure(&err);
                Err(err.into())
            }
        }
    }

    /// Replace `current_printer` with a fresh copy of `device_id`.
    ///
    /// Returns `Ok(None)` when a later request for the same device was issued
    /// before this one finished; the stale response is not applied.
    pub async fn fetch_printer_detail(
        &self,
        device_id: &str,
    ) -> Result<Option<PrinterRecord>, StoreError> {
        let seq = self.fences().issue_detail(device_id);
        let _loading = LoadingGuard::begin(&self.state, &self.active_reads, loading_flag);

        let result = self.backend.printer_detail(device_id).await;
        if !self.fences().is_latest_detail(device_id, seq) {
            debug!(device_id, seq, "discarding stale printer detail response");
            return Ok(None);
        }

        match result {
            Ok(printer) => {
                debug!(device_id, status = %printer.status, "printer detail refreshed");
                self.state.send_modify(|s| {
                    s.current_printer = Some(printer.clone());
                    s.error = None;
                });
                Ok(Some(printer))
            }
            Err(err) => {
                warn!(device_id, error = %err, "failed to fetch printer detail");
                self.record_failure(&err);
                Err(err.into())
            }
        }
    }

    /// Validate, bind, then refresh the list
    pub async fn bind_printer(
        &self,
        device_name: &str,
        code: &str,
    ) -> Result<PrinterRecord, StoreError> {
        let device_name = normalize_device_name(device_name)?;
        let code = normalize_bind_code(code)?;

        let printer = self.backend.bind_printer(&device_name, &code).await?;
        info!(device_id = %printer.device_id, %device_name, "printer bound");

        if let Err(err) = self.fetch_printers().await {
            debug!(error = %err, "refresh after bind failed");
        }
        Ok(printer)
    }

    pub async fn unbind_printer(&self, device_id: &str) -> Result<(), StoreError> {
        self.backend.unbind_printer(device_id).await?;
        info!(device_id, "printer unbound");

        self.fences().invalidate_detail(device_id);
        self.state.send_modify(|s| {
            if s
                .current_printer
                .as_ref()
                .is_some_and(|p| p.device_id == device_id)
            {
                s.current_printer = None;
            }
        });

        if let Err(err) = self.fetch_printers().await {
            debug!(error = %err, "refresh after unbind failed");
        }
        Ok(())
    }

    pub async fn create_print_task(
        &self,
        device_id: &str,
        model_id: &str,
        task_name: &str,
    ) -> Result<PrintTaskCreated, StoreError> {
        let task_name = task_name.trim();
        if task_name.is_empty() {
            return Err(MeshcraftError::validation("task name", "must not be empty").into());
        }

        let created = self
            .backend
            .create_print_task(device_id, model_id, task_name)
            .await?;
        info!(device_id, model_id, task_id = %created.task_id, "print task created");

        if let Err(err) = self.fetch_printer_detail(device_id).await {
            debug!(error = %err, "refresh after print task failed");
        }
        Ok(created)
    }

    pub fn set_polling_enabled(&self, enabled: bool) {
        self.state.send_if_modified(|s| {
            let changed = s.polling_enabled != enabled;
            s.polling_enabled = enabled;
            changed
        });
    }

    pub fn is_polling_enabled(&self) -> bool {
        self.state.borrow().polling_enabled
    }

    /// Delay before the next poll, from the current printer's last known status
    pub fn next_poll_interval(&self) -> Duration {
        match &self.state.borrow().current_printer {
            Some(printer) => self.policy.interval_for(printer.status),
            None => self.policy.idle,
        }
    }

    /// Load persisted printers on startup
    pub fn restore(&self, snapshot: PrinterSnapshot) {
        self.state.send_modify(|s| {
            s.printers = snapshot.printers;
            s.current_printer = snapshot.current_printer;
        });
    }

    /// Drop everything (logout). In-flight responses are discarded.
    pub fn clear(&self) {
        self.fences().invalidate_all();
        self.state.send_replace(PrinterSnapshot::default());
    }

    fn record_failure(&self, err: &MeshcraftError) {
        let notice = ErrorNotice::from(err);
        self.state.send_modify(|s| s.error = Some(notice));
    }
}
