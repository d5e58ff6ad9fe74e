use chrono::Utc;
use contracts::usecases::u501_import_productos::{PipelineState, RefreshRun, TriggerReason};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};
use uuid::Uuid;

use super::manager::TaskManager;

/// Что произошло с триггером
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerOutcome {
    /// Запуск начат сразу
    Started,
    /// Запуск отложен на окно debounce (таймер взведён заново)
    Debounced,
    /// Идёт запуск: триггер превращён в один отложенный повтор
    Coalesced,
}

#[derive(Default)]
struct Flags {
    running: bool,
    pending: Option<TriggerReason>,
    timer: Option<JoinHandle<()>>,
    timer_epoch: u64,
    completed_runs: u64,
    last_run: Option<RefreshRun>,
}

impl Flags {
    fn is_idle(&self) -> bool {
        !self.running && self.pending.is_none() && self.timer.is_none()
    }
}

struct Inner {
    manager: Arc<dyn TaskManager>,
    debounce: Option<Duration>,
    flags: Mutex<Flags>,
    idle: Notify,
}

/// Не более одного запуска одновременно; триггеры во время запуска
/// схлопываются в один повторный запуск после его завершения.
#[derive(Clone)]
pub struct TriggerCoalescer {
    inner: Arc<Inner>,
}

impl TriggerCoalescer {
    pub fn new(manager: Arc<dyn TaskManager>) -> Self {
        Self::build(manager, None)
    }

    /// Каждый триггер в состоянии Idle (пере)взводит таймер на `window`;
    /// запуск начинается, только когда окно истекло без новых триггеров.
    pub fn with_debounce(manager: Arc<dyn TaskManager>, window: Duration) -> Self {
        Self::build(manager, Some(window))
    }

    fn build(manager: Arc<dyn TaskManager>, debounce: Option<Duration>) -> Self {
        Self {
            inner: Arc::new(Inner {
                manager,
                debounce,
                flags: Mutex::new(Flags::default()),
                idle: Notify::new(),
            }),
        }
    }

    pub fn trigger(&self, reason: TriggerReason) -> TriggerOutcome {
        let mut flags = self.inner.lock();
        if flags.running {
            match flags.pending.replace(reason) {
                None => info!(
                    "Import in progress, rerun ({}) scheduled after it finishes",
                    reason
                ),
                Some(previous) => debug!(
                    "Rerun already pending ({}), trigger ({}) absorbed",
                    previous, reason
                ),
            }
            return TriggerOutcome::Coalesced;
        }
        self.inner.schedule(&mut flags, reason, false)
    }

    pub fn state(&self) -> PipelineState {
        let flags = self.inner.lock();
        match (flags.running, flags.pending.is_some()) {
            (false, _) => PipelineState::Idle,
            (true, false) => PipelineState::Running,
            (true, true) => PipelineState::RunningPendingRerun,
        }
    }

    pub fn is_debounce_armed(&self) -> bool {
        self.inner.lock().timer.is_some()
    }

    pub fn completed_runs(&self) -> u64 {
        self.inner.lock().completed_runs
    }

    pub fn last_run(&self) -> Option<RefreshRun> {
        self.inner.lock().last_run.clone()
    }

    /// Ждёт, пока не останется ни запуска, ни отложенного повтора, ни таймера
    pub async fn wait_idle(&self) {
        loop {
            let notified = self.inner.idle.notified();
            if self.inner.lock().is_idle() {
                return;
            }
            notified.await;
        }
    }

    /// Снимает взведённый таймер debounce. Идущий запуск не прерывается.
    pub fn shutdown(&self) {
        let mut flags = self.inner.lock();
        if let Some(timer) = flags.timer.take() {
            timer.abort();
        }
        flags.timer_epoch += 1;
        flags.pending = None;
        if flags.is_idle() {
            self.inner.idle.notify_waiters();
        }
    }
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, Flags> {
        self.flags.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn schedule(self: &Arc<Self>, flags: &mut Flags, reason: TriggerReason, rerun: bool) -> TriggerOutcome {
        let Some(window) = self.debounce else {
            flags.running = true;
            self.spawn_run(reason, rerun);
            return TriggerOutcome::Started;
        };

        if let Some(timer) = flags.timer.take() {
            timer.abort();
        }
        flags.timer_epoch += 1;
        let epoch = flags.timer_epoch;
        let inner = Arc::clone(self);
        flags.timer = Some(tokio::spawn(async move {
            tokio::time::sleep(window).await;
            inner.fire(epoch, reason, rerun);
        }));
        TriggerOutcome::Debounced
    }

    fn fire(self: &Arc<Self>, epoch: u64, reason: TriggerReason, rerun: bool) {
        let mut flags = self.lock();
        // таймер мог быть перевзведён, пока этот ждал блокировку
        if flags.timer_epoch != epoch || flags.timer.is_none() {
            return;
        }
        flags.timer = None;
        if flags.running {
            flags.pending = Some(reason);
            return;
        }
        flags.running = true;
        self.spawn_run(reason, rerun);
    }

    fn spawn_run(self: &Arc<Self>, reason: TriggerReason, rerun: bool) {
        let inner = Arc::clone(self);
        tokio::spawn(async move { inner.run_once(reason, rerun).await });
    }

    async fn run_once(self: Arc<Self>, reason: TriggerReason, rerun: bool) {
        let session_id = Uuid::new_v4().to_string();
        let started_at = Utc::now();
        info!(
            "Refresh ({}) started, task '{}', session {}",
            reason,
            self.manager.task_type(),
            session_id
        );

        // отдельная задача: паника менеджера не должна оставить флаг running
        let manager = Arc::clone(&self.manager);
        let task_session = session_id.clone();
        let result = tokio::spawn(async move { manager.run(&task_session, reason).await })
            .await
            .map_err(|e| format!("Import task aborted: {}", e))
            .and_then(|res| res.map_err(|e| e.to_string()));
        let finished_at = Utc::now();

        let report = match result {
            Ok(imported) => {
                info!("Refresh ({}) completed: {} products", reason, imported);
                RefreshRun {
                    session_id,
                    reason,
                    rerun,
                    started_at,
                    finished_at,
                    imported: Some(imported),
                    error: None,
                }
            }
            Err(e) => {
                error!("Refresh ({}) failed: {}", reason, e);
                RefreshRun {
                    session_id,
                    reason,
                    rerun,
                    started_at,
                    finished_at,
                    imported: None,
                    error: Some(e),
                }
            }
        };

        let mut flags = self.lock();
        flags.last_run = Some(report);
        flags.completed_runs += 1;
        flags.running = false;

        match flags.pending.take() {
            Some(next) => {
                info!("Running pending refresh ({})", next);
                self.schedule(&mut flags, next, true);
            }
            None => {
                if flags.is_idle() {
                    self.idle.notify_waiters();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usecases::u501_import_productos::ImportError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use tokio::sync::Semaphore;

    /// Менеджер, каждый запуск которого ждёт разрешения от теста
    struct GatedManager {
        runs: AtomicUsize,
        reasons: Mutex<Vec<TriggerReason>>,
        gate: Semaphore,
        fail: AtomicBool,
    }

    impl GatedManager {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                runs: AtomicUsize::new(0),
                reasons: Mutex::new(Vec::new()),
                gate: Semaphore::new(0),
                fail: AtomicBool::new(false),
            })
        }

        fn runs(&self) -> usize {
            self.runs.load(Ordering::SeqCst)
        }

        fn reasons(&self) -> Vec<TriggerReason> {
            self.reasons.lock().unwrap().clone()
        }

        fn release(&self, n: usize) {
            self.gate.add_permits(n);
        }
    }

    #[async_trait]
    impl TaskManager for GatedManager {
        fn task_type(&self) -> &'static str {
            "test_gated"
        }

        async fn run(&self, _session_id: &str, reason: TriggerReason) -> Result<usize, ImportError> {
            self.runs.fetch_add(1, Ordering::SeqCst);
            self.reasons.lock().unwrap().push(reason);
            self.gate.acquire().await.unwrap().forget();
            if self.fail.load(Ordering::SeqCst) {
                return Err(ImportError::SourceNotFound {
                    path: "missing.xlsx".into(),
                });
            }
            Ok(3)
        }
    }

    async fn wait_for_runs(manager: &GatedManager, n: usize) {
        while manager.runs() < n {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn test_idle_trigger_starts_run() {
        let manager = GatedManager::new();
        let coalescer = TriggerCoalescer::new(manager.clone());

        assert_eq!(coalescer.state(), PipelineState::Idle);
        assert_eq!(coalescer.trigger(TriggerReason::Startup), TriggerOutcome::Started);
        assert_eq!(coalescer.state(), PipelineState::Running);

        manager.release(1);
        coalescer.wait_idle().await;

        assert_eq!(manager.runs(), 1);
        assert_eq!(coalescer.state(), PipelineState::Idle);
        let last = coalescer.last_run().unwrap();
        assert_eq!(last.imported, Some(3));
        assert!(!last.rerun);
    }

    #[tokio::test]
    async fn test_triggers_during_run_collapse_into_one_rerun() {
        let manager = GatedManager::new();
        let coalescer = TriggerCoalescer::new(manager.clone());

        coalescer.trigger(TriggerReason::Startup);
        wait_for_runs(&manager, 1).await;

        for _ in 0..5 {
            assert_eq!(coalescer.trigger(TriggerReason::Cron), TriggerOutcome::Coalesced);
        }
        assert_eq!(coalescer.trigger(TriggerReason::FileChanged), TriggerOutcome::Coalesced);
        assert_eq!(coalescer.state(), PipelineState::RunningPendingRerun);

        manager.release(1);
        wait_for_runs(&manager, 2).await;
        assert_eq!(coalescer.state(), PipelineState::Running);

        manager.release(1);
        coalescer.wait_idle().await;

        assert_eq!(manager.runs(), 2);
        assert_eq!(coalescer.completed_runs(), 2);
        // сохраняется причина последнего триггера
        assert_eq!(
            manager.reasons(),
            vec![TriggerReason::Startup, TriggerReason::FileChanged]
        );
        assert!(coalescer.last_run().unwrap().rerun);
    }

    #[tokio::test]
    async fn test_trigger_during_rerun_is_not_lost() {
        let manager = GatedManager::new();
        let coalescer = TriggerCoalescer::new(manager.clone());

        coalescer.trigger(TriggerReason::Startup);
        wait_for_runs(&manager, 1).await;
        coalescer.trigger(TriggerReason::Cron);
        manager.release(1);
        wait_for_runs(&manager, 2).await;

        // пришёл во время повтора: нужен ещё один запуск
        assert_eq!(coalescer.trigger(TriggerReason::FileChanged), TriggerOutcome::Coalesced);
        manager.release(2);
        coalescer.wait_idle().await;

        assert_eq!(manager.runs(), 3);
    }

    #[tokio::test]
    async fn test_failed_run_does_not_stop_coalescer() {
        let manager = GatedManager::new();
        manager.fail.store(true, Ordering::SeqCst);
        let coalescer = TriggerCoalescer::new(manager.clone());

        manager.release(2);
        coalescer.trigger(TriggerReason::Cron);
        coalescer.wait_idle().await;

        let failed = coalescer.last_run().unwrap();
        assert!(!failed.is_success());
        assert!(failed.error.unwrap().contains("missing.xlsx"));

        manager.fail.store(false, Ordering::SeqCst);
        assert_eq!(coalescer.trigger(TriggerReason::Cron), TriggerOutcome::Started);
        coalescer.wait_idle().await;

        assert_eq!(coalescer.completed_runs(), 2);
        assert!(coalescer.last_run().unwrap().is_success());
    }

    #[tokio::test(start_paused = true)]
    async fn test_debounce_window_collapses_burst() {
        let manager = GatedManager::new();
        manager.release(10);
        let coalescer = TriggerCoalescer::with_debounce(manager.clone(), Duration::from_millis(2000));

        assert_eq!(coalescer.trigger(TriggerReason::Startup), TriggerOutcome::Debounced);
        tokio::time::advance(Duration::from_millis(1500)).await;
        assert_eq!(coalescer.trigger(TriggerReason::FileChanged), TriggerOutcome::Debounced);
        tokio::time::advance(Duration::from_millis(1500)).await;

        assert_eq!(manager.runs(), 0);
        assert!(coalescer.is_debounce_armed());
        assert_eq!(coalescer.state(), PipelineState::Idle);

        coalescer.wait_idle().await;

        assert_eq!(manager.runs(), 1);
        assert_eq!(manager.reasons(), vec![TriggerReason::FileChanged]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_cancels_armed_timer() {
        let manager = GatedManager::new();
        let coalescer = TriggerCoalescer::with_debounce(manager.clone(), Duration::from_millis(2000));

        coalescer.trigger(TriggerReason::FileAdded);
        coalescer.shutdown();
        coalescer.wait_idle().await;
        tokio::time::advance(Duration::from_millis(5000)).await;

        assert_eq!(manager.runs(), 0);
        assert!(!coalescer.is_debounce_armed());
    }

    /// Первый запуск паникует, последующие проходят
    struct PanicOnceManager {
        runs: AtomicUsize,
    }

    #[async_trait]
    impl TaskManager for PanicOnceManager {
        fn task_type(&self) -> &'static str {
            "test_panic_once"
        }

        async fn run(&self, _session_id: &str, _reason: TriggerReason) -> Result<usize, ImportError> {
            if self.runs.fetch_add(1, Ordering::SeqCst) == 0 {
                panic!("workbook exploded");
            }
            Ok(1)
        }
    }

    #[tokio::test]
    async fn test_panicking_run_returns_coalescer_to_idle() {
        let manager = Arc::new(PanicOnceManager {
            runs: AtomicUsize::new(0),
        });
        let coalescer = TriggerCoalescer::new(manager.clone());

        coalescer.trigger(TriggerReason::Startup);
        coalescer.wait_idle().await;

        assert_eq!(coalescer.state(), PipelineState::Idle);
        let failed = coalescer.last_run().unwrap();
        assert!(!failed.is_success());

        assert_eq!(coalescer.trigger(TriggerReason::Cron), TriggerOutcome::Started);
        coalescer.wait_idle().await;

        assert_eq!(manager.runs.load(Ordering::SeqCst), 2);
        assert_eq!(coalescer.last_run().unwrap().imported, Some(1));
    }
}
