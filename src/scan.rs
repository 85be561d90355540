use std::io;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use crate::collector::Collect;
use crate::error::CollectError;
use crate::models::ResultSet;

/// Runs at most one scan at a time on a background thread.
///
/// The worker owns its result until it is sent back over the channel; the
/// owner picks it up with [`ScanWorker::poll`] from its own thread.
pub(crate) struct ScanWorker {
    collector: Arc<dyn Collect>,
    pending: Option<Receiver<ResultSet>>,
}

impl ScanWorker {
    pub(crate) fn new(collector: Arc<dyn Collect>) -> Self {
        Self {
            collector,
            pending: None,
        }
    }

    pub(crate) fn is_running(&self) -> bool {
        self.pending.is_some()
    }

    /// Starts a scan unless one is already in flight, returning whether a new
    /// scan began. `wake` runs on the worker thread once the result has been
    /// sent.
    pub(crate) fn start(&mut self, wake: impl FnOnce() + Send + 'static) -> io::Result<bool> {
        if self.is_running() {
            tracing::debug!("scan already in progress, ignoring request");
            return Ok(false);
        }

        let (tx, rx) = mpsc::channel();
        let collector = Arc::clone(&self.collector);
        let spawned = thread::Builder::new()
            .name("wifi-scan".to_string())
            .spawn(move || {
                let results = collector
                    .collect()
                    .unwrap_or_else(|err| ResultSet::from_error(&err));
                // receiver is gone only if the owner was dropped
                let _ = tx.send(results);
                wake();
            });

        match spawned {
            Ok(_) => {
                self.pending = Some(rx);
                Ok(true)
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to spawn scan thread");
                Err(err)
            }
        }
    }

    /// Non-blocking check for a finished scan.
    pub(crate) fn poll(&mut self) -> Option<ResultSet> {
        let rx = self.pending.as_ref()?;
        match rx.try_recv() {
            Ok(results) => {
                self.pending = None;
                Some(results)
            }
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                self.pending = None;
                tracing::error!("scan thread exited without a result");
                Some(ResultSet::from_error(&CollectError::WorkerDied))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use super::*;
    use crate::models::{Placeholder, ResultBuilder};

    /// Blocks inside `collect` until released, counting invocations.
    struct GatedCollector {
        calls: AtomicUsize,
        release: Mutex<Receiver<()>>,
    }

    impl Collect for GatedCollector {
        fn collect(&self) -> Result<ResultSet, CollectError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Ok(release) = self.release.lock() {
                let _ = release.recv();
            }
            let mut results = ResultBuilder::default();
            results.insert("HomeNet", Placeholder::NoPassword);
            Ok(results.finish())
        }
    }

    struct FailingCollector;

    impl Collect for FailingCollector {
        fn collect(&self) -> Result<ResultSet, CollectError> {
            Err(CollectError::UnsupportedPlatform("plan9".to_string()))
        }
    }

    struct PanickingCollector;

    impl Collect for PanickingCollector {
        fn collect(&self) -> Result<ResultSet, CollectError> {
            panic!("collector blew up");
        }
    }

    fn wait_for(worker: &mut ScanWorker, woke: &Receiver<()>) -> ResultSet {
        woke.recv_timeout(Duration::from_secs(5)).ok();
        for _ in 0..500 {
            if let Some(results) = worker.poll() {
                return results;
            }
            thread::sleep(Duration::from_millis(10));
        }
        panic!("scan did not finish");
    }

    #[test]
    fn second_start_while_running_is_ignored() {
        let (release_tx, release_rx) = mpsc::channel();
        let collector = Arc::new(GatedCollector {
            calls: AtomicUsize::new(0),
            release: Mutex::new(release_rx),
        });
        let mut worker = ScanWorker::new(collector.clone());
        let (woke_tx, woke_rx) = mpsc::channel();

        let tx = woke_tx.clone();
        assert!(worker.start(move || {
            let _ = tx.send(());
        }).unwrap());
        assert!(worker.is_running());
        assert!(!worker.start(|| {}).unwrap());
        assert!(worker.poll().is_none());

        release_tx.send(()).unwrap();
        let results = wait_for(&mut worker, &woke_rx);

        assert_eq!(results.len(), 1);
        assert_eq!(collector.calls.load(Ordering::SeqCst), 1);
        assert!(!worker.is_running());

        // gate reopens once the result has been picked up
        let tx = woke_tx.clone();
        assert!(worker.start(move || {
            let _ = tx.send(());
        }).unwrap());
        release_tx.send(()).unwrap();
        wait_for(&mut worker, &woke_rx);
        assert_eq!(collector.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn collect_error_becomes_error_record() {
        let mut worker = ScanWorker::new(Arc::new(FailingCollector));
        let (woke_tx, woke_rx) = mpsc::channel();
        assert!(worker.start(move || {
            let _ = woke_tx.send(());
        }).unwrap());

        let results = wait_for(&mut worker, &woke_rx);
        assert!(results.is_error());
        assert_eq!(results.records()[0].secret.to_string(), "Unsupported OS: plan9");
    }

    #[test]
    fn dead_worker_is_reported_and_gate_reopens() {
        let mut worker = ScanWorker::new(Arc::new(PanickingCollector));
        assert!(worker.start(|| {}).unwrap());

        let (_, never) = mpsc::channel();
        let results = wait_for(&mut worker, &never);
        assert!(results.is_error());
        assert!(!worker.is_running());
    }
}
