use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};

type Job = Box<dyn FnOnce() + Send + 'static>;

/// Counter for a set of tasks whose size is only known as traversal
/// unfolds. `enter` hands out a guard that decrements on drop, so a task
/// that is rejected, panics, or never runs still releases its slot and
/// `wait` cannot hang.
#[derive(Clone, Default)]
pub struct WaitGroup {
    inner: Arc<WaitGroupInner>,
}

#[derive(Default)]
struct WaitGroupInner {
    count: Mutex<usize>,
    drained: Condvar,
}

/// Completion token for one task. Travels inside the task closure and
/// decrements the group when the closure is dropped, run or not.
pub struct WaitGroupGuard {
    group: WaitGroup,
}

impl WaitGroup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register one task. Call before handing the task to the pool so the
    /// group can never be observed empty while work is still queued.
    pub fn enter(&self) -> WaitGroupGuard {
        let mut count = self.inner.count.lock().unwrap();
        *count += 1;
        drop(count);
        WaitGroupGuard {
            group: self.clone(),
        }
    }

    /// Block until every registered task has finished.
    pub fn wait(&self) {
        let mut count = self.inner.count.lock().unwrap();
        while *count > 0 {
            count = self.inner.drained.wait(count).unwrap();
        }
    }

    fn leave(&self) {
        let mut count = self.inner.count.lock().unwrap();
        *count -= 1;
        if *count == 0 {
            self.inner.drained.notify_all();
        }
    }
}

impl Drop for WaitGroupGuard {
    fn drop(&mut self) {
        self.group.leave();
    }
}

/// Fixed set of worker threads fed from an unbounded queue.
///
/// At most `slots` jobs run at once; beyond that, submitted jobs wait in
/// the queue, so `submit` never blocks the caller. Jobs may themselves
/// submit follow-up jobs through a cloned [`PoolHandle`]. Dropping the
/// pool stops the workers and joins them; jobs still queued at that point
/// are dropped unrun.
pub struct WorkerPool {
    tx: Sender<Job>,
    shutdown: Arc<AtomicBool>,
    workers: Vec<JoinHandle<()>>,
}

/// Cheap cloneable submission handle, usable from inside running jobs.
#[derive(Clone)]
pub struct PoolHandle {
    tx: Sender<Job>,
}

impl WorkerPool {
    pub fn new(slots: usize) -> Self {
        let slots = slots.max(1);
        let (tx, rx) = unbounded::<Job>();
        let shutdown = Arc::new(AtomicBool::new(false));

        let workers = (0..slots)
            .map(|id| {
                let rx = rx.clone();
                let shutdown = Arc::clone(&shutdown);
                thread::Builder::new()
                    .name(format!("hogs-worker-{id}"))
                    .spawn(move || worker_loop(rx, shutdown))
                    .expect("failed to spawn worker thread")
            })
            .collect();

        Self {
            tx,
            shutdown,
            workers,
        }
    }

    pub fn handle(&self) -> PoolHandle {
        PoolHandle {
            tx: self.tx.clone(),
        }
    }

    pub fn slots(&self) -> usize {
        self.workers.len()
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::SeqCst);
        for handle in self.workers.drain(..) {
            let _ = handle.join();
        }
    }
}

impl PoolHandle {
    /// Queue a job without blocking. Returns false once the pool has shut
    /// down; the rejected closure is dropped on the spot, releasing
    /// whatever it owned (wait-group guards included).
    pub fn submit<F>(&self, job: F) -> bool
    where
        F: FnOnce() + Send + 'static,
    {
        self.tx.send(Box::new(job)).is_ok()
    }
}

fn worker_loop(rx: Receiver<Job>, shutdown: Arc<AtomicBool>) {
    loop {
        match rx.recv_timeout(Duration::from_millis(50)) {
            Ok(job) => job(),
            Err(RecvTimeoutError::Timeout) => {
                if shutdown.load(Ordering::SeqCst) {
                    break;
                }
            }
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }
}
