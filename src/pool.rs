//! Worker Pool
//!
//! A fixed set of long-lived worker threads draining one shared FIFO queue.
//!
//! ## Lifecycle
//! - `new` spawns every worker up front
//! - `submit` / `execute` enqueue work until shutdown begins
//! - `shutdown` stops intake, lets the workers drain the queue, then joins
//!   them; it runs again (harmlessly) on drop

use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam::channel::{self, Receiver};
use parking_lot::{Condvar, Mutex};

use crate::error::{KvError, Result};

type Task = Box<dyn FnOnce() + Send + 'static>;

/// Queue state shared by submitters and workers
struct Queue {
    tasks: VecDeque<Task>,
    stopping: bool,
}

struct Shared {
    queue: Mutex<Queue>,

    /// Signalled on every submit and once on shutdown
    available: Condvar,
}

/// Fixed-size thread pool with an unbounded FIFO task queue
pub struct ThreadPool {
    shared: Arc<Shared>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    size: usize,
}

impl ThreadPool {
    /// Spawn `worker_count` workers
    pub fn new(worker_count: usize) -> Result<Self> {
        if worker_count == 0 {
            return Err(KvError::InvalidWorkerCount);
        }

        let shared = Arc::new(Shared {
            queue: Mutex::new(Queue {
                tasks: VecDeque::new(),
                stopping: false,
            }),
            available: Condvar::new(),
        });

        let pool = Self {
            shared,
            workers: Mutex::new(Vec::with_capacity(worker_count)),
            size: worker_count,
        };

        for id in 0..worker_count {
            let shared = Arc::clone(&pool.shared);
            // On a spawn failure, dropping `pool` shuts down the workers
            // already started.
            let handle = thread::Builder::new()
                .name(format!("shardkv-worker-{}", id))
                .spawn(move || worker_loop(&shared))?;
            pool.workers.lock().push(handle);
        }

        tracing::debug!("Started thread pool with {} workers", worker_count);
        Ok(pool)
    }

    /// Enqueue a task. Fails once shutdown has begun.
    pub fn submit<F>(&self, task: F) -> Result<()>
    where
        F: FnOnce() + Send + 'static,
    {
        {
            let mut queue = self.shared.queue.lock();
            if queue.stopping {
                return Err(KvError::PoolShutdown);
            }
            queue.tasks.push_back(Box::new(task));
        }
        self.shared.available.notify_one();
        Ok(())
    }

    /// Enqueue a task that produces a value and get a handle to wait on it
    pub fn execute<F, T>(&self, task: F) -> Result<TaskHandle<T>>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let (tx, rx) = channel::bounded(1);
        self.submit(move || {
            // The handle may have been dropped; nobody is waiting then.
            let _ = tx.send(task());
        })?;
        Ok(TaskHandle { rx })
    }

    /// Stop accepting work, drain the queue and join every worker.
    ///
    /// Safe to call more than once and from several threads; only the first
    /// call has any effect. Only that first caller waits for the drain: a call
    /// that arrives while another thread is already shutting down returns at
    /// once, possibly before queued tasks have run.
    pub fn shutdown(&self) {
        {
            let mut queue = self.shared.queue.lock();
            if queue.stopping {
                return;
            }
            queue.stopping = true;
        }
        self.shared.available.notify_all();

        let workers = std::mem::take(&mut *self.workers.lock());
        let current = thread::current().id();
        for handle in workers {
            // A task shutting down its own pool cannot join itself
            if handle.thread().id() == current {
                continue;
            }
            if handle.join().is_err() {
                tracing::error!("Worker thread exited abnormally");
            }
        }
        tracing::debug!("Thread pool shut down");
    }

    /// Number of worker threads
    pub fn size(&self) -> usize {
        self.size
    }

    /// Whether shutdown has begun
    pub fn is_shutdown(&self) -> bool {
        self.shared.queue.lock().stopping
    }

    /// Tasks waiting for a worker
    pub fn queued(&self) -> usize {
        self.shared.queue.lock().tasks.len()
    }
}

impl Drop for ThreadPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Handle to the result of a task submitted with `ThreadPool::execute`
pub struct TaskHandle<T> {
    rx: Receiver<T>,
}

impl<T> TaskHandle<T> {
    /// Block until the task has run and return its result
    pub fn wait(self) -> Result<T> {
        self.rx.recv().map_err(|_| KvError::TaskPanicked)
    }
}

fn worker_loop(shared: &Shared) {
    loop {
        let task = {
            let mut queue = shared.queue.lock();
            loop {
                if let Some(task) = queue.tasks.pop_front() {
                    break task;
                }
                if queue.stopping {
                    return;
                }
                shared.available.wait(&mut queue);
            }
        };

        if panic::catch_unwind(AssertUnwindSafe(task)).is_err() {
            tracing::error!(
                "Task panicked on {}",
                thread::current().name().unwrap_or("worker")
            );
        }
    }
}
