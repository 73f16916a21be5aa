//! Worker pool for the concurrent harvest stage
//!
//! This module handles:
//! - Spawning one task per submitted job without ever blocking the submitter
//! - Optional global concurrency limiting via a semaphore
//! - A join barrier that waits for every task and reports panics instead of
//!   propagating them

use std::future::Future;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;

/// Identifier of a submitted task, in submission order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(pub usize);

/// Outcome of one task at the join barrier
#[derive(Debug)]
pub enum TaskResult<T> {
    /// The task ran to completion
    Completed(T),
    /// The task panicked or was cancelled
    Panicked {
        /// The task that failed
        id: TaskId,
        /// Panic or cancellation description
        error: String,
    },
}

impl<T> TaskResult<T> {
    /// Returns the output of a completed task
    pub fn completed(self) -> Option<T> {
        match self {
            TaskResult::Completed(value) => Some(value),
            TaskResult::Panicked { .. } => None,
        }
    }
}

/// A pool of spawned tasks with an explicit join barrier
///
/// Every submitted future is spawned on the tokio runtime right away. When
/// a concurrency limit is set, each task first waits for a semaphore permit
/// and holds it until it finishes, so at most `limit` tasks run their body
/// at the same time.
pub struct WorkerPool<T> {
    /// Global semaphore for limiting concurrent tasks (None = unbounded)
    permits: Option<Arc<Semaphore>>,

    /// Spawned tasks in submission order
    tasks: Vec<JoinHandle<T>>,
}

impl<T: Send + 'static> WorkerPool<T> {
    /// Creates a new pool
    ///
    /// # Arguments
    ///
    /// * `max_concurrent` - Maximum number of task bodies running at once,
    ///   or `None` for full parallelism. A limit of zero is treated as one.
    pub fn new(max_concurrent: Option<usize>) -> Self {
        Self {
            permits: max_concurrent.map(|limit| Arc::new(Semaphore::new(limit.max(1)))),
            tasks: Vec::new(),
        }
    }

    /// Spawns a task and returns its identifier
    pub fn submit<F>(&mut self, task: F) -> TaskId
    where
        F: Future<Output = T> + Send + 'static,
    {
        let permits = self.permits.clone();
        let handle = tokio::spawn(async move {
            // The semaphore is never closed, so acquisition only fails if
            // it was; in that case the task runs unthrottled.
            let _permit = match permits {
                Some(semaphore) => semaphore.acquire_owned().await.ok(),
                None => None,
            };
            task.await
        });

        let id = TaskId(self.tasks.len());
        self.tasks.push(handle);
        id
    }

    /// Returns the number of submitted tasks
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Returns whether no task has been submitted
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Waits for every submitted task to finish
    ///
    /// Results come back in submission order. A panicking task is logged
    /// and reported as [`TaskResult::Panicked`]; it never aborts the join.
    pub async fn join(self) -> Vec<TaskResult<T>> {
        let mut results = Vec::with_capacity(self.tasks.len());

        for (index, handle) in self.tasks.into_iter().enumerate() {
            match handle.await {
                Ok(value) => results.push(TaskResult::Completed(value)),
                Err(e) => {
                    tracing::error!("Task {} did not complete: {}", index, e);
                    results.push(TaskResult::Panicked {
                        id: TaskId(index),
                        error: e.to_string(),
                    });
                }
            }
        }

        results
    }
}
