//! # Task Management System
//!
//! A small worker pool for running CPU-bound work such as block meshing off the
//! thread that owns the voxel data.
//!
//! ## Architecture Overview
//! - `TaskManager`: creates the workers, distributes tasks and collects results
//! - `Task`: a unit of work executed on a worker thread
//! - `TaskResult`: the outcome of a task, which can spawn follow-up tasks
//! - `TaskChannel`: the pair of channels connecting the manager to one worker
//!
//! ## Task Lifecycle
//! 1. Tasks are published via `TaskManager::publish_task()`
//! 2. The manager hands them to free workers using round-robin, queueing the rest
//! 3. Workers process tasks and send back results
//! 4. Results are handled on the owning thread in `process_completed_tasks()`
//! 5. Follow-up tasks returned by results are published again
//!
//! ## Example Usage
//! ```rust
//! use voxel_mesher::task_management::{task::{Task, TaskResult}, TaskManager};
//!
//! struct Noop;
//! struct Done;
//!
//! impl Task for Noop {
//!     fn process(&self) -> Box<dyn TaskResult + Send> {
//!         Box::new(Done)
//!     }
//! }
//!
//! impl TaskResult for Done {
//!     fn handle_result(self: Box<Self>) -> Vec<Box<dyn Task + Send>> {
//!         Vec::new()
//!     }
//! }
//!
//! let mut task_manager = TaskManager::new(2);
//! task_manager.publish_task(Box::new(Noop));
//! task_manager.run_until_idle();
//! assert!(!task_manager.has_pending_tasks());
//! ```

pub mod task;

use std::collections::VecDeque;
use std::sync::mpsc::{channel, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::{debug, error, info, warn};
use task::{Task, TaskResult};

/// A communication channel between the manager and one worker thread.
///
/// # Fields
/// - `task_sender`: Sends tasks from the manager to the worker
/// - `result_receiver`: Receives task results from the worker
/// - `num_tasks_in_flight`: Tracks number of tasks currently being processed
/// - `_worker`: Handle to the worker thread (kept alive by this struct)
#[derive(Debug)]
pub struct TaskChannel {
    task_sender: Sender<Box<dyn Task + Send>>,
    result_receiver: Receiver<Box<dyn TaskResult + Send>>,
    num_tasks_in_flight: usize,
    disconnected: bool,
    _worker: JoinHandle<()>,
}

/// Manages a pool of worker threads and coordinates task execution.
///
/// The manager itself is not shared between threads: one owner publishes tasks and
/// drives `process_queued_tasks()` / `process_completed_tasks()`. Dropping it closes
/// every task channel, which ends the worker loops.
pub struct TaskManager {
    channels: Vec<TaskChannel>,
    queued_tasks: VecDeque<Box<dyn Task + Send>>,
    current_channel: usize,
}

/// Maximum number of tasks that can be in flight per worker channel.
///
/// Kept at 1 so a busy worker never holds tasks another idle worker could run.
pub const MAX_TASKS_IN_FLIGHT: usize = 1;

/// How long `run_until_idle()` blocks on a worker before checking the others.
const RESULT_POLL_INTERVAL: Duration = Duration::from_millis(1);

impl TaskManager {
    /// Creates a new `TaskManager` with the specified number of worker threads.
    ///
    /// # Arguments
    /// * `num_workers` - Number of worker threads to create. Zero is treated as one.
    ///
    /// # Panics
    /// Panics if the underlying thread creation fails.
    pub fn new(num_workers: usize) -> Self {
        let num_workers = num_workers.max(1);
        let mut channels = Vec::with_capacity(num_workers);

        info!(
            "Starting {} meshing workers (available parallelism: {:?})",
            num_workers,
            thread::available_parallelism()
        );

        for _ in 0..num_workers {
            let (task_tx, task_rx) = channel::<Box<dyn Task + Send>>();
            let (result_tx, result_rx) = channel::<Box<dyn TaskResult + Send>>();

            let worker = thread::spawn(move || {
                while let Ok(task) = task_rx.recv() {
                    let result = task.process();
                    if result_tx.send(result).is_err() {
                        break;
                    }
                }
            });

            channels.push(TaskChannel {
                task_sender: task_tx,
                result_receiver: result_rx,
                num_tasks_in_flight: 0,
                disconnected: false,
                _worker: worker,
            });
        }

        TaskManager {
            channels,
            queued_tasks: VecDeque::new(),
            current_channel: 0,
        }
    }

    /// Number of worker threads.
    pub fn worker_count(&self) -> usize {
        self.channels.len()
    }

    /// Attempts to send a task to a specific worker channel.
    ///
    /// # Returns
    /// - `Ok(())` if the task was successfully sent to the worker
    /// - `Err(task)` if the worker is gone; the channel is marked disconnected
    fn try_send_task(
        &mut self,
        task: Box<dyn Task + Send>,
        channel_idx: usize,
    ) -> Result<(), Box<dyn Task + Send>> {
        let channel = &mut self.channels[channel_idx];
        match channel.task_sender.send(task) {
            Ok(_) => {
                channel.num_tasks_in_flight += 1;
                Ok(())
            }
            Err(task) => {
                warn!("Worker {} disconnected", channel_idx);
                channel.disconnected = true;
                Err(task.0)
            }
        }
    }

    /// Finds a live worker channel that can accept a new task, round-robin from the
    /// last used channel.
    fn find_available_channel(&self) -> Option<usize> {
        let len = self.channels.len();
        (0..len)
            .map(|offset| (self.current_channel + offset) % len)
            .find(|&idx| {
                let channel = &self.channels[idx];
                !channel.disconnected && channel.num_tasks_in_flight < MAX_TASKS_IN_FLIGHT
            })
    }

    /// Publishes a new task for execution.
    ///
    /// # Returns
    /// - `true` if the task was immediately scheduled on an available worker
    /// - `false` if the task was queued because all workers are busy
    pub fn publish_task(&mut self, task: Box<dyn Task + Send>) -> bool {
        let mut task = task;
        while let Some(channel_idx) = self.find_available_channel() {
            match self.try_send_task(task, channel_idx) {
                Ok(_) => {
                    self.current_channel = (channel_idx + 1) % self.channels.len();
                    return true;
                }
                Err(returned) => task = returned,
            }
        }

        self.queued_tasks.push_back(task);
        false
    }

    /// Hands queued tasks to free workers, oldest first, until the queue is empty or
    /// every worker is busy.
    pub fn process_queued_tasks(&mut self) {
        while let Some(channel_idx) = self.find_available_channel() {
            let Some(task) = self.queued_tasks.pop_front() else {
                return;
            };

            match self.try_send_task(task, channel_idx) {
                Ok(_) => self.current_channel = (channel_idx + 1) % self.channels.len(),
                Err(task) => self.queued_tasks.push_front(task),
            }
        }
    }

    /// Handles every result the workers have sent so far and publishes the follow-up
    /// tasks they return.
    ///
    /// # Returns
    /// The number of results handled.
    pub fn process_completed_tasks(&mut self) -> usize {
        let mut results = Vec::new();
        for (idx, channel) in self.channels.iter_mut().enumerate() {
            loop {
                match channel.result_receiver.try_recv() {
                    Ok(result) => {
                        channel.num_tasks_in_flight -= 1;
                        results.push(result);
                    }
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => {
                        Self::mark_disconnected(idx, channel);
                        break;
                    }
                }
            }
        }

        let handled = results.len();
        let mut tasks_to_queue = Vec::new();
        for result in results {
            tasks_to_queue.extend(result.handle_result());
        }
        for task in tasks_to_queue {
            self.publish_task(task);
        }

        handled
    }

    fn mark_disconnected(idx: usize, channel: &mut TaskChannel) {
        if !channel.disconnected {
            error!(
                "Worker {} stopped with {} tasks in flight",
                idx, channel.num_tasks_in_flight
            );
        }
        channel.disconnected = true;
        channel.num_tasks_in_flight = 0;
    }

    /// Whether any task is queued or still running on a live worker.
    pub fn has_pending_tasks(&self) -> bool {
        let live = self.channels.iter().any(|channel| !channel.disconnected);
        (live && !self.queued_tasks.is_empty())
            || self
                .channels
                .iter()
                .any(|channel| channel.num_tasks_in_flight > 0)
    }

    /// Drives the pool until every published task and every follow-up task has been
    /// handled.
    ///
    /// Returns early if all workers have died; whatever is still queued is dropped
    /// with an error log.
    pub fn run_until_idle(&mut self) {
        loop {
            self.process_queued_tasks();
            self.process_completed_tasks();
            self.process_queued_tasks();

            if !self.has_pending_tasks() {
                break;
            }

            // Block briefly on a busy worker instead of spinning.
            let busy = self
                .channels
                .iter()
                .position(|channel| channel.num_tasks_in_flight > 0);
            if let Some(idx) = busy {
                let channel = &mut self.channels[idx];
                match channel.result_receiver.recv_timeout(RESULT_POLL_INTERVAL) {
                    Ok(result) => {
                        channel.num_tasks_in_flight -= 1;
                        for task in result.handle_result() {
                            self.publish_task(task);
                        }
                    }
                    Err(RecvTimeoutError::Timeout) => {}
                    Err(RecvTimeoutError::Disconnected) => Self::mark_disconnected(idx, channel),
                }
            }
        }

        if !self.queued_tasks.is_empty() {
            error!(
                "No live workers left, dropping {} queued tasks",
                self.queued_tasks.len()
            );
            self.queued_tasks.clear();
        }
        debug!("Task manager idle");
    }
}
