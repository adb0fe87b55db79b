//! # Task System Core Traits
//!
//! ## Task Lifecycle
//! 1. A `Task` is created and scheduled via `TaskManager::publish_task()`
//! 2. The task's `process()` method is called on a worker thread
//! 3. The task returns a boxed `TaskResult`
//! 4. The result's `handle_result()` is called on the thread driving the manager
//! 5. The result can spawn follow-up tasks, which are published in turn
//!
//! Both traits require `Send`; any state a task shares with other threads must sit
//! behind a lock such as `MtResource`.

/// A unit of work executed on a worker thread.
///
/// Tasks should own, or hold shared handles to, everything they need. Expensive
/// work belongs in `process()`; bookkeeping belongs in the result handler.
pub trait Task: Send {
    /// Performs the work and returns a result to be handled by the manager's owner.
    ///
    /// # Implementation Notes
    /// - Runs on a worker thread, so it must not touch thread-local state
    /// - Failures should be reported through the returned result, not by panicking
    fn process(&self) -> Box<dyn TaskResult + Send>;
}

/// The outcome of a `Task`.
pub trait TaskResult: Send {
    /// Applies the outcome. Called from `TaskManager::process_completed_tasks()`.
    ///
    /// # Returns
    /// Follow-up tasks to publish (can be empty).
    fn handle_result(self: Box<Self>) -> Vec<Box<dyn Task + Send>>;
}
