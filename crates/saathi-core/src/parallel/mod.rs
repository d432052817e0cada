//! Bounded fan-out of named async tasks.
//!
//! `ParallelTaskRunner` spawns every registered task on a `JoinSet`. At most
//! `max_concurrency` run at once (a `Semaphore`), each is bounded by a
//! deadline, and all of them race a shared `CancellationToken`. Failures,
//! timeouts, cancellation, and panics are reported per task and never
//! affect sibling tasks.

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt::Display;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use futures_util::FutureExt;
use saathi_types::config::ParallelConfig;
use saathi_types::task::TaskOutcome;
use serde_json::Value;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

type TaskFuture = Pin<Box<dyn Future<Output = Result<Value, String>> + Send>>;
type BoxTask = Box<dyn FnOnce() -> TaskFuture + Send>;

/// Runs named tasks concurrently and collects one outcome per name.
pub struct ParallelTaskRunner {
    tasks: BTreeMap<String, BoxTask>,
    max_concurrency: usize,
    task_timeout: Duration,
    cancel: CancellationToken,
}

impl ParallelTaskRunner {
    pub fn new(config: &ParallelConfig) -> Self {
        Self::with_limits(
            config.max_concurrency,
            Duration::from_secs(config.task_timeout_secs),
        )
    }

    pub fn with_limits(max_concurrency: usize, task_timeout: Duration) -> Self {
        Self {
            tasks: BTreeMap::new(),
            max_concurrency: max_concurrency.max(1),
            task_timeout,
            cancel: CancellationToken::new(),
        }
    }

    /// Register `task` under `name`. A later registration under the same
    /// name replaces the earlier one.
    pub fn add_task<F, Fut, E>(&mut self, name: impl Into<String>, task: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<Value, E>> + Send + 'static,
        E: Display + Send + 'static,
    {
        let name = name.into();
        let boxed: BoxTask = Box::new(move || -> TaskFuture {
            Box::pin(async move { task().await.map_err(|e| e.to_string()) })
        });
        if self.tasks.insert(name.clone(), boxed).is_some() {
            debug!(task = %name, "replaced previously registered task");
        }
    }

    /// Token shared by every task; cancelling it resolves all unfinished
    /// tasks to a cancelled error.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Run every task and wait for all of them to finish.
    ///
    /// The returned map has exactly the registered names as keys.
    pub async fn run_all(self) -> BTreeMap<String, TaskOutcome> {
        let names: Vec<String> = self.tasks.keys().cloned().collect();
        info!(
            tasks = names.len(),
            max_concurrency = self.max_concurrency,
            "running parallel tasks"
        );

        let semaphore = Arc::new(Semaphore::new(self.max_concurrency));
        let mut set = JoinSet::new();
        for (name, task) in self.tasks {
            let semaphore = Arc::clone(&semaphore);
            let token = self.cancel.clone();
            let deadline = self.task_timeout;
            set.spawn(async move {
                let outcome = run_one(task, semaphore, token, deadline).await;
                (name, outcome)
            });
        }

        let mut outcomes = BTreeMap::new();
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok((name, outcome)) => {
                    if let TaskOutcome::Failed { error } = &outcome {
                        warn!(task = %name, %error, "parallel task failed");
                    }
                    outcomes.insert(name, outcome);
                }
                Err(e) => warn!(error = %e, "parallel task did not join"),
            }
        }

        for name in names {
            outcomes
                .entry(name)
                .or_insert_with(|| TaskOutcome::failed("task aborted"));
        }

        let completed = outcomes.values().filter(|o| o.is_ok()).count();
        info!(completed, total = outcomes.len(), "parallel tasks finished");
        outcomes
    }
}

async fn run_one(
    task: BoxTask,
    semaphore: Arc<Semaphore>,
    token: CancellationToken,
    deadline: Duration,
) -> TaskOutcome {
    let permit = tokio::select! {
        biased;
        _ = token.cancelled() => return TaskOutcome::failed("task cancelled"),
        permit = semaphore.acquire_owned() => permit,
    };
    let Ok(_permit) = permit else {
        return TaskOutcome::failed("task aborted");
    };

    // The task is invoked inside the guarded future so a panic while
    // building it is caught too.
    let guarded = AssertUnwindSafe(async move { task().await }).catch_unwind();

    tokio::select! {
        biased;
        _ = token.cancelled() => TaskOutcome::failed("task cancelled"),
        result = tokio::time::timeout(deadline, guarded) => match result {
            Err(_) => TaskOutcome::failed(format!("task timed out after {deadline:?}")),
            Ok(Err(panic)) => {
                TaskOutcome::failed(format!("task panicked: {}", panic_message(panic.as_ref())))
            }
            Ok(Ok(Err(error))) => TaskOutcome::failed(error),
            Ok(Ok(Ok(value))) => TaskOutcome::Completed(value),
        },
    }
}

/// Best-effort text of a panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

impl std::fmt::Debug for ParallelTaskRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParallelTaskRunner")
            .field("tasks", &self.tasks.keys().collect::<Vec<_>>())
            .field("max_concurrency", &self.max_concurrency)
            .field("task_timeout", &self.task_timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn runner() -> ParallelTaskRunner {
        ParallelTaskRunner::with_limits(4, Duration::from_secs(5))
    }

    #[tokio::test]
    async fn every_name_gets_an_outcome() {
        let mut runner = runner();
        runner.add_task("emotional", || async { Ok::<_, String>(json!({"ok": 1})) });
        runner.add_task("study", || async { Err::<Value, _>("model offline") });
        runner.add_task("community", || async { Ok::<_, String>(json!("done")) });

        let outcomes = runner.run_all().await;
        assert_eq!(
            outcomes.keys().collect::<Vec<_>>(),
            vec!["community", "emotional", "study"]
        );
        assert_eq!(outcomes["emotional"].value(), Some(&json!({"ok": 1})));
        assert_eq!(outcomes["study"].error(), Some("model offline"));
        assert!(outcomes["community"].is_ok());
    }

    #[tokio::test]
    async fn slow_task_times_out_alone() {
        let mut runner = ParallelTaskRunner::with_limits(4, Duration::from_millis(50));
        runner.add_task("slow", || async {
            tokio::time::sleep(Duration::from_secs(10)).await;
            Ok::<_, String>(Value::Null)
        });
        runner.add_task("fast", || async { Ok::<_, String>(json!(1)) });

        let outcomes = runner.run_all().await;
        assert!(outcomes["slow"].error().unwrap().starts_with("task timed out"));
        assert!(outcomes["fast"].is_ok());
    }

    #[tokio::test]
    async fn panic_is_reported_under_its_name() {
        let mut runner = runner();
        runner.add_task("boom", || async {
            if true {
                panic!("kaboom");
            }
            Ok::<_, String>(Value::Null)
        });
        runner.add_task("calm", || async { Ok::<_, String>(json!(true)) });

        let outcomes = runner.run_all().await;
        assert_eq!(outcomes["boom"].error(), Some("task panicked: kaboom"));
        assert!(outcomes["calm"].is_ok());
    }

    #[tokio::test]
    async fn cancelled_before_start() {
        let mut runner = runner();
        runner.add_task("a", || async { Ok::<_, String>(json!(1)) });
        runner.add_task("b", || async { Ok::<_, String>(json!(2)) });
        runner.cancellation_token().cancel();

        let outcomes = runner.run_all().await;
        assert_eq!(outcomes.len(), 2);
        for outcome in outcomes.values() {
            assert_eq!(outcome.error(), Some("task cancelled"));
        }
    }

    #[tokio::test]
    async fn cancellation_stops_unfinished_tasks() {
        let mut runner = runner();
        let token = runner.cancellation_token();
        runner.add_task("quick", || async { Ok::<_, String>(json!("fine")) });
        runner.add_task("stuck", || async {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok::<_, String>(Value::Null)
        });
        runner.add_task("trigger", move || async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            token.cancel();
            Ok::<_, String>(json!("cancelled the rest"))
        });

        let outcomes = runner.run_all().await;
        assert!(outcomes["quick"].is_ok());
        assert_eq!(outcomes["stuck"].error(), Some("task cancelled"));
        assert_eq!(outcomes.len(), 3);
    }

    #[tokio::test]
    async fn concurrency_is_bounded() {
        let mut runner = ParallelTaskRunner::with_limits(2, Duration::from_secs(5));
        let active = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        for i in 0..6 {
            let active = Arc::clone(&active);
            let peak = Arc::clone(&peak);
            runner.add_task(format!("task-{i}"), move || async move {
                let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(20)).await;
                active.fetch_sub(1, Ordering::SeqCst);
                Ok::<_, String>(json!(i))
            });
        }

        let outcomes = runner.run_all().await;
        assert_eq!(outcomes.len(), 6);
        assert!(peak.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test]
    async fn last_registration_wins() {
        let mut runner = runner();
        runner.add_task("plan", || async { Ok::<_, String>(json!("first")) });
        runner.add_task("plan", || async { Ok::<_, String>(json!("second")) });
        assert_eq!(runner.len(), 1);

        let outcomes = runner.run_all().await;
        assert_eq!(outcomes["plan"].value(), Some(&json!("second")));
    }

    #[tokio::test]
    async fn empty_runner_returns_empty_map() {
        assert!(runner().run_all().await.is_empty());
    }

    #[test]
    fn panic_message_variants() {
        let s: Box<dyn Any + Send> = Box::new("static");
        assert_eq!(panic_message(s.as_ref()), "static");
        let owned: Box<dyn Any + Send> = Box::new(String::from("owned"));
        assert_eq!(panic_message(owned.as_ref()), "owned");
        let other: Box<dyn Any + Send> = Box::new(7u8);
        assert_eq!(panic_message(other.as_ref()), "unknown panic");
    }
}
