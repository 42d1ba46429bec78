use std::sync::{mpsc, Arc, Mutex, PoisonError};
use std::thread;
use std::time::Duration;

use copydesk_core::{
    update, Effect, GenerationTask, Msg, QueueState, QueueViewModel, TaskId, TaskInput, TaskOutcome,
};
use copydesk_logging::{desk_info, desk_warn};
use tokio::sync::mpsc as async_mpsc;

use crate::generate::ArticleGenerator;
use crate::store::{ArticleStore, NewArticle};
use crate::types::{GenerationRequest, QueueEvent, TaskUpdate};

#[derive(Debug, Clone)]
pub struct QueueSettings {
    /// Upper bound for one task (generation plus storage write).
    /// Expiry settles the task as `error` and the drain moves on.
    pub task_timeout: Option<Duration>,
}

impl Default for QueueSettings {
    fn default() -> Self {
        Self {
            task_timeout: Some(Duration::from_secs(300)),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    #[error("failed to start queue runtime: {0}")]
    Runtime(#[from] std::io::Error),
}

enum QueueCommand {
    Enqueue(Vec<TaskInput>),
}

/// Handle to the serial generation queue.
///
/// A dedicated thread owns a tokio runtime and the [`QueueState`]; tasks run
/// one at a time in submission order. Dropping the handle lets the worker
/// finish the remaining pending tasks and exit.
pub struct GenerationQueue {
    cmd_tx: async_mpsc::UnboundedSender<QueueCommand>,
    event_rx: mpsc::Receiver<QueueEvent>,
    state: Arc<Mutex<QueueState>>,
}

struct Worker {
    generator: Arc<dyn ArticleGenerator>,
    store: Arc<dyn ArticleStore>,
    settings: QueueSettings,
    state: Arc<Mutex<QueueState>>,
    event_tx: mpsc::Sender<QueueEvent>,
    finished_tx: async_mpsc::UnboundedSender<(TaskId, TaskOutcome)>,
}

impl GenerationQueue {
    pub fn new(
        generator: Arc<dyn ArticleGenerator>,
        store: Arc<dyn ArticleStore>,
        settings: QueueSettings,
    ) -> Result<Self, QueueError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()?;
        let (cmd_tx, cmd_rx) = async_mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::channel();
        let (finished_tx, finished_rx) = async_mpsc::unbounded_channel();
        let state = Arc::new(Mutex::new(QueueState::new()));

        let worker = Worker {
            generator,
            store,
            settings,
            state: state.clone(),
            event_tx,
            finished_tx,
        };
        thread::spawn(move || {
            runtime.block_on(worker.run(cmd_rx, finished_rx));
        });

        Ok(Self {
            cmd_tx,
            event_rx,
            state,
        })
    }

    /// Appends tasks in `pending`; returns without waiting for any of them.
    pub fn enqueue(&self, inputs: Vec<TaskInput>) {
        if self.cmd_tx.send(QueueCommand::Enqueue(inputs)).is_err() {
            desk_warn!("Generation queue worker has stopped; tasks dropped");
        }
    }

    pub fn try_recv(&self) -> Result<QueueEvent, mpsc::TryRecvError> {
        self.event_rx.try_recv()
    }

    /// Waits for the next event. `Disconnected` means the worker thread is gone
    /// and no further events will arrive.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<QueueEvent, mpsc::RecvTimeoutError> {
        self.event_rx.recv_timeout(timeout)
    }

    pub fn snapshot(&self) -> QueueViewModel {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .view()
    }
}

impl Worker {
    async fn run(
        self,
        mut cmd_rx: async_mpsc::UnboundedReceiver<QueueCommand>,
        mut finished_rx: async_mpsc::UnboundedReceiver<(TaskId, TaskOutcome)>,
    ) {
        let mut accepting = true;
        loop {
            let msg = tokio::select! {
                command = cmd_rx.recv(), if accepting => match command {
                    Some(QueueCommand::Enqueue(inputs)) => Msg::TasksSubmitted(inputs),
                    None => {
                        accepting = false;
                        Msg::NoOp
                    }
                },
                Some((task_id, outcome)) = finished_rx.recv() => Msg::TaskFinished { task_id, outcome },
            };

            for effect in self.apply(msg) {
                self.handle_effect(effect);
            }
            if !accepting && !self.is_running() {
                break;
            }
        }
    }

    fn is_running(&self) -> bool {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_running()
    }

    fn apply(&self, msg: Msg) -> Vec<Effect> {
        let mut guard = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let (next, effects) = update(std::mem::take(&mut *guard), msg);
        *guard = next;
        effects
    }

    fn handle_effect(&self, effect: Effect) {
        match effect {
            Effect::TasksQueued { task_ids } => {
                desk_info!("Queued {} generation task(s)", task_ids.len());
                self.emit(QueueEvent::TasksQueued { task_ids });
            }
            Effect::Dispatch(task) => {
                desk_info!("Task {} generating keyword='{}'", task.id, task.input.keyword);
                self.emit(QueueEvent::TaskUpdated(TaskUpdate::from(&task)));
                self.spawn_task(task);
            }
            Effect::TaskSettled(task) => {
                match task.error.as_deref() {
                    Some(error) => desk_warn!("Task {} failed: {}", task.id, error),
                    None => desk_info!("Task {} finished: {}", task.id, task.status.as_str()),
                }
                self.emit(QueueEvent::TaskUpdated(TaskUpdate::from(&task)));
            }
            Effect::Drained => {
                desk_info!("Generation queue drained");
                self.emit(QueueEvent::Drained);
            }
        }
    }

    fn emit(&self, event: QueueEvent) {
        let _ = self.event_tx.send(event);
    }

    fn spawn_task(&self, task: GenerationTask) {
        let generator = self.generator.clone();
        let store = self.store.clone();
        let timeout = self.settings.task_timeout;
        let finished_tx = self.finished_tx.clone();
        let task_id = task.id;
        tokio::spawn(async move {
            let mut work = tokio::spawn(async move {
                run_task(generator.as_ref(), store.as_ref(), &task).await
            });
            let joined = match timeout {
                Some(limit) => match tokio::time::timeout(limit, &mut work).await {
                    Ok(joined) => joined,
                    Err(_) => {
                        work.abort();
                        let message = format!("task timed out after {:.1}s", limit.as_secs_f64());
                        let _ = finished_tx.send((task_id, TaskOutcome::Failed(message)));
                        return;
                    }
                },
                None => work.await,
            };
            // A panicking collaborator still settles the task.
            let outcome = joined
                .unwrap_or_else(|err| TaskOutcome::Failed(format!("task aborted: {err}")));
            let _ = finished_tx.send((task_id, outcome));
        });
    }
}

/// Generates, normalizes and persists one task's article.
async fn run_task(
    generator: &dyn ArticleGenerator,
    store: &dyn ArticleStore,
    task: &GenerationTask,
) -> TaskOutcome {
    let request = GenerationRequest::from(&task.input);
    let article = match generator.generate(&request).await.into_article(&request) {
        Ok(article) => article,
        Err(message) => return TaskOutcome::Failed(message),
    };
    match store
        .insert_article(NewArticle::from_generation(&task.input, article))
        .await
    {
        Ok(_) => TaskOutcome::Success,
        Err(err) => TaskOutcome::Failed(err.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc::RecvTimeoutError;

    use super::*;

    #[test]
    fn stopped_worker_is_reported_as_disconnected() {
        let (cmd_tx, _cmd_rx) = async_mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::channel();
        drop(event_tx);
        let queue = GenerationQueue {
            cmd_tx,
            event_rx,
            state: Arc::new(Mutex::new(QueueState::new())),
        };

        assert_eq!(
            queue.recv_timeout(Duration::from_millis(10)),
            Err(RecvTimeoutError::Disconnected)
        );
        assert_eq!(queue.try_recv(), Err(mpsc::TryRecvError::Disconnected));
    }
}
