//! Agent runtime: one tokio task per agent.
//!
//! Each agent owns a private FIFO queue. Its worker takes one task at a
//! time, drives it through the [`RunState`] machine, and records the
//! outcome before taking the next. A failed task never stops the queue
//! and never affects sibling agents.
//!
//! # Build tasks
//!
//! A build reserves its volume in the shared [`StructureRegistry`]
//! before the world is asked to do anything. A conflict fails the task
//! immediately with [`TaskFailure::SpatialConflict`]. The reservation is
//! released when the build finishes, whether it succeeded or not.
//!
//! # Locking
//!
//! Agent state sits behind a `std::sync::Mutex` that is never held
//! across an `.await`. The registry is only ever locked while the agent
//! lock is held, never the other way round. Reserving and recording the
//! reservation happen under the agent lock, so a concurrent
//! [`AgentHandle::despawn`] either sees the reservation and releases it
//! or prevents it from being taken.

use std::any::Any;
use std::collections::VecDeque;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use foreman_types::{AgentId, BlockPos, BuildTask, Task};
use foreman_world::{
    StructureRegistry, StructureReservation, WorldEffects, WorldKnowledge, candidate_volume,
    reserved_dimensions,
};
use futures::FutureExt;
use tokio::sync::{Notify, watch};
use tokio::task::AbortHandle;
use tracing::{debug, info, warn};

use crate::error::{AgentError, TaskFailure};
use crate::machine::{RunState, TaskEvent};

/// Number of task records kept per agent by default.
pub const DEFAULT_HISTORY_LIMIT: usize = 32;

/// Tunables for one agent runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Upper bound on a single world effect. `None` waits forever.
    pub task_timeout: Option<Duration>,
    /// How many finished tasks to remember.
    pub history_limit: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            task_timeout: None,
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }
}

/// A finished task and its outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRecord {
    /// The task that ran.
    pub task: Task,
    /// `None` if the task succeeded.
    pub failure: Option<TaskFailure>,
    /// When the worker took the task from the queue.
    pub started_at: DateTime<Utc>,
    /// When the outcome was recorded.
    pub finished_at: DateTime<Utc>,
}

impl TaskRecord {
    /// Whether the task succeeded.
    pub const fn succeeded(&self) -> bool {
        self.failure.is_none()
    }
}

/// Point-in-time view of an agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentStatus {
    /// Agent identifier.
    pub id: AgentId,
    /// Display name.
    pub name: String,
    /// Current run state.
    pub state: RunState,
    /// Task in flight, if any.
    pub current: Option<Task>,
    /// Tasks waiting behind the current one.
    pub queued: usize,
    /// Failure of the most recent failed task.
    pub last_failure: Option<TaskFailure>,
    /// Recent finished tasks, oldest first.
    pub history: Vec<TaskRecord>,
    /// Reservation held by the build in flight.
    pub reservation: Option<StructureReservation>,
    /// Whether the agent has been despawned.
    pub despawned: bool,
}

#[derive(Debug, Default)]
struct AgentState {
    queue: VecDeque<Task>,
    state: RunState,
    current: Option<Task>,
    started_at: Option<DateTime<Utc>>,
    last_failure: Option<TaskFailure>,
    history: VecDeque<TaskRecord>,
    reservation: Option<StructureReservation>,
    despawned: bool,
}

impl AgentState {
    fn apply(&mut self, agent: AgentId, event: TaskEvent) {
        match self.state.transition(event) {
            Ok(next) => self.state = next,
            Err(e) => warn!(agent_id = %agent, error = %e, "ignoring run-state event"),
        }
    }
}

/// State shared between an agent's worker and its handles.
#[derive(Debug)]
struct Shared {
    id: AgentId,
    name: String,
    state: Mutex<AgentState>,
    wake: Notify,
    idle: watch::Sender<bool>,
    worker: Mutex<Option<AbortHandle>>,
    registry: Arc<StructureRegistry>,
}

impl Shared {
    /// Lock agent state, recovering from poisoning.
    fn lock(&self) -> MutexGuard<'_, AgentState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn worker(&self) -> MutexGuard<'_, Option<AbortHandle>> {
        self.worker.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// ---------------------------------------------------------------------------
// Handle
// ---------------------------------------------------------------------------

/// Cloneable handle to a running agent.
#[derive(Debug, Clone)]
pub struct AgentHandle {
    shared: Arc<Shared>,
}

impl AgentHandle {
    /// Agent identifier.
    pub fn id(&self) -> AgentId {
        self.shared.id
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.shared.name
    }

    /// Append tasks to the end of the queue, preserving their order.
    ///
    /// Returns how many tasks were added.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::Despawned`] once the agent is gone.
    pub fn enqueue(&self, tasks: impl IntoIterator<Item = Task>) -> Result<usize, AgentError> {
        let mut st = self.shared.lock();
        if st.despawned {
            return Err(AgentError::Despawned(self.shared.id));
        }
        let before = st.queue.len();
        st.queue.extend(tasks);
        let added = st.queue.len().saturating_sub(before);
        if added > 0 {
            self.shared.idle.send_replace(false);
        }
        let queued = st.queue.len();
        drop(st);

        if added > 0 {
            debug!(agent_id = %self.shared.id, added, queued, "tasks enqueued");
            self.shared.wake.notify_one();
        }
        Ok(added)
    }

    /// Snapshot of the agent's state.
    pub fn status(&self) -> AgentStatus {
        let st = self.shared.lock();
        AgentStatus {
            id: self.shared.id,
            name: self.shared.name.clone(),
            state: st.state,
            current: st.current.clone(),
            queued: st.queue.len(),
            last_failure: st.last_failure.clone(),
            history: st.history.iter().cloned().collect(),
            reservation: st.reservation.clone(),
            despawned: st.despawned,
        }
    }

    /// Whether the agent has been despawned.
    pub fn is_despawned(&self) -> bool {
        self.shared.lock().despawned
    }

    /// Wait until the queue is drained and no task is in flight.
    ///
    /// Returns immediately for an idle or despawned agent.
    pub async fn wait_idle(&self) {
        let mut rx = self.shared.idle.subscribe();
        // The sender lives as long as `shared`, so this cannot fail.
        let _ = rx.wait_for(|idle| *idle).await;
    }

    /// Stop the agent.
    ///
    /// Discards queued and in-flight tasks, releases any held reservation,
    /// and aborts the worker. Returns `false` if the agent was already
    /// despawned.
    pub fn despawn(&self) -> bool {
        let mut st = self.shared.lock();
        if st.despawned {
            return false;
        }
        st.despawned = true;
        let discarded = st
            .queue
            .len()
            .saturating_add(usize::from(st.current.is_some()));
        st.queue.clear();
        st.current = None;
        st.started_at = None;
        st.apply(self.shared.id, TaskEvent::Abort);
        let reservation = st.reservation.take();
        self.shared.idle.send_replace(true);
        drop(st);

        if let Some(reservation) = reservation {
            self.shared.registry.release(&reservation);
        }
        if let Some(worker) = self.shared.worker().take() {
            worker.abort();
        }
        info!(
            agent_id = %self.shared.id,
            agent = %self.shared.name,
            discarded,
            "agent despawned"
        );
        true
    }
}

// ---------------------------------------------------------------------------
// Worker
// ---------------------------------------------------------------------------

enum Next {
    Run(Task),
    Wait,
    Stop,
}

/// The worker behind an [`AgentHandle`].
pub struct AgentRuntime<E: WorldEffects> {
    shared: Arc<Shared>,
    world: Arc<E>,
    knowledge: Arc<dyn WorldKnowledge>,
    config: RuntimeConfig,
}

impl<E: WorldEffects> AgentRuntime<E> {
    /// Start an agent worker on the current tokio runtime.
    ///
    /// The agent starts `Idle` with an empty queue. Spawning the world
    /// entity is the caller's job.
    pub fn spawn(
        id: AgentId,
        name: impl Into<String>,
        world: Arc<E>,
        knowledge: Arc<dyn WorldKnowledge>,
        registry: Arc<StructureRegistry>,
        config: RuntimeConfig,
    ) -> AgentHandle {
        let (idle, _) = watch::channel(true);
        let shared = Arc::new(Shared {
            id,
            name: name.into(),
            state: Mutex::new(AgentState::default()),
            wake: Notify::new(),
            idle,
            worker: Mutex::new(None),
            registry,
        });

        let runtime = Self {
            shared: Arc::clone(&shared),
            world,
            knowledge,
            config,
        };
        let worker = tokio::spawn(runtime.run());
        *shared.worker() = Some(worker.abort_handle());

        info!(agent_id = %id, agent = %shared.name, "agent runtime started");
        AgentHandle { shared }
    }

    async fn run(self) {
        loop {
            match self.next() {
                Next::Run(task) => self.execute(task).await,
                Next::Wait => self.shared.wake.notified().await,
                Next::Stop => break,
            }
        }
        debug!(agent_id = %self.shared.id, "agent worker stopped");
    }

    /// Settle the previous outcome and take the next task.
    fn next(&self) -> Next {
        let id = self.shared.id;
        let mut st = self.shared.lock();
        if st.despawned {
            return Next::Stop;
        }
        if matches!(st.state, RunState::Succeeded | RunState::Failed) {
            st.apply(id, TaskEvent::Settle);
        }
        match st.queue.pop_front() {
            Some(task) => {
                st.apply(id, TaskEvent::Start);
                st.current = Some(task.clone());
                st.started_at = Some(Utc::now());
                Next::Run(task)
            }
            None => {
                self.shared.idle.send_replace(true);
                Next::Wait
            }
        }
    }

    async fn execute(&self, task: Task) {
        info!(
            agent_id = %self.shared.id,
            agent = %self.shared.name,
            task = %task,
            "task started"
        );
        let outcome = match &task {
            Task::Build(build) => self.build(build, &task).await,
            Task::Attack { .. } | Task::Mine { .. } | Task::Follow { .. } | Task::Pathfind { .. } => {
                let origin = self.knowledge.snapshot(self.shared.id).position;
                self.perform(&task, origin).await
            }
        };
        self.finish(task, outcome);
    }

    /// Reserve, build, release.
    async fn build(&self, build: &BuildTask, task: &Task) -> Result<(), TaskFailure> {
        let id = self.shared.id;
        let position = self.knowledge.snapshot(id).position;
        let dimensions = reserved_dimensions(build.structure, build.dimensions);
        let (origin, volume) = candidate_volume(position, dimensions)?;

        {
            let mut st = self.shared.lock();
            if st.despawned {
                return Ok(());
            }
            let reservation = self.shared.registry.reserve(id, build.structure, volume)?;
            st.reservation = Some(reservation);
        }

        let result = self.perform(task, origin).await;

        let held = self.shared.lock().reservation.take();
        if let Some(reservation) = held {
            self.shared.registry.release(&reservation);
        }
        result
    }

    /// Run one world effect, bounded by the configured timeout.
    ///
    /// A panicking effect is reported as an execution failure so the
    /// agent keeps draining its queue.
    async fn perform(&self, task: &Task, origin: BlockPos) -> Result<(), TaskFailure> {
        let effect =
            AssertUnwindSafe(self.world.perform(self.shared.id, task, origin)).catch_unwind();
        let caught = match self.config.task_timeout {
            None => effect.await,
            Some(limit) => match tokio::time::timeout(limit, effect).await {
                Ok(caught) => caught,
                Err(elapsed) => {
                    return Err(TaskFailure::Execution {
                        reason: format!("no result within {} ms ({elapsed})", limit.as_millis()),
                    });
                }
            },
        };
        match caught {
            Ok(result) => result.map_err(TaskFailure::from),
            Err(payload) => Err(TaskFailure::Execution {
                reason: format!("world effect panicked: {}", panic_message(payload.as_ref())),
            }),
        }
    }

    /// Record the outcome of the current task.
    fn finish(&self, task: Task, outcome: Result<(), TaskFailure>) {
        let id = self.shared.id;
        let finished_at = Utc::now();
        let mut st = self.shared.lock();
        if st.despawned {
            return;
        }
        let started_at = st.started_at.take().unwrap_or(finished_at);
        st.current = None;

        match &outcome {
            Ok(()) => {
                st.apply(id, TaskEvent::Complete);
                info!(agent_id = %id, agent = %self.shared.name, task = %task, "task succeeded");
            }
            Err(failure) => {
                st.apply(id, TaskEvent::Fail);
                st.last_failure = Some(failure.clone());
                warn!(
                    agent_id = %id,
                    agent = %self.shared.name,
                    task = %task,
                    failure = %failure,
                    "task failed"
                );
            }
        }

        st.history.push_back(TaskRecord {
            task,
            failure: outcome.err(),
            started_at,
            finished_at,
        });
        while st.history.len() > self.config.history_limit {
            st.history.pop_front();
        }
    }
}

/// Text of a panic payload, when it carries one.
fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}
