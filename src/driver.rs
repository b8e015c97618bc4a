//! Drives one run from creation to a terminal state.
//!
//! The run is polled until the service either finishes it or asks for tool
//! outputs. Requested outputs are produced in the order the service lists
//! the calls and submitted back as a single batch, after which polling
//! resumes. A run that ends in any state other than `completed` is reported
//! through [`RunOutcome`], not as an error.

use std::time::Duration;

use crate::{
    assistants::{
        messages::{CreateMessageBuilder, Role},
        runs::{CreateRunBuilder, Run, Status, SubmitToolOutputsRequest},
    },
    backend::AssistantBackend,
    market_data::StockDataSource,
    tools, Error, Result,
};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(3);

/// How often the run is polled and for how long.
///
/// The default polls every three seconds with no upper bound.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub max_attempts: Option<u32>,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            max_attempts: None,
        }
    }
}

impl PollPolicy {
    /// Polls back to back without sleeping.
    #[must_use]
    pub fn immediate() -> Self {
        Self {
            interval: Duration::ZERO,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    #[must_use]
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = Some(max_attempts);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DriverState {
    Created,
    Polling,
    RequiresAction,
    Completed,
    TerminalOther,
}

impl DriverState {
    pub fn can_transition_to(self, next: DriverState) -> bool {
        use DriverState::*;
        matches!(
            (self, next),
            (Created, Polling)
                | (Polling, RequiresAction)
                | (RequiresAction, Polling)
                | (Polling, Completed)
                | (Polling, TerminalOther)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, DriverState::Completed | DriverState::TerminalOther)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunOutcome {
    /// The run as last retrieved.
    pub run: Run,
    /// Every state the driver entered, starting with `Created`.
    pub history: Vec<DriverState>,
    pub polls: u32,
}

impl RunOutcome {
    pub fn state(&self) -> DriverState {
        self.history
            .last()
            .copied()
            .unwrap_or(DriverState::Created)
    }

    pub fn is_completed(&self) -> bool {
        self.state() == DriverState::Completed
    }
}

pub struct RunDriver<'a, B: ?Sized, S: ?Sized> {
    backend: &'a B,
    source: &'a S,
    policy: PollPolicy,
}

impl<'a, B, S> RunDriver<'a, B, S>
where
    B: AssistantBackend + ?Sized,
    S: StockDataSource + ?Sized,
{
    pub fn new(backend: &'a B, source: &'a S, policy: PollPolicy) -> Self {
        Self {
            backend,
            source,
            policy,
        }
    }

    /// Creates a thread holding `prompt` and starts a run of the assistant
    /// on it, then drives that run to the end.
    pub async fn execute(&self, assistant_id: &str, prompt: &str) -> Result<RunOutcome> {
        let run = self.start(assistant_id, prompt).await?;
        self.drive(run).await
    }

    pub async fn start(&self, assistant_id: &str, prompt: &str) -> Result<Run> {
        let thread = self.backend.create_thread().await?;
        log::info!("Thread created with ID: {}", thread.id);

        let message = CreateMessageBuilder::default()
            .role(Role::User)
            .content(prompt)
            .build()
            .map_err(|err| Error::InvalidRequest(err.to_string()))?;
        self.backend.create_message(&thread.id, message).await?;

        let request = CreateRunBuilder::default()
            .assistant_id(assistant_id)
            .build()
            .map_err(|err| Error::InvalidRequest(err.to_string()))?;
        let run = self.backend.create_run(&thread.id, request).await?;
        log::info!("Run initiated with ID: {}", run.id);

        Ok(run)
    }

    pub async fn drive(&self, run: Run) -> Result<RunOutcome> {
        let thread_id = run.thread_id;
        let run_id = run.id;
        let mut history = vec![DriverState::Created];
        let mut polls = 0u32;

        enter(&mut history, DriverState::Polling);

        loop {
            if let Some(max_attempts) = self.policy.max_attempts {
                if polls >= max_attempts {
                    return Err(Error::PollLimitExceeded { attempts: polls });
                }
            }

            let run = self.backend.get_run(&thread_id, &run_id).await?;
            polls += 1;

            if run.status.is_pending() {
                log::debug!("Run {run_id} is {}, polling again", run.status);
                if !self.policy.interval.is_zero() {
                    tokio::time::sleep(self.policy.interval).await;
                }
                continue;
            }

            if let Some(calls) = run.pending_tool_calls() {
                enter(&mut history, DriverState::RequiresAction);

                log::info!("Run {run_id} requires {} tool output(s)", calls.len());
                let tool_outputs = tools::fulfill_all(calls, self.source).await?;
                self.backend
                    .submit_tool_outputs(
                        &thread_id,
                        &run_id,
                        SubmitToolOutputsRequest { tool_outputs },
                    )
                    .await?;

                enter(&mut history, DriverState::Polling);
                continue;
            }

            let state = if run.status == Status::Completed {
                log::info!("Run {run_id} completed");
                DriverState::Completed
            } else {
                log::warn!("Run {run_id} ended with status: {}", run.status);
                DriverState::TerminalOther
            };
            enter(&mut history, state);

            return Ok(RunOutcome {
                run,
                history,
                polls,
            });
        }
    }
}

fn enter(history: &mut Vec<DriverState>, next: DriverState) {
    let current = history.last().copied().unwrap_or(DriverState::Created);
    debug_assert!(
        current.can_transition_to(next),
        "illegal run transition {current:?} -> {next:?}"
    );
    log::debug!("Run driver {current:?} -> {next:?}");
    history.push(next);
}
