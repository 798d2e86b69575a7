// src/flow.rs
//! Multi-step prompt controller.
//!
//! A [`StepHandler`] decides what each step shows and which step follows;
//! [`Flow`] owns the visited-step history, the single visible prompt, and
//! the validation bookkeeping of text inputs. Hosts only render prompts
//! and report events.

use anyhow::Result;
use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt};
use futures::stream::{FuturesUnordered, StreamExt};
use std::fmt::Debug;
use tracing::{debug, trace};

use crate::validate::{ValidationOutcome, Validator};

// =============================================================================
// PROMPTS & EVENTS
// =============================================================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    Back,
    Skip,
}

impl Button {
    pub fn tooltip(&self) -> &'static str {
        match self {
            Button::Back => "Back",
            Button::Skip => "Skip",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepInfo {
    pub title: String,
    pub step: usize,
    pub total_steps: usize,
    pub ignore_focus_out: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickItem {
    pub label: String,
    pub detail: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickPrompt {
    pub info: StepInfo,
    pub placeholder: Option<String>,
    pub items: Vec<PickItem>,
    /// Index of the item to highlight.
    pub active: Option<usize>,
    pub buttons: Vec<Button>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputPrompt {
    pub info: StepInfo,
    pub placeholder: Option<String>,
    /// Pre-filled text.
    pub value: String,
    pub buttons: Vec<Button>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Prompt {
    Pick(PickPrompt),
    Input(InputPrompt),
}

impl Prompt {
    pub fn info(&self) -> &StepInfo {
        match self {
            Prompt::Pick(p) => &p.info,
            Prompt::Input(p) => &p.info,
        }
    }

    pub fn buttons(&self) -> &[Button] {
        match self {
            Prompt::Pick(p) => &p.buttons,
            Prompt::Input(p) => &p.buttons,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    /// An item of a pick prompt was chosen.
    Selected(usize),
    /// The text of an input prompt changed.
    Changed(String),
    /// The current text of an input prompt was submitted.
    Accepted,
    Triggered(Button),
    /// The prompt was dismissed by the user.
    Hidden,
}

/// Renders at most one prompt and reports what the user does with it.
#[async_trait]
pub trait UiHost: Send {
    /// Replace whatever is visible with `prompt`.
    fn show(&mut self, prompt: &Prompt);
    fn hide(&mut self);
    fn set_busy(&mut self, busy: bool);
    fn set_validation_message(&mut self, message: Option<&str>);
    /// Must be cancel-safe: the controller races it against validations.
    /// A host that can no longer produce events reports `Hidden`.
    async fn next_event(&mut self) -> UiEvent;
}

/// Asked when the user dismisses a prompt. `true` turns the dismissal into
/// a step back instead of cancelling the flow.
#[async_trait]
pub trait Resume: Send + Sync {
    async fn should_resume(&self) -> bool;
}

pub struct NoResume;

#[async_trait]
impl Resume for NoResume {
    async fn should_resume(&self) -> bool {
        false
    }
}

// =============================================================================
// STEP RESULTS
// =============================================================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Interrupt {
    #[error("navigated back")]
    Back,
    #[error("flow canceled")]
    Cancel,
    #[error("resume requested")]
    Resume,
}

#[derive(Debug, thiserror::Error)]
pub enum StepError {
    #[error(transparent)]
    Interrupt(#[from] Interrupt),
    #[error(transparent)]
    Fatal(#[from] anyhow::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pick {
    Item(usize),
    Button(Button),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Value(String),
    Button(Button),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowOutcome<S> {
    Completed(S),
    /// The user dismissed a prompt. The partial state must not be used.
    Canceled(S),
}

impl<S> FlowOutcome<S> {
    pub fn is_canceled(&self) -> bool {
        matches!(self, FlowOutcome::Canceled(_))
    }
}

#[async_trait]
pub trait StepHandler: Send + Sync {
    type Step: Copy + Debug + Send + Sync;
    type State: Send;

    /// Show one prompt through `flow` and return the step that follows, or
    /// `None` when the flow is complete.
    async fn run_step(
        &self,
        step: Self::Step,
        flow: &mut Flow<'_>,
        state: &mut Self::State,
    ) -> Result<Option<Self::Step>, StepError>;
}

// =============================================================================
// CONTROLLER
// =============================================================================
pub struct Flow<'a> {
    host: &'a mut dyn UiHost,
    resume: &'a dyn Resume,
    depth: usize,
    visible: bool,
}

enum Check {
    Change,
    Accept { value: String, change: u64 },
}

struct Finished {
    id: u64,
    check: Check,
    outcome: ValidationOutcome,
}

impl<'a> Flow<'a> {
    pub fn new(host: &'a mut dyn UiHost, resume: &'a dyn Resume) -> Self {
        Self {
            host,
            resume,
            depth: 0,
            visible: false,
        }
    }

    pub async fn run<H: StepHandler>(
        &mut self,
        handler: &H,
        start: H::Step,
        mut state: H::State,
    ) -> Result<FlowOutcome<H::State>> {
        let mut history: Vec<H::Step> = Vec::new();
        let mut next = Some(start);
        let mut canceled = false;

        while let Some(step) = next.take() {
            history.push(step);
            self.depth = history.len();
            if self.visible {
                self.host.set_busy(true);
            }
            debug!(?step, depth = self.depth, "running step");

            next = match handler.run_step(step, self, &mut state).await {
                Ok(following) => following,
                Err(StepError::Interrupt(Interrupt::Cancel)) => {
                    debug!(?step, "flow canceled");
                    canceled = true;
                    None
                }
                Err(StepError::Interrupt(interrupt)) => {
                    debug!(?step, ?interrupt, "stepping back");
                    history.pop();
                    // Nothing to go back to: show the first step again.
                    history.pop().or(Some(step))
                }
                Err(StepError::Fatal(e)) => {
                    self.dispose();
                    return Err(e);
                }
            };
        }

        self.dispose();
        Ok(if canceled {
            FlowOutcome::Canceled(state)
        } else {
            FlowOutcome::Completed(state)
        })
    }

    fn dispose(&mut self) {
        if self.visible {
            self.host.hide();
            self.visible = false;
        }
    }

    fn present(&mut self, prompt: &Prompt) {
        self.dispose();
        self.host.show(prompt);
        self.visible = true;
    }

    fn with_back(&self, mut buttons: Vec<Button>) -> Vec<Button> {
        buttons.retain(|b| *b != Button::Back);
        if self.depth > 1 {
            buttons.insert(0, Button::Back);
        }
        buttons
    }

    async fn dismissed(&mut self) -> Interrupt {
        self.visible = false;
        if self.resume.should_resume().await {
            Interrupt::Resume
        } else {
            Interrupt::Cancel
        }
    }

    pub async fn show_pick(&mut self, mut prompt: PickPrompt) -> Result<Pick, Interrupt> {
        prompt.buttons = self.with_back(prompt.buttons);
        let buttons = prompt.buttons.clone();
        let count = prompt.items.len();
        self.present(&Prompt::Pick(prompt));

        loop {
            match self.host.next_event().await {
                UiEvent::Selected(index) if index < count => return Ok(Pick::Item(index)),
                UiEvent::Triggered(Button::Back) if buttons.contains(&Button::Back) => {
                    return Err(Interrupt::Back)
                }
                UiEvent::Triggered(button) if buttons.contains(&button) => {
                    return Ok(Pick::Button(button))
                }
                UiEvent::Hidden => return Err(self.dismissed().await),
                other => trace!(?other, "ignored pick event"),
            }
        }
    }

    /// Every change is validated; only the answer to the newest request may
    /// touch the displayed message. An accept resolves once its validation
    /// passes, provided nothing was typed and nothing was accepted since.
    pub async fn show_input(
        &mut self,
        mut prompt: InputPrompt,
        validator: &Validator,
    ) -> Result<Input, Interrupt> {
        prompt.buttons = self.with_back(prompt.buttons);
        let buttons = prompt.buttons.clone();
        let mut value = prompt.value.clone();
        self.present(&Prompt::Input(prompt));

        let mut pending: FuturesUnordered<BoxFuture<'static, Finished>> = FuturesUnordered::new();
        let mut issued: u64 = 0;
        let mut latest_change: u64 = 0;
        let mut latest_accept: u64 = 0;

        loop {
            tokio::select! {
                event = self.host.next_event() => match event {
                    UiEvent::Changed(text) => {
                        issued += 1;
                        latest_change = issued;
                        value = text.clone();
                        let fut = validator.validate(text);
                        let id = issued;
                        pending.push(
                            async move { Finished { id, check: Check::Change, outcome: fut.await } }.boxed(),
                        );
                    }
                    UiEvent::Accepted => {
                        issued += 1;
                        latest_accept = issued;
                        self.host.set_busy(true);
                        let check = Check::Accept { value: value.clone(), change: latest_change };
                        let fut = validator.validate(value.clone());
                        let id = issued;
                        pending.push(async move { Finished { id, check, outcome: fut.await } }.boxed());
                    }
                    UiEvent::Triggered(Button::Back) if buttons.contains(&Button::Back) => {
                        return Err(Interrupt::Back);
                    }
                    UiEvent::Triggered(button) if buttons.contains(&button) => {
                        return Ok(Input::Button(button));
                    }
                    UiEvent::Hidden => return Err(self.dismissed().await),
                    other => trace!(?other, "ignored input event"),
                },
                Some(done) = pending.next(), if !pending.is_empty() => match done.check {
                    Check::Change if done.id == latest_change => {
                        self.host.set_validation_message(done.outcome.message());
                    }
                    Check::Accept { value: accepted, change } if done.id == latest_accept => {
                        self.host.set_busy(false);
                        if change != latest_change {
                            trace!(field = validator.field().name(), "accept superseded by new input");
                        } else if done.outcome.is_valid() {
                            return Ok(Input::Value(accepted));
                        } else {
                            self.host.set_validation_message(done.outcome.message());
                        }
                    }
                    _ => trace!(id = done.id, field = validator.field().name(), "dropped stale validation"),
                },
            }
        }
    }
}
