// src/steps.rs
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::time::Duration;

use crate::config::{CommitType, Commitrc};
use crate::flow::{
    Button, Flow, FlowOutcome, Input, InputPrompt, NoResume, Pick, PickItem, PickPrompt, Resume,
    StepError, StepHandler, StepInfo, UiHost,
};
use crate::validate::{Field, Validator};

pub const TOTAL_STEPS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitStep {
    Type,
    Scope,
    Subject,
    Body,
    Footer,
}

impl CommitStep {
    pub fn number(&self) -> usize {
        match self {
            CommitStep::Type => 1,
            CommitStep::Scope => 2,
            CommitStep::Subject => 3,
            CommitStep::Body => 4,
            CommitStep::Footer => 5,
        }
    }

    fn field(&self) -> Option<Field> {
        match self {
            CommitStep::Type => None,
            CommitStep::Scope => Some(Field::Scope),
            CommitStep::Subject => Some(Field::Subject),
            CommitStep::Body => Some(Field::Body),
            CommitStep::Footer => Some(Field::Footer),
        }
    }

    fn following(&self) -> Option<CommitStep> {
        match self {
            CommitStep::Type => Some(CommitStep::Scope),
            CommitStep::Scope => Some(CommitStep::Subject),
            CommitStep::Subject => Some(CommitStep::Body),
            CommitStep::Body => Some(CommitStep::Footer),
            CommitStep::Footer => None,
        }
    }
}

/// Answers collected so far. A skipped body stays `None`.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CommitState {
    pub commit_type: Option<CommitType>,
    pub scope: Option<String>,
    pub subject: Option<String>,
    pub body: Option<String>,
    pub footer: Option<String>,
}

impl CommitState {
    fn slot(&mut self, field: Field) -> &mut Option<String> {
        match field {
            Field::Scope => &mut self.scope,
            Field::Subject => &mut self.subject,
            Field::Body => &mut self.body,
            Field::Footer => &mut self.footer,
        }
    }
}

pub struct CommitSteps<'c> {
    config: &'c Commitrc,
    delay: Duration,
}

impl<'c> CommitSteps<'c> {
    pub fn new(config: &'c Commitrc, delay: Duration) -> Self {
        Self { config, delay }
    }

    fn info(&self, step: CommitStep) -> StepInfo {
        StepInfo {
            title: self.config.title_for(step.field()),
            step: step.number(),
            total_steps: TOTAL_STEPS,
            ignore_focus_out: self.config.ignore_focus_out,
        }
    }

    async fn pick_type(&self, flow: &mut Flow<'_>, state: &mut CommitState) -> Result<(), StepError> {
        let types = self.config.visible_types();
        if types.is_empty() {
            return Err(anyhow!("No commit types are configured. Check the `types` list.").into());
        }

        let active = state
            .commit_type
            .as_ref()
            .and_then(|chosen| types.iter().position(|t| t.label == chosen.label));
        let items = types
            .iter()
            .map(|t| PickItem {
                label: t.label.clone(),
                detail: Some(t.detail.clone()).filter(|d| !d.is_empty()),
            })
            .collect();

        let prompt = PickPrompt {
            info: self.info(CommitStep::Type),
            placeholder: self.config.placeholder_for(None),
            items,
            active,
            buttons: Vec::new(),
        };

        match flow.show_pick(prompt).await? {
            Pick::Item(index) => state.commit_type = Some(types[index].clone()),
            Pick::Button(button) => return Err(anyhow!("Unexpected button: {}", button.tooltip()).into()),
        }
        Ok(())
    }

    async fn input_text(
        &self,
        step: CommitStep,
        field: Field,
        flow: &mut Flow<'_>,
        state: &mut CommitState,
    ) -> Result<(), StepError> {
        let buttons = if step == CommitStep::Body { vec![Button::Skip] } else { Vec::new() };
        let prompt = InputPrompt {
            info: self.info(step),
            placeholder: self.config.placeholder_for(Some(field)),
            value: state.slot(field).clone().unwrap_or_default(),
            buttons,
        };
        let validator = Validator::new(field, self.config.rules.field(field), self.delay);

        match flow.show_input(prompt, &validator).await? {
            Input::Value(text) => *state.slot(field) = Some(text),
            Input::Button(Button::Skip) => *state.slot(field) = None,
            Input::Button(button) => return Err(anyhow!("Unexpected button: {}", button.tooltip()).into()),
        }
        Ok(())
    }
}

#[async_trait]
impl<'c> StepHandler for CommitSteps<'c> {
    type Step = CommitStep;
    type State = CommitState;

    async fn run_step(
        &self,
        step: CommitStep,
        flow: &mut Flow<'_>,
        state: &mut CommitState,
    ) -> Result<Option<CommitStep>, StepError> {
        match step.field() {
            None => self.pick_type(flow, state).await?,
            Some(field) => self.input_text(step, field, flow, state).await?,
        }
        Ok(step.following())
    }
}

/// Run the whole type → footer sequence on `host`.
pub async fn collect(
    config: &Commitrc,
    delay: Duration,
    host: &mut dyn UiHost,
    resume: Option<&dyn Resume>,
) -> Result<FlowOutcome<CommitState>> {
    let steps = CommitSteps::new(config, delay);
    let resume = resume.unwrap_or(&NoResume);
    let mut flow = Flow::new(host, resume);
    flow.run(&steps, CommitStep::Type, CommitState::default()).await
}
