//! Language-model advisory source

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use tracing::{debug, info, warn};

use super::prompts::{busy_period_prompt, goal_prompt, reschedule_prompt};
use super::proposal::{Proposal, RescheduleProposal, StepListProposal};
use super::{Advisor, AdvisoryError};
use crate::engine::{BusyPeriod, DayLoad, EngineConfig, ScheduledTask};
use crate::llm::{CompletionRequest, LlmClient, Message};

const SYSTEM_PROMPT: &str = "You are a planning assistant. You answer with a single JSON object and nothing else.";

/// Advisor backed by an `LlmClient`
pub struct ModelAdvisor {
    llm: Arc<dyn LlmClient>,
    engine: EngineConfig,
    max_tokens: u32,
}

impl ModelAdvisor {
    pub fn new(llm: Arc<dyn LlmClient>, engine: EngineConfig, max_tokens: u32) -> Self {
        Self {
            llm,
            engine,
            max_tokens,
        }
    }

    /// Send one prompt and parse the answer into a proposal
    async fn ask(&self, prompt: String) -> Result<Proposal, AdvisoryError> {
        let mut request = CompletionRequest::system(SYSTEM_PROMPT, self.max_tokens);
        request.messages.push(Message::user(prompt));

        let response = self.llm.complete(request).await?;
        debug!(tokens = response.usage.total(), "ModelAdvisor::ask: response received");

        let raw = response
            .content
            .filter(|c| !c.trim().is_empty())
            .ok_or(AdvisoryError::EmptyResponse)?;

        let proposal = Proposal::parse(&raw)
            .inspect_err(|e| debug!(error = %e, %raw, "ModelAdvisor::ask: unusable response"))?;
        Ok(proposal)
    }
}

#[async_trait]
impl Advisor for ModelAdvisor {
    fn name(&self) -> &'static str {
        "model"
    }

    async fn busy_period(&self, problem: &str, today: NaiveDate) -> BusyPeriod {
        let tomorrow = BusyPeriod::single_day(today.succ_opt().unwrap_or(today));
        let proposal = match self.ask(busy_period_prompt(problem, today)).await {
            Ok(p) => p.into_busy_period(),
            Err(e) => {
                warn!(error = %e, "ModelAdvisor::busy_period: no usable answer, assuming tomorrow");
                return tomorrow;
            }
        };

        match proposal {
            Ok(p) => {
                let busy = p.resolve(today);
                info!(%busy, "ModelAdvisor::busy_period: extracted");
                busy
            }
            Err(e) => {
                warn!(error = %e, "ModelAdvisor::busy_period: wrong answer kind, assuming tomorrow");
                tomorrow
            }
        }
    }

    async fn step_list(
        &self,
        request: &str,
        load: &DayLoad,
        today: NaiveDate,
    ) -> Result<StepListProposal, AdvisoryError> {
        let entries = load.entries(Some(today));
        let prompt = goal_prompt(request, &entries, today, self.engine.max_tasks_per_day);
        let list = self.ask(prompt).await?.into_step_list()?;
        info!(title = %list.goal_title, steps = list.steps.len(), "ModelAdvisor::step_list: proposed");
        Ok(list)
    }

    async fn reschedule(
        &self,
        tasks: &[ScheduledTask],
        busy: &BusyPeriod,
        today: NaiveDate,
    ) -> Result<RescheduleProposal, AdvisoryError> {
        let prompt = reschedule_prompt(tasks, busy, today, self.engine.single_day_window_days);
        let proposal = self.ask(prompt).await?.into_reschedule()?;
        info!(%busy, updates = proposal.updates.len(), "ModelAdvisor::reschedule: proposed");
        Ok(proposal)
    }
}
