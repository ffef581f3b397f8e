//! Planning assistant
//!
//! Glue between an advisory source and the scheduling engine. The advisor
//! proposes; the engine validates and corrects. Nothing here touches storage:
//! callers pass the current steps in and persist what comes back.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::advisory::{Advisor, AdvisoryError, FallbackAdvisor, ModelAdvisor};
use crate::config::Config;
use crate::domain::Step;
use crate::engine::{BusyPeriod, EngineConfig, PlacedStep, PlacementPlanner, ReflowOutcome, ReflowPlanner, build_load_index};
use crate::llm;

/// Errors from assistant operations
#[derive(Debug, Error)]
pub enum AssistantError {
    #[error("{0} must not be empty")]
    EmptyRequest(&'static str),

    #[error(transparent)]
    Advisory(#[from] AdvisoryError),
}

/// A new goal with placed steps, ready to persist
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GoalPlan {
    pub title: String,
    pub steps: Vec<PlacedStep>,
}

/// Busy period that was understood, plus what the engine made of it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RescheduleReport {
    pub busy: BusyPeriod,
    pub outcome: ReflowOutcome,
}

/// Turns free-text requests into validated schedule changes
pub struct Assistant {
    advisor: Arc<dyn Advisor>,
    engine: EngineConfig,
}

impl Assistant {
    pub fn new(advisor: Arc<dyn Advisor>, engine: EngineConfig) -> Self {
        debug!(advisor = advisor.name(), ?engine, "Assistant::new: called");
        Self { advisor, engine }
    }

    /// Model-backed assistant when an API key is available, rule-based otherwise
    pub fn from_config(config: &Config) -> Self {
        let advisor: Arc<dyn Advisor> = match llm::create_client(&config.llm) {
            Ok(client) => Arc::new(ModelAdvisor::new(client, config.engine.clone(), config.llm.max_tokens)),
            Err(e) => {
                warn!(error = %e, "Assistant::from_config: language model unavailable, using fallback advisor");
                Arc::new(FallbackAdvisor)
            }
        };
        Self::new(advisor, config.engine.clone())
    }

    pub fn advisor_name(&self) -> &'static str {
        self.advisor.name()
    }

    /// Propose a goal for `request` and place its steps against `steps`
    ///
    /// `steps` is every existing step of the user, across all goals.
    pub async fn generate_goal(
        &self,
        request: &str,
        steps: &[Step],
        today: NaiveDate,
    ) -> Result<GoalPlan, AssistantError> {
        let request = request.trim();
        if request.is_empty() {
            return Err(AssistantError::EmptyRequest("goal request"));
        }

        let load = build_load_index(steps);
        let proposal = self.advisor.step_list(request, &load, today).await?;

        let placed = PlacementPlanner::new(self.engine.clone()).place(&proposal.steps, &load, today);
        info!(
            title = %proposal.goal_title,
            steps = placed.len(),
            advisor = self.advisor.name(),
            "Assistant::generate_goal: planned"
        );

        Ok(GoalPlan {
            title: proposal.goal_title,
            steps: placed,
        })
    }

    /// Understand `problem` as a busy period and move the affected steps out of it
    ///
    /// The advisor is not asked for moves when no step is affected.
    pub async fn reschedule(
        &self,
        problem: &str,
        steps: &[Step],
        today: NaiveDate,
    ) -> Result<RescheduleReport, AssistantError> {
        let problem = problem.trim();
        if problem.is_empty() {
            return Err(AssistantError::EmptyRequest("problem description"));
        }

        let busy = self.advisor.busy_period(problem, today).await;
        self.reschedule_within(busy, steps, today).await
    }

    /// Move the steps affected by an already known busy period out of it
    pub async fn reschedule_within(
        &self,
        busy: BusyPeriod,
        steps: &[Step],
        today: NaiveDate,
    ) -> Result<RescheduleReport, AssistantError> {
        let planner = ReflowPlanner::new(self.engine.clone());

        let tasks = planner.candidates(steps, &busy);
        if tasks.is_empty() {
            info!(%busy, "Assistant::reschedule_within: nothing to reschedule");
            return Ok(RescheduleReport {
                busy,
                outcome: ReflowOutcome::NothingToReschedule { from: busy.start() },
            });
        }

        let proposal = self.advisor.reschedule(&tasks, &busy, today).await?;
        let outcome = planner.plan(steps, &busy, &proposal.updates);
        info!(%busy, moved = outcome.assignments().len(), "Assistant::reschedule_within: planned");

        Ok(RescheduleReport { busy, outcome })
    }
}
