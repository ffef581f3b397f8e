//! Advisory proposals
//!
//! Advisory sources answer in loosely structured JSON. Everything is checked
//! here and turned into typed values before it can reach date arithmetic:
//! structural problems (not JSON, missing required field) are errors, while
//! per-entry problems (one bad date, one missing id) degrade to `None` so the
//! planners can substitute or drop that single entry.

use chrono::NaiveDate;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

use crate::domain::StepId;
use crate::domain::date::parse_day;
use crate::engine::{BusyPeriod, ProposedMove, StepDraft};

/// Title used when a step proposal has none
pub const DEFAULT_STEP_TITLE: &str = "Untitled";

/// Title used when a goal proposal has none
pub const DEFAULT_GOAL_TITLE: &str = "New goal";

/// Errors for advisory responses that cannot be used at all
#[derive(Debug, Error)]
pub enum ProposalError {
    #[error("advisory response is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("advisory response is not a JSON object")]
    NotAnObject,

    #[error("advisory response missing '{0}' field")]
    MissingField(&'static str),

    #[error("advisory field '{field}' must be {expected}")]
    WrongShape { field: &'static str, expected: &'static str },

    #[error("expected a {expected} proposal, got a {actual} proposal")]
    WrongKind { expected: &'static str, actual: &'static str },
}

/// Strip markdown wrapping from a model response
///
/// Drops a first line that reads only `json` and every line opening with a
/// code fence.
pub fn sanitize_response(text: &str) -> String {
    let mut lines: Vec<&str> = text.trim().lines().collect();
    if lines.first().is_some_and(|l| l.trim().eq_ignore_ascii_case("json")) {
        lines.remove(0);
    }
    lines
        .into_iter()
        .filter(|l| !l.trim_start().starts_with("```"))
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

/// Busy interval extracted from a user's request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusyPeriodProposal {
    pub busy_start: Option<NaiveDate>,
    pub busy_end: Option<NaiveDate>,
}

impl BusyPeriodProposal {
    /// Concrete busy period, defaulting to tomorrow when either bound is absent
    pub fn resolve(&self, today: NaiveDate) -> BusyPeriod {
        match (self.busy_start, self.busy_end) {
            (Some(start), Some(end)) => BusyPeriod::new(start, end),
            _ => {
                let tomorrow = today.succ_opt().unwrap_or(today);
                debug!(%tomorrow, "BusyPeriodProposal::resolve: incomplete bounds, using tomorrow");
                BusyPeriod::single_day(tomorrow)
            }
        }
    }
}

/// Goal title plus step drafts for a new goal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepListProposal {
    pub goal_title: String,
    pub steps: Vec<StepDraft>,
}

/// New dates for existing steps
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RescheduleProposal {
    pub updates: Vec<ProposedMove>,
}

/// Any validated advisory answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Proposal {
    BusyPeriod(BusyPeriodProposal),
    StepList(StepListProposal),
    Reschedule(RescheduleProposal),
}

impl Proposal {
    /// Sanitize, parse and validate a raw advisory response
    ///
    /// The kind is recognized from its fields: `updates` for a reschedule,
    /// `steps` or `goal_title` for a step list, `busy_start` or `busy_end` for
    /// a busy period.
    pub fn parse(raw: &str) -> Result<Self, ProposalError> {
        let cleaned = sanitize_response(raw);
        let value: Value = serde_json::from_str(&cleaned)?;
        let obj = value.as_object().ok_or(ProposalError::NotAnObject)?;

        let proposal = if obj.contains_key("updates") {
            Self::Reschedule(parse_reschedule(obj)?)
        } else if obj.contains_key("steps") || obj.contains_key("goal_title") {
            Self::StepList(parse_step_list(obj)?)
        } else if obj.contains_key("busy_start") || obj.contains_key("busy_end") {
            Self::BusyPeriod(parse_busy_period(obj))
        } else {
            return Err(ProposalError::MissingField("updates"));
        };

        debug!(kind = proposal.kind(), "Proposal::parse: parsed");
        Ok(proposal)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::BusyPeriod(_) => "busy-period",
            Self::StepList(_) => "step-list",
            Self::Reschedule(_) => "reschedule",
        }
    }

    pub fn into_busy_period(self) -> Result<BusyPeriodProposal, ProposalError> {
        match self {
            Self::BusyPeriod(p) => Ok(p),
            other => Err(other.wrong_kind("busy-period")),
        }
    }

    pub fn into_step_list(self) -> Result<StepListProposal, ProposalError> {
        match self {
            Self::StepList(p) => Ok(p),
            other => Err(other.wrong_kind("step-list")),
        }
    }

    pub fn into_reschedule(self) -> Result<RescheduleProposal, ProposalError> {
        match self {
            Self::Reschedule(p) => Ok(p),
            other => Err(other.wrong_kind("reschedule")),
        }
    }

    fn wrong_kind(&self, expected: &'static str) -> ProposalError {
        ProposalError::WrongKind {
            expected,
            actual: self.kind(),
        }
    }
}

fn date_field(obj: &Map<String, Value>, key: &str) -> Option<NaiveDate> {
    obj.get(key).and_then(Value::as_str).and_then(parse_day)
}

fn text_field(obj: &Map<String, Value>, key: &str) -> Option<String> {
    obj.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn parse_busy_period(obj: &Map<String, Value>) -> BusyPeriodProposal {
    BusyPeriodProposal {
        busy_start: date_field(obj, "busy_start"),
        busy_end: date_field(obj, "busy_end"),
    }
}

fn parse_step_list(obj: &Map<String, Value>) -> Result<StepListProposal, ProposalError> {
    if !obj.contains_key("goal_title") {
        return Err(ProposalError::MissingField("goal_title"));
    }
    let steps = obj
        .get("steps")
        .ok_or(ProposalError::MissingField("steps"))?
        .as_array()
        .ok_or(ProposalError::WrongShape {
            field: "steps",
            expected: "an array",
        })?;

    let drafts = steps
        .iter()
        .map(|entry| match entry.as_object() {
            Some(step) => StepDraft {
                title: text_field(step, "title").unwrap_or_else(|| DEFAULT_STEP_TITLE.to_string()),
                description: text_field(step, "description").unwrap_or_default(),
                date: date_field(step, "date"),
            },
            None => StepDraft::new(DEFAULT_STEP_TITLE, None),
        })
        .collect();

    Ok(StepListProposal {
        goal_title: text_field(obj, "goal_title").unwrap_or_else(|| DEFAULT_GOAL_TITLE.to_string()),
        steps: drafts,
    })
}

fn parse_reschedule(obj: &Map<String, Value>) -> Result<RescheduleProposal, ProposalError> {
    let updates = obj
        .get("updates")
        .ok_or(ProposalError::MissingField("updates"))?
        .as_array()
        .ok_or(ProposalError::WrongShape {
            field: "updates",
            expected: "an array",
        })?;

    let moves = updates
        .iter()
        .map(|entry| {
            let task_id = entry.get("task_id").and_then(|v| match v {
                Value::Number(n) => n.as_u64().map(StepId),
                Value::String(s) => s.parse().ok(),
                _ => None,
            });
            let date = entry.get("new_date").and_then(Value::as_str).and_then(parse_day);
            ProposedMove { task_id, date }
        })
        .collect();

    Ok(RescheduleProposal { updates: moves })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_sanitize_strips_fences_and_json_tag() {
        let raw = "```json\n{\"a\": 1}\n```";
        assert_eq!(sanitize_response(raw), "{\"a\": 1}");

        let raw = "json\n{\"a\": 1}";
        assert_eq!(sanitize_response(raw), "{\"a\": 1}");

        assert_eq!(sanitize_response("  {\"a\": 1}  "), "{\"a\": 1}");
    }

    #[test]
    fn test_parse_busy_period() {
        let p = Proposal::parse(r#"{"busy_start": "2025-04-01", "busy_end": "2025-04-20"}"#)
            .unwrap()
            .into_busy_period()
            .unwrap();
        let busy = p.resolve(d(2025, 3, 1));
        assert_eq!(busy, BusyPeriod::new(d(2025, 4, 1), d(2025, 4, 20)));
    }

    #[test]
    fn test_busy_period_nulls_fall_back_to_tomorrow() {
        let p = Proposal::parse(r#"{"busy_start": null, "busy_end": null}"#)
            .unwrap()
            .into_busy_period()
            .unwrap();
        assert_eq!(p.resolve(d(2025, 3, 1)), BusyPeriod::single_day(d(2025, 3, 2)));

        let half = BusyPeriodProposal {
            busy_start: Some(d(2025, 4, 1)),
            busy_end: None,
        };
        assert_eq!(half.resolve(d(2025, 3, 1)), BusyPeriod::single_day(d(2025, 3, 2)));
    }

    #[test]
    fn test_busy_period_reversed_bounds_are_swapped() {
        let p = BusyPeriodProposal {
            busy_start: Some(d(2025, 4, 20)),
            busy_end: Some(d(2025, 4, 1)),
        };
        let busy = p.resolve(d(2025, 3, 1));
        assert_eq!(busy.start(), d(2025, 4, 1));
        assert_eq!(busy.end(), d(2025, 4, 20));
    }

    #[test]
    fn test_parse_step_list_with_defaults() {
        let raw = r#"```json
{
  "goal_title": "Dream house",
  "steps": [
    {"title": "Find a plot", "description": "Look around", "date": "2025-03-25"},
    {"title": "", "date": "soon"},
    {"description": "no title", "date": "2025-04-01T09:00:00"},
    "garbage"
  ]
}
```"#;
        let p = Proposal::parse(raw).unwrap().into_step_list().unwrap();
        assert_eq!(p.goal_title, "Dream house");
        assert_eq!(p.steps.len(), 4);
        assert_eq!(p.steps[0].date, Some(d(2025, 3, 25)));
        assert_eq!(p.steps[0].description, "Look around");
        assert_eq!(p.steps[1].title, DEFAULT_STEP_TITLE);
        assert_eq!(p.steps[1].date, None);
        assert_eq!(p.steps[2].date, Some(d(2025, 4, 1)));
        assert_eq!(p.steps[3], StepDraft::new(DEFAULT_STEP_TITLE, None));
    }

    #[test]
    fn test_step_list_requires_both_fields() {
        let err = Proposal::parse(r#"{"goal_title": "x"}"#).unwrap_err();
        assert!(matches!(err, ProposalError::MissingField("steps")));

        let err = Proposal::parse(r#"{"steps": []}"#).unwrap_err();
        assert!(matches!(err, ProposalError::MissingField("goal_title")));

        let err = Proposal::parse(r#"{"goal_title": "x", "steps": {}}"#).unwrap_err();
        assert!(matches!(err, ProposalError::WrongShape { field: "steps", .. }));
    }

    #[test]
    fn test_blank_goal_title_defaults() {
        let p = Proposal::parse(r#"{"goal_title": " ", "steps": []}"#)
            .unwrap()
            .into_step_list()
            .unwrap();
        assert_eq!(p.goal_title, DEFAULT_GOAL_TITLE);
    }

    #[test]
    fn test_parse_reschedule_keeps_bad_entries_as_none() {
        let raw = r#"{"updates": [
            {"task_id": 1, "new_date": "2025-07-01"},
            {"task_id": "2", "new_date": "2025-07-02T00:00:00"},
            {"task_id": 3, "new_date": "tomorrow"},
            {"new_date": "2025-07-04"},
            {"task_id": -5, "new_date": "2025-07-05"}
        ]}"#;
        let p = Proposal::parse(raw).unwrap().into_reschedule().unwrap();
        assert_eq!(
            p.updates,
            vec![
                ProposedMove::new(StepId(1), d(2025, 7, 1)),
                ProposedMove::new(StepId(2), d(2025, 7, 2)),
                ProposedMove {
                    task_id: Some(StepId(3)),
                    date: None
                },
                ProposedMove {
                    task_id: None,
                    date: Some(d(2025, 7, 4))
                },
                ProposedMove {
                    task_id: None,
                    date: Some(d(2025, 7, 5))
                },
            ]
        );
    }

    #[test]
    fn test_reschedule_updates_must_be_array() {
        let err = Proposal::parse(r#"{"updates": "none"}"#).unwrap_err();
        assert!(matches!(err, ProposalError::WrongShape { field: "updates", .. }));
    }

    #[test]
    fn test_structural_errors() {
        assert!(matches!(Proposal::parse("not json"), Err(ProposalError::InvalidJson(_))));
        assert!(matches!(Proposal::parse("[1, 2]"), Err(ProposalError::NotAnObject)));
        assert!(matches!(
            Proposal::parse(r#"{"something": "else"}"#),
            Err(ProposalError::MissingField("updates"))
        ));
    }

    #[test]
    fn test_wrong_kind() {
        let err = Proposal::parse(r#"{"updates": []}"#)
            .unwrap()
            .into_step_list()
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "expected a step-list proposal, got a reschedule proposal"
        );
    }
}
