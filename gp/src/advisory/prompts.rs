//! Prompt rendering for the language-model advisory source
//!
//! Every prompt states "today" explicitly; the model has no other notion of
//! the current date.

use chrono::{Days, NaiveDate};

use crate::engine::{BusyPeriod, DayLoadEntry, ReflowMode, ScheduledTask};

const UPDATES_FORMAT: &str = r#"Return ONLY JSON in this format:
{
  "updates": [
    { "task_id": 123, "new_date": "YYYY-MM-DD" }
  ]
}
No comments."#;

/// Prompt asking the model to pull a busy interval out of free text
pub fn busy_period_prompt(problem: &str, today: NaiveDate) -> String {
    format!(
        r#"NOTE: Today is {today}.
Analyze the following request and extract the dates the user is busy, as JSON:
{{"busy_start": "YYYY-MM-DD", "busy_end": "YYYY-MM-DD"}}
For a single busy day use the same date for both fields.
If the request contains no dates, return null for both.
Request: {problem}"#
    )
}

/// Prompt asking the model to move candidate tasks out of a busy period
pub fn reschedule_prompt(tasks: &[ScheduledTask], busy: &BusyPeriod, today: NaiveDate, window_days: u32) -> String {
    let listing = serde_json::to_string_pretty(tasks).unwrap_or_else(|_| "[]".to_string());
    let start = busy.start();

    match busy.mode() {
        ReflowMode::SingleDay => {
            let last = start
                .checked_add_days(Days::new(u64::from(window_days.saturating_sub(1))))
                .unwrap_or(start);
            format!(
                r#"NOTE: Today is {today}.
The user has the following tasks scheduled between {start} and {last}:
{listing}

The user is busy on {start} (a single day).
Requirements:
1) Every task scheduled on {start} must move to the nearest following free days.
   You may look at the tasks in the following days to choose the best free day.
2) If a new date coincides with an existing task, move it forward to the first free day.
3) {UPDATES_FORMAT}"#
            )
        }
        ReflowMode::Range => {
            let end = busy.end();
            let duration = busy.duration_days();
            format!(
                r#"NOTE: Today is {today}.
The user has the following tasks, starting from {start}:
{listing}

The user is busy from {start} to {end} inclusive.
Requirements:
1) No task may remain inside the period [{start}..{end}].
2) Always move tasks out of the period [{start}..{end}] to later dates.
3) Keep the gaps between tasks (if two tasks were 5 days apart, keep them 5 days apart).
4) The busy period lasts {duration} days; shifting by a single day is not enough. Free the whole period.
5) If a new date coincides with an existing task, move it forward until the day is free.
6) {UPDATES_FORMAT}"#
            )
        }
    }
}

/// Prompt asking the model to break a request into dated steps
pub fn goal_prompt(request: &str, load: &[DayLoadEntry], today: NaiveDate, max_per_day: usize) -> String {
    let listing = serde_json::to_string_pretty(load).unwrap_or_else(|_| "[]".to_string());
    format!(
        r#"NOTE: Today is {today}.
You are an assistant that breaks a user's goal into dated steps.

The user already has tasks on some dates. Here is the list (date and number of tasks):
{listing}

Your job:
1) Produce a new goal with a "goal_title" field: at most three words summarizing the request.
2) Produce a "steps" array; each step has "title", "description" and "date".
3) Break the goal down in detail; use more steps when it helps guide the user.
4) If a day already has {max_per_day} or more tasks, avoid it and pick a less loaded day.
5) If a date has a task and nearby days are empty, put the new step on an empty day.
6) Order steps logically with reasonable gaps; never pack steps onto consecutive days when spreading them out is possible.
7) Try to avoid weekends.
8) Every step must be dated on or after today.
9) Date format: YYYY-MM-DD.
10) Return STRICTLY JSON in this structure, with no explanations:

{{
  "goal_title": "Example goal",
  "steps": [
    {{ "title": "Step one", "description": "Step description", "date": "{example}" }}
  ]
}}

The user's request:
{request}"#,
        example = today.succ_opt().unwrap_or(today),
    )
}
