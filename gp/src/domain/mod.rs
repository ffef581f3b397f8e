//! Domain types for the goal planner
//!
//! A user owns Goals; each Goal is decomposed into Steps. Steps optionally
//! carry a date, and only dated steps count toward a day's load.

pub mod date;
mod goal;
mod id;
mod step;

pub use goal::Goal;
pub use id::{GoalId, StepId};
pub use step::{Step, StepStatus};
