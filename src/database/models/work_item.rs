use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Board column a work item sits in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum WorkItemState {
    #[default]
    ToDo,
    Doing,
    Done,
}

impl WorkItemState {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkItemState::ToDo => "ToDo",
            WorkItemState::Doing => "Doing",
            WorkItemState::Done => "Done",
        }
    }
}

impl fmt::Display for WorkItemState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown work item state: {0}")]
pub struct ParseStateError(pub String);

impl FromStr for WorkItemState {
    type Err = ParseStateError;

    /// Case-insensitive; also accepts the numeric form 0/1/2.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "todo" | "0" => Ok(WorkItemState::ToDo),
            "doing" | "1" => Ok(WorkItemState::Doing),
            "done" | "2" => Ok(WorkItemState::Done),
            _ => Err(ParseStateError(s.to_string())),
        }
    }
}

/// A unit of work in a project, optionally scheduled into one of its sprints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkItem {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub state: WorkItemState,
    pub index: i32,
    pub project_id: i32,
    pub sprint_id: Option<i32>,
    pub assigned_user_ids: Vec<i32>,
    pub tag_ids: Vec<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_parses_names_and_numbers() {
        assert_eq!("ToDo".parse::<WorkItemState>(), Ok(WorkItemState::ToDo));
        assert_eq!("doing".parse::<WorkItemState>(), Ok(WorkItemState::Doing));
        assert_eq!("2".parse::<WorkItemState>(), Ok(WorkItemState::Done));
        assert!("blocked".parse::<WorkItemState>().is_err());
    }

    #[test]
    fn state_serializes_as_variant_name() {
        let json = serde_json::to_string(&WorkItemState::Doing).unwrap();
        assert_eq!(json, "\"Doing\"");
        assert_eq!(WorkItemState::default(), WorkItemState::ToDo);
    }
}
