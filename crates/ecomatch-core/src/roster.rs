//! The volunteer roster and task list, loaded once from YAML.
//!
//! Users are the candidates for proximity matching; each task owns an
//! anchor. File order is preserved because it is the tie-break order when
//! two users sit at the same distance from a task.

use std::collections::HashSet;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::geo::Coordinate;
use crate::matcher::{find_matches, Anchor, Candidate, Match, RadiusPolicy};
use crate::ConfigError;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex"));

static TASK_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").expect("valid task id regex"));

#[derive(Debug, Deserialize)]
pub struct RosterFile {
    pub users: Vec<UserEntry>,
    #[serde(default)]
    pub tasks: Vec<TaskEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserEntry {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TaskEntry {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub radius_km: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RosterUser {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub coordinate: Coordinate,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub anchor: Anchor,
}

/// Validated, read-only roster.
#[derive(Debug, Clone, Default)]
pub struct Roster {
    users: Vec<RosterUser>,
    tasks: Vec<Task>,
}

impl Roster {
    #[must_use]
    pub fn users(&self) -> &[RosterUser] {
        &self.users
    }

    #[must_use]
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    #[must_use]
    pub fn task(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Every user as a match candidate, in file order.
    pub fn user_candidates(&self) -> impl Iterator<Item = Candidate<&RosterUser>> + '_ {
        self.users
            .iter()
            .map(|user| Candidate::new(user, user.coordinate))
    }

    /// Users within `anchor`, nearest first.
    #[must_use]
    pub fn matches_for_anchor(&self, anchor: &Anchor) -> Vec<Match<&RosterUser>> {
        find_matches(anchor, self.user_candidates())
    }

    /// Users within the named task's anchor, or `None` for an unknown task.
    #[must_use]
    pub fn matches_for_task(&self, task_id: &str) -> Option<Vec<Match<&RosterUser>>> {
        self.task(task_id)
            .map(|task| self.matches_for_anchor(&task.anchor))
    }
}

/// Load and validate the roster from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_roster(path: &Path, policy: RadiusPolicy) -> Result<Roster, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::RosterFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let roster = parse_roster(&content, policy)?;
    tracing::info!(
        path = %path.display(),
        users = roster.users.len(),
        tasks = roster.tasks.len(),
        "roster loaded"
    );
    Ok(roster)
}

/// Parse and validate roster YAML that is already in memory.
///
/// # Errors
///
/// Returns `ConfigError` if the YAML is malformed or fails validation.
pub fn parse_roster(content: &str, policy: RadiusPolicy) -> Result<Roster, ConfigError> {
    let file: RosterFile = serde_yaml::from_str(content)?;
    build_roster(file, policy)
}

fn build_roster(file: RosterFile, policy: RadiusPolicy) -> Result<Roster, ConfigError> {
    let mut seen_user_ids = HashSet::new();
    let mut users = Vec::with_capacity(file.users.len());

    for entry in file.users {
        if entry.name.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "user {} must have a non-empty name",
                entry.id
            )));
        }

        if !seen_user_ids.insert(entry.id) {
            return Err(ConfigError::Validation(format!(
                "duplicate user id: {}",
                entry.id
            )));
        }

        if !EMAIL_RE.is_match(entry.email.trim()) {
            return Err(ConfigError::Validation(format!(
                "user {} has invalid email '{}'",
                entry.id, entry.email
            )));
        }

        let coordinate = Coordinate::new(entry.latitude, entry.longitude).map_err(|e| {
            ConfigError::Validation(format!("user {} has invalid location: {e}", entry.id))
        })?;

        users.push(RosterUser {
            id: entry.id,
            name: entry.name.trim().to_string(),
            email: entry.email.trim().to_string(),
            coordinate,
        });
    }

    let mut seen_task_ids = HashSet::new();
    let mut tasks = Vec::with_capacity(file.tasks.len());

    for entry in file.tasks {
        if !TASK_ID_RE.is_match(&entry.id) {
            return Err(ConfigError::Validation(format!(
                "task id '{}' must be lowercase letters, digits and single dashes",
                entry.id
            )));
        }

        if !seen_task_ids.insert(entry.id.clone()) {
            return Err(ConfigError::Validation(format!(
                "duplicate task id: '{}'",
                entry.id
            )));
        }

        if entry.title.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "task '{}' must have a non-empty title",
                entry.id
            )));
        }

        let center = Coordinate::new(entry.latitude, entry.longitude).map_err(|e| {
            ConfigError::Validation(format!("task '{}' has invalid location: {e}", entry.id))
        })?;

        let anchor = Anchor::resolve(center, entry.radius_km, policy).map_err(|e| {
            ConfigError::Validation(format!("task '{}' has invalid radius: {e}", entry.id))
        })?;

        tasks.push(Task {
            id: entry.id,
            title: entry.title.trim().to_string(),
            description: entry.description,
            anchor,
        });
    }

    Ok(Roster { users, tasks })
}

#[cfg(test)]
#[path = "roster_test.rs"]
mod tests;
