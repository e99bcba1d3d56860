use std::fmt::Write as _;

use ecomatch_core::{Match, RosterUser, Task};
use serde::Serialize;

#[derive(Debug, Serialize)]
struct MatchRow<'a> {
    id: u64,
    name: &'a str,
    email: &'a str,
    distance_km: f64,
}

pub(crate) fn render_matches(matches: &[Match<&RosterUser>]) -> String {
    if matches.is_empty() {
        return "no users found within radius\n".to_string();
    }

    let mut out = format!(
        "{:>6}  {:<24}  {:<32}  {:>10}\n",
        "id", "name", "email", "distance"
    );
    for m in matches {
        let _ = writeln!(
            out,
            "{:>6}  {:<24}  {:<32}  {:>7.1} km",
            m.identity.id, m.identity.name, m.identity.email, m.distance_km
        );
    }
    out
}

pub(crate) fn matches_json(matches: &[Match<&RosterUser>]) -> serde_json::Result<String> {
    let rows: Vec<MatchRow<'_>> = matches
        .iter()
        .map(|m| MatchRow {
            id: m.identity.id,
            name: &m.identity.name,
            email: &m.identity.email,
            distance_km: m.distance_km,
        })
        .collect();
    serde_json::to_string_pretty(&rows)
}

pub(crate) fn render_tasks(tasks: &[Task]) -> String {
    if tasks.is_empty() {
        return "no tasks defined\n".to_string();
    }

    let mut out = String::new();
    for task in tasks {
        let _ = writeln!(
            out,
            "{:<32}  {}  within {:.1} km  {}",
            task.id,
            task.anchor.center(),
            task.anchor.radius_km(),
            task.title
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use ecomatch_core::{Anchor, Coordinate};

    fn user() -> RosterUser {
        RosterUser {
            id: 3,
            name: "Ananya Iyer".to_string(),
            email: "ananya@example.org".to_string(),
            coordinate: Coordinate::new(12.9352, 77.6245).unwrap(),
        }
    }

    #[test]
    fn empty_matches_say_so() {
        assert_eq!(render_matches(&[]), "no users found within radius\n");
    }

    #[test]
    fn match_table_has_header_and_row() {
        let u = user();
        let rendered = render_matches(&[Match {
            identity: &u,
            distance_km: 5.2,
        }]);
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("distance"));
        assert!(lines[1].contains("Ananya Iyer"));
        assert!(lines[1].ends_with("5.2 km"));
    }

    #[test]
    fn match_json_lists_rows_in_order() {
        let u = user();
        let json = matches_json(&[Match {
            identity: &u,
            distance_km: 5.2,
        }])
        .unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed[0]["id"], 3);
        assert_eq!(parsed[0]["distance_km"], 5.2);
    }

    #[test]
    fn task_listing_shows_radius() {
        let task = Task {
            id: "bellandur-lake-survey".to_string(),
            title: "Bellandur lake survey".to_string(),
            description: None,
            anchor: Anchor::new(Coordinate::new(12.9716, 77.5946).unwrap(), 35.0).unwrap(),
        };
        let rendered = render_tasks(&[task]);
        assert!(rendered.contains("within 35.0 km"));
        assert!(rendered.contains("(12.9716, 77.5946)"));
    }
}
