use std::io::Write;
use std::path::Path;

use super::*;
use crate::matcher::DEFAULT_RADIUS_KM;

const SAMPLE: &str = r"
users:
  - id: 1
    name: Priya Sharma
    email: priya@example.org
    latitude: 19.1136
    longitude: 72.8697
  - id: 2
    name: Rahul Mehta
    email: rahul@example.org
    latitude: 19.0596
    longitude: 72.8295
  - id: 3
    name: Ananya Iyer
    email: ananya@example.org
    latitude: 12.9352
    longitude: 77.6245
  - id: 5
    name: Sneha Kulkarni
    email: sneha@example.org
    latitude: 18.5204
    longitude: 73.8567
tasks:
  - id: versova-beach-cleanup
    title: Versova beach cleanup
    latitude: 19.1351
    longitude: 72.8146
    radius_km: 40
  - id: bellandur-lake-survey
    title: Bellandur lake survey
    latitude: 12.9716
    longitude: 77.5946
";

fn user_yaml(id: u64, name: &str, email: &str, lat: f64, lon: f64) -> String {
    format!(
        "users:\n  - id: {id}\n    name: \"{name}\"\n    email: \"{email}\"\n    latitude: {lat}\n    longitude: {lon}\n"
    )
}

fn fallback() -> RadiusPolicy {
    RadiusPolicy::Fallback(DEFAULT_RADIUS_KM)
}

#[test]
fn parses_users_and_tasks_in_file_order() {
    let roster = parse_roster(SAMPLE, fallback()).expect("valid roster");
    let ids: Vec<u64> = roster.users().iter().map(|u| u.id).collect();
    assert_eq!(ids, vec![1, 2, 3, 5]);
    assert_eq!(roster.tasks().len(), 2);
    assert_eq!(roster.tasks()[0].id, "versova-beach-cleanup");
}

#[test]
fn missing_task_radius_uses_fallback() {
    let roster = parse_roster(SAMPLE, fallback()).unwrap();
    let task = roster.task("bellandur-lake-survey").expect("task exists");
    assert!((task.anchor.radius_km() - DEFAULT_RADIUS_KM).abs() < f64::EPSILON);
}

#[test]
fn missing_task_radius_rejected_under_reject_policy() {
    let err = parse_roster(SAMPLE, RadiusPolicy::Reject).unwrap_err();
    assert!(
        err.to_string().contains("bellandur-lake-survey"),
        "unexpected error: {err}"
    );
}

#[test]
fn tasks_are_optional() {
    let yaml = user_yaml(9, "Solo", "solo@example.org", 10.0, 10.0);
    let roster = parse_roster(&yaml, RadiusPolicy::Reject).unwrap();
    assert_eq!(roster.users().len(), 1);
    assert!(roster.tasks().is_empty());
}

#[test]
fn matches_for_task_orders_nearest_first() {
    let roster = parse_roster(SAMPLE, fallback()).unwrap();
    let matches = roster
        .matches_for_task("versova-beach-cleanup")
        .expect("known task");
    let ids: Vec<u64> = matches.iter().map(|m| m.identity.id).collect();
    assert_eq!(ids, vec![1, 2]);
    assert!((matches[0].distance_km - 6.3).abs() < 1e-9);
    assert!((matches[1].distance_km - 8.5).abs() < 1e-9);
}

#[test]
fn matches_for_unknown_task_is_none() {
    let roster = parse_roster(SAMPLE, fallback()).unwrap();
    assert!(roster.matches_for_task("no-such-task").is_none());
}

#[test]
fn empty_roster_has_no_matches() {
    let roster = parse_roster("users: []\n", RadiusPolicy::Reject).unwrap();
    let anchor = Anchor::new(Coordinate::new(0.0, 0.0).unwrap(), 100.0).unwrap();
    assert!(roster.matches_for_anchor(&anchor).is_empty());
}

#[test]
fn validate_rejects_empty_name() {
    let yaml = user_yaml(1, "  ", "a@example.org", 0.0, 0.0);
    let err = parse_roster(&yaml, RadiusPolicy::Reject).unwrap_err();
    assert!(err.to_string().contains("non-empty name"));
}

#[test]
fn validate_rejects_bad_email() {
    let yaml = user_yaml(1, "Name", "not-an-email", 0.0, 0.0);
    let err = parse_roster(&yaml, RadiusPolicy::Reject).unwrap_err();
    assert!(err.to_string().contains("invalid email"));
}

#[test]
fn validate_rejects_out_of_range_latitude() {
    let yaml = user_yaml(1, "Name", "a@example.org", 95.0, 0.0);
    let err = parse_roster(&yaml, RadiusPolicy::Reject).unwrap_err();
    assert!(matches!(err, ConfigError::Validation(ref m) if m.contains("latitude")));
}

#[test]
fn validate_rejects_duplicate_user_id() {
    let yaml = "users:
  - { id: 4, name: A, email: a@example.org, latitude: 0, longitude: 0 }
  - { id: 4, name: B, email: b@example.org, latitude: 1, longitude: 1 }
";
    let err = parse_roster(yaml, RadiusPolicy::Reject).unwrap_err();
    assert!(err.to_string().contains("duplicate user id: 4"));
}

#[test]
fn validate_rejects_duplicate_task_id() {
    let yaml = "users: []
tasks:
  - { id: cleanup, title: One, latitude: 0, longitude: 0, radius_km: 5 }
  - { id: cleanup, title: Two, latitude: 1, longitude: 1, radius_km: 5 }
";
    let err = parse_roster(yaml, RadiusPolicy::Reject).unwrap_err();
    assert!(err.to_string().contains("duplicate task id"));
}

#[test]
fn validate_rejects_non_slug_task_id() {
    let yaml = "users: []
tasks:
  - { id: Beach Cleanup, title: One, latitude: 0, longitude: 0, radius_km: 5 }
";
    let err = parse_roster(yaml, RadiusPolicy::Reject).unwrap_err();
    assert!(err.to_string().contains("Beach Cleanup"));
}

#[test]
fn validate_rejects_negative_task_radius_under_reject() {
    let yaml = "users: []
tasks:
  - { id: cleanup, title: One, latitude: 0, longitude: 0, radius_km: -2 }
";
    let err = parse_roster(yaml, RadiusPolicy::Reject).unwrap_err();
    assert!(err.to_string().contains("invalid radius"));
}

#[test]
fn malformed_yaml_is_parse_error() {
    let err = parse_roster("users: [", RadiusPolicy::Reject).unwrap_err();
    assert!(matches!(err, ConfigError::RosterFileParse(_)));
}

#[test]
fn load_roster_reads_file() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    file.write_all(SAMPLE.as_bytes()).expect("write roster");
    let roster = load_roster(file.path(), fallback()).expect("load roster");
    assert_eq!(roster.users().len(), 4);
}

#[test]
fn load_roster_missing_file_is_io_error() {
    let err = load_roster(Path::new("/nonexistent/roster.yaml"), fallback()).unwrap_err();
    assert!(matches!(err, ConfigError::RosterFileIo { ref path, .. } if path.contains("roster.yaml")));
}

#[test]
fn shipped_roster_is_valid() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../config/roster.yaml");
    let roster = load_roster(&path, RadiusPolicy::Reject).expect("shipped roster loads");
    assert!(!roster.users().is_empty());
    assert!(roster.task("versova-beach-cleanup").is_some());
}
