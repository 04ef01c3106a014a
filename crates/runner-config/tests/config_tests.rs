//! Integration tests for admin and repository configuration loading

use std::fs;
use std::path::{Path, PathBuf};

use pretty_assertions::assert_eq;
use rstest::rstest;
use runner_config::{
    AdminConfig, AllowedProjectsRules, Error, FieldError, RepoRunnerConfig, ValidationError,
};
use tempfile::TempDir;

fn write_config(temp: &TempDir, content: &str) -> PathBuf {
    let path = temp.path().join("gitlab_multi_group_runnerrc.yml");
    fs::write(&path, content).unwrap();
    path
}

fn validation_error(result: runner_config::Result<impl std::fmt::Debug>) -> ValidationError {
    match result {
        Err(Error::Validation(err)) => err,
        other => panic!("expected a validation error, got {:?}", other),
    }
}

const MINIMAL: &str = r#"
gitlab:
  url: https://gitlab.example.com
  auth_token: secret
runners:
  - ids: [5]
    config_repo:
      path: g/r
      branch: main
    allowed_projects_rules: {}
"#;

#[test]
fn test_load_minimal_config_applies_defaults() {
    let temp = TempDir::new().unwrap();
    let path = write_config(&temp, MINIMAL);

    let config = AdminConfig::load(&path).unwrap();

    assert!(config.general.disable_shared_runners);
    assert_eq!(config.gitlab.url, "https://gitlab.example.com");
    assert_eq!(config.gitlab.auth_token, "secret");
    assert_eq!(config.runners.len(), 1);
    assert_eq!(config.runners[0].ids, vec![5]);
    assert_eq!(config.runners[0].config_repo.path, "g/r");
    assert_eq!(config.runners[0].config_repo.branch, "main");
    assert_eq!(
        config.runners[0].allowed_projects_rules,
        AllowedProjectsRules::default()
    );
}

#[test]
fn test_explicit_general_section_is_kept() {
    let content = format!("general:\n  disable_shared_runners: false\n{}", MINIMAL);
    let config = AdminConfig::from_yaml_str(&content, None).unwrap();
    assert!(!config.general.disable_shared_runners);
}

#[test]
fn test_empty_general_section_still_defaults() {
    let content = format!("general: {{}}\n{}", MINIMAL);
    let config = AdminConfig::from_yaml_str(&content, None).unwrap();
    assert!(config.general.disable_shared_runners);
}

#[test]
fn test_one_member_of_is_parsed() {
    let content = MINIMAL.replace(
        "allowed_projects_rules: {}",
        "allowed_projects_rules:\n      one_member_of: [admins, alice]",
    );
    let config = AdminConfig::from_yaml_str(&content, None).unwrap();
    assert_eq!(
        config.runners[0].allowed_projects_rules.one_member_of,
        Some(vec!["admins".to_string(), "alice".to_string()])
    );
}

#[rstest]
#[case::missing_gitlab(
    "runners: []\n",
    vec![FieldError::new("gitlab", "required field")]
)]
#[case::missing_runners(
    "gitlab:\n  url: u\n  auth_token: t\n",
    vec![FieldError::new("runners", "required field")]
)]
#[case::string_runner_id(
    "gitlab:\n  url: u\n  auth_token: t\nrunners:\n  - ids: [\"5\"]\n    config_repo: {path: p, branch: b}\n    allowed_projects_rules: {}\n",
    vec![FieldError::new("runners[0].ids[0]", "must be of non-negative integer type")]
)]
#[case::negative_runner_id(
    "gitlab:\n  url: u\n  auth_token: t\nrunners:\n  - ids: [5, -1]\n    config_repo: {path: p, branch: b}\n    allowed_projects_rules: {}\n",
    vec![FieldError::new("runners[0].ids[1]", "must be of non-negative integer type")]
)]
#[case::missing_branch(
    "gitlab:\n  url: u\n  auth_token: t\nrunners:\n  - ids: [5]\n    config_repo: {path: p}\n    allowed_projects_rules: {}\n",
    vec![FieldError::new("runners[0].config_repo.branch", "required field")]
)]
#[case::missing_rules(
    "gitlab:\n  url: u\n  auth_token: t\nrunners:\n  - ids: [5]\n    config_repo: {path: p, branch: b}\n",
    vec![FieldError::new("runners[0].allowed_projects_rules", "required field")]
)]
#[case::bad_shared_runner_flag(
    "general:\n  disable_shared_runners: maybe\ngitlab:\n  url: u\n  auth_token: t\nrunners: []\n",
    vec![FieldError::new("general.disable_shared_runners", "must be of boolean type")]
)]
#[case::unknown_top_level_key(
    "gitlab:\n  url: u\n  auth_token: t\nrunners: []\nextra: true\n",
    vec![FieldError::new("extra", "unknown field")]
)]
fn test_invalid_admin_config(#[case] content: &str, #[case] expected: Vec<FieldError>) {
    let err = validation_error(AdminConfig::from_yaml_str(content, Some(Path::new("/etc/rc.yml"))));
    assert_eq!(err.path.as_deref(), Some(Path::new("/etc/rc.yml")));
    assert_eq!(err.errors, expected);
}

#[test]
fn test_load_reports_file_path_on_validation_failure() {
    let temp = TempDir::new().unwrap();
    let path = write_config(&temp, "runners: []\n");

    let err = validation_error(AdminConfig::load(&path));

    assert_eq!(err.path.as_deref(), Some(path.as_path()));
    assert!(err.to_string().contains(&path.display().to_string()));
}

#[test]
fn test_load_missing_file_is_io_error() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("does-not-exist.yml");

    match AdminConfig::load(&path) {
        Err(Error::Io { path: reported, .. }) => assert_eq!(reported, path),
        other => panic!("expected an I/O error, got {:?}", other),
    }
}

#[test]
fn test_find_grant_by_repository_path() {
    let content = format!(
        "{}  - ids: [7]\n    config_repo:\n      path: other/repo\n      branch: dev\n    allowed_projects_rules: {{}}\n",
        MINIMAL
    );
    let config = AdminConfig::from_yaml_str(&content, None).unwrap();

    assert_eq!(config.find_grant("other/repo").unwrap().ids, vec![7]);
    assert_eq!(config.find_grant("g/r").unwrap().ids, vec![5]);
    assert!(config.find_grant("unknown/repo").is_none());
}

#[test]
fn test_example_admin_config_round_trips() {
    let example = AdminConfig::example();
    let yaml = example.to_yaml().unwrap();
    assert_eq!(AdminConfig::from_yaml_str(&yaml, None).unwrap(), example);
}

#[rstest]
#[case::missing_runners("{}\n", "runners")]
#[case::missing_targets("runners:\n  - ids: [5]\n", "runners[0].groups_and_projects")]
#[case::integer_target(
    "runners:\n  - ids: [5]\n    groups_and_projects: [1]\n",
    "runners[0].groups_and_projects[0]"
)]
fn test_invalid_repo_config(#[case] content: &str, #[case] field: &str) {
    let err = validation_error(RepoRunnerConfig::parse(content));
    assert_eq!(err.path, None);
    assert_eq!(err.errors.len(), 1, "{:?}", err.errors);
    assert_eq!(err.errors[0].field, field);
    assert!(err.to_string().starts_with("Could not validate the configuration"));
}
