// File: tests/config_tests.rs
use paperplan::PlannerError;
use paperplan::config::{Config, DeviceConfig, SshConfig};
use paperplan::context::{AppContext, TestContext};
use paperplan::planner::PlannerOptions;
use std::fs;
use std::path::PathBuf;

#[test]
fn missing_config_is_detected() {
    let ctx = TestContext::new();
    let err = Config::load(&ctx).unwrap_err();
    assert!(Config::is_missing_config_error(&err));
}

#[test]
fn broken_config_is_not_missing() {
    let ctx = TestContext::new();
    fs::write(ctx.get_config_file_path().unwrap(), "notes_pages = \"many\"").unwrap();

    let err = Config::load(&ctx).unwrap_err();
    assert!(!Config::is_missing_config_error(&err));
    assert!(err.to_string().contains("Failed to parse config file"));
}

#[test]
fn partial_config_gets_defaults() {
    let ctx = TestContext::new();
    fs::write(
        ctx.get_config_file_path().unwrap(),
        r#"
todoist_token = "abc"

[layout]
week_grid_start = "06:00"

[device]
root = "/mnt/tablet"
"#,
    )
    .unwrap();

    let config = Config::load(&ctx).unwrap();
    assert_eq!(config.todoist_token, "abc");
    assert_eq!(config.primary_calendar, "primary");
    assert_eq!(config.headline_marker, "@headline");
    assert_eq!(config.notes_pages, 10);
    assert_eq!(config.layout.week_grid_rows, 38);
    assert_eq!(config.layout.week_grid_start, "06:00");

    let device = config.device.unwrap();
    assert_eq!(device.root, PathBuf::from("/mnt/tablet"));
    assert!(device.update_existing);
    assert!(!device.fail_on_error);
    assert_eq!(device.folder_for(2026), "2026 Planner");
    assert_eq!(device.ssh, None);
}

#[test]
fn ssh_device_needs_no_mount_point() {
    let ctx = TestContext::new();
    fs::write(
        ctx.get_config_file_path().unwrap(),
        r#"
[device.ssh]
password = "hunter2"
connect_retries = 5
"#,
    )
    .unwrap();

    let device = Config::load(&ctx).unwrap().device.unwrap();
    assert_eq!(device.root, PathBuf::new());
    let ssh = device.ssh.unwrap();
    assert_eq!(ssh.host, "10.11.99.1");
    assert_eq!(ssh.port, 22);
    assert_eq!(ssh.user, "root");
    assert_eq!(ssh.password.as_deref(), Some("hunter2"));
    assert_eq!(ssh.remote_dir, "/home/root/.local/share/remarkable/xochitl");
    assert_eq!(ssh.restart_command, "systemctl restart xochitl");
    assert_eq!(ssh.connect_retries, 5);
    assert_eq!(ssh.retry_delay().as_secs(), 2);
}

#[test]
fn save_then_load_round_trips() {
    let ctx = TestContext::new();
    let config = Config {
        todoist_token: "secret".to_string(),
        notes_pages: 4,
        device: Some(DeviceConfig {
            root: PathBuf::from("/mnt/tablet"),
            folder: "Planner {year}".to_string(),
            update_existing: false,
            fail_on_error: true,
            ssh: Some(SshConfig {
                host: "tablet.local".to_string(),
                key_file: Some(PathBuf::from("/home/me/.ssh/id_ed25519")),
                ..SshConfig::default()
            }),
        }),
        ..Config::default()
    };

    config.save(&ctx).unwrap();
    assert_eq!(Config::load(&ctx).unwrap(), config);
}

#[test]
fn token_and_output_paths_have_defaults() {
    let ctx = TestContext::new();
    let config = Config::default();

    assert_eq!(
        config.token_path(&ctx).unwrap(),
        ctx.get_data_dir().unwrap().join("token.json")
    );
    assert_eq!(config.output_dir_for(2026), PathBuf::from("planner_2026"));

    let custom = Config {
        google_token_file: Some(PathBuf::from("/etc/paperplan/token.json")),
        output_dir: Some(PathBuf::from("/tmp/out")),
        ..Config::default()
    };
    assert_eq!(
        custom.token_path(&ctx).unwrap(),
        PathBuf::from("/etc/paperplan/token.json")
    );
    assert_eq!(custom.output_dir_for(2026), PathBuf::from("/tmp/out"));
}

#[test]
fn planner_options_follow_layout_config() {
    let mut config = Config::default();
    config.layout.week_grid_start = "06:00".to_string();
    config.layout.week_grid_rows = 32;
    config.notes_pages = 2;

    let options = PlannerOptions::from_config(&config).unwrap();
    assert_eq!(options.week_grid.start_minute(), 360);
    assert_eq!(options.week_grid.rows(), 32);
    assert_eq!(options.week_grid.step_minutes(), 30);
    assert_eq!(options.day_grid.rows(), 18);
    assert_eq!(options.notes_pages, 2);

    assert_eq!(
        PlannerOptions::from_config(&Config::default()).unwrap(),
        PlannerOptions::default()
    );
}

#[test]
fn invalid_layout_is_a_config_error() {
    let mut config = Config::default();
    config.layout.week_grid_start = "6am".to_string();
    assert!(matches!(
        PlannerOptions::from_config(&config),
        Err(PlannerError::Config(_))
    ));

    let mut config = Config::default();
    config.layout.day_start_hour = 20;
    config.layout.day_end_hour = 8;
    assert!(matches!(
        PlannerOptions::from_config(&config),
        Err(PlannerError::Config(_))
    ));
}

#[test]
fn week_grid_must_fit_in_one_day() {
    let with_grid = |rows: u32, step: u32| {
        let mut config = Config::default();
        config.layout.week_grid_start = "06:00".to_string();
        config.layout.week_grid_rows = rows;
        config.layout.week_grid_step_minutes = step;
        PlannerOptions::from_config(&config)
    };

    for (rows, step) in [(u32::MAX, 30), (0, 30), (10, 0), (37, 30), (2, u32::MAX)] {
        assert!(
            matches!(with_grid(rows, step), Err(PlannerError::Config(_))),
            "{} rows of {} minutes",
            rows,
            step
        );
    }

    let options = with_grid(36, 30).unwrap();
    assert_eq!(options.week_grid.end_minute(), 24 * 60);
}
