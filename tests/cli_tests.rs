// File: tests/cli_tests.rs
use paperplan::cli::{Command, GenerateArgs, SyncArgs, parse_args};
use std::path::PathBuf;

fn args(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

#[test]
fn no_arguments_generate_the_current_year() {
    assert_eq!(
        parse_args(&[]).unwrap(),
        Command::Generate(GenerateArgs::default())
    );
}

#[test]
fn generate_flags() {
    let parsed = parse_args(&args(&[
        "2027",
        "--month",
        "7",
        "--fixture",
        "data.json",
        "-o",
        "out",
        "--no-sync",
        "-v",
    ]))
    .unwrap();

    assert_eq!(
        parsed,
        Command::Generate(GenerateArgs {
            year: Some(2027),
            month: Some(7),
            root: None,
            fixture: Some(PathBuf::from("data.json")),
            output: Some(PathBuf::from("out")),
            no_sync: true,
            verbose: true,
        })
    );
}

#[test]
fn month_out_of_range_is_rejected() {
    let err = parse_args(&args(&["--month", "13"])).unwrap_err();
    assert!(err.to_string().contains("between 1 and 12"));
    assert!(parse_args(&args(&["-m", "july"])).is_err());
    assert!(parse_args(&args(&["--month"])).is_err());
}

#[test]
fn unknown_arguments_are_rejected() {
    assert!(parse_args(&args(&["--colour"])).is_err());
    assert!(parse_args(&args(&["2026", "2027"])).is_err());
    assert!(parse_args(&args(&["twenty"])).is_err());
}

#[test]
fn help_wins_anywhere() {
    assert_eq!(parse_args(&args(&["--help"])).unwrap(), Command::Help);
    assert_eq!(parse_args(&args(&["2026", "-h"])).unwrap(), Command::Help);
    assert_eq!(parse_args(&args(&["sync", "help"])).unwrap(), Command::Help);
}

#[test]
fn sync_with_positional_path() {
    let parsed = parse_args(&args(&["sync", "planner_2026", "--folder", "2026", "--new"])).unwrap();
    assert_eq!(
        parsed,
        Command::Sync(SyncArgs {
            path: PathBuf::from("planner_2026"),
            folder: Some("2026".to_string()),
            new: true,
            fail_on_error: false,
            root: None,
            verbose: false,
        })
    );
}

#[test]
fn sync_with_path_flag() {
    let Command::Sync(parsed) = parse_args(&args(&[
        "sync",
        "--path",
        "2026_07_July.pdf",
        "--fail-on-error",
        "-r",
        "/tmp/pp",
    ]))
    .unwrap() else {
        panic!("expected the sync command");
    };
    assert_eq!(parsed.path, PathBuf::from("2026_07_July.pdf"));
    assert!(parsed.fail_on_error);
    assert_eq!(parsed.root, Some(PathBuf::from("/tmp/pp")));
}

#[test]
fn sync_needs_a_path() {
    let err = parse_args(&args(&["sync", "--new"])).unwrap_err();
    assert!(err.to_string().contains("needs a file or directory"));
}
