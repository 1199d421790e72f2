// File: tests/ssh_tests.rs
use paperplan::PlannerError;
use paperplan::PlannerResult;
use paperplan::config::SshConfig;
use paperplan::context::TestContext;
use paperplan::sync::metadata::EntryType;
use paperplan::sync::{
    DeviceLibrary, DeviceTransport, RemoteSession, SessionConnector, SshTransport, UploadOutcome,
};
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::fs;

const LIBRARY: &str = "/home/root/.local/share/remarkable/xochitl";

/// In-memory device: a flat map of remote paths plus a command log.
#[derive(Default)]
struct FakeDevice {
    files: RefCell<BTreeMap<String, Vec<u8>>>,
    commands: RefCell<Vec<String>>,
    exit_status: Cell<i32>,
}

impl RemoteSession for FakeDevice {
    fn list_dir(&self, dir: &str) -> PlannerResult<Vec<String>> {
        let prefix = format!("{}/", dir);
        Ok(self
            .files
            .borrow()
            .keys()
            .filter_map(|path| path.strip_prefix(&prefix))
            .map(str::to_string)
            .collect())
    }

    fn read_file(&self, path: &str) -> PlannerResult<Option<Vec<u8>>> {
        Ok(self.files.borrow().get(path).cloned())
    }

    fn write_file(&self, path: &str, contents: &[u8]) -> PlannerResult<()> {
        self.files.borrow_mut().insert(path.to_string(), contents.to_vec());
        Ok(())
    }

    fn rename(&self, from: &str, to: &str) -> PlannerResult<()> {
        let mut files = self.files.borrow_mut();
        let contents = files
            .remove(from)
            .ok_or_else(|| PlannerError::Sync(format!("no such file {}", from)))?;
        files.insert(to.to_string(), contents);
        Ok(())
    }

    fn exec(&self, command: &str) -> PlannerResult<i32> {
        self.commands.borrow_mut().push(command.to_string());
        Ok(self.exit_status.get())
    }
}

/// Fails the first `failures` attempts.
struct FlakyConnector {
    failures: u32,
    attempts: Cell<u32>,
}

impl FlakyConnector {
    fn new(failures: u32) -> Self {
        Self {
            failures,
            attempts: Cell::new(0),
        }
    }
}

impl SessionConnector for FlakyConnector {
    type Session = FakeDevice;

    fn connect(&self, config: &SshConfig) -> PlannerResult<FakeDevice> {
        let attempt = self.attempts.get() + 1;
        self.attempts.set(attempt);
        if attempt <= self.failures {
            return Err(PlannerError::Sync(format!("{} unreachable", config.host)));
        }
        Ok(FakeDevice::default())
    }
}

fn config() -> SshConfig {
    SshConfig {
        retry_delay_secs: 0,
        ..SshConfig::default()
    }
}

fn connected() -> SshTransport<FakeDevice> {
    SshTransport::connect(&FlakyConnector::new(0), &config()).unwrap()
}

#[test]
fn connect_retries_until_the_device_answers() {
    let connector = FlakyConnector::new(2);
    assert!(SshTransport::connect(&connector, &config()).is_ok());
    assert_eq!(connector.attempts.get(), 3);
}

#[test]
fn connect_gives_up_after_three_attempts() {
    let connector = FlakyConnector::new(u32::MAX);
    let err = SshTransport::connect(&connector, &config()).err().unwrap();

    assert_eq!(connector.attempts.get(), 3);
    assert!(
        matches!(err, PlannerError::Sync(ref m) if m.contains("after 3 attempt(s)") && m.contains("10.11.99.1 unreachable")),
        "got {:?}",
        err
    );
}

#[test]
fn writes_land_in_the_remote_library_without_leftovers() {
    let transport = connected();
    transport.write("abc.metadata", b"{}").unwrap();
    transport.write("abc.metadata", b"{\"v\":2}").unwrap();

    let files = transport.session().files.borrow().clone();
    assert_eq!(files.len(), 1);
    assert_eq!(files[&format!("{}/abc.metadata", LIBRARY)], b"{\"v\":2}");
    assert_eq!(transport.list().unwrap(), vec!["abc.metadata".to_string()]);
    assert_eq!(transport.read("missing.pdf").unwrap(), None);
}

#[test]
fn remote_names_cannot_leave_the_library() {
    let transport = connected();
    assert!(transport.read("../etc/passwd").is_err());
    assert!(transport.write("a/b.pdf", b"x").is_err());
    assert!(transport.session().files.borrow().is_empty());
}

#[test]
fn library_uploads_and_updates_over_ssh() {
    let ctx = TestContext::new();
    let pdf = ctx.root.join("2026_07_July.pdf");
    fs::write(&pdf, b"v1").unwrap();

    let library = DeviceLibrary::new(connected());
    let folder = library.get_or_create_folder("2026 Planner", "").unwrap();
    let created = library.upload_file(&pdf, &folder, true).unwrap();
    assert!(matches!(created, UploadOutcome::Created { .. }));

    fs::write(&pdf, b"v2").unwrap();
    let updated = library.upload_file(&pdf, &folder, true).unwrap();
    assert_eq!(updated, UploadOutcome::Updated { id: created.id().to_string() });

    let files = library.transport().session().files.borrow().clone();
    assert_eq!(files[&format!("{}/{}.pdf", LIBRARY, created.id())], b"v2");
    assert!(files.keys().all(|k| !k.ends_with(".part")));

    let entries = library.entries().unwrap();
    assert_eq!(entries.len(), 2);
    assert!(entries.iter().any(|(id, m)| *id == folder && m.kind == EntryType::CollectionType));
}

#[test]
fn finishing_restarts_the_viewer() {
    let transport = connected();
    transport.finish().unwrap();
    assert_eq!(
        *transport.session().commands.borrow(),
        vec!["systemctl restart xochitl".to_string()]
    );

    transport.session().exit_status.set(1);
    let err = transport.finish().unwrap_err();
    assert!(matches!(err, PlannerError::Sync(ref m) if m.contains("status 1")));
}

#[test]
fn empty_restart_command_runs_nothing() {
    let config = SshConfig {
        restart_command: "  ".to_string(),
        ..config()
    };
    let transport = SshTransport::connect(&FlakyConnector::new(0), &config).unwrap();
    transport.finish().unwrap();
    assert!(transport.session().commands.borrow().is_empty());
}
