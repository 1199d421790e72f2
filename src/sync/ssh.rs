// File: ./src/sync/ssh.rs
// Device library reached over SSH: SFTP for the files, a remote shell to
// restart the document viewer afterwards.
use super::transport::{DeviceTransport, check_name};
use crate::config::SshConfig;
use crate::error::{PlannerError, PlannerResult};
use std::io::{Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::path::Path;
use std::time::Duration;

const TIMEOUT: Duration = Duration::from_secs(15);
/// LIBSSH2_FX_NO_SUCH_FILE
const SFTP_NO_SUCH_FILE: i32 = 2;

/// File and command access on the device over one connection. Paths are
/// absolute remote paths.
pub trait RemoteSession {
    /// Entry names (not paths) of `dir`.
    fn list_dir(&self, dir: &str) -> PlannerResult<Vec<String>>;

    /// `None` if the file does not exist.
    fn read_file(&self, path: &str) -> PlannerResult<Option<Vec<u8>>>;

    fn write_file(&self, path: &str, contents: &[u8]) -> PlannerResult<()>;

    /// Replaces `to` if it exists.
    fn rename(&self, from: &str, to: &str) -> PlannerResult<()>;

    /// Exit status of `command`.
    fn exec(&self, command: &str) -> PlannerResult<i32>;
}

/// One call is one connection attempt.
pub trait SessionConnector {
    type Session: RemoteSession;

    fn connect(&self, config: &SshConfig) -> PlannerResult<Self::Session>;
}

pub struct SshTransport<S> {
    session: S,
    remote_dir: String,
    restart_command: String,
}

impl<S: RemoteSession> SshTransport<S> {
    pub fn new(session: S, config: &SshConfig) -> Self {
        Self {
            session,
            remote_dir: config.remote_dir.trim_end_matches('/').to_string(),
            restart_command: config.restart_command.trim().to_string(),
        }
    }

    /// Tries `connect_retries` times, `retry_delay` apart.
    pub fn connect<C>(connector: &C, config: &SshConfig) -> PlannerResult<Self>
    where
        C: SessionConnector<Session = S>,
    {
        let attempts = config.connect_retries.max(1);
        let mut last_error = String::new();
        for attempt in 1..=attempts {
            log::info!("Connecting to {}... (attempt {}/{})", config.host, attempt, attempts);
            match connector.connect(config) {
                Ok(session) => {
                    log::info!("Connected to {}", config.host);
                    return Ok(Self::new(session, config));
                }
                Err(e) => {
                    log::warn!("Connection attempt {} failed: {}", attempt, e);
                    last_error = e.to_string();
                    if attempt < attempts {
                        std::thread::sleep(config.retry_delay());
                    }
                }
            }
        }
        Err(PlannerError::Sync(format!(
            "Could not connect to {} after {} attempt(s): {}",
            config.host, attempts, last_error
        )))
    }

    pub fn session(&self) -> &S {
        &self.session
    }

    fn path_of(&self, name: &str) -> PlannerResult<String> {
        check_name(name)?;
        Ok(format!("{}/{}", self.remote_dir, name))
    }

    /// Restarts the viewer so it rescans the library. No-op without a
    /// restart command.
    pub fn restart_viewer(&self) -> PlannerResult<()> {
        if self.restart_command.is_empty() {
            return Ok(());
        }
        log::info!("Running '{}' on the device", self.restart_command);
        let status = self.session.exec(&self.restart_command)?;
        if status != 0 {
            return Err(PlannerError::Sync(format!(
                "'{}' exited with status {}",
                self.restart_command, status
            )));
        }
        Ok(())
    }
}

impl<S: RemoteSession> DeviceTransport for SshTransport<S> {
    fn list(&self) -> PlannerResult<Vec<String>> {
        let mut names = self.session.list_dir(&self.remote_dir)?;
        names.sort();
        Ok(names)
    }

    fn read(&self, name: &str) -> PlannerResult<Option<Vec<u8>>> {
        self.session.read_file(&self.path_of(name)?)
    }

    /// Uploads next to the target and renames over it.
    fn write(&self, name: &str, contents: &[u8]) -> PlannerResult<()> {
        let path = self.path_of(name)?;
        let partial = format!("{}/.{}.part", self.remote_dir, name);
        self.session.write_file(&partial, contents)?;
        self.session.rename(&partial, &path)
    }

    fn finish(&self) -> PlannerResult<()> {
        self.restart_viewer()
    }
}

fn ssh_error(context: &str, e: ssh2::Error) -> PlannerError {
    PlannerError::Sync(format!("{}: {}", context, e))
}

/// libssh2 session with an open SFTP channel.
pub struct Ssh2Session {
    session: ssh2::Session,
    sftp: ssh2::Sftp,
}

impl RemoteSession for Ssh2Session {
    fn list_dir(&self, dir: &str) -> PlannerResult<Vec<String>> {
        let entries = self
            .sftp
            .readdir(Path::new(dir))
            .map_err(|e| ssh_error(&format!("Cannot list '{}'", dir), e))?;
        Ok(entries
            .into_iter()
            .filter_map(|(path, _)| {
                path.file_name()
                    .and_then(|n| n.to_str())
                    .map(str::to_string)
            })
            .collect())
    }

    fn read_file(&self, path: &str) -> PlannerResult<Option<Vec<u8>>> {
        let mut file = match self.sftp.open(Path::new(path)) {
            Ok(file) => file,
            Err(e) if matches!(e.code(), ssh2::ErrorCode::SFTP(SFTP_NO_SUCH_FILE)) => return Ok(None),
            Err(e) => return Err(ssh_error(&format!("Cannot open '{}'", path), e)),
        };
        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes)
            .map_err(|e| PlannerError::Sync(format!("Cannot read '{}': {}", path, e)))?;
        Ok(Some(bytes))
    }

    fn write_file(&self, path: &str, contents: &[u8]) -> PlannerResult<()> {
        let mut file = self
            .sftp
            .create(Path::new(path))
            .map_err(|e| ssh_error(&format!("Cannot create '{}'", path), e))?;
        file.write_all(contents)
            .map_err(|e| PlannerError::Sync(format!("Cannot write '{}': {}", path, e)))
    }

    fn rename(&self, from: &str, to: &str) -> PlannerResult<()> {
        let (from, to) = (Path::new(from), Path::new(to));
        if self.sftp.rename(from, to, None).is_ok() {
            return Ok(());
        }
        // SFTP v3 servers refuse to rename over an existing file.
        let _ = self.sftp.unlink(to);
        self.sftp
            .rename(from, to, None)
            .map_err(|e| ssh_error(&format!("Cannot replace '{}'", to.display()), e))
    }

    fn exec(&self, command: &str) -> PlannerResult<i32> {
        let mut channel = self
            .session
            .channel_session()
            .map_err(|e| ssh_error("Cannot open a shell channel", e))?;
        channel
            .exec(command)
            .map_err(|e| ssh_error(&format!("Cannot run '{}'", command), e))?;
        let mut output = String::new();
        let _ = channel.read_to_string(&mut output);
        if !output.trim().is_empty() {
            log::debug!("{}: {}", command, output.trim());
        }
        channel
            .wait_close()
            .map_err(|e| ssh_error(&format!("'{}' did not finish", command), e))?;
        channel
            .exit_status()
            .map_err(|e| ssh_error(&format!("No exit status for '{}'", command), e))
    }
}

/// Opens [`Ssh2Session`]s. Authenticates with the key file if set, then the
/// password, then the SSH agent.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ssh2Connector;

impl SessionConnector for Ssh2Connector {
    type Session = Ssh2Session;

    fn connect(&self, config: &SshConfig) -> PlannerResult<Ssh2Session> {
        let address = (config.host.as_str(), config.port)
            .to_socket_addrs()
            .map_err(|e| PlannerError::Sync(format!("Cannot resolve '{}': {}", config.host, e)))?
            .next()
            .ok_or_else(|| PlannerError::Sync(format!("No address for '{}'", config.host)))?;
        let tcp = TcpStream::connect_timeout(&address, TIMEOUT)
            .map_err(|e| PlannerError::Sync(format!("Cannot reach {}: {}", address, e)))?;

        let mut session = ssh2::Session::new().map_err(|e| ssh_error("SSH session", e))?;
        session.set_timeout(TIMEOUT.as_millis() as u32);
        session.set_tcp_stream(tcp);
        session
            .handshake()
            .map_err(|e| ssh_error("SSH handshake", e))?;

        let auth = match (&config.key_file, &config.password) {
            (Some(key), _) => session.userauth_pubkey_file(&config.user, None, key, None),
            (None, Some(password)) => session.userauth_password(&config.user, password),
            (None, None) => session.userauth_agent(&config.user),
        };
        auth.map_err(|e| ssh_error(&format!("Authentication as '{}'", config.user), e))?;
        if !session.authenticated() {
            return Err(PlannerError::Sync(format!(
                "Authentication as '{}' was rejected",
                config.user
            )));
        }

        let sftp = session.sftp().map_err(|e| ssh_error("SFTP subsystem", e))?;
        Ok(Ssh2Session { session, sftp })
    }
}
