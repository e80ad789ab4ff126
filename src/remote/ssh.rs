//! Blocking SSH transport over libssh2
//!
//! One session per transport instance, opened on first use and reused.
//! Authentication is public-key only; the key never leaves the
//! configured path.

use std::fs;
use std::io::{Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::path::Path;
use std::time::Duration;

use log::info;
use ssh2::Session;

use crate::config::HpcConfig;
use crate::error::{Error, Result};
use crate::remote::transport::{ExecOutput, Transport};

pub struct SshTransport {
    config: HpcConfig,
    session: Option<Session>,
}

impl SshTransport {
    pub fn new(config: &HpcConfig) -> SshTransport {
        SshTransport {
            config: config.clone(),
            session: None,
        }
    }

    fn connect(&self) -> Result<Session> {
        let address = format!("{}:{}", self.config.host, self.config.port);
        let timeout = Duration::from_secs(self.config.connect_timeout_secs);
        info!("connecting to {address} as {}", self.config.user);

        let resolved = address
            .to_socket_addrs()
            .map_err(|err| Error::Transport(format!("cannot resolve {address}: {err}")))?
            .next()
            .ok_or_else(|| Error::Transport(format!("cannot resolve {address}")))?;
        let tcp = TcpStream::connect_timeout(&resolved, timeout)
            .map_err(|err| Error::Transport(format!("cannot reach {address}: {err}")))?;

        let mut session = Session::new()?;
        session.set_timeout(timeout.as_millis() as u32);
        session.set_tcp_stream(tcp);
        session.handshake()?;
        session.userauth_pubkey_file(&self.config.user, None, &self.config.key_path, None)?;
        if !session.authenticated() {
            return Err(Error::Transport(format!(
                "authentication failed for {} at {address}",
                self.config.user
            )));
        }
        Ok(session)
    }

    fn session(&mut self) -> Result<&Session> {
        if self.session.is_none() {
            let session = self.connect()?;
            self.session = Some(session);
        }
        Ok(self.session.as_ref().expect("session was just established"))
    }
}

impl Transport for SshTransport {
    fn ensure_connected(&mut self) -> Result<()> {
        self.session().map(|_| ())
    }

    fn execute(&mut self, command: &str) -> Result<ExecOutput> {
        let session = self.session()?;
        let mut channel = session.channel_session()?;
        channel.exec(command)?;

        let mut stdout = String::new();
        channel
            .read_to_string(&mut stdout)
            .map_err(|err| Error::Transport(format!("reading stdout of `{command}`: {err}")))?;
        let mut stderr = String::new();
        channel
            .stderr()
            .read_to_string(&mut stderr)
            .map_err(|err| Error::Transport(format!("reading stderr of `{command}`: {err}")))?;
        channel.wait_close()?;

        Ok(ExecOutput { stdout, stderr })
    }

    fn put(&mut self, local: &Path, remote: &str) -> Result<()> {
        let contents = fs::read(local)?;
        let session = self.session()?;
        let mut channel =
            session.scp_send(Path::new(remote), 0o644, contents.len() as u64, None)?;
        channel
            .write_all(&contents)
            .map_err(|err| Error::Transport(format!("sending {remote}: {err}")))?;
        channel.send_eof()?;
        channel.wait_eof()?;
        channel.close()?;
        channel.wait_close()?;
        Ok(())
    }

    fn get(&mut self, remote: &str, local: &Path) -> Result<()> {
        let session = self.session()?;
        let (mut channel, stat) = session.scp_recv(Path::new(remote))?;
        let mut contents = Vec::with_capacity(stat.size() as usize);
        channel
            .read_to_end(&mut contents)
            .map_err(|err| Error::Transport(format!("receiving {remote}: {err}")))?;
        channel.send_eof()?;
        channel.wait_eof()?;
        channel.close()?;
        channel.wait_close()?;
        fs::write(local, contents)?;
        Ok(())
    }
}
