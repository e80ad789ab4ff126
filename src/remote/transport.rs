use std::path::Path;

use crate::error::Result;

/// Captured output of one remote command
#[derive(Debug, Clone, Default)]
pub struct ExecOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Remote command execution and file transfer.
///
/// Implementations hold one session, established lazily by
/// `ensure_connected` and reused for every later call. All operations
/// block the caller; there is no concurrency behind this boundary.
pub trait Transport {
    /// Idempotent. Establishing the session fails fast past the
    /// configured timeout.
    fn ensure_connected(&mut self) -> Result<()>;

    fn execute(&mut self, command: &str) -> Result<ExecOutput>;

    fn put(&mut self, local: &Path, remote: &str) -> Result<()>;

    fn get(&mut self, remote: &str, local: &Path) -> Result<()>;
}

#[cfg(test)]
pub mod mock {
    //! Scripted transport for orchestrator and reconciler tests

    use std::collections::VecDeque;
    use std::fs;
    use std::path::PathBuf;

    use super::*;

    #[derive(Default)]
    pub struct MockTransport {
        pub replies: VecDeque<ExecOutput>,
        pub commands: Vec<String>,
        pub puts: Vec<(PathBuf, String)>,
        pub gets: Vec<(String, PathBuf)>,
    }

    impl MockTransport {
        pub fn new() -> MockTransport {
            MockTransport::default()
        }

        /// Queue stdout replies in the order commands will arrive;
        /// commands past the end of the queue see empty output
        pub fn with_stdout(outputs: &[&str]) -> MockTransport {
            let mut transport = MockTransport::new();
            for output in outputs {
                transport.replies.push_back(ExecOutput {
                    stdout: (*output).to_string(),
                    stderr: String::new(),
                });
            }
            transport
        }

        pub fn command_log(&self) -> &[String] {
            &self.commands
        }
    }

    impl Transport for MockTransport {
        fn ensure_connected(&mut self) -> Result<()> {
            Ok(())
        }

        fn execute(&mut self, command: &str) -> Result<ExecOutput> {
            self.commands.push(command.to_string());
            Ok(self.replies.pop_front().unwrap_or_default())
        }

        fn put(&mut self, local: &Path, remote: &str) -> Result<()> {
            self.puts.push((local.to_path_buf(), remote.to_string()));
            Ok(())
        }

        fn get(&mut self, remote: &str, local: &Path) -> Result<()> {
            // leave an artifact behind so retrieval looks real to callers
            fs::write(local, b"")?;
            self.gets.push((remote.to_string(), local.to_path_buf()));
            Ok(())
        }
    }
}
