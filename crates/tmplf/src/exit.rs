use std::process::ExitCode;

/// Outcome of a command: a process status and an optional closing line.
#[derive(Debug)]
pub struct Exit {
    code: ExitCode,
    failed: bool,
    message: Option<String>,
}

impl Exit {
    pub fn success() -> Self {
        Self {
            code: ExitCode::SUCCESS,
            failed: false,
            message: None,
        }
    }

    pub fn error() -> Self {
        Self {
            code: ExitCode::FAILURE,
            failed: true,
            message: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Print the message, if any, and hand back the process status.
    /// Failure messages go to stderr and are printed even when quiet.
    pub fn report(self, quiet: bool) -> ExitCode {
        if let Some(message) = &self.message {
            if self.failed {
                eprintln!("{message}");
            } else if !quiet {
                println!("{message}");
            }
        }
        self.code
    }
}
