#[derive(Debug, thiserror::Error)]
pub enum ExecError {
    #[error("command not found: {program} (is it installed and on PATH?)")]
    NotFound {
        program: String,
        source: std::io::Error,
    },

    #[error("failed to run {program}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error(transparent)]
    Exec(#[from] ExecError),

    #[error("`{command}` exited with status {code}")]
    Failed {
        command: String,
        code: i32,
        /// Captured stderr, else stdout, else a generic message.
        diagnostic: String,
    },
}

impl RunError {
    /// Process exit code this failure should terminate with.
    ///
    /// A failed child's own code is passed through when it fits in `1..=255`;
    /// everything else (missing executable, spawn errors, odd codes) is 1.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Failed { code, .. } => match u8::try_from(*code) {
                Ok(c) if c != 0 => c,
                _ => 1,
            },
            Self::Exec(_) => 1,
        }
    }

    pub fn diagnostic(&self) -> Option<&str> {
        match self {
            Self::Failed { diagnostic, .. } => Some(diagnostic),
            Self::Exec(_) => None,
        }
    }
}
