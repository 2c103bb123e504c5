use thiserror::Error;

/// The taxonomy from the spec: lexing, parsing, and program-shape errors all
/// abort loading; solver-time contradictions and cycles are diagnostics, not
/// `Error`s, and never reach this type.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("line {line}: lex error: {message}")]
    Lex { line: usize, message: String },

    #[error("line {line}: parse error: {message}")]
    Parse { line: usize, message: String },

    #[error("line {line}: {message}")]
    Input { line: usize, message: String },
}

impl EngineError {
    pub fn lex(line: usize, message: impl Into<String>) -> Self {
        EngineError::Lex { line, message: message.into() }
    }

    pub fn parse(line: usize, message: impl Into<String>) -> Self {
        EngineError::Parse { line, message: message.into() }
    }

    pub fn input(line: usize, message: impl Into<String>) -> Self {
        EngineError::Input { line, message: message.into() }
    }

    /// sysexits-style exit code for this failure, matching the teacher's
    /// `run_file` use of 65 (data error) and extending it with 66 (no input)
    /// for program-shape problems, per SPEC_FULL §6.2/§7.
    pub fn exit_code(&self) -> i32 {
        match self {
            EngineError::Lex { .. } | EngineError::Parse { .. } => 65,
            EngineError::Input { .. } => 66,
        }
    }
}
