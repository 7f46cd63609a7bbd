use std::fmt;

/// Unsuccessful (or early-exit) outcome of running the grammar engine.
#[derive(Debug, Clone)]
pub struct DocoptError(pub(crate) Message);

#[derive(Debug, Clone)]
pub(crate) enum Message {
    /// Doc text is malformed: missing/duplicated `usage:`, unmatched bracket, stray token.
    /// A programmer mistake, never produced while parsing argv.
    Language(String),

    /// argv does not conform to the usage pattern: unknown option, missing argument, ambiguous
    /// prefix, leftover tokens. Carries the usage string so the caller can show it.
    Input(String),

    /// `--help` or `--version` was requested; this is not a failure, it's a request to print
    /// `payload` and stop with `code` (always 0).
    Exit { payload: String, code: i32 },
}

impl DocoptError {
    pub(crate) fn language<S: Into<String>>(msg: S) -> Self {
        DocoptError(Message::Language(msg.into()))
    }

    pub(crate) fn input<S: Into<String>>(msg: S) -> Self {
        DocoptError(Message::Input(msg.into()))
    }

    pub(crate) fn exit<S: Into<String>>(payload: S) -> Self {
        DocoptError(Message::Exit {
            payload: payload.into(),
            code: 0,
        })
    }

    /// Whether this is the `--help`/`--version` short-circuit rather than a genuine failure.
    #[must_use]
    pub fn is_exit_requested(&self) -> bool {
        matches!(self.0, Message::Exit { .. })
    }

    /// The text to print and the process exit code to use, if this is an exit request.
    #[must_use]
    pub fn exit_request(&self) -> Option<(&str, i32)> {
        match &self.0 {
            Message::Exit { payload, code } => Some((payload.as_str(), *code)),
            Message::Language(_) | Message::Input(_) => None,
        }
    }

    /// Returns the contained message — for unit tests.
    ///
    /// # Panics
    ///
    /// Panics if this is not a `Language` error.
    #[track_caller]
    pub fn unwrap_language(self) -> String {
        match self.0 {
            Message::Language(s) => s,
            other => panic!("not a language error: {other:?}"),
        }
    }

    /// Returns the contained message — for unit tests.
    ///
    /// # Panics
    ///
    /// Panics if this is not an `Input` error.
    #[track_caller]
    pub fn unwrap_input(self) -> String {
        match self.0 {
            Message::Input(s) => s,
            other => panic!("not an input error: {other:?}"),
        }
    }
}

impl fmt::Display for DocoptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Message::Language(s) | Message::Input(s) => f.write_str(s),
            Message::Exit { payload, .. } => f.write_str(payload),
        }
    }
}

impl std::error::Error for DocoptError {}
