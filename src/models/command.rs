//! External command models
//!
//! A command is a program plus its arguments, kept as separate tokens so it
//! can be spawned without a shell and printed for diagnostics.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Separator used when printing one token per line
const CONTINUATION: &str = " \\\n   ";

/// Program and argument list for an external process
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandSpec {
    /// Create a command with no arguments
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Append one argument
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append a `-D<key>=<value>` definition
    pub fn define(self, key: &str, value: impl fmt::Display) -> Self {
        self.arg(format!("-D{key}={value}"))
    }

    /// Program followed by its arguments
    pub fn argv(&self) -> Vec<&str> {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect()
    }

    /// Number of tokens including the program
    #[cfg(test)]
    pub fn token_count(&self) -> usize {
        self.args.len() + 1
    }

    /// Value of a `-D<key>=` definition, if present
    #[cfg(test)]
    pub fn definition(&self, key: &str) -> Option<&str> {
        let prefix = format!("-D{key}=");
        self.args.iter().find_map(|a| a.strip_prefix(prefix.as_str()))
    }

    /// Render one token per line with shell continuations
    pub fn to_multiline(&self) -> String {
        self.argv().join(CONTINUATION)
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.argv().join(" "))
    }
}

/// Exit state of a finished process
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessExit {
    /// Exit code, or None when terminated by a signal
    pub code: Option<i32>,
}

impl ProcessExit {
    #[cfg(test)]
    pub fn from_code(code: i32) -> Self {
        Self { code: Some(code) }
    }

    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

impl From<std::process::ExitStatus> for ProcessExit {
    fn from(status: std::process::ExitStatus) -> Self {
        Self {
            code: status.code(),
        }
    }
}

impl fmt::Display for ProcessExit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "exit code {code}"),
            None => write!(f, "terminated by signal"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_and_argv() {
        let cmd = CommandSpec::new("ctest")
            .arg("-S")
            .arg("simple_testing.cmake")
            .define("PARALLEL_LEVEL", 8);

        assert_eq!(
            cmd.argv(),
            vec!["ctest", "-S", "simple_testing.cmake", "-DPARALLEL_LEVEL=8"]
        );
        assert_eq!(cmd.token_count(), 4);
        assert_eq!(cmd.definition("PARALLEL_LEVEL"), Some("8"));
        assert_eq!(cmd.definition("TEST_PARALLEL_LEVEL"), None);
    }

    #[test]
    fn test_definition_matches_whole_key() {
        let cmd = CommandSpec::new("ctest")
            .define("TEST_PARALLEL_LEVEL", 4)
            .define("PARALLEL_LEVEL", 8);
        assert_eq!(cmd.definition("PARALLEL_LEVEL"), Some("8"));
    }

    #[test]
    fn test_display_forms() {
        let cmd = CommandSpec::new("ctest").arg("-S").arg("a.cmake");
        assert_eq!(cmd.to_string(), "ctest -S a.cmake");
        assert_eq!(cmd.to_multiline(), "ctest \\\n   -S \\\n   a.cmake");
    }

    #[test]
    fn test_process_exit() {
        assert!(ProcessExit::from_code(0).success());
        assert!(!ProcessExit::from_code(2).success());
        assert!(!ProcessExit { code: None }.success());
        assert_eq!(ProcessExit::from_code(2).to_string(), "exit code 2");
    }
}
