//! Idempotent resource primitives (check + apply pattern).
pub mod git_clone;
pub mod helpers;
pub mod package;
pub mod stow;

use anyhow::Result;

/// Minimal interface for resources that can be described and applied.
///
/// Resources whose state is determined via a single external bulk query (e.g.
/// system packages) implement only this trait.  Resources that can
/// determine their own state independently implement the richer [`Resource`]
/// super-trait.
pub trait Applicable {
    /// Human-readable description of this resource.
    fn description(&self) -> String;

    /// Apply the resource change.
    ///
    /// # Errors
    ///
    /// Returns an error if the resource cannot be applied due to I/O failures,
    /// a failing external command, or invalid paths.
    fn apply(&self) -> Result<()>;
}

/// State of a resource (cloned repository, installed package).
///
/// # Examples
///
/// ```
/// use dotstow_cli::resources::ResourceState;
///
/// let missing = ResourceState::Missing;
/// let occupied = ResourceState::Invalid { reason: "not a checkout".into() };
///
/// assert_ne!(missing, ResourceState::Correct);
/// assert_ne!(occupied, ResourceState::Correct);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceState {
    /// Resource does not exist or is not present.
    Missing,
    /// Resource exists and matches the desired state.
    Correct,
    /// Resource cannot be applied (e.g., destination is occupied by something foreign).
    Invalid {
        /// Reason why the resource cannot be applied.
        reason: String,
    },
}

/// Unified interface for resources that can be checked and applied.
pub trait Resource: Applicable {
    /// Check the current state of the resource.
    ///
    /// # Errors
    ///
    /// Returns an error if the resource state cannot be determined.
    fn current_state(&self) -> Result<ResourceState>;
}

/// Shared test helpers for resource and task unit tests.
#[cfg(test)]
pub mod test_helpers {
    use crate::exec::{ExecResult, Executor};
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Which programs [`MockExecutor::which`] reports as present.
    #[derive(Debug)]
    enum WhichMode {
        All(bool),
        Only(Vec<String>),
    }

    /// A configurable mock executor.
    ///
    /// Maintains a queue of responses consumed in FIFO order.  When the queue
    /// is empty any call returns a failed response with stderr
    /// `"unexpected call"`.  Every invocation is recorded as a single
    /// space-joined command line, available through [`calls`](Self::calls).
    #[derive(Debug)]
    pub struct MockExecutor {
        responses: Mutex<VecDeque<ExecResult>>,
        which: WhichMode,
        calls: Mutex<Vec<String>>,
    }

    impl MockExecutor {
        /// Create a mock with a single successful response.
        #[must_use]
        pub fn ok(stdout: &str) -> Self {
            Self::with_responses(vec![(true, stdout.to_string())])
        }

        /// Create a mock with a single failed response (empty output).
        #[must_use]
        pub fn fail() -> Self {
            Self::with_responses(vec![(false, String::new())])
        }

        /// Create a mock from an ordered list of `(success, stdout)` pairs.
        #[must_use]
        pub fn with_responses(responses: Vec<(bool, String)>) -> Self {
            Self::with_results(
                responses
                    .into_iter()
                    .map(|(success, stdout)| result(success, &stdout, ""))
                    .collect(),
            )
        }

        /// Create a mock from fully specified results.
        #[must_use]
        pub fn with_results(results: Vec<ExecResult>) -> Self {
            Self {
                responses: Mutex::new(results.into()),
                which: WhichMode::All(false),
                calls: Mutex::new(Vec::new()),
            }
        }

        /// Set the value returned by every [`Executor::which`] call.
        #[must_use]
        pub fn with_which(mut self, present: bool) -> Self {
            self.which = WhichMode::All(present);
            self
        }

        /// Report only the listed programs as present on `PATH`.
        #[must_use]
        pub fn with_which_programs(mut self, programs: &[&str]) -> Self {
            self.which = WhichMode::Only(programs.iter().map(ToString::to_string).collect());
            self
        }

        /// Return every recorded command line in call order.
        #[must_use]
        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().map_or_else(|_| vec![], |g| g.clone())
        }

        /// Return the total number of executor calls made so far.
        #[must_use]
        pub fn call_count(&self) -> usize {
            self.calls().len()
        }

        fn next(&self, program: &str, args: &[&str]) -> ExecResult {
            if let Ok(mut calls) = self.calls.lock() {
                let mut line = program.to_string();
                for arg in args {
                    line.push(' ');
                    line.push_str(arg);
                }
                calls.push(line);
            }
            self.responses.lock().map_or_else(
                |_| result(false, "", "mutex poisoned"),
                |mut guard| {
                    guard
                        .pop_front()
                        .unwrap_or_else(|| result(false, "", "unexpected call"))
                },
            )
        }

        fn next_checked(&self, program: &str, args: &[&str]) -> anyhow::Result<ExecResult> {
            let r = self.next(program, args);
            if r.success {
                Ok(r)
            } else {
                anyhow::bail!("mock command failed: {}", r.stderr)
            }
        }
    }

    /// Build an [`ExecResult`] for use with [`MockExecutor::with_results`].
    #[must_use]
    pub fn result(success: bool, stdout: &str, stderr: &str) -> ExecResult {
        ExecResult {
            stdout: stdout.to_string(),
            stderr: stderr.to_string(),
            success,
            code: Some(i32::from(!success)),
        }
    }

    impl Executor for MockExecutor {
        fn run(&self, program: &str, args: &[&str]) -> anyhow::Result<ExecResult> {
            self.next_checked(program, args)
        }

        fn run_unchecked(&self, program: &str, args: &[&str]) -> anyhow::Result<ExecResult> {
            Ok(self.next(program, args))
        }

        fn which(&self, program: &str) -> bool {
            match &self.which {
                WhichMode::All(present) => *present,
                WhichMode::Only(list) => list.iter().any(|p| p == program),
            }
        }
    }
}
