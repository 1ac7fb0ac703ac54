// vim: tw=80
//! Failures reported by the dispatcher and by mock objects.

use thiserror::Error;

/// Everything that can go wrong while using mocks.
///
/// The panicking entry points (`MockObject::invoke`, `Mockery::verify`, and
/// dropping a `Mockery`) panic with this error's `Display` output.  Reports
/// are rendered eagerly, so the error can be stored and reported again at
/// verification time.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum MockError {
    /// No expectation accepted an invocation.
    #[error("unexpected invocation: {invocation}\n{report}")]
    UnexpectedInvocation {
        /// The offending invocation, rendered
        invocation: String,
        /// Expectations, states and recent history at the time of the call
        report: String,
    },

    /// Verification found expectations that were never satisfied.
    #[error("not all expectations were satisfied\n{report}")]
    Unsatisfied {
        /// Expectations and states at the time of verification
        report: String,
    },

    /// The matched expectation configured no return value, and the method's
    /// return type has no default.
    #[error("no return value configured for {invocation}")]
    MissingReturn {
        /// The invocation that needed a return value
        invocation: String,
    },

    /// The matched expectation returned a value of the wrong type.
    #[error("wrong return type for {invocation}: expected {expected}")]
    ReturnType {
        /// The invocation that received the value
        invocation: String,
        /// The method's declared return type
        expected: &'static str,
    },

    /// An action or a mock object referred to an argument that doesn't exist.
    #[error("no argument {index}; the invocation has {len}")]
    NoSuchArgument {
        /// Requested position
        index: usize,
        /// Number of arguments actually passed
        len: usize,
    },

    /// An argument was read or taken as the wrong type.
    #[error("argument {index} is not a {expected}: {found}")]
    ArgumentType {
        /// Requested position
        index: usize,
        /// The type that was asked for
        expected: &'static str,
        /// Debug rendering of the value actually present
        found: String,
    },

    /// An action tried to write to an input-only argument.
    #[error("argument {index} is input-only and cannot be written")]
    ReadOnlyArgument {
        /// Requested position
        index: usize,
    },

    /// An action referred to a parameter name that the method doesn't have.
    #[error("no argument named {name:?}")]
    NoSuchName {
        /// Requested parameter name
        name: &'static str,
    },

    /// A one-shot return action was performed a second time.
    #[error("Called a method twice that was expected only once")]
    Exhausted,

    /// An action failed while performing a matched invocation.
    #[error("{invocation}: {cause}")]
    ActionFailed {
        /// The invocation being performed
        invocation: String,
        /// What the action reported
        cause: Box<MockError>,
    },

    /// An action invoked the mock object again, and the nested call matched
    /// the expectation whose actions were already running.
    #[error("{invocation}: an action called back into its own expectation")]
    Reentrant {
        /// The nested invocation
        invocation: String,
    },
}
