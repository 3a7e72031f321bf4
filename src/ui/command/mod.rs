//! An interface to the debugger session core.
//!
//! Contains commands and the corresponding handler. A command is a request
//! to the debugger that defines an action and a list of input arguments.

pub mod handler;
pub mod help;
pub mod parser;

use crate::debugger::Error;

#[derive(thiserror::Error, Debug)]
pub enum CommandError {
    #[error("malformed command")]
    Parsing(String),
    #[error(transparent)]
    Handle(#[from] Error),
}

pub type CommandResult<T> = Result<T, CommandError>;

/// What a breakpoint command points at.
#[derive(Debug, Clone)]
pub enum BreakpointIdentity {
    Line(String, u32),
    Function(String),
    Number(u32),
}

#[derive(Debug, Clone)]
pub enum BreakpointCommand {
    Add(BreakpointIdentity),
    Remove(BreakpointIdentity),
    Enable(u32),
    Disable(u32),
    Info,
    Clear,
}

#[derive(Debug, Clone)]
pub enum ThreadCommand {
    Info,
    Current,
    Switch(i64),
}

#[derive(Debug, Clone)]
pub enum FrameCommand {
    Info,
    Switch(u32),
}

/// External commands that can be processed by the debugger.
#[derive(Debug, Clone)]
pub enum Command {
    Run,
    Continue,
    Pause,
    StepInto,
    StepOver,
    Breakpoint(BreakpointCommand),
    Thread(ThreadCommand),
    Frame(FrameCommand),
    PrintBacktrace(Option<i64>),
    PrintVariables(Option<String>),
    Evaluate(String),
    SourceCode(Option<u32>),
    Help { command: Option<String> },
}
