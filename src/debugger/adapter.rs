//! Debug adapter description and process spawning.

use crate::dap::transport::{self, DapRead, DapWrite};
use crate::debugger::Error;
use anyhow::Context;
use serde_json::Value;
use std::path::PathBuf;
use std::process::{Child, ChildStderr, Command, Stdio};

/// How the adapter takes control of the debuggee: start a fresh process or
/// connect to a running one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdapterAction {
    Launch,
    Attach,
}

/// Adapter-specific behavior. Implementations may rewrite the user-supplied
/// launch/attach payloads into the exact shape a particular adapter expects.
pub trait AdapterSpec {
    fn transform_launch_arguments(&self, arguments: Value) -> Value {
        arguments
    }

    fn transform_attach_arguments(&self, arguments: Value) -> Value {
        arguments
    }

    /// Some adapters do not stop anything on attach; pausing this thread
    /// right after the configuration phase gives the user a prompt.
    fn async_stop_thread(&self) -> Option<i64> {
        None
    }
}

/// Pass-through adapter used when no adapter-specific quirks are known.
#[derive(Debug, Default)]
pub struct GenericAdapter {
    pub stop_thread: Option<i64>,
}

impl AdapterSpec for GenericAdapter {
    fn async_stop_thread(&self) -> Option<i64> {
        self.stop_thread
    }
}

/// Everything needed to create one debug session: the adapter binary, its
/// command line, and the launch or attach payload.
pub struct AdapterDescriptor {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub action: AdapterAction,
    pub launch_arguments: Value,
    pub attach_arguments: Value,
    pub adapter: Box<dyn AdapterSpec>,
}

impl AdapterDescriptor {
    /// Spawn the adapter with piped stdio. The DAP connection runs over
    /// stdin/stdout; stderr carries adapter diagnostics.
    pub fn spawn(&self) -> anyhow::Result<Child> {
        Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| format!("spawn debug adapter `{}`", self.program.display()))
    }

    pub fn launch_payload(&self) -> Value {
        self.adapter
            .transform_launch_arguments(self.launch_arguments.clone())
    }

    pub fn attach_payload(&self) -> Value {
        self.adapter
            .transform_attach_arguments(self.attach_arguments.clone())
    }

    pub fn async_stop_thread(&self) -> Option<i64> {
        self.adapter.async_stop_thread()
    }
}

/// A freshly connected adapter: transport halves plus process handles when
/// the adapter runs as a child process.
pub struct AdapterConnection {
    pub reader: Box<dyn DapRead>,
    pub writer: Box<dyn DapWrite>,
    pub child: Option<Child>,
    pub stderr: Option<ChildStderr>,
}

/// Produces adapter connections for the session core. One factory serves
/// the whole CLI lifetime; `relaunch` asks it for a fresh connection.
pub trait AdapterFactory {
    fn action(&self) -> AdapterAction;
    fn launch_payload(&self) -> Value;
    fn attach_payload(&self) -> Value;
    fn async_stop_thread(&self) -> Option<i64>;
    fn connect(&mut self) -> Result<AdapterConnection, Error>;
}

impl AdapterFactory for AdapterDescriptor {
    fn action(&self) -> AdapterAction {
        self.action
    }

    fn launch_payload(&self) -> Value {
        AdapterDescriptor::launch_payload(self)
    }

    fn attach_payload(&self) -> Value {
        AdapterDescriptor::attach_payload(self)
    }

    fn async_stop_thread(&self) -> Option<i64> {
        AdapterDescriptor::async_stop_thread(self)
    }

    fn connect(&mut self) -> Result<AdapterConnection, Error> {
        let mut child = self
            .spawn()
            .map_err(|e| Error::FatalSession(format!("{e:#}")))?;
        let (reader, writer) = transport::stdio(&mut child)
            .map_err(|e| Error::FatalSession(format!("{e:#}")))?;
        let stderr = child.stderr.take();
        Ok(AdapterConnection {
            reader: Box::new(reader),
            writer: Box::new(writer),
            child: Some(child),
            stderr,
        })
    }
}
