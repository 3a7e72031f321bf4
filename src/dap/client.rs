//! Blocking DAP client.
//!
//! One reader thread per session parses adapter messages: responses are
//! routed back to the requester blocked on its sequence number, events are
//! queued to the application together with the session generation so the
//! consumer can discard notifications of an already closed session.

use crate::dap::transport::{DapRead, DapWrite};
use crate::dap::types::{
    BreakpointInfo, Capabilities, ContinueArguments, DisconnectArguments, EvaluateArguments,
    EvaluateResponseBody, Event, InitializeArguments, NextArguments, PauseArguments, Request,
    Response, Scope, ScopesArguments, ScopesResponseBody, SetBreakpointsArguments,
    SetBreakpointsResponseBody, SetExceptionBreakpointsArguments, SetFunctionBreakpointsArguments,
    SourceArguments, SourceResponseBody, StackFrame, StackTraceArguments, StackTraceResponseBody,
    StepInArguments, ThreadInfo, ThreadsResponseBody, Variable, VariablesArguments,
    VariablesResponseBody,
};
use log::{debug, warn};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::mpsc::{Receiver, Sender, channel};
use std::sync::{Arc, Mutex};
use std::thread;

#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    #[error("{0}")]
    Rejected(String),
    #[error("adapter connection closed")]
    Disconnected,
    #[error("malformed adapter message: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("adapter transport: {0}")]
    Transport(String),
}

/// Events are delivered with the generation of the session that produced
/// them, so stale sessions cannot confuse the consumer after a relaunch.
pub type EventSink = Sender<(u64, Event)>;

type PendingMap = Arc<Mutex<HashMap<i64, Sender<Response>>>>;

/// Handle to a live adapter connection. Cheap to clone; all clones share
/// the writer and the pending-request table.
#[derive(Clone)]
pub struct DebugSession {
    writer: Arc<Mutex<Box<dyn DapWrite>>>,
    pending: PendingMap,
    next_seq: Arc<AtomicI64>,
    generation: u64,
}

impl DebugSession {
    /// Wrap transport halves into a running session. Spawns the reader
    /// thread; it exits when the adapter closes the connection.
    pub fn start(
        reader: impl DapRead + 'static,
        writer: impl DapWrite + 'static,
        generation: u64,
        events: EventSink,
    ) -> Self {
        let session = Self {
            writer: Arc::new(Mutex::new(Box::new(writer))),
            pending: Arc::new(Mutex::new(HashMap::new())),
            next_seq: Arc::new(AtomicI64::new(1)),
            generation,
        };

        let pending = Arc::clone(&session.pending);
        thread::spawn(move || read_loop(reader, pending, generation, events));

        session
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    fn write(&self, seq: i64, command: &str, arguments: Value) -> Result<(), RequestError> {
        let request = Request {
            seq,
            r#type: "request",
            command: command.to_string(),
            arguments,
        };
        let msg = serde_json::to_value(&request)?;
        debug!(target: "dap", "-> {command} (seq {seq})");
        self.writer
            .lock()
            .unwrap()
            .write_message(&msg)
            .map_err(|e| RequestError::Transport(format!("{e:#}")))
    }

    /// Send a request and block until the matching response arrives.
    /// Returns the response body.
    pub fn request(&self, command: &str, arguments: Value) -> Result<Value, RequestError> {
        let seq = self.next_seq.fetch_add(1, Ordering::SeqCst);
        let (tx, rx): (Sender<Response>, Receiver<Response>) = channel();
        self.pending.lock().unwrap().insert(seq, tx);

        if let Err(e) = self.write(seq, command, arguments) {
            self.pending.lock().unwrap().remove(&seq);
            return Err(e);
        }

        let response = rx.recv().map_err(|_| RequestError::Disconnected)?;
        if !response.success {
            let message = response
                .message
                .unwrap_or_else(|| format!("`{command}` request rejected"));
            return Err(RequestError::Rejected(message));
        }
        Ok(response.body)
    }

    /// Send a request without waiting for the response. A later rejection
    /// surfaces as [`Event::RequestFailed`] on the event stream.
    pub fn request_background(&self, command: &str, arguments: Value) -> Result<(), RequestError> {
        let seq = self.next_seq.fetch_add(1, Ordering::SeqCst);
        self.write(seq, command, arguments)
    }

    fn request_as<T: DeserializeOwned>(
        &self,
        command: &str,
        arguments: impl Serialize,
    ) -> Result<T, RequestError> {
        let body = self.request(command, serde_json::to_value(arguments)?)?;
        Ok(serde_json::from_value(body)?)
    }

    fn request_no_body(
        &self,
        command: &str,
        arguments: impl Serialize,
    ) -> Result<(), RequestError> {
        self.request(command, serde_json::to_value(arguments)?)?;
        Ok(())
    }

    // ------------------------------- typed surface -------------------------------

    pub fn initialize(&self, args: &InitializeArguments) -> Result<Capabilities, RequestError> {
        self.request_as("initialize", args)
    }

    pub fn launch(&self, arguments: Value) -> Result<(), RequestError> {
        self.request_background("launch", arguments)
    }

    pub fn attach(&self, arguments: Value) -> Result<(), RequestError> {
        self.request_background("attach", arguments)
    }

    pub fn disconnect(&self) -> Result<(), RequestError> {
        self.request_background(
            "disconnect",
            serde_json::to_value(DisconnectArguments {
                terminate_debuggee: None,
            })?,
        )
    }

    pub fn set_breakpoints(
        &self,
        args: &SetBreakpointsArguments,
    ) -> Result<Vec<BreakpointInfo>, RequestError> {
        let body: SetBreakpointsResponseBody = self.request_as("setBreakpoints", args)?;
        Ok(body.breakpoints)
    }

    pub fn set_function_breakpoints(
        &self,
        args: &SetFunctionBreakpointsArguments,
    ) -> Result<Vec<BreakpointInfo>, RequestError> {
        let body: SetBreakpointsResponseBody = self.request_as("setFunctionBreakpoints", args)?;
        Ok(body.breakpoints)
    }

    pub fn set_exception_breakpoints(&self, filters: Vec<String>) -> Result<(), RequestError> {
        self.request_no_body(
            "setExceptionBreakpoints",
            SetExceptionBreakpointsArguments { filters },
        )
    }

    pub fn configuration_done(&self) -> Result<(), RequestError> {
        self.request_no_body("configurationDone", Value::Null)
    }

    pub fn threads(&self) -> Result<Vec<ThreadInfo>, RequestError> {
        let body: ThreadsResponseBody = self.request_as("threads", Value::Null)?;
        Ok(body.threads)
    }

    pub fn stack_trace(
        &self,
        thread_id: i64,
        levels: Option<i64>,
    ) -> Result<Vec<StackFrame>, RequestError> {
        let body: StackTraceResponseBody = self.request_as(
            "stackTrace",
            StackTraceArguments {
                thread_id,
                start_frame: None,
                levels,
            },
        )?;
        Ok(body.stack_frames)
    }

    pub fn scopes(&self, frame_id: i64) -> Result<Vec<Scope>, RequestError> {
        let body: ScopesResponseBody = self.request_as("scopes", ScopesArguments { frame_id })?;
        Ok(body.scopes)
    }

    pub fn variables(&self, variables_reference: i64) -> Result<Vec<Variable>, RequestError> {
        let body: VariablesResponseBody = self.request_as(
            "variables",
            VariablesArguments {
                variables_reference,
            },
        )?;
        Ok(body.variables)
    }

    pub fn source(&self, source_reference: i64) -> Result<String, RequestError> {
        let body: SourceResponseBody = self.request_as(
            "source",
            SourceArguments {
                source: None,
                source_reference,
            },
        )?;
        Ok(body.content)
    }

    pub fn continue_execution(&self, thread_id: i64) -> Result<(), RequestError> {
        self.request_no_body("continue", ContinueArguments { thread_id })
    }

    pub fn next(&self, thread_id: i64) -> Result<(), RequestError> {
        self.request_no_body("next", NextArguments { thread_id })
    }

    pub fn step_in(&self, thread_id: i64) -> Result<(), RequestError> {
        self.request_no_body("stepIn", StepInArguments { thread_id })
    }

    pub fn pause(&self, thread_id: i64) -> Result<(), RequestError> {
        self.request_no_body("pause", PauseArguments { thread_id })
    }

    pub fn evaluate(
        &self,
        expression: &str,
        frame_id: Option<i64>,
    ) -> Result<EvaluateResponseBody, RequestError> {
        self.request_as(
            "evaluate",
            EvaluateArguments {
                expression: expression.to_string(),
                context: "repl",
                frame_id,
            },
        )
    }
}

fn read_loop(
    mut reader: impl DapRead,
    pending: PendingMap,
    generation: u64,
    events: EventSink,
) {
    loop {
        let msg = match reader.read_message() {
            Ok(msg) => msg,
            Err(e) => {
                debug!(target: "dap", "reader stopped: {e:#}");
                // Wake every blocked requester by dropping its sender.
                pending.lock().unwrap().clear();
                _ = events.send((generation, Event::AdapterExited));
                return;
            }
        };

        match msg.get("type").and_then(Value::as_str) {
            Some("response") => {
                let response: Response = match serde_json::from_value(msg) {
                    Ok(r) => r,
                    Err(e) => {
                        warn!(target: "dap", "malformed response: {e}");
                        continue;
                    }
                };
                debug!(
                    target: "dap",
                    "<- response to {} (seq {}, success {})",
                    response.command, response.request_seq, response.success
                );
                let waiter = pending.lock().unwrap().remove(&response.request_seq);
                match waiter {
                    Some(tx) => _ = tx.send(response),
                    None if !response.success => {
                        let message = response
                            .message
                            .unwrap_or_else(|| format!("`{}` request rejected", response.command));
                        _ = events.send((
                            generation,
                            Event::RequestFailed {
                                command: response.command,
                                message,
                            },
                        ));
                    }
                    None => {}
                }
            }
            Some("event") => {
                let name = msg
                    .get("event")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string();
                let body = msg.get("body").cloned().unwrap_or(Value::Null);
                match Event::parse(&name, body) {
                    Ok(event) => {
                        debug!(target: "dap", "<- event {name}");
                        if events.send((generation, event)).is_err() {
                            return;
                        }
                    }
                    Err(e) => warn!(target: "dap", "malformed `{name}` event: {e}"),
                }
            }
            other => warn!(target: "dap", "unexpected message type: {other:?}"),
        }
    }
}
