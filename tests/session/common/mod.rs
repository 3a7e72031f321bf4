//! In-process scripted debug adapter.
//!
//! The session core talks to it through channel-backed transport halves, so
//! the full client stack (framing aside) is exercised without spawning a
//! process. Responses come from per-command handlers with sensible
//! defaults; events are injected explicitly by the test.

use dapshell::dap::types::Event;
use dapshell::debugger::adapter::{AdapterAction, AdapterConnection, AdapterFactory};
use dapshell::debugger::{ConsoleHook, Debugger, Error, EventOutcome};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, Sender, channel};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

const EVENT_TIMEOUT: Duration = Duration::from_secs(5);

// ---------------------------------- transport ----------------------------------

struct ChannelReader {
    rx: Receiver<Value>,
}

impl dapshell::dap::transport::DapRead for ChannelReader {
    fn read_message(&mut self) -> anyhow::Result<Value> {
        self.rx
            .recv()
            .map_err(|_| anyhow::anyhow!("DAP connection closed"))
    }
}

/// Records every request synchronously on write, then forwards it to the
/// responder thread. Assertions on `requests` are race-free: a blocking
/// call cannot return before its request was logged.
struct RecordingWriter {
    tx: Sender<Value>,
    log: Arc<Mutex<Vec<Value>>>,
}

impl dapshell::dap::transport::DapWrite for RecordingWriter {
    fn write_message(&mut self, message: &Value) -> anyhow::Result<()> {
        self.log.lock().unwrap().push(message.clone());
        self.tx
            .send(message.clone())
            .map_err(|_| anyhow::anyhow!("adapter gone"))
    }
}

// ---------------------------------- script ----------------------------------

pub type RequestHandler = Box<dyn FnMut(&Value) -> Result<Value, String> + Send>;

pub struct AdapterScript {
    pub capabilities: Value,
    pub threads: Vec<(i64, &'static str)>,
    pub frames: Value,
    pub scopes: Value,
    pub variables: HashMap<i64, Value>,
    pub source_content: &'static str,
    handlers: HashMap<&'static str, RequestHandler>,
    next_breakpoint_id: u32,
}

impl Default for AdapterScript {
    fn default() -> Self {
        Self {
            capabilities: json!({
                "supportsConfigurationDoneRequest": true,
                "supportsFunctionBreakpoints": true,
            }),
            threads: vec![(1, "main")],
            frames: json!([
                {"id": 100, "name": "main", "line": 10, "column": 1, "source": {"path": "/a.py"}},
            ]),
            scopes: json!([
                {"name": "Locals", "variablesReference": 200, "expensive": false},
                {"name": "Globals", "variablesReference": 201, "expensive": true},
            ]),
            variables: HashMap::from([
                (200, json!([{"name": "x", "value": "1"}, {"name": "y", "value": "2"}])),
                (201, json!([{"name": "G", "value": "3"}])),
            ]),
            source_content: "a\r\nb\r\nc\n",
            handlers: HashMap::new(),
            next_breakpoint_id: 1,
        }
    }
}

impl AdapterScript {
    pub fn with_capabilities(mut self, capabilities: Value) -> Self {
        self.capabilities = capabilities;
        self
    }

    pub fn with_threads(mut self, threads: Vec<(i64, &'static str)>) -> Self {
        self.threads = threads;
        self
    }

    pub fn on(
        mut self,
        command: &'static str,
        handler: impl FnMut(&Value) -> Result<Value, String> + Send + 'static,
    ) -> Self {
        self.handlers.insert(command, Box::new(handler));
        self
    }

    fn respond(&mut self, command: &str, args: &Value) -> Result<Value, String> {
        if let Some(handler) = self.handlers.get_mut(command) {
            return handler(args);
        }

        let body = match command {
            "initialize" => self.capabilities.clone(),
            "setBreakpoints" | "setFunctionBreakpoints" => {
                let requested = args
                    .get("breakpoints")
                    .and_then(Value::as_array)
                    .map(Vec::len)
                    .unwrap_or(0);
                let breakpoints: Vec<Value> = (0..requested)
                    .map(|_| {
                        let id = self.next_breakpoint_id;
                        self.next_breakpoint_id += 1;
                        json!({"id": id, "verified": true})
                    })
                    .collect();
                json!({ "breakpoints": breakpoints })
            }
            "threads" => {
                let threads: Vec<Value> = self
                    .threads
                    .iter()
                    .map(|(id, name)| json!({"id": id, "name": name}))
                    .collect();
                json!({ "threads": threads })
            }
            "stackTrace" => json!({ "stackFrames": self.frames }),
            "scopes" => json!({ "scopes": self.scopes }),
            "variables" => {
                let reference = args
                    .get("variablesReference")
                    .and_then(Value::as_i64)
                    .unwrap_or(0);
                json!({ "variables": self.variables.get(&reference).cloned().unwrap_or(json!([])) })
            }
            "evaluate" => json!({"result": "42", "type": "int"}),
            "source" => json!({"content": self.source_content}),
            _ => json!({}),
        };
        Ok(body)
    }
}

// ---------------------------------- adapter ----------------------------------

pub struct MockAdapter {
    pub requests: Arc<Mutex<Vec<Value>>>,
    events_out: Sender<Value>,
}

impl MockAdapter {
    pub fn emit(&self, event: &str, body: Value) {
        _ = self
            .events_out
            .send(json!({"type": "event", "event": event, "body": body}));
    }

    pub fn requests_for(&self, command: &str) -> Vec<Value> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.get("command").and_then(Value::as_str) == Some(command))
            .cloned()
            .collect()
    }

    pub fn request_commands(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter_map(|r| r.get("command").and_then(Value::as_str))
            .map(ToString::to_string)
            .collect()
    }
}

fn start_adapter(mut script: AdapterScript) -> (MockAdapter, AdapterConnection) {
    let (request_tx, request_rx) = channel::<Value>();
    let (message_tx, message_rx) = channel::<Value>();
    let log = Arc::new(Mutex::new(Vec::new()));

    let adapter = MockAdapter {
        requests: Arc::clone(&log),
        events_out: message_tx.clone(),
    };

    thread::spawn(move || {
        while let Ok(request) = request_rx.recv() {
            let seq = request.get("seq").and_then(Value::as_i64).unwrap_or(0);
            let command = request
                .get("command")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            let args = request.get("arguments").cloned().unwrap_or(Value::Null);

            let response = match script.respond(&command, &args) {
                Ok(body) => json!({
                    "type": "response",
                    "request_seq": seq,
                    "command": command,
                    "success": true,
                    "body": body,
                }),
                Err(message) => json!({
                    "type": "response",
                    "request_seq": seq,
                    "command": command,
                    "success": false,
                    "message": message,
                }),
            };
            if message_tx.send(response).is_err() {
                return;
            }

            // real adapters raise `initialized` around launch/attach
            if command == "launch" || command == "attach" {
                _ = message_tx.send(json!({"type": "event", "event": "initialized", "body": {}}));
            }
        }
    });

    let connection = AdapterConnection {
        reader: Box::new(ChannelReader { rx: message_rx }),
        writer: Box::new(RecordingWriter {
            tx: request_tx,
            log,
        }),
        child: None,
        stderr: None,
    };
    (adapter, connection)
}

// ---------------------------------- factory ----------------------------------

pub struct MockFactory {
    action: AdapterAction,
    stop_thread: Option<i64>,
    script_factory: Box<dyn FnMut() -> AdapterScript>,
    adapters: Arc<Mutex<Vec<MockAdapter>>>,
}

impl AdapterFactory for MockFactory {
    fn action(&self) -> AdapterAction {
        self.action
    }

    fn launch_payload(&self) -> Value {
        json!({"program": "/tmp/app.py"})
    }

    fn attach_payload(&self) -> Value {
        json!({"port": 5678})
    }

    fn async_stop_thread(&self) -> Option<i64> {
        self.stop_thread
    }

    fn connect(&mut self) -> Result<AdapterConnection, Error> {
        let (adapter, connection) = start_adapter((self.script_factory)());
        self.adapters.lock().unwrap().push(adapter);
        Ok(connection)
    }
}

// ---------------------------------- console ----------------------------------

#[derive(Clone, Default)]
pub struct TestConsole {
    lines: Arc<Mutex<Vec<String>>>,
    input_enabled: Arc<AtomicBool>,
}

impl TestConsole {
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.lines().iter().any(|l| l.contains(needle))
    }

    pub fn input_enabled(&self) -> bool {
        self.input_enabled.load(Ordering::SeqCst)
    }
}

impl ConsoleHook for TestConsole {
    fn output(&self, text: &str) {
        self.lines.lock().unwrap().push(text.to_string());
    }

    fn output_line(&self, text: &str) {
        self.lines.lock().unwrap().push(text.to_string());
    }

    fn start_input(&self) {
        self.input_enabled.store(true, Ordering::SeqCst);
    }

    fn stop_input(&self) {
        self.input_enabled.store(false, Ordering::SeqCst);
    }
}

// ---------------------------------- harness ----------------------------------

pub struct TestSession {
    pub debugger: Debugger<TestConsole>,
    pub console: TestConsole,
    events: Receiver<(u64, Event)>,
    adapters: Arc<Mutex<Vec<MockAdapter>>>,
}

impl TestSession {
    pub fn launch_with(script_factory: impl FnMut() -> AdapterScript + 'static) -> Self {
        Self::build(AdapterAction::Launch, None, script_factory)
    }

    pub fn launch() -> Self {
        Self::launch_with(AdapterScript::default)
    }

    pub fn attach_with(
        stop_thread: Option<i64>,
        script_factory: impl FnMut() -> AdapterScript + 'static,
    ) -> Self {
        Self::build(AdapterAction::Attach, stop_thread, script_factory)
    }

    fn build(
        action: AdapterAction,
        stop_thread: Option<i64>,
        script_factory: impl FnMut() -> AdapterScript + 'static,
    ) -> Self {
        let adapters = Arc::new(Mutex::new(Vec::new()));
        let factory = MockFactory {
            action,
            stop_thread,
            script_factory: Box::new(script_factory),
            adapters: Arc::clone(&adapters),
        };

        let console = TestConsole::default();
        let (event_tx, events) = channel();
        let mut debugger = Debugger::new(Box::new(factory), console.clone(), event_tx);
        debugger.start().expect("session start failed");

        Self {
            debugger,
            console,
            events,
            adapters,
        }
    }

    /// Apply the next queued adapter event to the session core.
    pub fn process_next(&mut self) -> EventOutcome {
        self.try_process_next().expect("event processing failed")
    }

    pub fn try_process_next(&mut self) -> Result<EventOutcome, Error> {
        let (generation, event) = self
            .events
            .recv_timeout(EVENT_TIMEOUT)
            .expect("no adapter event arrived");
        self.debugger.process_event(generation, event)
    }

    /// Process queued events until the session reaches `state`. Skips
    /// stale-session noise (e.g. the old reader's exit during a relaunch).
    pub fn process_until_state(&mut self, state: dapshell::debugger::SessionState) {
        for _ in 0..16 {
            if self.debugger.state() == state {
                return;
            }
            self.process_next();
        }
        panic!("session never reached state {state}");
    }

    pub fn emit(&self, event: &str, body: Value) {
        let adapters = self.adapters.lock().unwrap();
        adapters.last().expect("no adapter connected").emit(event, body);
    }

    pub fn adapter_count(&self) -> usize {
        self.adapters.lock().unwrap().len()
    }

    /// Requests received by the most recent adapter, by command name.
    pub fn requests_for(&self, command: &str) -> Vec<Value> {
        let adapters = self.adapters.lock().unwrap();
        adapters.last().expect("no adapter connected").requests_for(command)
    }

    pub fn request_commands(&self) -> Vec<String> {
        let adapters = self.adapters.lock().unwrap();
        adapters
            .last()
            .expect("no adapter connected")
            .request_commands()
    }
}
