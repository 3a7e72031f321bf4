//! Debugger session core.
//!
//! Owns the adapter session and the local models built from it: the
//! breakpoint registry, the thread registry and the source cache. Console
//! commands arrive through the public methods; adapter notifications arrive
//! through [`Debugger::process_event`]. Both run on the application loop
//! thread, so a command always completes before the next event is applied.

pub mod adapter;
pub mod breakpoint;
mod error;
pub mod source;
pub mod thread;

pub use error::Error;

use crate::dap::client::DebugSession;
use crate::dap::types::{
    Event, EvaluateResponseBody, InitializeArguments, Capabilities, Scope, Source,
    SourceBreakpointArgument, SetBreakpointsArguments, SetFunctionBreakpointsArguments,
    FunctionBreakpointArgument, StackFrame, StoppedEventBody, ContinuedEventBody, ThreadEventBody,
    OutputEventBody, BreakpointEventBody, Variable,
};
use adapter::{AdapterAction, AdapterFactory};
use breakpoint::{Breakpoint, BreakpointRegistry};
use log::{debug, warn};
use source::SourceCache;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::process::{Child, ChildStderr};
use std::sync::mpsc::Sender;
use std::thread as os_thread;
use strum_macros::Display;
use thread::{Thread, ThreadRegistry};

/// Session lifecycle phase. Determines which console commands are legal and
/// whether the prompt is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum SessionState {
    #[strum(serialize = "initializing")]
    Initializing,
    #[strum(serialize = "configuring")]
    Configuring,
    #[strum(serialize = "running")]
    Running,
    #[strum(serialize = "stopped")]
    Stopped,
    #[strum(serialize = "terminated")]
    Terminated,
}

/// Console surface the session core talks to.
///
/// `start_input`/`stop_input` gate the prompt: the console must not read a
/// command line unless input is enabled, so debuggee output never
/// interleaves with a half-typed command.
pub trait ConsoleHook {
    fn output(&self, text: &str);
    fn output_line(&self, text: &str);
    fn start_input(&self);
    fn stop_input(&self);
}

/// What the application loop should do after an event was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventOutcome {
    Continue,
    Exit,
}

/// Variables of one scope of the selected frame.
#[derive(Debug)]
pub struct ScopeVariables {
    pub name: String,
    pub expensive: bool,
    pub variables: Vec<Variable>,
}

pub struct Debugger<H: ConsoleHook> {
    hook: H,
    factory: Box<dyn AdapterFactory>,
    events: Sender<(u64, Event)>,

    session: Option<DebugSession>,
    adapter_process: Option<Child>,
    generation: u64,

    state: SessionState,
    capabilities: Capabilities,
    ready_for_evaluations: bool,
    terminated: bool,

    breakpoints: BreakpointRegistry,
    threads: ThreadRegistry,
    sources: SourceCache,
}

impl<H: ConsoleHook> Debugger<H> {
    pub fn new(factory: Box<dyn AdapterFactory>, hook: H, events: Sender<(u64, Event)>) -> Self {
        Self {
            hook,
            factory,
            events,
            session: None,
            adapter_process: None,
            generation: 0,
            state: SessionState::Terminated,
            capabilities: Capabilities::default(),
            ready_for_evaluations: false,
            terminated: true,
            breakpoints: BreakpointRegistry::default(),
            threads: ThreadRegistry::default(),
            sources: SourceCache::new(Box::new(|_| Err(Error::NoActiveSession))),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn launch_mode(&self) -> bool {
        self.factory.action() == AdapterAction::Launch
    }

    fn session(&self) -> Result<DebugSession, Error> {
        self.session.clone().ok_or(Error::NoActiveSession)
    }

    // ------------------------------------ lifecycle ------------------------------------

    /// Create the first session. Resets breakpoints: a fresh `launch` starts
    /// from a clean slate, unlike `relaunch` which preserves them.
    pub fn start(&mut self) -> Result<(), Error> {
        self.breakpoints.clear();
        self.create_session()
    }

    /// Tear the current session down and start over with breakpoints kept.
    pub fn relaunch(&mut self) -> Result<(), Error> {
        self.close_session();
        self.create_session()
    }

    /// Disconnect from the adapter and drop the session. Per-session models
    /// (threads, cached sources) go with it; breakpoints stay.
    pub fn close_session(&mut self) {
        if let Some(session) = self.session.take() {
            _ = session.disconnect();
        }
        if let Some(mut child) = self.adapter_process.take() {
            _ = child.kill();
            _ = child.wait();
        }
        self.sources.flush();
        self.threads = ThreadRegistry::default();
        self.state = SessionState::Terminated;
    }

    fn create_session(&mut self) -> Result<(), Error> {
        debug_assert!(self.session.is_none());

        let connection = self.factory.connect()?;
        if let Some(stderr) = connection.stderr {
            drain_adapter_stderr(stderr);
        }
        self.adapter_process = connection.child;

        self.generation += 1;
        let session = DebugSession::start(
            connection.reader,
            connection.writer,
            self.generation,
            self.events.clone(),
        );

        let fetch = session.clone();
        self.sources = SourceCache::new(Box::new(move |reference| {
            fetch.source(reference).map_err(Error::from)
        }));
        self.threads = ThreadRegistry::default();
        self.state = SessionState::Initializing;
        self.terminated = false;

        let capabilities = session
            .initialize(&InitializeArguments {
                adapter_id: "fbdbg".to_string(),
                client_id: "dapshell".to_string(),
                path_format: "path".to_string(),
                lines_start_at1: true,
                columns_start_at1: true,
            })
            .map_err(|e| Error::FatalSession(format!("initialize: {e}")))?;
        // Without the custom capability there is no event to wait for, so
        // evaluations are considered possible from the session start.
        self.ready_for_evaluations = !capabilities.ready_for_evaluations_event();
        self.capabilities = capabilities;

        let result = match self.factory.action() {
            AdapterAction::Launch => session.launch(self.factory.launch_payload()),
            AdapterAction::Attach => session.attach(self.factory.attach_payload()),
        };
        result.map_err(|e| Error::FatalSession(format!("{e}")))?;

        self.session = Some(session);
        self.refresh_input_gate();
        Ok(())
    }

    // ------------------------------------ input gate -----------------------------------

    fn input_enabled(&self) -> bool {
        match self.state {
            SessionState::Stopped => true,
            SessionState::Configuring => self.ready_for_evaluations,
            _ => false,
        }
    }

    /// Re-derive the prompt gate from the current state. Safe to call any
    /// number of times.
    pub fn refresh_input_gate(&self) {
        if self.input_enabled() {
            self.hook.start_input();
        } else {
            self.hook.stop_input();
        }
    }

    // ------------------------------------ execution ------------------------------------

    /// End the configuration phase and let the debuggee run.
    pub fn run(&mut self) -> Result<(), Error> {
        let session = self.session()?;
        if self.state != SessionState::Configuring {
            return Err(Error::StateViolation {
                state: self.state,
                operation: "run",
            });
        }
        self.configuration_done(&session)?;
        self.state = SessionState::Running;
        self.cache_threads()?;
        self.refresh_input_gate();
        Ok(())
    }

    pub fn continue_execution(&mut self) -> Result<(), Error> {
        self.resume("continue", |session, thread_id| {
            session.continue_execution(thread_id).map_err(Error::from)
        })
    }

    pub fn step_over(&mut self) -> Result<(), Error> {
        self.resume("next", |session, thread_id| {
            session.next(thread_id).map_err(Error::from)
        })
    }

    pub fn step_into(&mut self) -> Result<(), Error> {
        self.resume("step", |session, thread_id| {
            session.step_in(thread_id).map_err(Error::from)
        })
    }

    fn resume(
        &mut self,
        operation: &'static str,
        send: impl FnOnce(&DebugSession, i64) -> Result<(), Error>,
    ) -> Result<(), Error> {
        let session = self.session()?;
        if self.state != SessionState::Stopped {
            return Err(Error::StateViolation {
                state: self.state,
                operation,
            });
        }
        let thread_id = self.focus_thread_id()?;

        // Close the prompt before the request: output produced between the
        // request and the `continued` event must not interleave with it.
        self.hook.stop_input();
        if let Err(e) = send(&session, thread_id) {
            self.refresh_input_gate();
            return Err(e);
        }
        self.state = SessionState::Running;
        self.threads.mark_all_running();
        Ok(())
    }

    /// Interrupt a running debuggee.
    pub fn pause(&mut self) -> Result<(), Error> {
        let session = self.session()?;
        if self.state != SessionState::Running {
            return Err(Error::StateViolation {
                state: self.state,
                operation: "pause",
            });
        }
        let thread_id = self
            .threads
            .focus_id()
            .or_else(|| self.threads.first().map(|t| t.id))
            .ok_or(Error::NoFocusThread)?;
        session.pause(thread_id)?;
        Ok(())
    }

    fn focus_thread_id(&self) -> Result<i64, Error> {
        self.threads
            .focus_id()
            .or_else(|| self.threads.first_stopped().map(|t| t.id))
            .ok_or(Error::NoFocusThread)
    }

    // ------------------------------------ breakpoints ----------------------------------

    pub fn add_breakpoint(&mut self, path: &str, line: u32) -> Result<u32, Error> {
        let number = self.breakpoints.add_source(path, line);
        self.reconcile_source_now(Path::new(path))?;
        Ok(number)
    }

    pub fn add_function_breakpoint(&mut self, function: &str) -> Result<u32, Error> {
        let number = self.breakpoints.add_function(function);
        self.reconcile_functions_now()?;
        Ok(number)
    }

    pub fn remove_breakpoint(&mut self, number: u32) -> Result<Breakpoint, Error> {
        let bp = self.breakpoints.remove(number)?;
        match &bp {
            Breakpoint::Source(b) => {
                let path = b.path.clone();
                self.reconcile_source_now(&path)?;
            }
            Breakpoint::Function(_) => self.reconcile_functions_now()?,
        }
        Ok(bp)
    }

    /// Remove every breakpoint and clear the adapter state for all sources
    /// that had them.
    pub fn clear_breakpoints(&mut self) -> Result<(), Error> {
        let paths = self.breakpoints.source_paths();
        let had_functions = self.breakpoints.has_function_breakpoints();
        self.breakpoints.clear();

        for path in paths {
            self.reconcile_source_now(&path)?;
        }
        if had_functions && self.capabilities.function_breakpoints() {
            if let Some(session) = self.session.clone()
                && self.state != SessionState::Terminated
            {
                session.set_function_breakpoints(&SetFunctionBreakpointsArguments {
                    breakpoints: vec![],
                })?;
            }
        }
        Ok(())
    }

    pub fn set_breakpoint_enabled(&mut self, number: u32, enabled: bool) -> Result<(), Error> {
        self.breakpoints.set_enabled(number, enabled)?;
        let source_path = match self.breakpoints.get(number)? {
            Breakpoint::Source(b) => Some(b.path.clone()),
            Breakpoint::Function(_) => None,
        };
        match source_path {
            Some(path) => self.reconcile_source_now(&path),
            None => self.reconcile_functions_now(),
        }
    }

    pub fn breakpoints_snapshot(&self) -> Vec<Breakpoint> {
        self.breakpoints.all().cloned().collect()
    }

    /// Rebuild the adapter's breakpoint state from the registry: one
    /// `setBreakpoints` per known source plus the function-breakpoint set.
    fn reset_all_breakpoints(&mut self, session: &DebugSession) -> Result<(), Error> {
        for path in self.breakpoints.source_paths() {
            self.reconcile_source(session, &path)?;
        }
        self.reconcile_functions(session)?;
        Ok(())
    }

    fn reconcile_source(&mut self, session: &DebugSession, path: &Path) -> Result<(), Error> {
        let breakpoints = self
            .breakpoints
            .enabled_lines(path)
            .into_iter()
            .map(|line| SourceBreakpointArgument { line })
            .collect();
        let infos = session.set_breakpoints(&SetBreakpointsArguments {
            source: Source::from_path(path.display().to_string()),
            breakpoints,
        })?;
        self.breakpoints.sync_source(path, &infos);
        Ok(())
    }

    fn reconcile_functions(&mut self, session: &DebugSession) -> Result<(), Error> {
        if !self.breakpoints.has_function_breakpoints() {
            return Ok(());
        }
        if self.breakpoints.has_enabled_function_breakpoints()
            && !self.capabilities.function_breakpoints()
        {
            return Err(Error::CapabilityNotSupported("function breakpoints"));
        }
        if !self.capabilities.function_breakpoints() {
            return Ok(());
        }

        let breakpoints = self
            .breakpoints
            .enabled_function_names()
            .into_iter()
            .map(|name| FunctionBreakpointArgument { name })
            .collect();
        let infos =
            session.set_function_breakpoints(&SetFunctionBreakpointsArguments { breakpoints })?;
        self.breakpoints.sync_functions(&infos);
        Ok(())
    }

    /// Send the per-source replacement for one path right away, unless no
    /// session is up yet: pre-session breakpoints are batched and sent
    /// during the configuration phase.
    fn reconcile_source_now(&mut self, path: &Path) -> Result<(), Error> {
        let Some(session) = self.session.clone() else {
            return Ok(());
        };
        if self.state == SessionState::Terminated {
            return Ok(());
        }
        self.reconcile_source(&session, path)
    }

    fn reconcile_functions_now(&mut self) -> Result<(), Error> {
        let Some(session) = self.session.clone() else {
            return Ok(());
        };
        if self.state == SessionState::Terminated {
            return Ok(());
        }
        self.reconcile_functions(&session)
    }

    // ------------------------------------ threads --------------------------------------

    /// Current thread list. Refreshed from the adapter when the protocol
    /// allows a `threads` request in the current state.
    pub fn get_threads(&mut self) -> Result<Vec<Thread>, Error> {
        self.session()?;
        if matches!(self.state, SessionState::Running | SessionState::Stopped) {
            self.cache_threads()?;
        }
        Ok(self.threads.iter().cloned().collect())
    }

    /// Current local view of the thread set, without asking the adapter.
    pub fn threads_snapshot(&self) -> Vec<Thread> {
        self.threads.iter().cloned().collect()
    }

    pub fn focus_thread(&self) -> Option<Thread> {
        self.threads.focus().cloned()
    }

    pub fn set_focus_thread(&mut self, id: i64) -> Result<(), Error> {
        self.session()?;
        self.threads.set_focus(id)
    }

    fn cache_threads(&mut self) -> Result<(), Error> {
        let session = self.session()?;
        let list = session.threads()?;
        self.threads.update(list);
        Ok(())
    }

    // ------------------------------------ stack & data ---------------------------------

    /// Stack of a thread, the adapter's frame list verbatim.
    pub fn get_stack_trace(
        &mut self,
        thread_id: Option<i64>,
        levels: Option<i64>,
    ) -> Result<Vec<StackFrame>, Error> {
        let session = self.session()?;
        if self.state != SessionState::Stopped {
            return Err(Error::StateViolation {
                state: self.state,
                operation: "backtrace",
            });
        }
        let thread_id = match thread_id {
            Some(id) => {
                self.threads.get(id).ok_or(Error::NoSuchThread(id))?;
                id
            }
            None => self.focus_thread_id()?,
        };
        Ok(session.stack_trace(thread_id, levels)?)
    }

    /// Select the frame whose scopes and variables the data commands use.
    pub fn set_selected_frame(&mut self, index: u32) -> Result<StackFrame, Error> {
        let session = self.session()?;
        if self.state != SessionState::Stopped {
            return Err(Error::StateViolation {
                state: self.state,
                operation: "frame switch",
            });
        }
        let thread_id = self.focus_thread_id()?;
        let frames = session.stack_trace(thread_id, Some(i64::from(index) + 1))?;
        let frame = frames
            .into_iter()
            .nth(index as usize)
            .ok_or(Error::NoSuchFrame(index))?;
        self.threads.set_selected_frame(thread_id, index)?;
        Ok(frame)
    }

    /// Variables of the selected frame. With a scope name, exactly that
    /// scope; otherwise every scope not marked expensive.
    pub fn get_variables(&mut self, scope_name: Option<&str>) -> Result<Vec<ScopeVariables>, Error> {
        let session = self.session()?;
        if self.state != SessionState::Stopped {
            return Err(Error::StateViolation {
                state: self.state,
                operation: "var",
            });
        }

        let frame_id = self.selected_frame_id(&session)?;
        let scopes = session.scopes(frame_id)?;
        let retained: Vec<Scope> = match scope_name {
            Some(name) => {
                let matching: Vec<_> = scopes.into_iter().filter(|s| s.name == name).collect();
                if matching.is_empty() {
                    return Err(Error::NoSuchScope(name.to_string()));
                }
                matching
            }
            None => scopes.into_iter().filter(|s| !s.expensive).collect(),
        };

        retained
            .into_iter()
            .map(|scope| {
                Ok(ScopeVariables {
                    variables: session.variables(scope.variables_reference)?,
                    name: scope.name,
                    expensive: scope.expensive,
                })
            })
            .collect()
    }

    /// Evaluate an expression in the `repl` context. A frame is attached
    /// only when stopped: that is the only state in which one exists.
    pub fn evaluate(&mut self, expression: &str) -> Result<EvaluateResponseBody, Error> {
        let session = self.session()?;
        let frame_id = match self.state {
            SessionState::Stopped => self.selected_frame_id(&session).ok(),
            SessionState::Running => None,
            SessionState::Configuring if self.ready_for_evaluations => None,
            _ => {
                return Err(Error::StateViolation {
                    state: self.state,
                    operation: "print",
                });
            }
        };
        Ok(session.evaluate(expression, frame_id)?)
    }

    fn selected_frame_id(&self, session: &DebugSession) -> Result<i64, Error> {
        let thread = self
            .threads
            .focus()
            .or_else(|| self.threads.first_stopped())
            .ok_or(Error::NoFocusThread)?;
        let levels = i64::from(thread.selected_frame) + 1;
        let frames = session.stack_trace(thread.id, Some(levels))?;
        frames
            .into_iter()
            .nth(thread.selected_frame as usize)
            .map(|f| f.id)
            .ok_or(Error::NoSuchFrame(thread.selected_frame))
    }

    pub fn selected_frame(&self) -> Option<u32> {
        self.threads.focus().map(|t| t.selected_frame)
    }

    // ------------------------------------ sources --------------------------------------

    /// `length` lines starting at 1-based `start`. A start beyond the end
    /// of the content yields an empty list; a length beyond it is clamped.
    pub fn get_source_lines(&self, source: &Source, start: u32, length: u32) -> Vec<String> {
        let lines = if source.source_reference.unwrap_or(0) > 0 {
            self.sources
                .get_by_reference(source.source_reference.unwrap_or(0))
        } else if let Some(path) = &source.path {
            self.sources.get_by_path(Path::new(path))
        } else {
            return vec![];
        };

        let start = start.max(1) as usize - 1;
        if start >= lines.len() {
            return vec![];
        }
        let end = (start + length as usize).min(lines.len());
        lines[start..end].to_vec()
    }

    /// Source files this session has touched, for console completion hints.
    pub fn known_source_paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self
            .breakpoints
            .source_paths()
            .into_iter()
            .map(|p| p.display().to_string())
            .collect();
        paths.extend(
            self.sources
                .cached_paths()
                .into_iter()
                .map(|p| p.display().to_string()),
        );
        paths.sort();
        paths.dedup();
        paths
    }

    // ------------------------------------ events ---------------------------------------

    /// Apply one adapter notification. Events of a session that is no
    /// longer current (closed during a relaunch) are dropped.
    pub fn process_event(&mut self, generation: u64, event: Event) -> Result<EventOutcome, Error> {
        if self.session.as_ref().map(DebugSession::generation) != Some(generation) {
            debug!(target: "debugger", "event of stale session {generation} dropped");
            return Ok(EventOutcome::Continue);
        }

        match event {
            Event::Initialized => self.on_initialized()?,
            Event::Stopped(body) => self.on_stopped(body)?,
            Event::Continued(body) => self.on_continued(body),
            Event::Thread(body) => self.on_thread(body),
            Event::Output(body) => self.on_output(body),
            Event::Breakpoint(body) => self.on_breakpoint(body),
            Event::Exited(body) => {
                self.hook
                    .output_line(&format!("Program exited with code {}", body.exit_code));
                return self.on_termination();
            }
            Event::Terminated => return self.on_termination(),
            Event::AdapterExited => {
                warn!(target: "debugger", "debug adapter exited unexpectedly");
                return self.on_termination();
            }
            Event::ReadyForEvaluations => self.ready_for_evaluations = true,
            Event::RequestFailed { command, message } => {
                return Err(Error::FatalSession(format!("`{command}`: {message}")));
            }
            Event::Unknown(name) => debug!(target: "debugger", "ignore `{name}` event"),
        }

        self.refresh_input_gate();
        Ok(EventOutcome::Continue)
    }

    fn on_initialized(&mut self) -> Result<(), Error> {
        match self.factory.action() {
            AdapterAction::Launch => {
                self.state = SessionState::Configuring;
            }
            AdapterAction::Attach => {
                // No user-driven configuration phase on attach: finish the
                // handshake right away and leave the debuggee running.
                let session = self.session()?;
                self.configuration_done(&session)?;
                self.state = SessionState::Running;
                self.cache_threads()?;
                if let Some(thread_id) = self.factory.async_stop_thread() {
                    session.pause(thread_id)?;
                }
            }
        }
        Ok(())
    }

    /// The configuration handshake. `setExceptionBreakpoints` stays last
    /// among the breakpoint requests: for adapters without
    /// `configurationDone` it doubles as the end-of-configuration signal.
    fn configuration_done(&mut self, session: &DebugSession) -> Result<(), Error> {
        self.reset_all_breakpoints(session)?;
        session.set_exception_breakpoints(vec![])?;
        if self.capabilities.configuration_done() {
            session.configuration_done()?;
        }
        Ok(())
    }

    fn on_stopped(&mut self, body: StoppedEventBody) -> Result<(), Error> {
        self.state = SessionState::Stopped;
        self.cache_threads()?;

        if body.all_threads_stopped.unwrap_or(false) {
            self.threads.mark_all_stopped();
        } else if let Some(thread_id) = body.thread_id {
            self.threads.mark_stopped(thread_id);
        }

        let focus = body
            .thread_id
            .filter(|id| self.threads.get(*id).is_some())
            .or_else(|| self.threads.first_stopped().map(|t| t.id));
        if let Some(id) = focus {
            _ = self.threads.set_focus(id);
        }

        self.report_stop(&body);
        Ok(())
    }

    fn report_stop(&mut self, body: &StoppedEventBody) {
        let Some(thread) = self.threads.focus().cloned() else {
            self.hook
                .output_line(&format!("Debuggee stopped: {}", body.reason));
            return;
        };

        let mut status = format!("Thread {} ({}) stopped: {}", thread.id, thread.name, body.reason);
        if let Some(description) = &body.description {
            status.push_str(&format!(", {description}"));
        }
        self.hook.output_line(&status);

        let Some(session) = self.session.clone() else {
            return;
        };
        let top = crate::weak_error!(session.stack_trace(thread.id, Some(1)))
            .and_then(|frames| frames.into_iter().next());
        if let Some(frame) = top {
            let place = frame
                .source
                .as_ref()
                .and_then(|s| s.path.clone().or_else(|| s.name.clone()))
                .unwrap_or_else(|| "<unknown>".to_string());
            self.hook
                .output_line(&format!("at {} ({place}:{})", frame.name, frame.line));
            if let Some(source) = &frame.source {
                let text = self.get_source_lines(source, frame.line, 1);
                if let Some(text) = text.first() {
                    self.hook.output_line(&format!("{:>4} {}", frame.line, text));
                }
            }
        }
    }

    fn on_continued(&mut self, body: ContinuedEventBody) {
        if body.all_threads_continued.unwrap_or(false) {
            self.threads.mark_all_running();
        } else if let Some(thread_id) = body.thread_id {
            self.threads.mark_running(thread_id);
        }
        self.state = SessionState::Running;
    }

    fn on_thread(&mut self, body: ThreadEventBody) {
        match body.reason.as_str() {
            // The event carries no name; the next `threads` refresh does.
            "started" => self.threads.add(
                body.thread_id,
                format!("thread #{}", body.thread_id),
                true,
            ),
            "exited" => self.threads.remove(body.thread_id),
            other => debug!(target: "debugger", "ignore thread event `{other}`"),
        }
    }

    fn on_output(&mut self, body: OutputEventBody) {
        match body.category.as_deref() {
            Some("telemetry") => {}
            _ => self.hook.output(&body.output),
        }
    }

    fn on_breakpoint(&mut self, body: BreakpointEventBody) {
        debug!(target: "debugger", "breakpoint event: {}", body.reason);
        self.breakpoints.apply_event(&body.breakpoint);
    }

    /// `terminated`, `exited` and an unexpected adapter exit all funnel
    /// here, the first one wins. In launch mode the target is restarted; in
    /// attach mode there is nothing to restart and the CLI ends.
    fn on_termination(&mut self) -> Result<EventOutcome, Error> {
        if self.terminated {
            return Ok(EventOutcome::Continue);
        }
        self.terminated = true;
        self.state = SessionState::Terminated;

        if self.launch_mode() {
            self.hook
                .output_line("Debug session ended, relaunching the target");
            self.hook.start_input();
            self.relaunch()?;
            Ok(EventOutcome::Continue)
        } else {
            self.hook.output_line("Debug session ended");
            self.close_session();
            Ok(EventOutcome::Exit)
        }
    }
}

fn drain_adapter_stderr(stderr: ChildStderr) {
    os_thread::spawn(move || {
        let reader = BufReader::new(stderr);
        for line in reader.lines() {
            match line {
                Ok(line) => warn!(target: "adapter", "{line}"),
                Err(_) => break,
            }
        }
    });
}
