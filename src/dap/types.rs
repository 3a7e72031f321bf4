//! Wire types: message envelopes, request arguments, response bodies and
//! event bodies. Only the fields this client consults are modelled; unknown
//! adapter fields are dropped on deserialization.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// DAP request envelope.
#[derive(Debug, Serialize)]
pub struct Request {
    pub seq: i64,
    #[serde(rename = "type")]
    pub r#type: &'static str,
    pub command: String,
    #[serde(skip_serializing_if = "Value::is_null")]
    pub arguments: Value,
}

/// DAP response envelope.
///
/// Note: the DAP specification allows responses with no `body` field at all.
/// Keeping the body as a `serde_json::Value` leaves decoding to the caller
/// that knows the expected shape.
#[derive(Debug, Deserialize)]
pub struct Response {
    pub request_seq: i64,
    pub success: bool,
    pub command: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub body: Value,
}

/// Adapter capabilities copied from the `initialize` response.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Capabilities {
    pub supports_configuration_done_request: Option<bool>,
    pub supports_function_breakpoints: Option<bool>,
    /// Custom extension: the adapter emits `readyForEvaluations` once
    /// evaluations are legal during the configuration phase.
    pub supports_ready_for_evaluations_event: Option<bool>,
}

impl Capabilities {
    pub fn configuration_done(&self) -> bool {
        self.supports_configuration_done_request.unwrap_or(false)
    }

    pub fn function_breakpoints(&self) -> bool {
        self.supports_function_breakpoints.unwrap_or(false)
    }

    pub fn ready_for_evaluations_event(&self) -> bool {
        self.supports_ready_for_evaluations_event.unwrap_or(false)
    }
}

/// Source descriptor. Either a local path or an adapter-side
/// `sourceReference` handle (or both).
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Source {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_reference: Option<i64>,
}

impl Source {
    pub fn from_path(path: impl Into<String>) -> Self {
        Source {
            path: Some(path.into()),
            ..Default::default()
        }
    }
}

/// Adapter view of a breakpoint, returned from `setBreakpoints`,
/// `setFunctionBreakpoints` and carried by `breakpoint` events.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BreakpointInfo {
    pub id: Option<u32>,
    pub verified: bool,
    pub message: Option<String>,
    pub source: Option<Source>,
    pub line: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StackFrame {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub source: Option<Source>,
    #[serde(default)]
    pub line: u32,
    #[serde(default)]
    pub column: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scope {
    pub name: String,
    pub variables_reference: i64,
    #[serde(default)]
    pub expensive: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Variable {
    pub name: String,
    pub value: String,
    #[serde(rename = "type", default)]
    pub type_name: Option<String>,
    #[serde(default)]
    pub variables_reference: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ThreadInfo {
    pub id: i64,
    pub name: String,
}

// ---------------------------------- request arguments ----------------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeArguments {
    #[serde(rename = "adapterID")]
    pub adapter_id: String,
    #[serde(rename = "clientID")]
    pub client_id: String,
    pub path_format: String,
    pub lines_start_at1: bool,
    pub columns_start_at1: bool,
}

#[derive(Debug, Serialize)]
pub struct SourceBreakpointArgument {
    pub line: u32,
}

#[derive(Debug, Serialize)]
pub struct SetBreakpointsArguments {
    pub source: Source,
    pub breakpoints: Vec<SourceBreakpointArgument>,
}

#[derive(Debug, Serialize)]
pub struct FunctionBreakpointArgument {
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct SetFunctionBreakpointsArguments {
    pub breakpoints: Vec<FunctionBreakpointArgument>,
}

#[derive(Debug, Serialize)]
pub struct SetExceptionBreakpointsArguments {
    pub filters: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StackTraceArguments {
    pub thread_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_frame: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub levels: Option<i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScopesArguments {
    pub frame_id: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VariablesArguments {
    pub variables_reference: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceArguments {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<Source>,
    pub source_reference: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContinueArguments {
    pub thread_id: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NextArguments {
    pub thread_id: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepInArguments {
    pub thread_id: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PauseArguments {
    pub thread_id: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluateArguments {
    pub expression: String,
    pub context: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frame_id: Option<i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisconnectArguments {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub terminate_debuggee: Option<bool>,
}

// ---------------------------------- response bodies ------------------------------------

#[derive(Debug, Deserialize)]
pub struct SetBreakpointsResponseBody {
    #[serde(default)]
    pub breakpoints: Vec<BreakpointInfo>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StackTraceResponseBody {
    #[serde(default)]
    pub stack_frames: Vec<StackFrame>,
}

#[derive(Debug, Deserialize)]
pub struct ScopesResponseBody {
    #[serde(default)]
    pub scopes: Vec<Scope>,
}

#[derive(Debug, Deserialize)]
pub struct VariablesResponseBody {
    #[serde(default)]
    pub variables: Vec<Variable>,
}

#[derive(Debug, Deserialize)]
pub struct ThreadsResponseBody {
    #[serde(default)]
    pub threads: Vec<ThreadInfo>,
}

#[derive(Debug, Deserialize)]
pub struct SourceResponseBody {
    pub content: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluateResponseBody {
    pub result: String,
    #[serde(rename = "type", default)]
    pub type_name: Option<String>,
    #[serde(default)]
    pub variables_reference: i64,
}

// ------------------------------------- events -------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoppedEventBody {
    pub reason: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub thread_id: Option<i64>,
    #[serde(default)]
    pub all_threads_stopped: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContinuedEventBody {
    pub thread_id: Option<i64>,
    pub all_threads_continued: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreadEventBody {
    pub reason: String,
    pub thread_id: i64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputEventBody {
    #[serde(default)]
    pub category: Option<String>,
    pub output: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BreakpointEventBody {
    pub reason: String,
    pub breakpoint: BreakpointInfo,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExitedEventBody {
    pub exit_code: i64,
}

/// Adapter notifications. The last two variants are synthesized by the
/// client itself and never appear on the wire.
#[derive(Debug, Clone)]
pub enum Event {
    Initialized,
    Stopped(StoppedEventBody),
    Continued(ContinuedEventBody),
    Thread(ThreadEventBody),
    Output(OutputEventBody),
    Breakpoint(BreakpointEventBody),
    Exited(ExitedEventBody),
    Terminated,
    ReadyForEvaluations,
    Unknown(String),
    /// The adapter connection is gone (process exit or broken pipe).
    AdapterExited,
    /// A fire-and-forget request (`launch`/`attach`/`disconnect`) was
    /// rejected by the adapter.
    RequestFailed { command: String, message: String },
}

impl Event {
    pub fn parse(name: &str, body: Value) -> Result<Event, serde_json::Error> {
        let event = match name {
            "initialized" => Event::Initialized,
            "stopped" => Event::Stopped(serde_json::from_value(body)?),
            "continued" => Event::Continued(serde_json::from_value(body)?),
            "thread" => Event::Thread(serde_json::from_value(body)?),
            "output" => Event::Output(serde_json::from_value(body)?),
            "breakpoint" => Event::Breakpoint(serde_json::from_value(body)?),
            "exited" => Event::Exited(serde_json::from_value(body)?),
            "terminated" => Event::Terminated,
            "readyForEvaluations" => Event::ReadyForEvaluations,
            unknown => Event::Unknown(unknown.to_string()),
        };
        Ok(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn initialize_arguments_use_dap_field_casing() {
        let args = InitializeArguments {
            adapter_id: "fbdbg".to_string(),
            client_id: "dapshell".to_string(),
            path_format: "path".to_string(),
            lines_start_at1: true,
            columns_start_at1: true,
        };
        let value = serde_json::to_value(&args).unwrap();
        assert_eq!(
            value,
            json!({
                "adapterID": "fbdbg",
                "clientID": "dapshell",
                "pathFormat": "path",
                "linesStartAt1": true,
                "columnsStartAt1": true,
            })
        );
    }

    #[test]
    fn stopped_event_parses_optional_fields() {
        let ev = Event::parse(
            "stopped",
            json!({"reason": "breakpoint", "threadId": 1, "allThreadsStopped": true}),
        )
        .unwrap();
        let Event::Stopped(body) = ev else {
            panic!("expected stopped event");
        };
        assert_eq!(body.reason, "breakpoint");
        assert_eq!(body.thread_id, Some(1));
        assert_eq!(body.all_threads_stopped, Some(true));
    }

    #[test]
    fn unknown_event_is_preserved_by_name() {
        let ev = Event::parse("telemetry", json!({})).unwrap();
        assert!(matches!(ev, Event::Unknown(name) if name == "telemetry"));
    }

    #[test]
    fn capabilities_default_to_unsupported() {
        let caps: Capabilities = serde_json::from_value(json!({})).unwrap();
        assert!(!caps.configuration_done());
        assert!(!caps.function_breakpoints());
        assert!(!caps.ready_for_evaluations_event());
    }
}
