use crate::common::{AdapterScript, TestSession};
use dapshell::dap::types::Source;
use dapshell::debugger::{Error, SessionState};
use serde_json::json;

fn stopped_session_with(script: impl FnMut() -> AdapterScript + 'static) -> TestSession {
    let mut s = TestSession::launch_with(script);
    s.process_next(); // Configuring
    s.debugger.run().unwrap();
    s.emit(
        "stopped",
        json!({"reason": "breakpoint", "threadId": 1, "allThreadsStopped": true}),
    );
    s.process_next();
    assert_eq!(s.debugger.state(), SessionState::Stopped);
    s
}

fn stopped_session() -> TestSession {
    stopped_session_with(AdapterScript::default)
}

fn reference_source(reference: i64) -> Source {
    Source {
        name: None,
        path: None,
        source_reference: Some(reference),
    }
}

#[test]
fn missing_scope_is_an_error() {
    let mut s = stopped_session();
    assert!(matches!(
        s.debugger.get_variables(Some("Registers")),
        Err(Error::NoSuchScope(name)) if name == "Registers"
    ));
}

#[test]
fn default_variables_skip_expensive_scopes() {
    let mut s = stopped_session();
    let scopes = s.debugger.get_variables(None).unwrap();
    assert_eq!(scopes.len(), 1);
    assert_eq!(scopes[0].name, "Locals");
    assert!(!scopes[0].expensive);
    let names: Vec<_> = scopes[0].variables.iter().map(|v| v.name.as_str()).collect();
    assert_eq!(names, ["x", "y"]);
}

#[test]
fn named_scope_may_be_expensive() {
    let mut s = stopped_session();
    let scopes = s.debugger.get_variables(Some("Globals")).unwrap();
    assert_eq!(scopes.len(), 1);
    assert!(scopes[0].expensive);
    assert_eq!(scopes[0].variables[0].name, "G");
}

#[test]
fn source_reference_content_is_fetched_and_cr_stripped() {
    let s = stopped_session();
    let lines = s.debugger.get_source_lines(&reference_source(9), 1, 2);
    assert_eq!(lines, ["a", "b"]);
}

#[test]
fn source_listing_boundaries() {
    let s = stopped_session();
    // content has three lines; starting past the end yields nothing
    assert!(s
        .debugger
        .get_source_lines(&reference_source(9), 4, 2)
        .is_empty());
    // an oversized length is clamped to the end
    let lines = s.debugger.get_source_lines(&reference_source(9), 2, 100);
    assert_eq!(lines, ["b", "c"]);
}

#[test]
fn frame_switch_beyond_stack_fails() {
    let mut s = stopped_session();
    assert!(matches!(
        s.debugger.set_selected_frame(5),
        Err(Error::NoSuchFrame(5))
    ));
}

#[test]
fn evaluate_attaches_frame_only_when_stopped() {
    let mut s = stopped_session();
    s.debugger.evaluate("x").unwrap();
    let evaluate = s.requests_for("evaluate");
    assert_eq!(evaluate.last().unwrap()["arguments"]["frameId"], 100);
    assert_eq!(evaluate.last().unwrap()["arguments"]["context"], "repl");

    s.debugger.continue_execution().unwrap();
    s.debugger.evaluate("x").unwrap();
    let evaluate = s.requests_for("evaluate");
    assert!(
        evaluate.last().unwrap()["arguments"]
            .get("frameId")
            .is_none()
    );
}

#[test]
fn backtrace_requires_a_stopped_debuggee() {
    let mut s = stopped_session();
    s.debugger.continue_execution().unwrap();
    assert!(matches!(
        s.debugger.get_stack_trace(None, None),
        Err(Error::StateViolation { .. })
    ));
}

#[test]
fn stack_trace_is_returned_verbatim() {
    let mut s = stopped_session_with(|| {
        AdapterScript::default().on("stackTrace", |_| {
            Ok(json!({
                "stackFrames": [
                    {"id": 1, "name": "inner", "line": 4, "column": 1, "source": {"path": "/a.py"}},
                    {"id": 2, "name": "outer", "line": 20, "column": 1, "source": {"path": "/b.py"}},
                ],
            }))
        })
    });
    let frames = s.debugger.get_stack_trace(None, Some(2)).unwrap();
    let names: Vec<_> = frames.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, ["inner", "outer"]);

    let trace = s.requests_for("stackTrace");
    assert_eq!(trace.last().unwrap()["arguments"]["levels"], 2);
}

#[test]
fn stop_marks_every_thread_stopped() {
    let mut s = stopped_session_with(|| {
        AdapterScript::default().with_threads(vec![(1, "main"), (2, "worker")])
    });
    let threads = s.debugger.get_threads().unwrap();
    assert_eq!(threads.len(), 2);
    assert!(threads.iter().all(|t| !t.running));
    assert!(threads.iter().all(|t| t.selected_frame == 0));
}

#[test]
fn focus_switch_requires_existing_thread() {
    let mut s = stopped_session_with(|| {
        AdapterScript::default().with_threads(vec![(1, "main"), (2, "worker")])
    });
    s.debugger.set_focus_thread(2).unwrap();
    assert_eq!(s.debugger.focus_thread().unwrap().id, 2);
    assert!(matches!(
        s.debugger.set_focus_thread(9),
        Err(Error::NoSuchThread(9))
    ));
}

#[test]
fn stop_report_shows_the_top_frame() {
    let s = stopped_session();
    assert!(s.console.contains("stopped: breakpoint"));
    assert!(s.console.contains("at main (/a.py:10)"));
}

#[test]
fn threads_are_refreshed_from_thread_events() {
    let mut s = stopped_session();
    s.emit("thread", json!({"reason": "started", "threadId": 5}));
    s.process_next();
    let threads = s.debugger.threads_snapshot();
    assert!(threads.iter().any(|t| t.id == 5 && t.running));

    s.emit("thread", json!({"reason": "exited", "threadId": 5}));
    s.process_next();
    assert!(!s.debugger.threads_snapshot().iter().any(|t| t.id == 5));
}

#[test]
fn evaluate_result_round_trip() {
    let mut s = stopped_session();
    let result = s.debugger.evaluate("x + y").unwrap();
    assert_eq!(result.result, "42");
    assert_eq!(result.type_name.as_deref(), Some("int"));
}
