use crate::common::{AdapterScript, TestSession};
use dapshell::debugger::breakpoint::{Breakpoint, UNVERIFIED_MESSAGE};
use dapshell::debugger::{Error, SessionState};
use serde_json::json;
use std::path::Path;

#[test]
fn unverified_breakpoint_gets_substitute_message_and_event_update() {
    let mut s = TestSession::launch_with(|| {
        AdapterScript::default().on("setBreakpoints", |_| {
            Ok(json!({"breakpoints": [{"id": 42, "verified": false}]}))
        })
    });
    s.process_next(); // Configuring

    s.debugger.add_breakpoint("/x", 5).unwrap();
    let bp = &s.debugger.breakpoints_snapshot()[0];
    assert_eq!(bp.id(), Some(42));
    assert!(!bp.verified());
    assert_eq!(bp.message(), Some(UNVERIFIED_MESSAGE));

    s.emit(
        "breakpoint",
        json!({"reason": "changed", "breakpoint": {"id": 42, "verified": true}}),
    );
    s.process_next();
    let bp = &s.debugger.breakpoints_snapshot()[0];
    assert!(bp.verified());
    assert_eq!(bp.message(), None);
}

#[test]
fn function_breakpoints_require_capability() {
    let mut s = TestSession::launch_with(|| {
        AdapterScript::default().with_capabilities(json!({
            "supportsConfigurationDoneRequest": true,
            "supportsFunctionBreakpoints": false,
        }))
    });
    s.process_next();

    assert!(matches!(
        s.debugger.add_function_breakpoint("main"),
        Err(Error::CapabilityNotSupported("function breakpoints"))
    ));
}

#[test]
fn every_mutation_resends_the_whole_source_set() {
    let mut s = TestSession::launch();
    s.process_next();

    let b1 = s.debugger.add_breakpoint("/a.py", 1).unwrap();
    let b2 = s.debugger.add_breakpoint("/a.py", 2).unwrap();
    let requests = s.requests_for("setBreakpoints");
    assert_eq!(requests.len(), 2);
    assert_eq!(
        requests[1]["arguments"]["breakpoints"].as_array().unwrap().len(),
        2
    );

    s.debugger.set_breakpoint_enabled(b1, false).unwrap();
    let requests = s.requests_for("setBreakpoints");
    assert_eq!(
        requests.last().unwrap()["arguments"]["breakpoints"]
            .as_array()
            .unwrap()
            .len(),
        1
    );

    // removing the last enabled breakpoint clears the source on the adapter
    s.debugger.remove_breakpoint(b2).unwrap();
    let requests = s.requests_for("setBreakpoints");
    assert_eq!(
        requests.last().unwrap()["arguments"]["breakpoints"]
            .as_array()
            .unwrap()
            .len(),
        0
    );
}

#[test]
fn function_breakpoint_location_is_resolved_from_response() {
    let mut s = TestSession::launch_with(|| {
        AdapterScript::default().on("setFunctionBreakpoints", |_| {
            Ok(json!({
                "breakpoints": [
                    {"id": 9, "verified": true, "line": 3, "source": {"path": "/src/main.py"}},
                ],
            }))
        })
    });
    s.process_next();

    let number = s.debugger.add_function_breakpoint("main").unwrap();
    let snapshot = s.debugger.breakpoints_snapshot();
    let Breakpoint::Function(b) = &snapshot[0] else {
        panic!("expected function breakpoint");
    };
    assert_eq!(b.number, number);
    assert_eq!(b.resolved_path.as_deref(), Some(Path::new("/src/main.py")));
    assert_eq!(b.resolved_line, Some(3));
}

#[test]
fn breakpoints_survive_relaunch_and_resend_on_run() {
    let mut s = TestSession::launch();
    s.process_next();
    s.debugger.add_breakpoint("/a.py", 3).unwrap();

    s.emit("terminated", json!({}));
    s.process_next();
    assert_eq!(s.adapter_count(), 2);
    s.process_until_state(SessionState::Configuring);

    assert_eq!(s.debugger.breakpoints_snapshot().len(), 1);
    s.debugger.run().unwrap();
    let requests = s.requests_for("setBreakpoints");
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0]["arguments"]["source"]["path"], "/a.py");
}

#[test]
fn clear_breakpoints_resets_every_known_source() {
    let mut s = TestSession::launch();
    s.process_next();
    s.debugger.add_breakpoint("/a.py", 1).unwrap();
    s.debugger.add_breakpoint("/b.py", 2).unwrap();

    s.debugger.clear_breakpoints().unwrap();
    assert!(s.debugger.breakpoints_snapshot().is_empty());

    let requests = s.requests_for("setBreakpoints");
    let cleared: Vec<_> = requests
        .iter()
        .rev()
        .take(2)
        .map(|r| {
            (
                r["arguments"]["source"]["path"].as_str().unwrap().to_string(),
                r["arguments"]["breakpoints"].as_array().unwrap().len(),
            )
        })
        .collect();
    assert!(cleared.contains(&("/a.py".to_string(), 0)));
    assert!(cleared.contains(&("/b.py".to_string(), 0)));
}
