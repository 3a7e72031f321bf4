use crate::common::{AdapterScript, TestSession};
use dapshell::debugger::{Error, EventOutcome, SessionState};
use serde_json::{Value, json};

/// Capabilities of an adapter that gates pre-launch evaluations behind the
/// `readyForEvaluations` custom event.
fn ready_gated_caps() -> Value {
    json!({
        "supportsConfigurationDoneRequest": true,
        "supportsFunctionBreakpoints": true,
        "supportsReadyForEvaluationsEvent": true,
    })
}

#[test]
fn launch_breakpoint_stop_continue_exit_flow() {
    let mut s = TestSession::launch_with(|| {
        AdapterScript::default().with_capabilities(ready_gated_caps())
    });
    assert_eq!(s.debugger.state(), SessionState::Initializing);
    assert!(!s.console.input_enabled());

    assert_eq!(s.process_next(), EventOutcome::Continue); // initialized
    assert_eq!(s.debugger.state(), SessionState::Configuring);
    assert!(!s.console.input_enabled());

    let number = s.debugger.add_breakpoint("/a.py", 10).unwrap();
    assert_eq!(number, 1);

    s.debugger.run().unwrap();
    assert_eq!(s.debugger.state(), SessionState::Running);
    assert!(!s.console.input_enabled());
    let commands = s.request_commands();
    let tail: Vec<&str> = commands[commands.len() - 4..]
        .iter()
        .map(String::as_str)
        .collect();
    assert_eq!(
        tail,
        [
            "setBreakpoints",
            "setExceptionBreakpoints",
            "configurationDone",
            "threads"
        ]
    );

    s.emit(
        "stopped",
        json!({"reason": "breakpoint", "threadId": 1, "allThreadsStopped": true}),
    );
    s.process_next();
    assert_eq!(s.debugger.state(), SessionState::Stopped);
    assert!(s.console.input_enabled());
    assert_eq!(s.debugger.focus_thread().unwrap().id, 1);

    s.debugger.continue_execution().unwrap();
    assert_eq!(s.debugger.state(), SessionState::Running);
    assert!(!s.console.input_enabled());

    s.emit("continued", json!({"allThreadsContinued": true}));
    s.process_next();
    assert_eq!(s.debugger.state(), SessionState::Running);

    s.emit("exited", json!({"exitCode": 0}));
    assert_eq!(s.process_next(), EventOutcome::Continue);

    // launch mode restarts the target; breakpoints survive the relaunch
    assert_eq!(s.adapter_count(), 2);
    assert!(s.console.contains("Program exited with code 0"));
    let breakpoints = s.debugger.breakpoints_snapshot();
    assert_eq!(breakpoints.len(), 1);
    assert_eq!(breakpoints[0].number(), 1);

    s.process_until_state(SessionState::Configuring);
}

#[test]
fn attach_configures_immediately_and_pauses_stop_thread() {
    let mut s = TestSession::attach_with(Some(7), || {
        AdapterScript::default().with_threads(vec![(7, "worker")])
    });
    s.process_next(); // initialized
    assert_eq!(s.debugger.state(), SessionState::Running);

    let commands = s.request_commands();
    let tail: Vec<&str> = commands[commands.len() - 4..]
        .iter()
        .map(String::as_str)
        .collect();
    assert_eq!(
        tail,
        ["setExceptionBreakpoints", "configurationDone", "threads", "pause"]
    );
    let pause = s.requests_for("pause");
    assert_eq!(pause[0]["arguments"]["threadId"], 7);
}

#[test]
fn attach_mode_exits_on_termination() {
    let mut s = TestSession::attach_with(None, AdapterScript::default);
    s.process_next();
    s.emit("terminated", json!({}));
    assert_eq!(s.process_next(), EventOutcome::Exit);
    assert!(matches!(
        s.debugger.get_threads(),
        Err(Error::NoActiveSession)
    ));
}

#[test]
fn termination_is_handled_once() {
    let mut s = TestSession::launch();
    s.process_next(); // initialized
    s.emit("exited", json!({"exitCode": 1}));
    s.emit("terminated", json!({}));

    s.process_next(); // exited: relaunch
    assert_eq!(s.adapter_count(), 2);
    s.process_next(); // terminated of the old session: dropped
    assert_eq!(s.adapter_count(), 2);
}

#[test]
fn rejected_launch_is_fatal() {
    let mut s = TestSession::launch_with(|| {
        AdapterScript::default().on("launch", |_| Err("no such program".to_string()))
    });
    let err = loop {
        match s.try_process_next() {
            Err(e) => break e,
            Ok(_) => {}
        }
    };
    assert!(err.is_fatal());
    assert!(matches!(err, Error::FatalSession(_)));
}

#[test]
fn ready_for_evaluations_gates_configuring_input() {
    let mut s = TestSession::launch_with(|| {
        AdapterScript::default().with_capabilities(ready_gated_caps())
    });
    s.process_next();
    assert_eq!(s.debugger.state(), SessionState::Configuring);
    assert!(!s.console.input_enabled());

    s.emit("readyForEvaluations", json!({}));
    s.process_next();
    assert!(s.console.input_enabled());
}

#[test]
fn input_enabled_from_start_without_ready_capability() {
    let mut s = TestSession::launch();
    s.process_next();
    assert_eq!(s.debugger.state(), SessionState::Configuring);
    assert!(s.console.input_enabled());

    // evaluations are legal right away, without a frame attached
    s.debugger.evaluate("1 + 1").unwrap();
    let evaluate = s.requests_for("evaluate");
    assert!(evaluate[0]["arguments"].get("frameId").is_none());
}

#[test]
fn illegal_commands_yield_state_violation_without_mutation() {
    let mut s = TestSession::launch();
    s.process_next(); // Configuring

    assert!(matches!(
        s.debugger.continue_execution(),
        Err(Error::StateViolation { .. })
    ));
    assert!(matches!(
        s.debugger.step_into(),
        Err(Error::StateViolation { .. })
    ));
    assert!(matches!(
        s.debugger.pause(),
        Err(Error::StateViolation { .. })
    ));
    assert!(s.debugger.breakpoints_snapshot().is_empty());
    assert!(s.debugger.get_threads().unwrap().is_empty());

    s.debugger.run().unwrap();
    assert!(matches!(
        s.debugger.run(),
        Err(Error::StateViolation { .. })
    ));
}

#[test]
fn output_events_reach_console() {
    let mut s = TestSession::launch();
    s.process_next();
    s.emit("output", json!({"category": "stdout", "output": "hello from debuggee\n"}));
    s.process_next();
    assert!(s.console.contains("hello from debuggee"));
}
