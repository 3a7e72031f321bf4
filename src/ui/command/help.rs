//! Console help texts.

pub const HELP: &str = "\
Available commands:
  run|r                              start the debuggee (after setting breakpoints)
  continue|c                         resume execution
  next|n                             step over the current line
  step|s                             step into a call
  pause                              interrupt a running debuggee
  break|b <file>:<line>              set a breakpoint at a source line
  break|b <function>                 set a breakpoint at a function
  break remove|r <num|file:line|fn>  remove breakpoints
  break enable|disable <num>         toggle a breakpoint
  break info                         list breakpoints
  break clear                        remove all breakpoints
  thread info|current|switch <id>    inspect or switch threads
  frame info|switch <num>            inspect or switch stack frames
  backtrace|bt [levels]              print the focused thread's stack
  var [scope]                        print variables of the selected frame
  print|p <expression>               evaluate an expression
  list|l [bounds]                    show source around the stop location
  help|h [command]                   this help
  quit|q                             exit the debugger";

const HELP_RUN: &str = "\
run|r
Finish the configuration phase and let the debuggee run. Breakpoints set
before `run` are sent to the adapter as part of the configuration handshake.";

const HELP_CONTINUE: &str = "\
continue|c
Resume execution of the stopped debuggee.";

const HELP_STEP: &str = "\
step|s
Step into the next function call.
next|n
Step over the current source line.";

const HELP_PAUSE: &str = "\
pause
Ask the adapter to interrupt the running debuggee.";

const HELP_BREAK: &str = "\
break|b <file>:<line>  - breakpoint at a source line
break|b <function>     - breakpoint at a function (adapter support required)
break remove|r <num>   - remove by breakpoint number, file:line or function
break enable <num>     - re-enable a disabled breakpoint
break disable <num>    - keep the breakpoint but stop hitting it
break info             - list all breakpoints with verification status
break clear            - remove all breakpoints";

const HELP_THREAD: &str = "\
thread info        - list debuggee threads
thread current     - show the focused thread
thread switch <id> - focus another thread";

const HELP_FRAME: &str = "\
frame info         - show the selected stack frame
frame switch <num> - select another frame of the focused thread";

const HELP_BACKTRACE: &str = "\
backtrace|bt [levels]
Print the stack of the focused thread, optionally limited to `levels`
frames.";

const HELP_VAR: &str = "\
var [scope]
Print the variables of the selected frame. Without an argument every
non-expensive scope is shown; with one, exactly the named scope.";

const HELP_PRINT: &str = "\
print|p <expression>
Evaluate an expression in the adapter's repl context.";

const HELP_LIST: &str = "\
list|l [bounds]
Show the source around the current stop location, `bounds` lines before and
after (default 5).";

/// Help text for a single command, or the overview.
pub fn for_command(command: Option<&str>) -> &'static str {
    match command {
        Some("run") | Some("r") => HELP_RUN,
        Some("continue") | Some("c") => HELP_CONTINUE,
        Some("step") | Some("s") | Some("next") | Some("n") => HELP_STEP,
        Some("pause") => HELP_PAUSE,
        Some("break") | Some("b") => HELP_BREAK,
        Some("thread") => HELP_THREAD,
        Some("frame") | Some("f") => HELP_FRAME,
        Some("backtrace") | Some("bt") => HELP_BACKTRACE,
        Some("var") => HELP_VAR,
        Some("print") | Some("p") => HELP_PRINT,
        Some("list") | Some("l") => HELP_LIST,
        _ => HELP,
    }
}
