//! Binary entrypoint that runs the scripted chatroom demo.

use std::process::ExitCode;

use chatroom_core::start_chatroom;

/// Run the demo and report its outcome as the process exit code.
fn main() -> ExitCode {
    start_chatroom::run()
}
