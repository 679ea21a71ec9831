//! Binary entrypoint that serves the Perfomai chat client.

use std::process::ExitCode;

use perfomai_chat::start_chat_client;

/// Start the chat client server.
fn main() -> ExitCode {
    start_chat_client::run()
}
