#![forbid(unsafe_code)]

//! Binary entrypoint for the `maxbridge` CLI.

use std::process;

#[tokio::main]
async fn main() {
    let code = maxbridge_app::run().await;
    if code != 0 {
        process::exit(code);
    }
}
