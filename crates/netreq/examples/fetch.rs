//! Fetch a URL with a request controller and print what it reports.
//!
//! Run with: cargo run -p netreq --example fetch -- <url> [GET|POST] [timeout-ms]
//!
//! Set `RUST_LOG=netreq=debug` to see the lifecycle events.

use std::sync::Arc;
use std::time::Duration;

use netreq::http::{ReadyState, RequestController};
use tokio::sync::Notify;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> netreq::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("netreq=info")),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let url = args.next().unwrap_or_else(|| "https://example.com/".to_string());
    let method = args.next().unwrap_or_else(|| "GET".to_string());
    let timeout_ms: u64 = args.next().and_then(|ms| ms.parse().ok()).unwrap_or(10_000);

    let controller = RequestController::system()?;
    controller.set_method_name(&method)?;
    controller.set_url(&url)?;
    controller.set_timeout(Duration::from_millis(timeout_ms))?;

    let done = Arc::new(Notify::new());
    let notify = done.clone();
    controller.ready_state_changed().connect(move |state| {
        println!("ready state: {state}");
        if *state == ReadyState::DONE {
            notify.notify_one();
        }
    });
    controller.timed_out().connect(move |_| println!("timed out after {timeout_ms} ms"));

    if !controller.send(()) {
        eprintln!("request was not sent");
        return Ok(());
    }
    done.notified().await;

    if controller.error_code().is_error() {
        println!(
            "error: {} ({}): {}",
            controller.error_code_text(),
            controller.error_code().category(),
            controller.error_string()
        );
        return Ok(());
    }

    for (name, value) in controller.response_headers() {
        println!("{name}: {value}");
    }
    println!();
    println!("{}", controller.response_text());
    Ok(())
}
