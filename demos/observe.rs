//! Observability demo: watch the log and status-event channels from
//! independent tasks while exchanges run.

use pulse_gateway::{LogEntry, PulseClient, Result, StatusEvent};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("pulse_gateway=debug")
        .init();

    let client = PulseClient::builder()
        .base_url("http://localhost:8080/v1")
        .build()?;

    let mut logs = client.logs();
    let log_task = tokio::spawn(async move {
        while let Some(entry) = logs.recv().await {
            match entry {
                LogEntry::Success { descriptor, status, .. } => {
                    println!("[log] {} -> {}", descriptor, status);
                }
                LogEntry::HttpError { descriptor, status, .. } => {
                    println!("[log] {} rejected with {}", descriptor, status);
                }
                LogEntry::DecodingError { descriptor, error, .. } => {
                    println!("[log] {} decode failed: {}", descriptor, error);
                }
            }
        }
    });

    let mut events = client.status_events();
    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            match event {
                StatusEvent::RateLimited { retry_after_secs, .. } => {
                    println!("[event] rate limited, retry after {:?}s", retry_after_secs);
                }
                other => println!("[event] {:?}", other),
            }
        }
    });

    // Errors still come back to the caller; the channels above see them too.
    if let Err(err) = client.send(client.get("/jobs")?).await {
        println!("caller saw: {}", err);
    }

    drop(client);
    let _ = log_task.await;
    Ok(())
}
