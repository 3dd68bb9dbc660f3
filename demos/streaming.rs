//! Streaming demo: decode typed events from an SSE endpoint as they arrive.

use futures::StreamExt;
use pulse_gateway::{PulseClient, Result};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct Progress {
    p: f64,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("pulse_gateway=debug")
        .init();

    let client = PulseClient::builder()
        .base_url("http://localhost:8080/v1")
        .build()?;

    let mut events = client
        .stream_events::<Progress>(client.get("/progress")?)
        .await?;

    while let Some(event) = events.next().await {
        let event = event?;
        println!("progress: {:.0}%", event.p * 100.0);
    }

    Ok(())
}
