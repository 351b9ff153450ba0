//! `wisemonk status`: query a running server's status endpoint.

use anyhow::Result;
use serde_json::Value;

use crate::terminal_output::{note_success, note_warn, render_table, Column};

pub async fn run(port: u16) -> Result<()> {
    let url = format!("http://localhost:{port}/api/status");
    let response = match reqwest::Client::new().get(&url).send().await {
        Ok(resp) => resp,
        Err(_) => {
            note_warn(&format!("wisemonk is not running on port {port}"));
            return Ok(());
        }
    };
    let body: Value = response.json().await?;

    note_success(&format!(
        "wisemonk is running (up {}s, archive {})",
        body["uptime_seconds"].as_u64().unwrap_or_default(),
        if body["archive"].as_bool().unwrap_or(false) { "on" } else { "off" },
    ));
    let rows: Vec<Vec<String>> = body["channels"]
        .as_array()
        .map(|channels| {
            channels
                .iter()
                .filter_map(Value::as_str)
                .map(|c| vec![c.to_string()])
                .collect()
        })
        .unwrap_or_default();
    print!("{}", render_table(&[Column::left("Channel")], &rows));
    Ok(())
}
