//! `wisemonk check-config`: load, validate and print the effective config
//! with secrets masked.

use std::path::Path;

use anyhow::{bail, Context, Result};
use wisemonk_config::{
    apply_all_defaults, collect_referenced_vars, read_config_value, redact, resolve_env_vars,
    validate, WisemonkConfig,
};

use crate::terminal_output::{note_error, note_info, note_success, note_warn, render_table, Column};

pub async fn run(path: &Path) -> Result<()> {
    note_info(&format!("Checking {}", path.display()));

    let raw = read_config_value(path).await?;
    let vars = collect_referenced_vars(&raw);
    if !vars.is_empty() {
        note_info(&format!("Environment variables referenced: {}", vars.join(", ")));
    }
    let value = resolve_env_vars(&raw)?;
    let config: WisemonkConfig =
        serde_json::from_value(value).context("Config does not match the expected structure")?;
    let config = apply_all_defaults(config);

    let report = validate(&config);
    for warning in &report.warnings {
        note_warn(&format!("{}: {}", warning.path, warning.message));
    }
    for error in &report.errors {
        note_error(&format!("{}: {}", error.path, error.message));
    }

    println!();
    print!("{}", channel_table(&config));
    println!();
    let effective = serde_json::to_value(&config)?;
    println!("{}", serde_yaml::to_string(&redact(&effective))?);

    if !report.is_valid() {
        bail!("{} config error(s)", report.errors.len());
    }
    note_success("Config is valid");
    Ok(())
}

fn channel_table(config: &WisemonkConfig) -> String {
    let columns = [
        Column::left("Channel"),
        Column::right("Interval"),
        Column::right("Max"),
        Column::left("Create topic in"),
        Column::left("Search over"),
    ];
    let rows: Vec<Vec<String>> = config
        .channels
        .iter()
        .map(|(id, ch)| {
            vec![
                id.clone(),
                ch.interval.clone(),
                ch.maxmsg.to_string(),
                ch.create_topic_in.clone(),
                ch.search_over.join(", "),
            ]
        })
        .collect();
    render_table(&columns, &rows)
}
