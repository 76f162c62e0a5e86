use anyhow::Result;
use comfy_table::{Cell, Table};
use slackflow_core::{SlackWebClient, TriggerError};

use crate::config::CliConfig;
use crate::output::OutputFormat;
use crate::output::json::print_json;
use crate::output::table::print_table;

pub async fn run(config: &CliConfig, format: OutputFormat) -> Result<()> {
    let credentials = config.credentials();
    if credentials.bot_token.is_empty() {
        return Err(TriggerError::MissingCredential("bot_token").into());
    }

    let client = SlackWebClient::new(&config.connection)?;
    let mut channels = client.list_channels(&credentials.bot_token).await?;
    channels.sort_by(|a, b| a.name.cmp(&b.name));

    if format.is_json() {
        return print_json(&channels);
    }

    if channels.is_empty() {
        println!("No channels found.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["ID", "Name", "Private", "Purpose"]);
    for channel in &channels {
        table.add_row(vec![
            Cell::new(&channel.id),
            Cell::new(channel.display_name()),
            Cell::new(if channel.is_private { "yes" } else { "" }),
            Cell::new(&channel.purpose),
        ]);
    }

    print_table(table)
}
