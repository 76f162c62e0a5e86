use colored::Colorize;

pub fn handle_error(err: anyhow::Error) -> ! {
    eprintln!("{} {:#}", "Error:".red().bold(), err);

    let msg = format!("{:#}", err).to_lowercase();

    if msg.contains("missing required slack credential") {
        eprintln!("\n{}", "Suggestion:".yellow().bold());
        eprintln!("  Add the tokens to the [credentials] section of the config file,");
        eprintln!("  or export them:");
        eprintln!(
            "  {} export SLACK_BOT_TOKEN=xoxb-... SLACK_APP_TOKEN=xapp-... SLACK_SIGNING_SECRET=...",
            "$".dimmed()
        );
    }

    if msg.contains("invalid filter pattern") {
        eprintln!("\n{}", "Suggestion:".yellow().bold());
        eprintln!("  Fix trigger.regex_pattern / trigger.regex_flags, then validate with:");
        eprintln!("  {} slackflow check", "$".dimmed());
    }

    if msg.contains("invalid_auth") || msg.contains("not_allowed_token_type") {
        eprintln!("\n{}", "Suggestion:".yellow().bold());
        eprintln!("  Socket Mode needs an app-level token (xapp-...) with connections:write.");
    }

    if msg.contains("connection refused") || msg.contains("network") {
        eprintln!("\n{}", "Suggestion:".yellow().bold());
        eprintln!("  Check your internet connection and proxy settings and try again.");
    }

    std::process::exit(1);
}
