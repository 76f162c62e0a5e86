use anyhow::{Result, bail};
use colored::Colorize;
use serde::Serialize;
use slackflow_core::trigger::scope::looks_like_conversation_id;
use slackflow_core::{ContentMatcher, EventPredicate};
use slackflow_models::Category;

use crate::config::CliConfig;
use crate::output::OutputFormat;
use crate::output::json::print_json;

#[derive(Debug, Serialize)]
struct CategoryCheck {
    id: String,
    listener: String,
    listed: bool,
    needs_ack: bool,
    content_filter: bool,
}

#[derive(Debug, Serialize)]
struct CheckReport {
    ok: bool,
    missing_credential: Option<&'static str>,
    categories: Vec<CategoryCheck>,
    pattern: Option<String>,
    flags: String,
    scope: Vec<String>,
    problems: Vec<String>,
    warnings: Vec<String>,
}

fn build_report(config: &CliConfig) -> CheckReport {
    let mut problems = Vec::new();
    let mut warnings = Vec::new();

    let missing_credential = config.credentials().missing_field();
    if let Some(field) = missing_credential {
        problems.push(format!("Missing required Slack credential: {}", field));
    }

    let trigger = &config.trigger;
    let categories: Vec<Category> = trigger.categories();
    if categories.is_empty() {
        problems.push("No trigger categories selected (trigger.trigger_on)".to_string());
    }

    let pattern = match ContentMatcher::compile(&trigger.regex_pattern, &trigger.regex_flags) {
        Ok(matcher) if matcher.is_active() => Some(trigger.regex_pattern.clone()),
        Ok(_) => None,
        Err(e) => {
            problems.push(e.to_string());
            None
        }
    };

    if pattern.is_some() && !categories.iter().any(Category::supports_content_filter) {
        warnings.push("Pattern is set but no selected category applies it".to_string());
    }

    for id in trigger.typed_channel_ids() {
        if !looks_like_conversation_id(id) {
            warnings.push(format!("'{}' does not look like a Slack conversation id", id));
        }
    }

    let categories = categories
        .iter()
        .map(|category| {
            if category.info().is_none() {
                warnings.push(format!(
                    "'{}' is not a listed category; subscribed as a raw event name",
                    category
                ));
            }
            CategoryCheck {
                id: category.id().to_string(),
                listener: category.wire_listener().to_string(),
                listed: category.info().is_some(),
                needs_ack: category.needs_ack(),
                content_filter: category.supports_content_filter(),
            }
        })
        .collect();

    CheckReport {
        ok: problems.is_empty(),
        missing_credential,
        categories,
        pattern,
        flags: trigger.regex_flags.clone(),
        scope: trigger.scope_channel_ids(),
        problems,
        warnings,
    }
}

pub fn run(config: &CliConfig, format: OutputFormat) -> Result<()> {
    let report = build_report(config);

    if format.is_json() {
        print_json(&report)?;
    } else {
        print_report(&report);
    }

    if !report.ok {
        bail!("Configuration check failed with {} problem(s)", report.problems.len());
    }
    Ok(())
}

fn print_report(report: &CheckReport) {
    let credentials = match report.missing_credential {
        None => "complete".green().to_string(),
        Some(field) => format!("missing {}", field).red().to_string(),
    };
    println!("{:<12} {}", "Credentials".bold(), credentials);

    println!("{:<12} {}", "Categories".bold(), report.categories.len());
    for category in &report.categories {
        let ack = if category.needs_ack { " (ack)" } else { "" };
        println!("  {} -> {}{}", category.id, category.listener, ack.dimmed());
    }

    match &report.pattern {
        Some(pattern) => println!("{:<12} /{}/{}", "Pattern".bold(), pattern, report.flags),
        None => println!("{:<12} {}", "Pattern".bold(), "none".dimmed()),
    }

    if report.scope.is_empty() {
        println!("{:<12} {}", "Scope".bold(), "all channels".dimmed());
    } else {
        println!("{:<12} {}", "Scope".bold(), report.scope.join(", "));
    }

    for warning in &report.warnings {
        println!("{} {}", "Warning:".yellow().bold(), warning);
    }
    for problem in &report.problems {
        println!("{} {}", "Problem:".red().bold(), problem);
    }

    if report.ok {
        println!("{}", "Configuration OK".green().bold());
    }
}
