use anyhow::Result;
use comfy_table::{Cell, Table};
use slackflow_models::{CATEGORY_CATALOG, Category};

use crate::output::OutputFormat;
use crate::output::json::print_json;
use crate::output::table::print_table;

pub fn run(format: OutputFormat) -> Result<()> {
    if format.is_json() {
        return print_json(&CATEGORY_CATALOG);
    }

    let mut table = Table::new();
    table.set_header(vec!["Value", "Name", "Ack", "Description"]);

    for info in CATEGORY_CATALOG {
        let needs_ack = Category::parse(info.value).needs_ack();
        table.add_row(vec![
            Cell::new(info.value),
            Cell::new(info.label),
            Cell::new(if needs_ack { "yes" } else { "" }),
            Cell::new(info.description),
        ]);
    }

    print_table(table)
}
