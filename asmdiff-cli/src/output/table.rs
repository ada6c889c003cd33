//! Table rendering with `tabled`: one block per group under a heading.

use colored::Colorize;
use tabled::builder::Builder;
use tabled::settings::{object::Columns, Alignment, Modify, Style, Width};

use super::{OutputConfig, Row};

/// Rows grouped by [`Row::group`], groups in first-seen order, each printed
/// as its own table under the group name.
pub fn grouped_table<R: Row>(rows: &[R], config: &OutputConfig) -> String {
    if rows.is_empty() {
        return "(no results)".to_string();
    }

    let mut groups: Vec<(&str, Vec<&R>)> = Vec::new();
    for row in rows {
        match groups.iter_mut().find(|(name, _)| *name == row.group()) {
            Some((_, members)) => members.push(row),
            None => groups.push((row.group(), vec![row])),
        }
    }

    let blocks: Vec<String> = groups
        .into_iter()
        .map(|(name, members)| {
            let heading = if config.color {
                name.cyan().bold().to_string()
            } else {
                name.to_string()
            };

            let mut builder = Builder::default();
            builder.push_record(R::HEADERS.iter().copied());
            for row in members {
                builder.push_record(row.cells());
            }
            format!("{}\n{}", heading, finish(builder, config))
        })
        .collect();

    blocks.join("\n\n")
}

/// Two-column table with right-aligned labels, for report footers.
pub fn summary_table(pairs: &[(&str, String)], config: &OutputConfig) -> String {
    let mut builder = Builder::default();
    for (label, value) in pairs {
        builder.push_record([*label, value.as_str()]);
    }

    let mut table = builder.build();
    table.with(Modify::new(Columns::first()).with(Alignment::right()));
    if config.compact {
        table.with(Style::blank());
    } else {
        table.with(Style::rounded());
    }
    table.to_string()
}

fn finish(builder: Builder, config: &OutputConfig) -> String {
    let mut table = builder.build();
    if config.compact {
        table.with(Style::blank());
    } else {
        table.with(Style::rounded());
    }
    if let Some(width) = config.wrap_width() {
        table.with(Width::wrap(width).keep_words(true));
    }
    table.to_string()
}
