use chrono::{DateTime, Utc};
use colored::Colorize;
use lettermerge::api::{CmdMessage, MessageLevel};
use lettermerge::category::CategoryCounts;
use lettermerge::commands::{DisplayRecord, FieldInfo};
use lettermerge::config::{MergeConfig, CONFIG_KEYS};
use lettermerge::model::Record;
use timeago::Formatter;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const LINE_WIDTH: usize = 100;
const TIME_WIDTH: usize = 14;
const CATEGORY_WIDTH: usize = 16;
const NAME_FIELDS: &[&str] = &["Full Name", "University Name", "Organization Name"];
const DETAIL_FIELDS: &[&str] = &["Designation", "State", "Email"];

pub(super) fn print_messages(messages: &[CmdMessage]) {
    for message in messages {
        match message.level {
            MessageLevel::Info => println!("{}", message.content.dimmed()),
            MessageLevel::Success => println!("{}", message.content.green()),
            MessageLevel::Warning => println!("{}", message.content.yellow()),
            MessageLevel::Error => println!("{}", message.content.red()),
        }
    }
}

pub(super) fn print_records(records: &[DisplayRecord]) {
    print!("{}", render_record_list(records));
}

pub(super) fn print_full_records(records: &[DisplayRecord]) {
    print!("{}", render_full_records(records));
}

/// One line per record: index, name and a few details, category, age.
pub(super) fn render_record_list(records: &[DisplayRecord]) -> String {
    let mut out = String::new();
    for dr in records {
        let idx_str = format!("{:>4}. ", dr.index);

        let category = dr
            .record
            .category_name()
            .or(dr.record.category_id())
            .unwrap_or("-");
        let category = format!(
            " {:<width$}",
            truncate_to_width(category, CATEGORY_WIDTH),
            width = CATEGORY_WIDTH
        );

        let summary = summarize(&dr.record);
        let fixed_width = idx_str.width() + category.width() + TIME_WIDTH;
        let available = LINE_WIDTH.saturating_sub(fixed_width);
        let summary = truncate_to_width(&summary, available);
        let padding = available.saturating_sub(summary.width());

        out.push_str(&format!(
            "{}{}{}{}{}\n",
            idx_str.yellow(),
            summary,
            " ".repeat(padding),
            category.cyan(),
            format_time_ago(dr.created_at).dimmed()
        ));
    }
    out
}

pub(super) fn render_full_records(records: &[DisplayRecord]) -> String {
    let mut out = String::new();
    for (i, dr) in records.iter().enumerate() {
        if i > 0 {
            out.push_str("\n================================\n\n");
        }
        let title = first_present(&dr.record, NAME_FIELDS).unwrap_or("(unnamed)");
        out.push_str(&format!("{} {}\n", dr.index.to_string().yellow(), title.bold()));
        out.push_str("--------------------------------\n");

        let key_width = dr
            .record
            .keys()
            .filter(|k| !k.starts_with('_'))
            .map(|k| k.width())
            .max()
            .unwrap_or(0);
        for (key, value) in dr.record.iter() {
            if key.starts_with('_') {
                continue;
            }
            let pad = key_width.saturating_sub(key.width());
            out.push_str(&format!(
                "{}{}  {}\n",
                key.dimmed(),
                " ".repeat(pad),
                value.unwrap_or("")
            ));
        }
    }
    out
}

pub(super) fn render_fields(fields: &[FieldInfo]) -> String {
    let width = fields.iter().map(|f| f.name.width()).max().unwrap_or(0);
    fields
        .iter()
        .map(|f| {
            let pad = width.saturating_sub(f.name.width());
            format!("{}{}  {}\n", f.name, " ".repeat(pad), f.field_type.to_string().dimmed())
        })
        .collect()
}

pub(super) fn render_values(values: &[String]) -> String {
    values.iter().map(|v| format!("{}\n", v)).collect()
}

pub(super) fn render_category_counts(counts: &CategoryCounts) -> String {
    let width = counts
        .categories
        .iter()
        .map(|(_, name, _)| name.width())
        .max()
        .unwrap_or(0)
        .max("Uncategorized".len());

    let mut out = String::new();
    for (id, name, count) in &counts.categories {
        let pad = width.saturating_sub(name.width());
        out.push_str(&format!(
            "{}{}  {:>5}  {}\n",
            name,
            " ".repeat(pad),
            count,
            id.dimmed()
        ));
    }
    let pad = width.saturating_sub("Uncategorized".len());
    out.push_str(&format!(
        "{}{}  {:>5}\n",
        "Uncategorized".italic(),
        " ".repeat(pad),
        counts.uncategorized
    ));
    out
}

pub(super) fn render_config(config: &MergeConfig) -> String {
    CONFIG_KEYS
        .iter()
        .filter_map(|key| config.get(key).map(|v| format!("{} = {}\n", key, v)))
        .collect()
}

fn summarize(record: &Record) -> String {
    let name = first_present(record, NAME_FIELDS).unwrap_or("(unnamed)");
    let details: Vec<&str> = DETAIL_FIELDS
        .iter()
        .filter_map(|key| record.get(key))
        .filter(|v| !v.trim().is_empty())
        .collect();
    if details.is_empty() {
        name.to_string()
    } else {
        format!("{}  {}", name, details.join(" · "))
    }
}

fn first_present<'a>(record: &'a Record, keys: &[&str]) -> Option<&'a str> {
    keys.iter()
        .find_map(|key| record.get(key).filter(|v| !v.trim().is_empty()))
}

fn truncate_to_width(s: &str, max_width: usize) -> String {
    let mut result = String::new();
    let mut current_width = 0;

    for c in s.chars() {
        let char_width = c.width().unwrap_or(0);
        if current_width + char_width > max_width.saturating_sub(1) {
            result.push('…');
            return result;
        }
        result.push(c);
        current_width += char_width;
    }

    result
}

fn format_time_ago(timestamp: DateTime<Utc>) -> String {
    let duration = Utc::now().signed_duration_since(timestamp);
    let time_str = Formatter::new().convert(duration.to_std().unwrap_or_default());
    format!("{:>width$}", time_str, width = TIME_WIDTH)
}
