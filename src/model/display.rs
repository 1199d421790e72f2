// File: ./src/model/display.rs
use crate::model::item::Task;

/// Labels such as `15min` or `2hr` are duration tags.
pub fn is_duration_tag(label: &str) -> bool {
    label.contains("min") || label.contains("hr")
}

/// Renders labels as `@tag`s, duration tags first. Both groups keep their
/// original relative order.
pub fn format_task_labels(labels: &[String]) -> String {
    let (durations, others): (Vec<&String>, Vec<&String>) =
        labels.iter().partition(|l| is_duration_tag(l));

    durations
        .into_iter()
        .chain(others)
        .map(|l| format!("@{}", l))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Lowercases, strips everything but word characters and whitespace, trims.
///
/// Used for the task/event duplicate check, which is an exact comparison of
/// normalized strings: "Team Sync!" matches "team sync" but "Team-Sync" does
/// not match "team sync" (the hyphen is dropped, not turned into a space).
pub fn normalize_text(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_' || c.is_whitespace())
        .collect::<String>()
        .trim()
        .to_string()
}

pub trait TaskDisplay {
    fn display_text(&self) -> String;
}

impl TaskDisplay for Task {
    fn display_text(&self) -> String {
        let tags = format_task_labels(&self.labels);
        if tags.is_empty() {
            self.content.clone()
        } else {
            format!("{} {}", self.content, tags)
        }
    }
}
