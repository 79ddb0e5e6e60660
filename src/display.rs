//! Plain-text grid tables for records.
//!
//! Presentation only; nothing in the parsing path calls into this module.
//!
//! ```text
//! +--------+-------------+
//! | Job ID | Spider Name |
//! +========+=============+
//! | 7-1    | quotes      |
//! +--------+-------------+
//! ```

use chrono::{DateTime, Utc};

use crate::models::{Job, Project, Spider};

const MISSING: &str = "N/A";

/// A record that can be shown as one table row.
pub trait TableRow {
    fn headers() -> &'static [&'static str];

    fn row(&self) -> Vec<String>;
}

fn timestamp(value: Option<DateTime<Utc>>) -> String {
    value
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| MISSING.to_string())
}

fn or_missing(value: &str) -> String {
    if value.is_empty() {
        MISSING.to_string()
    } else {
        value.to_string()
    }
}

impl TableRow for Job {
    fn headers() -> &'static [&'static str] {
        &[
            "Job ID",
            "Spider Name",
            "State",
            "Project ID",
            "Created At",
            "Started At",
            "Finished At",
            "Items",
            "Requests",
            "Units",
            "Duration",
        ]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.job_id.clone(),
            self.spider_name.clone(),
            self.state.to_string(),
            or_missing(&self.project_id),
            timestamp(self.created_at),
            timestamp(self.started_at),
            timestamp(self.finished_at),
            self.items_scraped.to_string(),
            self.requests_made.to_string(),
            self.units.to_string(),
            self.duration()
                .map(|d| format!("{d:.2}s"))
                .unwrap_or_else(|| MISSING.to_string()),
        ]
    }
}

impl TableRow for Spider {
    fn headers() -> &'static [&'static str] {
        &[
            "Name",
            "Version",
            "Description",
            "Project ID",
            "Tags",
            "Settings Count",
        ]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            self.version.clone(),
            or_missing(&self.description),
            or_missing(&self.project_id),
            or_missing(&self.tags.join(", ")),
            self.settings.len().to_string(),
        ]
    }
}

impl TableRow for Project {
    fn headers() -> &'static [&'static str] {
        &[
            "ID",
            "Org Name",
            "Name",
            "Description",
            "Created At",
            "Spider Count",
            "Job Count",
        ]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.project_id.clone(),
            self.org_name.clone(),
            self.name.clone(),
            or_missing(&self.description),
            timestamp(self.created_at),
            self.spider_count.to_string(),
            self.job_count.to_string(),
        ]
    }
}

fn border(widths: &[usize], fill: char) -> String {
    let mut line = String::from("+");
    for width in widths {
        line.extend(std::iter::repeat_n(fill, width + 2));
        line.push('+');
    }
    line
}

fn line<'s>(cells: impl Iterator<Item = &'s str>, widths: &[usize]) -> String {
    let mut out = String::from("|");
    for (cell, width) in cells.zip(widths) {
        let pad = width - cell.chars().count();
        out.push_str(&format!(" {}{} |", cell, " ".repeat(pad)));
    }
    out
}

/// Render records as a grid table.
pub fn render<T: TableRow>(records: &[T]) -> String {
    let headers = T::headers();
    let rows: Vec<Vec<String>> = records.iter().map(T::row).collect();

    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = vec![border(&widths, '-')];
    out.push(line(headers.iter().copied(), &widths));
    out.push(border(&widths, '='));
    for row in &rows {
        out.push(line(row.iter().map(String::as_str), &widths));
        out.push(border(&widths, '-'));
    }
    out.join("\n")
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_render_spider_table() {
        let spider = Spider::from_value(&json!({"name": "quotes", "tags": ["a", "b"]})).unwrap();
        let table = render(&[spider]);
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines.len(), 5);
        assert!(lines[0].starts_with("+--------+---------+"));
        assert!(lines[1].starts_with("| Name   | Version |"));
        assert!(lines[2].starts_with("+========+=========+"));
        assert!(lines[3].contains("| quotes |"));
        assert!(lines[3].contains("| a, b "));
        assert!(lines[3].contains("N/A"));
        let width = lines[0].chars().count();
        assert!(lines.iter().all(|l| l.chars().count() == width));
    }

    #[test]
    fn test_job_row_formats_duration() {
        let job = Job::from_value(&json!({
            "job_id": "1",
            "spider_name": "s",
            "status": "completed",
            "started_at": "2024-01-01T00:00:00Z",
            "finished_at": "2024-01-01T00:01:05.5Z",
        }))
        .unwrap();
        let row = job.row();
        assert_eq!(row[2], "completed");
        assert_eq!(row[3], "N/A");
        assert_eq!(row[5], "2024-01-01 00:00:00");
        assert_eq!(row[10], "65.50s");
        assert_eq!(row.len(), Job::headers().len());
    }

    #[test]
    fn test_render_empty() {
        let table = render::<Project>(&[]);
        assert_eq!(table.lines().count(), 3);
    }
}
