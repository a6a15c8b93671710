//! Styled HTML table for the trend report.
//!
//! Growth cells are tinted green, shrink cells red, unchanged cells plain.

use super::{TrendRow, HEADERS};
use crate::store::diff::{Change, Direction};

const STYLE: &str = "
body { font-family: -apple-system, 'Segoe UI', Helvetica, Arial, sans-serif; margin: 2rem; }
table { border-collapse: collapse; }
th { background: paleturquoise; text-align: left; }
th, td { padding: 0.4rem 0.8rem; border: 1px solid #ccc; }
td.up { background: #c8f0c8; }
td.down { background: #f5c2c2; }
";

pub fn render(rows: &[TrendRow]) -> String {
    let mut out = String::new();
    out.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
    out.push_str("<title>Profile comparison</title>\n");
    out.push_str(&format!("<style>{STYLE}</style>\n"));
    out.push_str("</head>\n<body>\n<table>\n<thead>\n<tr>");
    for header in HEADERS {
        out.push_str(&format!("<th>{}</th>", escape(header)));
    }
    out.push_str("</tr>\n</thead>\n<tbody>\n");

    if rows.is_empty() {
        out.push_str(&format!(
            "<tr><td colspan=\"{}\">Not enough history yet.</td></tr>\n",
            HEADERS.len()
        ));
    }

    for row in rows {
        let cells = row.cells();
        let classes = ["", "", class(&row.interests), "", class(&row.skills)];
        out.push_str("<tr>");
        for (cell, class) in cells.iter().zip(classes) {
            if class.is_empty() {
                out.push_str(&format!("<td>{}</td>", escape(cell)));
            } else {
                out.push_str(&format!("<td class=\"{class}\">{}</td>", escape(cell)));
            }
        }
        out.push_str("</tr>\n");
    }

    out.push_str("</tbody>\n</table>\n</body>\n</html>\n");
    out
}

fn class(change: &Change) -> &'static str {
    match change.direction {
        Direction::Up => "up",
        Direction::Down => "down",
        Direction::Flat => "",
    }
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}
