//! Flat CSV records for the trend report, same cells as the HTML table.

use super::{TrendRow, HEADERS};

fn needs_quotes(field: &str) -> bool {
    field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r')
}

fn push_row<S: AsRef<str>>(out: &mut String, row: &[S]) {
    for (i, cell) in row.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        let cell = cell.as_ref();
        if needs_quotes(cell) {
            out.push('"');
            out.push_str(&cell.replace('"', "\"\""));
            out.push('"');
        } else {
            out.push_str(cell);
        }
    }
    out.push('\n');
}

pub fn render(rows: &[TrendRow]) -> String {
    let mut out = String::new();
    push_row(&mut out, &HEADERS);
    for row in rows {
        push_row(&mut out, &row.cells());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::tests::snap;
    use crate::report::trend_rows;

    #[test]
    fn header_then_one_line_per_row() {
        let rows = trend_rows(&[
            snap("A", "2024-01-01 00:00:00", 5, 10),
            snap("A", "2024-01-08 00:00:00", 5, 12),
            snap("B", "2024-01-01 00:00:00", 3, 1),
            snap("B", "2024-01-08 00:00:00", 1, 1),
        ]);
        assert_eq!(
            render(&rows),
            "Profile URL,Interests Count,Interests Change,Skills Count,Skills Change\n\
             A,5,+0,12,+2 ▲\n\
             B,1,-2 ▼,1,+0\n"
        );
    }

    #[test]
    fn fields_with_commas_and_quotes_are_quoted() {
        let mut out = String::new();
        push_row(&mut out, &["a,b", "say \"hi\"", "plain"]);
        assert_eq!(out, "\"a,b\",\"say \"\"hi\"\"\",plain\n");
    }

    #[test]
    fn empty_report_is_header_only() {
        assert_eq!(render(&[]).lines().count(), 1);
    }
}
