use super::document::{Document, Row, RowStyle, Section};

pub const TEXT_WIDTH: usize = 60;
const LABEL_WIDTH: usize = 40;

fn underline(out: &mut Vec<String>, title: &str) {
    let title = title.to_uppercase();
    let rule = "-".repeat(title.chars().count());
    out.push(title);
    out.push(rule);
}

fn amount_line(label: &str, display: &str) -> String {
    let width = TEXT_WIDTH.saturating_sub(label.chars().count());
    format!("{label}{display:>width$}")
}

fn push_row(out: &mut Vec<String>, row: &Row) {
    match row.style {
        RowStyle::Heading | RowStyle::SubHeading => {
            if out.last().is_some_and(|l| !l.is_empty()) {
                out.push(String::new());
            }
            out.push(format!("{}:", row.label));
        }
        RowStyle::Item => out.push(format!(
            "- {:<width$} {}",
            row.label,
            row.display,
            width = LABEL_WIDTH
        )),
        RowStyle::Placeholder => out.push(format!("  ({})", row.label)),
        RowStyle::Subtotal => {
            out.push("-".repeat(TEXT_WIDTH));
            out.push(amount_line(&format!("{}:", row.label), &row.display));
        }
        RowStyle::Total => {
            out.push(String::new());
            out.push(amount_line(
                &format!("{}:", row.label.to_uppercase()),
                &row.display,
            ));
        }
    }
}

/// Fixed-width plain-text rendition of the statements
pub fn render_text(doc: &Document) -> String {
    let mut out: Vec<String> = vec![
        doc.letterhead.company.to_uppercase(),
        doc.letterhead.title.to_uppercase(),
        doc.letterhead.period.clone(),
        "=".repeat(TEXT_WIDTH),
    ];

    for section in &doc.sections {
        out.push(String::new());
        match section {
            Section::Opinion { title, text } => {
                underline(&mut out, title);
                out.push(text.clone());
            }
            Section::Statement {
                title,
                subtitle,
                groups,
            } => {
                underline(&mut out, title);
                if let Some(subtitle) = subtitle {
                    out.push(subtitle.clone());
                }
                for group in groups {
                    if let Some(heading) = &group.heading {
                        out.push(String::new());
                        out.push(heading.to_uppercase());
                    }
                    for row in &group.rows {
                        push_row(&mut out, row);
                    }
                }
            }
            Section::Notes { title, notes } => {
                underline(&mut out, title);
                for (i, note) in notes.iter().enumerate() {
                    out.push(format!("{}. {note}", i + 1));
                }
            }
        }
    }

    out.push(String::new());
    out.push("-".repeat(TEXT_WIDTH));
    out.push(format!(
        "{} {}",
        doc.footer.sign_off,
        doc.footer.signatories.join(", ")
    ));
    out.push(doc.footer.generated_by.clone());

    let mut text = out.join("\n");
    text.push('\n');
    text
}
