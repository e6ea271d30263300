use super::layout::{incidence_line, item_line, summary_line, ReportBlock, ReportDocument};

const RULE: &str = "---------------------------------";

pub fn render_text(document: &ReportDocument<'_>) -> String {
    let mut lines: Vec<String> = Vec::new();

    for block in document.blocks() {
        match block {
            ReportBlock::Title {
                title,
                community,
                date,
            } => {
                lines.push(format!("--- {title} ---"));
                lines.push(format!("COMUNIDAD: {community}"));
                lines.push(format!("FECHA: {date}"));
                lines.push(String::new());
            }
            ReportBlock::Summary(stats) => {
                lines.push(summary_line(stats));
                lines.push(String::new());
            }
            ReportBlock::Section { number, title } => {
                if *number > 1 {
                    lines.push(String::new());
                }
                lines.push(format!("{number}) {title}"));
                lines.push(RULE.to_string());
            }
            ReportBlock::Category { category, items } => {
                lines.push(String::new());
                lines.push(format!("[{}]", category.label()));
                lines.extend(items.iter().map(|item| item_line(item)));
            }
            ReportBlock::Paragraph(text) => lines.push(text.to_string()),
            ReportBlock::Incidences(records) => {
                lines.extend(records.iter().map(|record| incidence_line(record)));
            }
        }
    }

    lines.join("\n")
}
