//! Formatting for the markdown-ish recommendation text.
//!
//! The analysis endpoint returns plain text with a loose structure: numbered
//! `###` section headings, `####` sub-headings, dash lists, pipe tables, and
//! `**bold**` spans. Each line is classified once into a [`ReportLine`] and a
//! separate pure function maps the classified line to egui widgets.

use eframe::egui;

/// A fragment of a non-structural line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Span {
    Text(String),
    Bold(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportLine {
    /// `### 1. RESUMEN EJECUTIVO` — number and upper-case title kept.
    Heading(String),
    /// `#### Subtitulo`
    SubHeading(String),
    /// `- item`
    ListItem(Vec<Span>),
    /// `a | b | c` — non-empty trimmed cells.
    TableRow(Vec<String>),
    Blank,
    Paragraph(Vec<Span>),
}

/// Split `**bold**` markers into spans. Markers without a well-formed
/// closing pair stay literal text.
pub fn parse_spans(text: &str) -> Vec<Span> {
    let mut out = Vec::new();
    let mut buf = String::new();
    let mut i = 0;
    while i < text.len() {
        if text[i..].starts_with("**") {
            if let Some(rel) = text[i + 2..].find("**") {
                let inner = &text[i + 2..i + 2 + rel];
                if !inner.is_empty() && !inner.contains('*') {
                    if !buf.is_empty() {
                        out.push(Span::Text(std::mem::take(&mut buf)));
                    }
                    out.push(Span::Bold(inner.to_string()));
                    i += rel + 4;
                    continue;
                }
            }
        }
        let ch = text[i..].chars().next().unwrap_or('\u{FFFD}');
        buf.push(ch);
        i += ch.len_utf8();
    }
    if !buf.is_empty() {
        out.push(Span::Text(buf));
    }
    out
}

/// `### 1. TITULO` — marker, number, dot, then an upper-case/whitespace title.
fn heading_text(line: &str) -> Option<&str> {
    let rest = line.strip_prefix("###")?;
    if rest.starts_with('#') {
        return None;
    }
    let body = rest.trim_start();
    if body.len() == rest.len() {
        return None;
    }
    let digits = body.find(|c: char| !c.is_ascii_digit()).unwrap_or(body.len());
    if digits == 0 {
        return None;
    }
    let after = body[digits..].strip_prefix('.')?;
    let title = after.trim_start();
    if title.len() == after.len() || title.is_empty() {
        return None;
    }
    if !title.chars().all(|c| c.is_ascii_uppercase() || c.is_whitespace()) {
        return None;
    }
    Some(body)
}

/// `#### Subtitulo` — marker, whitespace, then an upper-case first letter.
fn subheading_text(line: &str) -> Option<&str> {
    let rest = line.strip_prefix("####")?;
    let body = rest.trim_start();
    if body.len() == rest.len() {
        return None;
    }
    body.chars().next().filter(char::is_ascii_uppercase)?;
    Some(body)
}

/// Classify one line. `None` suppresses the line entirely (table separator
/// rows made of `---` punctuation).
pub fn classify_line(raw: &str) -> Option<ReportLine> {
    let line = raw.trim();
    if line.is_empty() {
        return Some(ReportLine::Blank);
    }
    if let Some(t) = subheading_text(line) {
        return Some(ReportLine::SubHeading(t.to_string()));
    }
    if let Some(t) = heading_text(line) {
        return Some(ReportLine::Heading(t.to_string()));
    }
    if let Some(item) = line.strip_prefix("- ") {
        return Some(ReportLine::ListItem(parse_spans(item)));
    }
    if line.contains('|') {
        let cells: Vec<String> = line
            .split('|')
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(String::from)
            .collect();
        if !cells.is_empty() {
            if line.contains("---") {
                return None;
            }
            return Some(ReportLine::TableRow(cells));
        }
    }
    Some(ReportLine::Paragraph(parse_spans(line)))
}

pub fn classify_report(text: &str) -> Vec<ReportLine> {
    text.lines().filter_map(classify_line).collect()
}

// ─── Rendering ───────────────────────────────────────────────────────────────

const HEADING_COLOR: egui::Color32 = egui::Color32::from_rgb(37, 99, 235);
const SUBHEADING_COLOR: egui::Color32 = egui::Color32::from_rgb(113, 128, 150);

/// Classify and render a whole report.
pub fn render_report(ui: &mut egui::Ui, text: &str) {
    for line in classify_report(text) {
        render_line(ui, &line);
    }
}

/// Map one classified line to widgets.
pub fn render_line(ui: &mut egui::Ui, line: &ReportLine) {
    match line {
        ReportLine::Heading(t) => {
            ui.add_space(10.0);
            ui.label(
                egui::RichText::new(t)
                    .size(17.0)
                    .strong()
                    .color(HEADING_COLOR),
            );
            ui.separator();
        }
        ReportLine::SubHeading(t) => {
            ui.add_space(6.0);
            ui.label(
                egui::RichText::new(t)
                    .size(14.5)
                    .strong()
                    .color(SUBHEADING_COLOR),
            );
        }
        ReportLine::ListItem(spans) => {
            ui.horizontal_wrapped(|ui| {
                ui.label("  \u{2022} ");
                render_spans(ui, spans);
            });
        }
        ReportLine::TableRow(cells) => {
            ui.horizontal_wrapped(|ui| {
                for (i, cell) in cells.iter().enumerate() {
                    if i > 0 {
                        ui.separator();
                    }
                    ui.label(cell);
                }
            });
        }
        ReportLine::Blank => {
            ui.add_space(6.0);
        }
        ReportLine::Paragraph(spans) => {
            ui.horizontal_wrapped(|ui| {
                render_spans(ui, spans);
            });
        }
    }
}

fn render_spans(ui: &mut egui::Ui, spans: &[Span]) {
    ui.spacing_mut().item_spacing.x = 0.0;
    for span in spans {
        match span {
            Span::Text(t) => {
                ui.label(t);
            }
            Span::Bold(t) => {
                ui.label(egui::RichText::new(t).strong());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Span {
        Span::Text(s.to_string())
    }

    fn bold(s: &str) -> Span {
        Span::Bold(s.to_string())
    }

    #[test]
    fn numbered_upper_case_heading() {
        assert_eq!(
            classify_line("### 1. RESUMEN EJECUTIVO"),
            Some(ReportLine::Heading("1. RESUMEN EJECUTIVO".to_string()))
        );
    }

    #[test]
    fn lower_case_section_is_a_paragraph() {
        assert_eq!(
            classify_line("### 1. Resumen"),
            Some(ReportLine::Paragraph(vec![text("### 1. Resumen")]))
        );
        assert_eq!(
            classify_line("### RESUMEN"),
            Some(ReportLine::Paragraph(vec![text("### RESUMEN")]))
        );
    }

    #[test]
    fn subheading_needs_upper_case_start() {
        assert_eq!(
            classify_line("#### Equipos"),
            Some(ReportLine::SubHeading("Equipos".to_string()))
        );
        assert_eq!(
            classify_line("#### equipos"),
            Some(ReportLine::Paragraph(vec![text("#### equipos")]))
        );
    }

    #[test]
    fn heading_then_list_item() {
        let lines = classify_report("### 1. TITULO\n- item one");
        assert_eq!(
            lines,
            vec![
                ReportLine::Heading("1. TITULO".to_string()),
                ReportLine::ListItem(vec![text("item one")]),
            ]
        );
    }

    #[test]
    fn table_rows_and_separator_suppression() {
        assert_eq!(
            classify_line("ODN | 1:32 | 20 km"),
            Some(ReportLine::TableRow(vec![
                "ODN".to_string(),
                "1:32".to_string(),
                "20 km".to_string(),
            ]))
        );
        assert_eq!(classify_line("|---|---|---|"), None);
        assert_eq!(classify_line("| --- | --- |"), None);
    }

    #[test]
    fn blank_lines_become_breaks() {
        assert_eq!(classify_line(""), Some(ReportLine::Blank));
        assert_eq!(classify_line("   "), Some(ReportLine::Blank));
    }

    #[test]
    fn bold_spans_split() {
        assert_eq!(
            parse_spans("usar **GPON** en la zona"),
            vec![text("usar "), bold("GPON"), text(" en la zona")]
        );
        assert_eq!(parse_spans("**todo**"), vec![bold("todo")]);
    }

    #[test]
    fn unbalanced_markers_stay_literal() {
        assert_eq!(parse_spans("a ** b"), vec![text("a ** b")]);
        assert_eq!(parse_spans("**a*b**"), vec![text("**a*b**")]);
    }

    #[test]
    fn list_items_carry_inline_bold() {
        assert_eq!(
            classify_line("- instalar **ONT** por cliente"),
            Some(ReportLine::ListItem(vec![
                text("instalar "),
                bold("ONT"),
                text(" por cliente"),
            ]))
        );
    }

    #[test]
    fn report_order_is_preserved() {
        let report = "### 2. RECOMENDACIONES TECNICAS\n\n#### Equipos\n- OLT de 8 puertos\nTexto plano";
        let lines = classify_report(report);
        assert_eq!(lines.len(), 5);
        assert!(matches!(lines[0], ReportLine::Heading(_)));
        assert_eq!(lines[1], ReportLine::Blank);
        assert!(matches!(lines[2], ReportLine::SubHeading(_)));
        assert!(matches!(lines[3], ReportLine::ListItem(_)));
        assert!(matches!(lines[4], ReportLine::Paragraph(_)));
    }
}
