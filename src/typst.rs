use std::path::Path;

use log::warn;

use crate::config::Config;
use crate::op::{Operation, ParagraphStyle, Table};

/// Convert operations to Typst markup.
///
/// Image paths are written relative to `image_root`, which must be the root
/// the Typst engine resolves files against.
pub fn operations_to_typst(ops: &[Operation], config: &Config, image_root: &Path) -> String {
    let emitter = Emitter { config, image_root };
    let mut out = String::new();

    // Set up paragraph settings to prevent widows/orphans
    out.push_str("#set par(linebreaks: \"optimized\")\n");
    out.push_str(&format!("#set text(size: {}pt)\n\n", config.document.size));

    let mut i = 0;
    while i < ops.len() {
        if let Operation::Heading { level, text } = &ops[i] {
            // Keep heading with following content using a block that prevents breaks
            out.push_str("#block(breakable: false)[\n");
            emit_heading(*level, text, &mut out);
            i += 1;
            if i < ops.len() {
                i = emitter.emit_at(ops, i, &mut out);
            }
            out.push_str("]\n\n");
        } else {
            i = emitter.emit_at(ops, i, &mut out);
        }
    }

    out
}

struct Emitter<'a> {
    config: &'a Config,
    image_root: &'a Path,
}

impl Emitter<'_> {
    /// Emit the operation at `i` and return the index of the next unconsumed
    /// one. A list item consumes the whole run of items of its kind.
    fn emit_at(&self, ops: &[Operation], i: usize, out: &mut String) -> usize {
        match &ops[i] {
            Operation::Heading { level, text } => emit_heading(*level, text, out),
            Operation::Paragraph { text, style } => {
                match style {
                    ParagraphStyle::Body => escape_block(text, out),
                    ParagraphStyle::Quote => {
                        out.push_str("#quote(block: true)[");
                        escape_block(text, out);
                        out.push(']');
                    }
                    ParagraphStyle::Subtitle => {
                        out.push_str("#align(center)[#emph[");
                        escape_block(text, out);
                        out.push_str("]]");
                    }
                }
                out.push_str("\n\n");
            }
            Operation::ListItem { ordered, .. } => {
                let prefix = if *ordered { "+ " } else { "- " };
                let mut next = i;
                while let Some(Operation::ListItem { ordered: kind, text }) = ops.get(next) {
                    if kind != ordered {
                        break;
                    }
                    out.push_str(prefix);
                    escape_block(text, out);
                    out.push('\n');
                    next += 1;
                }
                out.push('\n');
                return next;
            }
            Operation::Table(table) => {
                // Keep tables together when possible
                out.push_str("#block(breakable: false)[\n");
                self.table_to_typst(table, out);
                out.push_str("]\n\n");
            }
            Operation::Image { alt, path } => self.image_to_typst(alt, path, out),
            Operation::Alert { kind, text } => {
                out.push_str(&format!(
                    "#block(fill: rgb(\"#{}\"), inset: 8pt, radius: 2pt, width: 100%)[*",
                    self.config.alerts.fill_for(kind)
                ));
                escape_text(kind, out);
                out.push_str(":* ");
                escape_block(text, out);
                out.push_str("]\n\n");
            }
            Operation::Rule => {
                out.push_str("#line(length: 100%)\n\n");
            }
            Operation::PageBreak => {
                out.push_str("#pagebreak()\n\n");
            }
        }
        i + 1
    }

    fn table_to_typst(&self, table: &Table, out: &mut String) {
        let col_count = table.columns();
        if col_count == 0 {
            return;
        }
        let colors = &self.config.table;

        out.push_str("#table(\n");
        out.push_str(&format!("  columns: {col_count},\n"));

        // Header cells (bold, coloured)
        if !table.header.is_empty() {
            out.push_str(&format!(
                "  fill: (_, y) => if y == 0 {{ rgb(\"#{}\") }},\n",
                colors.header_fill
            ));
            out.push_str("  table.header(\n");
            for cell in &table.header {
                out.push_str(&format!(
                    "    [#text(fill: rgb(\"#{}\"))[",
                    colors.header_text
                ));
                strong_cell(cell, out);
                out.push_str("]],\n");
            }
            out.push_str("  ),\n");
        }

        // Data rows
        for row in &table.rows {
            for cell in row {
                out.push_str("  [");
                escape_block(cell, out);
                out.push_str("],\n");
            }
        }

        if let Some(footer) = &table.footer {
            for cell in footer {
                out.push_str("  [");
                strong_cell(cell, out);
                out.push_str("],\n");
            }
        }

        out.push_str(")\n");
    }

    fn image_to_typst(&self, alt: &str, path: &Path, out: &mut String) {
        let relative = match path.strip_prefix(self.image_root) {
            Ok(relative) if path.exists() => relative,
            Ok(_) => return image_placeholder(alt, "File not found", out),
            Err(_) => {
                warn!(
                    "image {} is outside {}",
                    path.display(),
                    self.image_root.display()
                );
                return image_placeholder(alt, "Error inserting image", out);
            }
        };

        let source: Vec<String> = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        let source = format!("/{}", source.join("/"))
            .replace('\\', "\\\\")
            .replace('"', "\\\"");

        out.push_str(&format!(
            "#figure(image(\"{source}\", width: {}in), caption: [",
            self.config.images.width
        ));
        escape_block(alt, out);
        out.push_str("])\n\n");
    }
}

fn emit_heading(level: u8, text: &str, out: &mut String) {
    if level == 0 {
        out.push_str("#align(center)[#text(size: 26pt, weight: \"bold\")[");
        escape_text(text, out);
        out.push_str("]]\n\n");
        return;
    }
    for _ in 0..level {
        out.push('=');
    }
    out.push(' ');
    escape_block(text, out);
    out.push('\n');
    out.push('\n');
}

fn image_placeholder(alt: &str, reason: &str, out: &mut String) {
    escape_block(&format!("[Image: {alt} - {reason}]"), out);
    out.push_str("\n\n");
}

fn strong_cell(text: &str, out: &mut String) {
    if text.is_empty() {
        return;
    }
    out.push('*');
    escape_block(text, out);
    out.push('*');
}

/// Escape text that starts a line or a content block, where list, heading
/// and enum markers would otherwise apply.
fn escape_block(text: &str, out: &mut String) {
    if text.starts_with(['=', '-', '+']) {
        out.push('\\');
    }
    let digits = text.chars().take_while(char::is_ascii_digit).count();
    if digits > 0 && text[digits..].starts_with('.') {
        out.push_str(&text[..digits]);
        out.push('\\');
        escape_text(&text[digits..], out);
    } else {
        escape_text(text, out);
    }
}

fn escape_text(text: &str, out: &mut String) {
    // Escape special Typst characters
    for ch in text.chars() {
        match ch {
            '#' | '*' | '_' | '@' | '$' | '\\' | '`' | '<' | '>' | '[' | ']' | '/' | '~' => {
                out.push('\\');
                out.push(ch);
            }
            _ => out.push(ch),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    const PREAMBLE: &str = "#set par(linebreaks: \"optimized\")\n#set text(size: 11pt)\n\n";

    fn to_typst(ops: &[Operation]) -> String {
        operations_to_typst(ops, &Config::compiled_default(), Path::new("/docs"))
    }

    #[test]
    fn heading() {
        assert_eq!(
            to_typst(&[Operation::heading(1, "Hello")]),
            format!("{PREAMBLE}#block(breakable: false)[\n= Hello\n\n]\n\n")
        );
    }

    #[test]
    fn heading_with_following_content() {
        // Heading should be grouped with following paragraph
        let result = to_typst(&[
            Operation::heading(2, "Title"),
            Operation::paragraph("Some text."),
        ]);
        assert!(result.contains("#block(breakable: false)[\n== Title\n\nSome text.\n\n]\n\n"));
    }

    #[test]
    fn title_is_centred() {
        assert!(to_typst(&[Operation::heading(0, "Manual")])
            .contains("#align(center)[#text(size: 26pt, weight: \"bold\")[Manual]]"));
    }

    #[test]
    fn escapes_special_chars() {
        assert_eq!(
            to_typst(&[Operation::paragraph("a * b # c_d")]),
            format!("{PREAMBLE}a \\* b \\# c\\_d\n\n")
        );
    }

    #[test]
    fn paragraph_that_looks_like_a_list() {
        assert_eq!(
            to_typst(&[Operation::paragraph("1. not a list")]),
            format!("{PREAMBLE}1\\. not a list\n\n")
        );
        assert_eq!(
            to_typst(&[Operation::paragraph("= not a heading")]),
            format!("{PREAMBLE}\\= not a heading\n\n")
        );
    }

    #[test]
    fn list_runs_are_grouped() {
        let ops = [
            Operation::ListItem {
                ordered: true,
                text: "one".to_string(),
            },
            Operation::ListItem {
                ordered: true,
                text: "two".to_string(),
            },
            Operation::ListItem {
                ordered: false,
                text: "dot".to_string(),
            },
        ];
        assert_eq!(
            to_typst(&ops),
            format!("{PREAMBLE}+ one\n+ two\n\n- dot\n\n")
        );
    }

    #[test]
    fn table() {
        let mut table = Table::new(vec!["A".to_string(), "B".to_string()]);
        table.rows.push(vec!["1".to_string(), "2".to_string()]);
        let expected = format!(
            "{PREAMBLE}#block(breakable: false)[\n#table(\n  columns: 2,\n  fill: (_, y) => if y == 0 {{ rgb(\"#4F81BD\") }},\n  table.header(\n    [#text(fill: rgb(\"#FFFFFF\"))[*A*]],\n    [#text(fill: rgb(\"#FFFFFF\"))[*B*]],\n  ),\n  [1],\n  [2],\n)\n]\n\n"
        );
        assert_eq!(to_typst(&[Operation::Table(table)]), expected);
    }

    #[test]
    fn cells_that_look_like_markup() {
        let mut table = Table::new(vec!["- Status".to_string()]);
        table.rows.push(vec!["- none".to_string()]);
        table.rows.push(vec!["1. open".to_string()]);
        let result = to_typst(&[Operation::Table(table)]);
        assert!(result.contains("[#text(fill: rgb(\"#FFFFFF\"))[*\\- Status*]],\n"));
        assert!(result.contains("  [\\- none],\n"));
        assert!(result.contains("  [1\\. open],\n"));
    }

    #[test]
    fn quote_and_list_text_that_look_like_markup() {
        let ops = [
            Operation::Paragraph {
                text: "= not heading".to_string(),
                style: ParagraphStyle::Quote,
            },
            Operation::ListItem {
                ordered: false,
                text: "+ plus".to_string(),
            },
        ];
        assert_eq!(
            to_typst(&ops),
            format!("{PREAMBLE}#quote(block: true)[\\= not heading]\n\n- \\+ plus\n\n")
        );
    }

    #[test]
    fn table_without_header_row() {
        let table = Table::plain(vec![vec!["Tech Stack".to_string(), "Rust".to_string()]]);
        assert_eq!(
            to_typst(&[Operation::Table(table)]),
            format!(
                "{PREAMBLE}#block(breakable: false)[\n#table(\n  columns: 2,\n  [Tech Stack],\n  [Rust],\n)\n]\n\n"
            )
        );
    }

    #[test]
    fn alert_block() {
        let ops = [Operation::Alert {
            kind: "TIP".to_string(),
            text: "Do X".to_string(),
        }];
        assert_eq!(
            to_typst(&ops),
            format!(
                "{PREAMBLE}#block(fill: rgb(\"#E8F5E9\"), inset: 8pt, radius: 2pt, width: 100%)[*TIP:* Do X]\n\n"
            )
        );
    }

    #[test]
    fn missing_image_is_a_placeholder() {
        let ops = [Operation::Image {
            alt: "Login".to_string(),
            path: PathBuf::from("/docs/missing.png"),
        }];
        assert_eq!(
            to_typst(&ops),
            format!("{PREAMBLE}\\[Image: Login - File not found\\]\n\n")
        );
    }

    #[test]
    fn horizontal_rule_and_page_break() {
        assert_eq!(
            to_typst(&[Operation::Rule, Operation::PageBreak]),
            format!("{PREAMBLE}#line(length: 100%)\n\n#pagebreak()\n\n")
        );
    }
}
