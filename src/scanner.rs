use std::path::PathBuf;
use std::sync::LazyLock;

use log::debug;
use regex::Regex;

use crate::op::{Operation, ParagraphStyle, Table};

static LINK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[([^\]]+)\]\([^)]+\)").unwrap());
static IMAGE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^!\[(.*?)\]\((.*?)\)").unwrap());
static ALERT_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\[!(\w+)\]").unwrap());
static ORDERED_MARKER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+\.\s+").unwrap());

const FRONTMATTER_DELIMITER: &str = "---";

/// Options that influence how lines are turned into operations
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Directory that relative image paths are resolved against.
    pub image_base: PathBuf,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            image_base: PathBuf::from("."),
        }
    }
}

impl ScanOptions {
    pub fn with_image_base(image_base: impl Into<PathBuf>) -> Self {
        Self {
            image_base: image_base.into(),
        }
    }
}

/// Scan markdown text into a list of operations.
///
/// Never fails: constructs the scanner does not recognise come out as plain
/// paragraphs.
pub fn scan(markdown: &str, options: &ScanOptions) -> Vec<Operation> {
    let lines: Vec<&str> = markdown.lines().map(str::trim_end).collect();
    let mut state = ScanState::new(&lines, options);

    state.skip_frontmatter();
    while let Some(line) = state.next_line() {
        state.classify(line);
    }

    let ops = state.finish();
    debug!("scanned {} lines into {} operations", lines.len(), ops.len());
    ops
}

struct ScanState<'a> {
    lines: &'a [&'a str],
    options: &'a ScanOptions,
    // Index of the next unread line
    pos: usize,

    // Table state
    in_table: bool,
    table_rows: Vec<&'a str>,

    ops: Vec<Operation>,
}

impl<'a> ScanState<'a> {
    fn new(lines: &'a [&'a str], options: &'a ScanOptions) -> Self {
        Self {
            lines,
            options,
            pos: 0,
            in_table: false,
            table_rows: Vec::new(),
            ops: Vec::new(),
        }
    }

    fn next_line(&mut self) -> Option<&'a str> {
        let line = self.lines.get(self.pos).copied()?;
        self.pos += 1;
        Some(line)
    }

    /// Skip a leading `---` delimited block. Without a closing delimiter the
    /// rest of the input belongs to it.
    fn skip_frontmatter(&mut self) {
        if self.lines.first() != Some(&FRONTMATTER_DELIMITER) {
            return;
        }
        let closing = self.lines[1..]
            .iter()
            .position(|line| line.trim() == FRONTMATTER_DELIMITER);
        self.pos = match closing {
            Some(offset) => offset + 2,
            None => self.lines.len(),
        };
    }

    fn classify(&mut self, line: &'a str) {
        let trimmed = line.trim();

        if self.in_table {
            if trimmed.starts_with('|') {
                self.table_rows.push(trimmed);
                return;
            }
            self.close_table();
        }

        if let Some((level, text)) = split_heading(line) {
            self.ops.push(Operation::Heading {
                level,
                text: LINK.replace_all(text, "$1").into_owned(),
            });
            return;
        }

        if let Some(caps) = IMAGE.captures(line) {
            let path = self.resolve_image(&caps[2]);
            debug!("found image {}", path.display());
            self.ops.push(Operation::Image {
                alt: caps[1].to_string(),
                path,
            });
            return;
        }

        if trimmed.starts_with('|') {
            self.in_table = true;
            self.table_rows.push(trimmed);
            return;
        }

        if let Some(quoted) = trimmed.strip_prefix('>') {
            let content = quoted.trim_start_matches('>').trim();
            match ALERT_TAG.captures(content) {
                Some(caps) => {
                    let rest = content[caps.get(0).map_or(0, |m| m.end())..].trim();
                    self.collect_alert(&caps[1], rest);
                }
                None => self.ops.push(Operation::Paragraph {
                    text: content.to_string(),
                    style: ParagraphStyle::Quote,
                }),
            }
            return;
        }

        if let Some(item) = trimmed
            .strip_prefix("- ")
            .or_else(|| trimmed.strip_prefix("* "))
        {
            self.ops.push(Operation::ListItem {
                ordered: false,
                text: strip_emphasis(item),
            });
            return;
        }

        if let Some(marker) = ORDERED_MARKER.find(trimmed) {
            self.ops.push(Operation::ListItem {
                ordered: true,
                text: strip_emphasis(&trimmed[marker.end()..]),
            });
            return;
        }

        if trimmed == "---" {
            self.ops.push(Operation::Rule);
            return;
        }

        if trimmed.is_empty() {
            return;
        }

        self.ops.push(Operation::paragraph(strip_emphasis(trimmed)));
    }

    /// Consume the `>` lines following an alert tag and emit a single alert.
    fn collect_alert(&mut self, kind: &str, first: &'a str) {
        let mut parts = Vec::new();
        if !first.is_empty() {
            parts.push(first);
        }

        let lines = self.lines;
        while let Some(line) = lines.get(self.pos) {
            let Some(quoted) = line.trim().strip_prefix('>') else {
                break;
            };
            let content = quoted.trim_start_matches('>').trim();
            if !content.is_empty() {
                parts.push(content);
            }
            self.pos += 1;
        }

        self.ops.push(Operation::Alert {
            kind: kind.to_uppercase(),
            text: parts.join(" "),
        });
    }

    fn close_table(&mut self) {
        self.in_table = false;
        let rows = std::mem::take(&mut self.table_rows);
        if let Some(table) = build_table(&rows) {
            self.ops.push(Operation::Table(table));
        }
    }

    fn resolve_image(&self, path: &str) -> PathBuf {
        let mut relative = path.trim();
        while let Some(rest) = relative.strip_prefix("./") {
            relative = rest;
        }
        self.options.image_base.join(relative)
    }

    fn finish(mut self) -> Vec<Operation> {
        if self.in_table {
            self.close_table();
        }
        self.ops
    }
}

/// Split `### Text` into its level and text. The run of `#` must be followed
/// by whitespace.
fn split_heading(line: &str) -> Option<(u8, &str)> {
    let rest = line.trim_start_matches('#');
    let hashes = line.len() - rest.len();
    if hashes == 0 || !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let level = u8::try_from(hashes).unwrap_or(u8::MAX);
    Some((level, rest.trim()))
}

/// Drop `**` and `__` markers; inline styling is not carried over.
fn strip_emphasis(text: &str) -> String {
    text.replace("**", "").replace("__", "")
}

/// Build a table from buffered `|` rows, dropping header dividers.
///
/// Rows are padded or truncated to the header's column count.
fn build_table(rows: &[&str]) -> Option<Table> {
    let mut rows = rows.iter().filter(|row| !is_divider(row)).map(|row| split_row(row));

    let header = rows.next()?;
    let columns = header.len();
    let rows = rows
        .map(|mut cells| {
            cells.resize(columns, String::new());
            cells
        })
        .collect();

    Some(Table {
        header,
        rows,
        footer: None,
    })
}

fn is_divider(row: &str) -> bool {
    row.contains('-')
        && row
            .chars()
            .all(|c| matches!(c, '-' | ':' | '|') || c.is_whitespace())
}

fn split_row(row: &str) -> Vec<String> {
    let row = row.trim();
    let row = row.strip_prefix('|').unwrap_or(row);
    let row = row.strip_suffix('|').unwrap_or(row);
    row.split('|').map(|cell| strip_emphasis(cell.trim())).collect()
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use pretty_assertions::assert_eq;

    use super::*;

    fn scan_default(markdown: &str) -> Vec<Operation> {
        scan(markdown, &ScanOptions::default())
    }

    fn strings(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|cell| cell.to_string()).collect()
    }

    #[test]
    fn heading_rewrites_links() {
        assert_eq!(
            scan_default("### Title [Link](#x)"),
            vec![Operation::heading(3, "Title Link")]
        );
    }

    #[test]
    fn hash_without_space_is_a_paragraph() {
        assert_eq!(
            scan_default("#hashtag"),
            vec![Operation::paragraph("#hashtag")]
        );
    }

    #[test]
    fn table_drops_divider() {
        let ops = scan_default("| a | b |\n|---|---|\n| 1 | 2 |");
        assert_eq!(
            ops,
            vec![Operation::Table(Table {
                header: strings(&["a", "b"]),
                rows: vec![strings(&["1", "2"])],
                footer: None,
            })]
        );
    }

    #[test]
    fn aligned_divider_is_dropped() {
        let ops = scan_default("| a | b |\n| :--- | ---: |\n| 1 | 2 |");
        let Operation::Table(table) = &ops[0] else {
            panic!("expected a table, got {ops:?}");
        };
        assert_eq!(table.rows, vec![strings(&["1", "2"])]);
    }

    #[test]
    fn table_closes_on_non_pipe_line() {
        let ops = scan_default("| a |\n| 1 |\nafter");
        assert_eq!(ops.len(), 2);
        assert!(matches!(ops[0], Operation::Table(_)));
        assert_eq!(ops[1], Operation::paragraph("after"));
    }

    #[test]
    fn table_cells_lose_emphasis() {
        let ops = scan_default("| **Name** | __Role__ |");
        assert_eq!(
            ops,
            vec![Operation::Table(Table::new(strings(&["Name", "Role"])))]
        );
    }

    #[test]
    fn ragged_rows_match_header_width() {
        let ops = scan_default("| a | b | c |\n|---|---|---|\n| 1 |\n| 1 | 2 | 3 | 4 |");
        let Operation::Table(table) = &ops[0] else {
            panic!("expected a table, got {ops:?}");
        };
        assert_eq!(table.columns(), 3);
        assert_eq!(
            table.rows,
            vec![strings(&["1", "", ""]), strings(&["1", "2", "3"])]
        );
    }

    #[test]
    fn divider_only_table_emits_nothing() {
        assert_eq!(scan_default("|---|---|"), vec![]);
    }

    #[test]
    fn alert_collects_following_quote_lines() {
        assert_eq!(
            scan_default("> [!TIP]\n> Do X\n> and Y"),
            vec![Operation::Alert {
                kind: "TIP".to_string(),
                text: "Do X and Y".to_string(),
            }]
        );
    }

    #[test]
    fn alert_kind_is_case_insensitive_and_stops_at_plain_line() {
        assert_eq!(
            scan_default("> [!warning] Careful\n> now\nDone"),
            vec![
                Operation::Alert {
                    kind: "WARNING".to_string(),
                    text: "Careful now".to_string(),
                },
                Operation::paragraph("Done"),
            ]
        );
    }

    #[test]
    fn plain_blockquote_is_a_quote_paragraph() {
        assert_eq!(
            scan_default("> just a quote"),
            vec![Operation::Paragraph {
                text: "just a quote".to_string(),
                style: ParagraphStyle::Quote,
            }]
        );
    }

    #[test]
    fn unordered_list_strips_emphasis() {
        assert_eq!(
            scan_default("- **Bold** item\n* other"),
            vec![
                Operation::ListItem {
                    ordered: false,
                    text: "Bold item".to_string(),
                },
                Operation::ListItem {
                    ordered: false,
                    text: "other".to_string(),
                },
            ]
        );
    }

    #[test]
    fn ordered_list_drops_number() {
        assert_eq!(
            scan_default("12. Open the __Tasks__ page\n3.no space"),
            vec![
                Operation::ListItem {
                    ordered: true,
                    text: "Open the Tasks page".to_string(),
                },
                Operation::paragraph("3.no space"),
            ]
        );
    }

    #[test]
    fn frontmatter_is_skipped() {
        let ops = scan_default("---\ntitle: Guide\n---\n# Guide");
        assert_eq!(ops, vec![Operation::heading(1, "Guide")]);
    }

    #[test]
    fn unterminated_frontmatter_runs_to_end() {
        assert_eq!(scan_default("---\ntext"), vec![]);
        assert_eq!(scan_default("---\ntitle: Guide\n# Body"), vec![]);
    }

    #[test]
    fn rule_after_content() {
        assert_eq!(
            scan_default("text\n\n---"),
            vec![Operation::paragraph("text"), Operation::Rule]
        );
    }

    #[test]
    fn image_resolves_against_base() {
        let options = ScanOptions::with_image_base("/docs");
        let ops = scan("![Login screen](./images/login.png)", &options);
        assert_eq!(
            ops,
            vec![Operation::Image {
                alt: "Login screen".to_string(),
                path: Path::new("/docs").join("images/login.png"),
            }]
        );
    }

    #[test]
    fn never_more_operations_than_lines() {
        let markdown = "---\nk: v\n---\n# A\n\ntext **b**\n| a |\n|---|\n| 1 |\n> [!NOTE]\n> n\n- x\n1. y\n---\n";
        let ops = scan_default(markdown);
        assert!(ops.len() <= markdown.lines().count());
        assert_eq!(ops.len(), 7);
    }

    #[test]
    fn scanning_is_repeatable() {
        let markdown = "# T\n| a | b |\n|---|---|\n| 1 | 2 |\n> [!TIP]\n> x\n- y";
        assert_eq!(scan_default(markdown), scan_default(markdown));
    }

    #[test]
    fn crlf_input() {
        assert_eq!(
            scan_default("# Title\r\nBody\r\n"),
            vec![Operation::heading(1, "Title"), Operation::paragraph("Body")]
        );
    }
}
