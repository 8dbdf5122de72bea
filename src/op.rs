use std::path::PathBuf;

/// How a paragraph is presented
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParagraphStyle {
    #[default]
    Body,
    Quote,
    Subtitle,
}

/// A table with a header row, data rows and an optional emphasised footer row.
/// An empty header means the table has no header row.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Table {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub footer: Option<Vec<String>>,
}

impl Table {
    pub fn new(header: Vec<String>) -> Self {
        Self {
            header,
            rows: Vec::new(),
            footer: None,
        }
    }

    /// A table of plain rows without a header row.
    pub fn plain(rows: Vec<Vec<String>>) -> Self {
        Self {
            header: Vec::new(),
            rows,
            footer: None,
        }
    }

    /// Column count, fixed by the header row when there is one.
    pub fn columns(&self) -> usize {
        if self.header.is_empty() {
            self.rows.first().map_or(0, Vec::len)
        } else {
            self.header.len()
        }
    }
}

/// A single renderable unit, independent of the output format
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// Level 0 is a document title.
    Heading {
        level: u8,
        text: String,
    },
    Paragraph {
        text: String,
        style: ParagraphStyle,
    },
    ListItem {
        ordered: bool,
        text: String,
    },
    Table(Table),
    Image {
        alt: String,
        path: PathBuf,
    },
    Alert {
        kind: String,
        text: String,
    },
    Rule,
    PageBreak,
}

impl Operation {
    pub fn heading(level: u8, text: impl Into<String>) -> Self {
        Self::Heading {
            level,
            text: text.into(),
        }
    }

    pub fn paragraph(text: impl Into<String>) -> Self {
        Self::Paragraph {
            text: text.into(),
            style: ParagraphStyle::Body,
        }
    }
}
