//! DOCX document writer

use std::io::Cursor;

use docx_rs::*;
use log::debug;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::op::{self, Operation};

use super::images::DocxImageProcessor;
use super::numbering::DocxNumbering;
use super::styles;

const RULE_WIDTH: usize = 40;

/// Writes operations into a DOCX document
pub struct DocxWriter<'a> {
    config: &'a Config,
    numbering: DocxNumbering,
    images: DocxImageProcessor,
    // Kind and numbering id of the list run in progress
    current_list: Option<(bool, usize)>,
}

impl<'a> DocxWriter<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self {
            config,
            numbering: DocxNumbering::new(),
            images: DocxImageProcessor::new(config.images.width),
            current_list: None,
        }
    }

    /// Build the document and pack it to bytes.
    pub fn write(&mut self, ops: &[Operation]) -> Result<Vec<u8>> {
        self.current_list = None;

        let font = &self.config.document.font;
        let fonts = RunFonts::new()
            .ascii(font)
            .hi_ansi(font)
            .east_asia(font)
            .cs(font);

        let mut docx = Docx::new()
            .default_fonts(fonts)
            .default_size(self.config.document.size * 2);
        docx = styles::add_styles(docx);

        for op in ops {
            docx = self.process_operation(docx, op);
        }
        debug!("rendered {} operations to DOCX", ops.len());

        let mut buffer = Vec::new();
        docx.build()
            .pack(&mut Cursor::new(&mut buffer))
            .map_err(|e| Error::Pack(e.to_string()))?;

        Ok(buffer)
    }

    fn process_operation(&mut self, docx: Docx, op: &Operation) -> Docx {
        if !matches!(op, Operation::ListItem { .. }) {
            self.current_list = None;
        }

        match op {
            Operation::Heading { level, text } => docx.add_paragraph(
                Paragraph::new()
                    .style(styles::heading_style_id(*level))
                    .add_run(Run::new().add_text(text)),
            ),
            Operation::Paragraph { text, style } => {
                let para = Paragraph::new().add_run(Run::new().add_text(text));
                let para = match style {
                    op::ParagraphStyle::Body => para,
                    op::ParagraphStyle::Quote => para.style("Quote"),
                    op::ParagraphStyle::Subtitle => para.style("Subtitle"),
                };
                docx.add_paragraph(para)
            }
            Operation::ListItem { ordered, text } => {
                let (docx, num_id) = self.list_numbering(docx, *ordered);
                docx.add_paragraph(
                    Paragraph::new()
                        .numbering(NumberingId::new(num_id), IndentLevel::new(0))
                        .add_run(Run::new().add_text(text)),
                )
            }
            Operation::Table(table) => docx.add_table(self.build_table(table)),
            Operation::Image { alt, path } => self.images.add_image(docx, alt, path),
            Operation::Alert { kind, text } => docx.add_table(self.build_alert(kind, text)),
            Operation::Rule => docx.add_paragraph(
                Paragraph::new()
                    .align(AlignmentType::Center)
                    .add_run(Run::new().add_text("_".repeat(RULE_WIDTH))),
            ),
            Operation::PageBreak => {
                docx.add_paragraph(Paragraph::new().add_run(Run::new().add_break(BreakType::Page)))
            }
        }
    }

    /// Reuse the numbering of the current list run, or start a new one.
    fn list_numbering(&mut self, docx: Docx, ordered: bool) -> (Docx, usize) {
        match self.current_list {
            Some((kind, id)) if kind == ordered => (docx, id),
            _ => {
                let (docx, id) = self.numbering.create(docx, ordered);
                self.current_list = Some((ordered, id));
                (docx, id)
            }
        }
    }

    fn build_table(&self, table: &op::Table) -> Table {
        let colors = &self.config.table;
        let mut rows = Vec::with_capacity(table.rows.len() + 2);

        if !table.header.is_empty() {
            let header = table
                .header
                .iter()
                .map(|text| {
                    let run = Run::new()
                        .add_text(text)
                        .bold()
                        .color(colors.header_text.as_str());
                    TableCell::new()
                        .shading(Shading::new().fill(colors.header_fill.as_str()))
                        .add_paragraph(Paragraph::new().add_run(run))
                })
                .collect();
            rows.push(TableRow::new(header));
        }

        for row in &table.rows {
            rows.push(TableRow::new(row.iter().map(|text| text_cell(text, false)).collect()));
        }

        if let Some(footer) = &table.footer {
            rows.push(TableRow::new(
                footer.iter().map(|text| text_cell(text, true)).collect(),
            ));
        }

        Table::new(rows)
    }

    /// A single shaded cell holding `KIND: text`.
    fn build_alert(&self, kind: &str, text: &str) -> Table {
        let para = Paragraph::new()
            .add_run(Run::new().add_text(format!("{kind}: ")).bold())
            .add_run(Run::new().add_text(text));
        let cell = TableCell::new()
            .shading(Shading::new().fill(self.config.alerts.fill_for(kind)))
            .add_paragraph(para);

        Table::new(vec![TableRow::new(vec![cell])])
    }
}

fn text_cell(text: &str, bold: bool) -> TableCell {
    let run = Run::new().add_text(text);
    let run = if bold { run.bold() } else { run };
    TableCell::new().add_paragraph(Paragraph::new().add_run(run))
}
