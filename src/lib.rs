mod config;
mod error;
mod op;
mod scanner;
mod typst;

pub mod docx;
pub mod plan;
pub mod template;

pub use config::{AlertsConfig, Config, CoverConfig, DocumentConfig, ImagesConfig, TableConfig};
pub use error::{Error, Result};
pub use op::{Operation, ParagraphStyle, Table};
pub use scanner::{ScanOptions, scan};

use typst_as_lib::TypstEngine;
use typst_as_lib::typst_kit_options::TypstKitFontOptions;
use typst_pdf::PdfOptions;

/// Cover page operations followed by the scanned markdown.
pub fn document_operations(markdown: &str, options: &ScanOptions, config: &Config) -> Vec<Operation> {
    let mut ops = config.cover.operations();
    ops.extend(scan(markdown, options));
    ops
}

/// Convert markdown to DOCX bytes.
pub fn markdown_to_docx(markdown: &str, options: &ScanOptions, config: &Config) -> Result<Vec<u8>> {
    let ops = document_operations(markdown, options, config);
    docx::render(&ops, config)
}

/// Convert markdown to Typst markup.
pub fn markdown_to_typst(markdown: &str, options: &ScanOptions, config: &Config) -> String {
    let ops = document_operations(markdown, options, config);
    typst::operations_to_typst(&ops, config, &options.image_base)
}

/// Convert markdown to PDF bytes.
pub fn markdown_to_pdf(markdown: &str, options: &ScanOptions, config: &Config) -> Result<Vec<u8>> {
    use typst_library::layout::PagedDocument;

    let typst_content = markdown_to_typst(markdown, options, config);

    let font_options = TypstKitFontOptions::new()
        .include_embedded_fonts(true)
        .include_system_fonts(false);

    let engine = TypstEngine::builder()
        .main_file(typst_content)
        .search_fonts_with(font_options)
        .with_file_system_resolver(options.image_base.clone())
        .build();

    let doc: PagedDocument = engine
        .compile()
        .output
        .map_err(|e| Error::Typst(format!("compilation failed: {e:?}")))?;

    typst_pdf::pdf(&doc, &PdfOptions::default())
        .map_err(|e| Error::Typst(format!("PDF generation failed: {e:?}")))
}

/// Convert a test plan to DOCX bytes.
pub fn plan_to_docx(plan: &plan::TestPlan, config: &Config) -> Result<Vec<u8>> {
    docx::render(&plan.operations(), config)
}
