//! Word rendering of document operations using docx-rs
//!
//! - Writer: walks the operations and builds the document
//! - Styles: paragraph styles referenced by the writer
//! - Numbering: bullet and decimal list definitions
//! - Images: picture embedding with placeholder fallbacks

mod images;
mod numbering;
mod styles;
mod writer;

pub use writer::DocxWriter;

use crate::config::Config;
use crate::error::Result;
use crate::op::Operation;

/// Render operations to DOCX bytes.
pub fn render(ops: &[Operation], config: &Config) -> Result<Vec<u8>> {
    DocxWriter::new(config).write(ops)
}
