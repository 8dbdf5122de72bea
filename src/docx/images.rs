use std::fs;
use std::io::Cursor;
use std::path::Path;

use docx_rs::*;
use image::{ImageFormat, ImageResult};
use log::{debug, warn};

const EMU_PER_INCH: f64 = 914_400.0;

/// Embeds pictures scaled to a fixed width
pub struct DocxImageProcessor {
    width_emu: u32,
}

impl DocxImageProcessor {
    /// `width` is in inches.
    pub fn new(width: f64) -> Self {
        Self {
            width_emu: (width.max(0.1) * EMU_PER_INCH) as u32,
        }
    }

    /// Add a centred picture and its caption, or a placeholder paragraph when
    /// the file is missing or cannot be decoded.
    pub fn add_image(&self, docx: Docx, alt: &str, path: &Path) -> Docx {
        if !path.exists() {
            debug!("image not found: {}", path.display());
            return docx.add_paragraph(placeholder(alt, "File not found"));
        }

        let pic = match self.load(path) {
            Ok(pic) => pic,
            Err(e) => {
                warn!("error inserting image {}: {e}", path.display());
                return docx.add_paragraph(placeholder(alt, "Error inserting image"));
            }
        };

        let picture = Paragraph::new()
            .align(AlignmentType::Center)
            .add_run(Run::new().add_image(pic));
        let docx = docx.add_paragraph(picture);

        if alt.is_empty() {
            return docx;
        }
        docx.add_paragraph(
            Paragraph::new()
                .style("Caption")
                .add_run(Run::new().add_text(alt)),
        )
    }

    fn load(&self, path: &Path) -> ImageResult<Pic> {
        let data = fs::read(path)?;
        let img = image::load_from_memory(&data)?;
        let (width, height) = self.scaled_size(img.width(), img.height());

        // Re-encode so every accepted input format reaches the document as PNG.
        let mut png = Vec::new();
        img.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;

        Ok(Pic::new(&png).size(width, height))
    }

    /// Size in EMU at the configured width, keeping the aspect ratio.
    fn scaled_size(&self, width_px: u32, height_px: u32) -> (u32, u32) {
        if width_px == 0 {
            return (self.width_emu, self.width_emu);
        }
        let ratio = f64::from(height_px) / f64::from(width_px);
        (self.width_emu, (f64::from(self.width_emu) * ratio) as u32)
    }
}

fn placeholder(alt: &str, reason: &str) -> Paragraph {
    Paragraph::new().add_run(Run::new().add_text(format!("[Image: {alt} - {reason}]")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn six_inch_images_keep_aspect_ratio() {
        let images = DocxImageProcessor::new(6.0);
        assert_eq!(images.scaled_size(800, 400), (5_486_400, 2_743_200));
        assert_eq!(images.scaled_size(100, 100), (5_486_400, 5_486_400));
    }

    #[test]
    fn zero_width_image_does_not_divide_by_zero() {
        let images = DocxImageProcessor::new(1.0);
        assert_eq!(images.scaled_size(0, 10), (914_400, 914_400));
    }
}
