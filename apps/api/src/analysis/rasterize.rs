//! PDF → PNG preview of the first page. Rendering is done by pdfium, bound at
//! runtime; this module only drives it.

use std::io::Cursor;

use async_trait::async_trait;
use bytes::Bytes;
use image::{ImageError, ImageFormat};
use pdfium_render::prelude::*;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum ConversionError {
    #[error("pdfium library unavailable: {0}")]
    Library(String),

    #[error("corrupt PDF: {0}")]
    CorruptPdf(String),

    #[error("rasterisation failed: {0}")]
    Render(String),

    #[error("PNG encoding failed: {0}")]
    Encode(#[from] ImageError),

    #[error("render task panicked: {0}")]
    Join(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedImage {
    pub png: Bytes,
    pub width: u32,
    pub height: u32,
}

#[async_trait]
pub trait PdfRasterizer: Send + Sync {
    /// `Ok(None)` when the document has no page to render.
    async fn render_first_page(&self, pdf: Bytes) -> Result<Option<RenderedImage>, ConversionError>;
}

pub struct PdfiumRasterizer {
    library_path: Option<String>,
    max_pixels: u32,
}

impl PdfiumRasterizer {
    pub fn new(library_path: Option<String>, max_pixels: u32) -> Self {
        Self {
            library_path,
            max_pixels: max_pixels.max(64),
        }
    }
}

#[async_trait]
impl PdfRasterizer for PdfiumRasterizer {
    async fn render_first_page(&self, pdf: Bytes) -> Result<Option<RenderedImage>, ConversionError> {
        let library_path = self.library_path.clone();
        let max_pixels = self.max_pixels;

        // pdfium is CPU-bound and not async-safe; keep it off the worker threads.
        tokio::task::spawn_blocking(move || {
            render_first_page_blocking(&pdf, library_path.as_deref(), max_pixels)
        })
        .await
        .map_err(|e| ConversionError::Join(e.to_string()))?
    }
}

fn bind_pdfium(library_path: Option<&str>) -> Result<Pdfium, ConversionError> {
    let bindings = match library_path {
        Some(dir) => Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(dir)),
        None => Pdfium::bind_to_system_library(),
    }
    .map_err(|e| ConversionError::Library(format!("{e:?}")))?;
    Ok(Pdfium::new(bindings))
}

fn render_first_page_blocking(
    pdf: &[u8],
    library_path: Option<&str>,
    max_pixels: u32,
) -> Result<Option<RenderedImage>, ConversionError> {
    let pdfium = bind_pdfium(library_path)?;

    let document = pdfium
        .load_pdf_from_byte_slice(pdf, None)
        .map_err(|e| ConversionError::CorruptPdf(format!("{e:?}")))?;

    let pages = document.pages();
    if pages.len() == 0 {
        info!("PDF has no pages; no preview produced");
        return Ok(None);
    }

    let page = pages
        .get(0)
        .map_err(|e| ConversionError::Render(format!("{e:?}")))?;

    let render_config = PdfRenderConfig::new()
        .set_target_width(max_pixels as i32)
        .set_maximum_height(max_pixels as i32);

    let image = page
        .render_with_config(&render_config)
        .map_err(|e| ConversionError::Render(format!("{e:?}")))?
        .as_image();

    let (width, height) = (image.width(), image.height());
    if width == 0 || height == 0 {
        return Ok(None);
    }

    let mut png = Vec::new();
    image.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;
    debug!("Rendered first page → {width}x{height} px, {} bytes", png.len());

    Ok(Some(RenderedImage {
        png: Bytes::from(png),
        width,
        height,
    }))
}

/// Preview file name for an uploaded PDF: `resume.pdf` → `resume.png`.
pub fn preview_file_name(pdf_name: &str) -> String {
    let stem = pdf_name
        .strip_suffix(".pdf")
        .or_else(|| pdf_name.strip_suffix(".PDF"))
        .unwrap_or(pdf_name);
    format!("{stem}.png")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_file_name() {
        assert_eq!(preview_file_name("resume.pdf"), "resume.png");
        assert_eq!(preview_file_name("CV.PDF"), "CV.png");
        assert_eq!(preview_file_name("notes"), "notes.png");
    }

    #[test]
    fn test_max_pixels_has_floor() {
        let rasterizer = PdfiumRasterizer::new(None, 0);
        assert_eq!(rasterizer.max_pixels, 64);
    }
}
