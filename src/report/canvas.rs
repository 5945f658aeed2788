//! Document canvas: the drawing surface the composer and table engine write to.
//!
//! All coordinates are millimetres with the origin at the top-left corner of
//! the page, and `y` growing downwards. Text is positioned by its baseline.
//! `PdfCanvas` converts to PDF's bottom-left origin on the way out.

use std::io::BufWriter;
use std::path::{Path, PathBuf};

use printpdf::image_crate::{DynamicImage, GenericImageView as _};
use printpdf::path::{PaintMode, WindingOrder};
use printpdf::*;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::error::ReportError;

/// 8-bit RGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb8(pub u8, pub u8, pub u8);

impl Rgb8 {
    pub const BLACK: Rgb8 = Rgb8(0, 0, 0);
    pub const WHITE: Rgb8 = Rgb8(255, 255, 255);

    fn to_pdf(self) -> Color {
        Color::Rgb(Rgb::new(
            self.0 as f32 / 255.0,
            self.1 as f32 / 255.0,
            self.2 as f32 / 255.0,
            None,
        ))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontStyle {
    Normal,
    Bold,
}

/// Logo shipped with the binary, used when no override is configured.
const BUNDLED_LOGO: &[u8] = include_bytes!("../../resources/logo.png");
const BUNDLED_LOGO_NAME: &str = "resources/logo.png";

/// Decoded masthead logo, loaded once and reused for every document.
#[derive(Clone)]
pub struct Logo {
    source: PathBuf,
    image: DynamicImage,
}

impl std::fmt::Debug for Logo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Logo")
            .field("source", &self.source)
            .field("width", &self.image.width())
            .field("height", &self.image.height())
            .finish()
    }
}

impl Logo {
    /// Reads and decodes an image file. No fallback is substituted on failure.
    pub fn load(path: &Path) -> Result<Self, ReportError> {
        let bytes = std::fs::read(path).map_err(|e| ReportError::Asset {
            path: path.to_owned(),
            reason: e.to_string(),
        })?;
        let logo = Self::decode(path.to_owned(), &bytes)?;
        tracing::debug!(path = %path.display(), "Masthead logo loaded");
        Ok(logo)
    }

    /// The default masthead logo compiled into the binary.
    pub fn bundled() -> Result<Self, ReportError> {
        Self::decode(PathBuf::from(BUNDLED_LOGO_NAME), BUNDLED_LOGO)
    }

    fn decode(source: PathBuf, bytes: &[u8]) -> Result<Self, ReportError> {
        match printpdf::image_crate::load_from_memory(bytes) {
            Ok(image) => Ok(Self::from_image(source, image)),
            Err(e) => Err(ReportError::Asset {
                path: source,
                reason: e.to_string(),
            }),
        }
    }

    /// Wraps an already decoded image. Alpha is flattened, PDF images here are RGB.
    pub fn from_image(source: PathBuf, image: DynamicImage) -> Self {
        Self {
            source,
            image: DynamicImage::ImageRgb8(image.to_rgb8()),
        }
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn pixel_size(&self) -> (u32, u32) {
        (self.image.width(), self.image.height())
    }
}

/// Drawing surface consumed by the composer and the table layout engine.
pub trait DocumentCanvas {
    fn page_width(&self) -> f32;
    fn page_height(&self) -> f32;
    fn page_count(&self) -> usize;

    /// Starts a new page; subsequent drawing goes there.
    fn add_page(&mut self);

    fn set_font(&mut self, style: FontStyle, size: f32);
    fn set_text_color(&mut self, color: Rgb8);
    fn text(&mut self, text: &str, x: f32, y: f32);
    fn line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32);
    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: Rgb8);
    fn image(&mut self, logo: &Logo, x: f32, y: f32, width: f32, height: f32);

    /// Serializes the finished document.
    fn finish(self) -> Result<Vec<u8>, ReportError>
    where
        Self: Sized;
}

// ─── printpdf backend ─────────────────────────────────────────────────────────

/// Fixed document identity so identical requests serialize identically.
#[derive(Debug, Clone)]
pub struct DocumentIdentity {
    /// 32 ASCII characters, written into both trailer `/ID` entries.
    pub document_id: String,
    pub created: OffsetDateTime,
}

impl DocumentIdentity {
    /// Derives the identity from stable request data instead of the clock.
    pub fn derived_from(title: &str, file_name: &str) -> Self {
        let name = format!("{title}\u{1f}{file_name}");
        let id = uuid::Uuid::new_v5(&uuid::Uuid::NAMESPACE_OID, name.as_bytes());
        Self {
            document_id: id.simple().to_string(),
            created: OffsetDateTime::UNIX_EPOCH,
        }
    }
}

const LOGO_DPI: f32 = 300.0;
const MM_PER_INCH: f32 = 25.4;

const TRAILER_ID: &[u8] = b"/ID[(";
const TRAILER_ID_LEN: usize = 32;

pub struct PdfCanvas {
    doc: PdfDocumentReference,
    document_id: String,
    layer: PdfLayerReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    width: f32,
    height: f32,
    pages: usize,
    font: FontStyle,
    font_size: f32,
    text_color: Rgb8,
}

impl PdfCanvas {
    pub fn new(
        title: &str,
        width: f32,
        height: f32,
        identity: DocumentIdentity,
    ) -> Result<Self, ReportError> {
        let (doc, page1, layer1) = PdfDocument::new(title, Mm(width), Mm(height), "Layer 1");
        let doc = doc
            .with_conformance(PdfConformance::Custom(CustomPdfConformance {
                requires_icc_profile: false,
                requires_xmp_metadata: false,
                ..Default::default()
            }))
            .with_creation_date(identity.created)
            .with_mod_date(identity.created);

        let layer = doc.get_page(page1).get_layer(layer1);
        let regular = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| ReportError::Font(e.to_string()))?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| ReportError::Font(e.to_string()))?;

        Ok(Self {
            doc,
            document_id: identity.document_id,
            layer,
            regular,
            bold,
            width,
            height,
            pages: 1,
            font: FontStyle::Normal,
            font_size: 10.0,
            text_color: Rgb8::BLACK,
        })
    }

    /// Flips a top-left `y` into PDF's bottom-left space.
    fn pdf_y(&self, y: f32) -> Mm {
        Mm(self.height - y)
    }
}

impl DocumentCanvas for PdfCanvas {
    fn page_width(&self) -> f32 {
        self.width
    }

    fn page_height(&self) -> f32 {
        self.height
    }

    fn page_count(&self) -> usize {
        self.pages
    }

    fn add_page(&mut self) {
        let (page, layer) = self
            .doc
            .add_page(Mm(self.width), Mm(self.height), "Layer 1");
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.pages += 1;
    }

    fn set_font(&mut self, style: FontStyle, size: f32) {
        self.font = style;
        self.font_size = size;
    }

    fn set_text_color(&mut self, color: Rgb8) {
        self.text_color = color;
    }

    fn text(&mut self, text: &str, x: f32, y: f32) {
        let font = match self.font {
            FontStyle::Normal => &self.regular,
            FontStyle::Bold => &self.bold,
        };
        // Fill colour is shared with rectangles, so it is set on every write.
        self.layer.set_fill_color(self.text_color.to_pdf());
        self.layer
            .use_text(text, self.font_size, Mm(x), self.pdf_y(y), font);
    }

    fn line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32) {
        self.layer.set_outline_color(Rgb8(120, 120, 120).to_pdf());
        self.layer.set_outline_thickness(0.5);
        self.layer.add_line(Line {
            points: vec![
                (Point::new(Mm(x1), self.pdf_y(y1)), false),
                (Point::new(Mm(x2), self.pdf_y(y2)), false),
            ],
            is_closed: false,
        });
    }

    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: Rgb8) {
        let top = self.pdf_y(y);
        let bottom = self.pdf_y(y + height);
        self.layer.set_fill_color(color.to_pdf());
        self.layer.add_polygon(Polygon {
            rings: vec![vec![
                (Point::new(Mm(x), bottom), false),
                (Point::new(Mm(x + width), bottom), false),
                (Point::new(Mm(x + width), top), false),
                (Point::new(Mm(x), top), false),
            ]],
            mode: PaintMode::Fill,
            winding_order: WindingOrder::NonZero,
        });
    }

    fn image(&mut self, logo: &Logo, x: f32, y: f32, width: f32, height: f32) {
        let (px_w, px_h) = logo.pixel_size();
        if px_w == 0 || px_h == 0 {
            return;
        }
        let natural_w = px_w as f32 / LOGO_DPI * MM_PER_INCH;
        let natural_h = px_h as f32 / LOGO_DPI * MM_PER_INCH;

        let image = Image::from_dynamic_image(&logo.image);
        image.add_to_layer(
            self.layer.clone(),
            ImageTransform {
                translate_x: Some(Mm(x)),
                translate_y: Some(self.pdf_y(y + height)),
                scale_x: Some(width / natural_w),
                scale_y: Some(height / natural_h),
                dpi: Some(LOGO_DPI),
                ..Default::default()
            },
        );
    }

    fn finish(self) -> Result<Vec<u8>, ReportError> {
        let mut buf = BufWriter::new(Vec::new());
        self.doc
            .save(&mut buf)
            .map_err(|e| ReportError::Pdf(e.to_string()))?;
        let mut bytes = buf
            .into_inner()
            .map_err(|e| ReportError::Pdf(format!("PDF buffer error: {e}")))?;
        pin_trailer_id(&mut bytes, &self.document_id)?;
        Ok(bytes)
    }
}

/// Overwrites the trailer `/ID` pair, which printpdf fills with random
/// characters on every save, with `id`. Both strings keep their length, so
/// the cross-reference offsets stay valid.
fn pin_trailer_id(bytes: &mut [u8], id: &str) -> Result<(), ReportError> {
    let id = id.as_bytes();
    if id.len() != TRAILER_ID_LEN || !id.iter().all(u8::is_ascii_alphanumeric) {
        return Err(ReportError::Pdf(format!("invalid document id {:?}", String::from_utf8_lossy(id))));
    }

    let first = bytes
        .windows(TRAILER_ID.len())
        .rposition(|w| w == TRAILER_ID)
        .map(|at| at + TRAILER_ID.len())
        .ok_or_else(|| ReportError::Pdf("trailer has no /ID entry".into()))?;
    let second = first + TRAILER_ID_LEN + 2;
    let well_formed = bytes.len() > second + TRAILER_ID_LEN
        && &bytes[first + TRAILER_ID_LEN..second] == b")("
        && bytes[second + TRAILER_ID_LEN] == b')';
    if !well_formed {
        return Err(ReportError::Pdf("unexpected trailer /ID layout".into()));
    }

    bytes[first..first + TRAILER_ID_LEN].copy_from_slice(id);
    bytes[second..second + TRAILER_ID_LEN].copy_from_slice(id);
    Ok(())
}
