//! Recording canvas for layout assertions.

use super::canvas::{DocumentCanvas, FontStyle, Logo, Rgb8};
use super::error::ReportError;

#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    Page,
    Text {
        text: String,
        x: f32,
        y: f32,
        style: FontStyle,
        size: f32,
    },
    Line {
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
    },
    Rect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        color: Rgb8,
    },
    Image {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    },
}

pub struct RecordingCanvas {
    pub ops: Vec<Op>,
    width: f32,
    height: f32,
    pages: usize,
    style: FontStyle,
    size: f32,
}

impl RecordingCanvas {
    pub fn a4() -> Self {
        Self {
            ops: Vec::new(),
            width: 210.0,
            height: 297.0,
            pages: 1,
            style: FontStyle::Normal,
            size: 10.0,
        }
    }

    pub fn texts(&self) -> Vec<&str> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                Op::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Bold 12pt texts, i.e. section headings.
    pub fn headings(&self) -> Vec<&str> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                Op::Text { text, style: FontStyle::Bold, size, .. } if *size == 12.0 => {
                    Some(text.as_str())
                }
                _ => None,
            })
            .collect()
    }

    /// Page number (1-based) each text landed on.
    pub fn page_of(&self, needle: &str) -> Option<usize> {
        let mut page = 1;
        for op in &self.ops {
            match op {
                Op::Page => page += 1,
                Op::Text { text, .. } if text == needle => return Some(page),
                _ => {}
            }
        }
        None
    }
}

impl DocumentCanvas for RecordingCanvas {
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
        self.pages += 1;
        self.ops.push(Op::Page);
    }

    fn set_font(&mut self, style: FontStyle, size: f32) {
        self.style = style;
        self.size = size;
    }

    fn set_text_color(&mut self, _color: Rgb8) {}

    fn text(&mut self, text: &str, x: f32, y: f32) {
        self.ops.push(Op::Text {
            text: text.to_string(),
            x,
            y,
            style: self.style,
            size: self.size,
        });
    }

    fn line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32) {
        self.ops.push(Op::Line { x1, y1, x2, y2 });
    }

    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: Rgb8) {
        self.ops.push(Op::Rect { x, y, width, height, color });
    }

    fn image(&mut self, _logo: &Logo, x: f32, y: f32, width: f32, height: f32) {
        self.ops.push(Op::Image { x, y, width, height });
    }

    fn finish(self) -> Result<Vec<u8>, ReportError> {
        Ok(format!("{:?}", self.ops).into_bytes())
    }
}
