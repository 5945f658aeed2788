//! Report composer: masthead, title block, then one heading + table per
//! section, with a page-break check before each section.

use std::sync::Arc;

use crate::config::LayoutConfig;

use super::canvas::{DocumentCanvas, DocumentIdentity, FontStyle, Logo, PdfCanvas, Rgb8};
use super::error::ReportError;
use super::sink::{validate_file_name, ReportSink};
use super::table::{Table, TableLayout};
use super::types::{ExportedReport, RenderedReport, ReportRequest};

pub struct ReportComposer {
    layout: LayoutConfig,
    table: Arc<dyn TableLayout>,
    logo: Logo,
}

impl ReportComposer {
    pub fn new(layout: LayoutConfig, table: Arc<dyn TableLayout>, logo: Logo) -> Self {
        Self { layout, table, logo }
    }

    #[cfg(test)]
    pub(crate) fn logo(&self) -> &Logo {
        &self.logo
    }

    /// Lays the whole request out on `canvas`. Returns the final cursor.
    pub fn compose<C: DocumentCanvas>(
        &self,
        request: &ReportRequest,
        canvas: &mut C,
    ) -> Result<f32, ReportError> {
        let layout = &self.layout;
        let frame = layout.table_frame();

        self.masthead(canvas);

        canvas.set_text_color(Rgb8::BLACK);
        canvas.set_font(FontStyle::Normal, layout.title_font_size);
        canvas.text(&request.title, layout.margin_left, layout.title_y);
        canvas.set_font(FontStyle::Normal, layout.subtitle_font_size);
        canvas.text(&request.subtitle, layout.margin_left, layout.subtitle_y);

        let mut cursor = layout.start_cursor;

        for section in &request.sections {
            if canvas.page_height() - cursor < layout.page_break_threshold {
                canvas.add_page();
                tracing::debug!(section = %section.title, cursor, "Section starts on new page");
                cursor = layout.top_margin;
            }

            canvas.set_text_color(Rgb8::BLACK);
            canvas.set_font(FontStyle::Bold, layout.heading_font_size);
            canvas.text(&section.title, layout.margin_left, cursor);
            cursor += layout.heading_gap;
            canvas.line(layout.margin_left, cursor, layout.content_right(), cursor);
            cursor += layout.rule_gap;

            let table = Table {
                section: &section.title,
                header: &section.columns,
                rows: &section.data,
            };
            let end = self.table.draw(&mut *canvas, cursor, &table, &frame, &layout.table)?;
            cursor = end + layout.section_spacing;
        }

        Ok(cursor)
    }

    fn masthead<C: DocumentCanvas>(&self, canvas: &mut C) {
        let layout = &self.layout;
        canvas.image(
            &self.logo,
            layout.logo_x,
            layout.logo_y,
            layout.logo_size,
            layout.logo_size,
        );
        canvas.set_text_color(Rgb8::BLACK);
        canvas.set_font(FontStyle::Bold, layout.organization_font_size);
        canvas.text(&layout.organization, layout.organization_x, layout.organization_y);
    }

    /// Composes the request into PDF bytes without exporting them.
    pub fn render(&self, request: &ReportRequest) -> Result<RenderedReport, ReportError> {
        let identity = DocumentIdentity::derived_from(&request.title, &request.file_name);
        let mut canvas = PdfCanvas::new(
            &request.title,
            self.layout.page_width,
            self.layout.page_height,
            identity,
        )?;
        self.compose(request, &mut canvas)?;

        let pages = canvas.page_count();
        let bytes = canvas.finish()?;
        Ok(RenderedReport {
            file_name: request.file_name.clone(),
            pages,
            bytes,
        })
    }

    /// Renders the request and hands the finished document to `sink`.
    ///
    /// The sink is only called once the whole document rendered successfully.
    pub fn generate_report(
        &self,
        request: &ReportRequest,
        sink: &dyn ReportSink,
    ) -> Result<ExportedReport, ReportError> {
        validate_file_name(&request.file_name)?;

        let rendered = self.render(request)?;
        let path = sink.deliver(&rendered.file_name, &rendered.bytes)?;

        tracing::info!(
            file_name = %rendered.file_name,
            sections = request.sections.len(),
            pages = rendered.pages,
            bytes = rendered.bytes.len(),
            "Report exported"
        );

        Ok(ExportedReport {
            file_name: rendered.file_name,
            path,
            pages: rendered.pages,
            bytes: rendered.bytes.len(),
        })
    }
}
