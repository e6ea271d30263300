use super::layout::{
    incidence_line, observation_or_placeholder, summary_line, ReportBlock, ReportDocument,
    INVALID_PHOTO, NO_PHOTO, REPORT_TITLE,
};
use super::photo::PreparedPhoto;
use super::ReportError;
use crate::workflows::checklist::{Category, ChecklistItem, ItemStatus, Stats};
use chrono::NaiveDate;
use printpdf::path::PaintMode;
use printpdf::{
    BuiltinFont, Color, Image, ImageTransform, IndirectFontRef, Mm, PdfDocument,
    PdfDocumentReference, PdfLayerReference, Rect, Rgb,
};
use tracing::warn;

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN: f32 = 15.0;
const CONTENT_WIDTH: f32 = PAGE_WIDTH - 2.0 * MARGIN;
const USABLE_HEIGHT: f32 = PAGE_HEIGHT - 2.0 * MARGIN;
const LAYER_NAME: &str = "Informe";

const COLUMN_WIDTHS: [f32; 3] = [72.0, 68.0, 40.0];
const CELL_PADDING: f32 = 2.0;
const BODY_SIZE: f32 = 9.0;
const LINE_HEIGHT: f32 = 4.2;
const PT_TO_MM: f32 = 0.3528;
// Rough Helvetica advance as a fraction of the font size.
const AVERAGE_GLYPH_WIDTH: f32 = 0.5;

const PHOTO_BOX_MM: (f32, f32) = (36.0, 26.0);
const PHOTO_DPI: f32 = 150.0;
const MM_PER_INCH: f32 = 25.4;

type Rgb8 = (u8, u8, u8);
const BANNER: Rgb8 = (0x43, 0x38, 0xca);
const WHITE: Rgb8 = (0xff, 0xff, 0xff);
const INK: Rgb8 = (0x1e, 0x29, 0x3b);
const MUTED: Rgb8 = (0x64, 0x74, 0x8b);
const PANEL: Rgb8 = (0xf1, 0xf5, 0xf9);
const GRID: Rgb8 = (0xcb, 0xd5, 0xe1);
const FAIL_BACKGROUND: Rgb8 = (0xfe, 0xe2, 0xe2);

pub fn render_pdf(document: &ReportDocument<'_>) -> Result<Vec<u8>, ReportError> {
    let mut canvas = PdfCanvas::new(REPORT_TITLE)?;

    for block in document.blocks() {
        match block {
            ReportBlock::Title {
                title,
                community,
                date,
            } => canvas.title_block(title, community, *date),
            ReportBlock::Summary(stats) => canvas.summary(stats),
            ReportBlock::Section { number, title } => {
                canvas.section(&format!("{number}) {title}"))
            }
            ReportBlock::Category { category, items } => canvas.category_table(*category, items),
            ReportBlock::Paragraph(text) => canvas.paragraph(text),
            ReportBlock::Incidences(records) => {
                for record in records {
                    canvas.paragraph(&incidence_line(record));
                }
            }
        }
    }

    canvas.finish()
}

fn pdf_error(err: impl std::fmt::Display) -> ReportError {
    ReportError::Pdf(err.to_string())
}

fn color((r, g, b): Rgb8) -> Color {
    Color::Rgb(Rgb::new(
        f32::from(r) / 255.0,
        f32::from(g) / 255.0,
        f32::from(b) / 255.0,
        None,
    ))
}

/// Greedy word wrap on an estimated glyph width; words longer than a line
/// are split.
pub(crate) fn wrap_text(text: &str, width_mm: f32, size: f32) -> Vec<String> {
    let max_chars = ((width_mm / (size * AVERAGE_GLYPH_WIDTH * PT_TO_MM)) as usize).max(1);
    let mut lines = Vec::new();

    for paragraph in text.lines() {
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            let mut word: Vec<char> = word.chars().collect();
            while word.len() > max_chars {
                if !current.is_empty() {
                    lines.push(std::mem::take(&mut current));
                }
                let rest = word.split_off(max_chars);
                lines.push(word.into_iter().collect());
                word = rest;
            }

            let needed = word.len() + usize::from(!current.is_empty());
            if current.chars().count() + needed > max_chars && !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            if !current.is_empty() {
                current.push(' ');
            }
            current.extend(word);
        }
        lines.push(current);
    }

    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

enum PhotoCell {
    Missing,
    Invalid,
    Ready {
        photo: PreparedPhoto,
        height_mm: f32,
    },
}

impl PhotoCell {
    fn for_item(item: &ChecklistItem) -> Self {
        let Some(bytes) = item.photo.as_deref() else {
            return Self::Missing;
        };

        let max_width = (PHOTO_BOX_MM.0 / MM_PER_INCH * PHOTO_DPI) as u32;
        let max_height = (PHOTO_BOX_MM.1 / MM_PER_INCH * PHOTO_DPI) as u32;
        match PreparedPhoto::fit(bytes, max_width, max_height) {
            Ok(photo) => Self::Ready {
                height_mm: photo.height() as f32 / PHOTO_DPI * MM_PER_INCH,
                photo,
            },
            Err(err) => {
                warn!(item = item.id, error = %err, "photo could not be decoded; using placeholder");
                Self::Invalid
            }
        }
    }

    fn height_mm(&self) -> f32 {
        match self {
            Self::Ready { height_mm, .. } => *height_mm,
            Self::Missing | Self::Invalid => LINE_HEIGHT,
        }
    }
}

struct PdfCanvas {
    document: PdfDocumentReference,
    layer: PdfLayerReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    /// Distance from the top edge of the current page, in millimetres.
    cursor: f32,
}

impl PdfCanvas {
    fn new(title: &str) -> Result<Self, ReportError> {
        let (document, page, layer) =
            PdfDocument::new(title, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), LAYER_NAME);
        let regular = document
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(pdf_error)?;
        let bold = document
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(pdf_error)?;
        let layer = document.get_page(page).get_layer(layer);

        Ok(Self {
            document,
            layer,
            regular,
            bold,
            cursor: MARGIN,
        })
    }

    fn finish(self) -> Result<Vec<u8>, ReportError> {
        self.document.save_to_bytes().map_err(pdf_error)
    }

    fn remaining(&self) -> f32 {
        PAGE_HEIGHT - MARGIN - self.cursor
    }

    fn ensure_space(&mut self, height: f32) {
        if height > self.remaining() {
            self.new_page();
        }
    }

    fn new_page(&mut self) {
        let (page, layer) = self
            .document
            .add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), LAYER_NAME);
        self.layer = self.document.get_page(page).get_layer(layer);
        self.cursor = MARGIN;
    }

    /// Cell lines that still fit on the current page below the cursor.
    fn lines_fitting(&self) -> usize {
        let usable = self.remaining() - 2.0 * CELL_PADDING;
        if usable < LINE_HEIGHT {
            0
        } else {
            ((usable + 0.01) / LINE_HEIGHT) as usize
        }
    }

    fn text(&self, text: &str, size: f32, x: f32, top: f32, bold: bool, ink: Rgb8) {
        let font = if bold { &self.bold } else { &self.regular };
        let baseline = top + size * PT_TO_MM;
        self.layer.set_fill_color(color(ink));
        self.layer
            .use_text(text, size, Mm(x), Mm(PAGE_HEIGHT - baseline), font);
    }

    fn rect(&self, x: f32, top: f32, width: f32, height: f32, mode: PaintMode, paint: Rgb8) {
        match mode {
            PaintMode::Stroke => {
                self.layer.set_outline_color(color(paint));
                self.layer.set_outline_thickness(0.4);
            }
            _ => self.layer.set_fill_color(color(paint)),
        }
        let rect = Rect::new(
            Mm(x),
            Mm(PAGE_HEIGHT - top - height),
            Mm(x + width),
            Mm(PAGE_HEIGHT - top),
        )
        .with_mode(mode);
        self.layer.add_rect(rect);
    }

    fn title_block(&mut self, title: &str, community: &str, date: NaiveDate) {
        let height = 22.0;
        self.ensure_space(height + 4.0);
        self.rect(MARGIN, self.cursor, CONTENT_WIDTH, height, PaintMode::Fill, BANNER);
        self.text(title, 13.0, MARGIN + 4.0, self.cursor + 3.0, true, WHITE);
        self.text(
            &format!("Comunidad: {community}"),
            10.0,
            MARGIN + 4.0,
            self.cursor + 10.0,
            false,
            WHITE,
        );
        self.text(
            &format!("Fecha: {date}"),
            10.0,
            MARGIN + 4.0,
            self.cursor + 15.5,
            false,
            WHITE,
        );
        self.cursor += height + 4.0;
    }

    fn summary(&mut self, stats: &Stats) {
        let cells: [(&str, usize, Rgb8); 4] = [
            ("OK", stats.ok, ItemStatus::Ok.accent_rgb()),
            ("FALLAS", stats.fail, ItemStatus::Fail.accent_rgb()),
            ("PENDIENTES", stats.pending, ItemStatus::Pending.accent_rgb()),
            ("TOTAL", stats.total, INK),
        ];
        let gap = 4.0;
        let width = (CONTENT_WIDTH - gap * 3.0) / 4.0;
        let height = 16.0;
        self.ensure_space(height + 6.0);

        for (index, (label, value, accent)) in cells.into_iter().enumerate() {
            let x = MARGIN + index as f32 * (width + gap);
            self.rect(x, self.cursor, width, height, PaintMode::Fill, PANEL);
            self.text(label, 8.0, x + 3.0, self.cursor + 2.5, false, MUTED);
            self.text(&value.to_string(), 16.0, x + 3.0, self.cursor + 7.5, true, accent);
        }

        // Keep the exact summary sentence searchable in the document text.
        self.cursor += height + 2.0;
        self.text(&summary_line(stats), 7.0, MARGIN, self.cursor, false, MUTED);
        self.cursor += 6.0;
    }

    fn section(&mut self, heading: &str) {
        self.ensure_space(14.0);
        self.cursor += 3.0;
        self.text(heading, 12.0, MARGIN, self.cursor, true, INK);
        self.cursor += 6.5;
        self.rect(MARGIN, self.cursor, CONTENT_WIDTH, 0.4, PaintMode::Fill, GRID);
        self.cursor += 3.0;
    }

    fn paragraph(&mut self, text: &str) {
        for line in wrap_text(text, CONTENT_WIDTH, BODY_SIZE + 1.0) {
            self.ensure_space(LINE_HEIGHT + 0.8);
            self.text(&line, BODY_SIZE + 1.0, MARGIN, self.cursor, false, INK);
            self.cursor += LINE_HEIGHT + 0.8;
        }
    }

    fn category_table(&mut self, category: Category, items: &[&ChecklistItem]) {
        self.ensure_space(8.0 + 7.0 + LINE_HEIGHT * 2.0);
        self.cursor += 2.0;
        self.text(category.label(), 11.0, MARGIN, self.cursor, true, BANNER);
        self.cursor += 6.0;

        if items.is_empty() {
            return;
        }

        self.table_header();
        for item in items {
            self.item_row(item);
        }
        self.cursor += 2.0;
    }

    fn table_header(&mut self) {
        let height = 6.0;
        let titles = ["Instalación / Tarea", "Estado / Observación", "Foto"];
        self.rect(MARGIN, self.cursor, CONTENT_WIDTH, height, PaintMode::Fill, PANEL);
        let mut x = MARGIN;
        for (title, width) in titles.iter().zip(COLUMN_WIDTHS) {
            self.text(title, 8.0, x + CELL_PADDING, self.cursor + 1.5, true, INK);
            x += width;
        }
        self.cursor += height;
    }

    fn item_row(&mut self, item: &ChecklistItem) {
        let text_width = |column: usize| COLUMN_WIDTHS[column] - 2.0 * CELL_PADDING;

        let mut first: Vec<CellLine> = wrap_text(&item.name, text_width(0), BODY_SIZE)
            .into_iter()
            .map(|line| (line, true))
            .collect();
        first.extend(
            wrap_text(&item.task, text_width(0), BODY_SIZE)
                .into_iter()
                .map(|line| (line, false)),
        );
        let mut second = vec![(item.status.label().to_string(), true)];
        second.extend(
            wrap_text(observation_or_placeholder(item), text_width(1), BODY_SIZE)
                .into_iter()
                .map(|line| (line, false)),
        );
        let photo = PhotoCell::for_item(item);

        let line_count = first.len().max(second.len());
        let full_height = row_height(line_count, photo.height_mm());
        if full_height <= USABLE_HEIGHT {
            self.ensure_space(full_height);
        }

        // Rows taller than a page continue their cell lines on the next
        // page; the photo stays with the first segment.
        let mut photo = Some(photo);
        let mut start = 0;
        loop {
            let photo_height = photo.as_ref().map_or(0.0, PhotoCell::height_mm);
            let mut fitting = self.lines_fitting();
            if fitting == 0 || row_height(0, photo_height) > self.remaining() {
                self.new_page();
                fitting = self.lines_fitting();
            }
            let end = (start + fitting.max(1)).min(line_count);
            let segment = RowSegment {
                first: slice_lines(&first, start, end),
                second: slice_lines(&second, start, end),
                photo: photo.take(),
            };
            self.row_segment(item.status, segment);
            start = end;
            if start >= line_count {
                break;
            }
        }
    }

    fn row_segment(&mut self, status: ItemStatus, segment: RowSegment<'_>) {
        let line_count = segment.first.len().max(segment.second.len());
        let photo_height = segment.photo.as_ref().map_or(0.0, PhotoCell::height_mm);
        let height = row_height(line_count, photo_height);
        let top = self.cursor;

        if status == ItemStatus::Fail {
            self.rect(MARGIN, top, CONTENT_WIDTH, height, PaintMode::Fill, FAIL_BACKGROUND);
        }
        let mut x = MARGIN;
        for width in COLUMN_WIDTHS {
            self.rect(x, top, width, height, PaintMode::Stroke, GRID);
            x += width;
        }

        let column_x = |column: usize| {
            MARGIN + COLUMN_WIDTHS[..column].iter().sum::<f32>() + CELL_PADDING
        };
        for (index, (line, bold)) in segment.first.iter().enumerate() {
            let line_top = top + CELL_PADDING + index as f32 * LINE_HEIGHT;
            self.text(line, BODY_SIZE, column_x(0), line_top, *bold, INK);
        }
        for (index, (line, is_status)) in segment.second.iter().enumerate() {
            let line_top = top + CELL_PADDING + index as f32 * LINE_HEIGHT;
            let ink = if *is_status { status.accent_rgb() } else { INK };
            self.text(line, BODY_SIZE, column_x(1), line_top, *is_status, ink);
        }

        match segment.photo {
            Some(PhotoCell::Ready { photo, height_mm }) => {
                let bottom = top + CELL_PADDING + height_mm;
                Image::from_dynamic_image(&photo.image).add_to_layer(
                    self.layer.clone(),
                    ImageTransform {
                        translate_x: Some(Mm(column_x(2))),
                        translate_y: Some(Mm(PAGE_HEIGHT - bottom)),
                        dpi: Some(PHOTO_DPI),
                        ..Default::default()
                    },
                );
            }
            Some(PhotoCell::Missing) => {
                self.text(NO_PHOTO, 8.0, column_x(2), top + CELL_PADDING, false, MUTED)
            }
            Some(PhotoCell::Invalid) => self.text(
                INVALID_PHOTO,
                8.0,
                column_x(2),
                top + CELL_PADDING,
                false,
                ItemStatus::Fail.accent_rgb(),
            ),
            None => {}
        }

        self.cursor += height;
    }
}

type CellLine = (String, bool);

struct RowSegment<'a> {
    first: &'a [CellLine],
    second: &'a [CellLine],
    photo: Option<PhotoCell>,
}

fn row_height(line_count: usize, photo_height: f32) -> f32 {
    (line_count as f32 * LINE_HEIGHT).max(photo_height) + 2.0 * CELL_PADDING
}

fn slice_lines(lines: &[CellLine], start: usize, end: usize) -> &[CellLine] {
    let end = end.min(lines.len());
    lines.get(start..end).unwrap_or_default()
}
