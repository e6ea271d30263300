use super::layout::{observation_or_placeholder, ReportDocument, INVALID_PHOTO};
use super::photo::PreparedPhoto;
use super::text::render_text;
use super::ReportError;
use crate::workflows::checklist::ChecklistItem;
use docx_rs::{BreakType, Docx, Paragraph, Pic, Run};
use std::io::Cursor;
use tracing::warn;

pub(crate) const ANNEX_TITLE: &str = "ANEXO FOTOGRÁFICO";

// 12 cm at 96 DPI.
const MAX_PHOTO_WIDTH_PX: u32 = 453;
const MAX_PHOTO_HEIGHT_PX: u32 = 680;
const EMU_PER_PX: u32 = 9525;

/// Text report as paragraphs, followed by a photo annex when any item has a photo.
pub fn render_docx(document: &ReportDocument<'_>) -> Result<Vec<u8>, ReportError> {
    let mut docx = Docx::new();
    for line in render_text(document).lines() {
        docx = docx.add_paragraph(Paragraph::new().add_run(Run::new().add_text(line)));
    }

    let photo_items = document.photo_items();
    if !photo_items.is_empty() {
        docx = docx
            .add_paragraph(Paragraph::new().add_run(Run::new().add_break(BreakType::Page)))
            .add_paragraph(Paragraph::new().add_run(Run::new().add_text(ANNEX_TITLE).bold()));
        for item in photo_items {
            docx = annex_entry(docx, item)?;
        }
    }

    let mut buffer = Cursor::new(Vec::new());
    docx.build()
        .pack(&mut buffer)
        .map_err(|err| ReportError::Docx(err.to_string()))?;
    Ok(buffer.into_inner())
}

fn annex_entry(docx: Docx, item: &ChecklistItem) -> Result<Docx, ReportError> {
    let heading = format!("#{} [{}] {}", item.id, item.category.label(), item.name);
    let detail = format!(
        "Estado: {} | Observación: {}",
        item.status.label(),
        observation_or_placeholder(item)
    );
    let docx = docx
        .add_paragraph(Paragraph::new().add_run(Run::new().add_text(heading).bold()))
        .add_paragraph(Paragraph::new().add_run(Run::new().add_text(detail)));

    let Some(bytes) = item.photo.as_deref() else {
        return Ok(docx);
    };
    let photo = match PreparedPhoto::fit(bytes, MAX_PHOTO_WIDTH_PX, MAX_PHOTO_HEIGHT_PX) {
        Ok(photo) => photo,
        Err(err) => {
            warn!(item = item.id, error = %err, "photo could not be decoded; skipping in annex");
            return Ok(docx.add_paragraph(
                Paragraph::new().add_run(Run::new().add_text(INVALID_PHOTO)),
            ));
        }
    };

    let png = photo
        .to_png()
        .map_err(|err| ReportError::Docx(err.to_string()))?;
    let pic = Pic::new(&png).size(photo.width() * EMU_PER_PX, photo.height() * EMU_PER_PX);
    Ok(docx.add_paragraph(Paragraph::new().add_run(Run::new().add_image(pic))))
}
