//! Report composer: one snapshot of a session rendered as plain text, PDF and
//! DOCX. Renderers read only the snapshot and never touch the stores.

mod docx;
mod layout;
mod pdf;
mod photo;
mod snapshot;
mod text;
pub mod views;

pub use docx::render_docx;
pub use layout::{
    ReportBlock, ReportDocument, CHECKLIST_SECTION, INCIDENCES_SECTION, INVALID_PHOTO,
    NO_INCIDENCES, NO_PHOTO, NO_REQUIREMENTS, NO_UPDATES, REPORT_TITLE, REQUIREMENTS_SECTION,
};
pub use pdf::render_pdf;
pub use snapshot::{ReportFields, ReportSnapshot};
pub use text::render_text;
pub use views::ReportView;

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("failed to render PDF report: {0}")]
    Pdf(String),
    #[error("failed to render DOCX report: {0}")]
    Docx(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportFormat {
    Text,
    Pdf,
    Docx,
}

impl ReportFormat {
    pub const fn ordered() -> [Self; 3] {
        [Self::Text, Self::Pdf, Self::Docx]
    }

    pub const fn extension(self) -> &'static str {
        match self {
            Self::Text => "txt",
            Self::Pdf => "pdf",
            Self::Docx => "docx",
        }
    }

    pub const fn content_type(self) -> &'static str {
        match self {
            Self::Text => "text/plain; charset=utf-8",
            Self::Pdf => "application/pdf",
            Self::Docx => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "text" | "txt" => Some(Self::Text),
            "pdf" => Some(Self::Pdf),
            "docx" => Some(Self::Docx),
            _ => None,
        }
    }

    pub fn render(self, snapshot: &ReportSnapshot) -> Result<Vec<u8>, ReportError> {
        let document = ReportDocument::from_snapshot(snapshot);
        match self {
            Self::Text => Ok(render_text(&document).into_bytes()),
            Self::Pdf => render_pdf(&document),
            Self::Docx => render_docx(&document),
        }
    }

    pub fn file_name(self, snapshot: &ReportSnapshot) -> String {
        format!("{}.{}", snapshot.file_stem(), self.extension())
    }
}

/// Every export of one snapshot.
#[derive(Debug, Clone)]
pub struct ReportArtifacts {
    pub file_stem: String,
    pub text: String,
    pub pdf: Vec<u8>,
    pub docx: Vec<u8>,
}

impl ReportArtifacts {
    pub fn render(snapshot: &ReportSnapshot) -> Result<Self, ReportError> {
        let document = ReportDocument::from_snapshot(snapshot);
        let artifacts = Self {
            file_stem: snapshot.file_stem(),
            text: render_text(&document),
            pdf: render_pdf(&document)?,
            docx: render_docx(&document)?,
        };
        tracing::info!(
            file_stem = %artifacts.file_stem,
            pdf_bytes = artifacts.pdf.len(),
            docx_bytes = artifacts.docx.len(),
            "report rendered"
        );
        Ok(artifacts)
    }

    /// `(file name, contents)` pairs in text, PDF, DOCX order.
    pub fn files(&self) -> [(String, &[u8]); 3] {
        [
            (self.file_name(ReportFormat::Text), self.text.as_bytes()),
            (self.file_name(ReportFormat::Pdf), self.pdf.as_slice()),
            (self.file_name(ReportFormat::Docx), self.docx.as_slice()),
        ]
    }

    fn file_name(&self, format: ReportFormat) -> String {
        format!("{}.{}", self.file_stem, format.extension())
    }
}
