//! File upload: browse, drag-and-drop, PDF validation and preview.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::context::{AppContext, Effect};
use crate::dom::ElementId;
use crate::error::Result;

pub const PDF_MIME: &str = "application/pdf";
pub const PDF_ONLY_MESSAGE: &str = "Please select a PDF file only.";

const SIZE_UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

/// Where a selected file's bytes live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileData {
    Path(PathBuf),
    Memory(Vec<u8>),
}

/// A file handed to the page, by the picker or by a drop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRef {
    pub name: String,
    pub size: u64,
    /// MIME type as reported by the host; may be empty.
    pub mime: String,
    pub data: FileData,
}

impl FileRef {
    /// Describe a file on disk, guessing its MIME type from the extension.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let size = std::fs::metadata(path)?.len();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mime = mime_guess::from_path(path)
            .first()
            .map(|m| m.essence_str().to_string())
            .unwrap_or_default();
        Ok(Self {
            name,
            size,
            mime,
            data: FileData::Path(path.to_path_buf()),
        })
    }

    pub fn in_memory(name: &str, mime: &str, bytes: Vec<u8>) -> Self {
        Self {
            name: name.to_string(),
            size: bytes.len() as u64,
            mime: mime.to_string(),
            data: FileData::Memory(bytes),
        }
    }

    /// PDF by MIME type or by a `.pdf` name, case-insensitively.
    pub fn is_pdf(&self) -> bool {
        self.mime == PDF_MIME || self.name.to_lowercase().ends_with(".pdf")
    }

    pub async fn read_bytes(&self) -> Result<Vec<u8>> {
        match &self.data {
            FileData::Path(path) => Ok(tokio::fs::read(path).await?),
            FileData::Memory(bytes) => Ok(bytes.clone()),
        }
    }
}

/// Human-readable size in binary units, two decimals with trailing zeros
/// trimmed: `1536` becomes `1.5 KB`.
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }
    let mut unit = 0;
    let mut scaled = bytes as f64;
    while scaled >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        scaled /= 1024.0;
        unit += 1;
    }
    let fixed = format!("{:.2}", scaled);
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    format!("{} {}", trimmed, SIZE_UNITS[unit])
}

/// Tracks the single selected file and drives the dropzone and preview.
#[derive(Debug, Default)]
pub struct UploadController {
    selected: Option<FileRef>,
}

impl UploadController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected(&self) -> Option<&FileRef> {
        self.selected.as_ref()
    }

    pub fn has_file(&self) -> bool {
        self.selected.is_some()
    }

    /// Click on the dropzone: ask the host for the native picker.
    pub fn browse(&self, ctx: &mut AppContext) {
        if ctx.dom.contains(ElementId::UploadZone) && ctx.dom.contains(ElementId::FileInput) {
            ctx.emit(Effect::OpenFilePicker);
        }
    }

    /// A file chosen through the file input.
    pub fn choose(&mut self, ctx: &mut AppContext, file: FileRef) {
        ctx.dom
            .update(ElementId::FileInput, |input| input.set_files(vec![file.clone()]));
        self.accept(ctx, file);
    }

    /// Files dropped on the dropzone; only the first is used.
    pub fn drop_files(&mut self, ctx: &mut AppContext, files: Vec<FileRef>) {
        ctx.dom
            .update(ElementId::UploadZone, |zone| zone.remove_class("dragover"));
        let Some(file) = files.into_iter().next() else {
            return;
        };

        if ctx.dom.contains(ElementId::FileInput) {
            if ctx.capabilities.file_list_assignment {
                ctx.dom
                    .update(ElementId::FileInput, |input| input.set_files(vec![file.clone()]));
            } else {
                warn!(
                    "Could not assign {} to the file input programmatically",
                    file.name
                );
            }
        }
        self.accept(ctx, file);
    }

    pub fn drag_over(&self, ctx: &mut AppContext) {
        ctx.dom
            .update(ElementId::UploadZone, |zone| zone.add_class("dragover"));
    }

    pub fn drag_leave(&self, ctx: &mut AppContext) {
        ctx.dom
            .update(ElementId::UploadZone, |zone| zone.remove_class("dragover"));
    }

    fn accept(&mut self, ctx: &mut AppContext, file: FileRef) {
        if file.is_pdf() {
            debug!("Selected {} ({} bytes)", file.name, file.size);
            ctx.dom.update(ElementId::TextInput, |t| t.set_value(""));
            self.show_preview(ctx, &file);
            self.selected = Some(file);
        } else {
            ctx.alert(PDF_ONLY_MESSAGE);
        }
        ctx.refresh_submit_button(self.has_file());
    }

    fn show_preview(&self, ctx: &mut AppContext, file: &FileRef) {
        let complete = [ElementId::FilePreview, ElementId::FileName, ElementId::FileSize]
            .iter()
            .all(|id| ctx.dom.contains(*id));
        if !complete {
            return;
        }
        let name = if file.name.is_empty() {
            "Selected file".to_string()
        } else {
            file.name.clone()
        };
        ctx.dom.update(ElementId::FileName, |el| el.set_content(name));
        ctx.dom
            .update(ElementId::FileSize, |el| el.set_content(format_file_size(file.size)));
        ctx.dom
            .update(ElementId::FilePreview, |el| el.add_class("show"));
        ctx.dom
            .update(ElementId::UploadZone, |zone| zone.set_style("display", "none"));
    }

    /// Drop the selection and restore the dropzone.
    pub fn remove(&mut self, ctx: &mut AppContext) {
        ctx.dom
            .update(ElementId::FilePreview, |el| el.remove_class("show"));
        ctx.dom
            .update(ElementId::UploadZone, |zone| zone.set_style("display", "block"));
        ctx.dom.update(ElementId::FileInput, |input| input.clear_files());
        self.selected = None;
        ctx.refresh_submit_button(false);
    }

    /// Forget the selection without touching the dropzone (form reset).
    pub fn clear(&mut self, ctx: &mut AppContext) {
        ctx.dom.update(ElementId::FileInput, |input| input.clear_files());
        self.selected = None;
    }
}
