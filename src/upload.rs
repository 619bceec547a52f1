//! Image drop zone: click-to-browse, drag-and-drop and preview.
//!
//! The zone stages at most one file. A new selection replaces it wholesale
//! and only the first of several dropped files is kept. The staged file is
//! what the next form submission sends as `image`.

use base64::{engine::general_purpose::STANDARD, Engine};
use tracing::debug;

use crate::dom::{add_class, remove_class, set_attribute_text, Document};
use crate::error::Result;
use crate::models::StagedFile;
use crate::{DROP_ZONE_SELECTOR, FILE_INPUT_SELECTOR, PREVIEW_SELECTOR};

const HOVER_CLASS: &str = "dragover";

/// `data:` URL for an image preview.
pub fn preview_data_url(file: &StagedFile) -> String {
    format!("data:{};base64,{}", file.mime_type, STANDARD.encode(&file.bytes))
}

#[derive(Debug, Default)]
pub struct DropZone {
    staged: Option<StagedFile>,
    hovering: bool,
}

impl DropZone {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn staged(&self) -> Option<&StagedFile> {
        self.staged.as_ref()
    }

    pub fn is_hovering(&self) -> bool {
        self.hovering
    }

    /// Forget the staged file, as when the form holding it is replaced.
    pub fn reset(&mut self) {
        self.staged = None;
        self.hovering = false;
    }

    /// Drag-enter and drag-over. Returns true when the page has a drop zone,
    /// meaning the browser's default handling is suppressed so a drop can land.
    pub fn drag_over(&mut self, doc: &mut Document) -> Result<bool> {
        if !doc.exists(DROP_ZONE_SELECTOR)? {
            return Ok(false);
        }
        self.hovering = true;
        doc.rewrite(DROP_ZONE_SELECTOR, |el| add_class(el, HOVER_CLASS))?;
        Ok(true)
    }

    pub fn drag_leave(&mut self, doc: &mut Document) -> Result<()> {
        self.hovering = false;
        doc.rewrite(DROP_ZONE_SELECTOR, |el| remove_class(el, HOVER_CLASS))
    }

    /// A drop: clears the hover state and stages the first file, if any.
    pub fn drop_files(&mut self, files: Vec<StagedFile>, doc: &mut Document) -> Result<bool> {
        if !doc.exists(DROP_ZONE_SELECTOR)? {
            return Ok(false);
        }
        self.drag_leave(doc)?;
        self.select_first(files, doc)
    }

    /// The hidden file input's change event.
    pub fn file_input_changed(&mut self, files: Vec<StagedFile>, doc: &mut Document) -> Result<bool> {
        if !doc.exists(FILE_INPUT_SELECTOR)? {
            return Ok(false);
        }
        self.select_first(files, doc)
    }

    fn select_first(&mut self, files: Vec<StagedFile>, doc: &mut Document) -> Result<bool> {
        let extra = files.len().saturating_sub(1);
        let Some(file) = files.into_iter().next() else {
            return Ok(false);
        };
        if extra > 0 {
            debug!(ignored = extra, "Only the first file is used");
        }
        self.select_file(file, doc)?;
        Ok(true)
    }

    /// Stage `file` and show its preview.
    pub fn select_file(&mut self, file: StagedFile, doc: &mut Document) -> Result<()> {
        let src = preview_data_url(&file);
        doc.rewrite(PREVIEW_SELECTOR, |el| {
            el.set_attribute("src", &src)?;
            el.set_attribute("style", "display: block")?;
            Ok(())
        })?;
        doc.rewrite(FILE_INPUT_SELECTOR, |el| {
            set_attribute_text(el, "data-file-name", &file.name)
        })?;
        debug!(name = %file.name, bytes = file.bytes.len(), "Staged image");
        self.staged = Some(file);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::results_page;

    fn png(name: &str) -> StagedFile {
        StagedFile::new(name, vec![0x89, b'P', b'N', b'G'])
    }

    #[test]
    fn test_preview_data_url() {
        let file = StagedFile::new("a.png", b"hi".to_vec());
        assert_eq!(preview_data_url(&file), "data:image/png;base64,aGk=");
    }

    #[test]
    fn test_drag_over_and_leave_toggle_hover() {
        let mut doc = Document::new(results_page(&[]));
        let mut zone = DropZone::new();

        assert!(zone.drag_over(&mut doc).unwrap());
        assert!(zone.is_hovering());
        assert!(doc.select(DROP_ZONE_SELECTOR).unwrap()[0].has_class("dragover"));

        zone.drag_leave(&mut doc).unwrap();
        assert!(!zone.is_hovering());
        assert!(!doc.select(DROP_ZONE_SELECTOR).unwrap()[0].has_class("dragover"));
    }

    #[test]
    fn test_drop_keeps_first_file_only() {
        let mut doc = Document::new(results_page(&[]));
        let mut zone = DropZone::new();
        zone.drag_over(&mut doc).unwrap();

        let staged = zone
            .drop_files(vec![png("first.png"), png("second.png")], &mut doc)
            .unwrap();
        assert!(staged);
        assert_eq!(zone.staged().unwrap().name, "first.png");
        assert!(!zone.is_hovering());

        let preview = &doc.select(PREVIEW_SELECTOR).unwrap()[0];
        assert!(preview.attr("src").unwrap().starts_with("data:image/png;base64,"));
        assert_eq!(preview.attr("style"), Some("display: block"));
        let input = &doc.select(FILE_INPUT_SELECTOR).unwrap()[0];
        assert_eq!(input.attr("data-file-name"), Some("first.png"));
    }

    #[test]
    fn test_new_selection_replaces_staged_file() {
        let mut doc = Document::new(results_page(&[]));
        let mut zone = DropZone::new();
        zone.file_input_changed(vec![png("one.png")], &mut doc).unwrap();
        zone.file_input_changed(vec![png("two.png")], &mut doc).unwrap();
        assert_eq!(zone.staged().unwrap().name, "two.png");
    }

    #[test]
    fn test_file_name_with_entity_text_is_kept() {
        let mut doc = Document::new(results_page(&[]));
        let mut zone = DropZone::new();
        zone.file_input_changed(vec![png("R&amp;D \"notes\".png")], &mut doc)
            .unwrap();
        let input = &doc.select(FILE_INPUT_SELECTOR).unwrap()[0];
        assert_eq!(input.attr("data-file-name"), Some("R&amp;D \"notes\".png"));
    }

    #[test]
    fn test_empty_drop_is_ignored() {
        let mut doc = Document::new(results_page(&[]));
        let mut zone = DropZone::new();
        assert!(!zone.drop_files(Vec::new(), &mut doc).unwrap());
        assert!(zone.staged().is_none());
    }

    #[test]
    fn test_missing_drop_zone_is_a_no_op() {
        let mut doc = Document::new("<main>no form here</main>");
        let mut zone = DropZone::new();
        assert!(!zone.drag_over(&mut doc).unwrap());
        assert!(!zone.drop_files(vec![png("a.png")], &mut doc).unwrap());
        assert!(!zone.file_input_changed(vec![png("a.png")], &mut doc).unwrap());
        assert!(zone.staged().is_none());
        assert_eq!(doc.html(), "<main>no form here</main>");
    }
}
