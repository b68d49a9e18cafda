//! File Upload Aggregate
//!
//! Ordered list of selected files with an admission policy. Each tracked file
//! holds a preview reference that is released the moment the file leaves the
//! list, whether by removal, clearing or dropping the tracker.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

use crate::domain::events::{DomainEvent, UploadEvent};
use crate::domain::services::html::{escape_attr, escape_html};
use crate::domain::value_objects::{
    file_icon, format_file_size, ComponentKind, ComponentRef, FileCandidate, FileHandle, FileId,
    FileMeta, InstanceId, PreviewRef, BYTES_PER_MB,
};
use crate::ports::outbound::PreviewUrlAllocator;

/// Admission limits
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadPolicy {
    pub max_files: usize,
    /// Maximum size of one file in bytes
    pub max_file_size: u64,
    pub allowed_types: Vec<String>,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self {
            max_files: 5,
            max_file_size: 10 * BYTES_PER_MB,
            allowed_types: vec![
                "image/jpeg".into(),
                "image/png".into(),
                "image/gif".into(),
                "image/webp".into(),
                "application/pdf".into(),
                "text/plain".into(),
                "application/msword".into(),
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document".into(),
            ],
        }
    }
}

impl UploadPolicy {
    /// Size limit in whole megabytes, rounded
    pub fn max_file_size_mb(&self) -> u64 {
        (self.max_file_size + BYTES_PER_MB / 2) / BYTES_PER_MB
    }

    pub fn allows_type(&self, mime_type: &str) -> bool {
        self.allowed_types.iter().any(|t| t == mime_type)
    }
}

/// A tracked file
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileRecord {
    id: FileId,
    meta: FileMeta,
    handle: FileHandle,
    preview: PreviewRef,
}

impl FileRecord {
    pub fn id(&self) -> &FileId { &self.id }
    pub fn meta(&self) -> &FileMeta { &self.meta }
    pub fn name(&self) -> &str { &self.meta.name }
    pub fn size(&self) -> u64 { self.meta.size }
    pub fn mime_type(&self) -> &str { &self.meta.mime_type }
    pub fn handle(&self) -> &FileHandle { &self.handle }
    pub fn preview(&self) -> &PreviewRef { &self.preview }

    pub fn formatted_size(&self) -> String {
        format_file_size(self.meta.size)
    }

    pub fn icon(&self) -> &'static str {
        file_icon(&self.meta.mime_type)
    }
}

/// Why a candidate was not admitted
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RejectionReason {
    TooManyFiles { max: usize },
    TypeNotAllowed,
    TooLarge { max_mb: u64 },
    Duplicate,
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooManyFiles { max } => write!(f, "Maximum {} files allowed", max),
            Self::TypeNotAllowed => write!(f, "File type not allowed"),
            Self::TooLarge { max_mb } => write!(f, "File size exceeds {}MB limit", max_mb),
            Self::Duplicate => write!(f, "File already added"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Rejection {
    pub file: FileMeta,
    pub reason: RejectionReason,
}

/// Outcome of one batch
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AdmissionReport {
    pub accepted: Vec<FileId>,
    pub rejected: Vec<Rejection>,
}

impl AdmissionReport {
    pub fn is_complete(&self) -> bool {
        self.rejected.is_empty()
    }

    /// Batch notification text, `None` when nothing was rejected
    pub fn notification(&self) -> Option<String> {
        if self.rejected.is_empty() {
            return None;
        }
        let lines: Vec<String> = self
            .rejected
            .iter()
            .map(|r| format!("{}: {}", r.file.name, r.reason))
            .collect();
        Some(format!("Some files were not added:\n{}", lines.join("\n")))
    }
}

/// File upload tracker aggregate
pub struct FileUploadTracker {
    instance: InstanceId,
    policy: UploadPolicy,
    files: Vec<FileRecord>,
    previews: Arc<dyn PreviewUrlAllocator>,
    drag_depth: u32,
    events: Vec<DomainEvent>,
}

impl FileUploadTracker {
    pub fn new(policy: UploadPolicy, previews: Arc<dyn PreviewUrlAllocator>) -> Self {
        Self {
            instance: InstanceId::new(),
            policy,
            files: Vec::new(),
            previews,
            drag_depth: 0,
            events: Vec::new(),
        }
    }

    pub fn component(&self) -> ComponentRef {
        ComponentRef::new(ComponentKind::Uploader, self.instance)
    }

    // =========================================================================
    // Commands
    // =========================================================================

    /// Run the admission policy over a batch, in order. Accepted files are
    /// appended; each rejected file gets one reason.
    pub fn add_files(&mut self, candidates: Vec<FileCandidate>) -> AdmissionReport {
        let mut report = AdmissionReport::default();
        let mut added = Vec::new();

        for candidate in candidates {
            if let Some(reason) = self.admission_check(&candidate) {
                debug!(file = %candidate.name, reason = %reason, "File rejected");
                report.rejected.push(Rejection { file: candidate.meta(), reason });
                continue;
            }

            let meta = candidate.meta();
            let record = FileRecord {
                id: FileId::new(),
                preview: self.previews.allocate(&meta),
                meta: meta.clone(),
                handle: candidate.handle,
            };
            report.accepted.push(record.id.clone());
            added.push(meta);
            self.files.push(record);
        }

        if !added.is_empty() {
            self.raise_event(DomainEvent::Upload(UploadEvent::FilesAdded { files: added }));
        }
        report
    }

    /// Remove one file and release its preview. Unknown ids are ignored.
    pub fn remove_file(&mut self, id: &FileId) -> Option<FileMeta> {
        let index = self.files.iter().position(|f| &f.id == id)?;
        let record = self.files.remove(index);
        self.previews.release(&record.preview);

        self.raise_event(DomainEvent::Upload(UploadEvent::FileRemoved {
            id: record.id,
            file: record.meta.clone(),
        }));
        Some(record.meta)
    }

    /// Remove every file, releasing all previews
    pub fn clear(&mut self) {
        if self.files.is_empty() {
            return;
        }
        let count = self.files.len();
        self.release_all();
        self.raise_event(DomainEvent::Upload(UploadEvent::FilesCleared { count }));
    }

    pub fn drag_enter(&mut self) {
        self.drag_depth += 1;
    }

    pub fn drag_leave(&mut self) {
        self.drag_depth = self.drag_depth.saturating_sub(1);
    }

    /// Drop ends any drag in progress and admits the dropped files
    pub fn drop_files(&mut self, candidates: Vec<FileCandidate>) -> AdmissionReport {
        self.drag_depth = 0;
        self.add_files(candidates)
    }

    pub fn set_max_files(&mut self, max: usize) {
        self.policy.max_files = max;
    }

    pub fn set_max_file_size(&mut self, bytes: u64) {
        self.policy.max_file_size = bytes;
    }

    pub fn set_allowed_types(&mut self, types: Vec<String>) {
        self.policy.allowed_types = types;
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn files(&self) -> &[FileRecord] { &self.files }
    pub fn len(&self) -> usize { self.files.len() }
    pub fn is_empty(&self) -> bool { self.files.is_empty() }
    pub fn policy(&self) -> &UploadPolicy { &self.policy }

    /// Whether the drop zone shows its drag-over highlight
    pub fn is_highlighted(&self) -> bool {
        self.drag_depth > 0
    }

    pub fn metas(&self) -> Vec<FileMeta> {
        self.files.iter().map(|f| f.meta.clone()).collect()
    }

    /// File list markup; user-supplied names are escaped
    pub fn render_file_list(&self) -> String {
        if self.files.is_empty() {
            return r#"<p class="no-files">No files selected</p>"#.to_string();
        }

        self.files
            .iter()
            .map(|f| {
                format!(
                    concat!(
                        r#"<div class="file-item">"#,
                        r#"<div class="file-info">"#,
                        r#"<i class="fas fa-{icon}" aria-hidden="true"></i>"#,
                        r#"<div class="file-details">"#,
                        r#"<div class="file-name">{name}</div>"#,
                        r#"<div class="file-size">{size}</div>"#,
                        r#"</div></div>"#,
                        r#"<button type="button" class="file-remove" data-file-id="{id}" aria-label="Remove {label}">✕</button>"#,
                        r#"</div>"#
                    ),
                    icon = f.icon(),
                    name = escape_html(f.name()),
                    size = f.formatted_size(),
                    id = f.id,
                    label = escape_attr(f.name()),
                )
            })
            .collect()
    }

    /// Take raised events (for publishing)
    pub fn take_events(&mut self) -> Vec<DomainEvent> {
        std::mem::take(&mut self.events)
    }

    // =========================================================================
    // Private
    // =========================================================================

    fn admission_check(&self, candidate: &FileCandidate) -> Option<RejectionReason> {
        if self.files.len() >= self.policy.max_files {
            return Some(RejectionReason::TooManyFiles { max: self.policy.max_files });
        }
        if !self.policy.allows_type(&candidate.mime_type) {
            return Some(RejectionReason::TypeNotAllowed);
        }
        if candidate.size > self.policy.max_file_size {
            return Some(RejectionReason::TooLarge { max_mb: self.policy.max_file_size_mb() });
        }
        let duplicate = self
            .files
            .iter()
            .any(|f| f.meta.name == candidate.name && f.meta.size == candidate.size);
        if duplicate {
            return Some(RejectionReason::Duplicate);
        }
        None
    }

    fn release_all(&mut self) {
        for record in self.files.drain(..) {
            self.previews.release(&record.preview);
        }
    }

    fn raise_event(&mut self, event: DomainEvent) {
        self.events.push(event);
    }
}

impl Drop for FileUploadTracker {
    fn drop(&mut self) {
        self.release_all();
    }
}

impl fmt::Debug for FileUploadTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileUploadTracker")
            .field("instance", &self.instance)
            .field("policy", &self.policy)
            .field("files", &self.files)
            .field("drag_depth", &self.drag_depth)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::preview_urls::ObjectUrlRegistry;
    use proptest::prelude::*;

    fn tracker() -> (FileUploadTracker, Arc<ObjectUrlRegistry>) {
        let registry = Arc::new(ObjectUrlRegistry::new());
        (FileUploadTracker::new(UploadPolicy::default(), registry.clone()), registry)
    }

    fn pdf(name: &str, mb: u64) -> FileCandidate {
        FileCandidate::new(name, mb * BYTES_PER_MB, "application/pdf")
    }

    #[test]
    fn test_partial_batch() {
        let (mut tracker, _) = tracker();
        let report = tracker.add_files(vec![
            pdf("report.pdf", 2),
            FileCandidate::new("photo.png", 15 * BYTES_PER_MB, "image/png"),
        ]);

        assert_eq!(report.accepted.len(), 1);
        assert_eq!(tracker.len(), 1);
        assert_eq!(tracker.files()[0].name(), "report.pdf");
        assert_eq!(report.rejected[0].reason, RejectionReason::TooLarge { max_mb: 10 });
        assert_eq!(
            report.notification().unwrap(),
            "Some files were not added:\nphoto.png: File size exceeds 10MB limit"
        );
    }

    #[test]
    fn test_rejection_order_and_messages() {
        let (mut tracker, _) = tracker();
        tracker.set_max_files(1);
        let report = tracker.add_files(vec![
            FileCandidate::new("run.exe", 10, "application/x-msdownload"),
            pdf("a.pdf", 1),
            pdf("b.pdf", 1),
        ]);
        let reasons: Vec<String> = report.rejected.iter().map(|r| r.reason.to_string()).collect();
        assert_eq!(reasons, vec!["File type not allowed", "Maximum 1 files allowed"]);
    }

    #[test]
    fn test_duplicate_within_batch() {
        let (mut tracker, _) = tracker();
        let report = tracker.add_files(vec![pdf("a.pdf", 1), pdf("a.pdf", 1)]);
        assert_eq!(tracker.len(), 1);
        assert_eq!(report.rejected[0].reason, RejectionReason::Duplicate);
        assert_eq!(report.rejected[0].reason.to_string(), "File already added");
    }

    #[test]
    fn test_same_name_different_size_is_distinct() {
        let (mut tracker, _) = tracker();
        tracker.add_files(vec![pdf("a.pdf", 1), pdf("a.pdf", 2)]);
        assert_eq!(tracker.len(), 2);
    }

    #[test]
    fn test_remove_releases_preview() {
        let (mut tracker, registry) = tracker();
        let report = tracker.add_files(vec![pdf("a.pdf", 1), pdf("b.pdf", 1)]);
        assert_eq!(registry.live_count(), 2);

        let removed = tracker.remove_file(&report.accepted[0]).unwrap();
        assert_eq!(removed.name, "a.pdf");
        assert_eq!(registry.live_count(), 1);
        assert!(tracker.remove_file(&report.accepted[0]).is_none());

        tracker.clear();
        assert_eq!(registry.live_count(), 0);
        assert!(tracker.is_empty());
    }

    #[test]
    fn test_drop_releases_previews() {
        let (mut tracker, registry) = tracker();
        tracker.add_files(vec![pdf("a.pdf", 1)]);
        drop(tracker);
        assert_eq!(registry.live_count(), 0);
    }

    #[test]
    fn test_events() {
        let (mut tracker, _) = tracker();
        let report = tracker.add_files(vec![pdf("a.pdf", 1)]);
        tracker.remove_file(&report.accepted[0]);
        tracker.clear();

        let names: Vec<&str> = tracker.take_events().iter().map(|e| e.name()).collect();
        assert_eq!(names, vec!["files:added", "file:removed"]);
        assert!(tracker.take_events().is_empty());
    }

    #[test]
    fn test_drag_depth() {
        let (mut tracker, _) = tracker();
        tracker.drag_enter();
        tracker.drag_enter();
        tracker.drag_leave();
        assert!(tracker.is_highlighted());
        tracker.drag_leave();
        assert!(!tracker.is_highlighted());

        tracker.drag_enter();
        tracker.drop_files(vec![pdf("a.pdf", 1)]);
        assert!(!tracker.is_highlighted());
        assert_eq!(tracker.len(), 1);
    }

    #[test]
    fn test_render_file_list_escapes_names() {
        let (mut tracker, _) = tracker();
        assert_eq!(tracker.render_file_list(), r#"<p class="no-files">No files selected</p>"#);

        tracker.add_files(vec![FileCandidate::new("<img src=x>.png", 1536, "image/png")]);
        let html = tracker.render_file_list();
        assert!(html.contains("&lt;img src=x&gt;.png"));
        assert!(!html.contains("<img"));
        assert!(html.contains("1.5 KB"));
        assert!(html.contains("fa-image"));
    }

    proptest! {
        #[test]
        fn prop_duplicates_always_rejected(
            sizes in proptest::collection::vec(1u64..1000, 1..5),
            dup_index in 0usize..5,
        ) {
            let (mut tracker, _) = tracker();
            let batch: Vec<FileCandidate> = sizes
                .iter()
                .enumerate()
                .map(|(i, size)| FileCandidate::new(format!("f{}.txt", i), *size, "text/plain"))
                .collect();
            tracker.add_files(batch.clone());
            let original = batch[dup_index % batch.len()].clone();

            let report = tracker.add_files(vec![original]);
            prop_assert!(report.accepted.is_empty());
            prop_assert_eq!(tracker.len(), sizes.len());
        }

        #[test]
        fn prop_bad_files_never_block_good_ones(
            good in 0usize..4,
            bad in 0usize..4,
        ) {
            let (mut tracker, _) = tracker();
            let mut batch = Vec::new();
            for i in 0..good.max(bad) {
                if i < good {
                    batch.push(FileCandidate::new(format!("ok{}.pdf", i), 10, "application/pdf"));
                }
                if i < bad {
                    batch.push(FileCandidate::new(format!("bad{}.exe", i), 10, "application/x-msdownload"));
                }
            }
            let report = tracker.add_files(batch);
            prop_assert_eq!(report.accepted.len(), good);
            prop_assert_eq!(report.rejected.len(), bad);
        }
    }
}
