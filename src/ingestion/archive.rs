//! ZIP extraction into a scoped scratch directory.

use crate::ingestion::types::{ExtractedDocument, IngestError};
use std::fs::File;
use std::path::Path;
use tempfile::TempDir;
use walkdir::WalkDir;
use zip::ZipArchive;

/// Suffix selecting which archive entries are ingested.
pub const DOCUMENT_SUFFIX: &str = ".pdf";

/// Largest total uncompressed size an archive may declare.
pub const MAX_EXTRACTED_BYTES: u64 = 1024 * 1024 * 1024;

const ARCHIVE_FILE_NAME: &str = "uploaded.zip";
const EXTRACT_DIR_NAME: &str = "extracted";

/// Extracted archive contents. The scratch directory is removed when this value is dropped.
pub struct ExtractedArchive {
    _scratch: TempDir,
    /// Documents matching [`DOCUMENT_SUFFIX`], sorted by name.
    pub documents: Vec<ExtractedDocument>,
    /// Number of regular files found in the archive, matching or not.
    pub total_files: usize,
}

/// Whether an entry name carries the ingested suffix, ignoring ASCII case.
pub fn is_document(name: &str) -> bool {
    name.to_ascii_lowercase().ends_with(DOCUMENT_SUFFIX)
}

/// Write `bytes` to a scratch directory, extract them, and select the matching documents.
///
/// This performs blocking file I/O; async callers run it on the blocking pool.
pub fn extract_documents(bytes: &[u8]) -> Result<ExtractedArchive, IngestError> {
    extract_documents_within(bytes, MAX_EXTRACTED_BYTES)
}

pub(crate) fn extract_documents_within(
    bytes: &[u8],
    limit: u64,
) -> Result<ExtractedArchive, IngestError> {
    let scratch = tempfile::tempdir()?;
    let archive_path = scratch.path().join(ARCHIVE_FILE_NAME);
    std::fs::write(&archive_path, bytes)?;

    let extract_root = scratch.path().join(EXTRACT_DIR_NAME);
    std::fs::create_dir_all(&extract_root)?;

    let mut archive = ZipArchive::new(File::open(&archive_path)?)?;
    let declared = declared_size(&mut archive)?;
    if declared > limit {
        return Err(IngestError::TooLarge { declared, limit });
    }
    archive.extract(&extract_root)?;

    let (documents, total_files) = collect_documents(&extract_root)?;
    tracing::debug!(
        archive_bytes = bytes.len(),
        total_files,
        documents = documents.len(),
        "Archive extracted"
    );

    Ok(ExtractedArchive {
        _scratch: scratch,
        documents,
        total_files,
    })
}

fn declared_size(archive: &mut ZipArchive<File>) -> Result<u64, IngestError> {
    let mut total: u64 = 0;
    for index in 0..archive.len() {
        let entry = archive.by_index(index)?;
        total = total.saturating_add(entry.size());
    }
    Ok(total)
}

fn collect_documents(root: &Path) -> Result<(Vec<ExtractedDocument>, usize), IngestError> {
    let mut documents = Vec::new();
    let mut total_files = 0;

    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        total_files += 1;

        let Ok(relative) = entry.path().strip_prefix(root) else {
            continue;
        };
        let name = relative
            .components()
            .map(|component| component.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        if is_document(&name) {
            documents.push(ExtractedDocument {
                name,
                path: entry.path().to_path_buf(),
            });
        }
    }

    documents.sort_by(|a, b| a.name.cmp(&b.name));
    Ok((documents, total_files))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io::{Cursor, Write};
    use zip::write::SimpleFileOptions;

    pub(crate) fn build_zip(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        for (name, contents) in entries {
            writer
                .start_file(*name, SimpleFileOptions::default())
                .expect("start entry");
            writer.write_all(contents).expect("write entry");
        }
        writer.finish().expect("finish zip").into_inner()
    }

    #[test]
    fn selects_pdfs_case_insensitively() {
        let bytes = build_zip(&[
            ("b.pdf", b"%PDF b"),
            ("notes.txt", b"plain"),
            ("A.PDF", b"%PDF a"),
            ("nested/c.pdf", b"%PDF c"),
            ("nested/readme.md", b"# hi"),
        ]);

        let extracted = extract_documents(&bytes).expect("extract");
        let names: Vec<_> = extracted
            .documents
            .iter()
            .map(|doc| doc.name.as_str())
            .collect();

        assert_eq!(names, vec!["A.PDF", "b.pdf", "nested/c.pdf"]);
        assert_eq!(extracted.total_files, 5);
        for doc in &extracted.documents {
            assert!(doc.path.is_file(), "{} should exist", doc.path.display());
        }
    }

    #[test]
    fn scratch_directory_is_removed_on_drop() {
        let bytes = build_zip(&[("a.pdf", b"%PDF a")]);
        let extracted = extract_documents(&bytes).expect("extract");
        let path = extracted.documents[0].path.clone();
        assert!(path.exists());

        drop(extracted);
        assert!(!path.exists());
    }

    #[test]
    fn rejects_non_zip_payloads() {
        let result = extract_documents(b"definitely not a zip");
        assert!(matches!(result, Err(IngestError::Archive(_))));
    }

    #[test]
    fn oversized_archives_are_rejected_before_extraction() {
        let bytes = build_zip(&[("a.pdf", &[b'x'; 600]), ("b.pdf", &[b'y'; 600])]);

        let result = extract_documents_within(&bytes, 1_000);
        match result {
            Err(IngestError::TooLarge { declared, limit }) => {
                assert_eq!(declared, 1_200);
                assert_eq!(limit, 1_000);
            }
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("archive over the limit was extracted"),
        }

        let extracted = extract_documents_within(&bytes, 1_200).expect("within limit");
        assert_eq!(extracted.documents.len(), 2);
    }

    #[test]
    fn suffix_match_requires_extension() {
        assert!(is_document("report.pdf"));
        assert!(is_document("REPORT.Pdf"));
        assert!(!is_document("report.pdf.txt"));
        assert!(!is_document("pdf"));
    }
}
