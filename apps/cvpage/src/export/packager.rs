//! Export packager: page snapshot + stylesheet + script + images → `cv.zip`.
//!
//! Every fetch is best-effort. A missing stylesheet, script or image is logged
//! once and left out; the archive is still produced with what succeeded.

use std::collections::HashSet;
use std::io::{Cursor, Write};

use bytes::Bytes;
use thiserror::Error;
use tracing::{info, warn};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::export::assets::AssetSource;
use crate::page::PageSnapshot;

pub const ARCHIVE_NAME: &str = "cv.zip";
pub const PAGE_ENTRY: &str = "index.html";
pub const STYLESHEET: &str = "style.css";
pub const SCRIPT: &str = "script.js";
pub const IMAGE_DIR: &str = "photos";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to write archive: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("failed to write archive: {0}")]
    Io(#[from] std::io::Error),
}

/// An item that could not be fetched and was left out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Omission {
    pub source: String,
    #[allow(dead_code)]
    pub reason: String,
}

#[derive(Debug)]
pub struct ExportArchive {
    pub bytes: Vec<u8>,
    /// Archive entry names in write order.
    pub included: Vec<String>,
    pub omitted: Vec<Omission>,
}

/// Assembles the archive for a page snapshot.
pub async fn build_archive(
    markup: &str,
    assets: &dyn AssetSource,
) -> Result<ExportArchive, ExportError> {
    let image_sources = exportable_images(markup);

    let mut files: Vec<(String, Bytes)> =
        vec![(PAGE_ENTRY.to_string(), Bytes::copy_from_slice(markup.as_bytes()))];
    let mut omitted = Vec::new();

    for path in [STYLESHEET, SCRIPT] {
        match assets.fetch(path).await {
            Ok(data) => files.push((path.to_string(), data)),
            Err(e) => {
                warn!("Omitting {path} from export: {e}");
                omitted.push(Omission {
                    source: path.to_string(),
                    reason: e.to_string(),
                });
            }
        }
    }

    let mut seen = HashSet::new();
    for src in image_sources {
        let entry = format!("{IMAGE_DIR}/{}", image_file_name(&src));
        if !seen.insert(entry.clone()) {
            continue;
        }
        match assets.fetch(&src).await {
            Ok(data) => files.push((entry, data)),
            Err(e) => {
                warn!("Omitting image {src} from export: {e}");
                omitted.push(Omission {
                    source: src,
                    reason: e.to_string(),
                });
            }
        }
    }

    let bytes = write_zip(&files)?;
    info!(
        "Built {ARCHIVE_NAME}: {} entries, {} omitted, {} bytes",
        files.len(),
        omitted.len(),
        bytes.len()
    );

    Ok(ExportArchive {
        bytes,
        included: files.into_iter().map(|(name, _)| name).collect(),
        omitted,
    })
}

/// Image sources worth fetching; in-memory `blob:` and inline `data:` URLs are skipped.
fn exportable_images(markup: &str) -> Vec<String> {
    PageSnapshot::parse(markup)
        .image_sources()
        .into_iter()
        .filter(|src| !src.is_empty() && !src.starts_with("blob:") && !src.starts_with("data:"))
        .collect()
}

fn image_file_name(src: &str) -> &str {
    let path = src.split(&['?', '#'][..]).next().unwrap_or(src);
    match path.rsplit('/').next() {
        Some(name) if !name.is_empty() => name,
        _ => "unnamed_image",
    }
}

fn write_zip(files: &[(String, Bytes)]) -> Result<Vec<u8>, ExportError> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);
    for (name, data) in files {
        zip.start_file(name.as_str(), options)?;
        zip.write_all(data)?;
    }
    Ok(zip.finish()?.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::assets::{DirAssetSource, HttpAssetSource};
    use crate::page::PageView;
    use crate::storage::loader::embedded_profile;
    use std::io::Read;
    use zip::ZipArchive;

    const PAGE: &str = r#"<!DOCTYPE html><html><body>
        <img src="photos/a.png"><img src="photos/b.png"><img src="photos/missing.png">
        <img src="blob:http://localhost/1234"><img src="photos/a.png">
        </body></html>"#;

    fn asset_dir(with_css: bool) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("photos")).unwrap();
        std::fs::write(dir.path().join("photos/a.png"), b"aaa").unwrap();
        std::fs::write(dir.path().join("photos/b.png"), b"bbb").unwrap();
        std::fs::write(dir.path().join("script.js"), "console.log('cv');").unwrap();
        if with_css {
            std::fs::write(dir.path().join("style.css"), "body{}").unwrap();
        }
        dir
    }

    fn names(bytes: &[u8]) -> Vec<String> {
        let archive = ZipArchive::new(Cursor::new(bytes.to_vec())).unwrap();
        let mut names: Vec<String> = archive.file_names().map(str::to_string).collect();
        names.sort();
        names
    }

    #[tokio::test]
    async fn test_archive_skips_unresolvable_image() {
        let dir = asset_dir(true);
        let source = DirAssetSource::new(dir.path());
        let archive = build_archive(PAGE, &source).await.unwrap();

        assert_eq!(
            names(&archive.bytes),
            vec!["index.html", "photos/a.png", "photos/b.png", "script.js", "style.css"]
        );
        assert_eq!(archive.omitted.len(), 1);
        assert_eq!(archive.omitted[0].source, "photos/missing.png");
    }

    #[tokio::test]
    async fn test_archive_contains_snapshot_and_image_bytes() {
        let dir = asset_dir(true);
        let source = DirAssetSource::new(dir.path());
        let archive = build_archive(PAGE, &source).await.unwrap();

        let mut zip = ZipArchive::new(Cursor::new(archive.bytes)).unwrap();
        let mut html = String::new();
        zip.by_name("index.html").unwrap().read_to_string(&mut html).unwrap();
        assert_eq!(html, PAGE);

        let mut image = Vec::new();
        zip.by_name("photos/b.png").unwrap().read_to_end(&mut image).unwrap();
        assert_eq!(image, b"bbb");
    }

    #[tokio::test]
    async fn test_missing_stylesheet_does_not_abort() {
        let dir = asset_dir(false);
        let source = DirAssetSource::new(dir.path());
        let archive = build_archive(PAGE, &source).await.unwrap();

        assert!(!archive.included.contains(&"style.css".to_string()));
        assert!(archive.included.contains(&"script.js".to_string()));
        let omitted: Vec<_> = archive.omitted.iter().map(|o| o.source.as_str()).collect();
        assert_eq!(omitted, vec!["style.css", "photos/missing.png"]);
    }

    #[tokio::test]
    async fn test_foreign_host_image_is_omitted_from_http_export() {
        // Nothing listens on port 1, so stylesheet and script are omitted too.
        let source = HttpAssetSource::new("http://127.0.0.1:1/cv");
        let page = r#"<html><body><img src="http://169.254.169.254/latest/meta-data/creds"></body></html>"#;
        let archive = build_archive(page, &source).await.unwrap();

        assert_eq!(names(&archive.bytes), vec!["index.html"]);
        let refused = archive
            .omitted
            .iter()
            .find(|o| o.source.ends_with("meta-data/creds"))
            .unwrap();
        assert!(refused.reason.contains("escapes the asset root"));
    }

    #[tokio::test]
    async fn test_default_page_exports_without_omissions() {
        let source = DirAssetSource::new(concat!(env!("CARGO_MANIFEST_DIR"), "/public"));
        let page = crate::page::render_page(&embedded_profile(), &PageView::default());
        let archive = build_archive(&page, &source).await.unwrap();

        assert!(archive.omitted.is_empty(), "{:?}", archive.omitted);
        assert!(archive.included.contains(&"photos/profile.png".to_string()));
        assert!(archive.included.contains(&"photos/phone.png".to_string()));
    }

    #[test]
    fn test_image_file_name() {
        assert_eq!(image_file_name("photos/phone.png"), "phone.png");
        assert_eq!(image_file_name("https://x.test/a/b.jpg?v=2"), "b.jpg");
        assert_eq!(image_file_name("photos/"), "unnamed_image");
    }

    #[test]
    fn test_exportable_images_skips_ephemeral_sources() {
        let images = exportable_images(
            r#"<img src="blob:abc"><img src="data:image/png;base64,AA=="><img src="photos/x.png"><img>"#,
        );
        assert_eq!(images, vec!["photos/x.png"]);
    }
}
