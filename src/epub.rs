/*!
 * EPUB container handling.
 *
 * An EPUB is a zip archive with two constraints honored here: the `mimetype`
 * entry must be the archive's first entry and stored uncompressed, and
 * chapter content is any entry named with an HTML/XHTML extension. Everything
 * that is not a chapter round-trips byte-for-byte.
 */

use log::debug;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use zip::CompressionMethod;
use zip::read::ZipArchive;
use zip::write::{FileOptions, ZipWriter};

use crate::errors::EpubError;

/// Name of the media-type marker entry
const MIMETYPE_ENTRY: &str = "mimetype";

/// One chapter as raw bytes, keyed by its archive path
#[derive(Debug, Clone)]
pub struct ChapterDocument {
    pub path: String,
    pub bytes: Vec<u8>,
}

/// In-memory EPUB: every archive entry plus the chapters derived from them.
///
/// Keeping both allows round-trip with minimal loss: translation rewrites a
/// chapter's entry in `items` and leaves every other entry untouched.
#[derive(Debug, Clone)]
pub struct Book {
    /// Archive path → entry bytes
    pub items: BTreeMap<String, Vec<u8>>,
    /// Chapter entries in archive order
    pub chapters: Vec<ChapterDocument>,
}

fn is_chapter_entry(name: &str) -> bool {
    let lowered = name.to_ascii_lowercase();
    lowered.ends_with(".xhtml") || lowered.ends_with(".html") || lowered.ends_with(".htm")
}

/// Load an EPUB from disk
pub fn load_book(path: &Path) -> Result<Book, EpubError> {
    let file = File::open(path).map_err(|e| EpubError::Read(e.to_string()))?;
    let mut archive = ZipArchive::new(file).map_err(|e| EpubError::Read(e.to_string()))?;

    let mut items = BTreeMap::new();
    let mut chapters = Vec::new();

    for index in 0..archive.len() {
        let mut entry = archive
            .by_index(index)
            .map_err(|e| EpubError::Read(e.to_string()))?;
        if entry.is_dir() {
            continue;
        }
        let name = entry.name().to_string();
        let mut contents = Vec::with_capacity(entry.size() as usize);
        entry
            .read_to_end(&mut contents)
            .map_err(|e| EpubError::Read(e.to_string()))?;

        if is_chapter_entry(&name) {
            chapters.push(ChapterDocument {
                path: name.clone(),
                bytes: contents.clone(),
            });
        }
        items.insert(name, contents);
    }

    debug!(
        "EPUB load completed | items={} chapters={}",
        items.len(),
        chapters.len()
    );
    Ok(Book { items, chapters })
}

/// Save an EPUB to disk.
///
/// The `mimetype` entry is written first and stored without compression, as
/// the container format requires; all other entries are deflated.
pub fn save_book(book: &Book, path: &Path) -> Result<(), EpubError> {
    let file = File::create(path).map_err(|e| EpubError::Write(e.to_string()))?;
    let mut writer = ZipWriter::new(file);

    let stored = FileOptions::<()>::default().compression_method(CompressionMethod::Stored);
    let deflated = FileOptions::<()>::default().compression_method(CompressionMethod::Deflated);

    if let Some(mimetype) = book.items.get(MIMETYPE_ENTRY) {
        writer
            .start_file(MIMETYPE_ENTRY, stored)
            .map_err(|e| EpubError::Write(e.to_string()))?;
        writer
            .write_all(mimetype)
            .map_err(|e| EpubError::Write(e.to_string()))?;
    }

    for (name, contents) in &book.items {
        if name == MIMETYPE_ENTRY {
            continue;
        }
        writer
            .start_file(name, deflated.clone())
            .map_err(|e| EpubError::Write(e.to_string()))?;
        writer
            .write_all(contents)
            .map_err(|e| EpubError::Write(e.to_string()))?;
    }

    writer.finish().map_err(|e| EpubError::Write(e.to_string()))?;

    debug!(
        "EPUB save completed | items={} path={}",
        book.items.len(),
        path.display()
    );
    Ok(())
}
