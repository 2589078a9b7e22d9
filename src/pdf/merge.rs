//! PDF merging functionality using lopdf

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use lopdf::{Dictionary, Document, Object, ObjectId};
use tracing::{debug, info, warn};
use crate::error::{Error, Result};
use super::naming::OutputTarget;

/// Page attributes a page may inherit from its ancestors in the page tree
const INHERITABLE_KEYS: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Guard against malformed page trees whose Parent links loop
const MAX_TREE_DEPTH: usize = 64;

/// Guard against malformed outlines whose Next links loop
const MAX_OUTLINE_ITEMS: usize = 100_000;

/// The top-level bookmarks of one input document
#[derive(Debug, Clone, Copy)]
struct OutlineRange {
    first: ObjectId,
    last: ObjectId,
    count: i64,
}

/// Options for combining PDFs
#[derive(Debug, Clone)]
pub struct CombineOptions {
    /// Input PDF file paths in the order they should be merged
    pub input_paths: Vec<PathBuf>,
    /// Directory and base name for the output file
    pub target: OutputTarget,
}

/// Combine PDFs in order into the first free output name
///
/// Inputs are loaded and merged before the output file is created, so a bad
/// input never leaves a file behind. If writing fails, the partially written
/// output is removed. Returns the path that was written.
///
/// # Example
///
/// ```no_run
/// use pdf_combine::pdf::{combine_pdfs, CombineOptions, OutputTarget};
/// use std::path::PathBuf;
///
/// let options = CombineOptions {
///     input_paths: vec![PathBuf::from("A.pdf"), PathBuf::from("B.pdf")],
///     target: OutputTarget::default(),
/// };
///
/// let written = combine_pdfs(&options).expect("Failed to combine");
/// println!("{}", written.display());
/// ```
pub fn combine_pdfs(options: &CombineOptions) -> Result<PathBuf> {
    let mut merged = merge_documents(&options.input_paths)?;
    let output_path = write_new_file(&mut merged, &options.target, BufWriter::new)?;

    info!("combined as {}.", output_path.display());
    Ok(output_path)
}

/// Create the first free output file and write the document through `wrap`
///
/// The file handle lives only for the duration of this call. If writing
/// fails, the partially written file is removed and the write error returned.
fn write_new_file<W, F>(doc: &mut Document, target: &OutputTarget, wrap: F) -> Result<PathBuf>
where
    W: Write,
    F: FnOnce(File) -> W,
{
    let (output_path, file) = target.create_file()?;

    if let Err(e) = save_into(doc, wrap(file)) {
        if let Err(remove_err) = fs::remove_file(&output_path) {
            warn!(
                path = %output_path.display(),
                error = %remove_err,
                "could not remove partial output"
            );
        }
        return Err(e);
    }

    Ok(output_path)
}

/// Write and flush; the writer (and the file inside it) is dropped on return
fn save_into<W: Write>(doc: &mut Document, mut writer: W) -> Result<()> {
    doc.save_to(&mut writer)?;
    writer.flush()?;
    Ok(())
}

/// Merge PDF files into one in-memory document, pages in input order
///
/// Based on the lopdf merge example:
/// https://github.com/J-F-Liu/lopdf/blob/main/examples/merge.rs
pub fn merge_documents(input_paths: &[PathBuf]) -> Result<Document> {
    if input_paths.is_empty() {
        return Err(Error::NoInputs);
    }

    for path in input_paths {
        if !path.exists() {
            return Err(Error::FileNotFound(path.clone()));
        }
    }

    let mut max_id = 1;
    let mut page_ids: Vec<ObjectId> = Vec::new();
    let mut outlines: Vec<OutlineRange> = Vec::new();
    let mut objects: BTreeMap<ObjectId, Object> = BTreeMap::new();

    for path in input_paths {
        let mut doc = Document::load(path)?;
        inline_inherited_attributes(&mut doc)?;

        // Renumber past everything collected so far so ids never collide
        doc.renumber_objects_with(max_id);
        max_id = doc.max_id + 1;

        let pages = doc.get_pages();
        debug!(path = %path.display(), pages = pages.len(), "appending document");
        page_ids.extend(pages.into_values());
        outlines.extend(top_level_outline(&doc));
        objects.extend(doc.objects);
    }

    let mut merged = Document::with_version("1.5");
    merged.objects.extend(objects);

    // new_object_id() must hand out ids above everything just inserted
    merged.max_id = max_id - 1;

    let pages_id = merged.new_object_id();
    let kids: Vec<Object> = page_ids.iter().map(|&id| Object::Reference(id)).collect();

    let mut pages = Dictionary::new();
    pages.set("Type", Object::Name(b"Pages".to_vec()));
    pages.set("Count", Object::Integer(page_ids.len() as i64));
    pages.set("Kids", Object::Array(kids));

    let catalog_id = merged.new_object_id();
    let mut catalog = Dictionary::new();
    catalog.set("Type", Object::Name(b"Catalog".to_vec()));
    catalog.set("Pages", Object::Reference(pages_id));
    if let Some(outlines_id) = stitch_outlines(&mut merged, &outlines) {
        catalog.set("Outlines", Object::Reference(outlines_id));
    }

    merged.objects.insert(pages_id, Object::Dictionary(pages));
    merged.objects.insert(catalog_id, Object::Dictionary(catalog));
    merged.trailer.set("Root", Object::Reference(catalog_id));

    for &page_id in &page_ids {
        if let Ok(Object::Dictionary(page)) = merged.get_object_mut(page_id) {
            page.set("Parent", Object::Reference(pages_id));
        }
    }

    // Old catalogs, page tree nodes and outline roots are unreachable now
    merged.prune_objects();
    merged.compress();

    Ok(merged)
}

/// Find the first and last top-level bookmark of a document
///
/// Only an Outlines root stored as an indirect object is picked up.
fn top_level_outline(doc: &Document) -> Option<OutlineRange> {
    let root_id = doc
        .catalog()
        .ok()?
        .get(b"Outlines")
        .and_then(Object::as_reference)
        .ok()?;
    let root = doc.get_dictionary(root_id).ok()?;

    Some(OutlineRange {
        first: root.get(b"First").and_then(Object::as_reference).ok()?,
        last: root.get(b"Last").and_then(Object::as_reference).ok()?,
        count: root.get(b"Count").and_then(Object::as_i64).unwrap_or(0).abs(),
    })
}

/// Chain every document's top-level bookmarks under one new Outlines root
///
/// Bookmarks keep their destinations, which point at page objects that were
/// carried over unchanged.
fn stitch_outlines(doc: &mut Document, ranges: &[OutlineRange]) -> Option<ObjectId> {
    let first = ranges.first()?.first;
    let last = ranges.last()?.last;
    let root_id = doc.new_object_id();

    for pair in ranges.windows(2) {
        let (prev, next) = (pair[0].last, pair[1].first);
        if let Ok(item) = doc.get_dictionary_mut(prev) {
            item.set("Next", Object::Reference(next));
        }
        if let Ok(item) = doc.get_dictionary_mut(next) {
            item.set("Prev", Object::Reference(prev));
        }
    }

    for range in ranges {
        let mut current = Some(range.first);
        let mut steps = 0;
        while let Some(id) = current {
            let Ok(item) = doc.get_dictionary_mut(id) else {
                break;
            };
            item.set("Parent", Object::Reference(root_id));
            if id == range.last || steps >= MAX_OUTLINE_ITEMS {
                break;
            }
            current = item.get(b"Next").and_then(Object::as_reference).ok();
            steps += 1;
        }
    }

    let mut root = Dictionary::new();
    root.set("Type", Object::Name(b"Outlines".to_vec()));
    root.set("First", Object::Reference(first));
    root.set("Last", Object::Reference(last));
    root.set("Count", Object::Integer(ranges.iter().map(|r| r.count).sum()));
    doc.objects.insert(root_id, Object::Dictionary(root));

    Some(root_id)
}

/// Copy inherited page attributes onto each page
///
/// Pages are re-parented under a flat Pages node when merged, which would
/// otherwise lose anything they picked up from their original ancestors.
fn inline_inherited_attributes(doc: &mut Document) -> Result<()> {
    let page_ids: Vec<ObjectId> = doc.get_pages().into_values().collect();

    for page_id in page_ids {
        let inherited = collect_inherited(doc, page_id)?;
        if inherited.is_empty() {
            continue;
        }

        let page = doc.get_dictionary_mut(page_id)?;
        for (key, value) in inherited {
            page.set(key, value);
        }
    }

    Ok(())
}

fn collect_inherited(doc: &Document, page_id: ObjectId) -> Result<Vec<(Vec<u8>, Object)>> {
    let page = doc.get_dictionary(page_id)?;

    let mut missing: Vec<&[u8]> = INHERITABLE_KEYS
        .iter()
        .copied()
        .filter(|key| !page.has(key))
        .collect();
    let mut found = Vec::new();

    let mut parent = page.get(b"Parent").and_then(Object::as_reference).ok();
    let mut depth = 0;

    while let Some(parent_id) = parent {
        if missing.is_empty() || depth >= MAX_TREE_DEPTH {
            break;
        }

        let node = match doc.get_dictionary(parent_id) {
            Ok(node) => node,
            Err(_) => break,
        };

        missing.retain(|key| match node.get(key) {
            Ok(value) => {
                found.push((key.to_vec(), value.clone()));
                false
            }
            Err(_) => true,
        });

        parent = node.get(b"Parent").and_then(Object::as_reference).ok();
        depth += 1;
    }

    Ok(found)
}
