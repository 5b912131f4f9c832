//! ZIP bundling of batch artifacts.
//!
//! Entry names must be unique within the archive. Batch filenames are
//! computed from lead fields, so two leads sharing a contact string would
//! collide; collisions are disambiguated deterministically by appending the
//! item's batch index before the extension.

use std::collections::HashSet;
use std::io::{Cursor, Write};

use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::RenderError;

/// Produce a ZIP archive with one entry per `(filename, bytes)` item.
///
/// # Errors
///
/// Returns [`RenderError`] if an entry cannot be started or written.
pub fn render_bundle(items: &[(String, Vec<u8>)]) -> Result<Vec<u8>, RenderError> {
    let mut cursor = Cursor::new(Vec::new());
    {
        let mut zip = ZipWriter::new(&mut cursor);
        let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

        let mut used: HashSet<String> = HashSet::new();
        for (index, (name, bytes)) in items.iter().enumerate() {
            let entry = disambiguate(name, index, &used);
            used.insert(entry.clone());
            zip.start_file(&entry, options)?;
            zip.write_all(bytes)?;
        }
        zip.finish()?;
    }
    Ok(cursor.into_inner())
}

/// Resolve `name` against already-used entry names.
///
/// First collision appends `_{index}` before the extension; the index is
/// unique per batch, so a further collision can only come from an input
/// that literally contains the suffixed name, handled by appending again.
fn disambiguate(name: &str, index: usize, used: &HashSet<String>) -> String {
    if !used.contains(name) {
        return name.to_owned();
    }
    let (stem, ext) = match name.rfind('.') {
        Some(dot) => (&name[..dot], &name[dot..]),
        None => (name, ""),
    };
    let mut candidate = format!("{stem}_{index}{ext}");
    while used.contains(&candidate) {
        candidate = format!("{stem}_{index}_{index}{ext}");
        if used.contains(&candidate) {
            candidate.push('_');
        }
    }
    candidate
}

#[cfg(test)]
mod tests {
    use super::*;
    use zip::ZipArchive;

    fn entry_names(bytes: Vec<u8>) -> Vec<String> {
        let mut archive = ZipArchive::new(Cursor::new(bytes)).expect("valid archive");
        (0..archive.len())
            .map(|i| {
                archive
                    .by_index(i)
                    .expect("entry readable")
                    .name()
                    .to_owned()
            })
            .collect()
    }

    #[test]
    fn one_entry_per_item() {
        let items = vec![
            ("a.pdf".to_owned(), b"%PDF-a".to_vec()),
            ("b.pdf".to_owned(), b"%PDF-b".to_vec()),
        ];
        let names = entry_names(render_bundle(&items).expect("bundles"));
        assert_eq!(names, vec!["a.pdf", "b.pdf"]);
    }

    #[test]
    fn colliding_names_stay_distinct() {
        let items = vec![
            ("Mining_jane_at_acme_test.pdf".to_owned(), b"one".to_vec()),
            ("Mining_jane_at_acme_test.pdf".to_owned(), b"two".to_vec()),
            ("Mining_jane_at_acme_test.pdf".to_owned(), b"three".to_vec()),
        ];
        let names = entry_names(render_bundle(&items).expect("bundles"));
        assert_eq!(names.len(), 3);
        let unique: HashSet<&String> = names.iter().collect();
        assert_eq!(unique.len(), 3, "entries must not collide: {names:?}");
        assert_eq!(names[0], "Mining_jane_at_acme_test.pdf");
        assert_eq!(names[1], "Mining_jane_at_acme_test_1.pdf");
        assert_eq!(names[2], "Mining_jane_at_acme_test_2.pdf");
    }

    #[test]
    fn disambiguation_is_deterministic() {
        let items = vec![
            ("x.pdf".to_owned(), b"1".to_vec()),
            ("x.pdf".to_owned(), b"2".to_vec()),
        ];
        let first = entry_names(render_bundle(&items).expect("bundles"));
        let second = entry_names(render_bundle(&items).expect("bundles"));
        assert_eq!(first, second);
    }

    #[test]
    fn empty_bundle_is_a_valid_archive() {
        let names = entry_names(render_bundle(&[]).expect("bundles"));
        assert!(names.is_empty());
    }

    #[test]
    fn entry_bytes_round_trip() {
        let items = vec![("doc.pdf".to_owned(), b"%PDF-payload".to_vec())];
        let bytes = render_bundle(&items).expect("bundles");
        let mut archive = ZipArchive::new(Cursor::new(bytes)).expect("valid archive");
        let mut entry = archive.by_index(0).expect("entry");
        let mut content = Vec::new();
        std::io::Read::read_to_end(&mut entry, &mut content).expect("reads");
        assert_eq!(content, b"%PDF-payload");
    }
}
