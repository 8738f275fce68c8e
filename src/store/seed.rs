//! Translation seeding
//!
//! One-time bulk load of translation source documents into the verse store.
//! Each JSON file in the data directory holds one translation; the filename
//! stem is the translation code. A translation with any existing rows is
//! skipped, so seeding is idempotent across restarts. Each file is inserted
//! inside a single transaction: a failure rolls the whole file back, so a
//! translation is either fully seeded or absent.

use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use super::{StoreError, VerseStore};

/// Parsed source document for one translation
#[derive(Debug, Deserialize)]
pub struct TranslationDocument {
    #[serde(default)]
    pub version: String,
    pub books: HashMap<String, HashMap<String, ChapterData>>,
}

/// One chapter of a source document
#[derive(Debug, Deserialize)]
pub struct ChapterData {
    #[serde(default)]
    pub header: String,
    #[serde(default)]
    pub verses: HashMap<String, String>,
}

/// Error type for seeding operations
#[derive(Debug)]
pub enum SeedError {
    Io(std::io::Error),
    Json(serde_json::Error),
    Store(StoreError),
    Pattern(glob::PatternError),
}

impl fmt::Display for SeedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeedError::Io(e) => write!(f, "IO error: {}", e),
            SeedError::Json(e) => write!(f, "JSON error: {}", e),
            SeedError::Store(e) => write!(f, "{}", e),
            SeedError::Pattern(e) => write!(f, "glob pattern error: {}", e),
        }
    }
}

impl std::error::Error for SeedError {}

impl From<std::io::Error> for SeedError {
    fn from(err: std::io::Error) -> Self {
        SeedError::Io(err)
    }
}

impl From<serde_json::Error> for SeedError {
    fn from(err: serde_json::Error) -> Self {
        SeedError::Json(err)
    }
}

impl From<StoreError> for SeedError {
    fn from(err: StoreError) -> Self {
        SeedError::Store(err)
    }
}

impl From<rusqlite::Error> for SeedError {
    fn from(err: rusqlite::Error) -> Self {
        SeedError::Store(StoreError::Sqlite(err))
    }
}

impl From<glob::PatternError> for SeedError {
    fn from(err: glob::PatternError) -> Self {
        SeedError::Pattern(err)
    }
}

impl VerseStore {
    /// Seed every translation file found in the data directory.
    ///
    /// A file whose translation already has rows is skipped. A file that
    /// fails to read, parse, or write is rolled back and abandoned; the
    /// remaining files still seed. Only a directory-level problem (bad
    /// glob pattern) is returned as an error.
    pub fn seed_from_dir(&self, data_dir: &Path) -> Result<(), SeedError> {
        let pattern = data_dir.join("*.json");
        for entry in glob::glob(&pattern.to_string_lossy())? {
            let path = match entry {
                Ok(p) => p,
                Err(e) => {
                    eprintln!("[Seed] Skipping unreadable path: {}", e);
                    continue;
                }
            };

            let translation = match translation_code(&path) {
                Some(code) => code,
                None => continue,
            };

            if self.translation_verse_count(&translation)? > 0 {
                eprintln!("[Seed] Translation {} already seeded, skipping", translation);
                continue;
            }

            eprintln!("[Seed] Seeding {} from {}", translation, path.display());
            match self.seed_translation_file(&path, &translation) {
                Ok(count) => {
                    eprintln!("[Seed] Seeded {} verses for {}", count, translation);
                }
                Err(e) => {
                    // Transaction already rolled back; this translation stays
                    // absent and the rest of the directory still seeds.
                    eprintln!("[Seed] Abandoning {}: {}", translation, e);
                }
            }
        }
        Ok(())
    }

    /// Load one translation file inside a single transaction.
    fn seed_translation_file(&self, path: &Path, translation: &str) -> Result<usize, SeedError> {
        let data = std::fs::read_to_string(path)?;
        let doc: TranslationDocument = serde_json::from_str(&data)?;
        if !doc.version.is_empty() {
            eprintln!("[Seed] {} source version: {}", translation, doc.version);
        }

        let mut conn = self.lock_conn();
        let tx = conn.transaction()?;
        let mut count = 0usize;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO verses (translation, book, chapter, verse, text) VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;

            for (book, chapters) in &doc.books {
                for (chapter_key, chapter) in chapters {
                    let Ok(chapter_num) = chapter_key.parse::<u32>() else {
                        continue; // Skip entries with non-numeric chapter keys
                    };

                    for (verse_key, text) in &chapter.verses {
                        let Ok(verse_num) = verse_key.parse::<u32>() else {
                            continue;
                        };
                        stmt.execute(rusqlite::params![
                            translation,
                            book,
                            chapter_num,
                            verse_num,
                            text
                        ])?;
                        count += 1;
                    }
                }
            }
        }
        tx.commit()?;
        Ok(count)
    }

    /// Seed per-chapter display headers from the same source documents.
    ///
    /// Runs as a separate pass with insert-if-absent semantics per
    /// (translation, book, chapter), so it may safely rerun even after the
    /// verse rows were already seeded.
    pub fn seed_chapter_headers(&self, data_dir: &Path) -> Result<(), SeedError> {
        let pattern = data_dir.join("*.json");
        for entry in glob::glob(&pattern.to_string_lossy())? {
            let path = match entry {
                Ok(p) => p,
                Err(e) => {
                    eprintln!("[Seed] Skipping unreadable path: {}", e);
                    continue;
                }
            };

            let translation = match translation_code(&path) {
                Some(code) => code,
                None => continue,
            };

            if let Err(e) = self.seed_header_file(&path, &translation) {
                eprintln!("[Seed] Abandoning headers for {}: {}", translation, e);
                continue;
            }
            eprintln!("[Seed] Seeded headers for {}", translation);
        }
        Ok(())
    }

    fn seed_header_file(&self, path: &Path, translation: &str) -> Result<(), SeedError> {
        let data = std::fs::read_to_string(path)?;
        let doc: TranslationDocument = serde_json::from_str(&data)?;

        let mut conn = self.lock_conn();
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT OR IGNORE INTO chapter_headers (translation, book, chapter, header) VALUES (?1, ?2, ?3, ?4)",
            )?;

            for (book, chapters) in &doc.books {
                for (chapter_key, chapter) in chapters {
                    if chapter.header.is_empty() {
                        continue;
                    }
                    let Ok(chapter_num) = chapter_key.parse::<u32>() else {
                        continue;
                    };
                    stmt.execute(rusqlite::params![
                        translation,
                        book,
                        chapter_num,
                        &chapter.header
                    ])?;
                }
            }
        }
        tx.commit()?;
        Ok(())
    }
}

/// Translation code is the filename without its extension
fn translation_code(path: &Path) -> Option<String> {
    path.file_stem().map(|s| s.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn write_source(dir: &Path, name: &str, doc: &serde_json::Value) {
        fs::write(dir.join(name), serde_json::to_string_pretty(doc).unwrap()).unwrap();
    }

    fn sample_doc() -> serde_json::Value {
        json!({
            "version": "test-1.0",
            "books": {
                "John": {
                    "3": {
                        "header": "You Must Be Born Again",
                        "verses": {
                            "16": "For God so loved the world...",
                            "17": "For God sent not his Son..."
                        }
                    },
                    "4": {
                        "header": "",
                        "verses": { "1": "When therefore the Lord knew..." }
                    }
                }
            }
        })
    }

    #[test]
    fn test_seed_inserts_all_verses() {
        let dir = TempDir::new().unwrap();
        write_source(dir.path(), "KJV.json", &sample_doc());

        let store = VerseStore::in_memory().unwrap();
        store.seed_from_dir(dir.path()).unwrap();

        assert_eq!(store.translation_verse_count("KJV").unwrap(), 3);
        let v = store.get_verse("KJV", "John", 3, 16).unwrap();
        assert_eq!(v.text, "For God so loved the world...");
    }

    #[test]
    fn test_seed_is_idempotent() {
        let dir = TempDir::new().unwrap();
        write_source(dir.path(), "KJV.json", &sample_doc());

        let store = VerseStore::in_memory().unwrap();
        store.seed_from_dir(dir.path()).unwrap();
        store.seed_from_dir(dir.path()).unwrap();

        assert_eq!(store.translation_verse_count("KJV").unwrap(), 3);
        assert_eq!(store.available_translations().unwrap(), vec!["KJV".to_string()]);
    }

    #[test]
    fn test_reseed_ignores_changed_file() {
        let dir = TempDir::new().unwrap();
        write_source(dir.path(), "KJV.json", &sample_doc());

        let store = VerseStore::in_memory().unwrap();
        store.seed_from_dir(dir.path()).unwrap();

        // A corrected source file has no effect once the translation exists.
        let mut changed = sample_doc();
        changed["books"]["John"]["3"]["verses"]["16"] = json!("Corrected text");
        write_source(dir.path(), "KJV.json", &changed);
        store.seed_from_dir(dir.path()).unwrap();

        let v = store.get_verse("KJV", "John", 3, 16).unwrap();
        assert_eq!(v.text, "For God so loved the world...");
    }

    #[test]
    fn test_seed_skips_non_numeric_keys() {
        let dir = TempDir::new().unwrap();
        let doc = json!({
            "version": "",
            "books": {
                "John": {
                    "intro": { "header": "", "verses": { "1": "skipped chapter" } },
                    "3": {
                        "header": "",
                        "verses": { "16": "kept", "footnote": "skipped verse" }
                    }
                }
            }
        });
        write_source(dir.path(), "KJV.json", &doc);

        let store = VerseStore::in_memory().unwrap();
        store.seed_from_dir(dir.path()).unwrap();

        assert_eq!(store.translation_verse_count("KJV").unwrap(), 1);
        assert_eq!(store.get_verse("KJV", "John", 3, 16).unwrap().text, "kept");
    }

    #[test]
    fn test_bad_file_does_not_block_other_translations() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("ASV.json"), "{ not json").unwrap();
        write_source(dir.path(), "KJV.json", &sample_doc());

        let store = VerseStore::in_memory().unwrap();
        store.seed_from_dir(dir.path()).unwrap();

        assert_eq!(store.available_translations().unwrap(), vec!["KJV".to_string()]);
        assert_eq!(store.translation_verse_count("ASV").unwrap(), 0);
    }

    #[test]
    fn test_header_pass_seeds_and_skips_empty() {
        let dir = TempDir::new().unwrap();
        write_source(dir.path(), "KJV.json", &sample_doc());

        let store = VerseStore::in_memory().unwrap();
        store.seed_from_dir(dir.path()).unwrap();
        store.seed_chapter_headers(dir.path()).unwrap();

        assert_eq!(
            store.chapter_header("KJV", "John", 3).unwrap().as_deref(),
            Some("You Must Be Born Again")
        );
        // Chapter 4 has an empty header string, which is not stored.
        assert_eq!(store.chapter_header("KJV", "John", 4).unwrap(), None);
    }

    #[test]
    fn test_header_pass_reruns_safely_after_verse_seeding() {
        let dir = TempDir::new().unwrap();
        write_source(dir.path(), "KJV.json", &sample_doc());

        let store = VerseStore::in_memory().unwrap();
        store.seed_from_dir(dir.path()).unwrap();
        store.seed_chapter_headers(dir.path()).unwrap();
        store.seed_chapter_headers(dir.path()).unwrap();

        let conn = store.lock_conn();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM chapter_headers", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_seed_file_backed_store() {
        let dir = TempDir::new().unwrap();
        write_source(dir.path(), "KJV.json", &sample_doc());
        let db_path = dir.path().join("verses.db");

        {
            let store = VerseStore::open(&db_path).unwrap();
            store.seed_from_dir(dir.path()).unwrap();
        }

        // Rows survive reopening the store file.
        let store = VerseStore::open(&db_path).unwrap();
        assert_eq!(store.translation_verse_count("KJV").unwrap(), 3);
    }
}
