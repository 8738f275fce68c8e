//! Verse storage using SQLite
//!
//! Persistent storage for seeded Bible translations with the point,
//! neighbor, and search queries the presentation layer is built on.
//! Next/previous traversal is expressed as ordered SQL queries rather than
//! an in-memory walk so the ordering work stays on the store's index.

pub mod seed;

use rusqlite::{params, Connection, OptionalExtension};
use std::fmt;
use std::path::Path;
use std::sync::Mutex;

/// A single verse row. Identity is (translation, book, chapter, verse);
/// rows are immutable once seeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verse {
    pub translation: String,
    pub book: String,
    pub chapter: u32,
    pub verse: u32,
    pub text: String,
}

impl Verse {
    /// Reference label as shown on the live display, e.g. "John 3:16 (KJV)".
    pub fn reference(&self) -> String {
        format!(
            "{} {}:{} ({})",
            self.book, self.chapter, self.verse, self.translation
        )
    }
}

/// SQLite-backed verse store
pub struct VerseStore {
    conn: Mutex<Connection>,
}

impl VerseStore {
    /// Open (or create) a verse store at the given path
    pub fn open(db_path: &Path) -> Result<Self, StoreError> {
        // Ensure parent directory exists
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(db_path)?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.create_schema()?;
        Ok(store)
    }

    /// Create an in-memory verse store (for testing)
    pub fn in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.create_schema()?;
        Ok(store)
    }

    /// Create database schema
    fn create_schema(&self) -> Result<(), StoreError> {
        let conn = self.conn.lock().unwrap();

        conn.execute_batch(
            r#"
            -- Verse rows, one per (translation, book, chapter, verse)
            CREATE TABLE IF NOT EXISTS verses (
                translation TEXT NOT NULL,
                book TEXT NOT NULL,
                chapter INTEGER NOT NULL,
                verse INTEGER NOT NULL,
                text TEXT NOT NULL
            );

            -- Uniqueness plus the ordered index the neighbor queries walk
            CREATE UNIQUE INDEX IF NOT EXISTS idx_verses_ref
                ON verses(translation, book, chapter, verse);

            -- Optional per-chapter display headers
            CREATE TABLE IF NOT EXISTS chapter_headers (
                translation TEXT NOT NULL,
                book TEXT NOT NULL,
                chapter INTEGER NOT NULL,
                header TEXT NOT NULL
            );

            CREATE UNIQUE INDEX IF NOT EXISTS idx_chapter_headers_ref
                ON chapter_headers(translation, book, chapter);
            "#,
        )?;

        Ok(())
    }

    /// Exact point lookup
    pub fn get_verse(
        &self,
        translation: &str,
        book: &str,
        chapter: u32,
        verse: u32,
    ) -> Result<Verse, QueryError> {
        let conn = self.conn.lock().unwrap();
        let found = conn
            .query_row(
                r#"
                SELECT translation, book, chapter, verse, text
                FROM verses
                WHERE translation = ?1 AND book = ?2 AND chapter = ?3 AND verse = ?4
                "#,
                params![translation, book, chapter, verse],
                row_to_verse,
            )
            .optional()
            .map_err(StoreError::from)?;

        found.ok_or_else(|| QueryError::NotFound {
            translation: translation.to_string(),
            book: book.to_string(),
            chapter,
            verse,
        })
    }

    /// Next verse in reading sequence, crossing chapter and book boundaries.
    ///
    /// Three tiers, each tried in order: next verse in the same chapter,
    /// first verse of a later chapter in the same book, first verse of a
    /// later book. Book order is string comparison on the stored name.
    pub fn next_verse(
        &self,
        translation: &str,
        book: &str,
        chapter: u32,
        verse: u32,
    ) -> Result<Verse, QueryError> {
        let conn = self.conn.lock().unwrap();

        if let Some(v) = conn
            .query_row(
                r#"
                SELECT translation, book, chapter, verse, text
                FROM verses
                WHERE translation = ?1 AND book = ?2 AND chapter = ?3 AND verse > ?4
                ORDER BY verse ASC
                LIMIT 1
                "#,
                params![translation, book, chapter, verse],
                row_to_verse,
            )
            .optional()
            .map_err(StoreError::from)?
        {
            return Ok(v);
        }

        if let Some(v) = conn
            .query_row(
                r#"
                SELECT translation, book, chapter, verse, text
                FROM verses
                WHERE translation = ?1 AND book = ?2 AND chapter > ?3
                ORDER BY chapter ASC, verse ASC
                LIMIT 1
                "#,
                params![translation, book, chapter],
                row_to_verse,
            )
            .optional()
            .map_err(StoreError::from)?
        {
            return Ok(v);
        }

        conn.query_row(
            r#"
            SELECT translation, book, chapter, verse, text
            FROM verses
            WHERE translation = ?1 AND book > ?2
            ORDER BY book ASC, chapter ASC, verse ASC
            LIMIT 1
            "#,
            params![translation, book],
            row_to_verse,
        )
        .optional()
        .map_err(StoreError::from)?
        .ok_or_else(|| QueryError::NotFound {
            translation: translation.to_string(),
            book: book.to_string(),
            chapter,
            verse,
        })
    }

    /// Previous verse in reading sequence; descending mirror of `next_verse`.
    pub fn previous_verse(
        &self,
        translation: &str,
        book: &str,
        chapter: u32,
        verse: u32,
    ) -> Result<Verse, QueryError> {
        let conn = self.conn.lock().unwrap();

        if let Some(v) = conn
            .query_row(
                r#"
                SELECT translation, book, chapter, verse, text
                FROM verses
                WHERE translation = ?1 AND book = ?2 AND chapter = ?3 AND verse < ?4
                ORDER BY verse DESC
                LIMIT 1
                "#,
                params![translation, book, chapter, verse],
                row_to_verse,
            )
            .optional()
            .map_err(StoreError::from)?
        {
            return Ok(v);
        }

        if let Some(v) = conn
            .query_row(
                r#"
                SELECT translation, book, chapter, verse, text
                FROM verses
                WHERE translation = ?1 AND book = ?2 AND chapter < ?3
                ORDER BY chapter DESC, verse DESC
                LIMIT 1
                "#,
                params![translation, book, chapter],
                row_to_verse,
            )
            .optional()
            .map_err(StoreError::from)?
        {
            return Ok(v);
        }

        conn.query_row(
            r#"
            SELECT translation, book, chapter, verse, text
            FROM verses
            WHERE translation = ?1 AND book < ?2
            ORDER BY book DESC, chapter DESC, verse DESC
            LIMIT 1
            "#,
            params![translation, book],
            row_to_verse,
        )
        .optional()
        .map_err(StoreError::from)?
        .ok_or_else(|| QueryError::NotFound {
            translation: translation.to_string(),
            book: book.to_string(),
            chapter,
            verse,
        })
    }

    /// Substring search over book names and verse text within one translation.
    ///
    /// Results are ordered by book, chapter, verse and capped at 50 rows.
    /// An empty result is not an error.
    pub fn search_verses(&self, translation: &str, text: &str) -> Result<Vec<Verse>, StoreError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            r#"
            SELECT translation, book, chapter, verse, text
            FROM verses
            WHERE translation = ?1 AND (book LIKE ?2 OR text LIKE ?2)
            ORDER BY book, chapter, verse
            LIMIT 50
            "#,
        )?;

        let pattern = format!("%{}%", text);
        let verses = stmt
            .query_map(params![translation, pattern], row_to_verse)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(verses)
    }

    /// Translation codes with at least one seeded verse, alphabetical
    pub fn available_translations(&self) -> Result<Vec<String>, StoreError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt =
            conn.prepare("SELECT DISTINCT translation FROM verses ORDER BY translation")?;

        let translations = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(translations)
    }

    /// Display header for a chapter; None when no header is stored
    pub fn chapter_header(
        &self,
        translation: &str,
        book: &str,
        chapter: u32,
    ) -> Result<Option<String>, StoreError> {
        let conn = self.conn.lock().unwrap();
        let header = conn
            .query_row(
                r#"
                SELECT header
                FROM chapter_headers
                WHERE translation = ?1 AND book = ?2 AND chapter = ?3
                LIMIT 1
                "#,
                params![translation, book, chapter],
                |row| row.get::<_, String>(0),
            )
            .optional()?;

        Ok(header)
    }

    /// Number of verse rows stored for a translation
    pub fn translation_verse_count(&self, translation: &str) -> Result<usize, StoreError> {
        let conn = self.conn.lock().unwrap();
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM verses WHERE translation = ?1",
            params![translation],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    pub(crate) fn lock_conn(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn.lock().unwrap()
    }
}

/// Convert a database row to a Verse
fn row_to_verse(row: &rusqlite::Row) -> rusqlite::Result<Verse> {
    Ok(Verse {
        translation: row.get(0)?,
        book: row.get(1)?,
        chapter: row.get::<_, i64>(2)? as u32,
        verse: row.get::<_, i64>(3)? as u32,
        text: row.get(4)?,
    })
}

/// Error type for store connection and I/O failures
#[derive(Debug)]
pub enum StoreError {
    Sqlite(rusqlite::Error),
    Io(std::io::Error),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Sqlite(e) => write!(f, "SQLite error: {}", e),
            StoreError::Io(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        StoreError::Sqlite(err)
    }
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::Io(err)
    }
}

/// Error type for point and neighbor lookups
#[derive(Debug)]
pub enum QueryError {
    /// The query yielded no row (missing verse, or already at the first or
    /// last verse of the translation)
    NotFound {
        translation: String,
        book: String,
        chapter: u32,
        verse: u32,
    },
    Store(StoreError),
}

impl QueryError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, QueryError::NotFound { .. })
    }
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryError::NotFound {
                translation,
                book,
                chapter,
                verse,
            } => write!(
                f,
                "verse not found: {} {} {}:{}",
                translation, book, chapter, verse
            ),
            QueryError::Store(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for QueryError {}

impl From<StoreError> for QueryError {
    fn from(err: StoreError) -> Self {
        QueryError::Store(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::params;

    fn insert(store: &VerseStore, translation: &str, book: &str, chapter: u32, verse: u32) {
        let text = format!("{} {}:{} text", book, chapter, verse);
        let conn = store.lock_conn();
        conn.execute(
            "INSERT INTO verses (translation, book, chapter, verse, text) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![translation, book, chapter, verse, text],
        )
        .unwrap();
    }

    fn test_store() -> VerseStore {
        let store = VerseStore::in_memory().unwrap();
        // Two chapters of John plus the start of Luke and end of Mark,
        // enough to cross every boundary kind.
        insert(&store, "KJV", "John", 3, 15);
        insert(&store, "KJV", "John", 3, 16);
        insert(&store, "KJV", "John", 4, 1);
        insert(&store, "KJV", "John", 4, 2);
        insert(&store, "KJV", "Luke", 24, 53);
        insert(&store, "KJV", "Mark", 1, 1);
        store
    }

    #[test]
    fn test_get_verse_found() {
        let store = test_store();
        let v = store.get_verse("KJV", "John", 3, 16).unwrap();
        assert_eq!(v.book, "John");
        assert_eq!(v.chapter, 3);
        assert_eq!(v.verse, 16);
        assert_eq!(v.text, "John 3:16 text");
    }

    #[test]
    fn test_get_verse_not_found() {
        let store = test_store();
        let err = store.get_verse("KJV", "John", 3, 17).unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "verse not found: KJV John 3:17");
    }

    #[test]
    fn test_get_verse_missing_translation() {
        let store = test_store();
        assert!(store.get_verse("ASV", "John", 3, 16).unwrap_err().is_not_found());
    }

    #[test]
    fn test_next_within_chapter() {
        let store = test_store();
        let v = store.next_verse("KJV", "John", 3, 15).unwrap();
        assert_eq!((v.chapter, v.verse), (3, 16));
    }

    #[test]
    fn test_next_crosses_chapter() {
        let store = test_store();
        let v = store.next_verse("KJV", "John", 3, 16).unwrap();
        assert_eq!(v.book, "John");
        assert_eq!((v.chapter, v.verse), (4, 1));
    }

    #[test]
    fn test_next_crosses_book() {
        // Book order is string comparison: "John" < "Luke" < "Mark", so
        // John's last seeded verse advances to Luke.
        let store = test_store();
        let v = store.next_verse("KJV", "John", 4, 2).unwrap();
        assert_eq!(v.book, "Luke");
        assert_eq!((v.chapter, v.verse), (24, 53));
    }

    #[test]
    fn test_next_at_end_of_translation() {
        let store = test_store();
        // "Mark" sorts last among the seeded books.
        let err = store.next_verse("KJV", "Mark", 1, 1).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_previous_within_chapter() {
        let store = test_store();
        let v = store.previous_verse("KJV", "John", 3, 16).unwrap();
        assert_eq!((v.chapter, v.verse), (3, 15));
    }

    #[test]
    fn test_previous_crosses_chapter_to_last_verse() {
        let store = test_store();
        let v = store.previous_verse("KJV", "John", 4, 1).unwrap();
        assert_eq!(v.book, "John");
        assert_eq!((v.chapter, v.verse), (3, 16));
    }

    #[test]
    fn test_previous_crosses_book_to_last_verse() {
        let store = test_store();
        let v = store.previous_verse("KJV", "Luke", 24, 53).unwrap();
        assert_eq!(v.book, "John");
        assert_eq!((v.chapter, v.verse), (4, 2));
    }

    #[test]
    fn test_previous_at_start_of_translation() {
        let store = test_store();
        let err = store.previous_verse("KJV", "John", 3, 15).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_next_then_previous_round_trip() {
        let store = test_store();
        let start = store.get_verse("KJV", "John", 3, 16).unwrap();
        let next = store
            .next_verse(&start.translation, &start.book, start.chapter, start.verse)
            .unwrap();
        let back = store
            .previous_verse(&next.translation, &next.book, next.chapter, next.verse)
            .unwrap();
        assert_eq!(back, start);
    }

    #[test]
    fn test_neighbor_queries_stay_within_translation() {
        let store = test_store();
        insert(&store, "ASV", "Zephaniah", 1, 1);
        // The ASV row sorts after every KJV book name but must not be
        // reachable from a KJV traversal.
        assert!(store.next_verse("KJV", "Mark", 1, 1).unwrap_err().is_not_found());
    }

    #[test]
    fn test_search_matches_text_and_book() {
        let store = test_store();
        let by_text = store.search_verses("KJV", "3:16 text").unwrap();
        assert_eq!(by_text.len(), 1);
        assert_eq!(by_text[0].book, "John");

        let by_book = store.search_verses("KJV", "Luke").unwrap();
        assert_eq!(by_book.len(), 1);
    }

    #[test]
    fn test_search_empty_is_not_error() {
        let store = test_store();
        assert!(store.search_verses("KJV", "no such phrase").unwrap().is_empty());
    }

    #[test]
    fn test_search_ordered_and_capped_at_50() {
        let store = VerseStore::in_memory().unwrap();
        for verse in 1..=60 {
            insert(&store, "KJV", "Psalms", 119, verse);
        }
        let results = store.search_verses("KJV", "Psalms").unwrap();
        assert_eq!(results.len(), 50);
        // Ascending by verse within the single chapter.
        assert_eq!(results[0].verse, 1);
        assert!(results.windows(2).all(|w| w[0].verse < w[1].verse));
    }

    #[test]
    fn test_available_translations_sorted_distinct() {
        let store = test_store();
        insert(&store, "ASV", "John", 3, 16);
        insert(&store, "ASV", "John", 3, 17);
        let translations = store.available_translations().unwrap();
        assert_eq!(translations, vec!["ASV".to_string(), "KJV".to_string()]);
    }

    #[test]
    fn test_chapter_header_absent_is_none() {
        let store = test_store();
        assert_eq!(store.chapter_header("KJV", "John", 3).unwrap(), None);
    }

    #[test]
    fn test_chapter_header_found() {
        let store = test_store();
        {
            let conn = store.lock_conn();
            conn.execute(
                "INSERT INTO chapter_headers (translation, book, chapter, header) VALUES (?1, ?2, ?3, ?4)",
                params!["KJV", "John", 3, "You Must Be Born Again"],
            )
            .unwrap();
        }
        assert_eq!(
            store.chapter_header("KJV", "John", 3).unwrap().as_deref(),
            Some("You Must Be Born Again")
        );
    }

    #[test]
    fn test_unique_index_rejects_duplicate_row() {
        let store = test_store();
        let conn = store.lock_conn();
        let result = conn.execute(
            "INSERT INTO verses (translation, book, chapter, verse, text) VALUES (?1, ?2, ?3, ?4, ?5)",
            params!["KJV", "John", 3, 16, "duplicate"],
        );
        assert!(result.is_err());
    }
}
