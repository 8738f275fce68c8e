//! Presentation state
//!
//! Holds the verse currently on the live display and fans out change
//! notifications to subscribed renderers. The controller mutates this state
//! through the navigation operations; renderers only observe.

use std::fmt;
use std::sync::{Arc, RwLock};

use crate::store::{QueryError, Verse, VerseStore};

/// A renderer (or anything else) that redraws when the current verse changes
pub trait VerseObserver: Send + Sync {
    fn on_verse_changed(&self, verse: &Verse);
}

/// Error type for navigation operations
#[derive(Debug)]
pub enum PresentationError {
    /// Next/previous/switch was attempted before any verse was shown
    NoCurrentVerse,
    Query(QueryError),
}

impl fmt::Display for PresentationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PresentationError::NoCurrentVerse => write!(f, "no verse is currently shown"),
            PresentationError::Query(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for PresentationError {}

impl From<QueryError> for PresentationError {
    fn from(err: QueryError) -> Self {
        PresentationError::Query(err)
    }
}

struct Inner {
    current: Option<Verse>,
    observers: Vec<Arc<dyn VerseObserver>>,
}

/// The current verse plus the subscriber list, shared between the controller
/// thread and renderer callbacks.
///
/// Starts empty; once a verse has been shown the state only ever moves to
/// another verse, never back to empty.
pub struct PresentationState {
    store: Arc<VerseStore>,
    inner: RwLock<Inner>,
}

impl PresentationState {
    pub fn new(store: Arc<VerseStore>) -> Self {
        Self {
            store,
            inner: RwLock::new(Inner {
                current: None,
                observers: Vec::new(),
            }),
        }
    }

    /// Replace the current verse and notify every observer, in registration
    /// order.
    ///
    /// The observer list is copied out and the lock released before any
    /// callback runs, so an observer may call back into this state without
    /// deadlocking. Observers registered during an in-flight notification
    /// miss that notification.
    pub fn set_verse(&self, verse: Verse) {
        let observers = {
            let mut inner = self.inner.write().unwrap();
            inner.current = Some(verse.clone());
            inner.observers.clone()
        };

        for observer in observers {
            observer.on_verse_changed(&verse);
        }
    }

    /// The verse currently shown, if any
    pub fn current_verse(&self) -> Option<Verse> {
        self.inner.read().unwrap().current.clone()
    }

    /// Subscribe to verse changes. There is no removal; observers live as
    /// long as the presentation state does.
    pub fn add_observer(&self, observer: Arc<dyn VerseObserver>) {
        self.inner.write().unwrap().observers.push(observer);
    }

    /// Look up a verse and make it current
    pub fn fetch_and_set(
        &self,
        translation: &str,
        book: &str,
        chapter: u32,
        verse: u32,
    ) -> Result<(), PresentationError> {
        let v = self.store.get_verse(translation, book, chapter, verse)?;
        self.set_verse(v);
        Ok(())
    }

    /// Advance to the next verse in reading sequence
    pub fn fetch_and_set_next(&self) -> Result<(), PresentationError> {
        let current = self.current_verse().ok_or(PresentationError::NoCurrentVerse)?;
        let next = self.store.next_verse(
            &current.translation,
            &current.book,
            current.chapter,
            current.verse,
        )?;
        self.set_verse(next);
        Ok(())
    }

    /// Step back to the previous verse in reading sequence
    pub fn fetch_and_set_previous(&self) -> Result<(), PresentationError> {
        let current = self.current_verse().ok_or(PresentationError::NoCurrentVerse)?;
        let prev = self.store.previous_verse(
            &current.translation,
            &current.book,
            current.chapter,
            current.verse,
        )?;
        self.set_verse(prev);
        Ok(())
    }

    /// Show the same (book, chapter, verse) in another translation.
    ///
    /// Fails when the target translation lacks that exact verse; there is no
    /// fallback to a nearby verse, and the current verse stays unchanged.
    pub fn switch_translation(&self, new_translation: &str) -> Result<(), PresentationError> {
        let current = self.current_verse().ok_or(PresentationError::NoCurrentVerse)?;
        let v = self.store.get_verse(
            new_translation,
            &current.book,
            current.chapter,
            current.verse,
        )?;
        self.set_verse(v);
        Ok(())
    }
}
