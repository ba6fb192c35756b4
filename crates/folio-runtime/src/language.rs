#![forbid(unsafe_code)]

//! UI language broadcast with persistence.
//!
//! The selected [`Lang`] is an observable value; header, footer and section
//! labels subscribe to it. Every change is written to a
//! [`LanguageStorage`] under [`STORAGE_KEY`] and restored on the next visit.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use folio_core::Lang;
use tracing::{debug, warn};

use crate::reactive::{Observable, Watch};

/// Storage key of the persisted language code.
pub const STORAGE_KEY: &str = "app-lang";

/// Failure to persist a value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageError {
    pub message: String,
}

impl StorageError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "storage error: {}", self.message)
    }
}

impl std::error::Error for StorageError {}

/// Key-value persistence for small settings (`localStorage` in a browser).
pub trait LanguageStorage {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// In-memory storage. Clones share contents.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage pre-filled with one entry.
    #[must_use]
    pub fn with_entry(key: &str, value: &str) -> Self {
        let storage = Self::new();
        storage
            .entries
            .borrow_mut()
            .insert(key.to_owned(), value.to_owned());
        storage
    }
}

impl LanguageStorage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries
            .borrow_mut()
            .insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}

/// Current UI language, restored from and persisted to storage.
pub struct LanguageService {
    lang: Observable<Lang>,
    storage: Option<Box<dyn LanguageStorage>>,
}

impl LanguageService {
    /// Restore the saved language, falling back to [`Lang::default`].
    ///
    /// Without storage (server rendering) the default is used and nothing
    /// is persisted.
    #[must_use]
    pub fn new(storage: Option<Box<dyn LanguageStorage>>) -> Self {
        let saved = storage.as_ref().and_then(|s| s.get(STORAGE_KEY));
        let lang = match saved.as_deref().map(|code| (code, Lang::parse(code))) {
            Some((_, Some(lang))) => lang,
            Some((code, None)) => {
                debug!(target: "folio.language", code, "ignoring unsupported saved language");
                Lang::default()
            }
            None => Lang::default(),
        };
        Self {
            lang: Observable::new(lang),
            storage,
        }
    }

    #[must_use]
    pub fn lang(&self) -> Watch<Lang> {
        self.lang.watch()
    }

    #[must_use]
    pub fn current(&self) -> Lang {
        self.lang.get()
    }

    /// Switch language and persist the choice.
    ///
    /// A storage failure is logged; the in-memory change still applies.
    pub fn set_lang(&self, lang: Lang) {
        self.lang.set(lang);
        if let Some(storage) = &self.storage
            && let Err(err) = storage.set(STORAGE_KEY, lang.code())
        {
            warn!(target: "folio.language", %err, "failed to persist language");
        }
    }

    /// Advance de → en → ru → de. Returns the new language.
    pub fn cycle(&self) -> Lang {
        let next = self.current().next();
        self.set_lang(next);
        next
    }
}

impl fmt::Debug for LanguageService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LanguageService")
            .field("lang", &self.current())
            .field("persistent", &self.storage.is_some())
            .finish()
    }
}
