//! Quote catalog embedded in the firmware image
//!
//! The catalog is a JSON array of `{ "text": .., "author": .. }` records
//! compiled in from `assets/quotes.json`. Which record ends up on the panel is
//! decided by a [`Selection`] strategy, kept separate from the storage so the
//! rotation policy can change without touching the data.

use serde::Deserialize;
use time::Date;

use crate::error::{Error, Result};

pub const EMBEDDED_CATALOG: &str = include_str!("../assets/quotes.json");

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Quote {
    pub text: String,
    pub author: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Selection {
    /// Always the first record
    #[default]
    First,
    /// A different record every day of the year, wrapping around the catalog
    DayOfYear,
}

#[derive(Debug, Clone)]
pub struct QuoteCatalog {
    quotes: Vec<Quote>,
}

impl QuoteCatalog {
    /// Parse a JSON catalog. An empty array is rejected.
    pub fn decode(raw: &str) -> Result<Self> {
        let quotes: Vec<Quote> = serde_json::from_str(raw)?;
        if quotes.is_empty() {
            return Err(Error::EmptyCatalog);
        }
        Ok(Self { quotes })
    }

    /// The catalog compiled into the firmware, see [`load`].
    pub fn embedded() -> Option<Self> {
        load(EMBEDDED_CATALOG)
    }

    pub(crate) fn len(&self) -> usize {
        self.quotes.len()
    }

    pub fn get(&self, index: usize) -> Option<&Quote> {
        self.quotes.get(index)
    }

    /// Index picked by `selection`. Without a date every strategy falls back
    /// to the first record.
    pub fn index_for(&self, selection: Selection, date: Option<Date>) -> usize {
        match (selection, date) {
            (Selection::First, _) | (Selection::DayOfYear, None) => 0,
            (Selection::DayOfYear, Some(date)) => {
                usize::from(date.ordinal().saturating_sub(1)) % self.quotes.len()
            }
        }
    }

    pub fn select(&self, selection: Selection, date: Option<Date>) -> &Quote {
        &self.quotes[self.index_for(selection, date)]
    }
}

/// Decode a catalog, logging instead of failing. A missing catalog only
/// leaves the quote slot empty.
pub fn load(raw: &str) -> Option<QuoteCatalog> {
    match QuoteCatalog::decode(raw) {
        Ok(catalog) => {
            log::info!("Loaded {} quotes", catalog.len());
            Some(catalog)
        }
        Err(e) => {
            log::error!("Quote catalog decode failed: {}", e);
            None
        }
    }
}

/// Text of the first record, or `None` when the catalog cannot be decoded.
pub fn decode_one(raw: &str) -> Option<String> {
    load(raw).and_then(|catalog| catalog.get(0).map(|quote| quote.text.clone()))
}
