//! Core library for classmatch
//!
//! This crate implements the **Functional Core** of the classmatch application,
//! following the Functional Core - Imperative Shell architectural pattern.
//!
//! # Architecture Overview
//!
//! - **`classmatch_core`** (this crate): schedule reconstruction, normalization
//!   and reconciliation as pure functions over in-memory data
//! - **`classmatch`**: document loading, the token extractor, CSV input and
//!   terminal output (the Imperative Shell)
//!
//! The only I/O in this crate is [`config::ScheduleConfig::from_path`].
//!
//! # Pipeline
//!
//! ```text
//! ExtractedPage[]
//!   -> layout      weekday columns / sections -> lines per day
//!   -> extract     line -> segments -> RawEntry (grammar cascade)
//!   -> normalize   canonical class / trainer / location names
//!   -> assemble    validate + de-duplicate by identity key
//!   -> reconcile   ScheduleEntry[] vs AuthoritativeSchedule -> ComparisonResult[]
//!   -> align       per-day side-by-side rows
//! ```
//!
//! # Module Organization
//!
//! - [`model`]: weekdays, fragments, entries and comparison results
//! - [`time`]: class-time parsing and normalization
//! - [`cleanup`]: OCR text cleanup and key folding
//! - [`layout`]: per-day line reconstruction from positioned or flat pages
//! - [`extract`]: entry segmentation and the line grammars
//! - [`normalize`]: vocabulary, fuzzy lookup and class-name validity
//! - [`assemble`]: normalized, de-duplicated schedule entries
//! - [`pipeline`]: the end-to-end parse of a document
//! - [`reconcile`]: tolerant and strict reconciliation, summaries
//! - [`align`]: the alignment display model
//! - [`config`]: TOML configuration
//!
//! # Example Usage
//!
//! ```rust
//! use classmatch_core::normalize::Normalizer;
//! use classmatch_core::pipeline::{parse_text, ParseOptions};
//! use classmatch_core::reconcile::{reconcile, summarize, ReconcileOptions};
//! use classmatch_core::model::{group_by_day, ScheduleEntry, Weekday};
//!
//! let outcome = parse_text(
//!     "MONDAY\n7:15 AM Barre 57 - Anisha",
//!     Normalizer::builtin(),
//!     &ParseOptions::default(),
//! );
//! assert_eq!(outcome.entries[0].class_name, "Studio Barre 57");
//!
//! let authoritative = group_by_day(&[ScheduleEntry::new(
//!     Weekday::Monday,
//!     "7:15 AM",
//!     "Studio Barre 57",
//!     "Anisha Shah",
//!     "",
//! )]);
//! let results = reconcile(&outcome.entries, &authoritative, &ReconcileOptions::default());
//! assert_eq!(summarize(&results).matched, 1);
//! ```

pub mod align;
pub mod assemble;
pub mod cleanup;
pub mod config;
pub mod error;
pub mod extract;
pub mod layout;
pub mod model;
pub mod normalize;
pub mod pipeline;
pub mod reconcile;
pub mod time;

pub use error::ScheduleError;
