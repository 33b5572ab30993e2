//! Domain types for the reference crawler.
//!
//! - [`document`] - Tracked paper instances and their lifecycle status
//! - [`reference`] - Citations extracted from documents, pending their own crawl
//! - [`qualification`] - Topic relevance verdicts
//! - [`triplet`] - Cause-effect relations mined from paper text

pub mod document;
pub mod qualification;
pub mod reference;
pub mod triplet;
