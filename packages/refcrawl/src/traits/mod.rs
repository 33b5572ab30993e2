//! Capability traits the pipeline is written against.
//!
//! Every stage function takes trait objects, so any capability can be
//! swapped for a mock in tests or a different provider in production.

pub mod ai;
pub mod extractor;
pub mod fetcher;
pub mod locator;
pub mod store;

pub use ai::{Qualifier, ReferenceExtractor, TripletMiner};
pub use extractor::TextExtractor;
pub use fetcher::PaperFetcher;
pub use locator::PaperLocator;
pub use store::{ContentStore, DocumentStore, RecordStore, ReferenceStore};
