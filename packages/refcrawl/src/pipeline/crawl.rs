//! Crawl stage: `NewReference` -> `ProcessedReference`.
//!
//! Each reference is searched once and every candidate link attempted.
//! Download failures are logged on the reference and never fail it; only an
//! error from the search step itself moves a reference to
//! `FailedProcessing`.

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::pipeline::BatchReport;
use crate::traits::fetcher::PaperFetcher;
use crate::traits::locator::PaperLocator;
use crate::traits::store::{ContentStore, DocumentStore, RecordStore, ReferenceStore};
use crate::types::document::{file_id_for_url, NewDocument};
use crate::types::reference::{
    FailedDownload, Reference, ReferenceStatus, ReferenceUpdate,
};

/// Search and download candidates for up to `limit` new references.
pub async fn run_crawl_batch(
    limit: usize,
    records: &dyn RecordStore,
    content: &dyn ContentStore,
    locator: &dyn PaperLocator,
    fetcher: &dyn PaperFetcher,
) -> Result<BatchReport> {
    let batch = records
        .references_with_status(ReferenceStatus::NewReference, limit)
        .await?;
    let mut report = BatchReport {
        attempted: batch.len(),
        ..Default::default()
    };

    for reference in batch {
        match crawl_one(&reference, records, content, locator, fetcher).await {
            Ok(downloaded) => {
                info!(
                    reference = %reference.title,
                    downloaded,
                    "reference processed"
                );
                report.record_success();
            }
            Err(e) => {
                warn!(reference = %reference.title, error = %e, "reference search failed");
                records
                    .update_reference(reference.id, ReferenceUpdate::failed(e.to_string()))
                    .await?;
                report.record_failure(reference.full_reference_text.as_str(), e);
            }
        }
    }

    Ok(report)
}

async fn crawl_one(
    reference: &Reference,
    records: &dyn RecordStore,
    content: &dyn ContentStore,
    locator: &dyn PaperLocator,
    fetcher: &dyn PaperFetcher,
) -> Result<usize> {
    let hits = locator.locate(&reference.full_reference_text).await?;

    let mut downloaded = reference.downloaded_files.clone();
    let mut failures = reference.failed_downloads.clone();
    let mut new_downloads = 0;

    for hit in &hits {
        // A URL already tracked, by any reference, is never fetched again
        if records.find_by_source_url(&hit.url).await?.is_some() {
            debug!(url = %hit.url, "url already tracked, skipping");
            continue;
        }

        match fetcher.fetch_pdf(&hit.url).await {
            Ok(Some(bytes)) => {
                let file_id = file_id_for_url(&hit.url);
                content.put_pdf(&file_id, &bytes).await?;

                let mut new_doc = NewDocument::discovered(
                    file_id.as_str(),
                    reference.depth + 1,
                    hit.url.as_str(),
                    reference.id,
                );
                if let Some(title) = &hit.title {
                    new_doc = new_doc.with_title(title.as_str());
                }
                records.insert_document(new_doc).await?;

                downloaded.push(file_id);
                new_downloads += 1;
            }
            Ok(None) => {
                debug!(url = %hit.url, "candidate is not a pdf, skipping");
            }
            Err(e) => {
                warn!(url = %hit.url, error = %e, "candidate download failed");
                failures.push(FailedDownload {
                    url: hit.url.clone(),
                    error: e.to_string(),
                    failed_at: Utc::now(),
                });
            }
        }
    }

    // The reference is processed exactly once, download failures included
    records
        .update_reference(
            reference.id,
            ReferenceUpdate::new()
                .with_status(ReferenceStatus::ProcessedReference)
                .with_search_results(hits)
                .with_downloaded_files(downloaded)
                .with_failed_downloads(failures),
        )
        .await?;

    Ok(new_downloads)
}
