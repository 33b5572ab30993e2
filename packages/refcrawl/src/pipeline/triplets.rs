//! Triplet mining stage: annotates documents with cause-effect triplets.
//!
//! An auxiliary pass over already-extracted text. Failures here are
//! reported but never change document status; the document simply stays
//! pending for the next run.

use tracing::{info, warn};

use crate::error::Result;
use crate::pipeline::BatchReport;
use crate::traits::ai::TripletMiner;
use crate::traits::store::{ContentStore, DocumentStore, RecordStore};
use crate::types::document::{Document, DocumentUpdate};
use crate::types::triplet::TripletGroup;

/// Mine triplets of the given group for up to `limit` pending documents.
pub async fn run_triplet_batch(
    group: TripletGroup,
    limit: usize,
    records: &dyn RecordStore,
    content: &dyn ContentStore,
    miner: &dyn TripletMiner,
) -> Result<BatchReport> {
    let batch = records.triplet_pending_documents(group, limit).await?;
    let mut report = BatchReport {
        attempted: batch.len(),
        ..Default::default()
    };

    for doc in batch {
        match mine_one(group, &doc, records, content, miner).await {
            Ok(count) => {
                info!(file_id = %doc.file_id, ?group, triplets = count, "triplets mined");
                report.record_success();
            }
            Err(e) => {
                warn!(file_id = %doc.file_id, ?group, error = %e, "triplet mining failed");
                report.record_failure(doc.file_id.as_str(), e);
            }
        }
    }

    Ok(report)
}

async fn mine_one(
    group: TripletGroup,
    doc: &Document,
    records: &dyn RecordStore,
    content: &dyn ContentStore,
    miner: &dyn TripletMiner,
) -> Result<usize> {
    let text = content.get_text(&doc.file_id).await?;

    let (update, count) = match group {
        TripletGroup::Basic => {
            let triplets = miner.mine_triplets(&text).await?;
            let count = triplets.len();
            (DocumentUpdate::new().with_triplets(triplets), count)
        }
        TripletGroup::Contextual => {
            let triplets = miner.mine_context_triplets(&text).await?;
            let count = triplets.len();
            (DocumentUpdate::new().with_context_triplets(triplets), count)
        }
    };

    records.update_document(doc.id, update).await?;
    Ok(count)
}
