// ABOUTME: Export aggregation: reads every collection from a store and assembles an ExportBundle.
// ABOUTME: Performs no file I/O; writing the bundle is the StorageManager's job.

use esm_core::{ExportBundle, now_micros};

use crate::error::StoreError;
use crate::store::RecordStore;

/// Build an export bundle from the current contents of `store`.
///
/// Each collection is read once. The three reads are not wrapped in a
/// cross-collection transaction, so an insert racing the export may appear
/// in one collection's list and not be reflected elsewhere. Any failed read
/// aborts the export; no partial bundle is returned.
pub fn build_export<S: RecordStore + ?Sized>(store: &S) -> Result<ExportBundle, StoreError> {
    let sentiments = store.list_sentiments()?;
    let locations = store.list_locations()?;
    let vlogs = store.list_vlogs()?;

    let bundle = ExportBundle::assemble(now_micros(), sentiments, locations, vlogs);
    tracing::info!(
        backend = %store.backend(),
        sentiments = bundle.summary.counts.sentiments,
        locations = bundle.summary.counts.locations,
        vlogs = bundle.summary.counts.vlogs,
        "built export bundle"
    );
    Ok(bundle)
}
