//! Resolve a batch of resources across worker threads and write them to disk.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

use dimlight_core::{ResourceId, Resources, encode_resolved};
use tracing::{error, info};

use crate::error::DemoError;

/// Outcome of a single resource in a batch.
#[derive(Debug)]
pub struct BatchItem {
    pub id: ResourceId,
    pub result: Result<PathBuf, DemoError>,
}

/// Resolve every id through `resources` using up to `jobs` threads and write
/// each encoded result to `out_dir/<stem>.<ext>`.
///
/// Results come back in input order. Ids may repeat; repeats are served from
/// the provider's cache.
pub fn export_all(
    resources: &dyn Resources,
    ids: &[ResourceId],
    out_dir: &Path,
    jobs: usize,
) -> Vec<BatchItem> {
    let jobs = jobs.clamp(1, ids.len().max(1));
    let next = AtomicUsize::new(0);

    let mut items: Vec<(usize, BatchItem)> = thread::scope(|s| {
        let workers: Vec<_> = (0..jobs)
            .map(|_| {
                s.spawn(|| {
                    let mut done = Vec::new();
                    loop {
                        let index = next.fetch_add(1, Ordering::Relaxed);
                        let Some(id) = ids.get(index) else { break };
                        let result = export_one(resources, id, out_dir);
                        done.push((index, BatchItem { id: id.clone(), result }));
                    }
                    done
                })
            })
            .collect();

        workers
            .into_iter()
            .flat_map(|w| w.join().unwrap_or_else(|panic| std::panic::resume_unwind(panic)))
            .collect()
    });

    items.sort_by_key(|(index, _)| *index);
    items.into_iter().map(|(_, item)| item).collect()
}

fn export_one(
    resources: &dyn Resources,
    id: &ResourceId,
    out_dir: &Path,
) -> Result<PathBuf, DemoError> {
    let image = resources.resolve(id)?;
    let bytes = encode_resolved(id, &image)?;

    let path = out_dir.join(format!("{}.{}", id.file_stem(), image.format().extension()));
    std::fs::write(&path, bytes).map_err(|source| DemoError::Write {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}

/// Log each outcome and fail if any item failed.
pub fn report(items: &[BatchItem]) -> Result<(), DemoError> {
    let mut failed = 0;
    for item in items {
        match &item.result {
            Ok(path) => info!(id = %item.id, path = %path.display(), "wrote resource"),
            Err(e) => {
                failed += 1;
                error!(id = %item.id, error = %e, "failed to export resource");
            }
        }
    }
    if failed > 0 {
        return Err(DemoError::Unresolved {
            failed,
            total: items.len(),
        });
    }
    Ok(())
}
