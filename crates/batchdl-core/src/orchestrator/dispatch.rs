//! Fan-out of items onto OS threads and the join barrier.
//!
//! Each thread receives the only `&mut` to its item, so item state needs no
//! locking. `std::thread::scope` joins every thread before returning.

use super::item::DownloadItem;
use crate::error::ItemError;
use crate::protocol::ProtocolRegistry;
use crate::storage::remove_partial;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Mutex, PoisonError};
use std::thread;

/// Runs every item to a terminal state. `max_concurrent = None` spawns one
/// thread per item; `Some(n)` runs a pool of `n` workers.
pub(crate) fn dispatch(
    items: &mut [DownloadItem],
    registry: &ProtocolRegistry,
    max_concurrent: Option<usize>,
) {
    match max_concurrent {
        Some(max) if max < items.len() => run_bounded(items, registry, max.max(1)),
        _ => run_unbounded(items, registry),
    }
}

/// One thread per item, no cap on in-flight transfers.
fn run_unbounded(items: &mut [DownloadItem], registry: &ProtocolRegistry) {
    let spawn_failures = thread::scope(|s| {
        let mut failures = Vec::new();
        for (index, item) in items.iter_mut().enumerate() {
            let spawned = thread::Builder::new()
                .name(format!("batchdl-item-{index}"))
                .spawn_scoped(s, move || run_item(item, registry));
            if let Err(e) = spawned {
                failures.push((index, e));
            }
        }
        failures
    });

    for (index, source) in spawn_failures {
        let item = &mut items[index];
        tracing::error!(url = item.source(), "could not spawn item thread: {}", source);
        let url = item.source().to_string();
        item.fail_unfinished(ItemError::Spawn { url, source });
    }
}

/// `workers` threads pulling the next unclaimed item from a shared iterator.
fn run_bounded(items: &mut [DownloadItem], registry: &ProtocolRegistry, workers: usize) {
    let queue = Mutex::new(items.iter_mut());
    let next = || queue.lock().unwrap_or_else(PoisonError::into_inner).next();

    thread::scope(|s| {
        let mut spawned = 0usize;
        for worker in 0..workers {
            let next = &next;
            let res = thread::Builder::new()
                .name(format!("batchdl-worker-{worker}"))
                .spawn_scoped(s, move || {
                    while let Some(item) = next() {
                        run_item(item, registry);
                    }
                });
            match res {
                Ok(_) => spawned += 1,
                Err(e) => tracing::warn!(worker, "could not spawn worker: {}", e),
            }
        }
        if spawned == 0 {
            tracing::warn!("no workers started; downloading on the calling thread");
            while let Some(item) = next() {
                run_item(item, registry);
            }
        }
    });
}

/// Drives one item to completion; a panic fails only this item.
fn run_item(item: &mut DownloadItem, registry: &ProtocolRegistry) {
    let result = panic::catch_unwind(AssertUnwindSafe(|| process_item(item, registry)));
    if result.is_err() {
        tracing::error!(url = item.source(), "item task panicked");
        let file = item.absolute_file_path();
        if let Err(e) = remove_partial(&file) {
            tracing::error!(path = %file.display(), "cleanup after panic failed: {}", e);
        }
        let url = item.source().to_string();
        item.fail_unfinished(ItemError::Panicked { url });
    }
}

fn process_item(item: &mut DownloadItem, registry: &ProtocolRegistry) {
    item.mark_dispatched();
    tracing::debug!(url = item.source(), "dispatched");

    let result = match registry.get(item.scheme()) {
        None => Err(ItemError::UnsupportedProtocol {
            scheme: item.scheme().to_string(),
            url: item.source().to_string(),
        }),
        Some(protocol) => protocol.fetch(item),
    };

    match &result {
        Ok(()) => tracing::info!(
            url = item.source(),
            path = %item.absolute_file_path().display(),
            "download succeeded"
        ),
        Err(e) => tracing::warn!(url = item.source(), "download failed: {}", e),
    }
    item.finish(result);
}
