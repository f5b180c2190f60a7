//! Plan construction.
//!
//! 1. Scan every source into a [`SourceIndex`] (first seen wins)
//! 2. Scan the destination into a [`DestinationIndex`] (all kept)
//! 3. Resolve every record's canonical destination on the pool
//! 4. Classify:
//!    - destination fingerprint with several records: `Conflict`
//!    - single destination record away from its canonical path: `Move`
//!    - source fingerprint present in the destination: `Skip`
//!    - any other source record: `Move` or `Copy` per [`TransferMode`]
//! 5. Transfers that would land on the same path, or on a file that stays
//!    in the destination, are folded into one `Conflict` per path

use super::action::{Action, ConflictReason};
use super::config::{ReconcileConfig, TransferMode};
use super::index::{DestinationIndex, SourceIndex};
use super::plan::Plan;
use crate::core::media::MediaRecord;
use crate::core::pool::{CancellationToken, PoolError, WorkerPool};
use crate::core::scanner::Scanner;
use crate::error::{ReconcileError, Result, ScanError};
use crate::events::{Event, EventSender, Phase, PlanEvent, ScanRole};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Build the plan for `config`.
///
/// Cancellation at any point yields [`ReconcileError::Interrupted`].
pub fn build_plan(
    config: &ReconcileConfig,
    cancel: &CancellationToken,
    events: &EventSender,
) -> Result<Plan> {
    let pool = WorkerPool::new(config.pool(), cancel.clone());
    let scanner = Scanner::new(&pool, config.filter().clone(), config.no_sooc());
    let root = config.destination();

    let mut sources = SourceIndex::new();
    for source in config.sources() {
        let records = scanner
            .scan(source, ScanRole::Source, events)
            .map_err(|e| scan_failure(e, source, ScanRole::Source))?;
        for record in records {
            sources.insert(record);
        }
    }

    let destination: DestinationIndex = scanner
        .scan(root, ScanRole::Destination, events)
        .map_err(|e| scan_failure(e, root, ScanRole::Destination))?
        .into_iter()
        .collect();

    tracing::info!(
        sources = sources.len(),
        source_duplicates = sources.dropped().len(),
        destination = destination.record_count(),
        "Indexed media"
    );

    resolve_destinations(&pool, &sources, &destination, root, events)?;

    if cancel.is_cancelled() {
        return Err(ReconcileError::Interrupted);
    }

    let mut actions = destination_actions(&destination, root)?;
    let source_start = actions.len();
    actions.extend(source_actions(&sources, &destination, config.mode(), root));

    let mut plan = Plan::new(config.mode(), root);
    for action in fold_shared_targets(actions, source_start, &destination, root)? {
        plan.add_action(action);
    }
    plan.set_source_duplicates(sources.dropped().to_vec());

    let summary = plan.summary();
    tracing::info!(
        plan_id = %plan.id(),
        moves = summary.moves.len(),
        copies = summary.copies.len(),
        skips = summary.skips.len(),
        conflicts = summary.conflicts.len(),
        "Plan built"
    );
    events.send(Event::Plan(PlanEvent::Built { summary }));

    Ok(plan)
}

fn scan_failure(error: ScanError, root: &Path, role: ScanRole) -> ReconcileError {
    match (error, role) {
        (ScanError::Cancelled, _) => ReconcileError::Interrupted,
        (source, ScanRole::Source) => ReconcileError::ScanSource {
            root: root.to_path_buf(),
            source,
        },
        (source, ScanRole::Destination) => ReconcileError::ScanDestination {
            root: root.to_path_buf(),
            source,
        },
    }
}

/// Compute every record's destination so execution and classification
/// only ever read the memoized value.
fn resolve_destinations(
    pool: &WorkerPool,
    sources: &SourceIndex,
    destination: &DestinationIndex,
    root: &Path,
    events: &EventSender,
) -> Result<()> {
    let files = sources.len() + destination.record_count();
    events.send(Event::Plan(PlanEvent::Resolving { files }));
    tracing::info!(files, "Calculating destinations");

    let outcome = pool.run(
        Phase::Resolving,
        events,
        |queue| {
            let records = sources
                .iter()
                .map(|(_, record)| record)
                .chain(destination.iter().flat_map(|(_, records)| records.iter()));
            for record in records {
                if queue.enqueue(Arc::clone(record)).is_err() {
                    break;
                }
            }
            Ok(())
        },
        |record: Arc<MediaRecord>| record.destination_path(root).map(|_| ()),
    );

    match outcome {
        Ok(_) => Ok(()),
        Err(PoolError::Cancelled) => Err(ReconcileError::Interrupted),
        Err(PoolError::Failed(e)) => Err(ReconcileError::Resolve(e)),
    }
}

fn destination_actions(destination: &DestinationIndex, root: &Path) -> Result<Vec<Action>> {
    let mut actions = Vec::new();
    for (fingerprint, records) in destination.iter() {
        match records {
            [record] => {
                let canonical = record.destination_path(root)?;
                if canonical != record.path() {
                    tracing::debug!(
                        path = %record.path().display(),
                        canonical = %canonical.display(),
                        "Misplaced destination file"
                    );
                    actions.push(Action::Move {
                        record: Arc::clone(record),
                        root: root.to_path_buf(),
                    });
                }
            }
            _ => {
                tracing::warn!(
                    %fingerprint,
                    files = records.len(),
                    "Duplicate content in destination"
                );
                actions.push(Action::Conflict {
                    reason: ConflictReason::SharedContent,
                    records: records.to_vec(),
                });
            }
        }
    }
    Ok(actions)
}

fn source_actions(
    sources: &SourceIndex,
    destination: &DestinationIndex,
    mode: TransferMode,
    root: &Path,
) -> Vec<Action> {
    let root: PathBuf = root.to_path_buf();
    let mut actions = Vec::with_capacity(sources.len());
    for (fingerprint, record) in sources.iter() {
        let record = Arc::clone(record);
        let action = match destination.get(fingerprint).and_then(<[_]>::first) {
            Some(existing) => Action::Skip {
                source: record,
                existing: Arc::clone(existing),
            },
            None => match mode {
                TransferMode::Move => Action::Move {
                    record,
                    root: root.clone(),
                },
                TransferMode::Copy => Action::Copy {
                    record,
                    root: root.clone(),
                },
            },
        };
        actions.push(action);
    }
    actions
}

/// Replace transfers that share a target path with a single conflict.
///
/// A target is shared when two transfers resolve to it, or when a
/// destination file already sits there and is not moved away first.
/// Misplaced destination files move before any source action runs, so
/// they only free their old path for source transfers.
fn fold_shared_targets(
    actions: Vec<Action>,
    source_start: usize,
    destination: &DestinationIndex,
    root: &Path,
) -> Result<Vec<Action>> {
    let vacated: HashSet<PathBuf> = actions[..source_start]
        .iter()
        .filter_map(|action| match action {
            Action::Move { record, .. } => Some(record.path().to_path_buf()),
            _ => None,
        })
        .collect();

    let mut claims: BTreeMap<PathBuf, Vec<usize>> = BTreeMap::new();
    for (index, action) in actions.iter().enumerate() {
        if let Action::Move { record, .. } | Action::Copy { record, .. } = action {
            claims
                .entry(record.destination_path(root)?)
                .or_default()
                .push(index);
        }
    }

    let occupants: HashMap<&Path, &Arc<MediaRecord>> = destination
        .iter()
        .flat_map(|(_, records)| records.iter())
        .map(|record| (record.path(), record))
        .collect();

    let mut slots: Vec<Option<Action>> = actions.into_iter().map(Some).collect();
    for (target, claimants) in claims {
        let from_sources_only = claimants.iter().all(|&index| index >= source_start);
        let occupant = occupants
            .get(target.as_path())
            .filter(|occupant| !(from_sources_only && vacated.contains(occupant.path())));

        if claimants.len() < 2 && occupant.is_none() {
            continue;
        }

        let mut records: Vec<Arc<MediaRecord>> = occupant.map(|r| Arc::clone(*r)).into_iter().collect();
        for &index in &claimants {
            if let Some(Action::Move { record, .. } | Action::Copy { record, .. }) = slots[index].take() {
                records.push(record);
            }
        }

        tracing::warn!(
            path = %target.display(),
            files = records.len(),
            "Distinct files resolve to the same destination"
        );
        slots[claimants[0]] = Some(Action::Conflict {
            reason: ConflictReason::SameDestination(target),
            records,
        });
    }

    Ok(slots.into_iter().flatten().collect())
}
