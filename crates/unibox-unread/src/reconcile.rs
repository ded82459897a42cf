// SPDX-FileCopyrightText: 2026 Unibox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-channel counting rules turning a raw batch into reconciled entries.
//!
//! SocialNetwork counters are cumulative and need the stored baseline
//! subtracted; Chat and Email counters already are unread counts.

use std::collections::HashMap;

use tracing::debug;
use unibox_core::{
    Channel, ConversationCounter, ConversationNotification, ReadStateKey, ReadStateStore,
    SnapshotBatch, UniboxError,
};

/// Entries and total computed from one batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Reconciled {
    pub entries: Vec<ConversationNotification>,
    pub total: u64,
}

impl Reconciled {
    fn from_entries(entries: Vec<ConversationNotification>) -> Self {
        let total = entries
            .iter()
            .fold(0u64, |acc, n| acc.saturating_add(n.derived_unread));
        Self { entries, total }
    }
}

fn notification(channel: Channel, counter: &ConversationCounter, baseline: u64) -> ConversationNotification {
    ConversationNotification {
        conversation_id: counter.conversation_id.clone(),
        channel,
        server_counter: counter.counter,
        baseline_counter: baseline,
        derived_unread: counter.counter.saturating_sub(baseline),
        participant: counter.participant.clone(),
        last_activity: counter.last_activity,
    }
}

/// One counter per conversation id. A repeated id keeps the position of its
/// first occurrence and the value of its last.
fn distinct(counters: &[ConversationCounter]) -> Vec<&ConversationCounter> {
    let mut positions: HashMap<&str, usize> = HashMap::with_capacity(counters.len());
    let mut out: Vec<&ConversationCounter> = Vec::with_capacity(counters.len());
    for counter in counters {
        match positions.get(counter.conversation_id.as_str()) {
            Some(&i) => out[i] = counter,
            None => {
                positions.insert(counter.conversation_id.as_str(), out.len());
                out.push(counter);
            }
        }
    }
    if out.len() < counters.len() {
        debug!(
            received = counters.len(),
            distinct = out.len(),
            "batch repeats conversation ids; last counter wins"
        );
    }
    out
}

/// Cumulative counters minus the last acknowledged counter.
///
/// Any store failure aborts the whole batch so a partial list never replaces
/// the previous one.
pub(crate) async fn social_network(
    batch: &SnapshotBatch,
    store: &dyn ReadStateStore,
) -> Result<Reconciled, UniboxError> {
    let counters = distinct(&batch.counters);
    let mut entries = Vec::with_capacity(counters.len());
    for counter in counters {
        let key = ReadStateKey::new(Channel::SocialNetwork, counter.conversation_id.as_str());
        let baseline = store.get(&key).await?.map(|b| b.counter).unwrap_or(0);
        entries.push(notification(Channel::SocialNetwork, counter, baseline));
    }
    Ok(Reconciled::from_entries(entries))
}

/// Server-reported unread counts.
///
/// With `zero_guard` set, an all-zero batch keeps the total implied by the
/// previous batch's raw counts; `previous_raw` is then replaced by this
/// batch's counts, so a second consecutive zero batch is accepted.
pub(crate) fn chat(
    batch: &SnapshotBatch,
    previous_raw: &mut HashMap<String, u64>,
    zero_guard: bool,
) -> Reconciled {
    let entries: Vec<_> = distinct(&batch.counters)
        .into_iter()
        .map(|c| notification(Channel::Chat, c, 0))
        .collect();
    let mut reconciled = Reconciled::from_entries(entries);

    if zero_guard && batch.raw_sum() == 0 {
        let fallback = previous_raw
            .values()
            .fold(0u64, |acc, v| acc.saturating_add(*v));
        if fallback > 0 {
            debug!(fallback, "chat batch reports no unread; keeping previous total");
        }
        reconciled.total = fallback;
    }

    *previous_raw = batch
        .counters
        .iter()
        .map(|c| (c.conversation_id.clone(), c.counter))
        .collect();
    reconciled
}

pub(crate) fn email(batch: &SnapshotBatch) -> Reconciled {
    Reconciled::from_entries(
        distinct(&batch.counters)
            .into_iter()
            .map(|c| notification(Channel::Email, c, 0))
            .collect(),
    )
}
