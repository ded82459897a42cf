// SPDX-FileCopyrightText: 2026 Unibox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mutable unread state guarded by the engine's state lock.

use std::collections::{BTreeMap, HashMap};

use unibox_core::{Channel, ConversationNotification, UnreadCounts, UnreadSnapshot};

use crate::reconcile::Reconciled;

/// Notification list and total for one channel.
#[derive(Debug, Default)]
pub(crate) struct ChannelState {
    pub entries: Vec<ConversationNotification>,
    pub total: u64,
}

impl ChannelState {
    fn entry_mut(&mut self, conversation_id: &str) -> Option<&mut ConversationNotification> {
        self.entries
            .iter_mut()
            .find(|n| n.conversation_id == conversation_id)
    }

    fn derived_sum(&self) -> u64 {
        self.entries
            .iter()
            .fold(0u64, |acc, n| acc.saturating_add(n.derived_unread))
    }
}

#[derive(Debug, Default)]
pub(crate) struct UnreadState {
    social_network: ChannelState,
    chat: ChannelState,
    email: ChannelState,
    /// Raw Chat counts from the most recent Chat batch, consulted by the zero guard.
    pub chat_raw_counts: HashMap<String, u64>,
    revision: u64,
}

impl UnreadState {
    pub fn channel(&self, channel: Channel) -> &ChannelState {
        match channel {
            Channel::SocialNetwork => &self.social_network,
            Channel::Chat => &self.chat,
            Channel::Email => &self.email,
        }
    }

    fn channel_mut(&mut self, channel: Channel) -> &mut ChannelState {
        match channel {
            Channel::SocialNetwork => &mut self.social_network,
            Channel::Chat => &mut self.chat,
            Channel::Email => &mut self.email,
        }
    }

    /// Replaces a channel's list and total wholesale.
    pub fn replace(&mut self, channel: Channel, reconciled: Reconciled) {
        let state = self.channel_mut(channel);
        state.entries = reconciled.entries;
        state.total = reconciled.total;
    }

    pub fn entry(&self, channel: Channel, conversation_id: &str) -> Option<&ConversationNotification> {
        self.channel(channel)
            .entries
            .iter()
            .find(|n| n.conversation_id == conversation_id)
    }

    /// Marks an entry acknowledged at `baseline_counter`. Returns the unread
    /// count it held, or `None` if the conversation is no longer listed.
    pub fn acknowledge(
        &mut self,
        channel: Channel,
        conversation_id: &str,
        baseline_counter: u64,
    ) -> Option<u64> {
        let entry = self.channel_mut(channel).entry_mut(conversation_id)?;
        let cleared = entry.derived_unread;
        entry.baseline_counter = baseline_counter;
        entry.derived_unread = 0;
        Some(cleared)
    }

    /// Sets a channel total to the sum of its entries' derived unread.
    pub fn recompute_total(&mut self, channel: Channel) {
        let state = self.channel_mut(channel);
        state.total = state.derived_sum();
    }

    pub fn set_total(&mut self, channel: Channel, total: u64) {
        self.channel_mut(channel).total = total;
    }

    pub fn counts(&self) -> UnreadCounts {
        let mut counts = UnreadCounts::default();
        for channel in Channel::ALL {
            counts.set(channel, self.channel(channel).total);
        }
        counts
    }

    /// Builds the next snapshot, bumping the revision.
    pub fn next_snapshot(&mut self) -> UnreadSnapshot {
        self.revision += 1;
        let notifications: BTreeMap<_, _> = Channel::ALL
            .into_iter()
            .map(|channel| (channel, self.channel(channel).entries.clone()))
            .collect();
        UnreadSnapshot::new(self.counts(), notifications, self.revision)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notification(id: &str, counter: u64, derived: u64) -> ConversationNotification {
        ConversationNotification {
            conversation_id: id.to_string(),
            channel: Channel::Email,
            server_counter: counter,
            baseline_counter: 0,
            derived_unread: derived,
            participant: None,
            last_activity: None,
        }
    }

    #[test]
    fn acknowledge_clears_only_the_target() {
        let mut state = UnreadState::default();
        state.replace(
            Channel::Email,
            Reconciled {
                entries: vec![notification("e9", 2, 2), notification("e10", 4, 4)],
                total: 6,
            },
        );

        assert_eq!(state.acknowledge(Channel::Email, "e9", 0), Some(2));
        state.recompute_total(Channel::Email);

        assert_eq!(state.channel(Channel::Email).total, 4);
        assert_eq!(state.entry(Channel::Email, "e10").unwrap().derived_unread, 4);
        assert_eq!(state.acknowledge(Channel::Email, "missing", 0), None);
    }

    #[test]
    fn snapshots_carry_increasing_revisions() {
        let mut state = UnreadState::default();
        state.set_total(Channel::Chat, 3);
        let first = state.next_snapshot();
        let second = state.next_snapshot();
        assert_eq!(first.combined(), 3);
        assert!(second.revision() > first.revision());
    }
}
