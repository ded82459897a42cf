// SPDX-FileCopyrightText: 2026 Unibox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Property tests: whatever sequence of batches and acknowledgements the
//! engine sees, published totals stay consistent.

use proptest::prelude::*;
use unibox_core::{Channel, UnreadSnapshot};
use unibox_test_utils::TestHarness;

#[derive(Debug, Clone)]
enum Op {
    Batch(Channel, Vec<(u8, u16)>),
    MarkRead(Channel, u8),
}

fn channel() -> impl Strategy<Value = Channel> {
    prop_oneof![
        Just(Channel::SocialNetwork),
        Just(Channel::Chat),
        Just(Channel::Email),
    ]
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (channel(), prop::collection::vec((0u8..6, 0u16..500), 0..6))
            .prop_map(|(c, counters)| Op::Batch(c, counters)),
        (channel(), 0u8..6).prop_map(|(c, id)| Op::MarkRead(c, id)),
    ]
}

fn check(snapshot: &UnreadSnapshot) -> Result<(), TestCaseError> {
    prop_assert_eq!(snapshot.combined(), snapshot.per_channel().sum());
    // Chat may carry a zero-guard fallback total, so only these two must
    // match their own lists.
    for channel in [Channel::SocialNetwork, Channel::Email] {
        let derived: u64 = snapshot
            .notifications(channel)
            .iter()
            .map(|n| n.derived_unread)
            .sum();
        prop_assert_eq!(snapshot.channel_total(channel), derived);
    }
    for channel in Channel::ALL {
        let mut ids: Vec<_> = snapshot
            .notifications(channel)
            .iter()
            .map(|n| n.conversation_id.as_str())
            .collect();
        let listed = ids.len();
        ids.sort_unstable();
        ids.dedup();
        prop_assert_eq!(ids.len(), listed);
    }
    for n in snapshot.notifications(Channel::SocialNetwork) {
        prop_assert_eq!(
            n.derived_unread,
            n.server_counter.saturating_sub(n.baseline_counter)
        );
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn totals_stay_consistent(ops in prop::collection::vec(op(), 1..20)) {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let harness = TestHarness::builder().in_memory().build().await.unwrap();
            let mut last_revision = 0;

            for op in ops {
                match op {
                    Op::Batch(channel, counters) => {
                        // Ids may repeat; the engine keeps one entry per id.
                        let counters: Vec<(String, u64)> = counters
                            .into_iter()
                            .map(|(id, n)| (format!("c{id}"), u64::from(n)))
                            .collect();
                        let pairs: Vec<(&str, u64)> =
                            counters.iter().map(|(id, n)| (id.as_str(), *n)).collect();
                        harness.apply(channel, &pairs).await.unwrap();
                    }
                    Op::MarkRead(channel, id) => {
                        harness.engine.mark_read(&format!("c{id}"), channel).await;
                    }
                }

                let snapshot = harness.engine.snapshot();
                check(&snapshot)?;
                prop_assert!(snapshot.revision() >= last_revision);
                last_revision = snapshot.revision();
            }
            Ok::<(), TestCaseError>(())
        })?;
    }

    #[test]
    fn acknowledged_social_network_conversation_reads_zero(counter in 0u64..10_000, later in 0u64..100) {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let harness = TestHarness::builder().in_memory().build().await.unwrap();
            harness.apply(Channel::SocialNetwork, &[("t1", counter)]).await.unwrap();
            harness.engine.mark_read("t1", Channel::SocialNetwork).await;
            prop_assert_eq!(harness.engine.snapshot().channel_total(Channel::SocialNetwork), 0);

            let snapshot = harness
                .apply(Channel::SocialNetwork, &[("t1", counter + later)])
                .await
                .unwrap();
            prop_assert_eq!(snapshot.channel_total(Channel::SocialNetwork), later);
            Ok::<(), TestCaseError>(())
        })?;
    }
}
