//! Property tests for the Control node's credential handling and timing.

mod common;

use std::time::Duration;

use common::{fresh_control, provisioned_control, request};
use doorlock_core::Ticker;
use doorlock_link::SerialLink;
use doorlock_protocol::Command;
use proptest::prelude::*;

fn paused_runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .start_paused(true)
        .build()
        .unwrap()
}

fn digits() -> impl Strategy<Value = String> {
    "[0-9]{5}"
}

fn with_command(command: u8, payload: &str) -> Vec<u8> {
    let mut bytes = vec![command];
    bytes.extend_from_slice(payload.as_bytes());
    bytes
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_matching_entries_commit_and_verify(entry in digits()) {
        let (commit, verify) = paused_runtime().block_on(async {
            let (mut rig, mut interface) = fresh_control().await;
            request(&mut rig, &mut interface, &with_command(b'O', &entry)).await;
            request(&mut rig, &mut interface, &with_command(b'P', &entry)).await;
            let commit = request(&mut rig, &mut interface, b"A").await;
            let verify = request(&mut rig, &mut interface, &with_command(b'R', &entry)).await;
            (commit, verify)
        });

        prop_assert_eq!(commit, Some(b'S'));
        prop_assert_eq!(verify, Some(b'T'));
    }

    #[test]
    fn prop_different_entries_never_persist(first in digits(), second in digits()) {
        prop_assume!(first != second);

        let (reply, before, after) = paused_runtime().block_on(async {
            let (mut rig, mut interface) = provisioned_control("00000").await;
            let before = rig.eeprom.snapshot();
            request(&mut rig, &mut interface, &with_command(b'O', &first)).await;
            request(&mut rig, &mut interface, &with_command(b'P', &second)).await;
            let reply = request(&mut rig, &mut interface, b"A").await;
            (reply, before, rig.eeprom.snapshot())
        });

        prop_assert_eq!(reply, Some(b'D'));
        prop_assert_eq!(before, after);
    }

    #[test]
    fn prop_any_differing_digit_is_rejected(
        stored in digits(),
        position in 0usize..5,
        bump in 1u8..10,
    ) {
        let mut candidate = stored.clone().into_bytes();
        candidate[position] = b'0' + (candidate[position] - b'0' + bump) % 10;
        let candidate = String::from_utf8(candidate).unwrap();

        let reply = paused_runtime().block_on(async {
            let (mut rig, mut interface) = provisioned_control(&stored).await;
            request(&mut rig, &mut interface, &with_command(b'R', &candidate)).await
        });

        prop_assert_eq!(reply, Some(b'Y'));
    }

    #[test]
    fn prop_noise_bytes_are_ignored(
        noise in proptest::collection::vec(any::<u8>(), 0..32)
    ) {
        let noise: Vec<u8> = noise
            .into_iter()
            .filter(|&b| Command::parse(b).is_err())
            .collect();

        let (handled, replies, query) = paused_runtime().block_on(async {
            let (mut rig, mut interface) = fresh_control().await;
            let mut handled = Vec::new();
            for &byte in &noise {
                interface.send_byte(byte).await.unwrap();
                handled.push(rig.node.step().await.unwrap());
            }
            let replies = interface.try_recv_byte();
            let query = request(&mut rig, &mut interface, b"Q").await;
            (handled, replies, query)
        });

        prop_assert!(handled.iter().all(Option::is_none));
        prop_assert_eq!(replies, None);
        prop_assert_eq!(query, Some(b'E'));
    }

    #[test]
    fn prop_bounded_wait_ignores_stale_count(stale in any::<u32>(), ticks in 1u32..20) {
        let elapsed = paused_runtime().block_on(async {
            let ticker = Ticker::new(Duration::from_secs(1));
            ticker.counter().set(stale);

            let start = tokio::time::Instant::now();
            ticker.run_for(ticks).await;
            (tokio::time::Instant::now() - start, ticker.counter().get())
        });

        prop_assert_eq!(elapsed, (Duration::from_secs(u64::from(ticks)), 0));
    }
}
