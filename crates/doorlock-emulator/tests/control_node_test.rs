//! Control node behaviour driven byte by byte from the interface end.

mod common;

use std::time::Duration;

use common::{ControlRig, control_rig, fresh_control, provisioned_control, request};
use doorlock_emulator::ControlNode;
use doorlock_hardware::MotorCommand;
use doorlock_hardware::mock::{MockBuzzer, MockEeprom, MockMotor};
use doorlock_link::{LinkExt, MockLink, SerialLink, TimeoutLink};
use doorlock_protocol::Command;
use rstest::rstest;

async fn stage_and_commit(
    rig: &mut ControlRig,
    interface: &mut MockLink,
    first: &[u8],
    second: &[u8],
) -> Option<u8> {
    let mut slot_a = vec![b'O'];
    slot_a.extend_from_slice(first);
    assert_eq!(request(rig, interface, &slot_a).await, None);

    let mut slot_b = vec![b'P'];
    slot_b.extend_from_slice(second);
    assert_eq!(request(rig, interface, &slot_b).await, None);

    request(rig, interface, b"A").await
}

#[tokio::test(start_paused = true)]
async fn test_fresh_node_reports_not_set() {
    let (mut rig, mut interface) = fresh_control().await;

    assert_eq!(request(&mut rig, &mut interface, b"Q").await, Some(b'E'));
    assert_eq!(rig.eeprom.byte(0xDD), 0);
}

#[tokio::test(start_paused = true)]
async fn test_commit_matching_entries_sets_credential() {
    let (mut rig, mut interface) = fresh_control().await;

    let reply = stage_and_commit(&mut rig, &mut interface, b"12345", b"12345").await;
    assert_eq!(reply, Some(b'S'));

    assert_eq!(&rig.eeprom.snapshot()[..5], b"12345");
    assert_eq!(rig.eeprom.byte(0xDD), 1);
    assert_eq!(request(&mut rig, &mut interface, b"Q").await, Some(b'W'));
}

#[tokio::test(start_paused = true)]
async fn test_commit_mismatch_leaves_store_untouched() {
    let (mut rig, mut interface) = provisioned_control("24680").await;
    let before = rig.eeprom.snapshot();
    let writes = rig.eeprom.write_count();

    let reply = stage_and_commit(&mut rig, &mut interface, b"11111", b"11112").await;

    assert_eq!(reply, Some(b'D'));
    assert_eq!(rig.eeprom.snapshot(), before);
    assert_eq!(rig.eeprom.write_count(), writes);
    assert_eq!(request(&mut rig, &mut interface, b"R24680").await, Some(b'T'));
}

#[tokio::test(start_paused = true)]
async fn test_commit_without_staging_is_unmatched() {
    let (mut rig, mut interface) = fresh_control().await;

    assert_eq!(request(&mut rig, &mut interface, b"A").await, Some(b'D'));
}

#[tokio::test(start_paused = true)]
async fn test_commit_empties_both_slots() {
    let (mut rig, mut interface) = fresh_control().await;

    let reply = stage_and_commit(&mut rig, &mut interface, b"55555", b"55555").await;
    assert_eq!(reply, Some(b'S'));

    // Nothing staged since the last commit.
    assert_eq!(request(&mut rig, &mut interface, b"A").await, Some(b'D'));
}

#[tokio::test(start_paused = true)]
async fn test_restaging_overwrites_slot() {
    let (mut rig, mut interface) = fresh_control().await;

    assert_eq!(request(&mut rig, &mut interface, b"O99999").await, None);
    let reply = stage_and_commit(&mut rig, &mut interface, b"13579", b"13579").await;

    assert_eq!(reply, Some(b'S'));
    assert_eq!(&rig.eeprom.snapshot()[..5], b"13579");
}

#[tokio::test(start_paused = true)]
async fn test_non_digit_stage_never_commits() {
    let (mut rig, mut interface) = fresh_control().await;

    let reply = stage_and_commit(&mut rig, &mut interface, b"12a45", b"12a45").await;

    assert_eq!(reply, Some(b'D'));
    assert_eq!(rig.eeprom.byte(0xDD), 0);
}

#[rstest]
#[case::exact(b"12345", b'T')]
#[case::first_digit(b"02345", b'Y')]
#[case::last_digit(b"12346", b'Y')]
#[case::reversed(b"54321", b'Y')]
#[case::non_digit(b"1234=", b'Y')]
#[tokio::test(start_paused = true)]
async fn test_verify_reply(#[case] entry: &[u8; 5], #[case] expected: u8) {
    let (mut rig, mut interface) = provisioned_control("12345").await;

    let mut bytes = vec![b'R'];
    bytes.extend_from_slice(entry);

    assert_eq!(request(&mut rig, &mut interface, &bytes).await, Some(expected));
}

#[tokio::test(start_paused = true)]
async fn test_verify_without_credential_is_incorrect() {
    let (mut rig, mut interface) = fresh_control().await;

    // An erased part reads 0xFF, never a valid credential.
    assert_eq!(request(&mut rig, &mut interface, b"R00000").await, Some(b'Y'));
}

#[tokio::test(start_paused = true)]
async fn test_unknown_byte_is_ignored() {
    let (mut rig, mut interface) = fresh_control().await;

    interface.send_byte(b'Z').await.unwrap();
    assert_eq!(rig.node.step().await.unwrap(), None);
    assert_eq!(interface.try_recv_byte(), None);

    interface.send_byte(b'Q').await.unwrap();
    assert_eq!(
        rig.node.step().await.unwrap(),
        Some(Command::QueryCredentialSet)
    );
    assert_eq!(interface.try_recv_byte(), Some(b'E'));
}

#[tokio::test(start_paused = true)]
async fn test_open_runs_phases_on_tick_targets() {
    let (mut rig, mut interface) = provisioned_control("12345").await;

    // A counter left high by an earlier wait must not shorten the first phase.
    rig.node.tick_counter().set(40);

    let start = tokio::time::Instant::now();
    interface.send_byte(b'U').await.unwrap();
    assert_eq!(rig.node.step().await.unwrap(), Some(Command::ActuateOpen));

    let events = rig.motor.events();
    let commands: Vec<MotorCommand> = events.iter().map(|e| e.command).collect();
    assert_eq!(
        commands,
        vec![
            MotorCommand::FORWARD,
            MotorCommand::STOP,
            MotorCommand::REVERSE,
            MotorCommand::STOP,
        ]
    );

    let offsets: Vec<Duration> = events.iter().map(|e| e.at - start).collect();
    assert_eq!(
        offsets,
        vec![
            Duration::ZERO,
            Duration::from_secs(15),
            Duration::from_secs(18),
            Duration::from_secs(33),
        ]
    );
    assert_eq!(interface.try_recv_byte(), None);
}

#[tokio::test(start_paused = true)]
async fn test_alarm_sounds_for_sixty_ticks() {
    let (mut rig, mut interface) = provisioned_control("12345").await;

    interface.send_byte(b'I').await.unwrap();
    assert_eq!(rig.node.step().await.unwrap(), Some(Command::ActuateAlarm));

    let events = rig.buzzer.events();
    assert_eq!(events.len(), 2);
    assert!(events[0].active);
    assert!(!events[1].active);
    assert_eq!(events[1].at - events[0].at, Duration::from_secs(60));
    assert!(!rig.buzzer.is_active());
    assert_eq!(interface.try_recv_byte(), None);
}

#[tokio::test(start_paused = true)]
async fn test_commands_queue_behind_door_sequence() {
    let (mut rig, mut interface) = provisioned_control("12345").await;

    interface.send_byte(b'U').await.unwrap();
    interface.send_byte(b'Q').await.unwrap();

    assert_eq!(rig.node.step().await.unwrap(), Some(Command::ActuateOpen));
    assert_eq!(interface.try_recv_byte(), None);

    assert_eq!(
        rig.node.step().await.unwrap(),
        Some(Command::QueryCredentialSet)
    );
    assert_eq!(interface.try_recv_byte(), Some(b'W'));
}

#[tokio::test(start_paused = true)]
async fn test_credential_survives_reboot() {
    let (mut rig, mut interface) = fresh_control().await;
    let reply = stage_and_commit(&mut rig, &mut interface, b"86420", b"86420").await;
    assert_eq!(reply, Some(b'S'));

    let eeprom = rig.eeprom.reboot();
    let handle = rig.eeprom.clone();
    drop(rig);

    let (mut interface, control_end) = MockLink::pair();
    let mut rig = control_rig(control_end, eeprom, handle).await;

    assert_eq!(request(&mut rig, &mut interface, b"Q").await, Some(b'W'));
    assert_eq!(request(&mut rig, &mut interface, b"R86420").await, Some(b'T'));
}

#[tokio::test(start_paused = true)]
async fn test_power_cut_mid_commit_leaves_flag_clear() {
    let (mut rig, mut interface) = fresh_control().await;
    // Flag clear, then two of the five digits.
    rig.eeprom.cut_power_after(3);

    assert_eq!(request(&mut rig, &mut interface, b"O12345").await, None);
    assert_eq!(request(&mut rig, &mut interface, b"P12345").await, None);
    interface.send_byte(b'A').await.unwrap();
    assert!(rig.node.step().await.is_err());
    // Matched goes out before the write is attempted.
    assert_eq!(interface.try_recv_byte(), Some(b'S'));

    let eeprom = rig.eeprom.reboot();
    let handle = rig.eeprom.clone();
    drop(rig);

    let (mut interface, control_end) = MockLink::pair();
    let mut rig = control_rig(control_end, eeprom, handle).await;
    assert_eq!(request(&mut rig, &mut interface, b"Q").await, Some(b'E'));
}

#[tokio::test(start_paused = true)]
async fn test_run_ends_when_interface_hangs_up() {
    let (mut interface, control_end) = MockLink::pair();
    let (motor, _motor) = MockMotor::new();
    let (buzzer, _buzzer) = MockBuzzer::new();
    let (eeprom, _eeprom) = doorlock_hardware::mock::MockEeprom::new();
    let mut node = ControlNode::boot(
        control_end,
        motor,
        buzzer,
        eeprom,
        Default::default(),
    )
    .await
    .unwrap();

    interface.send_byte(b'Q').await.unwrap();
    let control = async move { node.run().await };
    let hangup = async move {
        assert_eq!(interface.recv_byte().await.unwrap(), b'E');
        drop(interface);
    };

    let (result, ()) = tokio::join!(control, hangup);
    assert!(result.unwrap_err().is_link_closed());
}

async fn timed_control(
    timeout: Duration,
    stored: Option<&str>,
) -> (
    ControlNode<TimeoutLink<MockLink>, MockMotor, MockBuzzer, MockEeprom>,
    MockLink,
) {
    let (interface, control_end) = MockLink::pair();
    let (motor, _) = MockMotor::new();
    let (buzzer, _) = MockBuzzer::new();
    let (eeprom, handle) = MockEeprom::new();
    if let Some(digits) = stored {
        handle.poke(0, digits.as_bytes());
        handle.poke(0xDD, &[1]);
    }
    let link = TimeoutLink::new(control_end, Some(timeout));
    let node = ControlNode::boot(link, motor, buzzer, eeprom, Default::default())
        .await
        .unwrap();
    (node, interface)
}

#[tokio::test(start_paused = true)]
async fn test_verify_waits_past_timeout_for_first_digit() {
    let (mut node, mut interface) = timed_control(Duration::from_secs(10), Some("12345")).await;
    interface.send_byte(b'R').await.unwrap();

    let typist = async {
        tokio::time::sleep(Duration::from_secs(12)).await;
        for &digit in b"12345" {
            interface.send_byte(digit).await.unwrap();
        }
    };
    let (handled, ()) = tokio::join!(node.step(), typist);

    assert_eq!(handled.unwrap(), Some(Command::BeginVerify));
    assert_eq!(interface.try_recv_byte(), Some(b'T'));
}

#[tokio::test(start_paused = true)]
async fn test_stalled_stage_clears_slot() {
    let (mut node, mut interface) = timed_control(Duration::from_secs(1), None).await;

    for bytes in [&b"O12345"[..], b"P12345"] {
        for &byte in bytes {
            interface.send_byte(byte).await.unwrap();
        }
        node.step().await.unwrap();
    }

    // Slot A restaged with two digits and then silence.
    for &byte in b"O12" {
        interface.send_byte(byte).await.unwrap();
    }
    assert_eq!(node.step().await.unwrap(), Some(Command::StageSlotA));

    interface.send_command(Command::CommitIfMatched).await.unwrap();
    assert_eq!(node.step().await.unwrap(), Some(Command::CommitIfMatched));
    assert_eq!(interface.try_recv_byte(), Some(b'D'));
}
