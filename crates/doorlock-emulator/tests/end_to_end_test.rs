//! Both nodes wired together over an in-memory link.

mod common;

use std::time::Duration;

use common::{control_rig, hmi_rig};
use doorlock_emulator::{
    ControlConfig, ControlNode, HmiConfig, HmiState, HmiStateMachine, InterfaceNode, MenuChoice,
    NodeError, VirtualDisplay,
};
use doorlock_hardware::MotorCommand;
use doorlock_hardware::mock::{MockBuzzer, MockEeprom, MockKeypad, MockMotor};
use doorlock_link::{MockLink, TimeoutLink};

#[tokio::test(start_paused = true)]
async fn test_provision_then_open() {
    let (hmi_end, control_end) = MockLink::pair();
    let (eeprom, eeprom_handle) = MockEeprom::new();
    let control = control_rig(control_end, eeprom, eeprom_handle).await;
    let hmi = hmi_rig(hmi_end, HmiState::Startup);

    hmi.keys.send_entry("12345").await.unwrap();
    hmi.keys.send_entry("12345").await.unwrap();
    hmi.keys.send_keys("+").await.unwrap();
    hmi.keys.send_entry("12345").await.unwrap();

    let (motor, eeprom, screen) = (control.motor, control.eeprom, hmi.screen);
    drop(hmi.keys);

    let mut control_node = control.node;
    let mut hmi_node = hmi.node;
    let control_task = async move { control_node.run().await };
    let hmi_task = async move {
        let result = hmi_node.run().await;
        (result, hmi_node.state())
    };
    let (control_result, (hmi_result, state)) = tokio::join!(control_task, hmi_task);

    assert!(control_result.unwrap_err().is_link_closed());
    assert!(matches!(hmi_result, Err(NodeError::Hardware(_))));
    assert_eq!(state, HmiState::Provisioned);

    assert_eq!(&eeprom.snapshot()[..5], b"12345");
    assert_eq!(eeprom.byte(0xDD), 1);

    let events = motor.events();
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
    assert_eq!(events[3].at - events[0].at, Duration::from_secs(33));
    assert_eq!(screen.count_written("IS LOCKING"), 1);
}

#[tokio::test(start_paused = true)]
async fn test_three_wrong_entries_sound_alarm() {
    let (hmi_end, control_end) = MockLink::pair();
    let (eeprom, eeprom_handle) = MockEeprom::new();
    eeprom_handle.poke(0, b"12345");
    eeprom_handle.poke(0xDD, &[1]);
    let control = control_rig(control_end, eeprom, eeprom_handle).await;
    let hmi = hmi_rig(hmi_end, HmiState::Startup);

    hmi.keys.send_keys("+").await.unwrap();
    for entry in ["11111", "12344", "21345"] {
        hmi.keys.send_entry(entry).await.unwrap();
    }

    let (motor, buzzer, screen) = (control.motor, control.buzzer, hmi.screen);
    drop(hmi.keys);

    let mut control_node = control.node;
    let mut hmi_node = hmi.node;
    let control_task = async move { control_node.run().await };
    let hmi_task = async move {
        let result = hmi_node.run().await;
        (result, hmi_node.state())
    };
    let (control_result, (_, state)) = tokio::join!(control_task, hmi_task);

    assert!(control_result.unwrap_err().is_link_closed());
    assert_eq!(state, HmiState::Provisioned);
    assert!(motor.events().is_empty());

    let events = buzzer.events();
    assert_eq!(buzzer.activations(), 1);
    assert_eq!(events.len(), 2);
    assert_eq!(events[1].at - events[0].at, Duration::from_secs(60));
    assert!(screen.count_written("UNAUTHORIZED") >= 60);
}

#[tokio::test(start_paused = true)]
async fn test_change_credential_round_trip() {
    let (hmi_end, control_end) = MockLink::pair();
    let (eeprom, eeprom_handle) = MockEeprom::new();
    eeprom_handle.poke(0, b"12345");
    eeprom_handle.poke(0xDD, &[1]);
    let control = control_rig(control_end, eeprom, eeprom_handle).await;
    let hmi = hmi_rig(hmi_end, HmiState::Startup);

    hmi.keys.send_keys("-").await.unwrap();
    hmi.keys.send_entry("12345").await.unwrap();
    hmi.keys.send_entry("67890").await.unwrap();
    hmi.keys.send_entry("67890").await.unwrap();

    let eeprom = control.eeprom;
    drop(hmi.keys);

    let mut control_node = control.node;
    let mut hmi_node = hmi.node;
    let control_task = async move { control_node.run().await };
    let hmi_task = async move {
        let _ = hmi_node.run().await;
        hmi_node
            .machine()
            .history()
            .iter()
            .map(|t| t.to)
            .collect::<Vec<_>>()
    };
    let (_, states) = tokio::join!(control_task, hmi_task);

    assert_eq!(
        states,
        vec![
            HmiState::Provisioned,
            HmiState::Unprovisioned,
            HmiState::Provisioned,
        ]
    );
    assert_eq!(&eeprom.snapshot()[..5], b"67890");
    assert_eq!(eeprom.byte(0xDD), 1);
}

#[tokio::test(start_paused = true)]
async fn test_slow_entry_opens_over_timed_link() {
    let timeout = Some(Duration::from_secs(10));
    let (hmi_end, control_end) = MockLink::pair();
    let (hmi_end, control_end) = (
        TimeoutLink::new(hmi_end, timeout),
        TimeoutLink::new(control_end, timeout),
    );

    let (eeprom, eeprom_handle) = MockEeprom::new();
    eeprom_handle.poke(0, b"12345");
    eeprom_handle.poke(0xDD, &[1]);
    let (motor, motor_handle) = MockMotor::new();
    let (buzzer, buzzer_handle) = MockBuzzer::new();
    let mut control =
        ControlNode::boot(control_end, motor, buzzer, eeprom, ControlConfig::default())
            .await
            .unwrap();

    let config = HmiConfig::default();
    let (keypad, keys) = MockKeypad::new();
    let (display, _screen) = VirtualDisplay::new(config.display_rows, config.display_columns);
    let machine = HmiStateMachine::builder()
        .with_initial_state(HmiState::Provisioned)
        .build();
    let mut hmi = InterfaceNode::with_machine(hmi_end, keypad, display, config, machine);

    let user = async move {
        keys.send_keys("+").await.unwrap();
        tokio::time::sleep(Duration::from_secs(12)).await;
        keys.send_entry("12345").await.unwrap();
    };
    let hmi_task = async move {
        assert_eq!(hmi.menu().await.unwrap(), MenuChoice::OpenDoor);
        let accepted = hmi.authenticate().await.unwrap();
        if accepted {
            hmi.open().await.unwrap();
        }
        accepted
    };
    let control_task = async move { control.run().await };
    let (control_result, accepted, ()) = tokio::join!(control_task, hmi_task, user);

    assert!(accepted);
    assert!(control_result.unwrap_err().is_link_closed());
    assert_eq!(
        motor_handle.commands(),
        vec![
            MotorCommand::FORWARD,
            MotorCommand::STOP,
            MotorCommand::REVERSE,
            MotorCommand::STOP,
        ]
    );
    assert_eq!(buzzer_handle.activations(), 0);
}
