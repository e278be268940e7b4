//! Shared rigs for the node integration tests.
#![allow(dead_code)]

use doorlock_core::Credential;
use doorlock_emulator::{
    ControlConfig, ControlNode, HmiConfig, HmiState, HmiStateMachine, InterfaceNode,
    VirtualDisplay, VirtualDisplayHandle,
};
use doorlock_hardware::mock::{
    MockBuzzer, MockBuzzerHandle, MockEeprom, MockEepromHandle, MockKeypad, MockKeypadHandle,
    MockMotor, MockMotorHandle,
};
use doorlock_link::{MockLink, SerialLink};

pub type TestControlNode = ControlNode<MockLink, MockMotor, MockBuzzer, MockEeprom>;
pub type TestInterfaceNode = InterfaceNode<MockLink, MockKeypad, VirtualDisplay>;

pub fn credential(s: &str) -> Credential {
    s.parse().expect("test credential must be five digits")
}

/// A Control node on mock peripherals plus the handles that observe them.
pub struct ControlRig {
    pub node: TestControlNode,
    pub motor: MockMotorHandle,
    pub buzzer: MockBuzzerHandle,
    pub eeprom: MockEepromHandle,
}

pub async fn control_rig(link: MockLink, eeprom: MockEeprom, eeprom_handle: MockEepromHandle) -> ControlRig {
    let (motor, motor_handle) = MockMotor::new();
    let (buzzer, buzzer_handle) = MockBuzzer::new();
    let node = ControlNode::boot(link, motor, buzzer, eeprom, ControlConfig::default())
        .await
        .expect("control node boots on mock peripherals");

    ControlRig {
        node,
        motor: motor_handle,
        buzzer: buzzer_handle,
        eeprom: eeprom_handle,
    }
}

/// A Control node on a fresh EEPROM, with the interface end of the link.
pub async fn fresh_control() -> (ControlRig, MockLink) {
    let (interface_end, control_end) = MockLink::pair();
    let (eeprom, handle) = MockEeprom::new();
    (control_rig(control_end, eeprom, handle).await, interface_end)
}

/// A Control node whose EEPROM already holds `digits`.
pub async fn provisioned_control(digits: &str) -> (ControlRig, MockLink) {
    let (interface_end, control_end) = MockLink::pair();
    let (eeprom, handle) = MockEeprom::new();
    handle.poke(0, digits.as_bytes());
    handle.poke(0xDD, &[1]);
    (control_rig(control_end, eeprom, handle).await, interface_end)
}

/// Send `bytes`, let the node handle one command, and return its reply.
pub async fn request(rig: &mut ControlRig, interface: &mut MockLink, bytes: &[u8]) -> Option<u8> {
    for &byte in bytes {
        interface.send_byte(byte).await.expect("control end is open");
    }
    rig.node.step().await.expect("control node step succeeds");
    interface.try_recv_byte()
}

/// An Interface node on mock peripherals.
pub struct HmiRig {
    pub node: TestInterfaceNode,
    pub keys: MockKeypadHandle,
    pub screen: VirtualDisplayHandle,
}

pub fn hmi_rig(link: MockLink, state: HmiState) -> HmiRig {
    let config = HmiConfig::default();
    let (keypad, keys) = MockKeypad::new();
    let (display, screen) = VirtualDisplay::new(config.display_rows, config.display_columns);
    let machine = HmiStateMachine::builder().with_initial_state(state).build();

    HmiRig {
        node: InterfaceNode::with_machine(link, keypad, display, config, machine),
        keys,
        screen,
    }
}

/// Everything a scripted Control peer saw.
#[derive(Debug, Default)]
pub struct PeerLog {
    pub bytes: Vec<u8>,
    pub times: Vec<tokio::time::Instant>,
}

impl PeerLog {
    pub fn count(&self, byte: u8) -> usize {
        self.bytes.iter().filter(|&&b| b == byte).count()
    }

    /// Command bytes only, with payload digits stripped.
    pub fn commands(&self) -> Vec<u8> {
        self.bytes
            .iter()
            .copied()
            .filter(|b| b.is_ascii_uppercase())
            .collect()
    }
}

/// A scripted Control node: answers each reply-expecting command with the
/// next byte from `replies` and records everything until the link closes.
pub async fn scripted_control(mut link: MockLink, replies: Vec<u8>) -> PeerLog {
    let mut log = PeerLog::default();
    let mut replies = replies.into_iter();

    while let Ok(byte) = link.recv_byte().await {
        log.bytes.push(byte);
        log.times.push(tokio::time::Instant::now());

        let payload = matches!(byte, b'R' | b'O' | b'P');
        if payload {
            for _ in 0..5 {
                let Ok(digit) = link.recv_byte().await else {
                    return log;
                };
                log.bytes.push(digit);
                log.times.push(tokio::time::Instant::now());
            }
        }

        if matches!(byte, b'Q' | b'R' | b'A') {
            let Some(reply) = replies.next() else {
                return log;
            };
            if link.send_byte(reply).await.is_err() {
                return log;
            }
        }
    }
    log
}
