//! Inbound packet handling and the reply-chain guard, driven through the
//! full service against the mock board.

use radionode::app::ports::SendStatus;
use radionode::app::service::NodeService;
use radionode::config::{MAX_SESSION_DEPTH_LIMIT, NodeConfig};
use radionode::error::{ConfigError, Error, ErrorFlag};
use radionode::irq::WakeFlag;

use crate::mock_hw::{MockHardware, to_node};

fn make_node(irq: &WakeFlag) -> NodeService<'_> {
    NodeService::new(NodeConfig::default(), irq).unwrap()
}

fn has(node: &NodeService<'_>, flag: ErrorFlag) -> bool {
    node.context().errors.has(flag)
}

// ── PING → PONG ───────────────────────────────────────────────

#[test]
fn ping_is_answered_with_pong() {
    let irq = WakeFlag::new();
    let mut node = make_node(&irq);
    let mut hw = MockHardware::new();
    node.context_mut().counters.last_received = 4;

    node.handle_packet(&mut hw, &[0x01, 0x05, 0x02, 0x7a]);

    let sent = hw.sent();
    assert_eq!(sent.len(), 1, "exactly one PONG");
    assert_eq!(sent[0][0], 0x01);
    assert_eq!(&sent[0][2..], &[0x03, 0x7a]);
    assert!(!has(&node, ErrorFlag::WrongCounter));
    assert_eq!(node.context().counters.last_received, 5);
    assert_eq!(node.context().session_depth, 0);
}

#[test]
fn several_pings_in_one_packet_each_get_a_pong() {
    let irq = WakeFlag::new();
    let mut node = make_node(&irq);
    let mut hw = MockHardware::new();

    node.handle_packet(&mut hw, &to_node(0, &[0x02, 0x10, 0x01, 0x02, 0x11]));

    let sent = hw.sent();
    assert_eq!(sent.len(), 2);
    assert_eq!(&sent[0][2..], &[0x03, 0x10]);
    assert_eq!(&sent[1][2..], &[0x03, 0x11]);
    // Outbound counter advances once per frame.
    assert_eq!(sent[0][1], 0);
    assert_eq!(sent[1][1], 1);
}

// ── Addressing and header checks ──────────────────────────────

#[test]
fn packet_for_other_device_is_ignored_for_every_opcode() {
    let irq = WakeFlag::new();
    let mut node = make_node(&irq);
    let mut hw = MockHardware::new();

    for op in 0..=u8::MAX {
        // Device 2, wrong version bits too: nothing may be flagged.
        node.handle_packet(&mut hw, &[0x22, 0x09, op, 0x01]);
    }

    assert!(hw.sent().is_empty());
    assert_eq!(node.context().errors.current(), 0);
    assert_eq!(node.context().counters.last_received, 0xff);
    assert_eq!(node.supervisor().countdown(), 0);
}

#[test]
fn broadcast_packet_is_accepted() {
    let irq = WakeFlag::new();
    let mut node = make_node(&irq);
    let mut hw = MockHardware::new();

    node.handle_packet(&mut hw, &[0x1f, 0x00, 0x02, 0x33]);

    let sent = hw.sent();
    assert_eq!(sent.len(), 1);
    // The reply carries the node's own id, not the broadcast id.
    assert_eq!(sent[0][0], 0x01);
    assert_eq!(&sent[0][2..], &[0x03, 0x33]);
}

#[test]
fn wrong_version_sets_only_the_version_flag() {
    let irq = WakeFlag::new();
    let mut node = make_node(&irq);
    let mut hw = MockHardware::new();

    // Version 1, device 1; counter is also wrong and a PING follows.
    node.handle_packet(&mut hw, &[0x21, 0x40, 0x02, 0x01]);

    assert_eq!(
        node.context().errors.current(),
        ErrorFlag::ProtoVersion.mask()
    );
    assert!(hw.sent().is_empty());
    assert_eq!(node.context().counters.last_received, 0xff);
}

#[test]
fn short_fragment_is_dropped_silently() {
    let irq = WakeFlag::new();
    let mut node = make_node(&irq);
    let mut hw = MockHardware::new();

    node.handle_packet(&mut hw, &[0x01, 0x00]);
    node.handle_packet(&mut hw, &[]);

    assert_eq!(node.context().errors.current(), 0);
    assert!(hw.sent().is_empty());
}

#[test]
fn counter_gap_flags_once_then_resyncs() {
    let irq = WakeFlag::new();
    let mut node = make_node(&irq);
    let mut hw = MockHardware::new();

    node.handle_packet(&mut hw, &to_node(7, &[0x01]));
    assert!(has(&node, ErrorFlag::WrongCounter));
    assert_eq!(node.context().counters.last_received, 7);

    node.context_mut().errors.rotate();
    node.handle_packet(&mut hw, &to_node(8, &[0x01]));
    assert!(!has(&node, ErrorFlag::WrongCounter));
}

#[test]
fn wrong_counter_still_processes_commands() {
    let irq = WakeFlag::new();
    let mut node = make_node(&irq);
    let mut hw = MockHardware::new();

    node.handle_packet(&mut hw, &to_node(99, &[0x02, 0x05]));

    assert!(has(&node, ErrorFlag::WrongCounter));
    assert_eq!(hw.sent().len(), 1);
}

// ── Command dispatch ──────────────────────────────────────────

#[test]
fn inbound_pong_is_flagged_and_parsing_continues() {
    let irq = WakeFlag::new();
    let mut node = make_node(&irq);
    let mut hw = MockHardware::new();

    node.handle_packet(&mut hw, &to_node(0, &[0x03, 0x01, 0x04, 0x05]));

    assert!(has(&node, ErrorFlag::UnexpectedCommand));
    assert_eq!(node.supervisor().countdown(), 5, "RESET after PONG applied");
    assert!(hw.sent().is_empty());
}

#[test]
fn unknown_opcode_aborts_rest_of_packet() {
    let irq = WakeFlag::new();
    let mut node = make_node(&irq);
    let mut hw = MockHardware::new();

    node.handle_packet(&mut hw, &to_node(0, &[0x01, 0x09, 0x02, 0x01]));

    assert!(has(&node, ErrorFlag::UnknownCommand));
    assert!(hw.sent().is_empty(), "PING after unknown opcode not executed");
}

#[test]
fn status_opcode_inbound_is_unknown() {
    let irq = WakeFlag::new();
    let mut node = make_node(&irq);
    let mut hw = MockHardware::new();

    node.handle_packet(&mut hw, &to_node(0, &[0x00, 0x00, 0x00]));

    assert!(has(&node, ErrorFlag::UnknownCommand));
}

#[test]
fn truncated_ping_stops_without_flag() {
    let irq = WakeFlag::new();
    let mut node = make_node(&irq);
    let mut hw = MockHardware::new();

    node.handle_packet(&mut hw, &to_node(0, &[0x01, 0x02]));

    assert!(hw.sent().is_empty());
    assert_eq!(node.context().errors.current(), 0);
}

#[test]
fn nop_only_packet_changes_nothing_but_the_counter() {
    let irq = WakeFlag::new();
    let mut node = make_node(&irq);
    let mut hw = MockHardware::new();

    node.handle_packet(&mut hw, &to_node(0, &[0x01, 0x01, 0x01]));

    assert_eq!(node.context().errors.current(), 0);
    assert_eq!(node.context().counters.last_received, 0);
    assert!(hw.calls.is_empty());
}

// ── Reply chain guard ─────────────────────────────────────────

#[test]
fn endless_ping_chain_is_cut_at_max_depth() {
    let irq = WakeFlag::new();
    let mut node = make_node(&irq);
    let mut counter: u8 = 0;
    let mut hw = MockHardware::with_peer(move |_frame| {
        let pkt = to_node(counter, &[0x02, 0xaa]);
        counter = counter.wrapping_add(1);
        Some(pkt)
    });

    node.exchange(&mut hw, radionode::proto::Command::Status, &[]);

    // STATUS at depth 1, PONG at depth 2, the next PONG is refused.
    assert_eq!(hw.sent().len(), 2);
    assert_eq!(hw.sent()[0][2], 0x00);
    assert_eq!(hw.sent()[1][2], 0x03);
    assert!(has(&node, ErrorFlag::CommDepth));
    assert!(!has(&node, ErrorFlag::WrongCounter));
    assert_eq!(node.context().session_depth, 0);
}

/// Peer that answers every frame with a PING, counters in sequence.
fn ping_chaining_peer() -> MockHardware {
    let mut counter: u8 = 0;
    MockHardware::with_peer(move |_frame| {
        let pkt = to_node(counter, &[0x02, 0x01]);
        counter = counter.wrapping_add(1);
        Some(pkt)
    })
}

#[test]
fn deepest_allowed_chain_is_still_cut() {
    let irq = WakeFlag::new();
    let config = NodeConfig {
        max_session_depth: MAX_SESSION_DEPTH_LIMIT,
        ..NodeConfig::default()
    };
    let mut node = NodeService::new(config, &irq).unwrap();
    let mut hw = ping_chaining_peer();

    node.exchange(&mut hw, radionode::proto::Command::Status, &[]);

    assert_eq!(hw.sent().len(), usize::from(MAX_SESSION_DEPTH_LIMIT));
    assert!(has(&node, ErrorFlag::CommDepth));
    assert_eq!(node.context().session_depth, 0);
}

#[test]
fn unbounded_session_depth_is_refused() {
    let irq = WakeFlag::new();
    let config = NodeConfig {
        max_session_depth: u8::MAX,
        ..NodeConfig::default()
    };
    assert!(matches!(
        NodeService::new(config, &irq),
        Err(Error::Config(ConfigError::SessionDepth))
    ));
}

#[test]
fn reply_with_no_commands_of_interest_ends_exchange() {
    let irq = WakeFlag::new();
    let mut node = make_node(&irq);
    let mut hw = MockHardware::with_peer(|_| Some(to_node(0, &[0x01])));

    node.exchange(&mut hw, radionode::proto::Command::Status, &[]);

    assert_eq!(hw.sent().len(), 1);
    assert_eq!(node.context().errors.current(), 0);
    assert_eq!(node.context().counters.last_received, 0);
}

// ── Delivery failures ─────────────────────────────────────────

#[test]
fn failed_send_sets_cant_deliver() {
    let irq = WakeFlag::new();
    let mut node = make_node(&irq);
    let mut hw = MockHardware::new();
    hw.send_outcomes.push_back(SendStatus::Failed);

    node.handle_packet(&mut hw, &to_node(0, &[0x02, 0x01]));

    assert_eq!(hw.sent().len(), 1);
    assert!(has(&node, ErrorFlag::CantDeliver));
}

#[test]
fn send_stuck_in_progress_gives_up_after_bounded_sleeps() {
    let irq = WakeFlag::new();
    let config = NodeConfig {
        send_sleep_limit: 3,
        ..NodeConfig::default()
    };
    let mut node = NodeService::new(config, &irq).unwrap();
    let mut hw = MockHardware::new();
    hw.send_outcomes.push_back(SendStatus::InProgress);

    node.handle_packet(&mut hw, &to_node(0, &[0x02, 0x01]));

    assert_eq!(hw.count(&crate::mock_hw::HwCall::Sleep), 3);
    assert!(has(&node, ErrorFlag::CantDeliver));
}
