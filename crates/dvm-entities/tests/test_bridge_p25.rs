mod common;

use std::time::Duration;

use dvm_config::TxMode;
use dvm_core::{CallChannel, PCM_BLOCK_SAMPLES, debug};
use dvm_entities::network::NetFunc;
use dvm_pdus::p25::dfsi::LduContext;
use dvm_pdus::p25::enums::duid::Duid;
use dvm_pdus::p25::ldu::{LduBuffer, assemble_ldu, assemble_tdu, decode_message};
use dvm_pdus::p25::{IMBE_PER_LDU, LC_PRIVATE};

use common::{BridgeTest, CallEvent, LOUD, QUIET, default_test_config};

fn ldu_message(duid: Duid, first: u8, ctx: &LduContext) -> Vec<u8> {
    let mut ldu = LduBuffer::new();
    for slot in 0..IMBE_PER_LDU {
        ldu.set_imbe(slot, &[first + slot as u8; 11]);
    }
    assemble_ldu(duid, &ldu, ctx).unwrap().to_vec()
}

#[test]
fn test_ldu_sequence() {
    debug::setup_logging_verbose();
    let mut t = BridgeTest::new(default_test_config(TxMode::P25));
    t.feed_blocks(LOUD, 8);
    assert!(t.take_sent().is_empty());
    t.feed_blocks(LOUD, 10);

    let sent = t.take_sent();
    assert_eq!(sent.len(), 2);
    assert!(sent.iter().all(|p| p.func == NetFunc::P25));
    assert_eq!(sent[0].pkt_seq, 0);
    assert_eq!(sent[1].pkt_seq, 1);

    let (hdr, ldu) = decode_message(&sent[0].payload).unwrap();
    assert_eq!(hdr.duid, Duid::Ldu1);
    assert_eq!((hdr.src_id, hdr.dst_id), (1001, 9));
    let ldu = ldu.unwrap();
    for slot in 0..IMBE_PER_LDU {
        assert_eq!(ldu.imbe(slot), [slot as u8 + 1; 11]);
    }

    let (hdr, ldu) = decode_message(&sent[1].payload).unwrap();
    assert_eq!(hdr.duid, Duid::Ldu2);
    assert_eq!(ldu.unwrap().imbe(8), [18; 11]);
    assert_eq!(t.entity.sequencer().p25_state().p25_n(), 0);
}

#[test]
fn test_grant_demand_then_tdu() {
    debug::setup_logging_verbose();
    let mut cfg = default_test_config(TxMode::P25);
    cfg.call.grant_demand = true;
    let mut t = BridgeTest::new(cfg);
    t.feed_blocks(LOUD, 2);
    t.feed_blocks(QUIET, 13);

    let sent = t.take_sent();
    let duids: Vec<Duid> = sent.iter().map(|p| decode_message(&p.payload).unwrap().0.duid).collect();
    assert_eq!(duids, vec![Duid::Tdu, Duid::Ldu1, Duid::Tdu]);
    assert_eq!(sent[0].payload[14] & 0x80, 0x80);
    assert_eq!(sent[2].payload[14] & 0x80, 0);
    assert!(sent.iter().all(|p| p.pkt_seq == 0));
    assert_eq!(sent[0].stream_id, sent[2].stream_id);

    let events = t.take_events();
    assert_eq!(events.len(), 2);
    assert_eq!(t.entity.sequencer().p25_state().seq_no(), 0);
}

#[test]
fn test_rx_ldu_plays_audio() {
    debug::setup_logging_verbose();
    let mut t = BridgeTest::new(default_test_config(TxMode::P25));
    let ctx = LduContext::group(3100, 9);

    t.receive(NetFunc::P25, 42, ldu_message(Duid::Ldu1, 1, &ctx));
    t.receive(NetFunc::P25, 42, ldu_message(Duid::Ldu2, 10, &ctx));
    assert!(t.entity.tracker().status(CallChannel::P25).rx_in_progress());

    let played = t.take_played();
    assert_eq!(played.len(), 18);
    for (i, block) in played.iter().enumerate() {
        assert_eq!(block.samples, vec![i as i16 + 1; PCM_BLOCK_SAMPLES]);
        assert_eq!((block.src_id, block.dst_id), (3100, 9));
    }

    t.advance(Duration::from_millis(360));
    t.receive(NetFunc::P25, 42, assemble_tdu(3100, 9, false).to_vec());
    let events = t.take_events();
    assert_eq!(events.len(), 2);
    assert!(matches!(events[0], CallEvent::Start(info) if info.stream_id == 42 && info.channel == CallChannel::P25));
    assert!(matches!(events[1], CallEvent::End(_, d) if d == Duration::from_millis(360)));
    assert!(!t.entity.tracker().any_active());
}

#[test]
fn test_rx_call_holds_keyed_tx() {
    debug::setup_logging_verbose();
    let mut t = BridgeTest::new(default_test_config(TxMode::P25));
    t.feed_blocks(LOUD, 5);
    let stream_id = t.entity.sequencer().stream_id();
    assert_ne!(stream_id, 0);
    assert_eq!(t.entity.sequencer().p25_state().p25_n(), 5);

    let ctx = LduContext::group(3100, 9);
    t.receive(NetFunc::P25, 42, ldu_message(Duid::Ldu1, 1, &ctx));
    assert!(t.entity.tracker().any_active());

    t.feed_blocks(LOUD, 20);
    assert!(t.take_sent().is_empty());
    assert_eq!(t.entity.sequencer().stream_id(), stream_id);
    assert_eq!(t.entity.sequencer().p25_state().p25_n(), 5);

    t.receive(NetFunc::P25, 42, assemble_tdu(3100, 9, false).to_vec());
    assert!(!t.entity.tracker().any_active());
    t.feed_blocks(LOUD, 4);

    let sent = t.take_sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].stream_id, stream_id);
    let (hdr, ldu) = decode_message(&sent[0].payload).unwrap();
    assert_eq!(hdr.duid, Duid::Ldu1);
    assert_eq!(hdr.src_id, 1001);
    // Codewords encoded after the RX call continue the LDU where it stopped
    assert_eq!(ldu.unwrap().imbe(5), [6; 11]);
}

#[test]
fn test_rx_record_tag_mismatch_dropped() {
    debug::setup_logging_verbose();
    let mut t = BridgeTest::new(default_test_config(TxMode::P25));
    let mut message = ldu_message(Duid::Ldu1, 1, &LduContext::group(3100, 9));
    message[24] = 0x6B;
    t.receive(NetFunc::P25, 42, message);

    assert!(t.take_events().is_empty());
    assert!(t.take_played().is_empty());
    assert_eq!(t.entity.tracker().status(CallChannel::P25).rx_stream_id, 0);
}

#[test]
fn test_rx_private_and_anonymous_dropped() {
    debug::setup_logging_verbose();
    let mut t = BridgeTest::new(default_test_config(TxMode::P25));
    let private = LduContext {
        lco: LC_PRIVATE,
        ..LduContext::group(3100, 9)
    };
    t.receive(NetFunc::P25, 42, ldu_message(Duid::Ldu1, 1, &private));
    t.receive(NetFunc::P25, 43, ldu_message(Duid::Ldu1, 1, &LduContext::group(0, 9)));
    t.receive(NetFunc::P25, 44, ldu_message(Duid::Ldu1, 1, &LduContext::group(3100, 10)));

    assert!(t.take_events().is_empty());
    assert!(t.take_played().is_empty());
}

#[test]
fn test_watchdog_idempotent() {
    debug::setup_logging_verbose();
    let mut t = BridgeTest::new(default_test_config(TxMode::P25));
    t.entity.watchdog(t.now);
    t.entity.watchdog(t.now + Duration::from_secs(10));
    assert!(t.take_sent().is_empty());
    assert!(t.take_events().is_empty());

    t.feed_blocks(LOUD, 1);
    t.advance(Duration::from_millis(400));
    t.entity.watchdog(t.now);
    let sent = t.take_sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(decode_message(&sent[0].payload).unwrap().0.duid, Duid::Tdu);
    assert_eq!(t.entity.sequencer().stream_id(), 0);

    t.entity.watchdog(t.now + Duration::from_secs(1));
    assert!(t.take_sent().is_empty());
    assert_eq!(t.take_events().len(), 2);
}

#[test]
fn test_watchdog_expires_lost_rx_call() {
    debug::setup_logging_verbose();
    let mut t = BridgeTest::new(default_test_config(TxMode::P25));
    t.receive(NetFunc::P25, 42, ldu_message(Duid::Ldu1, 1, &LduContext::group(3100, 9)));
    assert!(t.entity.tracker().any_active());

    t.advance(Duration::from_secs(3));
    t.entity.watchdog(t.now);
    assert!(!t.entity.tracker().any_active());
    let events = t.take_events();
    assert!(matches!(events.last(), Some(CallEvent::End(info, _)) if info.stream_id == 42));
}
