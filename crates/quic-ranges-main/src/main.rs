// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

use quic_ranges_core::offset::{ByteCount, OffsetInterval, StreamOffset};
use quic_ranges_core::packet::{PacketCount, PacketInterval, PacketNumber};
use quic_ranges_set::IntervalSet;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use std::{fs::File, io::BufWriter, time::Instant};
use tracing::{info, instrument};
use tracing_subscriber::{EnvFilter, fmt::format::FmtSpan};

fn enable_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_span_events(FmtSpan::CLOSE)
        .init();
}

#[derive(Debug, Clone, Serialize)]
struct StreamScenarioReport {
    seed: u64,
    stream_bytes: u64,
    frames_delivered: usize,
    duplicate_frames: usize,
    peak_tracked_intervals: usize,
    bytes_received_before_tail: u64,
    readable_prefix: u64,
    missing_ranges: Vec<(u64, u64)>,
    elapsed_us: u128,
}

#[derive(Debug, Clone, Serialize)]
struct AckScenarioReport {
    seed: u64,
    packets_sent: u64,
    packets_acked: u64,
    fast_path_acks: usize,
    reordered_acks: usize,
    ack_blocks_descending: Vec<(u64, u64)>,
    lost_ranges: Vec<(u64, u64)>,
    elapsed_us: u128,
}

#[derive(Debug, Clone, Serialize)]
struct SimulationReport {
    description: String,
    stream: StreamScenarioReport,
    ack: AckScenarioReport,
}

/// Delivers a stream's frames out of order (with retransmit duplicates),
/// tracking received byte ranges and reporting the gaps a real receiver
/// would ask for.
#[instrument]
fn run_stream_scenario(seed: u64) -> StreamScenarioReport {
    const FRAME_BYTES: u64 = 1_200;
    const FRAME_COUNT: u64 = 2_000;
    let stream_bytes = FRAME_BYTES * FRAME_COUNT;
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    let mut frames: Vec<OffsetInterval> = (0..FRAME_COUNT)
        .map(|i| {
            OffsetInterval::new(
                StreamOffset::new(i * FRAME_BYTES),
                StreamOffset::new((i + 1) * FRAME_BYTES),
            )
        })
        .collect();
    // Retransmissions show up as exact duplicates.
    let duplicate_frames = (FRAME_COUNT / 20) as usize;
    for _ in 0..duplicate_frames {
        let pick = frames[rng.random_range(0..frames.len())];
        frames.push(pick);
    }
    frames.shuffle(&mut rng);

    // Hold back a tail of frames so the mid-transfer snapshot has gaps.
    let in_flight = frames.len() / 10;
    let deliver_now = frames.len() - in_flight;

    let started = Instant::now();
    let mut received: IntervalSet<StreamOffset> = IntervalSet::new();
    let mut peak_tracked_intervals = 0usize;
    for &frame in &frames[..deliver_now] {
        received.add(frame);
        peak_tracked_intervals = peak_tracked_intervals.max(received.len());
    }

    let span = OffsetInterval::new(StreamOffset::zero(), StreamOffset::new(stream_bytes));
    let mut missing = received.clone();
    missing.complement(span);
    let missing_ranges: Vec<(u64, u64)> = missing
        .iter()
        .map(|gap| (gap.start().value(), gap.end().value()))
        .collect();

    let readable_prefix = received
        .iter()
        .next()
        .filter(|first| first.start().is_zero())
        .map(|first| first.end().value())
        .unwrap_or(0);
    let bytes_received_before_tail: ByteCount =
        received.iter().map(|interval| interval.byte_count()).sum();

    info!(
        tracked_intervals = received.len(),
        gaps = missing.len(),
        readable_prefix,
        "mid-transfer snapshot"
    );

    // The in-flight tail arrives; the stream must now be complete.
    for &frame in &frames[deliver_now..] {
        received.add(frame);
    }
    assert!(
        received.contains_interval(span),
        "stream incomplete after every frame arrived: {received}"
    );
    let elapsed = started.elapsed();

    StreamScenarioReport {
        seed,
        stream_bytes,
        frames_delivered: frames.len(),
        duplicate_frames,
        peak_tracked_intervals,
        bytes_received_before_tail: bytes_received_before_tail.value(),
        readable_prefix,
        missing_ranges,
        elapsed_us: elapsed.as_micros(),
    }
}

/// Acks packet numbers mostly in order (the append fast path), with loss
/// and reordering, then emits ACK-frame-style descending blocks and the
/// loss ranges.
#[instrument]
fn run_ack_scenario(seed: u64) -> AckScenarioReport {
    const PACKETS: u64 = 50_000;
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    let started = Instant::now();
    let mut acked: IntervalSet<PacketNumber> = IntervalSet::new();
    let mut reorder_buffer: Vec<PacketNumber> = Vec::new();
    let mut fast_path_acks = 0usize;

    for number in 0..PACKETS {
        if rng.random_range(0..100u8) < 3 {
            continue; // lost
        }
        let packet = PacketNumber::new(number);
        if rng.random_range(0..100u8) < 5 {
            reorder_buffer.push(packet);
            continue;
        }
        let end = packet.next().expect("packet number space exhausted");
        acked.append(PacketInterval::new(packet, end));
        fast_path_acks += 1;
    }
    let reordered_acks = reorder_buffer.len();
    for packet in reorder_buffer {
        let end = packet.next().expect("packet number space exhausted");
        acked.add(PacketInterval::new(packet, end));
    }

    let span = PacketInterval::new(PacketNumber::zero(), PacketNumber::new(PACKETS));
    let mut lost = acked.clone();
    lost.complement(span);
    for gap in lost.iter() {
        assert!(
            acked.is_disjoint(*gap),
            "loss range {gap} overlaps the acked set"
        );
    }

    let ack_blocks_descending: Vec<(u64, u64)> = acked
        .iter()
        .rev()
        .take(16)
        .map(|block| (block.start().value(), block.end().value()))
        .collect();
    let lost_ranges: Vec<(u64, u64)> = lost
        .iter()
        .map(|gap| (gap.start().value(), gap.end().value()))
        .collect();
    let packets_acked = acked
        .iter()
        .fold(PacketCount::zero(), |acc, block| acc + block.packet_count());
    let elapsed = started.elapsed();

    info!(
        ack_blocks = acked.len(),
        loss_ranges = lost.len(),
        packets_acked = packets_acked.value(),
        "ack tracking settled"
    );

    AckScenarioReport {
        seed,
        packets_sent: PACKETS,
        packets_acked: packets_acked.value(),
        fast_path_acks,
        reordered_acks,
        ack_blocks_descending,
        lost_ranges,
        elapsed_us: elapsed.as_micros(),
    }
}

fn main() {
    enable_tracing();

    let stream = run_stream_scenario(42);
    let ack = run_ack_scenario(43);

    let report = SimulationReport {
        description: "QUIC bookkeeping simulation: out-of-order stream reassembly and \
                      mostly-in-order ack tracking over the canonical interval set."
            .into(),
        stream,
        ack,
    };

    let file = File::create("quic_ranges_report.json").expect("create quic_ranges_report.json");
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, &report).expect("write json report");

    println!();
    println!("=================================================================");
    println!("======================= Simulation Done =========================");
    println!("=================================================================");
    println!();
    println!("Wrote: quic_ranges_report.json");
}
