//! `ogxctl replay`: feed a capture through a simulated master board.

use std::path::Path;

use anyhow::{Context, Result, ensure};
use ogx_bridge::ports::mock::{configuration_for, MockBus, MockHost, MockXid};
use ogx_bridge::prelude::*;
use ogx_hid_xinput_protocol::ProtocolFamily;
use serde::Serialize;
use tracing::info;

use super::Format;
use crate::capture::{parse_hex_bytes, to_hex, CaptureFile};

/// Device address the replayed controller gets.
const REPLAY_ADDRESS: u8 = 1;

/// IN endpoint of interface 0 on the simulated controller.
const REPLAY_ENDPOINT: u8 = 0x81;

/// One feedback action and the bytes it put on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SentCommand {
    pub action: String,
    pub bytes: Vec<String>,
}

/// Engine state right after one captured report was applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReplayStep {
    pub time_ms: u64,
    pub input: String,
    pub xid_type: XidType,
    pub report: Option<InputReport>,
    pub report_hex: Option<String>,
    /// Commands sent since the previous step.
    pub commands: Vec<SentCommand>,
}

/// Replay `capture` as a `family` controller on slot 0.
pub fn replay(
    capture: &CaptureFile,
    family: ProtocolFamily,
    config: BridgeConfig,
) -> Result<Vec<ReplayStep>> {
    let vendor_id = capture.vendor_id()?;
    let product_id = capture.product_id()?;
    let interval = config.tick_interval_ms.max(1);

    let host = MockHost::new();
    let mut engine = MasterEngine::new(
        config,
        host.clone(),
        MockBus::new(),
        MockXid::new(),
        MemoryNonVolatile::default(),
    )
    .context("Failed to build the replay engine")?;

    host.push_event(HostEvent::Attached {
        address: REPLAY_ADDRESS,
        vendor_id,
        product_id,
        configuration: configuration_for(family),
    });

    let origin_us = capture.captures.first().map_or(0, |c| c.timestamp_us);
    let mut now_ms = 0u64;
    let mut pending = Vec::new();
    let mut steps = Vec::with_capacity(capture.captures.len());

    for (index, report) in capture.captures.iter().enumerate() {
        let data = parse_hex_bytes(&report.data)
            .with_context(|| format!("Capture {index} has malformed data"))?;
        let at_ms = report.timestamp_us.saturating_sub(origin_us) / 1_000;

        while now_ms < at_ms {
            pending.extend(engine.tick(now_ms).commands);
            now_ms += interval;
        }

        host.push_report(REPLAY_ADDRESS, REPLAY_ENDPOINT, &data);
        pending.extend(engine.tick(now_ms).commands);

        let output = engine.output(SlotId::LOCAL);
        steps.push(ReplayStep {
            time_ms: now_ms,
            input: to_hex(&data),
            xid_type: output.xid_type,
            report: output.report,
            report_hex: output.report.map(|r| to_hex(&r.to_vec())),
            commands: pending
                .drain(..)
                .map(|(_, action)| SentCommand {
                    action: format!("{action:?}"),
                    bytes: action
                        .commands(family)
                        .iter()
                        .map(|c| to_hex(c.as_bytes()))
                        .collect(),
                })
                .collect(),
        });
        now_ms += interval;
    }

    info!(steps = steps.len(), "replay finished");
    Ok(steps)
}

pub fn run(path: &Path, family: ProtocolFamily, config: Option<&Path>, format: Format) -> Result<()> {
    let capture = CaptureFile::load(path)?;
    ensure!(!capture.captures.is_empty(), "capture file '{}' has no reports", path.display());
    let config = match config {
        Some(path) => BridgeConfig::load(path)
            .with_context(|| format!("Failed to load configuration '{}'", path.display()))?,
        None => BridgeConfig::default(),
    };

    let steps = replay(&capture, family, config)?;
    match format {
        Format::Json => println!("{}", serde_json::to_string_pretty(&steps)?),
        Format::Text => {
            for step in &steps {
                println!(
                    "[{:>8}ms] {:<15} {}",
                    step.time_ms,
                    step.xid_type,
                    step.report_hex.as_deref().unwrap_or("-")
                );
                for command in &step.commands {
                    println!("{:>13} {} => {}", "", command.action, command.bytes.join(" | "));
                }
            }
        }
    }
    Ok(())
}

// ── BDD-style scenario tests ────────────────────────────────────────────────
