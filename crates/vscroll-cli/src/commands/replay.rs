use std::io::{self, Write};
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Serialize;
use tokio::time::{interval, MissedTickBehavior};

use vscroll_core::replay::{
    FiredTrigger, FrameSample, InputEvent, ReplayReport, ReplayScript, Replayer,
};

/// One line of JSON output
#[derive(Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum Record<'a> {
    Frame(&'a FrameSample),
    Fired(&'a FiredTrigger),
}

pub async fn run(path: &Path, realtime: bool, summary: bool) -> Result<()> {
    let script = ReplayScript::load(path)
        .with_context(|| format!("Failed to load replay script {}", path.display()))?;
    tracing::info!(
        "Replaying {} events from {}",
        script.events.len(),
        path.display()
    );

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let pace = realtime.then(|| Duration::from_millis(script.frame_ms.max(1)));

    if summary {
        let report = replay(&script, &mut io::sink(), pace).await?;
        print_summary(&mut out, &report)?;
    } else {
        replay(&script, &mut out, pace).await?;
    }
    Ok(())
}

/// Run `script`, writing JSON records as frames complete
///
/// With `pace` set, each frame waits for the next interval tick.
pub async fn replay<W: Write>(
    script: &ReplayScript,
    out: &mut W,
    pace: Option<Duration>,
) -> Result<ReplayReport> {
    let mut replayer = Replayer::new(script);
    let mut report = ReplayReport::default();
    let mut written_frames = 0;
    let mut written_fired = 0;

    let mut ticker = pace.map(|period| {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker
    });

    for event in &script.events {
        // Split ticks so paced output streams frame by frame
        let steps = match event {
            InputEvent::Tick { frames } => *frames,
            _ => 1,
        };
        for _ in 0..steps {
            match event {
                InputEvent::Tick { .. } => {
                    if let Some(ticker) = ticker.as_mut() {
                        ticker.tick().await;
                    }
                    replayer.apply(&InputEvent::Tick { frames: 1 }, &mut report)?;
                }
                other => replayer.apply(other, &mut report)?,
            }

            for frame in &report.frames[written_frames..] {
                serde_json::to_writer(&mut *out, &Record::Frame(frame))?;
                writeln!(out)?;
            }
            for fired in &report.fired[written_fired..] {
                serde_json::to_writer(&mut *out, &Record::Fired(fired))?;
                writeln!(out)?;
            }
            written_frames = report.frames.len();
            written_fired = report.fired.len();
        }
    }

    out.flush()?;
    Ok(report)
}

fn print_summary<W: Write>(out: &mut W, report: &ReplayReport) -> Result<()> {
    writeln!(out, "Frames: {}", report.frames.len())?;
    if let Some(last) = report.last_frame() {
        let completion = last
            .completion
            .map(|c| format!("{:.2}", c))
            .unwrap_or_else(|| "-".to_string());
        writeln!(
            out,
            "Final: target {:.2}, current {:.2}, completion {}",
            last.target, last.current, completion
        )?;
    }

    if report.fired.is_empty() {
        writeln!(out, "No triggers fired.")?;
    } else {
        writeln!(out, "Triggers fired ({}):", report.fired.len())?;
        for fired in &report.fired {
            writeln!(
                out,
                "  frame {:>5}  {} at {:.2}",
                fired.frame, fired.label, fired.position
            )?;
        }
    }
    Ok(())
}
