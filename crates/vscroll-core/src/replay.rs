//! Scripted input replay
//!
//! Drives a [`VirtualScroll`] from a JSON script on a simulated clock, so
//! input sequences can be inspected frame by frame without a host.
//!
//! ```json
//! {
//!   "scroll": { "range": [0, 1000] },
//!   "triggers": [{ "y": 500, "once": true, "label": "halfway" }],
//!   "events": [
//!     { "type": "wheel", "delta_y": 3, "delta_mode": "line" },
//!     { "type": "tick", "frames": 60 }
//!   ]
//! }
//! ```

use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::config::{ScrollConfig, TriggerConfig};
use crate::error::{Error, Result};
use crate::normalize::WheelEvent;
use crate::scroll::{Orientation, PanEvent, ScrollbarDrag, TriggerEvent, VirtualScroll};

/// One scripted input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputEvent {
    Wheel(WheelEvent),
    Pan(PanEvent),
    GoTo {
        position: f64,
        #[serde(default = "default_true")]
        animated: bool,
    },
    DragStart,
    /// Handle displacement since drag start, in track units
    DragMove {
        delta: f64,
    },
    DragEnd,
    SetActive {
        active: bool,
    },
    /// Advance the clock by whole frames, ticking each one
    Tick {
        #[serde(default = "default_frames")]
        frames: u32,
    },
    /// Advance the clock without ticking
    Wait {
        ms: u64,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplayScript {
    #[serde(default)]
    pub scroll: ScrollConfig,
    #[serde(default)]
    pub triggers: Vec<TriggerConfig>,
    /// Simulated frame interval
    #[serde(default = "default_frame_ms")]
    pub frame_ms: u64,
    /// Scrollbar track length used for drag events
    #[serde(default = "default_extent")]
    pub extent: f64,
    #[serde(default)]
    pub fade_out_delay_ms: Option<u64>,
    #[serde(default)]
    pub events: Vec<InputEvent>,
}

impl ReplayScript {
    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }
}

/// State after one tick
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameSample {
    pub frame: u64,
    pub time_ms: u64,
    pub target: f64,
    pub current: f64,
    pub completion: Option<f64>,
    pub animate: bool,
    pub scrollbar_visible: bool,
}

/// Trigger fire observed during replay
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FiredTrigger {
    pub frame: u64,
    pub label: String,
    pub position: f64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ReplayReport {
    pub frames: Vec<FrameSample>,
    pub fired: Vec<FiredTrigger>,
}

impl ReplayReport {
    pub fn last_frame(&self) -> Option<&FrameSample> {
        self.frames.last()
    }
}

type FireLog = Rc<RefCell<Vec<(String, f64)>>>;

/// Replays events against a handler on a simulated clock
#[derive(Debug)]
pub struct Replayer {
    scroll: VirtualScroll,
    drag: ScrollbarDrag,
    fire_log: FireLog,
    start: Instant,
    elapsed: Duration,
    frame_interval: Duration,
    frame: u64,
}

impl Replayer {
    pub fn new(script: &ReplayScript) -> Self {
        let fire_log: FireLog = Rc::new(RefCell::new(Vec::new()));
        let triggers = script.triggers.iter().map(|config| {
            let log = fire_log.clone();
            let label = config.display_name();
            config.to_trigger(move |event: &TriggerEvent| {
                log.borrow_mut().push((label.clone(), event.position));
                Ok(())
            })
        });

        let scroll = VirtualScroll::new(&script.scroll)
            .with_idle_fade(script.fade_out_delay_ms.map(Duration::from_millis))
            .with_triggers(triggers);

        Self {
            scroll,
            drag: ScrollbarDrag::new(Orientation::Vertical, script.extent),
            fire_log,
            start: Instant::now(),
            elapsed: Duration::ZERO,
            frame_interval: Duration::from_millis(script.frame_ms.max(1)),
            frame: 0,
        }
    }

    /// Run a whole script and collect the report
    pub fn run(script: &ReplayScript) -> Result<ReplayReport> {
        let mut replayer = Self::new(script);
        let mut report = ReplayReport::default();
        for event in &script.events {
            replayer.apply(event, &mut report)?;
        }
        Ok(report)
    }

    pub fn scroll(&self) -> &VirtualScroll {
        &self.scroll
    }

    fn now(&self) -> Instant {
        self.start + self.elapsed
    }

    /// Apply one event, appending any ticked frames to `report`
    pub fn apply(&mut self, event: &InputEvent, report: &mut ReplayReport) -> Result<()> {
        let now = self.now();
        match event {
            InputEvent::Wheel(wheel) => self.scroll.on_wheel_at(wheel, now),
            InputEvent::Pan(pan) => self.scroll.apply_swipe_velocity_at(pan.velocity_y, now),
            InputEvent::GoTo { position, animated } => {
                self.scroll.go_to_at(*position, *animated, now)
            }
            InputEvent::DragStart => {
                if self.scroll.range().is_none() {
                    return Err(Error::Replay("drag_start requires a scroll range".to_string()));
                }
                self.drag.pan_start(&mut self.scroll);
            }
            InputEvent::DragMove { delta } => self.drag.move_by(&mut self.scroll, *delta),
            InputEvent::DragEnd => self.drag.pan_end_at(&mut self.scroll, now),
            InputEvent::SetActive { active } => self.scroll.set_active(*active),
            InputEvent::Tick { frames } => {
                for _ in 0..*frames {
                    self.tick(report)?;
                }
            }
            InputEvent::Wait { ms } => self.elapsed += Duration::from_millis(*ms),
        }
        Ok(())
    }

    fn tick(&mut self, report: &mut ReplayReport) -> Result<()> {
        self.elapsed += self.frame_interval;
        self.frame += 1;
        let now = self.now();
        self.scroll.tick_at(now)?;

        let state = self.scroll.state();
        report.frames.push(FrameSample {
            frame: self.frame,
            time_ms: self.elapsed.as_millis() as u64,
            target: state.target,
            current: state.current,
            completion: state.completion,
            animate: state.animate,
            scrollbar_visible: self.scroll.is_scrollbar_visible(now),
        });

        let frame = self.frame;
        report.fired.extend(
            self.fire_log
                .borrow_mut()
                .drain(..)
                .map(|(label, position)| FiredTrigger {
                    frame,
                    label,
                    position,
                }),
        );
        Ok(())
    }
}

fn default_true() -> bool {
    true
}

fn default_frames() -> u32 {
    1
}

fn default_frame_ms() -> u64 {
    16
}

fn default_extent() -> f64 {
    100.0
}
