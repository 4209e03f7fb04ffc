use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::BoxError;
use crate::scroll::{Condition, ScrollRange, ScrollbarPosition, Trigger, TriggerEvent};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub scroll: ScrollConfig,
    #[serde(default)]
    pub scrollbar: ScrollbarConfig,
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub keymap: KeymapConfig,
    #[serde(default)]
    pub triggers: Vec<TriggerConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Data directory path (log files)
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_level: default_log_level(),
        }
    }
}

/// Scroll handler configuration
///
/// Out-of-range values are normalized by the accessor methods rather than
/// rejected, so a hand-edited config file can never put the handler into an
/// invalid state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrollConfig {
    /// Initial target and current position
    #[serde(default)]
    pub start_y: f64,
    /// Smoothing factor used after wheel input
    #[serde(default = "default_lerp_amount")]
    pub lerp_amount: f64,
    /// Smoothing factor used after swipe input (defaults to lerp_amount * 4)
    #[serde(default)]
    pub lerp_amount_swipe: Option<f64>,
    /// Swipe velocity multiplier
    #[serde(default = "default_one")]
    pub mobile_sensibility: f64,
    /// Amplifies wheel and swipe deltas, values below 1 act as 1
    #[serde(default = "default_one")]
    pub amp: f64,
    /// Optional `[min, max]` clamp bounds
    #[serde(default)]
    pub range: Option<[f64; 2]>,
    /// Swipe velocity to distance multiplier
    #[serde(default = "default_swipe_strength")]
    pub swipe_strength: f64,
    /// Delay before interpolation resumes after a non-animated jump
    #[serde(default = "default_settle_delay")]
    pub settle_delay_ms: u64,
    /// Device pixel ratio used to normalize wheel deltas
    #[serde(default = "default_one")]
    pub device_pixel_ratio: f64,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            start_y: 0.0,
            lerp_amount: default_lerp_amount(),
            lerp_amount_swipe: None,
            mobile_sensibility: default_one(),
            amp: default_one(),
            range: None,
            swipe_strength: default_swipe_strength(),
            settle_delay_ms: default_settle_delay(),
            device_pixel_ratio: default_one(),
        }
    }
}

impl ScrollConfig {
    /// Effective amplification factor (always >= 1)
    pub fn effective_amp(&self) -> f64 {
        if self.amp > 1.0 && self.amp.is_finite() {
            self.amp
        } else {
            1.0
        }
    }

    /// Smoothing factor after wheel input, in (0, 1]
    pub fn wheel_smoothing(&self) -> f64 {
        smoothing_or(self.lerp_amount, default_lerp_amount())
    }

    /// Smoothing factor after swipe input, in (0, 1]
    pub fn swipe_smoothing(&self) -> f64 {
        let fallback = (self.wheel_smoothing() * 4.0).min(1.0);
        match self.lerp_amount_swipe {
            Some(value) => smoothing_or(value, fallback),
            None => fallback,
        }
    }

    /// Clamp range, if configured with finite bounds
    pub fn scroll_range(&self) -> Option<ScrollRange> {
        self.range.and_then(|[a, b]| ScrollRange::new(a, b))
    }

    /// Initial position (non-finite values act as 0)
    pub fn start_position(&self) -> f64 {
        if self.start_y.is_finite() {
            self.start_y
        } else {
            0.0
        }
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}

/// Clamp a smoothing factor into (0, 1], falling back when unusable
fn smoothing_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value.min(1.0)
    } else {
        tracing::warn!("Invalid smoothing factor {}, using {}", value, fallback);
        fallback
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrollbarConfig {
    /// Render a scrollbar
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Edge the scrollbar is attached to
    #[serde(default)]
    pub position: ScrollbarPosition,
    /// Handle length as a fraction of the track
    #[serde(default = "default_handle_size")]
    pub handle_size: f64,
    /// Hide the scrollbar after this much inactivity (never hides when unset)
    #[serde(default)]
    pub fade_out_delay_ms: Option<u64>,
}

impl Default for ScrollbarConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            position: ScrollbarPosition::default(),
            handle_size: default_handle_size(),
            fade_out_delay_ms: None,
        }
    }
}

impl ScrollbarConfig {
    pub fn fade_out_delay(&self) -> Option<Duration> {
        self.fade_out_delay_ms.map(Duration::from_millis)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Idle tick rate in milliseconds
    #[serde(default = "default_tick_rate")]
    pub tick_rate_ms: u64,
    /// Frame rate while the scroll position is moving
    #[serde(default = "default_animation_fps")]
    pub animation_fps: u32,
    /// Scroll pixels per rendered terminal row
    #[serde(default = "default_pixels_per_row")]
    pub pixels_per_row: f64,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            tick_rate_ms: default_tick_rate(),
            animation_fps: default_animation_fps(),
            pixels_per_row: default_pixels_per_row(),
        }
    }
}

impl UiConfig {
    pub fn tick_rate(&self) -> Duration {
        Duration::from_millis(self.tick_rate_ms)
    }

    /// Frame interval while animating
    pub fn animation_tick(&self) -> Duration {
        if self.animation_fps == 0 {
            Duration::from_millis(16) // ~60fps fallback
        } else {
            Duration::from_millis((1000 / self.animation_fps as u64).max(1))
        }
    }
}

/// Keymap configuration using Vim-style notation
/// Format: "j", "k", "<C-d>" (Ctrl+d), "<S-g>" (Shift+g), "<Home>", "<End>", "<Space>"
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeymapConfig {
    /// Quit the application
    #[serde(default = "default_key_quit")]
    pub quit: String,
    /// Scroll forward one line
    #[serde(default = "default_key_scroll_down")]
    pub scroll_down: String,
    /// Scroll backward one line
    #[serde(default = "default_key_scroll_up")]
    pub scroll_up: String,
    /// Scroll forward one page
    #[serde(default = "default_key_page_down")]
    pub page_down: String,
    /// Scroll backward one page
    #[serde(default = "default_key_page_up")]
    pub page_up: String,
    /// Emulate a forward swipe
    #[serde(default = "default_key_fling_down")]
    pub fling_down: String,
    /// Emulate a backward swipe
    #[serde(default = "default_key_fling_up")]
    pub fling_up: String,
    /// Animated jump to the start of the range
    #[serde(default = "default_key_jump_to_top")]
    pub jump_to_top: String,
    /// Animated jump to the end of the range
    #[serde(default = "default_key_jump_to_bottom")]
    pub jump_to_bottom: String,
    /// Non-animated jump to the middle of the range
    #[serde(default = "default_key_snap_to_middle")]
    pub snap_to_middle: String,
    /// Pause or resume input capture
    #[serde(default = "default_key_toggle_active")]
    pub toggle_active: String,
}

impl Default for KeymapConfig {
    fn default() -> Self {
        Self {
            quit: default_key_quit(),
            scroll_down: default_key_scroll_down(),
            scroll_up: default_key_scroll_up(),
            page_down: default_key_page_down(),
            page_up: default_key_page_up(),
            fling_down: default_key_fling_down(),
            fling_up: default_key_fling_up(),
            jump_to_top: default_key_jump_to_top(),
            jump_to_bottom: default_key_jump_to_bottom(),
            snap_to_middle: default_key_snap_to_middle(),
            toggle_active: default_key_toggle_active(),
        }
    }
}

/// Declarative trigger, the callback is attached by the consumer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggerConfig {
    /// Threshold position
    pub y: f64,
    #[serde(default)]
    pub condition: Condition,
    /// Fire at most once for the handler's lifetime
    #[serde(default)]
    pub once: bool,
    /// Name reported when the trigger fires
    #[serde(default)]
    pub label: Option<String>,
}

impl TriggerConfig {
    /// Label, or a description derived from the rule
    pub fn display_name(&self) -> String {
        self.label
            .clone()
            .unwrap_or_else(|| format!("{} {}", self.condition, self.y))
    }

    /// Attach a callback, producing a live trigger
    pub fn to_trigger<F>(&self, callback: F) -> Trigger
    where
        F: FnMut(&TriggerEvent) -> Result<(), BoxError> + 'static,
    {
        Trigger::new(self.y, self.condition, self.once, callback)
    }
}

fn default_key_quit() -> String { "q".to_string() }
fn default_key_scroll_down() -> String { "j".to_string() }
fn default_key_scroll_up() -> String { "k".to_string() }
fn default_key_page_down() -> String { "<C-f>".to_string() }
fn default_key_page_up() -> String { "<C-b>".to_string() }
fn default_key_fling_down() -> String { "<C-j>".to_string() }
fn default_key_fling_up() -> String { "<C-k>".to_string() }
fn default_key_jump_to_top() -> String { "g".to_string() }
fn default_key_jump_to_bottom() -> String { "G".to_string() }
fn default_key_snap_to_middle() -> String { "m".to_string() }
fn default_key_toggle_active() -> String { "<Space>".to_string() }

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("vscroll")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_one() -> f64 {
    1.0
}

fn default_lerp_amount() -> f64 {
    0.1
}

fn default_swipe_strength() -> f64 {
    75.0
}

fn default_settle_delay() -> u64 {
    50
}

fn default_handle_size() -> f64 {
    0.1
}

fn default_tick_rate() -> u64 {
    100
}

fn default_animation_fps() -> u32 {
    60
}

fn default_pixels_per_row() -> f64 {
    20.0
}

/// Expand tilde (~) in path to user's home directory
fn expand_tilde(path: &Path) -> PathBuf {
    if let Some(path_str) = path.to_str() {
        if let Some(stripped) = path_str.strip_prefix("~/") {
            if let Some(home) = dirs::home_dir() {
                return home.join(stripped);
            }
        } else if path_str == "~" {
            if let Some(home) = dirs::home_dir() {
                return home;
            }
        }
    }
    path.to_path_buf()
}

impl AppConfig {
    /// Load configuration from the default path or return defaults
    pub fn load() -> crate::Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from a file, defaults when the file is missing
    pub fn load_from(path: &Path) -> crate::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            Self::from_toml(&content)
        } else {
            Ok(Self::default())
        }
    }

    pub fn from_toml(content: &str) -> crate::Result<Self> {
        toml::from_str(content).map_err(|e| crate::Error::Config(e.to_string()))
    }

    pub fn to_toml(&self) -> crate::Result<String> {
        toml::to_string_pretty(self).map_err(|e| crate::Error::Config(e.to_string()))
    }

    /// Save configuration to a file, creating parent directories
    pub fn save_to(&self, path: &Path) -> crate::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    /// Get the configuration file path
    /// Always uses ~/.config/vscroll/config.toml on all platforms
    pub fn config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("vscroll")
            .join("config.toml")
    }

    /// Get the data directory (with tilde expansion)
    pub fn data_dir(&self) -> PathBuf {
        expand_tilde(&self.general.data_dir)
    }

    /// Get the log file path used by the interactive front end
    pub fn log_path(&self) -> PathBuf {
        self.data_dir().join("vscroll.log")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_scroll_config() {
        let config = ScrollConfig::default();
        assert_eq!(config.start_position(), 0.0);
        assert_eq!(config.wheel_smoothing(), 0.1);
        assert!((config.swipe_smoothing() - 0.4).abs() < 1e-12);
        assert_eq!(config.effective_amp(), 1.0);
        assert_eq!(config.swipe_strength, 75.0);
        assert_eq!(config.settle_delay(), Duration::from_millis(50));
        assert!(config.scroll_range().is_none());
    }

    #[test]
    fn test_animation_tick_never_zero() {
        let mut ui = UiConfig::default();
        assert_eq!(ui.animation_tick(), Duration::from_millis(16));
        ui.animation_fps = 5000;
        assert_eq!(ui.animation_tick(), Duration::from_millis(1));
        ui.animation_fps = 0;
        assert_eq!(ui.animation_tick(), Duration::from_millis(16));
    }

    #[test]
    fn test_amp_below_one_is_normalized() {
        let config = ScrollConfig {
            amp: 0.25,
            ..Default::default()
        };
        assert_eq!(config.effective_amp(), 1.0);

        let config = ScrollConfig {
            amp: 3.0,
            ..Default::default()
        };
        assert_eq!(config.effective_amp(), 3.0);
    }

    #[test]
    fn test_smoothing_is_clamped() {
        let config = ScrollConfig {
            lerp_amount: 0.5,
            ..Default::default()
        };
        // Swipe default is 4x wheel but never above 1
        assert_eq!(config.swipe_smoothing(), 1.0);

        let config = ScrollConfig {
            lerp_amount: -2.0,
            lerp_amount_swipe: Some(0.0),
            ..Default::default()
        };
        assert_eq!(config.wheel_smoothing(), 0.1);
        assert!((config.swipe_smoothing() - 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_parse_toml() {
        let config = AppConfig::from_toml(
            r#"
            [scroll]
            lerp_amount = 0.2
            range = [0.0, 1000.0]

            [scrollbar]
            position = "bottom"
            fade_out_delay_ms = 1500

            [[triggers]]
            y = 500.0
            condition = ">="
            once = true
            label = "halfway"

            [[triggers]]
            y = 100.0
            condition = "<y"
            "#,
        )
        .unwrap();

        assert_eq!(config.scroll.wheel_smoothing(), 0.2);
        assert_eq!(config.scroll.scroll_range(), ScrollRange::new(0.0, 1000.0));
        assert_eq!(config.scrollbar.position, ScrollbarPosition::Bottom);
        assert_eq!(
            config.scrollbar.fade_out_delay(),
            Some(Duration::from_millis(1500))
        );
        assert_eq!(config.triggers.len(), 2);
        assert_eq!(config.triggers[0].condition, Condition::AtOrAbove);
        assert!(config.triggers[0].once);
        assert_eq!(config.triggers[1].condition, Condition::AtOrBelow);
        assert_eq!(config.triggers[1].display_name(), "<= 100");
        // Untouched sections keep their defaults
        assert_eq!(config.ui.pixels_per_row, 20.0);
        assert_eq!(config.keymap.quit, "q");
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = AppConfig::from_toml("[scroll]\nlerp_amount = \"fast\"").unwrap_err();
        assert!(matches!(err, crate::Error::Config(_)));
    }

    #[test]
    fn test_toml_roundtrip_keeps_triggers() {
        let mut config = AppConfig::default();
        config.triggers.push(TriggerConfig {
            y: 42.0,
            condition: Condition::AtOrBelow,
            once: false,
            label: None,
        });
        let parsed = AppConfig::from_toml(&config.to_toml().unwrap()).unwrap();
        assert_eq!(parsed.triggers, config.triggers);
    }

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let path = std::env::temp_dir().join("vscroll-missing-config-test.toml");
        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.scroll.swipe_strength, 75.0);
    }
}
