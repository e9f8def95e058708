//! Configuration types for Timeloom diagram rendering.
//!
//! This module provides configuration structures that control how
//! timelines are laid out and styled. All types implement
//! [`serde::Deserialize`] for flexible loading from external sources
//! (the CLI loads them from TOML).
//!
//! # Example
//!
//! ```
//! # use timeloom::config::AppConfig;
//! let config = AppConfig::default();
//! assert!(config.layout().dependency_gap() > 0.0);
//! ```

use serde::Deserialize;

/// Top-level application configuration combining layout and style
/// settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Layout configuration section.
    #[serde(default)]
    layout: LayoutConfig,

    /// Style configuration section.
    #[serde(default)]
    style: StyleConfig,
}

impl AppConfig {
    /// Creates a new [`AppConfig`] from its sections.
    pub fn new(layout: LayoutConfig, style: StyleConfig) -> Self {
        Self { layout, style }
    }

    /// Returns the layout configuration.
    pub fn layout(&self) -> &LayoutConfig {
        &self.layout
    }

    /// Returns the style configuration.
    pub fn style(&self) -> &StyleConfig {
        &self.style
    }
}

/// Geometry constants for the timeline layout.
///
/// The horizontal scale adapts to the diagram's total duration: short
/// timelines are stretched so small durations stay readable, long ones
/// are compressed, both clamped to the `min_scale..=max_scale` range of
/// pixels per time unit.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Desired minimum diagram width in pixels.
    target_width: f64,

    /// Lower clamp for the adaptive scale, in pixels per time unit.
    min_scale: f64,

    /// Upper clamp for the adaptive scale, in pixels per time unit.
    max_scale: f64,

    /// Horizontal offset of time zero, leaving room for lane labels.
    margin: f64,

    /// Smallest rendered box width, so zero-duration nodes stay visible.
    min_box_width: f64,

    /// Minimum horizontal gap between a dependency's right edge and its
    /// dependent's left edge.
    dependency_gap: f64,

    /// Height of one thread lane in pixels.
    lane_height: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            target_width: 2000.0,
            min_scale: 60.0,
            max_scale: 320.0,
            margin: 200.0,
            min_box_width: 40.0,
            dependency_gap: 40.0,
            lane_height: 110.0,
        }
    }
}

impl LayoutConfig {
    /// Desired minimum diagram width in pixels.
    pub fn target_width(&self) -> f64 {
        self.target_width
    }

    /// Lower clamp for the adaptive scale.
    pub fn min_scale(&self) -> f64 {
        self.min_scale
    }

    /// Upper clamp for the adaptive scale.
    pub fn max_scale(&self) -> f64 {
        self.max_scale
    }

    /// Horizontal offset of time zero.
    pub fn margin(&self) -> f64 {
        self.margin
    }

    /// Smallest rendered box width.
    pub fn min_box_width(&self) -> f64 {
        self.min_box_width
    }

    /// Minimum gap enforced along dependency arrows.
    pub fn dependency_gap(&self) -> f64 {
        self.dependency_gap
    }

    /// Height of one thread lane.
    pub fn lane_height(&self) -> f64 {
        self.lane_height
    }
}

/// Visual styling configuration for rendered diagrams.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StyleConfig {
    /// Background fill for the whole diagram; `None` leaves it
    /// transparent.
    background_color: Option<String>,

    /// Font family embedded into the SVG styles.
    font_family: String,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            background_color: None,
            font_family: "sans-serif".to_string(),
        }
    }
}

impl StyleConfig {
    /// Background fill for the diagram, if any.
    pub fn background_color(&self) -> Option<&str> {
        self.background_color.as_deref()
    }

    /// Font family embedded into the SVG styles.
    pub fn font_family(&self) -> &str {
        &self.font_family
    }
}
