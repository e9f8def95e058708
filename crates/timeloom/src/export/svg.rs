//! Renders the laid-out timeline to SVG.
//!
//! One lane per thread, one rounded box per scheduled node, and one
//! cubic Bézier arrow per dependency edge running from the dependency's
//! right edge to the dependent's left edge. Rendering is best-effort by
//! design: unscheduled nodes simply have no box, their arrows are
//! skipped, and outstanding diagnostics are drawn into a warning panel
//! beneath the lanes so an exported file carries its own caveats.

use std::path::Path;

use log::{debug, info};
use svg::Document;
use svg::node::element::{Line, Path as SvgPath, Rectangle, Style, Text};

use timeloom_core::diagnostic::Diagnostic;
use timeloom_core::geometry::BoxGeometry;
use timeloom_core::graph::Graph;
use timeloom_core::identifier::NodeId;
use timeloom_core::schedule::SchedulePlan;

use crate::config::{LayoutConfig, StyleConfig};
use crate::error::TimeloomError;
use crate::layout::Layout;

/// Rendered box height in pixels.
const BOX_HEIGHT: f64 = 56.0;

/// Width of the color accent bar on each box.
const ACCENT_WIDTH: f64 = 6.0;

/// Arrowhead length and half-height in pixels.
const HEAD_LENGTH: f64 = 8.0;
const HEAD_HALF_HEIGHT: f64 = 5.0;

/// Distinct arrow/accent colors, assigned per source node by name hash.
const PALETTE: [&str; 12] = [
    "#1f78b4", "#33a02c", "#e31a1c", "#ff7f00", "#6a3d9a", "#b15928",
    "#a6cee3", "#b2df8a", "#fb9a99", "#fdbf6f", "#cab2d6", "#ffff99",
];

/// SVG exporter for a resolved layout.
pub struct SvgExporter<'a> {
    layout_config: &'a LayoutConfig,
    style: &'a StyleConfig,
}

impl<'a> SvgExporter<'a> {
    /// Creates an exporter bound to the given configuration.
    pub fn new(layout_config: &'a LayoutConfig, style: &'a StyleConfig) -> Self {
        Self {
            layout_config,
            style,
        }
    }

    /// Builds the SVG document for a laid-out graph.
    pub fn render(
        &self,
        graph: &Graph,
        plan: &SchedulePlan,
        layout: &Layout,
        diagnostics: &[Diagnostic],
    ) -> Document {
        let lane_height = self.layout_config.lane_height();
        let panel_height = warning_panel_height(diagnostics);
        let width = layout.width();
        let height = layout.height() + panel_height;

        let mut document = Document::new()
            .set("width", width)
            .set("height", height)
            .set("viewBox", format!("0 0 {width} {height}"))
            .add(self.stylesheet());

        if let Some(background) = self.style.background_color() {
            document = document.add(
                Rectangle::new()
                    .set("x", 0)
                    .set("y", 0)
                    .set("width", width)
                    .set("height", height)
                    .set("fill", background),
            );
        }

        for (thread, &lane) in layout.lanes() {
            document = self.add_lane(document, thread, lane, width);
        }

        // Arrows go under the boxes, like connectors behind modules.
        for (source, target) in visible_edges(graph, layout) {
            document = add_arrow(
                document,
                source_color(source.0),
                source.1,
                target.1,
            );
        }

        for (id, geometry) in layout.boxes() {
            document = add_module_box(document, id, geometry, plan);
        }

        if !diagnostics.is_empty() {
            document = add_warning_panel(
                document,
                diagnostics,
                layout.lanes().len() as f64 * lane_height,
                width,
            );
        }

        debug!(boxes = layout.boxes().count(), diagnostics = diagnostics.len(); "SVG document rendered");
        document
    }

    /// Renders straight to a string.
    pub fn render_string(
        &self,
        graph: &Graph,
        plan: &SchedulePlan,
        layout: &Layout,
        diagnostics: &[Diagnostic],
    ) -> String {
        self.render(graph, plan, layout, diagnostics).to_string()
    }

    /// Writes an SVG document to the given file.
    ///
    /// # Errors
    ///
    /// Returns [`TimeloomError::Io`] if the file cannot be written.
    pub fn write(&self, path: impl AsRef<Path>, document: &Document) -> Result<(), TimeloomError> {
        info!(path = path.as_ref().display().to_string(); "Writing SVG file");
        svg::save(path, document)?;
        Ok(())
    }

    fn stylesheet(&self) -> Style {
        Style::new(format!(
            "text {{ font-family: {font}; }}\n\
             .module-name {{ font-size: 13px; font-weight: 600; }}\n\
             .module-meta {{ font-size: 11px; fill: #333; }}\n\
             .lane-label {{ font-size: 14px; font-weight: 700; fill: #111; }}\n\
             .warning-header {{ font-size: 14px; font-weight: 700; fill: #7a0b0b; }}\n\
             .warning-line {{ font-size: 12px; fill: #7a0b0b; }}",
            font = self.style.font_family()
        ))
    }

    fn add_lane(&self, document: Document, thread: &str, lane: usize, width: f64) -> Document {
        let lane_height = self.layout_config.lane_height();
        let top = lane as f64 * lane_height;

        let label = Text::new(format!("Thread {thread}"))
            .set("class", "lane-label")
            .set("x", 12)
            .set("y", top + lane_height / 2.0 + 6.0);

        let separator = Line::new()
            .set("x1", 0)
            .set("y1", top + lane_height)
            .set("x2", width)
            .set("y2", top + lane_height)
            .set("stroke", "#ddd")
            .set("stroke-width", 1);

        document.add(separator).add(label)
    }
}

/// Dependency edges where both endpoints have geometry, dependent-side
/// driven so a half-recorded edge renders exactly as it was recorded.
fn visible_edges<'a>(
    graph: &'a Graph,
    layout: &'a Layout,
) -> impl Iterator<Item = ((&'a NodeId, &'a BoxGeometry), (&'a NodeId, &'a BoxGeometry))> {
    graph.nodes().flat_map(move |node| {
        let source = layout.geometry(node.id()).map(|g| (node.id(), g));
        node.dependents().iter().filter_map(move |dependent| {
            let source = source?;
            let target = layout.geometry(dependent)?;
            Some((source, (dependent, target)))
        })
    })
}

fn add_module_box(
    document: Document,
    id: &NodeId,
    geometry: &BoxGeometry,
    plan: &SchedulePlan,
) -> Document {
    let top = geometry.vertical_center() - BOX_HEIGHT / 2.0;
    let color = source_color(id);

    let body = Rectangle::new()
        .set("x", geometry.left())
        .set("y", top)
        .set("width", geometry.width())
        .set("height", BOX_HEIGHT)
        .set("rx", 6)
        .set("fill", "#ffffff")
        .set("stroke", "#aaa")
        .set("stroke-width", 1);

    let accent = Rectangle::new()
        .set("x", geometry.left())
        .set("y", top)
        .set("width", ACCENT_WIDTH)
        .set("height", BOX_HEIGHT)
        .set("fill", color);

    let name = Text::new(id.name().to_string())
        .set("class", "module-name")
        .set("x", geometry.left() + 10.0)
        .set("y", top + 18.0);

    let mut document = document.add(body).add(accent).add(name);
    if let Some(entry) = plan.entry(id) {
        document = document.add(
            Text::new(format!("{start} \u{2192} {finish}", start = entry.start(), finish = entry.finish()))
                .set("class", "module-meta")
                .set("x", geometry.left() + 10.0)
                .set("y", top + BOX_HEIGHT - 8.0),
        );
    }
    document
}

fn add_arrow(
    document: Document,
    color: &'static str,
    source: &BoxGeometry,
    target: &BoxGeometry,
) -> Document {
    let start_x = source.right();
    let start_y = source.vertical_center();
    let end_x = target.left();
    let end_y = target.vertical_center();

    let dx = (end_x - start_x).abs();
    let control = (dx * 0.55).max(60.0);
    let data = format!(
        "M {start_x} {start_y} C {c1} {start_y} {c2} {end_y} {end_x} {end_y}",
        c1 = start_x + control,
        c2 = end_x - control,
    );

    let curve = SvgPath::new()
        .set("d", data)
        .set("stroke", color)
        .set("fill", "none")
        .set("stroke-width", 2)
        .set("stroke-linecap", "round");

    let head = SvgPath::new()
        .set(
            "d",
            format!(
                "M {end_x} {end_y} L {bx} {by_top} L {bx} {by_bottom} Z",
                bx = end_x - HEAD_LENGTH,
                by_top = end_y - HEAD_HALF_HEIGHT,
                by_bottom = end_y + HEAD_HALF_HEIGHT,
            ),
        )
        .set("fill", color);

    document.add(curve).add(head)
}

fn warning_panel_height(diagnostics: &[Diagnostic]) -> f64 {
    if diagnostics.is_empty() {
        0.0
    } else {
        40.0 + diagnostics.len() as f64 * 16.0
    }
}

fn add_warning_panel(
    document: Document,
    diagnostics: &[Diagnostic],
    lanes_bottom: f64,
    width: f64,
) -> Document {
    let top = lanes_bottom + 10.0;
    let height = warning_panel_height(diagnostics) - 10.0;

    let background = Rectangle::new()
        .set("x", 12)
        .set("y", top)
        .set("width", width - 24.0)
        .set("height", height)
        .set("fill", "#fff4f4")
        .set("stroke", "#e74c3c")
        .set("stroke-width", 1);

    let accent = Rectangle::new()
        .set("x", 12)
        .set("y", top)
        .set("width", ACCENT_WIDTH)
        .set("height", height)
        .set("fill", "#e74c3c");

    let header = Text::new("Validation warnings")
        .set("class", "warning-header")
        .set("x", 24)
        .set("y", top + 18.0);

    let mut document = document.add(background).add(accent).add(header);
    for (index, diagnostic) in diagnostics.iter().enumerate() {
        document = document.add(
            Text::new(format!("\u{2022} {diagnostic}"))
                .set("class", "warning-line")
                .set("x", 24)
                .set("y", top + 36.0 + index as f64 * 16.0),
        );
    }
    document
}

/// Stable palette color for a node, by the same multiplicative hash the
/// accent bars and arrows share.
fn source_color(id: &NodeId) -> &'static str {
    let mut hash: u32 = 0;
    for byte in id.to_string().bytes() {
        hash = hash.wrapping_mul(131).wrapping_add(u32::from(byte));
    }
    PALETTE[hash as usize % PALETTE.len()]
}
