//! Turns a schedule into non-overlapping 2-D geometry.
//!
//! The initial position of every box is proportional to its scheduled
//! start time. That alone is not enough for readable arrows: a
//! zero-duration dependency and its dependent would touch, and clamped
//! box widths can overtake the time axis. The conflict pass therefore
//! walks the boxes once, left to right, and pushes every box far enough
//! right that each of its dependencies ends at least one gap before it —
//! propagating the push along the lane so relative order never flips.
//!
//! The pass runs exactly once per node rather than iterating to a fixed
//! point; a deep cross-lane chain can in principle re-violate an
//! already-satisfied gap later in the pass. Known limitation, kept for
//! predictability under live editing.

use std::cmp::Ordering;

use indexmap::IndexMap;
use log::debug;

use timeloom_core::geometry::BoxGeometry;
use timeloom_core::graph::Graph;
use timeloom_core::identifier::NodeId;
use timeloom_core::schedule::SchedulePlan;

use crate::config::LayoutConfig;

/// A shift below this threshold is not worth disturbing the lane for.
const SHIFT_EPSILON: f64 = 0.5;

/// Tolerance when deciding whether a same-lane neighbour sits at or
/// beyond the pre-shift position and must move along.
const PROPAGATE_TOLERANCE: f64 = 1.0;

/// Vertical slack under the last lane.
const VERTICAL_SLACK: f64 = 80.0;

/// Final geometry for the renderer.
#[derive(Debug, Clone)]
pub struct Layout {
    boxes: IndexMap<NodeId, BoxGeometry>,
    lanes: IndexMap<String, usize>,
    width: f64,
    height: f64,
    scale: f64,
}

impl Layout {
    /// Geometry of one node's box, if the node was scheduled.
    pub fn geometry(&self, id: &NodeId) -> Option<&BoxGeometry> {
        self.boxes.get(id)
    }

    /// All boxes, in scheduling order.
    pub fn boxes(&self) -> impl Iterator<Item = (&NodeId, &BoxGeometry)> {
        self.boxes.iter()
    }

    /// Lane index per thread, in display order.
    pub fn lanes(&self) -> &IndexMap<String, usize> {
        &self.lanes
    }

    /// Overall diagram width in pixels.
    pub fn width(&self) -> f64 {
        self.width
    }

    /// Overall diagram height in pixels.
    pub fn height(&self) -> f64 {
        self.height
    }

    /// The pixels-per-time-unit scale the layout was computed with.
    pub fn scale(&self) -> f64 {
        self.scale
    }
}

/// Computes final geometry for every scheduled node.
///
/// Unscheduled nodes receive no geometry; their lane still exists so the
/// rest of the diagram renders around the gap.
pub fn resolve(graph: &Graph, plan: &SchedulePlan, config: &LayoutConfig) -> Layout {
    let lanes = assign_lanes(graph);
    let scale = pick_scale(plan.total_duration(), config);

    let mut boxes: IndexMap<NodeId, BoxGeometry> = IndexMap::new();
    let mut node_lane: IndexMap<NodeId, usize> = IndexMap::new();
    for (id, entry) in plan.entries() {
        let Some(&lane) = lanes.get(entry.thread()) else {
            continue;
        };
        let left = scale * entry.start() + config.margin();
        let width = config.min_box_width().max((scale * entry.duration()).round());
        let vertical_center = lane as f64 * config.lane_height() + config.lane_height() / 2.0;
        boxes.insert(id.clone(), BoxGeometry::new(left, width, vertical_center));
        node_lane.insert(id.clone(), lane);
    }

    enforce_gaps(graph, config, &mut boxes, &node_lane);

    let content_right = boxes
        .values()
        .map(BoxGeometry::right)
        .fold(0.0, f64::max);
    let base_width = config
        .target_width()
        .max((plan.total_duration() * scale).ceil() + 2.0 * config.margin());
    let width = base_width.max(content_right + config.dependency_gap());
    let height = lanes.len() as f64 * config.lane_height() + VERTICAL_SLACK;

    debug!(boxes = boxes.len(), width = width, height = height, scale = scale; "Layout resolved");
    Layout {
        boxes,
        lanes,
        width,
        height,
        scale,
    }
}

/// Single forward pass in ascending initial-left order.
fn enforce_gaps(
    graph: &Graph,
    config: &LayoutConfig,
    boxes: &mut IndexMap<NodeId, BoxGeometry>,
    node_lane: &IndexMap<NodeId, usize>,
) {
    let mut order: Vec<NodeId> = boxes.keys().cloned().collect();
    // Stable sort: ties keep scheduling order.
    order.sort_by(|a, b| boxes[a].left().total_cmp(&boxes[b].left()));

    for id in order {
        let Some(node) = graph.node(&id) else { continue };

        let max_dependency_right = node
            .depends_on()
            .iter()
            .filter_map(|dep| boxes.get(dep))
            .map(BoxGeometry::right)
            .fold(f64::NEG_INFINITY, f64::max);
        if max_dependency_right == f64::NEG_INFINITY {
            continue;
        }

        let current = boxes[&id];
        let required_left = max_dependency_right + config.dependency_gap();
        if required_left <= current.left() + SHIFT_EPSILON {
            continue;
        }

        let delta = required_left - current.left();
        let pre_shift_left = current.left();
        let lane = node_lane[&id];

        for (other_id, geometry) in boxes.iter_mut() {
            if *other_id == id {
                geometry.shift(delta);
            } else if node_lane[other_id] == lane
                && geometry.left() >= pre_shift_left - PROPAGATE_TOLERANCE
            {
                // Everything at or after the pre-shift position moves
                // along, so the lane keeps its relative order.
                geometry.shift(delta);
            }
        }
    }
}

/// Lane index per thread: numeric thread names sort by value, the rest
/// lexicographically after them.
fn assign_lanes(graph: &Graph) -> IndexMap<String, usize> {
    let mut threads: Vec<&str> = graph.threads().into_iter().collect();
    threads.sort_by(|a, b| compare_threads(a, b));
    threads
        .into_iter()
        .enumerate()
        .map(|(index, thread)| (thread.to_string(), index))
        .collect()
}

fn compare_threads(a: &str, b: &str) -> Ordering {
    match (a.parse::<f64>(), b.parse::<f64>()) {
        (Ok(x), Ok(y)) => x.total_cmp(&y),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

/// Pixels per time unit, adapted so short timelines stay readable and
/// long ones stay bounded.
fn pick_scale(total_duration: f64, config: &LayoutConfig) -> f64 {
    let fitted = (config.target_width() / total_duration.max(1.0)).floor();
    fitted.clamp(config.min_scale(), config.max_scale())
}
