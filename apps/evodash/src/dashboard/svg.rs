//! # SVG Charts
//!
//! The three dashboard charts as inline SVG. Every coordinate is a whole
//! pixel computed in integer arithmetic from the report's fixed-point values.

use super::page::escape;
use evodash_core::{
    Bar, DeltaGroup, TriggerFlow, format_millis, primitives::FIXED_POINT_SCALE,
};
use std::collections::BTreeMap;

// =============================================================================
// LAYOUT
// =============================================================================

const WIDTH: i64 = 640;
const HEIGHT: i64 = 340;
const MARGIN_TOP: i64 = 30;
const MARGIN_BOTTOM: i64 = 50;
const MARGIN_LEFT: i64 = 60;
const MARGIN_RIGHT: i64 = 20;

/// One color per evolution step.
const STEP_COLORS: [&str; 2] = ["#4c78a8", "#f58518"];
const TRIGGER_COLOR: &str = "#72b7b2";
const OUTLIER_COLOR: &str = "#e45756";

/// Linear map from a value range onto the vertical plot area.
#[derive(Debug, Clone, Copy)]
struct YScale {
    lo: i64,
    hi: i64,
}

impl YScale {
    /// Range covering `values` and zero.
    fn covering(values: impl Iterator<Item = i64>) -> Self {
        let (lo, hi) = values.fold((0i64, 0i64), |(lo, hi), v| (lo.min(v), hi.max(v)));
        Self {
            lo,
            hi: if hi > lo { hi } else { lo.saturating_add(1) },
        }
    }

    fn y(&self, value: i64) -> i64 {
        let plot = HEIGHT - MARGIN_TOP - MARGIN_BOTTOM;
        let span = self.hi.saturating_sub(self.lo);
        let from_top = self.hi.saturating_sub(value.clamp(self.lo, self.hi));
        MARGIN_TOP + from_top.saturating_mul(plot) / span
    }
}

fn open_svg(label: &str, height: i64) -> String {
    format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" viewBox=\"0 0 {w} {h}\" width=\"{w}\" height=\"{h}\" role=\"img\" aria-label=\"{label}\">\n",
        w = WIDTH,
        h = height,
        label = escape(label)
    )
}

fn step_color(index: usize) -> &'static str {
    STEP_COLORS.get(index % STEP_COLORS.len()).copied().unwrap_or("#888888")
}

// =============================================================================
// BAR CHART
// =============================================================================

/// Mean gain per evolution step, one bar each.
pub fn bar_chart(bars: &[Bar]) -> String {
    let scale = YScale::covering(bars.iter().filter_map(|b| b.mean_millis));
    let zero = scale.y(0);
    let slot = (WIDTH - MARGIN_LEFT - MARGIN_RIGHT) / (bars.len().max(1) as i64);

    let mut svg = open_svg("Mean power gain per evolution", HEIGHT);
    svg.push_str(&format!(
        "  <line x1=\"{l}\" y1=\"{z}\" x2=\"{r}\" y2=\"{z}\" stroke=\"#444\"/>\n",
        l = MARGIN_LEFT,
        r = WIDTH - MARGIN_RIGHT,
        z = zero
    ));

    for (i, bar) in bars.iter().enumerate() {
        let x = MARGIN_LEFT + slot * i as i64 + slot / 5;
        let w = slot * 3 / 5;
        let center = x + w / 2;
        let label = escape(&bar.label);

        match (bar.mean_millis, bar.rounded) {
            (Some(mean), Some(rounded)) => {
                let top = scale.y(mean.max(0));
                let bottom = scale.y(mean.min(0));
                svg.push_str(&format!(
                    "  <rect class=\"bar\" x=\"{x}\" y=\"{top}\" width=\"{w}\" height=\"{h}\" fill=\"{color}\"><title>{label}: {value} pts</title></rect>\n",
                    h = (bottom - top).max(1),
                    color = step_color(i),
                    value = format_millis(mean),
                ));
                svg.push_str(&format!(
                    "  <text x=\"{center}\" y=\"{y}\" text-anchor=\"middle\" font-weight=\"bold\">{v:+}</text>\n",
                    y = top - 8,
                    v = rounded
                ));
            }
            _ => {
                svg.push_str(&format!(
                    "  <text x=\"{center}\" y=\"{y}\" text-anchor=\"middle\" fill=\"#888\">n/a</text>\n",
                    y = zero - 8
                ));
            }
        }
        svg.push_str(&format!(
            "  <text x=\"{center}\" y=\"{y}\" text-anchor=\"middle\">{label}</text>\n",
            y = HEIGHT - MARGIN_BOTTOM + 24
        ));
    }

    svg.push_str("</svg>\n");
    svg
}

// =============================================================================
// BOX PLOT
// =============================================================================

/// Delta distribution per evolution step: box, whiskers and every point.
///
/// Each point carries a `<title>` naming the entity, shown on hover.
pub fn box_plot(groups: &[DeltaGroup]) -> String {
    let scale = YScale::covering(
        groups
            .iter()
            .flat_map(|g| g.points.iter())
            .map(|p| p.delta.saturating_mul(FIXED_POINT_SCALE)),
    );
    let y = |millis: i64| scale.y(millis);
    let y_whole = |value: i64| scale.y(value.saturating_mul(FIXED_POINT_SCALE));
    let slot = (WIDTH - MARGIN_LEFT - MARGIN_RIGHT) / (groups.len().max(1) as i64);

    let mut svg = open_svg("Power gain distribution per evolution", HEIGHT);
    svg.push_str(&format!(
        "  <line x1=\"{l}\" y1=\"{z}\" x2=\"{r}\" y2=\"{z}\" stroke=\"#bbb\" stroke-dasharray=\"4 4\"/>\n",
        l = MARGIN_LEFT,
        r = WIDTH - MARGIN_RIGHT,
        z = y(0)
    ));

    for (i, group) in groups.iter().enumerate() {
        let center = MARGIN_LEFT + slot * i as i64 + slot / 2;
        let box_x = center - 70;
        let box_w = 60;
        let box_mid = box_x + box_w / 2;
        let color = step_color(i);

        match &group.summary {
            Some(s) => {
                let (q1, q3) = (y(s.q1_millis), y(s.q3_millis));
                let (low, high) = (y_whole(s.lower_whisker), y_whole(s.upper_whisker));
                svg.push_str(&format!(
                    "  <line x1=\"{box_mid}\" y1=\"{high}\" x2=\"{box_mid}\" y2=\"{q3}\" stroke=\"{color}\"/>\n\
                     \x20 <line x1=\"{box_mid}\" y1=\"{q1}\" x2=\"{box_mid}\" y2=\"{low}\" stroke=\"{color}\"/>\n\
                     \x20 <line x1=\"{a}\" y1=\"{high}\" x2=\"{b}\" y2=\"{high}\" stroke=\"{color}\"/>\n\
                     \x20 <line x1=\"{a}\" y1=\"{low}\" x2=\"{b}\" y2=\"{low}\" stroke=\"{color}\"/>\n",
                    a = box_mid - 12,
                    b = box_mid + 12,
                ));
                svg.push_str(&format!(
                    "  <rect class=\"box\" x=\"{box_x}\" y=\"{q3}\" width=\"{box_w}\" height=\"{h}\" fill=\"{color}\" fill-opacity=\"0.3\" stroke=\"{color}\"><title>q1 {a} / median {m} / q3 {b}</title></rect>\n",
                    h = (q1 - q3).max(1),
                    a = format_millis(s.q1_millis),
                    m = format_millis(s.median_millis),
                    b = format_millis(s.q3_millis),
                ));
                svg.push_str(&format!(
                    "  <line x1=\"{box_x}\" y1=\"{m}\" x2=\"{e}\" y2=\"{m}\" stroke=\"{color}\" stroke-width=\"3\"/>\n",
                    m = y(s.median_millis),
                    e = box_x + box_w
                ));

                for (j, point) in group.points.iter().enumerate() {
                    let outlier = s.outliers.contains(&point.delta);
                    svg.push_str(&format!(
                        "  <circle class=\"point\" cx=\"{cx}\" cy=\"{cy}\" r=\"4\" fill=\"{fill}\" fill-opacity=\"0.8\"><title>{name} (family {family}): {delta:+} pts</title></circle>\n",
                        cx = center + 10 + jitter(j),
                        cy = y_whole(point.delta),
                        fill = if outlier { OUTLIER_COLOR } else { color },
                        name = escape(&point.name),
                        family = point.family,
                        delta = point.delta,
                    ));
                }
            }
            None => {
                svg.push_str(&format!(
                    "  <text x=\"{center}\" y=\"{y0}\" text-anchor=\"middle\" fill=\"#888\">no data</text>\n",
                    y0 = y(0) - 8
                ));
            }
        }

        svg.push_str(&format!(
            "  <text x=\"{center}\" y=\"{ty}\" text-anchor=\"middle\">{label}</text>\n",
            ty = HEIGHT - MARGIN_BOTTOM + 24,
            label = escape(&group.label)
        ));
    }

    svg.push_str("</svg>\n");
    svg
}

/// Deterministic horizontal scatter so equal deltas stay distinguishable.
fn jitter(index: usize) -> i64 {
    (index as i64 * 37) % 61
}

// =============================================================================
// FLOW DIAGRAM
// =============================================================================

const FLOW_HEIGHT: i64 = 320;
const FLOW_MARGIN: i64 = 20;
const NODE_PADDING: i64 = 16;
const NODE_WIDTH: i64 = 16;
const LEFT_X: i64 = 180;
const RIGHT_X: i64 = 440;

#[derive(Debug, Clone, Copy)]
struct NodeBox {
    y: i64,
    height: i64,
}

/// Trigger-to-stage flow as bands between two node columns.
///
/// Returns `None` when no evolved member has a trigger.
pub fn flow_diagram(flow: &TriggerFlow) -> Option<String> {
    if flow.is_empty() {
        return None;
    }

    let sources: Vec<usize> = (0..flow.nodes.len())
        .filter(|n| flow.links.iter().any(|l| l.source == *n))
        .collect();
    let targets: Vec<usize> = (0..flow.nodes.len())
        .filter(|n| flow.links.iter().any(|l| l.target == *n))
        .collect();

    let total: i64 = flow.links.iter().map(|l| l.value as i64).sum::<i64>().max(1);
    let rows = sources.len().max(targets.len()) as i64;
    let available = (FLOW_HEIGHT - 2 * FLOW_MARGIN - (rows - 1).max(0) * NODE_PADDING).max(10);
    let thickness = |value: u64| ((value as i64).saturating_mul(available) / total).max(2);

    // Node height is the sum of its band thicknesses so bands tile it exactly.
    let stack = |column: &[usize], side: fn(&evodash_core::FlowLink) -> usize| {
        let mut y = FLOW_MARGIN;
        let mut boxes = BTreeMap::new();
        for node in column {
            let height: i64 = flow
                .links
                .iter()
                .filter(|l| side(l) == *node)
                .map(|l| thickness(l.value))
                .sum();
            boxes.insert(*node, NodeBox { y, height });
            y += height + NODE_PADDING;
        }
        boxes
    };
    let left = stack(&sources, |l| l.source);
    let right = stack(&targets, |l| l.target);

    let name = |node: usize| flow.nodes.get(node).map_or("?", String::as_str);
    let mut svg = open_svg("Evolution trigger to stage reached", FLOW_HEIGHT);

    let x0 = LEFT_X + NODE_WIDTH;
    let x1 = RIGHT_X;
    let xm = (x0 + x1) / 2;
    let mut source_offset: BTreeMap<usize, i64> = BTreeMap::new();
    let mut target_offset: BTreeMap<usize, i64> = BTreeMap::new();

    for link in &flow.links {
        let (Some(src), Some(dst)) = (left.get(&link.source), right.get(&link.target)) else {
            continue;
        };
        let t = thickness(link.value);
        let so = source_offset.entry(link.source).or_insert(0);
        let to = target_offset.entry(link.target).or_insert(0);
        let sy = src.y + *so;
        let ty = dst.y + *to;
        *so += t;
        *to += t;

        svg.push_str(&format!(
            "  <path class=\"link\" d=\"M{x0},{sy} C{xm},{sy} {xm},{ty} {x1},{ty} L{x1},{tb} C{xm},{tb} {xm},{sb} {x0},{sb} Z\" fill=\"{TRIGGER_COLOR}\" fill-opacity=\"0.35\"><title>{s} → {d}: {v}</title></path>\n",
            tb = ty + t,
            sb = sy + t,
            s = escape(name(link.source)),
            d = escape(name(link.target)),
            v = link.value,
        ));
    }

    for (node, b) in &left {
        svg.push_str(&format!(
            "  <rect class=\"node\" x=\"{LEFT_X}\" y=\"{y}\" width=\"{NODE_WIDTH}\" height=\"{h}\" fill=\"{TRIGGER_COLOR}\"/>\n\
             \x20 <text x=\"{tx}\" y=\"{ty}\" text-anchor=\"end\" dominant-baseline=\"middle\">{label} ({total})</text>\n",
            y = b.y,
            h = b.height,
            tx = LEFT_X - 8,
            ty = b.y + b.height / 2,
            label = escape(name(*node)),
            total = flow.node_total(*node),
        ));
    }
    for (i, (node, b)) in right.iter().enumerate() {
        svg.push_str(&format!(
            "  <rect class=\"node\" x=\"{RIGHT_X}\" y=\"{y}\" width=\"{NODE_WIDTH}\" height=\"{h}\" fill=\"{color}\"/>\n\
             \x20 <text x=\"{tx}\" y=\"{ty}\" dominant-baseline=\"middle\">{label} ({total})</text>\n",
            y = b.y,
            h = b.height,
            color = step_color(i),
            tx = RIGHT_X + NODE_WIDTH + 8,
            ty = b.y + b.height / 2,
            label = escape(name(*node)),
            total = flow.node_total(*node),
        ));
    }

    svg.push_str("</svg>\n");
    Some(svg)
}

// =============================================================================
// TESTS
// =============================================================================
