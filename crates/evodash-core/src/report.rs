//! # Report Model
//!
//! Everything the presenters show, built from the Transformer's output and
//! the raw evolution triggers. Renderers (terminal, dashboard) only format
//! what is in a [`Report`]; no derived value is recomputed downstream.
//!
//! ## Fixed-point
//!
//! Means and quartiles are held in thousandths (`*_millis`) and rounded
//! half-to-even, so the whole model stays in integer arithmetic.

use crate::primitives::FIXED_POINT_SCALE;
use crate::stage::Stage;
use crate::transform::FamilyTable;
use crate::{EvolutionEdge, FamilyId, Score};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// =============================================================================
// FIXED-POINT HELPERS
// =============================================================================

/// Divide and round to nearest, ties to even. `den` must be positive.
fn round_div(num: i64, den: i64) -> i64 {
    let quotient = num.div_euclid(den);
    let twice_rem = num.rem_euclid(den).saturating_mul(2);
    if twice_rem > den || (twice_rem == den && quotient % 2 != 0) {
        quotient.saturating_add(1)
    } else {
        quotient
    }
}

/// Render a thousandths value with trailing zeros trimmed (`96500` -> `96.5`).
#[must_use]
pub fn format_millis(millis: i64) -> String {
    let sign = if millis < 0 { "-" } else { "" };
    let abs = millis.unsigned_abs();
    let scale = FIXED_POINT_SCALE as u64;
    let whole = abs / scale;
    let frac = abs % scale;
    if frac == 0 {
        return format!("{sign}{whole}");
    }
    let digits = format!("{frac:03}");
    format!("{sign}{whole}.{}", digits.trim_end_matches('0'))
}

// =============================================================================
// SUMMARY METRICS
// =============================================================================

/// Mean gain of the members that reached a stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeanDelta {
    pub stage: Stage,
    /// Exact sum of the deltas at this stage.
    pub sum: i64,
    /// Number of rows with a delta at this stage.
    pub samples: u64,
}

impl MeanDelta {
    /// Aggregate the deltas of every row at `stage`.
    #[must_use]
    pub fn at_stage(table: &FamilyTable, stage: Stage) -> Self {
        let (sum, samples) = table
            .at_stage(stage)
            .filter_map(|r| r.delta)
            .fold((0i64, 0u64), |(sum, n), d| {
                (sum.saturating_add(d), n.saturating_add(1))
            });
        Self {
            stage,
            sum,
            samples,
        }
    }

    /// Mean in thousandths, or `None` without samples.
    #[must_use]
    pub fn mean_millis(&self) -> Option<i64> {
        (self.samples > 0).then(|| {
            round_div(
                self.sum.saturating_mul(FIXED_POINT_SCALE),
                self.samples as i64,
            )
        })
    }

    /// Mean rounded to the nearest whole point, or `None` without samples.
    #[must_use]
    pub fn rounded(&self) -> Option<i64> {
        (self.samples > 0).then(|| round_div(self.sum, self.samples as i64))
    }

    /// Label of the transition this mean describes.
    #[must_use]
    pub fn label(&self) -> &'static str {
        self.stage.transition().unwrap_or("Base")
    }
}

/// The two headline metrics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    /// Base -> stage 2.
    pub first_evolution: MeanDelta,
    /// Stage 2 -> stage 3.
    pub second_evolution: MeanDelta,
}

/// One bar of the mean-gain comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bar {
    pub label: String,
    pub mean_millis: Option<i64>,
    /// Same rounding as the headline metric.
    pub rounded: Option<i64>,
}

// =============================================================================
// DELTA DISTRIBUTION
// =============================================================================

/// One point of the distribution plot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeltaPoint {
    pub name: String,
    pub family: FamilyId,
    pub delta: i64,
}

/// Five-number summary with 1.5·IQR whiskers.
///
/// Quartiles are interpolated (thousandths); whiskers and outliers are
/// actual data points.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoxSummary {
    pub min: i64,
    pub q1_millis: i64,
    pub median_millis: i64,
    pub q3_millis: i64,
    pub max: i64,
    pub lower_whisker: i64,
    pub upper_whisker: i64,
    pub outliers: Vec<i64>,
}

impl BoxSummary {
    /// Summarize a set of values; `None` when empty.
    #[must_use]
    pub fn from_values(values: &[i64]) -> Option<Self> {
        let mut sorted = values.to_vec();
        sorted.sort_unstable();
        let (&min, &max) = (sorted.first()?, sorted.last()?);

        let q1_millis = quantile_millis(&sorted, 1, 4);
        let median_millis = quantile_millis(&sorted, 1, 2);
        let q3_millis = quantile_millis(&sorted, 3, 4);

        // Fences at q1 - 1.5·IQR and q3 + 1.5·IQR, compared at doubled scale.
        let iqr = q3_millis.saturating_sub(q1_millis);
        let lower_fence_x2 = q1_millis.saturating_mul(2).saturating_sub(iqr.saturating_mul(3));
        let upper_fence_x2 = q3_millis.saturating_mul(2).saturating_add(iqr.saturating_mul(3));
        let inside = |v: i64| {
            let v_x2 = v.saturating_mul(FIXED_POINT_SCALE).saturating_mul(2);
            v_x2 >= lower_fence_x2 && v_x2 <= upper_fence_x2
        };

        let lower_whisker = sorted.iter().copied().find(|v| inside(*v)).unwrap_or(min);
        let upper_whisker = sorted
            .iter()
            .rev()
            .copied()
            .find(|v| inside(*v))
            .unwrap_or(max);
        let outliers = sorted.iter().copied().filter(|v| !inside(*v)).collect();

        Some(Self {
            min,
            q1_millis,
            median_millis,
            q3_millis,
            max,
            lower_whisker,
            upper_whisker,
            outliers,
        })
    }
}

/// Linear-interpolated quantile `num/den` of a sorted, non-empty slice.
fn quantile_millis(sorted: &[i64], num: usize, den: usize) -> i64 {
    let last = sorted.len().saturating_sub(1);
    let position = last.saturating_mul(num);
    let index = position / den;
    let remainder = position % den;

    let low = sorted.get(index).copied().unwrap_or_default();
    let high = sorted.get(index.saturating_add(1)).copied().unwrap_or(low);
    let step = high
        .saturating_sub(low)
        .saturating_mul(FIXED_POINT_SCALE)
        .saturating_mul(remainder as i64)
        / den as i64;

    low.saturating_mul(FIXED_POINT_SCALE).saturating_add(step)
}

/// Deltas of the members that reached one stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeltaGroup {
    pub stage: Stage,
    pub label: String,
    pub points: Vec<DeltaPoint>,
    pub summary: Option<BoxSummary>,
}

// =============================================================================
// TRIGGER FLOW
// =============================================================================

/// Weighted link between two flow nodes (indices into `TriggerFlow::nodes`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowLink {
    pub source: usize,
    pub target: usize,
    pub value: u64,
}

/// Flow from evolution trigger to the stage reached.
///
/// Nodes are the distinct triggers (first-appearance order) followed by the
/// three stage names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerFlow {
    pub nodes: Vec<String>,
    pub links: Vec<FlowLink>,
}

impl TriggerFlow {
    /// Re-join table rows with edge triggers by target name and count links.
    ///
    /// The join is on name only (a row matches every edge ending at its
    /// name). Rows without a matching edge or with a null trigger carry no
    /// link; base-stage rows never do.
    #[must_use]
    pub fn build(table: &FamilyTable, edges: &[EvolutionEdge]) -> Self {
        let mut triggers_by_target: BTreeMap<&str, Vec<Option<&str>>> = BTreeMap::new();
        for edge in edges {
            if let Some(to) = edge.to.as_deref() {
                triggers_by_target
                    .entry(to)
                    .or_default()
                    .push(edge.trigger.as_deref());
            }
        }

        let joined: Vec<(Stage, &str)> = table
            .rows
            .iter()
            .flat_map(|row| {
                triggers_by_target
                    .get(row.name.as_str())
                    .into_iter()
                    .flatten()
                    .filter_map(move |t| t.map(|t| (row.stage, t)))
            })
            .collect();

        let mut nodes: Vec<String> = Vec::new();
        for (_, trigger) in &joined {
            if !nodes.iter().any(|n| n == trigger) {
                nodes.push((*trigger).to_string());
            }
        }
        let trigger_count = nodes.len();
        nodes.extend(Stage::ALL.iter().map(|s| s.name().to_string()));

        let mut links: Vec<FlowLink> = Vec::new();
        let mut link_index: BTreeMap<(usize, usize), usize> = BTreeMap::new();
        for (stage, trigger) in joined {
            if stage == Stage::Base {
                continue;
            }
            let Some(source) = nodes.iter().position(|n| n == trigger) else {
                continue;
            };
            let target = trigger_count + usize::from(stage.number() - 1);

            match link_index.get(&(source, target)) {
                Some(&i) => {
                    if let Some(link) = links.get_mut(i) {
                        link.value = link.value.saturating_add(1);
                    }
                }
                None => {
                    link_index.insert((source, target), links.len());
                    links.push(FlowLink {
                        source,
                        target,
                        value: 1,
                    });
                }
            }
        }

        Self { nodes, links }
    }

    /// True when no evolved member has a trigger.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// Total flow through a node (incoming + outgoing).
    #[must_use]
    pub fn node_total(&self, node: usize) -> u64 {
        self.links
            .iter()
            .filter(|l| l.source == node || l.target == node)
            .map(|l| l.value)
            .sum()
    }
}

// =============================================================================
// TABLE VIEW
// =============================================================================

/// One row of the raw table view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRow {
    pub name: String,
    pub family: FamilyId,
    pub stage: Stage,
    pub score: Score,
    pub delta: Option<i64>,
}

// =============================================================================
// REPORT
// =============================================================================

/// The complete presenter data model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub summary: Summary,
    pub bars: Vec<Bar>,
    pub distribution: Vec<DeltaGroup>,
    pub flow: TriggerFlow,
    pub table: Vec<TableRow>,
}

impl Report {
    /// Build the report from the family table and the raw edges.
    #[must_use]
    pub fn build(table: &FamilyTable, edges: &[EvolutionEdge]) -> Self {
        let summary = Summary {
            first_evolution: MeanDelta::at_stage(table, Stage::Second),
            second_evolution: MeanDelta::at_stage(table, Stage::Third),
        };

        let bars = [&summary.first_evolution, &summary.second_evolution]
            .into_iter()
            .map(|m| Bar {
                label: m.label().to_string(),
                mean_millis: m.mean_millis(),
                rounded: m.rounded(),
            })
            .collect();

        let distribution = [Stage::Second, Stage::Third]
            .into_iter()
            .map(|stage| {
                let points: Vec<DeltaPoint> = table
                    .at_stage(stage)
                    .filter_map(|r| {
                        r.delta.map(|delta| DeltaPoint {
                            name: r.name.clone(),
                            family: r.family,
                            delta,
                        })
                    })
                    .collect();
                let values: Vec<i64> = points.iter().map(|p| p.delta).collect();
                DeltaGroup {
                    stage,
                    label: stage.evolution_kind().unwrap_or_default().to_string(),
                    summary: BoxSummary::from_values(&values),
                    points,
                }
            })
            .collect();

        let rows = table
            .rows
            .iter()
            .map(|r| TableRow {
                name: r.name.clone(),
                family: r.family,
                stage: r.stage,
                score: r.score,
                delta: r.delta,
            })
            .collect();

        Self {
            summary,
            bars,
            distribution,
            flow: TriggerFlow::build(table, edges),
            table: rows,
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::transform;
    use crate::{AttributeRecord, Dataset, Entity};

    fn dataset() -> Dataset {
        let totals = [
            (1, "Charmander", 309),
            (2, "Charmeleon", 405),
            (3, "Charizard", 534),
            (4, "Magikarp", 200),
            (5, "Gyarados", 540),
            (6, "Oddish", 320),
            (7, "Gloom", 395),
            (8, "Vileplume", 490),
            (9, "Bellossom", 490),
        ];
        let entities = totals.iter().map(|(id, n, _)| Entity::new(*id, *n)).collect();
        let attributes = totals
            .iter()
            .map(|(id, _, t)| AttributeRecord::new(*id, "hp", *t))
            .collect();
        let edges = vec![
            EvolutionEdge::new(2, "Charmander", "Charmeleon", Some("level-up")),
            EvolutionEdge::new(2, "Charmeleon", "Charizard", Some("level-up")),
            EvolutionEdge::new(7, "Magikarp", "Gyarados", Some("level-up")),
            EvolutionEdge::new(18, "Oddish", "Gloom", Some("level-up")),
            EvolutionEdge::new(18, "Gloom", "Vileplume", Some("use-item")),
            EvolutionEdge::new(18, "Gloom", "Bellossom", Some("use-item")),
        ];
        Dataset::new(entities, attributes, edges)
    }

    fn build() -> Report {
        let data = dataset();
        Report::build(&transform(&data).table, &data.edges)
    }

    #[test]
    fn round_half_to_even() {
        assert_eq!(round_div(5, 2), 2);
        assert_eq!(round_div(7, 2), 4);
        assert_eq!(round_div(-5, 2), -2);
        assert_eq!(round_div(10, 3), 3);
        assert_eq!(round_div(11, 3), 4);
    }

    #[test]
    fn millis_formatting() {
        assert_eq!(format_millis(96_000), "96");
        assert_eq!(format_millis(96_500), "96.5");
        assert_eq!(format_millis(-1_250), "-1.25");
        assert_eq!(format_millis(7), "0.007");
    }

    #[test]
    fn summary_means() {
        let report = build();
        // Stage 2: Charmeleon +96, Gyarados +340, Gloom +75
        assert_eq!(report.summary.first_evolution.samples, 3);
        assert_eq!(report.summary.first_evolution.sum, 511);
        assert_eq!(report.summary.first_evolution.mean_millis(), Some(170_333));
        assert_eq!(report.summary.first_evolution.rounded(), Some(170));
        // Stage 3: Charizard +129, Vileplume +95, Bellossom +0
        assert_eq!(report.summary.second_evolution.sum, 224);
        assert_eq!(report.summary.second_evolution.samples, 3);
        assert_eq!(report.bars.len(), 2);
        assert_eq!(report.bars[0].label, "Base → 1st Evolution");
        assert_eq!(report.bars[0].rounded, Some(170));
    }

    #[test]
    fn empty_stage_has_no_mean() {
        let mean = MeanDelta::at_stage(&FamilyTable::default(), Stage::Third);
        assert_eq!(mean.mean_millis(), None);
        assert_eq!(mean.rounded(), None);
    }

    #[test]
    fn distribution_points_carry_names() {
        let report = build();
        let first = &report.distribution[0];
        assert_eq!(first.stage, Stage::Second);
        assert!(first.points.iter().any(|p| p.name == "Gyarados" && p.delta == 340));
    }

    #[test]
    fn box_summary_linear_quartiles() {
        let summary = BoxSummary::from_values(&[4, 1, 3, 2]).expect("summary");
        assert_eq!(summary.min, 1);
        assert_eq!(summary.q1_millis, 1_750);
        assert_eq!(summary.median_millis, 2_500);
        assert_eq!(summary.q3_millis, 3_250);
        assert_eq!(summary.max, 4);
        assert!(summary.outliers.is_empty());
        assert!(BoxSummary::from_values(&[]).is_none());
    }

    #[test]
    fn box_summary_flags_outliers() {
        let summary = BoxSummary::from_values(&[80, 90, 95, 100, 105, 340]).expect("summary");
        assert_eq!(summary.outliers, vec![340]);
        assert_eq!(summary.upper_whisker, 105);
        assert_eq!(summary.lower_whisker, 80);
    }

    #[test]
    fn single_value_box() {
        let summary = BoxSummary::from_values(&[42]).expect("summary");
        assert_eq!(summary.median_millis, 42_000);
        assert_eq!(summary.lower_whisker, 42);
        assert_eq!(summary.upper_whisker, 42);
    }

    #[test]
    fn flow_counts_links_per_trigger_and_stage() {
        let report = build();
        let flow = &report.flow;
        assert_eq!(
            flow.nodes,
            vec!["level-up", "use-item", "Base Stage", "Stage 2", "Stage 3"]
        );
        // level-up -> Stage 2: Charmeleon, Gyarados, Gloom
        assert!(flow.links.contains(&FlowLink { source: 0, target: 3, value: 3 }));
        // level-up -> Stage 3: Charizard
        assert!(flow.links.contains(&FlowLink { source: 0, target: 4, value: 1 }));
        // use-item -> Stage 3: Vileplume, Bellossom
        assert!(flow.links.contains(&FlowLink { source: 1, target: 4, value: 2 }));
        assert_eq!(flow.node_total(4), 3);
    }

    #[test]
    fn flow_links_every_edge_ending_at_a_name() {
        let data = Dataset::new(
            vec![Entity::new(1, "A"), Entity::new(2, "B")],
            vec![AttributeRecord::new(1, "hp", 10), AttributeRecord::new(2, "hp", 50)],
            vec![
                EvolutionEdge::new(1, "A", "B", Some("level-up")),
                // Same target in another family, whose source is unknown.
                EvolutionEdge::new(9, "X", "B", Some("trade")),
            ],
        );
        let table = transform(&data).table;
        // Family 1: A, B. Family 9: B alone (base stage).
        assert_eq!(table.len(), 3);

        let flow = TriggerFlow::build(&table, &data.edges);
        assert_eq!(
            flow.nodes,
            vec!["level-up", "trade", "Base Stage", "Stage 2", "Stage 3"]
        );
        // Only the stage-2 B row links, once per matching edge.
        assert_eq!(
            flow.links,
            vec![
                FlowLink { source: 0, target: 3, value: 1 },
                FlowLink { source: 1, target: 3, value: 1 },
            ]
        );
    }

    #[test]
    fn flow_without_triggers_is_empty() {
        let mut data = dataset();
        for edge in &mut data.edges {
            edge.trigger = None;
        }
        let report = Report::build(&transform(&data).table, &data.edges);
        assert!(report.flow.is_empty());
        assert_eq!(report.flow.nodes.len(), 3);
    }

    #[test]
    fn table_mirrors_family_rows() {
        let report = build();
        assert_eq!(report.table.len(), 9);
        let first = &report.table[0];
        assert_eq!(first.name, "Charmander");
        assert_eq!(first.delta, None);
    }
}
