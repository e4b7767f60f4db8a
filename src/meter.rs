//! Level meter layout (decibel-scaled bar graph)
//!
//! Converts linear peak/RMS levels into vertical bars with peak-hold ticks.
//! All geometry is in meter units on the `meters` surface: bars are 15 units
//! wide, separated by a 5 unit gutter, and span 80 units for the 40 dB range
//! shown. Inputs are laid out first, outputs continue on the same cursor.
//!
//! ```text
//!  y=5   ┬ 0 dB
//!        │   ──        <- peak tick
//!        │  ████
//!  y=85  ┴ -40 dB      <- common baseline
//! ```

use crate::message::MeterSnapshot;

/// Top margin, and the space between neighbouring bars
pub const GUTTER: f64 = 5.0;
pub const BAR_WIDTH: f64 = 15.0;

pub const DB_FLOOR: f64 = -40.0;
pub const DB_CEILING: f64 = 0.0;
/// Meter units per decibel
pub const DB_SCALE: f64 = 2.0;
/// Height of a full-scale bar
pub const METER_RANGE: f64 = -DB_FLOOR * DB_SCALE;
/// Bottom edge shared by every bar
pub const BASELINE: f64 = GUTTER + METER_RANGE;
/// Height the `meters` surface needs for a full-scale bar plus margins
pub const SURFACE_HEIGHT: f64 = BASELINE + GUTTER;
/// Horizontal cursor advance per channel
pub const CHANNEL_STRIDE: f64 = BAR_WIDTH + GUTTER;

/// Linear level to decibels, clamped to the displayed range.
///
/// Zero, negative and NaN levels sit on the floor; anything above unity
/// (clipping) is flattened to the ceiling.
pub fn level_to_db(level: f64) -> f64 {
    if level.is_nan() || level <= 0.0 {
        return DB_FLOOR;
    }
    (10.0 * level.log10()).clamp(DB_FLOOR, DB_CEILING)
}

/// Clamped decibels in meter units, `-80..=0`
pub fn scaled_level(level: f64) -> f64 {
    level_to_db(level) * DB_SCALE
}

/// Y coordinate of the top of a bar (or of a tick) for `level`
pub fn level_top(level: f64) -> f64 {
    GUTTER - scaled_level(level)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelGroup {
    Input,
    Output,
}

impl ChannelGroup {
    pub fn label(self) -> &'static str {
        match self {
            ChannelGroup::Input => "IN",
            ChannelGroup::Output => "OUT",
        }
    }
}

/// Geometry for one channel in one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeterBar {
    pub group: ChannelGroup,
    /// Channel index within its group
    pub channel: usize,
    pub left_offset: f64,
    pub rms_top: f64,
    pub rms_height: f64,
    /// `None` when the snapshot carries no peak value for this channel
    pub peak_tick_y: Option<f64>,
}

impl MeterBar {
    fn new(group: ChannelGroup, channel: usize, left: f64, rms: f64, peak: Option<f64>) -> Self {
        let scaled = scaled_level(rms);
        Self {
            group,
            channel,
            left_offset: left,
            rms_top: GUTTER - scaled,
            rms_height: METER_RANGE + scaled,
            peak_tick_y: peak.map(level_top),
        }
    }
}

/// Lay out every channel of a snapshot, inputs then outputs.
///
/// The channel count of a group is the length of its RMS array. A missing
/// RMS array contributes no bars; a missing peak entry contributes no tick.
pub fn layout(snapshot: &MeterSnapshot) -> Vec<MeterBar> {
    let groups = [
        (
            ChannelGroup::Input,
            snapshot.input_meter_rms_levels.as_deref(),
            snapshot.input_meter_peak_levels.as_deref(),
        ),
        (
            ChannelGroup::Output,
            snapshot.output_meter_rms_levels.as_deref(),
            snapshot.output_meter_peak_levels.as_deref(),
        ),
    ];

    let mut bars = Vec::new();
    let mut cursor = GUTTER;
    for (group, rms_levels, peak_levels) in groups {
        let Some(rms_levels) = rms_levels else { continue };
        for (channel, &rms) in rms_levels.iter().enumerate() {
            let peak = peak_levels.and_then(|p| p.get(channel)).copied();
            bars.push(MeterBar::new(group, channel, cursor, rms, peak));
            cursor += CHANNEL_STRIDE;
        }
    }
    bars
}

/// A drawing target for the meter strip, in meter units.
pub trait Surface {
    fn clear(&mut self);
    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64);
    /// Horizontal line from `x0` to `x1` at `y`
    fn hline(&mut self, x0: f64, x1: f64, y: f64);
}

/// Clear `surface` and draw the whole snapshot. Returns the bars drawn.
pub fn draw_meters<S: Surface>(surface: &mut S, snapshot: &MeterSnapshot) -> Vec<MeterBar> {
    surface.clear();
    let bars = layout(snapshot);
    for bar in &bars {
        surface.fill_rect(bar.left_offset, bar.rms_top, BAR_WIDTH, bar.rms_height);
        if let Some(y) = bar.peak_tick_y {
            surface.hline(bar.left_offset, bar.left_offset + BAR_WIDTH, y);
        }
    }
    bars
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    enum Op {
        Clear,
        Rect(f64, f64, f64, f64),
        Line(f64, f64, f64),
    }

    #[derive(Default)]
    struct Recorder {
        ops: Vec<Op>,
    }

    impl Surface for Recorder {
        fn clear(&mut self) {
            self.ops.clear();
            self.ops.push(Op::Clear);
        }
        fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
            self.ops.push(Op::Rect(x, y, width, height));
        }
        fn hline(&mut self, x0: f64, x1: f64, y: f64) {
            self.ops.push(Op::Line(x0, x1, y));
        }
    }

    fn snapshot(inputs: usize, outputs: usize, level: f64) -> MeterSnapshot {
        MeterSnapshot {
            input_meter_peak_levels: Some(vec![level; inputs]),
            input_meter_rms_levels: Some(vec![level; inputs]),
            output_meter_peak_levels: Some(vec![level; outputs]),
            output_meter_rms_levels: Some(vec![level; outputs]),
        }
    }

    #[test]
    fn db_endpoints() {
        assert_eq!(level_to_db(1.0), 0.0);
        assert_eq!(level_to_db(0.0), DB_FLOOR);
        assert!((level_to_db(0.1) + 10.0).abs() < 1e-9);
        assert!((level_to_db(0.01) + 20.0).abs() < 1e-9);
    }

    #[test]
    fn db_stays_in_range_for_unit_interval() {
        for i in 0..=1000 {
            let r = i as f64 / 1000.0;
            let db = level_to_db(r);
            assert!((DB_FLOOR..=DB_CEILING).contains(&db), "r={} db={}", r, db);
        }
    }

    #[test]
    fn out_of_contract_levels_clamp() {
        assert_eq!(level_to_db(-0.5), DB_FLOOR);
        assert_eq!(level_to_db(f64::NAN), DB_FLOOR);
        assert_eq!(level_to_db(4.0), DB_CEILING);
        assert_eq!(level_to_db(f64::INFINITY), DB_CEILING);
        assert_eq!(level_to_db(1e-9), DB_FLOOR);
    }

    #[test]
    fn scaling_is_monotonic() {
        let mut prev = scaled_level(1e-6);
        for i in 1..=1000 {
            let next = scaled_level(i as f64 / 1000.0);
            assert!(next >= prev);
            prev = next;
        }
    }

    #[test]
    fn bars_share_a_baseline() {
        for &level in &[0.0, 1e-5, 0.001, 0.1, 0.5, 1.0, 2.0, -1.0] {
            let bars = layout(&snapshot(1, 0, level));
            let bar = bars[0];
            assert!((bar.rms_top + bar.rms_height - BASELINE).abs() < 1e-9);
            assert!(bar.rms_height >= 0.0 && bar.rms_height <= METER_RANGE);
        }
    }

    #[test]
    fn full_scale_and_silent_geometry() {
        let bars = layout(&snapshot(2, 0, 0.0));
        assert_eq!(bars[0].rms_top, GUTTER + METER_RANGE);
        assert_eq!(bars[0].rms_height, 0.0);
        assert_eq!(bars[0].peak_tick_y, Some(BASELINE));

        let bars = layout(&snapshot(1, 0, 1.0));
        assert_eq!(bars[0].rms_top, GUTTER);
        assert_eq!(bars[0].rms_height, METER_RANGE);
        assert_eq!(bars[0].peak_tick_y, Some(GUTTER));
    }

    #[test]
    fn adapts_to_channel_count() {
        for &count in &[0usize, 1, 8] {
            let bars = layout(&snapshot(count, 0, 0.5));
            assert_eq!(bars.len(), count);
            for (i, bar) in bars.iter().enumerate() {
                assert_eq!(bar.left_offset, GUTTER + i as f64 * (BAR_WIDTH + GUTTER));
                assert_eq!(bar.channel, i);
            }
        }
    }

    #[test]
    fn outputs_follow_inputs_on_one_cursor() {
        let bars = layout(&snapshot(2, 3, 0.5));
        assert_eq!(bars.len(), 5);
        assert!(bars[..2].iter().all(|b| b.group == ChannelGroup::Input));
        assert!(bars[2..].iter().all(|b| b.group == ChannelGroup::Output));
        assert_eq!(bars[2].channel, 0);
        assert_eq!(bars[2].left_offset, GUTTER + 2.0 * CHANNEL_STRIDE);
        assert_eq!(bars[4].left_offset, GUTTER + 4.0 * CHANNEL_STRIDE);
    }

    #[test]
    fn peak_tick_uses_peak_level() {
        let snap = MeterSnapshot {
            input_meter_peak_levels: Some(vec![1.0]),
            input_meter_rms_levels: Some(vec![0.01]),
            ..Default::default()
        };
        let bar = layout(&snap)[0];
        assert_eq!(bar.peak_tick_y, Some(GUTTER));
        assert!((bar.rms_top - (GUTTER + 40.0)).abs() < 1e-9);
    }

    #[test]
    fn missing_arrays_skip_only_their_part() {
        let snap = MeterSnapshot {
            input_meter_peak_levels: Some(vec![0.5, 0.5]),
            input_meter_rms_levels: None,
            output_meter_peak_levels: None,
            output_meter_rms_levels: Some(vec![0.5]),
        };
        let bars = layout(&snap);
        assert_eq!(bars.len(), 1);
        assert_eq!(bars[0].group, ChannelGroup::Output);
        assert_eq!(bars[0].left_offset, GUTTER);
        assert_eq!(bars[0].peak_tick_y, None);
    }

    #[test]
    fn short_peak_array_drops_trailing_ticks() {
        let snap = MeterSnapshot {
            input_meter_peak_levels: Some(vec![0.5]),
            input_meter_rms_levels: Some(vec![0.5, 0.5]),
            ..Default::default()
        };
        let bars = layout(&snap);
        assert!(bars[0].peak_tick_y.is_some());
        assert!(bars[1].peak_tick_y.is_none());
    }

    #[test]
    fn draw_clears_first_and_is_idempotent() {
        let snap = snapshot(2, 2, 0.3);
        let mut surface = Recorder::default();
        draw_meters(&mut surface, &snap);
        let first = surface.ops.clone();
        draw_meters(&mut surface, &snap);
        assert_eq!(first, surface.ops);
        assert_eq!(first[0], Op::Clear);
        // one rect and one tick per channel
        assert_eq!(first.len(), 1 + 4 * 2);
    }

    #[test]
    fn draw_empty_snapshot_only_clears() {
        let mut surface = Recorder::default();
        let bars = draw_meters(&mut surface, &MeterSnapshot::default());
        assert!(bars.is_empty());
        assert_eq!(surface.ops, vec![Op::Clear]);
    }

    #[test]
    fn tick_spans_bar_width() {
        let mut surface = Recorder::default();
        draw_meters(&mut surface, &snapshot(1, 0, 1.0));
        assert_eq!(surface.ops[1], Op::Rect(GUTTER, GUTTER, BAR_WIDTH, METER_RANGE));
        assert_eq!(surface.ops[2], Op::Line(GUTTER, GUTTER + BAR_WIDTH, GUTTER));
    }
}
