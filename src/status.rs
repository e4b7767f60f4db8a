//! Status panel text
//!
//! Projects a [`StatusSnapshot`] onto eight display regions. Regions are
//! owned by the host; the renderer resolves a handle per field once and then
//! only overwrites text.

use crate::message::StatusSnapshot;
use log::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusField {
    ActualSampleRate,
    AverageCpuUsage,
    GroupCount,
    PeakCpuUsage,
    SynthCount,
    SynthdefCount,
    TargetSampleRate,
    UgenCount,
}

impl StatusField {
    /// Display order, which is also the region identifier table order
    pub const ALL: [StatusField; 8] = [
        StatusField::ActualSampleRate,
        StatusField::AverageCpuUsage,
        StatusField::GroupCount,
        StatusField::PeakCpuUsage,
        StatusField::SynthCount,
        StatusField::SynthdefCount,
        StatusField::TargetSampleRate,
        StatusField::UgenCount,
    ];

    /// Stable region identifier
    pub fn id(self) -> &'static str {
        match self {
            StatusField::ActualSampleRate => "actual_sample_rate",
            StatusField::AverageCpuUsage => "average_cpu_usage",
            StatusField::GroupCount => "group_count",
            StatusField::PeakCpuUsage => "peak_cpu_usage",
            StatusField::SynthCount => "synth_count",
            StatusField::SynthdefCount => "synthdef_count",
            StatusField::TargetSampleRate => "target_sample_rate",
            StatusField::UgenCount => "ugen_count",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            StatusField::ActualSampleRate => "Actual sample rate",
            StatusField::AverageCpuUsage => "Average CPU usage",
            StatusField::GroupCount => "Group count",
            StatusField::PeakCpuUsage => "Peak CPU usage",
            StatusField::SynthCount => "Synth count",
            StatusField::SynthdefCount => "SynthDef count",
            StatusField::TargetSampleRate => "Target sample rate",
            StatusField::UgenCount => "UGen count",
        }
    }

    /// Labelled text for this field, or `None` if the snapshot lacks it.
    ///
    /// The actual sample rate is fixed to three decimals while the target
    /// rate is printed as received.
    pub fn format(self, s: &StatusSnapshot) -> Option<String> {
        let label = self.label();
        let text = match self {
            StatusField::ActualSampleRate => format!("{label}: {:.3}", s.actual_sample_rate?),
            StatusField::TargetSampleRate => format!("{label}: {}", s.target_sample_rate?),
            StatusField::AverageCpuUsage => format!("{label}: {:.3}%", s.average_cpu_usage?),
            StatusField::PeakCpuUsage => format!("{label}: {:.3}%", s.peak_cpu_usage?),
            StatusField::GroupCount => format!("{label}: {}", s.group_count?),
            StatusField::SynthCount => format!("{label}: {}", s.synth_count?),
            StatusField::SynthdefCount => format!("{label}: {}", s.synthdef_count?),
            StatusField::UgenCount => format!("{label}: {}", s.ugen_count?),
        };
        Some(text)
    }
}

/// Host-owned set of addressable text regions
pub trait TextRegions {
    type Handle: Copy;

    fn lookup(&self, id: &str) -> Option<Self::Handle>;
    fn set_text(&mut self, handle: Self::Handle, text: String);
}

/// Writes status snapshots into regions resolved at construction
#[derive(Debug, Clone)]
pub struct StatusRenderer<H> {
    handles: [Option<H>; 8],
}

impl<H: Copy> StatusRenderer<H> {
    /// Resolve every field's region once. Fields whose region the host does
    /// not provide are skipped on every render.
    pub fn resolve<R: TextRegions<Handle = H>>(regions: &R) -> Self {
        let handles = StatusField::ALL.map(|field| {
            let handle = regions.lookup(field.id());
            if handle.is_none() {
                warn!("no display region for {}", field.id());
            }
            handle
        });
        Self { handles }
    }

    /// Overwrite each region whose field is present. Returns regions updated.
    pub fn render<R: TextRegions<Handle = H>>(&self, regions: &mut R, snapshot: &StatusSnapshot) -> usize {
        let mut updated = 0;
        for (field, handle) in StatusField::ALL.iter().zip(self.handles.iter()) {
            let Some(handle) = *handle else { continue };
            if let Some(text) = field.format(snapshot) {
                regions.set_text(handle, text);
                updated += 1;
            }
        }
        updated
    }
}
