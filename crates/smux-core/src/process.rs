// Server process resource panel.

use smux_api::ProcessStatus;

use crate::display::TextField;
use crate::fmt::{fmt_compact_time, fmt_fixed1};

/// Read-only view of the server's CPU, memory, pid, clock and uptime.
#[derive(Debug, Clone, Default)]
pub struct ProcessView {
    pub mem_curr: TextField,
    pub mem_peak: TextField,
    pub cpu_curr: TextField,
    pub cpu_avg: TextField,
    pub cpu_peak: TextField,
    pub pid: TextField,
    pub time: TextField,
    pub uptime: TextField,
}

impl ProcessView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reformat and write every field. Returns how many fields changed.
    pub fn update(&mut self, proc: &ProcessStatus) -> usize {
        [
            self.mem_curr.set(&fmt_fixed1(proc.mem_curr)),
            self.mem_peak.set(&fmt_fixed1(proc.mem_peak)),
            self.cpu_curr.set(&fmt_fixed1(proc.cpu_curr)),
            self.cpu_avg.set(&fmt_fixed1(proc.cpu_avg)),
            self.cpu_peak.set(&fmt_fixed1(proc.cpu_peak)),
            self.pid.set(&proc.pid.to_string()),
            self.time.set(&fmt_compact_time(&proc.time)),
            self.uptime.set(&proc.uptime),
        ]
        .into_iter()
        .filter(|changed| *changed)
        .count()
    }
}
