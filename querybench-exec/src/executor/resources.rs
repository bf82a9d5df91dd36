//! Process CPU and memory sampling from procfs.
//!
//! CPU is reported as CPU time consumed between two samples divided by the wall
//! time between them, so a run keeping two cores busy reports ~200%. Reaped
//! child processes are included, which accounts for multiprocess workers once
//! they have been waited on. Where procfs is unavailable both figures are 0.

use std::time::Instant;

use querybench_core::ResourceUsage;

/// Linux USER_HZ; fixed at 100 by the kernel ABI.
const CLOCK_TICKS_PER_SEC: f64 = 100.0;

#[derive(Debug, Clone, Copy)]
pub struct ResourceSample {
    at: Instant,
    cpu_seconds: Option<f64>,
    rss_mb: Option<f64>,
}

impl ResourceSample {
    pub fn capture() -> Self {
        Self {
            at: Instant::now(),
            cpu_seconds: std::fs::read_to_string("/proc/self/stat")
                .ok()
                .and_then(|s| parse_cpu_seconds(&s)),
            rss_mb: std::fs::read_to_string("/proc/self/status")
                .ok()
                .and_then(|s| parse_rss_mb(&s)),
        }
    }

    /// Whether both CPU time and RSS could be read.
    pub fn is_available(&self) -> bool {
        self.cpu_seconds.is_some() && self.rss_mb.is_some()
    }

    pub fn usage_since(&self, before: &ResourceSample) -> ResourceUsage {
        let wall = self.at.duration_since(before.at).as_secs_f64();
        let cpu_usage_percent = match (before.cpu_seconds, self.cpu_seconds) {
            (Some(b), Some(a)) if wall > 0.0 => ((a - b).max(0.0) / wall) * 100.0,
            _ => 0.0,
        };
        let memory_usage_mb = match (before.rss_mb, self.rss_mb) {
            (Some(b), Some(a)) => a - b,
            _ => 0.0,
        };
        ResourceUsage {
            cpu_usage_percent,
            memory_usage_mb,
        }
    }
}

/// utime + stime + cutime + cstime from `/proc/<pid>/stat`, in seconds.
pub fn parse_cpu_seconds(stat: &str) -> Option<f64> {
    // comm may contain spaces and parens; fields resume after the last ')'.
    let rest = &stat[stat.rfind(')')? + 1..];
    let fields: Vec<&str> = rest.split_whitespace().collect();
    let ticks = fields
        .get(11..15)?
        .iter()
        .map(|f| f.parse::<f64>().ok())
        .sum::<Option<f64>>()?;
    Some(ticks / CLOCK_TICKS_PER_SEC)
}

/// `VmRSS` from `/proc/<pid>/status`, in MB.
pub fn parse_rss_mb(status: &str) -> Option<f64> {
    let line = status.lines().find(|l| l.starts_with("VmRSS:"))?;
    let kb: f64 = line.split_whitespace().nth(1)?.parse().ok()?;
    Some(kb / 1024.0)
}
