use sysinfo::System;
use tracing::info;

const BYTES_PER_MB: u64 = 1_048_576;

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct ResourceSnapshot {
    pub(crate) cpu_percent: f32,
    pub(crate) memory_used_mb: u64,
    pub(crate) memory_total_mb: u64,
}

/// Samples host CPU and memory usage.
pub(crate) fn snapshot(system: &mut System) -> ResourceSnapshot {
    system.refresh_cpu_usage();
    system.refresh_memory();
    ResourceSnapshot {
        cpu_percent: system.global_cpu_usage(),
        memory_used_mb: system.used_memory() / BYTES_PER_MB,
        memory_total_mb: system.total_memory() / BYTES_PER_MB,
    }
}

pub(crate) fn log_snapshot(phase: &str, system: &mut System) -> ResourceSnapshot {
    let current = snapshot(system);
    info!(
        "System resources {}: CPU {:.1}%, memory {}MB / {}MB",
        phase, current.cpu_percent, current.memory_used_mb, current.memory_total_mb
    );
    current
}
