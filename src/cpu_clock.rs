//! Per-thread CPU time measurement.
//!
//! On unix this reads `CLOCK_THREAD_CPUTIME_ID`, so time spent blocked or
//! sleeping is not counted. Other platforms fall back to a monotonic wall clock.

use std::time::Duration;

/// Measures CPU time consumed by the current thread since [CpuStopwatch::start].
///
/// Start and stop on the same thread; the clock is per-thread.
#[derive(Debug, Clone, Copy)]
pub struct CpuStopwatch {
  started: Duration,
}

impl CpuStopwatch {
  pub fn start() -> Self {
    Self {
      started: thread_cpu_time(),
    }
  }

  pub fn elapsed(&self) -> Duration {
    thread_cpu_time().saturating_sub(self.started)
  }

  pub fn elapsed_secs(&self) -> f64 {
    self.elapsed().as_secs_f64()
  }
}

#[cfg(unix)]
fn thread_cpu_time() -> Duration {
  let mut ts = libc::timespec {
    tv_sec: 0,
    tv_nsec: 0,
  };
  // SAFETY: `ts` is a valid, writable timespec for the duration of the call.
  let rc = unsafe { libc::clock_gettime(libc::CLOCK_THREAD_CPUTIME_ID, &mut ts) };
  if rc != 0 {
    return Duration::ZERO;
  }
  Duration::new(ts.tv_sec as u64, ts.tv_nsec as u32)
}

#[cfg(not(unix))]
fn thread_cpu_time() -> Duration {
  static EPOCH: once_cell::sync::Lazy<std::time::Instant> =
    once_cell::sync::Lazy::new(std::time::Instant::now);
  EPOCH.elapsed()
}
