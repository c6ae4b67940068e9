//! Progress reporting for imports.
//!
//! An import runs in a fixed number of phases (vertex allocation, face
//! threading, ...). A [`Progress`] passed through
//! [`ImportOptions::with_progress`](crate::io::ImportOptions::with_progress)
//! is told when each phase starts, and long phases also report how far
//! through their items they are.
//!
//! ```
//! use meshstitch::io::ImportOptions;
//! use meshstitch::progress::Progress;
//!
//! let progress = Progress::new(|current, total, message| {
//!     println!("[{}/{}] {}", current, total, message);
//! });
//!
//! let options = ImportOptions::default().with_progress(progress);
//! # assert!(options.progress.is_some());
//! ```

/// Steps each phase is split into by [`Progress::report_phase`].
pub const PHASE_RESOLUTION: usize = 1000;

/// Sink for `(current, total, message)` updates sent during an import.
pub struct Progress {
    sink: Box<dyn Fn(usize, usize, &str) + Send + Sync>,
}

impl Progress {
    /// Wrap a callback.
    pub fn new<F>(sink: F) -> Self
    where
        F: Fn(usize, usize, &str) + Send + Sync + 'static,
    {
        Self {
            sink: Box::new(sink),
        }
    }

    /// Send `current` out of `total` as is.
    #[inline]
    pub fn report(&self, current: usize, total: usize, message: &str) {
        (self.sink)(current, total, message);
    }

    /// Send the position of item `done` out of `total` inside `phase`.
    ///
    /// The callback receives a value on a scale of
    /// `phases * PHASE_RESOLUTION`, so phase-level and item-level updates
    /// from one import stay comparable. Nothing is sent when `total` or
    /// `phases` is zero.
    pub fn report_phase(
        &self,
        phase: usize,
        phases: usize,
        done: usize,
        total: usize,
        message: &str,
    ) {
        if total == 0 || phases == 0 {
            return;
        }
        let within = done.min(total) * PHASE_RESOLUTION / total;
        self.report(
            phase * PHASE_RESOLUTION + within,
            phases * PHASE_RESOLUTION,
            message,
        );
    }
}

impl std::fmt::Debug for Progress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Progress(..)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn recording() -> (Progress, Arc<Mutex<Vec<(usize, usize, String)>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let progress = Progress::new(move |current, total, message| {
            sink.lock().unwrap().push((current, total, message.to_string()));
        });
        (progress, seen)
    }

    #[test]
    fn test_report_phase_scales_into_phase() {
        let (progress, seen) = recording();

        progress.report_phase(1, 4, 1, 2, "half of phase 1");
        progress.report_phase(1, 4, 9, 2, "clamped");
        progress.report_phase(1, 4, 5, 0, "ignored");
        progress.report(3, 4, "phase 3");

        assert_eq!(
            *seen.lock().unwrap(),
            vec![
                (1500, 4000, "half of phase 1".to_string()),
                (2000, 4000, "clamped".to_string()),
                (3, 4, "phase 3".to_string()),
            ]
        );
    }

    #[test]
    fn test_debug_hides_callback() {
        let (progress, _) = recording();
        assert_eq!(format!("{:?}", progress), "Progress(..)");
    }
}
