//! Progress bar with a remaining-time estimate for long collection loops.

use indicatif::{ProgressBar, ProgressStyle};

const TEMPLATE: &str = " {percent:>3} % |{bar:50}| {eta_precise} remaining";

pub struct TimeLogger {
    bar: ProgressBar,
}

impl TimeLogger {
    /// Bar over `total` iterations; hidden unless `enabled`, but it keeps
    /// counting either way.
    pub fn new(total: usize, enabled: bool) -> Self {
        let bar = if enabled {
            ProgressBar::new(total as u64)
        } else {
            let bar = ProgressBar::hidden();
            bar.set_length(total as u64);
            bar
        };
        bar.set_style(style());
        Self { bar }
    }

    pub fn start(&mut self) {
        self.bar.reset();
    }

    pub fn done(&self) -> usize {
        self.bar.position() as usize
    }

    pub fn iterate(&mut self) {
        self.bar.inc(1);
    }

    /// Erase the bar once the loop has finished.
    pub fn clear(&mut self) {
        self.bar.finish_and_clear();
    }

    pub fn is_hidden(&self) -> bool {
        self.bar.is_hidden()
    }
}

impl Drop for TimeLogger {
    fn drop(&mut self) {
        if !self.bar.is_finished() {
            self.bar.finish_and_clear();
        }
    }
}

fn style() -> ProgressStyle {
    ProgressStyle::with_template(TEMPLATE)
        .map(|s| s.progress_chars("#>-"))
        .unwrap_or_else(|_| ProgressStyle::default_bar())
}
