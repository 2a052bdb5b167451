use indicatif::{ProgressBar, ProgressStyle};
use skystack_core::progress::ProgressSink;

/// Terminal progress bar fed by the engines' step counts.
pub struct BarProgress {
    bar: ProgressBar,
}

impl BarProgress {
    pub fn new(label: &str) -> Self {
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{prefix} [{bar:40}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=> "),
        );
        bar.set_prefix(label.to_string());
        Self { bar }
    }

    pub fn set_label(&self, label: &str) {
        self.bar.set_prefix(label.to_string());
    }

    pub fn clear(&self) {
        self.bar.finish_and_clear();
    }
}

impl ProgressSink for BarProgress {
    fn begin(&self, total_steps: usize) {
        self.bar.reset();
        self.bar.set_length(total_steps as u64);
    }

    fn advance(&self, step: usize) {
        self.bar.set_position(step as u64);
    }

    fn end(&self) {
        if let Some(len) = self.bar.length() {
            self.bar.set_position(len);
        }
    }

    fn set_workers(&self, workers: usize) {
        if workers > 1 {
            self.bar.set_message(format!("({workers} threads)"));
        } else {
            self.bar.set_message("");
        }
    }
}
