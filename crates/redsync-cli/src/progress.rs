use indicatif::{ProgressBar, ProgressStyle};
use redsync_core::ProgressSink;

const BAR_TEMPLATE: &str = "  {msg:20} {bar:40.cyan/blue} {pos:>3}% [{elapsed_precise}]";

/// Percentage bar on stderr, one per table.
pub struct BarProgress {
    visible: bool,
    bar: Option<ProgressBar>,
}

impl BarProgress {
    /// A hidden bar accepts updates and draws nothing.
    pub fn new(visible: bool) -> Self {
        Self { visible, bar: None }
    }
}

impl ProgressSink for BarProgress {
    fn begin(&mut self, table: &str, _total_rows: usize) {
        let bar = if self.visible {
            ProgressBar::new(100)
        } else {
            ProgressBar::hidden()
        };
        let style = ProgressStyle::with_template(BAR_TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("##-");
        bar.set_style(style);
        bar.set_message(table.to_string());
        self.bar = Some(bar);
    }

    fn update(&mut self, percent: u8) {
        if let Some(bar) = &self.bar {
            bar.set_position(u64::from(percent));
        }
    }

    fn finish(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish();
        }
    }
}
