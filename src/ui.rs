//! Terminal output for the CLI host: theme, progress bar, stats table.
//!
//! Everything degrades to plain text when stdout is not a terminal.

use crossbeam::channel;
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::Style;
use std::sync::OnceLock;
use std::thread;
use std::time::Duration;
use tabled::{Table, Tabled, settings::Style as TableStyle};

use crate::analyzer::ProgressEvent;

static THEME: OnceLock<Theme> = OnceLock::new();

#[derive(Debug, Clone)]
pub struct Theme {
    pub header: Style,
    pub success: Style,
    pub warn: Style,
    pub dim: Style,
}

impl Theme {
    pub fn detect() -> Self {
        if !console::Term::stdout().is_term() {
            return Self::plain();
        }
        Self::colored()
    }

    pub fn colored() -> Self {
        Self {
            header: Style::new().cyan().bold(),
            success: Style::new().green().bold(),
            warn: Style::new().yellow().bold(),
            dim: Style::new().white().dimmed(),
        }
    }

    pub fn plain() -> Self {
        Self {
            header: Style::new(),
            success: Style::new(),
            warn: Style::new(),
            dim: Style::new(),
        }
    }
}

pub fn theme() -> &'static Theme {
    THEME.get_or_init(Theme::detect)
}

/// Listener thread that turns analyzer progress events into a single bar.
///
/// Drop the analyzer (and with it the sender) before calling `finish`, so
/// the listener sees the channel close even when a run errors out early.
pub struct ProgressManager {
    handle: thread::JoinHandle<()>,
}

impl ProgressManager {
    pub fn spawn() -> (Self, channel::Sender<ProgressEvent>) {
        let (tx, rx) = channel::unbounded::<ProgressEvent>();

        let handle = thread::spawn(move || {
            let bar = if console::Term::stdout().is_term() {
                ProgressBar::new(0)
            } else {
                ProgressBar::hidden()
            };
            if let Ok(style) = ProgressStyle::with_template("{bar:30.cyan/dim} {pos}/{len} {msg}") {
                bar.set_style(style);
            }

            for event in rx {
                match event {
                    ProgressEvent::Started { total } => {
                        bar.set_length(total as u64);
                        bar.enable_steady_tick(Duration::from_millis(100));
                    }
                    ProgressEvent::File { file, cached } => {
                        bar.inc(1);
                        let name = file
                            .file_name()
                            .map(|n| n.to_string_lossy().into_owned())
                            .unwrap_or_default();
                        bar.set_message(if cached { format!("cached {name}") } else { name });
                    }
                    ProgressEvent::Finished => {
                        bar.finish_and_clear();
                    }
                }
            }
            bar.finish_and_clear();
        });

        (Self { handle }, tx)
    }

    pub fn finish(self) {
        self.handle.join().ok();
    }
}

#[derive(Tabled)]
struct StatRow {
    #[tabled(rename = "Metric")]
    metric: String,
    #[tabled(rename = "Value")]
    value: String,
}

pub fn stats_table(rows: &[(&str, String)]) -> String {
    let rows: Vec<StatRow> = rows
        .iter()
        .map(|(metric, value)| StatRow { metric: metric.to_string(), value: value.clone() })
        .collect();
    Table::new(&rows).with(TableStyle::rounded()).to_string()
}
