// src/cli/display.rs

use crate::domain::progress::{ImportResult, Progress};
use crate::domain::row::Row;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::io::{self, Write};
use termcolor::{Color, ColorSpec, StandardStream, WriteColor};

/// Progress bar on stderr, fed from the engine's progress callback.
///
/// indicatif hides the bar when stderr is not a terminal.
pub struct ImportProgress {
    bar: ProgressBar,
}

impl ImportProgress {
    pub fn new(total: usize) -> Self {
        Self::with_draw_target(total, ProgressDrawTarget::stderr())
    }

    pub fn with_draw_target(total: usize, target: ProgressDrawTarget) -> Self {
        let bar = ProgressBar::with_draw_target(Some(total as u64), target);
        bar.set_style(
            ProgressStyle::with_template("{bar:30.green/blue} {pos}/{len} ({percent}%) {elapsed}")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        Self { bar }
    }

    pub fn update(&self, progress: &Progress) {
        self.bar.set_length(progress.total as u64);
        self.bar.set_position(progress.current as u64);
    }

    pub fn position(&self) -> u64 {
        self.bar.position()
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

/// Print the run summary followed by the failed articles, if any.
pub fn show_import_result(stderr: &mut StandardStream, result: &ImportResult) -> io::Result<()> {
    let color = if !result.success {
        Color::Red
    } else if result.failed() > 0 {
        Color::Yellow
    } else {
        Color::Green
    };
    stderr.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(true))?;
    writeln!(stderr, "{}", result.message)?;
    stderr.reset()?;

    if let Some(failed) = result.failed_articles.as_ref() {
        for article in failed {
            stderr.set_color(ColorSpec::new().set_fg(Some(Color::Red)))?;
            write!(stderr, "  ✗ ")?;
            stderr.reset()?;
            writeln!(stderr, "{}: {}", article.url, article.error)?;
        }
    }
    Ok(())
}

/// List parsed rows: index, title, url and resolved status.
pub fn show_rows(stderr: &mut StandardStream, rows: &[Row]) -> io::Result<()> {
    let width = rows.len().to_string().len();
    for (i, row) in rows.iter().enumerate() {
        stderr.set_color(ColorSpec::new().set_fg(Some(Color::Yellow)))?;
        write!(stderr, "{:>width$}. ", i + 1, width = width)?;
        stderr.set_color(ColorSpec::new().set_fg(Some(Color::Green)))?;
        write!(
            stderr,
            "{}",
            if row.title.is_empty() { "<untitled>" } else { row.title.as_str() }
        )?;
        stderr.reset()?;
        write!(stderr, " {}", row.url)?;
        stderr.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)))?;
        writeln!(stderr, " [{}]", row.article_status().as_str())?;
        stderr.reset()?;
    }
    writeln!(stderr, "{} rows OK", rows.len())?;
    Ok(())
}
