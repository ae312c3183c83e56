use std::io::{self, Write};

use chrono::Local;
use linkbatch_core::{AppViewModel, Banner, OutputLine, ResultEvent};

/// Prints the results view incrementally: each banner once when it
/// appears, and each result line once as it is appended.
pub struct TerminalRenderer {
    rendered_lines: usize,
    last_banner: Option<Banner>,
    last_submission: u64,
    timestamps: bool,
}

impl TerminalRenderer {
    pub fn new(timestamps: bool) -> Self {
        Self {
            rendered_lines: 0,
            last_banner: None,
            last_submission: 0,
            timestamps,
        }
    }

    pub fn render(&mut self, view: &AppViewModel, out: &mut impl Write) -> io::Result<()> {
        // A new submission starts a fresh results list.
        if view.submissions != self.last_submission {
            self.last_submission = view.submissions;
            self.rendered_lines = 0;
        }

        if view.banner != self.last_banner {
            if let Some(banner) = &view.banner {
                writeln!(out, "{}", format_banner(banner))?;
            }
            self.last_banner = view.banner.clone();
        }

        for line in view.lines.iter().skip(self.rendered_lines) {
            if self.timestamps {
                writeln!(out, "[{}] {}", Local::now().format("%H:%M:%S"), format_line(line))?;
            } else {
                writeln!(out, "{}", format_line(line))?;
            }
        }
        self.rendered_lines = view.lines.len();
        out.flush()
    }
}

fn format_banner(banner: &Banner) -> String {
    match banner {
        Banner::Submitting => "Submitting...".to_string(),
        Banner::Waiting => "Waiting for results...".to_string(),
        Banner::Validation(message) | Banner::SubmitFailed(message) => {
            format!("error: {message}")
        }
        Banner::NoResults => "No results returned from server.".to_string(),
    }
}

pub fn format_line(line: &OutputLine) -> String {
    match line {
        OutputLine::Result(result) => format_result(result),
        OutputLine::DecodeWarning { raw } => {
            format!("warning: could not decode result event: {raw}")
        }
        OutputLine::ServerError(message) => format!("server error: {message}"),
        OutputLine::Completed => "All downloads processed.".to_string(),
        OutputLine::ClosedMaybeIncomplete => {
            "Connection closed; results may be incomplete.".to_string()
        }
    }
}

fn format_result(result: &ResultEvent) -> String {
    let mark = if result.status.is_success() { "OK " } else { "ERR" };
    match result.error_message() {
        Some(error) => format!(
            "{mark} {link}: {status} - Error: {error}",
            link = result.link,
            status = result.status.as_str()
        ),
        None => format!(
            "{mark} {link}: {status}",
            link = result.link,
            status = result.status.as_str()
        ),
    }
}
