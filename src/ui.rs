use anstyle::{AnsiColor, Style};
use is_terminal::IsTerminal;
use std::fmt::Display;
use std::io::{self, Write};
use std::time::{Duration, Instant};

const STATUS_WIDTH: usize = 12;
const RULE: &str = "––––––––––––––––––––––––––––––––––––––––––––––––––––––";

#[derive(Debug, Clone, Copy)]
enum StatusKind {
    Pending,
    Success,
    Info,
    Warn,
    Error,
}

impl StatusKind {
    fn to_stderr(self) -> bool {
        matches!(self, StatusKind::Warn | StatusKind::Error)
    }

    fn style(self) -> Style {
        let style = Style::new().bold();
        let color = match self {
            StatusKind::Pending => AnsiColor::Cyan,
            StatusKind::Success => AnsiColor::Green,
            StatusKind::Info => AnsiColor::Blue,
            StatusKind::Warn => AnsiColor::Yellow,
            StatusKind::Error => AnsiColor::Red,
        };
        style.fg_color(Some(color.into()))
    }
}

fn supports_color(to_stderr: bool) -> bool {
    let is_terminal = if to_stderr {
        io::stderr().is_terminal()
    } else {
        io::stdout().is_terminal()
    };
    is_terminal && std::env::var_os("NO_COLOR").is_none()
}

/// Lay out `message` under a padded label, indenting continuation lines.
fn render(kind: StatusKind, label: &str, message: &str, color: bool) -> String {
    let (prefix, suffix) = if color {
        let style = kind.style();
        (style.render().to_string(), style.render_reset().to_string())
    } else {
        (String::new(), String::new())
    };

    let mut out = String::new();
    for (idx, line) in message.split('\n').enumerate() {
        if idx == 0 {
            out.push_str(&format!(
                "{prefix}{label:>width$}{suffix} {line}\n",
                width = STATUS_WIDTH
            ));
        } else {
            out.push_str(&format!("{:>width$} {line}\n", "", width = STATUS_WIDTH));
        }
    }
    out
}

/// Warnings and errors go to stderr, everything else to stdout.
fn write_status(kind: StatusKind, label: &str, message: &str) {
    let to_stderr = kind.to_stderr();
    let text = render(kind, label, message, supports_color(to_stderr));

    let mut handle: Box<dyn Write> = if to_stderr {
        Box::new(io::stderr().lock())
    } else {
        Box::new(io::stdout().lock())
    };
    let _ = handle.write_all(text.as_bytes());
    let _ = handle.flush();
}

fn format_duration(duration: Duration) -> String {
    if duration.as_secs() >= 60 {
        let minutes = duration.as_secs() / 60;
        let seconds = duration.as_secs() % 60;
        if seconds == 0 {
            format!("{minutes}m")
        } else {
            format!("{minutes}m {seconds}s")
        }
    } else if duration.as_secs_f64() >= 1.0 {
        format!("{:.2}s", duration.as_secs_f64())
    } else if duration.as_millis() >= 1 {
        format!("{}ms", duration.as_millis())
    } else {
        format!("{}µs", duration.as_micros())
    }
}

/// Title, a rule, free-form notes, and a closing rule.
pub fn banner(title: impl Display, notes: &[&str]) {
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{title}");
    let _ = writeln!(stdout, "{RULE}");
    for note in notes {
        let _ = writeln!(stdout, "{note}\n");
    }
    let _ = writeln!(stdout, "{RULE}");
    let _ = stdout.flush();
}

pub fn status(label: &str, message: impl Display) {
    write_status(StatusKind::Pending, label, &message.to_string());
}

pub fn info(message: impl Display) {
    write_status(StatusKind::Info, "Info", &message.to_string());
}

pub fn warn(message: impl Display) {
    write_status(StatusKind::Warn, "Warning", &message.to_string());
}

pub fn error(message: impl Display) {
    write_status(StatusKind::Error, "Error", &message.to_string());
}

pub fn success(label: &str, message: impl Display) {
    write_status(StatusKind::Success, label, &message.to_string());
}

/// A long-running step: printed when it starts, and again with its elapsed
/// time when it succeeds or fails.
pub struct Progress {
    message: String,
    started: Instant,
}

impl Progress {
    pub fn new(label: impl Into<String>, message: impl Into<String>) -> Self {
        let message = message.into();
        write_status(StatusKind::Pending, &label.into(), &message);

        Self {
            message,
            started: Instant::now(),
        }
    }

    pub fn success(self, label: &str, detail: Option<String>) {
        let mut combined = self.message;
        if let Some(detail) = detail.filter(|d| !d.is_empty()) {
            combined.push(' ');
            combined.push_str(&detail);
        }
        combined.push_str(" in ");
        combined.push_str(&format_duration(self.started.elapsed()));

        write_status(StatusKind::Success, label, &combined);
    }

    pub fn fail(self, label: &str, error: impl Display) {
        let elapsed = format_duration(self.started.elapsed());
        let combined = format!("{} after {}: {}", self.message, elapsed, error);
        write_status(StatusKind::Error, label, &combined);
    }
}
