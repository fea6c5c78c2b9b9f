//! Best-effort human-readable run report.

use std::fmt;
use std::io::Write;

/// Line writer over the run's output sink. Write failures are dropped.
pub struct Report<'a, W: Write> {
    out: &'a mut W,
}

impl<'a, W: Write> Report<'a, W> {
    pub fn new(out: &'a mut W) -> Self {
        Self { out }
    }

    pub fn line(&mut self, args: fmt::Arguments<'_>) {
        let _ = self.out.write_fmt(args);
        let _ = self.out.write_all(b"\n");
    }

    pub fn blank(&mut self) {
        let _ = self.out.write_all(b"\n");
    }
}

/// `[a b c]`, the list form used for configured identifiers.
pub fn bracketed(items: &[String]) -> String {
    format!("[{}]", items.join(" "))
}
