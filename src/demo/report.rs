use crate::memory::stats::AllocStats;
use crate::memory::value::Kind;
use crossterm::style::Stylize;
use std::fmt::Display;
use std::io::{self, Write};

const NANO_UNIT: u128 = 1_000_000_000;

/// Format elapsed nanoseconds as `nano_time = S sec UUUUUU NNN msec`
pub fn format_nano_time(nano_time: u128) -> String {
    let sec = nano_time / NANO_UNIT;
    let nanos = nano_time - sec * NANO_UNIT;
    format!(
        "nano_time = {} sec {:06} {:03} msec",
        sec,
        nanos / 1000,
        nanos % 1000
    )
}

/// Writes demo results, optionally styled for a terminal
pub struct Reporter<W: Write> {
    out: W,
    color: bool,
}

impl<W: Write> Reporter<W> {
    pub fn new(out: W, color: bool) -> Self {
        Reporter { out, color }
    }

    pub fn heading(&mut self, text: &str) -> io::Result<()> {
        if self.color {
            writeln!(self.out, "{}", text.bold())
        } else {
            writeln!(self.out, "{}", text)
        }
    }

    /// A `label = value` line
    pub fn result(&mut self, label: &str, value: impl Display) -> io::Result<()> {
        if self.color {
            writeln!(
                self.out,
                "{} = {}",
                label.cyan(),
                value.to_string().green().bold()
            )
        } else {
            writeln!(self.out, "{} = {}", label, value)
        }
    }

    pub fn timing(&mut self, nano_time: u128) -> io::Result<()> {
        let line = format_nano_time(nano_time);
        if self.color {
            writeln!(self.out, "{}", line.dark_grey())
        } else {
            writeln!(self.out, "{}", line)
        }
    }

    /// Per-kind allocation table, followed by backend-specific totals
    pub fn stats(&mut self, stats: &AllocStats) -> io::Result<()> {
        self.heading("MEMORY USAGE:")?;
        for kind in Kind::ALL {
            let af = stats.kind(kind);
            writeln!(
                self.out,
                "{:<8} alloc={}, free={}",
                kind.name(),
                af.alloc,
                af.free
            )?;
        }
        writeln!(
            self.out,
            "total    alloc={}, free={}, live={}",
            stats.allocated(),
            stats.freed(),
            stats.live()
        )?;
        if stats.blocks > 0 {
            writeln!(
                self.out,
                "arena    blocks={}, bytes={}",
                stats.blocks, stats.bytes
            )?;
        }
        if stats.slots > 0 {
            writeln!(
                self.out,
                "pool     slots={}, reused={}",
                stats.slots, stats.reused
            )?;
        }
        Ok(())
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}
