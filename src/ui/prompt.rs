//! Line-based prompt implementation.
//!
//! Presents a numbered menu on a writer and reads the pick from a reader,
//! which keeps the paged-selection logic usable in tests and over plain
//! stdin alike.

use std::io::{self, BufRead, BufReader, Stdin, Stdout, Write};

use anyhow::{bail, Result};

use crate::select::{Choice, NavOptions, Prompter};

/// Prompter over any reader/writer pair.
pub struct LinePrompter<R, W> {
    input: R,
    output: W,
}

impl LinePrompter<BufReader<Stdin>, Stdout> {
    /// Prompter over the process's stdin and stdout.
    pub fn stdin() -> Self {
        Self {
            input: BufReader::new(io::stdin()),
            output: io::stdout(),
        }
    }
}

impl<R, W> LinePrompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl<R: BufRead, W: Write> Prompter for LinePrompter<R, W> {
    fn choose(&mut self, message: &str, labels: &[String], nav: NavOptions) -> Result<Choice> {
        // "Previous Page" leads the menu and "Next Page" trails it, so item
        // numbering shifts by one when a previous page exists.
        let mut entries: Vec<(&str, Choice)> = Vec::with_capacity(labels.len() + 2);
        if nav.has_prev {
            entries.push(("Previous Page", Choice::PrevPage));
        }
        for (i, label) in labels.iter().enumerate() {
            entries.push((label.as_str(), Choice::Item(i)));
        }
        if nav.has_next {
            entries.push(("Next Page", Choice::NextPage));
        }

        loop {
            writeln!(self.output, "{message}")?;
            for (number, (label, _)) in entries.iter().enumerate() {
                writeln!(self.output, "  {}) {}", number + 1, label)?;
            }
            write!(self.output, "> ")?;
            self.output.flush()?;

            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                bail!("input closed before a choice was made");
            }

            match line.trim().parse::<usize>() {
                Ok(n) if (1..=entries.len()).contains(&n) => return Ok(entries[n - 1].1),
                _ => {
                    writeln!(
                        self.output,
                        "Enter a number between 1 and {}",
                        entries.len()
                    )?;
                }
            }
        }
    }
}
