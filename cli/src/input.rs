//! Line input from stdin on a background thread, so the login screen can
//! wait on keystrokes and clock frames at the same time.

use std::io::{self, BufRead, Write};
use std::thread;

use anyhow::{bail, Result};
use crossbeam_channel::{unbounded, Receiver};

pub struct Input {
    lines: Receiver<String>,
}

impl Input {
    pub fn spawn() -> Self {
        let (tx, lines) = unbounded();
        thread::spawn(move || {
            let stdin = io::stdin();
            for line in stdin.lock().lines() {
                let Ok(line) = line else { break };
                if tx.send(line.trim().to_string()).is_err() {
                    break;
                }
            }
        });
        Self { lines }
    }

    pub fn lines(&self) -> &Receiver<String> {
        &self.lines
    }

    /// Print `label` and wait for one line.
    pub fn prompt(&self, label: &str) -> Result<String> {
        print!("{label}");
        io::stdout().flush()?;
        match self.lines.recv() {
            Ok(line) => Ok(line),
            Err(_) => bail!("input closed"),
        }
    }

    /// Prompt with a default used for an empty answer.
    pub fn prompt_or(&self, label: &str, default: &str) -> Result<String> {
        let line = self.prompt(&format!("{label} [{default}]: "))?;
        Ok(if line.is_empty() { default.to_string() } else { line })
    }

    /// Numbered choice; `None` for an empty or invalid answer.
    pub fn choose<'a>(&self, label: &str, options: &[&'a str]) -> Result<Option<&'a str>> {
        println!("{label}");
        for (i, option) in options.iter().enumerate() {
            println!("  {:>2}. {option}", i + 1);
        }
        let line = self.prompt("> ")?;
        Ok(line
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|i| options.get(i).copied()))
    }

    /// Discard lines typed while an action was processing.
    pub fn drain(&self) -> usize {
        self.lines.try_iter().count()
    }
}
