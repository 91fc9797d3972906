//! Masked password entry on the controlling terminal.

use std::{
    error::Error,
    io::{BufRead, Stderr, Write},
};

use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    queue,
    style::Print,
    terminal::{self, ClearType},
};

pub type PromptResult<T> = Result<T, Box<dyn Error + Send + Sync>>;

const ATTEMPTS: usize = 3;

#[derive(Debug, PartialEq, Eq)]
enum Edit {
    Pushed,
    Popped,
    Ignored,
    Submit,
    Abort,
}

fn apply_key(buf: &mut String, key: KeyEvent) -> Edit {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Enter => Edit::Submit,
        KeyCode::Esc => Edit::Abort,
        KeyCode::Char('c' | 'd') if ctrl => Edit::Abort,
        KeyCode::Char(ch) if !ctrl => {
            buf.push(ch);
            Edit::Pushed
        }
        KeyCode::Backspace if buf.pop().is_some() => Edit::Popped,
        _ => Edit::Ignored,
    }
}

/// Leaves raw mode even when reading bails out early.
struct RawMode;

impl RawMode {
    fn enable() -> PromptResult<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

struct Terminal {
    out: Stderr,
}

impl Terminal {
    fn new() -> Self {
        Self {
            out: std::io::stderr(),
        }
    }

    fn line(&mut self, text: &str) -> PromptResult<()> {
        queue!(
            self.out,
            cursor::MoveToColumn(0),
            terminal::Clear(ClearType::CurrentLine),
            Print(text)
        )?;
        self.out.flush()?;
        Ok(())
    }

    fn read_masked(&mut self, label: &str) -> PromptResult<String> {
        let _raw = RawMode::enable()?;
        self.line(label)?;

        let mut buf = String::new();
        loop {
            let Event::Key(key) = event::read()? else {
                continue;
            };
            if key.kind == KeyEventKind::Release {
                continue;
            }
            match apply_key(&mut buf, key) {
                Edit::Pushed => queue!(self.out, Print('*'))?,
                Edit::Popped => queue!(
                    self.out,
                    cursor::MoveLeft(1),
                    Print(' '),
                    cursor::MoveLeft(1)
                )?,
                Edit::Ignored => continue,
                Edit::Submit => {
                    self.line("\r\n")?;
                    return Ok(buf);
                }
                Edit::Abort => {
                    self.line("\r\n")?;
                    return Err("password entry cancelled".into());
                }
            }
            self.out.flush()?;
        }
    }
}

/// Asks for a new password and its confirmation, retrying a few times.
pub fn new_password() -> PromptResult<String> {
    let mut term = Terminal::new();
    for _ in 0..ATTEMPTS {
        let first = term.read_masked("Password: ")?;
        if first.is_empty() {
            term.line("Empty password, try again.\r\n")?;
            continue;
        }
        if term.read_masked("Repeat password: ")? == first {
            return Ok(first);
        }
        term.line("The two passwords differ, try again.\r\n")?;
    }
    Err(format!("no password confirmed after {ATTEMPTS} attempts").into())
}

/// First line of `input` without its line terminator, for scripted use.
pub fn password_from(input: impl BufRead) -> PromptResult<String> {
    let line = input.lines().next().transpose()?.unwrap_or_default();
    if line.is_empty() {
        return Err("empty password on standard input".into());
    }
    Ok(line)
}
