use std::io::{self, IsTerminal, Write};

use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    style::{Attribute, Print, SetAttribute},
    terminal::{self, ClearType},
    ExecutableCommand, QueueableCommand,
};

use crate::core::formatter::{format_credits, format_dollars};
use crate::core::models::plan::Plan;

/// Header lines above the item list.
const HEADER_LINES: usize = 4;
/// Footer lines below the item list.
const FOOTER_LINES: usize = 2;

/// RAII guard that restores terminal state on drop (even on panic).
struct RawModeGuard;

impl RawModeGuard {
    fn enable() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        io::stdout().execute(cursor::Hide)?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = io::stdout().execute(cursor::Show);
        let _ = terminal::disable_raw_mode();
    }
}

/// One catalog row as shown in the picker.
pub fn plan_row(plan: Plan) -> String {
    format!(
        "{:<14} {:>7} credits  {:>8}/mo  {} overage",
        plan.display_name(),
        format_credits(plan.monthly_credits()),
        format_dollars(plan.monthly_price()),
        format_dollars(plan.overage_rate())
    )
}

/// Index the cursor starts on: the current plan, else the first entry.
pub fn initial_cursor(plans: &[Plan], current: Option<Plan>) -> usize {
    current
        .and_then(|c| plans.iter().position(|p| *p == c))
        .unwrap_or(0)
}

/// Outcome of the interactive picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    Chosen(Plan),
    Cancelled,
    NotATerminal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyAction {
    MoveTo(usize),
    Confirm,
    Cancel,
    Ignore,
}

fn key_action(code: KeyCode, modifiers: KeyModifiers, cursor_pos: usize, len: usize) -> KeyAction {
    match (code, modifiers) {
        (KeyCode::Char('c'), KeyModifiers::CONTROL)
        | (KeyCode::Esc, _)
        | (KeyCode::Char('q'), KeyModifiers::NONE) => KeyAction::Cancel,
        (KeyCode::Up, _) | (KeyCode::Char('k'), KeyModifiers::NONE) => {
            KeyAction::MoveTo(cursor_pos.saturating_sub(1))
        }
        (KeyCode::Down, _) | (KeyCode::Char('j'), KeyModifiers::NONE) => {
            KeyAction::MoveTo((cursor_pos + 1).min(len.saturating_sub(1)))
        }
        (KeyCode::Enter, _) | (KeyCode::Char(' '), _) => KeyAction::Confirm,
        _ => KeyAction::Ignore,
    }
}

/// Terminal I/O failures are errors; Esc, `q` and Ctrl-C are `Selection::Cancelled`.
pub fn select_plan(current: Option<Plan>) -> io::Result<Selection> {
    if !io::stdin().is_terminal() {
        return Ok(Selection::NotATerminal);
    }

    let plans = Plan::all();
    let _guard = RawModeGuard::enable()?;
    let mut cursor_pos = initial_cursor(plans, current);

    draw(plans, current, cursor_pos)?;

    loop {
        if let Event::Key(KeyEvent {
            code, modifiers, ..
        }) = event::read()?
        {
            match key_action(code, modifiers, cursor_pos, plans.len()) {
                KeyAction::Cancel => {
                    clear_ui()?;
                    return Ok(Selection::Cancelled);
                }
                KeyAction::Confirm => {
                    clear_ui()?;
                    return Ok(Selection::Chosen(plans[cursor_pos]));
                }
                KeyAction::MoveTo(pos) => cursor_pos = pos,
                KeyAction::Ignore => {}
            }
            draw(plans, current, cursor_pos)?;
        }
    }
}

fn draw(plans: &[Plan], current: Option<Plan>, cursor_pos: usize) -> io::Result<()> {
    let mut stdout = io::stdout();

    stdout
        .queue(cursor::MoveToColumn(0))?
        .queue(terminal::Clear(ClearType::FromCursorDown))?;

    stdout
        .queue(Print("Choose a plan\r\n"))?
        .queue(Print("\r\n"))?
        .queue(Print("  Use arrow keys to navigate, enter to confirm\r\n"))?
        .queue(Print("\r\n"))?;

    for (i, plan) in plans.iter().enumerate() {
        let marker = if i == cursor_pos { "> " } else { "  " };
        let current_mark = if Some(*plan) == current { "*" } else { " " };

        if i == cursor_pos {
            stdout.queue(SetAttribute(Attribute::Reverse))?;
        }

        stdout.queue(Print(format!("{marker}{current_mark} {}\r\n", plan_row(*plan))))?;

        if i == cursor_pos {
            stdout.queue(SetAttribute(Attribute::Reset))?;
        }
    }

    stdout
        .queue(Print("\r\n"))?
        .queue(Print("  * current plan | enter: confirm | q: cancel\r\n"))?;

    let total_lines = plans.len() + HEADER_LINES + FOOTER_LINES;
    stdout.queue(cursor::MoveUp(total_lines as u16))?;

    stdout.flush()?;
    Ok(())
}

fn clear_ui() -> io::Result<()> {
    let mut stdout = io::stdout();
    stdout
        .queue(cursor::MoveToColumn(0))?
        .queue(terminal::Clear(ClearType::FromCursorDown))?;
    stdout.flush()?;
    Ok(())
}
