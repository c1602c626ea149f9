//! Text renderer printing the arena to a terminal.

use std::io::{self, Write};

use crate::game::types::{Cell, CellKind, Orientation, Owner};
use crate::render::{MessageKind, PlayerStatus, RenderError, Renderer};

pub struct ConsoleRenderer<W: Write = io::Stdout> {
    title: String,
    out: W,
}

impl ConsoleRenderer<io::Stdout> {
    pub fn stdout(title: &str) -> Self {
        Self::new(title, io::stdout())
    }
}

impl<W: Write> ConsoleRenderer<W> {
    pub fn new(title: &str, out: W) -> Self {
        Self {
            title: title.to_string(),
            out,
        }
    }
}

/// One character per owner slot: digits, then letters, cycling after `z`.
fn owner_symbol(owner: Owner) -> char {
    char::from_digit(u32::from(owner.0) % 36, 36).unwrap_or('?')
}

fn symbol(cell: &Cell) -> String {
    if cell.exploding {
        return "**".to_string();
    }
    match cell.kind {
        CellKind::Empty => "  ".to_string(),
        CellKind::Wall => "██".to_string(),
        CellKind::Battery => "BB".to_string(),
        CellKind::Laser => match cell.orientation {
            Orientation::North | Orientation::South => " |".to_string(),
            Orientation::East | Orientation::West => "--".to_string(),
        },
        CellKind::Player => {
            let arrow = match cell.orientation {
                Orientation::North => '^',
                Orientation::East => '>',
                Orientation::South => 'v',
                Orientation::West => '<',
            };
            format!("{}{}", owner_symbol(cell.owner), arrow)
        }
    }
}

impl<W: Write> Renderer for ConsoleRenderer<W> {
    fn message(&mut self, text: &str, kind: MessageKind) -> Result<(), RenderError> {
        writeln!(self.out, "[{}] {:?}: {}", self.title, kind, text)?;
        Ok(())
    }

    fn set_status(&mut self, statuses: &[PlayerStatus]) -> Result<(), RenderError> {
        for status in statuses {
            writeln!(
                self.out,
                "{:<16} health {:>3.0}%  energy {:>3.0}%",
                status.moniker,
                status.health * 100.0,
                status.energy * 100.0
            )?;
        }
        Ok(())
    }

    fn update(&mut self, cells: &[Vec<Cell>]) -> Result<(), RenderError> {
        for row in cells {
            let line: String = row.iter().map(symbol).collect();
            writeln!(self.out, "{line}")?;
        }
        writeln!(self.out)?;
        self.out.flush()?;
        Ok(())
    }
}
