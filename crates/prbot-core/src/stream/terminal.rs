//! Terminal emulation seam

use alacritty_terminal::event::VoidListener;
use alacritty_terminal::grid::Dimensions;
use alacritty_terminal::index::Line;
use alacritty_terminal::term::cell::Flags;
use alacritty_terminal::term::{Config, Term, TermMode};
use alacritty_terminal::vte::ansi::Processor;

/// Maintains one logical screen render of a byte stream
pub trait TerminalEmulator: Send {
    /// Apply raw output, control sequences included
    fn feed(&mut self, bytes: &[u8]);

    /// Full current render: scrollback then screen, trailing blanks trimmed
    fn render(&self) -> String;

    /// Lines dropped off the top of the render since creation. The render
    /// only loses its head by this count going up.
    fn evicted_lines(&self) -> u64 {
        0
    }
}

/// Scrollback kept by [`VirtualTerminal::new`]
pub const DEFAULT_SCROLLBACK: usize = 2000;

struct TermSize {
    cols: usize,
    rows: usize,
}

impl Dimensions for TermSize {
    fn total_lines(&self) -> usize {
        self.rows
    }

    fn screen_lines(&self) -> usize {
        self.rows
    }

    fn columns(&self) -> usize {
        self.cols
    }
}

/// [`TerminalEmulator`] backed by `alacritty_terminal`
///
/// Evictions are counted per line feed, the way plain piped output scrolls.
/// Explicit scroll sequences are not counted.
pub struct VirtualTerminal {
    term: Term<VoidListener>,
    parser: Processor,
    scrollback: usize,
    evicted: u64,
}

impl VirtualTerminal {
    pub fn new(cols: u16, rows: u16) -> Self {
        Self::with_scrollback(cols, rows, DEFAULT_SCROLLBACK)
    }

    pub fn with_scrollback(cols: u16, rows: u16, scrollback: usize) -> Self {
        let size = TermSize {
            cols: usize::from(cols.max(1)),
            rows: usize::from(rows.max(1)),
        };
        let config = Config {
            scrolling_history: scrollback,
            ..Config::default()
        };
        Self {
            term: Term::new(config, &size, VoidListener),
            parser: Processor::new(),
            scrollback,
            evicted: 0,
        }
    }

    /// Whether a line feed right now pushes the oldest history line out
    fn line_feed_evicts(&self) -> bool {
        if self.term.mode().contains(TermMode::ALT_SCREEN) {
            return false;
        }
        let grid = self.term.grid();
        let bottom = grid.screen_lines() as i32 - 1;
        grid.history_size() >= self.scrollback && grid.cursor.point.line.0 >= bottom
    }
}

impl TerminalEmulator for VirtualTerminal {
    fn feed(&mut self, bytes: &[u8]) {
        for segment in bytes.split_inclusive(|&byte| byte == b'\n') {
            let Some((&b'\n', text)) = segment.split_last() else {
                self.parser.advance(&mut self.term, segment);
                continue;
            };
            // piped output has no tty line discipline, so LF becomes CRLF
            self.parser.advance(&mut self.term, text);
            self.parser.advance(&mut self.term, b"\r");
            if self.line_feed_evicts() {
                self.evicted += 1;
            }
            self.parser.advance(&mut self.term, b"\n");
        }
    }

    fn render(&self) -> String {
        let grid = self.term.grid();
        let history = grid.history_size() as i32;
        let rows = grid.screen_lines() as i32;

        let mut lines: Vec<String> = (-history..rows)
            .map(|y| {
                let row = &grid[Line(y)];
                let text: String = row
                    .into_iter()
                    .filter(|cell| !cell.flags.contains(Flags::WIDE_CHAR_SPACER))
                    .map(|cell| cell.c)
                    .collect();
                text.trim_end().to_string()
            })
            .collect();

        while lines.last().is_some_and(String::is_empty) {
            lines.pop();
        }
        lines.join("\n")
    }

    fn evicted_lines(&self) -> u64 {
        self.evicted
    }
}
