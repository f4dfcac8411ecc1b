//! Terminal output for the supervisor commands

use colored::{ColoredString, Colorize};

#[derive(Clone, Copy)]
pub(crate) enum Tone {
    Note,
    Done,
    Caution,
    Failure,
}

impl Tone {
    pub(crate) fn tag(self) -> ColoredString {
        match self {
            Tone::Note => "[prbot]".blue(),
            Tone::Done => "[ ok ]".green().bold(),
            Tone::Caution => "[warn]".yellow().bold(),
            Tone::Failure => "[fail]".red().bold(),
        }
    }
}

/// Tagged, colored lines; notes need `--verbose`
pub struct CliConsole {
    verbose: bool,
}

impl CliConsole {
    pub const fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    pub fn info(&self, message: &str) {
        if self.verbose {
            self.line(Tone::Note, message.normal());
        }
    }

    pub fn success(&self, message: &str) {
        self.line(Tone::Done, message.normal());
    }

    pub fn warn(&self, message: &str) {
        self.line(Tone::Caution, message.yellow());
    }

    /// Goes to stderr
    pub fn error(&self, message: &str) {
        eprintln!("{} {}", Tone::Failure.tag(), message.red());
    }

    pub fn print_header(&self, title: &str) {
        println!("\n{} {}", "==".dimmed(), title.bold());
    }

    /// Newly stabilized child output
    pub fn print_output(&self, text: &str) {
        for line in text.lines() {
            println!("{} {}", "child |".dimmed(), line);
        }
    }

    fn line(&self, tone: Tone, message: ColoredString) {
        println!("{} {}", tone.tag(), message);
    }
}
