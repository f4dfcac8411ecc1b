//! Stable-prefix detection over successive screen renders

use super::prefix::longest_common_prefix;
use std::collections::VecDeque;

/// Renders kept for comparison, the current one included
pub const HISTORY_DEPTH: usize = 3;

/// Text that became stable on one sample
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StabilizedUpdate {
    /// The full stable prefix
    pub stable: String,
    /// The part of `stable` not emitted before
    pub delta: String,
}

/// Tracks which prefix of a live render has stayed unchanged across
/// [`HISTORY_DEPTH`] consecutive samples.
///
/// Text already emitted is always a prefix of the latest stable prefix: when
/// the render shrinks or rewrites emitted text, the sent position moves back
/// to where they still agree.
#[derive(Debug, Default)]
pub struct StreamStabilizer {
    history: VecDeque<String>,
    sent: String,
    evicted: u64,
}

impl StreamStabilizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Byte length of the emitted text still present in the render
    pub fn sent_length(&self) -> usize {
        self.sent.len()
    }

    pub fn sent_text(&self) -> &str {
        &self.sent
    }

    /// Feed one render whose head has lost `evicted_lines` lines in total.
    ///
    /// Lines evicted since the previous call are dropped from the kept renders
    /// and from the sent text first, so scrollback eviction never looks like
    /// a rewrite of text already emitted.
    pub fn observe(&mut self, render: &str, evicted_lines: u64) -> Option<StabilizedUpdate> {
        if evicted_lines > self.evicted {
            let count = usize::try_from(evicted_lines - self.evicted).unwrap_or(usize::MAX);
            self.drop_leading_lines(count);
            self.evicted = evicted_lines;
        }
        self.sample(render)
    }

    fn drop_leading_lines(&mut self, count: usize) {
        for render in self.history.iter_mut() {
            let tail = skip_lines(render, count).len();
            render.drain(..render.len() - tail);
        }
        let tail = skip_lines(&self.sent, count).len();
        self.sent.drain(..self.sent.len() - tail);
    }

    /// Feed one render. Returns the newly stabilized text, if any.
    ///
    /// Nothing is emitted until [`HISTORY_DEPTH`] renders have been seen.
    pub fn sample(&mut self, render: &str) -> Option<StabilizedUpdate> {
        let update = if self.history.len() + 1 >= HISTORY_DEPTH {
            let previous: Vec<&str> = self
                .history
                .iter()
                .rev()
                .take(HISTORY_DEPTH - 1)
                .map(String::as_str)
                .collect();
            let common = longest_common_prefix(render, &previous);

            let keep = longest_common_prefix(&self.sent, &[common]).len();
            self.sent.truncate(keep);

            (common.len() > keep).then(|| {
                let delta = common[keep..].to_string();
                self.sent.push_str(&delta);
                StabilizedUpdate {
                    stable: common.to_string(),
                    delta,
                }
            })
        } else {
            None
        };

        self.history.push_back(render.to_string());
        while self.history.len() > HISTORY_DEPTH {
            self.history.pop_front();
        }

        update
    }
}

/// `text` without its first `count` lines
fn skip_lines(text: &str, count: usize) -> &str {
    if count == 0 {
        return text;
    }
    text.match_indices('\n')
        .nth(count - 1)
        .map_or("", |(at, _)| &text[at + 1..])
}
