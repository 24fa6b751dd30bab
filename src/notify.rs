use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

/// Kinds of audible feedback the planner asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    /// User-initiated affirmative action (block added, day started, rating saved)
    Interaction,
    /// The active block just ended
    Transition,
    /// Input was refused
    Rejection,
}

/// Fire-and-forget sink for cues.
///
/// Implementations must not fail the caller: problems are swallowed (and at
/// most logged).
pub trait Notifier {
    fn play(&mut self, cue: Cue);
}

/// Drops every cue
#[derive(Debug, Default, Clone, Copy)]
pub struct Silent;

impl Notifier for Silent {
    fn play(&mut self, _cue: Cue) {}
}

/// Rings the terminal bell on stderr.
///
/// Stdout belongs to the TUI, so BEL goes to stderr which is still attached
/// to the same terminal.
#[derive(Debug, Clone, Copy)]
pub struct TerminalBell {
    enabled: bool,
}

impl TerminalBell {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    fn bells(cue: Cue) -> &'static [u8] {
        match cue {
            Cue::Transition => b"\x07\x07",
            Cue::Interaction | Cue::Rejection => b"\x07",
        }
    }
}

impl Notifier for TerminalBell {
    fn play(&mut self, cue: Cue) {
        if !self.enabled {
            return;
        }
        let mut stderr = io::stderr();
        if let Err(e) = stderr.write_all(Self::bells(cue)).and_then(|_| stderr.flush()) {
            tracing::debug!(?cue, error = %e, "failed to ring terminal bell");
        }
    }
}

/// Keeps every cue it receives. Clones share the same history, so a test can
/// hand one clone to the planner and read the other.
#[derive(Debug, Default, Clone)]
pub struct Recorder {
    cues: Rc<RefCell<Vec<Cue>>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cues(&self) -> Vec<Cue> {
        self.cues.borrow().clone()
    }

    pub fn count(&self, cue: Cue) -> usize {
        self.cues.borrow().iter().filter(|c| **c == cue).count()
    }
}

impl Notifier for Recorder {
    fn play(&mut self, cue: Cue) {
        self.cues.borrow_mut().push(cue);
    }
}

impl<N: Notifier + ?Sized> Notifier for Box<N> {
    fn play(&mut self, cue: Cue) {
        (**self).play(cue);
    }
}
