//! Frame-by-frame run control for interactive drivers.

/// A user request received during a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Pause,
    Resume,
    /// Advance a single tick while paused.
    Step,
    Quit,
}

/// What the driver should do this frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frame {
    Advance,
    Hold,
    Quit,
}

/// Pause/resume/step state of a running simulation.
///
/// Playback starts paused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Playback {
    paused: bool,
    quit: bool,
}

impl Default for Playback {
    fn default() -> Self {
        Self {
            paused: true,
            quit: false,
        }
    }
}

impl Playback {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    #[must_use]
    pub fn has_quit(&self) -> bool {
        self.quit
    }

    /// Handles one frame with an optional command.
    ///
    /// Frames that pause or resume never advance, and `Step` only advances
    /// while paused. Once quit, every later frame is `Quit`.
    pub fn frame(&mut self, command: Option<Command>) -> Frame {
        if self.quit {
            return Frame::Quit;
        }

        match command {
            Some(Command::Quit) => {
                self.quit = true;
                Frame::Quit
            }
            Some(Command::Pause) => {
                self.paused = true;
                Frame::Hold
            }
            Some(Command::Resume) => {
                self.paused = false;
                Frame::Hold
            }
            Some(Command::Step) if self.paused => Frame::Advance,
            Some(Command::Step) | None => {
                if self.paused {
                    Frame::Hold
                } else {
                    Frame::Advance
                }
            }
        }
    }
}
