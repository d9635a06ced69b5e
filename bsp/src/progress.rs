/// Callbacks the builder fires deterministically while it works, enough to
/// drive a terminal animation: a status line per phase, a tick every few
/// candidates scored, and tree-walk direction changes.
pub trait Progress {
    fn status(&mut self, _message: &str) {}
    fn show_progress(&mut self) {}
    fn go_right(&mut self) {}
    fn go_left(&mut self) {}
    fn backup(&mut self) {}
    fn show_done(&mut self) {}
}

/// Swallows every callback.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoProgress;

impl Progress for NoProgress {}
