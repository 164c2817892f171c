use nix::sys::termios::{self, LocalFlags, SetArg, SpecialCharacterIndices, Termios};
use nix::unistd;
use tracing::{debug, warn};

use std::io;
use std::os::fd::{AsFd, AsRawFd};


pub fn is_terminal<Fd: AsRawFd>(fd: &Fd) -> bool {
    unistd::isatty(fd.as_raw_fd()).unwrap_or(false)
}

/// Byte-at-a-time terminal input without echo, restored on drop.
pub struct RawMode {
    original: Termios,
}

impl Drop for RawMode {
    fn drop(&mut self) {
        if let Err(err) = termios::tcsetattr(io::stdin().as_fd(), SetArg::TCSANOW, &self.original) {
            warn!(%err, "failed to restore terminal mode");
        }
    }
}

/// Echo, canonical mode and signal characters off, so ^C and ^D arrive as bytes.
fn raw_local_flags(flags: LocalFlags) -> LocalFlags {
    flags.difference(LocalFlags::ICANON | LocalFlags::ECHO | LocalFlags::ISIG)
}

impl RawMode {
    pub fn enter() -> Result<RawMode, nix::Error> {
        let stdin = io::stdin();
        let original = termios::tcgetattr(stdin.as_fd())?;

        let mut raw = original.clone();

        raw.control_chars[SpecialCharacterIndices::VMIN as usize] = 1;
        raw.control_chars[SpecialCharacterIndices::VTIME as usize] = 0;

        raw.local_flags = raw_local_flags(raw.local_flags);

        termios::tcsetattr(stdin.as_fd(), SetArg::TCSANOW, &raw)?;

        debug!("terminal input switched to raw mode");

        Ok(RawMode { original })
    }
}
