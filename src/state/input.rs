//! Config input for `--enable`.
//!
//! The new config arrives on a descriptor inherited from the parent process
//! (fd 3 unless configured otherwise), already opened by whoever invoked us.

use std::fs::File;
use std::io;
use std::os::fd::{FromRawFd, RawFd};

/// Descriptor the config is supplied on by default
pub const DEFAULT_INPUT_FD: RawFd = 3;

/// Take ownership of the inherited descriptor `fd` as a readable file.
///
/// Fails with `EBADF` if nothing is open on `fd`. Standard streams are
/// refused so that a misconfiguration never closes stdio.
pub fn open_inherited(fd: RawFd) -> io::Result<File> {
    if (0..=2).contains(&fd) {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("descriptor {fd} is a standard stream"),
        ));
    }

    // nix's fcntl wants a BorrowedFd, which may only be made for an open fd
    if unsafe { libc::fcntl(fd, libc::F_GETFD) } == -1 {
        return Err(io::Error::last_os_error());
    }

    log::debug!("Reading config from inherited descriptor {fd}");
    // SAFETY: fd is open (checked above) and nothing else in this process
    // owns it; it is handed over to the returned File exactly once.
    Ok(unsafe { File::from_raw_fd(fd) })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_refuses_standard_streams() {
        for fd in 0..=2 {
            let err = open_inherited(fd).unwrap_err();
            assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
        }
    }

    #[test]
    fn test_closed_descriptor_is_ebadf() {
        let err = open_inherited(987_654).unwrap_err();
        assert_eq!(err.raw_os_error(), Some(libc::EBADF));
    }
}
