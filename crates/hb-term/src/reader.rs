// SPDX-License-Identifier: MIT
#![allow(unsafe_code)]
//
// Stdin on its own thread.
//
// Frames are painted on a fixed schedule whether or not anything is typed,
// so the event loop cannot sit in a blocking `read`. This thread does the
// reading and forwards raw chunks over a channel; the loop waits on the
// channel with a timeout that ends at the next frame deadline.
//
// Each wait for input is a `poll` with a short timeout, after which the stop
// flag is checked again. Shutdown therefore never waits for a keypress.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Bytes per read. Mouse motion floods arrive in a few hundred bytes.
const CHUNK: usize = 4096;

/// Poll timeout, which bounds how long `stop` waits for the thread.
const POLL_MS: i32 = 50;

/// Handle to the reader thread; stops it on [`stop`](Self::stop) or drop.
///
/// ```no_run
/// use hb_term::reader::StdinReader;
///
/// let (reader, rx) = StdinReader::spawn()?;
/// for chunk in rx.iter().take(3) {
///     println!("{} bytes", chunk.len());
/// }
/// drop(reader);
/// # Ok::<(), std::io::Error>(())
/// ```
pub struct StdinReader {
    thread: Option<JoinHandle<()>>,
    stopping: Arc<AtomicBool>,
}

impl StdinReader {
    /// Start reading. The receiver disconnects once the thread exits, which
    /// happens on stop, end of input or a read error.
    ///
    /// # Errors
    ///
    /// Returns the OS error if the thread cannot be spawned.
    pub fn spawn() -> io::Result<(Self, Receiver<Vec<u8>>)> {
        let (tx, rx) = mpsc::channel();
        let stopping = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stopping);

        let thread = thread::Builder::new()
            .name("hb-stdin".into())
            .spawn(move || {
                if let Err(e) = pump(&tx, &flag) {
                    log::debug!("stdin reader stopped: {e}");
                }
            })?;

        Ok((
            Self {
                thread: Some(thread),
                stopping,
            },
            rx,
        ))
    }

    /// Ask the thread to exit and wait for it. Safe to call twice.
    pub fn stop(&mut self) {
        self.stopping.store(true, Ordering::Relaxed);
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                log::debug!("stdin reader panicked");
            }
        }
    }
}

impl Drop for StdinReader {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Wait up to [`POLL_MS`] for stdin to become readable.
#[cfg(unix)]
fn readable(fd: libc::c_int) -> io::Result<bool> {
    let mut pfd = libc::pollfd {
        fd,
        events: libc::POLLIN,
        revents: 0,
    };
    match unsafe { libc::poll(&raw mut pfd, 1, POLL_MS) } {
        -1 => {
            let err = io::Error::last_os_error();
            if err.kind() == io::ErrorKind::Interrupted {
                Ok(false)
            } else {
                Err(err)
            }
        }
        0 => Ok(false),
        _ => Ok(true),
    }
}

/// Forward chunks until stopped. `Ok` on a clean exit: stop, EOF, or the
/// receiver going away.
#[cfg(unix)]
fn pump(tx: &Sender<Vec<u8>>, stopping: &AtomicBool) -> io::Result<()> {
    let fd = libc::STDIN_FILENO;
    let mut buf = vec![0u8; CHUNK];

    while !stopping.load(Ordering::Relaxed) {
        if !readable(fd)? {
            continue;
        }
        let n = unsafe { libc::read(fd, buf.as_mut_ptr().cast(), buf.len()) };
        let n = usize::try_from(n).map_err(|_| io::Error::last_os_error())?;
        if n == 0 {
            log::debug!("stdin reached end of input");
            return Ok(());
        }
        if tx.send(buf[..n].to_vec()).is_err() {
            return Ok(());
        }
    }
    Ok(())
}

/// Without `poll` the thread only notices `stop` after the next read.
#[cfg(not(unix))]
fn pump(tx: &Sender<Vec<u8>>, stopping: &AtomicBool) -> io::Result<()> {
    use std::io::Read;

    let mut stdin = io::stdin().lock();
    let mut buf = vec![0u8; CHUNK];

    while !stopping.load(Ordering::Relaxed) {
        let n = stdin.read(&mut buf)?;
        if n == 0 || tx.send(buf[..n].to_vec()).is_err() {
            return Ok(());
        }
    }
    Ok(())
}

// ─── Tests ───────────────────────────────────────────────────────────────────
