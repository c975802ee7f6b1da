// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Cancellation of a blocked line read by an external interrupt.
//!
//! ```text
//!  interrupt (SIGINT / console Ctrl+C)
//!          │
//!          ▼
//!  InterruptWatcher ──▶ CancellationToken::cancel()
//!                          │ 1. set flag
//!                          │ 2. call the session's waker
//!                          ▼
//!  session.read_keys() returns SessionEvent::Interrupted
//!          │
//!          ▼
//!  edit loop sees the flag, clears the buffer, returns Ok("")
//! ```
//!
//! The watcher never touches the terminal or the line buffer. The foreground loop checks
//! the flag right after every read, so a cancellation is observed even if the read
//! returned for another reason at the same moment.

use std::{fmt::{Debug, Formatter},
          sync::{Arc, Mutex as StdMutex,
                 atomic::{AtomicBool, Ordering}}};

type WakeFn = Arc<dyn Fn() + Send + Sync>;

/// One-shot cancellation flag shared between the watcher and the edit loop. Cloning is
/// cheap and every clone observes the same flag.
#[derive(Clone, Default)]
pub struct CancellationToken {
    inner: Arc<TokenInner>,
}

#[derive(Default)]
struct TokenInner {
    cancelled: AtomicBool,
    waker: StdMutex<Option<WakeFn>>,
}

impl Debug for CancellationToken {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CancellationToken")
            .field("cancelled", &self.is_cancelled())
            .finish_non_exhaustive()
    }
}

impl CancellationToken {
    #[must_use]
    pub fn new() -> Self { Self::default() }

    #[must_use]
    pub fn is_cancelled(&self) -> bool { self.inner.cancelled.load(Ordering::SeqCst) }

    /// Set the flag, then wake the blocked read (if a session registered a waker).
    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::SeqCst);
        let waker = self
            .inner
            .waker
            .lock()
            .ok()
            .and_then(|guard| guard.as_ref().map(Arc::clone));
        if let Some(wake) = waker {
            wake();
        }
    }

    /// Called by a session on open, so [`CancellationToken::cancel()`] can unblock its
    /// read.
    pub fn set_waker(&self, wake: impl Fn() + Send + Sync + 'static) {
        if let Ok(mut guard) = self.inner.waker.lock() {
            *guard = Some(Arc::new(wake));
        }
    }

    /// Called by a session on close.
    pub fn clear_waker(&self) {
        if let Ok(mut guard) = self.inner.waker.lock() {
            *guard = None;
        }
    }
}

#[cfg(unix)]
mod watcher_unix {
    use super::CancellationToken;
    use signal_hook::{consts::SIGINT, iterator::{Handle, Signals}};
    use std::{io,
              thread::{self, JoinHandle}};

    /// Watches for `SIGINT` on a background thread for the duration of one line read.
    ///
    /// The `SIGINT` action is registered in [`InterruptWatcher::start()`] and removed
    /// in [`InterruptWatcher::stop()`], once the [`Signals`] iterator and its [`Handle`]
    /// are both dropped. Between reads, `SIGINT` goes to whatever handlers the host
    /// program registered.
    ///
    /// `signal-hook` keeps its low level handler installed after the last action is
    /// removed. A host with no `SIGINT` handler of its own therefore ignores `SIGINT`
    /// between reads, once the first read has started.
    #[derive(Debug)]
    pub struct InterruptWatcher {
        handle: Option<Handle>,
        thread: Option<JoinHandle<()>>,
    }

    impl InterruptWatcher {
        /// # Errors
        ///
        /// Returns an error if the signal handler can't be registered or the thread
        /// can't be spawned.
        pub fn start(token: CancellationToken) -> io::Result<Self> {
            let mut signals = Signals::new([SIGINT])?;
            let handle = signals.handle();
            let thread = thread::Builder::new()
                .name("readline-interrupt-watcher".into())
                .spawn(move || {
                    for signal in signals.forever() {
                        tracing::debug!(message = "interrupt received", signal);
                        token.cancel();
                    }
                })?;
            tracing::debug!(message = "interrupt watcher started");
            Ok(Self {
                handle: Some(handle),
                thread: Some(thread),
            })
        }

        /// Unregister the `SIGINT` action and join the thread. Idempotent.
        pub fn stop(&mut self) {
            let Some(handle) = self.handle.take() else {
                return;
            };
            handle.close();
            if let Some(thread) = self.thread.take()
                && thread.join().is_err()
            {
                tracing::warn!(message = "interrupt watcher thread panicked");
            }
            // Last reference to the delivery state, dropping it unregisters the action.
            drop(handle);
            tracing::debug!(message = "interrupt watcher stopped");
        }
    }

    impl Drop for InterruptWatcher {
        fn drop(&mut self) { self.stop(); }
    }
}

#[cfg(windows)]
mod watcher_windows {
    use super::CancellationToken;
    use std::{io, sync::Mutex as StdMutex};
    use windows_sys::Win32::System::Console::{CTRL_BREAK_EVENT, CTRL_C_EVENT,
                                              SetConsoleCtrlHandler};

    // `BOOL` values.
    const TRUE: i32 = 1;
    const FALSE: i32 = 0;

    /// Process-wide, the console has a single handler list.
    static ACTIVE_TOKEN: StdMutex<Option<CancellationToken>> = StdMutex::new(None);

    unsafe extern "system" fn ctrl_handler(ctrl_type: u32) -> i32 {
        if ctrl_type != CTRL_C_EVENT && ctrl_type != CTRL_BREAK_EVENT {
            return FALSE;
        }
        let token = ACTIVE_TOKEN.lock().ok().and_then(|guard| guard.clone());
        match token {
            Some(token) => {
                token.cancel();
                TRUE
            }
            None => FALSE,
        }
    }

    /// Installs a console control handler for the duration of one line read.
    #[derive(Debug)]
    pub struct InterruptWatcher {
        installed: bool,
    }

    impl InterruptWatcher {
        /// # Errors
        ///
        /// Returns the last OS error if the handler can't be installed.
        pub fn start(token: CancellationToken) -> io::Result<Self> {
            if let Ok(mut guard) = ACTIVE_TOKEN.lock() {
                *guard = Some(token);
            }
            // SAFETY: `ctrl_handler` is a valid handler routine for the process lifetime.
            if unsafe { SetConsoleCtrlHandler(Some(ctrl_handler), TRUE) } == 0 {
                return Err(io::Error::last_os_error());
            }
            tracing::debug!(message = "console ctrl handler installed");
            Ok(Self { installed: true })
        }

        /// Remove the handler. Idempotent.
        pub fn stop(&mut self) {
            if !std::mem::take(&mut self.installed) {
                return;
            }
            // SAFETY: removes the routine installed in `start()`.
            if unsafe { SetConsoleCtrlHandler(Some(ctrl_handler), FALSE) } == 0 {
                tracing::warn!(
                    message = "failed to remove console ctrl handler",
                    err = ?io::Error::last_os_error()
                );
            }
            if let Ok(mut guard) = ACTIVE_TOKEN.lock() {
                *guard = None;
            }
            tracing::debug!(message = "console ctrl handler removed");
        }
    }

    impl Drop for InterruptWatcher {
        fn drop(&mut self) { self.stop(); }
    }
}

#[cfg(unix)]
pub use watcher_unix::InterruptWatcher;
#[cfg(windows)]
pub use watcher_windows::InterruptWatcher;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn test_cancel_sets_flag_and_wakes() {
        let token = CancellationToken::new();
        let wakes = Arc::new(AtomicUsize::new(0));
        let wakes_clone = Arc::clone(&wakes);
        token.set_waker(move || {
            wakes_clone.fetch_add(1, Ordering::SeqCst);
        });

        let clone = token.clone();
        assert!(!clone.is_cancelled());
        clone.cancel();
        assert!(token.is_cancelled());
        assert_eq!(wakes.load(Ordering::SeqCst), 1);

        token.clear_waker();
        token.cancel();
        assert_eq!(wakes.load(Ordering::SeqCst), 1);
    }

    #[cfg(unix)]
    #[serial_test::serial]
    #[test]
    fn test_sigint_cancels_token_and_watcher_stops() {
        use std::time::{Duration, Instant};

        let token = CancellationToken::new();
        let mut watcher = InterruptWatcher::start(token.clone()).unwrap();

        signal_hook::low_level::raise(signal_hook::consts::SIGINT).unwrap();

        let deadline = Instant::now() + Duration::from_secs(5);
        while !token.is_cancelled() && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(10));
        }
        assert!(token.is_cancelled());

        watcher.stop();
        watcher.stop();

        // A second watcher for the next read starts cleanly.
        let second = CancellationToken::new();
        let watcher = InterruptWatcher::start(second.clone()).unwrap();
        drop(watcher);
        assert!(!second.is_cancelled());
    }

    #[cfg(unix)]
    #[serial_test::serial]
    #[test]
    fn test_host_sigint_handler_runs_after_stop() {
        use signal_hook::{consts::SIGINT, flag, low_level};

        let token = CancellationToken::new();
        let mut watcher = InterruptWatcher::start(token.clone()).unwrap();
        watcher.stop();

        let handled = Arc::new(AtomicBool::new(false));
        let host_id = flag::register(SIGINT, Arc::clone(&handled)).unwrap();
        low_level::raise(SIGINT).unwrap();
        low_level::unregister(host_id);

        assert!(handled.load(Ordering::SeqCst));
        assert!(!token.is_cancelled());
    }
}
