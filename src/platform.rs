use anyhow::Result;
use crossbeam_channel::Sender;
use log::warn;
use std::process;
use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};
use std::thread;

// Cross-platform signal handling
#[cfg(unix)]
use signal_hook::{consts::SIGINT, consts::SIGTERM, iterator::Signals};

#[cfg(windows)]
use signal_hook::{consts::SIGINT, flag};

/// Standard Unix exit codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Success = 0,
    GeneralError = 1,
    InvalidUsage = 2,
    SignalInt = 130,  // 128 + SIGINT (2)
    SignalTerm = 143, // 128 + SIGTERM (15)
}

impl ExitCode {
    pub fn exit(self) -> ! {
        process::exit(self as i32)
    }

    pub fn code(self) -> i32 {
        self as i32
    }
}

/// Global termination flag for graceful shutdown
pub static SHOULD_TERMINATE: AtomicBool = AtomicBool::new(false);
static TERMINATION_CODE: AtomicI32 = AtomicI32::new(ExitCode::SignalInt as i32);

/// Control messages broadcast by the signal handler
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ctrl {
    Shutdown { immediate: bool },
}

/// Signal handler for graceful shutdown.
///
/// The first SIGINT/SIGTERM only raises [`SHOULD_TERMINATE`]; running ingestion
/// finishes and the caller decides what to skip. A second signal exits at once.
pub struct SignalHandler {
    _handle: thread::JoinHandle<()>,
}

impl SignalHandler {
    /// Initialize signal handling - cross-platform
    pub fn new(ctrl_sender: Sender<Ctrl>) -> Result<Self> {
        #[cfg(unix)]
        {
            let mut signals = Signals::new([SIGINT, SIGTERM])?;

            let handle = thread::spawn(move || {
                let mut shutdown_count = 0;
                for sig in signals.forever() {
                    let (name, code) = match sig {
                        SIGINT => ("SIGINT", ExitCode::SignalInt),
                        SIGTERM => ("SIGTERM", ExitCode::SignalTerm),
                        _ => continue,
                    };
                    shutdown_count += 1;
                    let immediate = shutdown_count > 1;
                    record_termination(code);
                    let _ = ctrl_sender.send(Ctrl::Shutdown { immediate });
                    if immediate {
                        code.exit();
                    }
                    warn!(
                        "Received {}, finishing current work; send again to exit immediately",
                        name
                    );
                }
            });

            Ok(SignalHandler { _handle: handle })
        }

        #[cfg(windows)]
        {
            // Windows signal handling using flag-based approach
            let term_flag = std::sync::Arc::new(AtomicBool::new(false));
            flag::register(SIGINT, std::sync::Arc::clone(&term_flag))?;

            let handle = thread::spawn(move || {
                let mut shutdown_count = 0;
                loop {
                    thread::sleep(std::time::Duration::from_millis(100));
                    if term_flag.swap(false, Ordering::Relaxed) {
                        shutdown_count += 1;
                        let immediate = shutdown_count > 1;
                        record_termination(ExitCode::SignalInt);
                        let _ = ctrl_sender.send(Ctrl::Shutdown { immediate });
                        if immediate {
                            ExitCode::SignalInt.exit();
                        }
                    }
                }
            });

            Ok(SignalHandler { _handle: handle })
        }
    }

    /// Check if we should terminate processing
    pub fn should_terminate() -> bool {
        SHOULD_TERMINATE.load(Ordering::Relaxed)
    }
}

fn record_termination(code: ExitCode) {
    TERMINATION_CODE.store(code.code(), Ordering::Relaxed);
    SHOULD_TERMINATE.store(true, Ordering::Relaxed);
}

/// Exit code matching the last termination signal received
pub fn termination_exit_code() -> ExitCode {
    if TERMINATION_CODE.load(Ordering::Relaxed) == ExitCode::SignalTerm.code() {
        ExitCode::SignalTerm
    } else {
        ExitCode::SignalInt
    }
}
