// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

/// Macro that generates PTY-based integration tests.
///
/// 1. **CI detection**: Automatically skips the test in CI environments
/// 2. **Process routing**: Routes to master or slave code based on an environment variable
/// 3. **PTY setup**: Creates an 80 column PTY pair and re-spawns the test binary as the
///    slave, filtered down to this one test
///
/// ```text
///  master (test process)                 slave (same binary, re-spawned)
/// ┌──────────────────────────┐          ┌──────────────────────────────┐
/// │ create PTY pair          │          │ stdin/stdout are the PTY     │
/// │ spawn slave              ├─────────▶│ run the editor / raw mode    │
/// │ write keystrokes         ├─────────▶│ print "Line: ..." reports    │
/// │ read reports, assert     │◀─────────┤ std::process::exit(..)       │
/// │ wait for child           │          │                              │
/// └──────────────────────────┘          └──────────────────────────────┘
/// ```
///
/// In a PTY, stdout and stderr are merged into a single stream from the master's
/// perspective, so filter the slave's output by content, not stream.
///
/// The slave function MUST call [`std::process::exit`] so that it never returns into the
/// test harness.
///
/// # Parameters
///
/// - `test_fn`: The test function name (used as identifier, not string)
/// - `master`: A function that accepts `(pty_pair, child)`
/// - `slave`: A function that runs in the slave process (must not return)
#[macro_export]
macro_rules! generate_pty_test {
    (
        $(#[$meta:meta])*
        test_fn: $test_name:ident,
        master: $master_fn:expr,
        slave: $slave_fn:expr
    ) => {
        $(#[$meta])*
        #[test]
        fn $test_name() {
            use std::io::Write;
            use portable_pty::{CommandBuilder, NativePtySystem, PtySize, PtySystem};

            const PTY_SLAVE_ENV_VAR: &str = "R3BL_READLINE_PTY_TEST_SLAVE";

            let pty_slave_env_var = std::env::var(PTY_SLAVE_ENV_VAR);

            // Skip in CI if running as master.
            if pty_slave_env_var.is_err() && is_ci::cached() {
                println!("⏭️  Skipped in CI (requires interactive terminal)");
                return;
            }

            // Slave process: run the slave logic (never returns, exits process).
            if pty_slave_env_var.is_ok() {
                println!("SLAVE_STARTING");
                std::io::stdout().flush().expect("Failed to flush stdout");
                $slave_fn();
            }

            // Master process: create PTY and spawn slave.
            let pty_system = NativePtySystem::default();
            let pty_pair = pty_system
                .openpty(PtySize {
                    rows: 24,
                    cols: 80,
                    pixel_width: 0,
                    pixel_height: 0,
                })
                .expect("Failed to create PTY pair");

            let test_binary =
                std::env::current_exe().expect("Failed to get current executable");
            let mut cmd = CommandBuilder::new(&test_binary);
            cmd.env(PTY_SLAVE_ENV_VAR, "1");
            cmd.env("RUST_BACKTRACE", "1");
            cmd.args(&["--test-threads", "1", "--nocapture", stringify!($test_name)]);

            let child = pty_pair
                .slave
                .spawn_command(cmd)
                .expect("Failed to spawn slave process");

            $master_fn(pty_pair, child);
        }
    };
}
