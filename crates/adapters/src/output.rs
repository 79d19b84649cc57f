// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Output sink for command echoes and tool stderr.

/// Adapter receiving human-readable output lines.
pub trait OutputAdapter: Clone + Send + Sync + 'static {
    fn append_line(&self, line: &str);
}

/// Writes every line through `tracing` on the `svw::output` target.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingOutput;

impl OutputAdapter for TracingOutput {
    fn append_line(&self, line: &str) {
        tracing::info!(target: "svw::output", "{}", line);
    }
}

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(coverage_nightly, coverage(off))]
mod fake {
    use super::OutputAdapter;
    use parking_lot::Mutex;
    use std::sync::Arc;

    /// Fake output sink that records lines
    #[derive(Clone, Default)]
    pub struct FakeOutput {
        lines: Arc<Mutex<Vec<String>>>,
    }

    impl FakeOutput {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn lines(&self) -> Vec<String> {
            self.lines.lock().clone()
        }
    }

    impl OutputAdapter for FakeOutput {
        fn append_line(&self, line: &str) {
            self.lines.lock().push(line.to_string());
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeOutput;
