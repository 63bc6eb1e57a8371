//! Transput sink for `print` and `newline`.
//!
//! Output goes to stdout by default; tests and embedders capture it in a
//! buffer, and a silent sink discards it. Enum dispatch keeps the hot path
//! free of vtable calls.

use std::sync::Arc;

use parking_lot::Mutex;

/// Buffer sink.
#[derive(Default)]
pub struct BufferPrintHandler {
    buffer: Mutex<String>,
}

impl BufferPrintHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn print(&self, msg: &str) {
        self.buffer.lock().push_str(msg);
    }

    pub fn get_output(&self) -> String {
        self.buffer.lock().clone()
    }

    pub fn clear(&self) {
        self.buffer.lock().clear();
    }
}

pub enum PrintHandlerImpl {
    Stdout,
    Buffer(BufferPrintHandler),
    Silent,
}

impl PrintHandlerImpl {
    /// Print without a trailing newline.
    pub fn print(&self, msg: &str) {
        match self {
            Self::Stdout => print!("{msg}"),
            Self::Buffer(h) => h.print(msg),
            Self::Silent => {}
        }
    }

    /// Captured output; empty for sinks that do not capture.
    pub fn get_output(&self) -> String {
        match self {
            Self::Buffer(h) => h.get_output(),
            Self::Stdout | Self::Silent => String::new(),
        }
    }

    pub fn clear(&self) {
        if let Self::Buffer(h) = self {
            h.clear();
        }
    }
}

/// Shared handle so the driver can read a buffer the genie writes to.
pub type SharedPrintHandler = Arc<PrintHandlerImpl>;

pub fn stdout_handler() -> SharedPrintHandler {
    Arc::new(PrintHandlerImpl::Stdout)
}

pub fn buffer_handler() -> SharedPrintHandler {
    Arc::new(PrintHandlerImpl::Buffer(BufferPrintHandler::new()))
}

pub fn silent_handler() -> SharedPrintHandler {
    Arc::new(PrintHandlerImpl::Silent)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffer_accumulates() {
        let handler = buffer_handler();
        handler.print("1");
        handler.print(" 3");
        assert_eq!(handler.get_output(), "1 3");
        handler.clear();
        assert_eq!(handler.get_output(), "");
    }

    #[test]
    fn silent_discards() {
        let handler = silent_handler();
        handler.print("lost");
        assert_eq!(handler.get_output(), "");
    }
}
