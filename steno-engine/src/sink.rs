//! Host key-code emission interface.
//!
//! The engine never types directly; it hands backspace counts, literal text,
//! and raw key sequences to a sink the host provides (USB HID, a terminal
//! emulator, a test double).

/// Where translated output goes.
pub trait KeyCodeSink {
    /// Remove `count` characters immediately before the cursor.
    fn emit_backspaces(&mut self, count: usize);

    /// Type `text` literally.
    fn emit_text(&mut self, text: &str);

    /// Emit one raw key event, as encoded by a `{#...}` directive (e.g. a scan code and
    /// modifier mask packed by the host's own convention). The core treats this payload as
    /// opaque and forwards it unparsed.
    fn emit_raw_key(&mut self, raw: &str);
}

#[cfg(any(feature = "std", test))]
extern crate alloc;

/// A sink that records every call, for tests and the console tool.
#[cfg(any(feature = "std", test))]
#[derive(Default, Debug)]
pub struct RecordingSink {
    pub backspaces: usize,
    pub typed: alloc::string::String,
    pub raw: alloc::vec::Vec<alloc::string::String>,
}

#[cfg(any(feature = "std", test))]
impl KeyCodeSink for RecordingSink {
    fn emit_backspaces(&mut self, count: usize) {
        self.backspaces += count;
        for _ in 0..count {
            self.typed.pop();
        }
    }

    fn emit_text(&mut self, text: &str) {
        self.typed.push_str(text);
    }

    fn emit_raw_key(&mut self, raw: &str) {
        self.raw.push(raw.into());
    }
}
