use parking_lot::Mutex;
use std::collections::VecDeque;
use std::io;
use std::sync::Arc;
use tracing_subscriber::fmt::MakeWriter;

pub const DEFAULT_MAX_LINES: usize = 5000;

pub type SharedLogStore = Arc<Mutex<LogStore>>;

/// Bounded ring of this client's own tracing output, rendered in the
/// diagnostics panel. `generation` counts every accepted line so the event
/// loop can tell when the panel is stale without copying the buffer.
pub struct LogStore {
    lines: VecDeque<String>,
    capacity: usize,
    generation: u64,
}

impl LogStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            lines: VecDeque::with_capacity(capacity.clamp(1, 1024)),
            capacity: capacity.max(1),
            generation: 0,
        }
    }

    pub fn shared(capacity: usize) -> SharedLogStore {
        Arc::new(Mutex::new(Self::new(capacity)))
    }

    /// Blank lines are dropped.
    pub fn push_line(&mut self, line: impl Into<String>) {
        let line = line.into();
        if line.trim().is_empty() {
            return;
        }
        if self.lines.len() == self.capacity {
            self.lines.pop_front();
        }
        self.lines.push_back(line);
        self.generation = self.generation.wrapping_add(1);
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Up to `max` lines in display order, ending `from_end` lines before the
    /// newest one.
    pub fn window(&self, from_end: usize, max: usize) -> Vec<String> {
        let end = self.lines.len().saturating_sub(from_end);
        let start = end.saturating_sub(max);
        self.lines.range(start..end).cloned().collect()
    }
}

/// `tracing_subscriber` writer factory feeding a [`LogStore`].
#[derive(Clone)]
pub struct LogMakeWriter {
    store: SharedLogStore,
}

impl LogMakeWriter {
    pub fn new(store: SharedLogStore) -> Self {
        Self { store }
    }
}

impl<'a> MakeWriter<'a> for LogMakeWriter {
    type Writer = LineWriter;

    fn make_writer(&'a self) -> Self::Writer {
        LineWriter {
            store: self.store.clone(),
            pending: Vec::new(),
        }
    }
}

/// Buffers raw bytes until a newline so a UTF-8 sequence split across two
/// writes still decodes.
pub struct LineWriter {
    store: SharedLogStore,
    pending: Vec<u8>,
}

impl LineWriter {
    fn emit(&self, raw: &[u8]) {
        let text = String::from_utf8_lossy(raw);
        let line = text.trim_end_matches(['\r', '\n']);
        if !line.trim().is_empty() {
            self.store.lock().push_line(line);
        }
    }
}

impl io::Write for LineWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.pending.extend_from_slice(buf);
        while let Some(pos) = self.pending.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.pending.drain(..=pos).collect();
            self.emit(&line);
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for LineWriter {
    fn drop(&mut self) {
        if !self.pending.is_empty() {
            let rest = std::mem::take(&mut self.pending);
            self.emit(&rest);
        }
    }
}
