use std::{fs::OpenOptions, io::Write, sync::Mutex};

use crate::trace::trace::TraceEvent;

enum Sink {
    Disabled,
    File(Mutex<std::fs::File>),
    Memory(Mutex<Vec<TraceEvent>>),
}

/// Collector for scoring and detection decisions. Disabled unless a file or
/// memory sink is requested.
pub struct TraceLogger {
    sink: Sink,
}

impl Default for TraceLogger {
    fn default() -> Self {
        Self::disabled()
    }
}

impl TraceLogger {
    pub fn disabled() -> Self {
        Self { sink: Sink::Disabled }
    }

    /// Append JSONL events to `path`.
    pub fn new(path: &str) -> Self {
        let file = OpenOptions::new().create(true).append(true).open(path);

        match file {
            Ok(f) => Self {
                sink: Sink::File(Mutex::new(f)),
            },
            Err(e) => {
                eprintln!("Warning: could not open trace file '{}': {}", path, e);
                Self::disabled()
            }
        }
    }

    /// Keep events in memory; read them back with [`TraceLogger::events`].
    pub fn in_memory() -> Self {
        Self {
            sink: Sink::Memory(Mutex::new(Vec::new())),
        }
    }

    pub fn is_enabled(&self) -> bool {
        !matches!(self.sink, Sink::Disabled)
    }

    pub fn log(&self, event: TraceEvent) {
        match &self.sink {
            Sink::Disabled => {}
            Sink::Memory(events) => match events.lock() {
                Ok(mut events) => events.push(event),
                Err(e) => eprintln!("Warning: trace buffer lock poisoned: {}", e),
            },
            Sink::File(file_mutex) => {
                let json = match serde_json::to_string(&event) {
                    Ok(j) => j,
                    Err(e) => {
                        eprintln!("Warning: failed to serialize trace event: {}", e);
                        return;
                    }
                };

                let mut file = match file_mutex.lock() {
                    Ok(f) => f,
                    Err(e) => {
                        eprintln!("Warning: trace logger lock poisoned: {}", e);
                        return;
                    }
                };

                if let Err(e) = writeln!(file, "{}", json) {
                    eprintln!("Warning: failed to write trace event: {}", e);
                }
            }
        }
    }

    /// Snapshot of buffered events (empty for file and disabled sinks).
    pub fn events(&self) -> Vec<TraceEvent> {
        match &self.sink {
            Sink::Memory(events) => events.lock().map(|e| e.clone()).unwrap_or_default(),
            _ => vec![],
        }
    }
}
