use super::*;

use std::io;

use prodornot_core::config::parse_log_level;
use tracing_subscriber::fmt::MakeWriter;

/// Buffers one formatted event and hands it to the matching `console.*`
/// method when the formatter drops it.
pub(super) struct ConsoleWriter {
    surface: &'static str,
    method: ConsoleMethod,
    buffer: Vec<u8>,
}

impl io::Write for ConsoleWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for ConsoleWriter {
    fn drop(&mut self) {
        let Some(line) = console_line(self.surface, &self.buffer) else {
            return;
        };
        let line = JsValue::from_str(&line);
        match self.method {
            ConsoleMethod::Error => web_sys::console::error_1(&line),
            ConsoleMethod::Warn => web_sys::console::warn_1(&line),
            ConsoleMethod::Log => web_sys::console::log_1(&line),
            ConsoleMethod::Debug => web_sys::console::debug_1(&line),
        }
    }
}

pub(super) struct ConsoleMakeWriter {
    surface: &'static str,
}

impl ConsoleMakeWriter {
    fn writer(&self, method: ConsoleMethod) -> ConsoleWriter {
        ConsoleWriter {
            surface: self.surface,
            method,
            buffer: Vec::new(),
        }
    }
}

impl<'a> MakeWriter<'a> for ConsoleMakeWriter {
    type Writer = ConsoleWriter;

    fn make_writer(&'a self) -> Self::Writer {
        self.writer(ConsoleMethod::Log)
    }

    fn make_writer_for(&'a self, meta: &tracing::Metadata<'_>) -> Self::Writer {
        self.writer(console_method_for(meta.level()))
    }
}

/// Installs the console subscriber for `surface`. The level is baked in at
/// build time from `PRODORNOT_LOG`; repeated calls keep the first subscriber.
pub(super) fn init_logging(surface: &'static str) {
    console_error_panic_hook::set_once();

    let raw = option_env!("PRODORNOT_LOG");
    let (level, source) = resolve_log_level(raw);
    let installed = tracing_subscriber::fmt()
        .with_writer(ConsoleMakeWriter { surface })
        .with_max_level(level.as_tracing_level())
        .with_target(false)
        .without_time()
        .try_init()
        .is_ok();

    if !installed {
        return;
    }
    let rejected = raw.is_some_and(|raw| !raw.trim().is_empty() && parse_log_level(raw).is_none());
    if rejected {
        warn!(surface, %source, "unrecognized log level; using info");
    } else {
        debug!(surface, level = level.as_str(), %source, "logging initialized");
    }
}
