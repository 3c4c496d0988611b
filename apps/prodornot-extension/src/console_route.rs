//! Routing of formatted log events to the browser console.

use tracing::Level;

const LOG_PREFIX: &str = "ProdOrNot";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ConsoleMethod {
    Error,
    Warn,
    Log,
    Debug,
}

pub(crate) fn console_method_for(level: &Level) -> ConsoleMethod {
    if *level == Level::ERROR {
        ConsoleMethod::Error
    } else if *level == Level::WARN {
        ConsoleMethod::Warn
    } else if *level == Level::INFO {
        ConsoleMethod::Log
    } else {
        ConsoleMethod::Debug
    }
}

/// Text for one formatted event, tagged with the surface that emitted it.
/// Returns `None` for events that formatted to nothing.
pub(crate) fn console_line(surface: &str, formatted: &[u8]) -> Option<String> {
    let text = String::from_utf8_lossy(formatted);
    let text = text.trim_end_matches(['\n', '\r']);
    if text.trim().is_empty() {
        return None;
    }
    Some(format!("[{LOG_PREFIX}:{surface}] {text}"))
}
