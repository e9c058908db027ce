//! Logging utilities
//!
//! Thin named helpers over the `log` facade so every module reports actions,
//! transitions and rejections the same way. The browser client routes the facade
//! to the console; tests leave it unset.

#![allow(unused)]

const TARGET: &str = "aiquest";

/// Log an info message
pub fn info(msg: &str) {
    ::log::info!(target: TARGET, "{}", msg);
}

/// Log a warning message
pub fn warn(msg: &str) {
    ::log::warn!(target: TARGET, "{}", msg);
}

/// Log an error message
pub fn error(msg: &str) {
    ::log::error!(target: TARGET, "{}", msg);
}

/// Log a debug message with a label
pub fn debug(label: &str, msg: &str) {
    ::log::debug!(target: TARGET, "[{}] {}", label, msg);
}

/// Log a player action being performed
pub fn action(name: &str, details: &str) {
    ::log::info!(target: TARGET, "action {}: {}", name, details);
}

/// Log a flow state change
pub fn transition(from: &str, to: &str) {
    ::log::info!(target: TARGET, "flow {} -> {}", from, to);
}

/// Log an action refused before reaching the backend
pub fn rejected(name: &str, reason: &str) {
    ::log::warn!(target: TARGET, "rejected {}: {}", name, reason);
}

/// Log the outcome of a backend call
pub fn result(success: bool, msg: &str) {
    if success {
        ::log::debug!(target: TARGET, "ok: {}", msg);
    } else {
        ::log::warn!(target: TARGET, "failed: {}", msg);
    }
}
