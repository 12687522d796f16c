// src/backend/utils/log.rs

/// Writes one line to the canister log. The IC system API only exists inside
/// a canister, so native builds (unit tests) write to stderr instead.
#[cfg(target_arch = "wasm32")]
pub fn emit(line: &str) {
    ic_cdk::print(line);
}

#[cfg(not(target_arch = "wasm32"))]
pub fn emit(line: &str) {
    eprintln!("{}", line);
}

#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        $crate::utils::log::emit(&format!("ℹ️ INFO: {}", format_args!($($arg)*)))
    };
}

#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        $crate::utils::log::emit(&format!("⚠️ WARN: {}", format_args!($($arg)*)))
    };
}

#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {
        $crate::utils::log::emit(&format!("🔥 ERROR: {}", format_args!($($arg)*)))
    };
}
