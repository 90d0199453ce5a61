use colored::{ColoredString, Colorize};
use std::fmt::Display;

#[derive(PartialEq, Eq)]
pub enum Status {
    Info,
    Success,
    Warning,
    Error,
}

impl Status {
    fn symbol(&self) -> ColoredString {
        match self {
            Self::Info => "~".cyan(),
            Self::Success => "+".green(),
            Self::Warning => "!".yellow(),
            Self::Error => "!".red(),
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Diagnostics go to stderr; stdout is reserved for the result document.
pub fn status(status: &Status, message: &impl Display) {
    eprintln!("[{status}] {message}");
}

#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        $crate::io::logger::status(&$crate::io::logger::Status::Info, &format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_success {
    ($($arg:tt)*) => {
        $crate::io::logger::status(&$crate::io::logger::Status::Success, &format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        $crate::io::logger::status(&$crate::io::logger::Status::Warning, &format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {
        $crate::io::logger::status(&$crate::io::logger::Status::Error, &format!($($arg)*))
    };
}
