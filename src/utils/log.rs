#[macro_export]
macro_rules! log {
    ($newline:expr; $module:expr; $($arg:tt)*) => {{
        use $crate::utils::log::log;

        let log_message = format!($($arg)*);
        log($module, log_message, $newline)
    }};
    ($module:expr; $($arg:tt)*) => {{
        use $crate::utils::log::log;

        let log_message = format!($($arg)*);
        log($module, log_message, false)
    }};
}

/// Modules whose lines are overwritten in place instead of scrolling.
const TRANSIENT_MODULES: &[&str] = &["images", "write"];

pub fn log(module: &str, message: String, force_newline: bool) {
    use colored::Colorize;
    use crossterm::{
        execute,
        terminal::{Clear, ClearType, size},
    };
    use std::io::{Write, stdout};

    let module_lower = module.to_lowercase();
    let should_newline = force_newline || !TRANSIENT_MODULES.contains(&module_lower.as_str());

    let colored_prefix = match module_lower.as_str() {
        "build" => format!("[{module}]").bright_blue().bold(),
        "feed" | "sitemap" => format!("[{module}]").bright_green().bold(),
        "error" => format!("[{module}]").bright_red().bold(),
        _ => format!("[{module}]").bright_yellow().bold(),
    };

    let mut stdout = stdout().lock();
    let (width, _) = size().unwrap_or((80, 25));

    execute!(stdout, Clear(ClearType::UntilNewLine)).ok();

    let log_msg = format!("{colored_prefix} {message}");
    let log_msg = if !should_newline && log_msg.chars().count() > width as usize {
        log_msg.chars().take(width.saturating_sub(1) as usize).collect::<String>()
    } else {
        log_msg
    };

    if should_newline {
        writeln!(stdout, "{log_msg}").ok();
    } else {
        write!(stdout, "{log_msg}\r").ok();
    }

    stdout.flush().ok();
}
