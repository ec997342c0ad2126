use colored::*;
use console::style;
use std::sync::atomic::{AtomicBool, Ordering};

static VERBOSE: AtomicBool = AtomicBool::new(false);

pub fn init(verbose: bool) {
    // Enable colored output on Windows
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    VERBOSE.store(verbose, Ordering::Relaxed);
}

pub fn is_verbose() -> bool {
    VERBOSE.load(Ordering::Relaxed)
}

pub fn info(message: &str) {
    if is_verbose() {
        println!("{} {}", style("ℹ").blue(), message);
    }
}

pub fn detail(message: &str) {
    if is_verbose() {
        println!("  {}", message.dimmed());
    }
}

pub fn success(message: &str) {
    println!("{} {}", style("✓").green(), message.green());
}

pub fn error(message: &str) {
    eprintln!("{} {}", style("✗").red(), message.red());
}

pub fn warn(message: &str) {
    println!("{} {}", style("⚠").yellow(), message.yellow());
}

pub fn hint(message: &str) {
    println!("{} {}", style("💡").cyan(), message.dimmed());
}
