use std::path::Path;

const SHELL_PREFIX: &str = "> myshell";
const SHELL_SEPARATOR: &str = "$";

const YELLOW: &str = "\x1b[1;33m";
const GREEN: &str = "\x1b[1;32m";
const RESET: &str = "\x1b[0m";

/// Printed once when the shell starts.
pub const BANNER: &str = "Welcome to myshell. Type 'help' for the manual.\n";

/// Interactive prompt showing the working directory.
pub fn render(cwd: &Path) -> String {
    format!(
        "{YELLOW}{SHELL_PREFIX}{RESET}:~{GREEN}{}{RESET}{SHELL_SEPARATOR}  ",
        cwd.display()
    )
}
