//! Interactive CLI prompts.
//!
//! Uses cliclack with a custom theme. Prompts are only shown when stdin is a
//! terminal; callers check that before asking.

use std::io::IsTerminal;
use std::sync::atomic::{AtomicBool, Ordering};

use cliclack::{Theme, ThemeState, confirm, input, intro, set_theme};
use console::{Style, Term};

use crate::error::{FwError, FwResult};

//--------------------------------------------------------------------------------------------------
// Constants
//--------------------------------------------------------------------------------------------------

static CTRLC_HANDLER_SET: AtomicBool = AtomicBool::new(false);

/// 256-color index used as the accent color.
const ACCENT: u8 = 39;

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// Prompt theme with a blue accent.
pub struct FwTheme;

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl Theme for FwTheme {
    fn bar_color(&self, state: &ThemeState) -> Style {
        match state {
            ThemeState::Active => Style::new().color256(ACCENT),
            ThemeState::Error(_) => Style::new().red(),
            _ => Style::new().dim(),
        }
    }

    fn state_symbol_color(&self, state: &ThemeState) -> Style {
        match state {
            ThemeState::Active | ThemeState::Submit => Style::new().color256(ACCENT),
            ThemeState::Error(_) => Style::new().red(),
            _ => Style::new().dim(),
        }
    }

    fn input_style(&self, _state: &ThemeState) -> Style {
        Style::new()
    }

    fn placeholder_style(&self, _state: &ThemeState) -> Style {
        Style::new().dim()
    }
}

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// Install the prompt theme and a Ctrl+C handler that restores the cursor.
pub fn init_theme() {
    set_theme(FwTheme);

    if !CTRLC_HANDLER_SET.swap(true, Ordering::SeqCst) {
        let _ = ctrlc::set_handler(|| {
            let _ = Term::stderr().show_cursor();
            std::process::exit(130);
        });
    }
}

/// Whether both stdin and stdout are attached to a terminal.
pub fn is_interactive() -> bool {
    std::io::stdin().is_terminal() && console::user_attended()
}

/// Convert IO interrupted errors (Esc, Ctrl+C) to [`FwError::Cancelled`].
pub fn map_cancelled<T>(result: Result<T, std::io::Error>) -> FwResult<T> {
    result.map_err(|e| {
        if e.kind() == std::io::ErrorKind::Interrupted {
            FwError::Cancelled
        } else {
            FwError::Io(e)
        }
    })
}

/// Ask for the firmware root directory.
pub fn prompt_root() -> FwResult<String> {
    init_theme();

    map_cancelled(intro("fwkit"))?;
    map_cancelled(
        input("Firmware root directory")
            .placeholder("/path/to/firmware")
            .validate(|value: &String| {
                if value.trim().is_empty() {
                    Err("A directory is required")
                } else {
                    Ok(())
                }
            })
            .interact(),
    )
}

/// Ask a yes/no question, defaulting to no.
pub fn confirm_action(message: &str) -> FwResult<bool> {
    init_theme();
    map_cancelled(confirm(message).initial_value(false).interact())
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_map_cancelled() {
        let interrupted: Result<(), _> = Err(io::Error::new(io::ErrorKind::Interrupted, "esc"));
        assert!(matches!(map_cancelled(interrupted), Err(FwError::Cancelled)));

        let other: Result<(), _> = Err(io::Error::new(io::ErrorKind::NotFound, "gone"));
        assert!(matches!(map_cancelled(other), Err(FwError::Io(_))));

        assert_eq!(map_cancelled(Ok::<_, io::Error>(5)).unwrap(), 5);
    }
}
