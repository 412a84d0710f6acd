//! CLI styles for clap.

use clap::builder::styling::{AnsiColor, Color, Style, Styles};

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

fn bold(color: AnsiColor) -> Style {
    Style::new().bold().fg_color(Some(Color::Ansi(color)))
}

pub fn styles() -> Styles {
    Styles::styled()
        .header(bold(AnsiColor::BrightBlue))
        .usage(bold(AnsiColor::BrightBlue))
        .literal(Style::new().fg_color(Some(Color::Ansi(AnsiColor::BrightCyan))))
        .placeholder(Style::new().fg_color(Some(Color::Ansi(AnsiColor::White))).italic())
        .error(bold(AnsiColor::Red))
        .invalid(bold(AnsiColor::Red))
        .valid(bold(AnsiColor::Green))
}
