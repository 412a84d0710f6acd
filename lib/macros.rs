//! Help text macros.

/// Build an `Examples:` block for `after_help`.
///
/// ```ignore
/// const HELP: &str = examples![
///     "fwkit manifest ./fw " # "Write ./fw/manifest.json",
/// ];
/// ```
#[macro_export]
macro_rules! examples {
    ($($cmd:literal # $desc:literal),* $(,)?) => {
        $crate::examples_section!["Examples:"; $($cmd # $desc),*]
    };
}

/// Build a titled block of command/description lines for `after_help`.
#[macro_export]
macro_rules! examples_section {
    ($title:literal; $($cmd:literal # $desc:literal),* $(,)?) => {
        concat!(
            "\x1b[1;94m", $title, "\x1b[0m",
            $("\n  \x1b[96m", $cmd, "\x1b[0m  ", $desc,)*
        )
    };
}
