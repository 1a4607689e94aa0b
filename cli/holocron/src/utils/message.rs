use std::fmt::Display;

/// Write a message to stderr.
///
/// Results go to stdout, everything addressed to the user goes through here.
fn print_message(v: impl Display) {
    eprintln!("{v}");
}

/// alias for [print_message]
pub(crate) fn plain(v: impl Display) {
    print_message(v);
}

pub(crate) fn error(v: impl Display) {
    print_message(std::format_args!("ERROR: {v}"));
}
