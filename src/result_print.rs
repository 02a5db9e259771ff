//! Colored terminal rendering of an [`Outcome`].

use crate::derivation::Outcome;
use std::io::Write;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

/// Print one line per result, green for an identified derivation, yellow for
/// "undetermined", red for a hedge witness.
pub fn print_outcome(outcome: &Outcome) {
    let mut stdout = StandardStream::stdout(ColorChoice::Auto);
    let color = match outcome {
        Outcome::Identified(_) => Color::Green,
        Outcome::Undetermined { .. } => Color::Yellow,
        Outcome::NotIdentifiable(_) => Color::Red,
    };
    let _ = stdout.set_color(ColorSpec::new().set_fg(Some(color)));
    let _ = writeln!(stdout, "{outcome}");
    let _ = stdout.reset();
}
