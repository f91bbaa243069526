//! Styles for the fvt CLI.
//!
//! Code refers to styles by what they mark (a hidden row, a header), never by
//! color. `console` drops the escape codes on its own when stdout is not a
//! terminal, so piped output and tests see plain text.

use console::Style;
use once_cell::sync::Lazy;

pub static HEADER: Lazy<Style> = Lazy::new(|| Style::new().bold());
pub static MUTED: Lazy<Style> = Lazy::new(|| Style::new().dim());
pub static HIDDEN: Lazy<Style> = Lazy::new(|| Style::new().dim().italic());
pub static LAYER_ID: Lazy<Style> = Lazy::new(|| Style::new().yellow());

pub static INFO: Lazy<Style> = Lazy::new(|| Style::new().dim());
pub static SUCCESS: Lazy<Style> = Lazy::new(|| Style::new().green());
pub static WARNING: Lazy<Style> = Lazy::new(|| Style::new().yellow());
pub static ERROR: Lazy<Style> = Lazy::new(|| Style::new().red());
