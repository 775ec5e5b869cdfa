//! Destination-friendly column name sanitization

use regex::Regex;
use std::sync::OnceLock;

static NON_ALNUM: OnceLock<Regex> = OnceLock::new();

/// Collapse any run of characters outside `[0-9a-zA-Z]` to a single
/// underscore.
///
/// This rule must be applied identically to a table's column labels and to
/// its destination schema so the two stay aligned.
pub fn sanitize_name(name: &str) -> String {
    let re = NON_ALNUM.get_or_init(|| Regex::new("[^0-9a-zA-Z]+").expect("static pattern"));
    re.replace_all(name, "_").into_owned()
}
