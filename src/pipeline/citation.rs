//! Citation-style base names: `<Citation> <Year>--<Title>`.
//!
//! Two shapes exist and their separators differ on purpose:
//!
//! | Author | Base name |
//! |--------|-----------|
//! | missing / `"NULL"` | `NULL-<year>-<title>` |
//! | one author | `<First Last> <year>--<title>` |
//! | several authors | `<Last> et al. <year>--<title>` |
//!
//! Only the first parsed author is consulted for the `et al.` form,
//! however many follow it.

use crate::output::{Metadata, NULL_FIELD};
use crate::pipeline::authors::{get_last_name, parse_authors, reformat_single_author};
use crate::pipeline::sanitize::sanitize;

/// The author component of a filename.
pub fn citation(author: &str) -> Option<String> {
    if is_missing_author(author) {
        return None;
    }
    // parse_authors never returns an empty list.
    let authors = parse_authors(author);
    let first = &authors[0];
    if authors.len() > 1 {
        Some(format!("{} et al.", get_last_name(first)))
    } else {
        Some(reformat_single_author(first))
    }
}

/// Build the base name from already-sanitised fields.
pub fn base_name(author: &str, title: &str, year: &str) -> String {
    match citation(author) {
        Some(cite) => format!("{cite} {year}--{title}"),
        None => format!("{NULL_FIELD}-{year}-{title}"),
    }
}

/// Sanitise every field of `metadata`, then build its base name.
///
/// [`Metadata::Fallback`] always yields `NULL-NULL-NULL`.
pub fn base_name_for(metadata: &Metadata) -> String {
    let (author, title, year) = metadata.fields();
    base_name(&sanitize(author), &sanitize(title), &sanitize(year))
}

/// Exact comparison: a padded `" null "` or a lone space is a real author field.
fn is_missing_author(author: &str) -> bool {
    author.is_empty() || author.eq_ignore_ascii_case(NULL_FIELD)
}
