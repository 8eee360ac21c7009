//! Database record models matching table schemas.
//!
//! Each entity module holds the row struct (deriving `sqlx::FromRow`), the create/update request
//! types the store accepts, and the filter used by list operations. Database models are kept
//! distinct from the API models in [`crate::api::models`] so storage and wire representations can
//! evolve independently.
//!
//! Status columns are carried as the raw stored `String` on rows. Write paths only ever persist
//! values from the closed vocabularies in [`crate::types`], but legacy rows may contain anything,
//! and read paths surface those rather than dropping them.

pub mod applications;
pub mod creches;
pub mod events;
pub mod invoices;
pub mod notifications;
pub mod students;
pub mod support_tickets;
pub mod users;
pub mod webhooks;

/// Case-insensitive substring match used by list filters.
///
/// Mirrors the `LOWER(col) LIKE '%term%'` predicate the PostgreSQL store builds, so both stores
/// agree on which rows a search returns.
pub fn matches_search<'a>(search: Option<&str>, columns: impl IntoIterator<Item = Option<&'a str>>) -> bool {
    let Some(term) = search.map(str::trim).filter(|s| !s.is_empty()) else {
        return true;
    };
    let term = term.to_lowercase();
    columns
        .into_iter()
        .flatten()
        .any(|value| value.to_lowercase().contains(&term))
}

/// Build the `%term%` pattern bound into SQL `LIKE ... ESCAPE '\'` predicates, or `None` for an
/// absent/blank term. `%`, `_` and `\` in the term match literally.
pub fn like_pattern(search: Option<&str>) -> Option<String> {
    let term = search.map(str::trim).filter(|s| !s.is_empty())?;
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.to_lowercase().chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    Some(pattern)
}
