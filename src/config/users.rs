//! Bootstrap administrators from environment variables.
//!
//! `ADMIN_USER_IDS` holds a comma-separated list of Discord user ids that are
//! treated as admins even before any role has been stored in the database.
//! This is how the first admin gets in.

/// Parses a comma-separated id list, dropping blanks and duplicates.
#[must_use]
pub fn parse_admin_ids(raw: &str) -> Vec<String> {
    let mut ids: Vec<String> = Vec::new();
    for id in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        if !ids.iter().any(|existing| existing == id) {
            ids.push(id.to_string());
        }
    }
    ids
}

/// Reads `ADMIN_USER_IDS` from the environment. Missing means no bootstrap admins.
#[must_use]
pub fn get_bootstrap_admins() -> Vec<String> {
    std::env::var("ADMIN_USER_IDS")
        .map(|raw| parse_admin_ids(&raw))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_admin_ids() {
        let ids = parse_admin_ids(" 123, 456 ,,123,789 ");
        assert_eq!(ids, vec!["123", "456", "789"]);
    }

    #[test]
    fn test_parse_admin_ids_empty() {
        assert!(parse_admin_ids("").is_empty());
        assert!(parse_admin_ids(" , ").is_empty());
    }
}
