use crate::error::{Error, Result};
use crate::model::FileType;
use std::collections::{BTreeSet, HashSet};
use std::fs;
use std::io;
use std::path::Path;
use tracing::{debug, warn};

/// Accounts under `accounts_root` that hold every directory in `required`.
///
/// An account missing any one of them is skipped.
pub fn discover(accounts_root: &Path, required: &[FileType]) -> io::Result<BTreeSet<String>> {
    let mut available = BTreeSet::new();

    for entry in fs::read_dir(accounts_root)? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        let account = entry.file_name().to_string_lossy().into_owned();

        let children: HashSet<String> = fs::read_dir(entry.path())?
            .filter_map(|child| child.ok())
            .map(|child| child.file_name().to_string_lossy().into_owned())
            .collect();

        let missing: Vec<&str> = required
            .iter()
            .map(FileType::as_str)
            .filter(|name| !children.contains(*name))
            .collect();

        if missing.is_empty() {
            available.insert(account);
        } else {
            debug!("Skipping account '{}': missing {:?}", account, missing);
        }
    }

    Ok(available)
}

/// Fails naming the first requested account that is not available.
pub fn validate(requested: &[String], available: &BTreeSet<String>) -> Result<()> {
    match requested.iter().find(|account| !available.contains(*account)) {
        Some(account) => Err(Error::Argument(format!(
            "Account '{}' is not found in the accounts directory or it does not have an artifacts or an attachments directory.",
            account
        ))),
        None => Ok(()),
    }
}

/// `all` (any case, as the first token) selects every available account.
pub fn resolve_selection(requested: &[String], available: &BTreeSet<String>) -> Result<Vec<String>> {
    let Some(first) = requested.first() else {
        return Err(Error::Argument("at least one account is required".to_string()));
    };

    if first.eq_ignore_ascii_case("all") {
        if requested.len() > 1 {
            warn!("'all' selects every account; ignoring {:?}", &requested[1..]);
        }
        return Ok(available.iter().cloned().collect());
    }

    validate(requested, available)?;

    let mut seen = HashSet::new();
    Ok(requested
        .iter()
        .filter(|account| seen.insert(account.as_str()))
        .cloned()
        .collect())
}
