use std::collections::BTreeMap;
use std::fmt;
use tracing::info;

/// The two categories of tenant files that get archived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FileType {
    Attachments,
    Artifacts,
}

impl FileType {
    pub const ALL: [FileType; 2] = [FileType::Attachments, FileType::Artifacts];

    pub fn as_str(&self) -> &'static str {
        match self {
            FileType::Attachments => "attachments",
            FileType::Artifacts => "artifacts",
        }
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per account, per file type: did the move pass stage any files.
///
/// Only used for reporting. Nothing in the run branches on it.
#[derive(Debug, Default)]
pub struct MovedFilesLedger {
    entries: BTreeMap<String, BTreeMap<FileType, bool>>,
}

impl MovedFilesLedger {
    pub fn new(accounts: &[String]) -> Self {
        let entries = accounts
            .iter()
            .map(|account| {
                let flags: BTreeMap<FileType, bool> =
                    FileType::ALL.iter().map(|ft| (*ft, false)).collect();
                (account.clone(), flags)
            })
            .collect();
        Self { entries }
    }

    pub fn mark_moved(&mut self, account: &str, file_type: FileType) {
        if let Some(flag) = self
            .entries
            .get_mut(account)
            .and_then(|flags| flags.get_mut(&file_type))
        {
            *flag = true;
        }
    }

    pub fn was_moved(&self, account: &str, file_type: FileType) -> bool {
        self.entries
            .get(account)
            .and_then(|flags| flags.get(&file_type))
            .copied()
            .unwrap_or(false)
    }

    pub fn moved_count(&self) -> usize {
        self.entries
            .values()
            .flat_map(|flags| flags.values())
            .filter(|moved| **moved)
            .count()
    }

    pub fn log_summary(&self) {
        for (account, flags) in &self.entries {
            let moved: Vec<&str> = flags
                .iter()
                .filter(|(_, moved)| **moved)
                .map(|(ft, _)| ft.as_str())
                .collect();
            info!("Account '{}' staged files for: {:?}", account, moved);
        }
    }
}
