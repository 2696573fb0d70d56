use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser)] // requires `derive` feature
#[command(name = "tenant-archiver")]
#[command(about = "Archive attachments and artifacts.", long_about = None)]
pub struct Cli {
    /// SOAR accounts e.g. acc_T3, type 'all' for all available accounts
    #[arg(long, num_args = 1.., required = true)]
    pub accounts: Vec<String>,

    /// Archive files modified after or at this date. Defaults to 2010-01-01
    #[arg(long = "from")]
    pub time_from: Option<String>,

    /// Archive files modified before or at this date
    #[arg(long = "to")]
    pub time_to: String,

    /// Extra configuration file layered over the defaults
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_multiple_accounts() {
        let cli = Cli::try_parse_from([
            "tenant-archiver",
            "--accounts",
            "acc_T1",
            "acc_T2",
            "--to",
            "2024-01-01",
        ])
        .unwrap();
        assert_eq!(cli.accounts, vec!["acc_T1", "acc_T2"]);
        assert_eq!(cli.time_to, "2024-01-01");
        assert!(cli.time_from.is_none());
    }

    #[test]
    fn test_to_and_accounts_are_required() {
        assert!(Cli::try_parse_from(["tenant-archiver", "--accounts", "all"]).is_err());
        assert!(Cli::try_parse_from(["tenant-archiver", "--to", "2024-01-01"]).is_err());
    }
}
