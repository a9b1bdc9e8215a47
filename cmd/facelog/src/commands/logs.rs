//! Attendance record listing command.

use clap::Args;
use facelog_attendance::{AttendanceError, TIME_FORMAT};
use facelog_faceid::Role;
use serde::Serialize;

use super::{get_config, log_store, open_backend, output_result, print_info, print_warning, store_call};
use crate::Cli;

/// List attendance records, newest first.
#[derive(Args)]
pub struct LogsCommand {
    /// Show at most this many records
    #[arg(short = 'n', long)]
    limit: Option<usize>,

    /// Only show records for this name
    #[arg(long)]
    name: Option<String>,
}

#[derive(Serialize)]
struct LogEntry {
    name: String,
    role: Role,
    time: String,
}

impl LogsCommand {
    pub async fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        let cfg = get_config(cli)?;
        let logs = log_store(&cfg, open_backend(&cfg)?);

        let (records, stored) = store_call(cfg.store_timeout(), "read logs", move || {
            let stored = logs.len()?;
            Ok::<_, AttendanceError>((logs.read_all()?, stored))
        })
        .await?;
        let total = records.len();
        if stored > total {
            print_warning(&format!("{} malformed entries skipped", stored - total));
        }
        let entries: Vec<LogEntry> = records
            .into_iter()
            .filter(|r| self.name.as_deref().is_none_or(|n| r.name() == n))
            .take(self.limit.unwrap_or(usize::MAX))
            .map(|r| LogEntry {
                time: r.timestamp.format(TIME_FORMAT).to_string(),
                name: r.identity.name,
                role: r.identity.role,
            })
            .collect();

        print_info(&format!("{} of {} records", entries.len(), total));
        output_result(&entries, cli.output.as_deref(), cli.json)
    }
}
