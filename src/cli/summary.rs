use std::{io::Write, path::PathBuf};

use anyhow::Context;
use tracing::debug;

use crate::{
    http_err::Envelope,
    ledger::{http::reps, services::LedgerService},
    server,
};

pub struct SummaryOpts {
    pub data_file: Option<PathBuf>,
}

/// Print the dashboard summary as pretty JSON on stdout.
///
/// The output matches the body of `GET /api/summary`.
pub async fn print_summary(opts: SummaryOpts) -> anyhow::Result<()> {
    let ledger_service = LedgerService::new(server::data_provider(opts.data_file.as_ref())?);

    let rendered = render_summary(&ledger_service).await?;

    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{}", rendered).context("Failed to write summary.")?;

    Ok(())
}

async fn render_summary(ledger_service: &LedgerService) -> anyhow::Result<String> {
    let summary = ledger_service.dashboard_summary().await?;
    debug!(currency = summary.currency.code(), "Built dashboard summary.");

    let rep = reps::DashboardSummary::from(&summary);

    Ok(serde_json::to_string_pretty(&Envelope::ok(rep))?)
}
