#[tokio::main]
async fn main() -> anyhow::Result<()> {
    finance_dashboard_api::cli::run_with_sys_args().await
}
