use clap::Parser;
use newtab_tui::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    newtab_tui::run_main(cli).await
}
