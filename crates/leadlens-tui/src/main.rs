use color_eyre::Result;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let _guard = leadlens_tui::tracing_setup::init_tracing();
    leadlens_tui::try_main().await
}
