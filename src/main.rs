use beautirag::{
    config::{get_config, initialize_config},
    logging::init_logging,
    ui::run_ui,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    initialize_config()?;
    let config = get_config();
    let _logger = init_logging(&config)?;
    log::info!("starting BeautiRAG client against {}", config.base_url());

    run_ui(config).await?;
    Ok(())
}
