use anyhow::Result;
use chaincal_core::{ChainCalConfig, SettlePolicy};
use humantime::format_duration;
use owo_colors::OwoColorize;

pub fn run() -> Result<()> {
    let config_path = ChainCalConfig::config_path()?;

    if !config_path.exists() {
        ChainCalConfig::create_default_config(&config_path)?;
        println!("Created {}", config_path.display());
    }

    println!("{}", "Paths".bold());
    println!("  Config:     {}", config_path.display());

    let config = match ChainCalConfig::load() {
        Ok(config) => config,
        Err(e) => {
            println!("\n   {}", e.to_string().red());
            return Ok(());
        }
    };

    println!("\n{}", "Ledger".bold());
    println!("  Network:    {:?}", config.network);
    println!("  RPC:        {}", config.rpc_url);
    println!("  Package:    {}", config.package_id);
    println!("  Statistics: {}", config.statistics_object_id);

    println!("\n{}", "Client".bold());
    match config.settle {
        SettlePolicy::Fixed(delay) => {
            println!("  Settle:     fixed {}", format_duration(delay));
        }
        SettlePolicy::Poll { interval, timeout } => {
            println!(
                "  Settle:     poll every {} for up to {}",
                format_duration(interval),
                format_duration(timeout)
            );
        }
    }
    println!("  Signer:     {}", config.signer);
    println!("  Timezone:   {}", config.timezone);

    Ok(())
}
