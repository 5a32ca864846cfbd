//! Plotweb main entry point

use clap::Parser;
use plotweb_api::start_server;
use plotweb_config::Config;
use plotweb_core::Registry;
use plotweb_parser::DefaultRegistryParser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::runtime::Runtime;

#[derive(Parser, Debug)]
#[command(name = "plotweb")]
#[command(version = "0.1.0")]
#[command(about = "A lightweight property-account portal backend for SAP ledger exports", long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let args = Args::parse();
    let rt = Runtime::new()?;

    rt.block_on(async {
        let config = if args.config.exists() {
            Config::load(args.config.clone()).expect("Failed to load configuration")
        } else {
            eprintln!(
                "[WARN] Config file not found: {}, using defaults",
                args.config.display()
            );
            Config::default()
        };

        eprintln!(
            "[INFO] Config loaded: data path={}, registry file={}",
            config.data.path.to_string_lossy(),
            config.data.registry_file
        );

        let parser = Arc::new(DefaultRegistryParser);
        let registry = Arc::new(Registry::new(config.clone(), parser));

        match registry.load().await {
            Ok(_) => eprintln!("[INFO] Registry ready"),
            Err(e) => eprintln!("[ERROR] Failed to load registry snapshot: {:?}", e),
        }

        start_server(config, registry).await
    });

    Ok(())
}
