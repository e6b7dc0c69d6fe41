//! Arweave upload CLI
//!
//! Queries storage prices and prints transaction URLs against the node
//! described by the configuration file.

use arweave_upload::{FileRef, HttpNetwork, NetworkConfig, PriceOracle, StorageNetwork, TxId};
use clap::{Arg, ArgAction, Command};
use std::str::FromStr;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let matches = Command::new("arweave-upload")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Arweave storage pricing and transaction lookup")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .help("Path to a JSON network configuration")
                .global(true),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Verbose output")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .subcommand(
            Command::new("price")
                .about("Estimate the cost of storing data")
                .arg(
                    Arg::new("bytes")
                        .help("Payload size in bytes")
                        .value_parser(clap::value_parser!(u64))
                        .required_unless_present("file"),
                )
                .arg(
                    Arg::new("file")
                        .short('f')
                        .long("file")
                        .help("Price the size of this file")
                        .conflicts_with("bytes"),
                ),
        )
        .subcommand(
            Command::new("url")
                .about("Print the gateway URL of a transaction")
                .arg(Arg::new("tx-id").help("Transaction id").required(true)),
        )
        .subcommand(Command::new("config").about("Print the effective configuration"))
        .subcommand_required(true)
        .get_matches();

    let config = match matches.get_one::<String>("config") {
        Some(path) => NetworkConfig::from_file(path)?,
        None => NetworkConfig::default(),
    };

    let level = if matches.get_flag("verbose") {
        log::LevelFilter::Debug
    } else {
        config.log_level.to_level_filter()
    };
    env_logger::Builder::new().filter_level(level).init();

    match matches.subcommand() {
        Some(("price", sub_matches)) => {
            let size = match sub_matches.get_one::<String>("file") {
                Some(path) => {
                    let file = FileRef::from_path(path).await?;
                    println!("{} ({}, {})", file.name(), file.size_string(), file.mime_type());
                    file.size_bytes()
                }
                None => sub_matches
                    .get_one::<u64>("bytes")
                    .copied()
                    .ok_or("missing payload size")?,
            };

            let network: Arc<dyn StorageNetwork> = Arc::new(HttpNetwork::new(&config)?);
            let oracle = PriceOracle::new(network, config.read_timeout());
            let cost = oracle.estimate(size).await?;
            println!("{} bytes: {} AR", size, cost);
        }
        Some(("url", sub_matches)) => {
            let raw = sub_matches
                .get_one::<String>("tx-id")
                .ok_or("missing transaction id")?;
            let tx_id = TxId::from_str(raw)?;
            println!("{}", config.gateway_url(&tx_id));
        }
        Some(("config", _)) => {
            println!("{}", config.to_json()?);
        }
        _ => unreachable!("a subcommand is required"),
    }

    Ok(())
}
