use clap::Parser;
use acsb_cli::{cmd::GlobalArgs, logger};

#[tokio::main]
async fn main() {
    let app = GlobalArgs::parse();
    logger::init(app.verbose);
    app.exec_subcmd().await.unwrap_or_else(|e| {
        eprintln!("Error: {:?}", e);
        std::process::exit(1);
    });
}
