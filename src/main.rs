use clap::Parser;
use color_eyre::Result;
use meetsolis_layout::{
    init_errors,
    init_logging,
    App,
    Args,
    Config,
};

#[tokio::main]
async fn main() -> Result<()> {
    init_errors()?;
    let args = Args::parse();
    let config = Config::new(args.clone())?;
    init_logging(config.verbose)?;
    App::new(args, config).run().await
}
