pub mod fetch;
pub mod init;
pub mod langs;
pub mod test;

#[derive(Debug, clap::Parser)]
#[command(author, version, about, long_about = None)]
pub struct GlobalArgs {
    #[command(subcommand)]
    pub subcmd: Subcommand,

    /// Print debug logs
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, clap::Subcommand)]
pub enum Subcommand {
    /// Download a problem page into the current dir
    Fetch(fetch::Args),

    /// Write an example `acsb.toml`
    Init(init::Args),

    /// List supported languages and their commands
    Langs(langs::Args),

    /// Judge source files against the samples of the problem page
    #[command(alias("t"))]
    Test(test::Args),
}

pub type SubcmdResult = anyhow::Result<()>;

impl GlobalArgs {
    pub async fn exec_subcmd(&self) -> SubcmdResult {
        use Subcommand::*;
        match &self.subcmd {
            Fetch(args) => fetch::exec(args, self).await,
            Init(args) => init::exec(args, self),
            Langs(args) => langs::exec(args, self),
            Test(args) => test::exec(args, self).await,
        }
    }
}
