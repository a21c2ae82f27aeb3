pub mod tex;

#[derive(clap::Subcommand)]
pub enum Commands {
    /// Handle KTEX texture files
    Tex {
        #[command(subcommand)]
        command: tex::TexCommands,
    },
}

impl Commands {
    pub fn handle(&self) -> miette::Result<()> {
        match self {
            Commands::Tex { command } => command.handle(),
        }
    }
}
