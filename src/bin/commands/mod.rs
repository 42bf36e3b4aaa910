pub mod run;
pub mod serve;

use albumrip::chromium::ChromiumLauncher;
use albumrip::{Pipeline, PipelineConfig};
use clap::Subcommand;

#[derive(Subcommand)]
pub enum Commands {
    /// Process albums from the command line
    ///
    /// Albums are processed in the order given. A failing album is reported
    /// and the next one still runs.
    ///
    /// Usage examples:
    /// # One album
    /// albumrip run https://soundcloud.com/artist/sets/album
    ///
    /// # Several albums, strictly in order
    /// albumrip run https://soundcloud.com/a/sets/one https://soundcloud.com/a/sets/two
    Run {
        /// Album page links
        #[arg(required = true)]
        links: Vec<String>,
    },

    /// Serve `GET /api/download` over HTTP
    ///
    /// Usage examples:
    /// # Listen on the default address
    /// albumrip serve
    ///
    /// # Then trigger a batch
    /// curl 'http://127.0.0.1:3000/api/download?links=https://soundcloud.com/a/sets/one'
    Serve {
        /// Address to listen on
        #[arg(long, default_value = "127.0.0.1:3000")]
        bind: String,
    },
}

pub async fn execute_command(
    command: Commands,
    launcher: ChromiumLauncher,
    config: PipelineConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let http_client = http_client::native::NativeClient::new();
    let pipeline = Pipeline::new(launcher, Box::new(http_client), config);

    match command {
        Commands::Run { links } => run::handle_run(pipeline, &links).await,
        Commands::Serve { bind } => serve::handle_serve(pipeline, &bind).await,
    }
}
