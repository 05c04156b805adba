use anyhow::Result;
use clap::{Parser, Subcommand};
use eod::cli::{self, Harness, SearchArgs};
use eod::infra::config::default_config_dir;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "eod",
    about = "eod (Elastic Observability Dev) facilita o desenvolvimento e os testes de projetos de Observability"
)]
struct Cli {
    /// Diretório de configuração (default: ~/.config/eod)
    #[arg(long, env = "EOD_CONFIG_DIR", default_value_os_t = default_config_dir())]
    config_dir: PathBuf,

    /// Logs detalhados (equivalente a RUST_LOG=eod=debug)
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Executa uma consulta no serviço de busca e imprime o resultado
    Search(SearchArgs),
    /// Mostra o endereço em que um serviço está publicado
    Resolve {
        /// Nome do serviço configurado
        #[arg(default_value = eod::infra::config::ELASTICSEARCH_SERVICE)]
        service: String,
    },
    /// Verifica runtime de containers e serviços configurados
    Doctor,
    /// Instala o eod.toml padrão no diretório de configuração
    Setup,
}

fn main() -> Result<()> {
    let opts = Cli::parse();
    eod::logging::init(opts.verbose);

    let config_dir =
        PathBuf::from(shellexpand::tilde(&opts.config_dir.to_string_lossy()).into_owned());

    match opts.command {
        Commands::Setup => cli::setup::install(&config_dir),
        Commands::Search(args) => cli::search::run(&args, &Harness::new(&config_dir)?),
        Commands::Resolve { service } => cli::resolve::run(&service, &Harness::new(&config_dir)?),
        Commands::Doctor => cli::doctor::run(&Harness::new(&config_dir)?),
    }
}
