use anyhow::Result;
use clap::Parser;
use pacmine::commands::{self, Config};
use std::path::PathBuf;

/// pacmine - plugin and mod manager for Minecraft servers
///
/// Resolves packages from a Modrinth-compatible registry against the
/// server's core and game version, then installs them with their
/// required dependencies.
///
/// Examples:
///   pacmine init --game-version 1.20.1 --core paper
///   pacmine install luckperms essentialsx
///   pacmine remove luckperms
#[derive(Parser, Debug)]
#[command(author, version = env!("PACMINE_VERSION"), about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Server directory (defaults to the current directory; also via PACMINE_ROOT)
    #[arg(
        long = "root",
        short = 'r',
        env = "PACMINE_ROOT",
        value_name = "PATH",
        global = true
    )]
    pub root: Option<PathBuf>,

    /// Registry API URL (defaults to https://api.modrinth.com/v2)
    #[arg(long = "api-url", env = "PACMINE_API_URL", value_name = "URL", global = true)]
    pub api_url: Option<String>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Select the server core and game version
    Init(InitArgs),

    /// Search the registry
    Search(SearchArgs),

    /// Install packages and their required dependencies
    Install(InstallArgs),

    /// Remove installed packages
    #[command(alias = "uninstall")]
    Remove(RemoveArgs),

    /// List installed packages
    List,
}

#[derive(clap::Args, Debug)]
pub struct InitArgs {
    /// Game version, e.g. 1.20.1 (prompted for when omitted)
    #[arg(long = "game-version", value_name = "VERSION")]
    pub version: Option<String>,

    /// Server core, e.g. paper or fabric (prompted for when omitted)
    #[arg(long, value_name = "CORE")]
    pub core: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct SearchArgs {
    pub query: String,
}

#[derive(clap::Args, Debug)]
pub struct InstallArgs {
    #[arg(value_name = "NAME", required = true)]
    pub names: Vec<String>,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

#[derive(clap::Args, Debug)]
pub struct RemoveArgs {
    #[arg(value_name = "NAME", required = true)]
    pub queries: Vec<String>,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    let runtime = pacmine::runtime::RealRuntime;
    let config = Config::new(&runtime, cli.root, cli.api_url)?;

    match cli.command {
        Commands::Init(args) => commands::init(runtime, args.version, args.core, config)?,
        Commands::Search(args) => commands::search(runtime, &args.query, config).await?,
        Commands::Install(args) => {
            commands::install(runtime, &args.names, args.yes, config).await?
        }
        Commands::Remove(args) => {
            commands::remove(runtime, &args.queries, args.yes, config).await?
        }
        Commands::List => commands::list(runtime, config)?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_cli_init_parsing() {
        let cli = Cli::try_parse_from([
            "pacmine",
            "init",
            "--game-version",
            "1.20.1",
            "--core",
            "paper",
        ])
        .unwrap();
        match cli.command {
            Commands::Init(args) => {
                assert_eq!(args.version.as_deref(), Some("1.20.1"));
                assert_eq!(args.core.as_deref(), Some("paper"));
            }
            _ => panic!("Expected Init command"),
        }
    }

    #[test]
    fn test_cli_install_parsing() {
        let cli = Cli::try_parse_from(["pacmine", "install", "lumina", "vault", "-y"]).unwrap();
        match cli.command {
            Commands::Install(args) => {
                assert_eq!(args.names, vec!["lumina", "vault"]);
                assert!(args.yes);
            }
            _ => panic!("Expected Install command"),
        }
    }

    #[test]
    fn test_cli_install_requires_name() {
        assert!(Cli::try_parse_from(["pacmine", "install"]).is_err());
    }

    #[test]
    fn test_cli_uninstall_alias() {
        let cli = Cli::try_parse_from(["pacmine", "uninstall", "lumina"]).unwrap();
        match cli.command {
            Commands::Remove(args) => {
                assert_eq!(args.queries, vec!["lumina"]);
                assert!(!args.yes);
            }
            _ => panic!("Expected Remove command"),
        }
    }

    #[test]
    fn test_cli_global_root_parsing() {
        let cli = Cli::try_parse_from(["pacmine", "--root", "/srv/mc", "list"]).unwrap();
        assert!(matches!(cli.command, Commands::List));
        assert_eq!(cli.root, Some(PathBuf::from("/srv/mc")));

        let cli = Cli::try_parse_from(["pacmine", "list", "-r", "/srv/mc"]).unwrap();
        assert_eq!(cli.root, Some(PathBuf::from("/srv/mc")));
    }

    #[test]
    fn test_cli_no_subcommand_fails() {
        assert!(Cli::try_parse_from(["pacmine"]).is_err());
    }
}
