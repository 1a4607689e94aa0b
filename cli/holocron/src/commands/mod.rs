mod categories;
mod list;
mod search;
mod show;

use std::fmt;
use std::sync::Arc;

use anyhow::Result;
use bpaf::{Bpaf, ParseFailure, Parser};
use holocron_catalog::{Category, Client};
use tracing::debug;

use crate::config::Config;
use crate::utils::init::init_catalog_client;
use crate::utils::message;

static HOLOCRON_DESCRIPTION: &str =
    "Browse and search the Star Wars catalog: films, people, species, planets, starships and vehicles.";

fn vec_len<T>(x: Vec<T>) -> usize {
    Vec::len(&x)
}

#[derive(Bpaf, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verbosity {
    Verbose(
        /// Increase logging verbosity
        ///
        /// Invoke multiple times for increasing detail.
        #[bpaf(short('v'), long("verbose"), req_flag(()), many, map(vec_len))]
        usize,
    ),

    /// Silence logs except for errors
    #[bpaf(short, long)]
    Quiet,
}

impl Default for Verbosity {
    fn default() -> Self {
        Verbosity::Verbose(0)
    }
}

#[derive(Bpaf)]
#[bpaf(options, version, descr(HOLOCRON_DESCRIPTION))]
pub struct HolocronCli(#[bpaf(external(holocron_args))] pub HolocronArgs);

/// Main holocron args parser
#[derive(Debug, Bpaf)]
#[bpaf(ignore_rustdoc)]
pub struct HolocronArgs {
    /// Verbose mode
    ///
    /// Invoke multiple times for increasing detail.
    #[bpaf(external, fallback(Default::default()))]
    pub verbosity: Verbosity,

    #[bpaf(external(commands), optional)]
    command: Option<Commands>,
}

impl HolocronArgs {
    /// Run the selected command, or print help without one
    pub async fn handle(self, config: Config) -> Result<()> {
        let Some(command) = self.command else {
            display_help(None);
            return Ok(());
        };

        debug!(?command, "running command");
        command.handle(&config).await
    }
}

#[derive(Bpaf, Clone)]
enum Commands {
    /// List the catalog categories
    #[bpaf(command)]
    Categories(#[bpaf(external(categories::categories))] categories::Categories),

    /// List the records of a category
    #[bpaf(command)]
    List(#[bpaf(external(list::list))] list::List),

    /// Search a category by name
    #[bpaf(command)]
    Search(#[bpaf(external(search::search))] search::Search),

    /// Show the details of a single record
    #[bpaf(command)]
    Show(#[bpaf(external(show::show))] show::Show),
}

impl fmt::Debug for Commands {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Commands::Categories(_) => "categories",
            Commands::List(_) => "list",
            Commands::Search(_) => "search",
            Commands::Show(_) => "show",
        };
        write!(f, "{name}")
    }
}

impl Commands {
    async fn handle(self, config: &Config) -> Result<()> {
        match self {
            Commands::Categories(args) => args.handle()?,
            Commands::List(args) => args.handle(catalog_client(config)?).await?,
            Commands::Search(args) => args.handle(catalog_client(config)?).await?,
            Commands::Show(args) => args.handle(catalog_client(config)?).await?,
        }
        Ok(())
    }
}

fn catalog_client(config: &Config) -> Result<Arc<Client>> {
    Ok(Arc::new(init_catalog_client(config)?))
}

/// Parse a category argument, by endpoint id or title
fn category() -> impl Parser<Category> {
    bpaf::positional::<String>("category")
        .help("One of films, people, species, planets, starships, vehicles")
        .parse(|raw| raw.parse::<Category>())
}

/// Force `--help` output for `holocron` with a given command
pub fn display_help(cmd: Option<String>) {
    let mut args = Vec::from_iter(cmd.as_deref());
    args.push("--help");

    match holocron_cli().run_inner(&*args) {
        Ok(_) => unreachable!(),
        Err(ParseFailure::Completion(comp)) => print!("{comp:80}"),
        Err(ParseFailure::Stdout(doc, _)) => message::plain(format!("{doc:80}")),
        Err(ParseFailure::Stderr(err)) => message::error(err),
    }
}
