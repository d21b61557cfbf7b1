use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};

use commit_board::config::BoardConfig;
use commit_board::lookup::GithubClient;
use commit_board::render::{Element, HtmlRenderer, Renderer, TerminalRenderer};
use commit_board::store::{AddressStore, BoardState, FileStore, SortMode, StateStore, StyleMode, ViewConfig};
use commit_board::{Board, CommitSummary, Controls, RepositoryRef};

#[derive(Parser)]
#[command(name = "commit-board", version, about = "Latest commit of every tracked repository")]
struct Cli {
    /// Use this query string as the board state instead of the state file
    #[arg(long, global = true, value_name = "QUERY")]
    state: Option<String>,

    /// Print HTML markup instead of terminal text
    #[arg(long, global = true)]
    html: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch and show the board (default)
    Show,
    /// Track a repository given as owner/name
    Add { repo: String },
    /// Stop tracking a repository, given as owner/name or element key
    Remove { repo: String },
    /// Set the display style: full, small or text
    Style { style: StyleMode },
    /// Set the sort mode: none or date
    Sort { sort: SortMode },
    /// Collapse the board
    Collapse,
    /// Expand the board
    Expand,
    /// Flip the collapsed flag
    ToggleCollapse,
    /// Print a link reproducing the current board
    Link,
}

/// Where board state lives for this invocation.
enum Store {
    File(FileStore),
    Address(AddressStore),
}

impl StateStore for Store {
    fn read(&self) -> commit_board::Result<BoardState> {
        match self {
            Store::File(s) => s.read(),
            Store::Address(s) => s.read(),
        }
    }

    fn write(&self, state: &BoardState) -> commit_board::Result<()> {
        match self {
            Store::File(s) => s.write(state),
            Store::Address(s) => s.write(state),
        }
    }
}

/// Output format for this invocation.
enum Output {
    Html(HtmlRenderer),
    Terminal(TerminalRenderer),
}

impl Renderer for Output {
    fn render(&self, repo: &RepositoryRef, commit: &CommitSummary, style: StyleMode) -> Element {
        match self {
            Output::Html(r) => r.render(repo, commit, style),
            Output::Terminal(r) => r.render(repo, commit, style),
        }
    }

    fn compose(&self, view: &ViewConfig, elements: &[Element]) -> String {
        match self {
            Output::Html(r) => r.compose(view, elements),
            Output::Terminal(r) => r.compose(view, elements),
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = BoardConfig::load().context("Failed to load configuration")?;

    let store = match &cli.state {
        Some(query) => {
            let mut address = config.page_url.clone();
            address.set_query(Some(query.strip_prefix('?').unwrap_or(query)));
            Store::Address(AddressStore::new(address))
        }
        None => {
            tracing::debug!("using state file {:?}", config.state_file);
            Store::File(FileStore::new(&config.state_file))
        }
    };

    let now = Utc::now();
    let output = if cli.html {
        Output::Html(HtmlRenderer::new(config.web_base_url.clone(), now))
    } else {
        Output::Terminal(TerminalRenderer::new(now))
    };

    let lookup = GithubClient::new(
        config.api_base_url.clone(),
        &config.user_agent,
        config.request_timeout(),
    )
    .context("Failed to create HTTP client")?;

    let mut controls = Controls::new(store, lookup, output, config.page_url.clone());

    let board = match cli.command.unwrap_or(Command::Show) {
        Command::Show => controls.reload().await?,
        Command::Add { repo } => controls
            .add(&repo)
            .await
            .with_context(|| format!("Could not add '{}'", repo))?,
        Command::Remove { repo } => remove(&mut controls, &repo).await?,
        Command::Style { style } => controls.set_style(style).await?,
        Command::Sort { sort } => controls.set_sort(sort).await?,
        Command::Collapse => controls.set_collapsed(true).await?,
        Command::Expand => controls.set_collapsed(false).await?,
        Command::ToggleCollapse => controls.toggle_collapsed().await?,
        Command::Link => {
            println!("{}", controls.shareable_link()?);
            return Ok(());
        }
    };
    print_board(board);

    if let Store::Address(store) = controls.store() {
        eprintln!("commit-board: state is now {}", store.address());
    }

    Ok(())
}

async fn remove<'a, L, R>(
    controls: &'a mut Controls<Store, L, R>,
    input: &str,
) -> Result<&'a Board>
where
    L: commit_board::CommitLookup,
    R: Renderer,
{
    let board = if RepositoryRef::from_key(input).is_ok() {
        controls.remove_by_key(input).await?
    } else {
        let repo = RepositoryRef::parse(input).with_context(|| format!("Could not remove '{}'", input))?;
        controls.remove(&repo).await?
    };
    Ok(board)
}

fn print_board(board: &Board) {
    for (repo, failure) in &board.removed {
        eprintln!("commit-board: removed {} ({})", repo, failure);
    }
    if !board.markup.is_empty() {
        println!("{}", board.markup);
    }
}
