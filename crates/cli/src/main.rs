// ABOUTME: CLI for extracting recipes from web pages with recipe-cleaner-core.
// ABOUTME: Loads a page from URL, file, or stdin, prints the clean recipe as JSON, manages saved recipes.

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use recipe_cleaner_core::{
    detect_recipe, export_all, Coordinator, FileStore, Message, Options, RecipeId, RecipeStore,
    Tab,
};
use serde::Serialize;
use serde_json::json;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use url::Url;

/// Extract clean recipes from web pages and output JSON.
#[derive(Parser, Debug)]
#[command(name = "recipe-cleaner")]
#[command(about = "Extract recipes from web pages and print them as JSON", long_about = None)]
struct Args {
    /// Directory holding saved recipes.
    #[arg(long, global = true, env = "RECIPE_CLEANER_STORE")]
    store: Option<PathBuf>,

    /// Output compact JSON instead of pretty.
    #[arg(long, global = true, default_value_t = false)]
    compact: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Find the recipe on a page and print it.
    Extract {
        /// Page URL (http/https) or local file path. Use "-" to read from stdin.
        target: String,

        /// Source URL recorded in the recipe (defaults to the target).
        #[arg(long)]
        url: Option<String>,

        /// Print the raw candidate as found on the page instead of the clean recipe.
        #[arg(long, default_value_t = false)]
        raw: bool,

        /// Save the recipe to the store.
        #[arg(long, default_value_t = false, conflicts_with = "raw")]
        save: bool,
    },
    /// List saved recipes as "<id>\t<name>".
    List,
    /// Print a saved recipe.
    Show {
        /// Recipe id as printed by `list`.
        id: String,
    },
    /// Print every saved recipe as a JSON array.
    Export,
}

fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    match &args.command {
        Command::Extract {
            target,
            url,
            raw,
            save,
        } => extract(&args, target, url.as_deref(), *raw, *save),
        Command::List => {
            let store = open_store(&args)?;
            for (id, recipe) in export_all(&store)? {
                println!("{id}\t{}", recipe.name);
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Show { id } => {
            let store = open_store(&args)?;
            let id = RecipeId::parse(id)?;
            match store.get(&id)? {
                Some(recipe) => {
                    print_json(&recipe, args.compact)?;
                    Ok(ExitCode::SUCCESS)
                }
                None => bail!("no saved recipe with id {id}"),
            }
        }
        Command::Export => {
            let store = open_store(&args)?;
            let recipes: Vec<_> = export_all(&store)?
                .into_iter()
                .map(|(id, recipe)| json!({ "id": id, "recipe": recipe }))
                .collect();
            print_json(&recipes, args.compact)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn extract(
    args: &Args,
    target: &str,
    url: Option<&str>,
    raw: bool,
    save: bool,
) -> Result<ExitCode> {
    let opts = Options::default();
    let html = load_page(target, &opts)?;
    let page_url = match url {
        Some(url) => url.to_string(),
        None => source_url(target)?,
    };
    debug!(target, url = %page_url, bytes = html.len(), "loaded page");

    if raw {
        return match detect_recipe(&html) {
            Some(candidate) => {
                print_json(candidate.as_map(), args.compact)?;
                Ok(ExitCode::SUCCESS)
            }
            None => no_recipe(target),
        };
    }

    let tab = Tab::new(0, page_url);
    let message = Message::TryExtractRecipe { data: html };

    if save {
        let store = open_store(args)?;
        let mut coordinator = Coordinator::builder().options(opts).store(store).build();
        let Some(recipe) = coordinator.handle_message(&tab, message).cloned() else {
            return no_recipe(target);
        };
        let id = coordinator
            .save(tab.id)?
            .ok_or_else(|| anyhow!("recipe vanished before it could be saved"))?;
        info!(id = %id, "saved to {}", coordinator.store().dir().display());
        eprintln!("saved {id}");
        print_json(&recipe, args.compact)?;
    } else {
        let mut coordinator = Coordinator::builder().options(opts).build();
        let Some(recipe) = coordinator.handle_message(&tab, message) else {
            return no_recipe(target);
        };
        print_json(recipe, args.compact)?;
    }

    Ok(ExitCode::SUCCESS)
}

fn no_recipe(target: &str) -> Result<ExitCode> {
    eprintln!("no recipe found in {target}");
    Ok(ExitCode::from(1))
}

fn open_store(args: &Args) -> Result<FileStore> {
    let dir = args
        .store
        .as_deref()
        .ok_or_else(|| anyhow!("no store directory: pass --store or set RECIPE_CLEANER_STORE"))?;
    Ok(FileStore::open(dir)?)
}

fn print_json<T: Serialize + ?Sized>(value: &T, compact: bool) -> Result<()> {
    if compact {
        println!("{}", serde_json::to_string(value)?);
    } else {
        println!("{}", serde_json::to_string_pretty(value)?);
    }
    Ok(())
}

fn is_http(target: &str) -> bool {
    target.starts_with("http://") || target.starts_with("https://")
}

/// The URL recorded for a page when `--url` is not given.
fn source_url(target: &str) -> Result<String> {
    if is_http(target) || target == "-" {
        return Ok(target.to_string());
    }
    let path = fs::canonicalize(target).with_context(|| format!("resolving {target}"))?;
    Url::from_file_path(&path)
        .map(String::from)
        .map_err(|_| anyhow!("cannot express {} as a file URL", path.display()))
}

fn load_page(target: &str, opts: &Options) -> Result<String> {
    if target == "-" {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        return Ok(buf);
    }

    if is_http(target) {
        let client = reqwest::blocking::Client::builder()
            .timeout(opts.fetch_timeout)
            .user_agent(opts.user_agent.clone())
            .build()?;
        let resp = client.get(target).send()?.error_for_status()?;
        return Ok(resp.text()?);
    }

    let path = Path::new(target);
    if !path.exists() {
        return Err(anyhow!("file not found: {}", target));
    }
    let bytes = fs::read(path)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
