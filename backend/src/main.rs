use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use wiki::application::{
    AddComment, CommentRequest, EditPage, ListPages, ListRequest, SavePage, SaveRequest,
    ViewOutcome, ViewPage,
};
use wiki::config::WikiConfig;
use wiki::domain::{Comment, Entity, Page};
use wiki::infrastructure::persistence::{Database, SqlitePageRepository};

#[derive(Parser, Debug)]
#[command(name = "wiki", version, about = "Minimal wiki backed by a document store")]
struct Cli {
    /// Print pages as JSON documents
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Show a page
    View { title: String },
    /// Show what the editor would be filled with
    Edit { title: String },
    /// Create a page, or update it when --id is given
    Save {
        title: String,
        body: String,
        #[arg(long)]
        id: Option<String>,
    },
    /// List all pages, newest first
    List {
        /// Only pages whose title matches this fragment
        #[arg(long)]
        search: Option<String>,
    },
    /// Comment on a page
    Comment {
        title: String,
        body: String,
        /// Reply to this comment instead of the page
        #[arg(long)]
        reply_to: Option<String>,
    },
}

fn main() {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run() {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = WikiConfig::from_env().context("invalid configuration")?;

    // Nothing works without storage, so a failed connect ends the process
    let database = match Database::connect(&config.store) {
        Ok(database) => Arc::new(database),
        Err(e) => {
            tracing::error!("{}", e);
            std::process::exit(2);
        }
    };
    let repository =
        SqlitePageRepository::new(database).with_title_match(config.store.title_match);

    match cli.cmd {
        Cmd::View { title } => match ViewPage::new(&repository).execute(&title)? {
            ViewOutcome::Show(page) => print_page(&page, cli.json)?,
            ViewOutcome::RedirectToEdit(title) => {
                println!("No page named '{}' yet; create it with `wiki save {} <body>`", title, title);
            }
        },
        Cmd::Edit { title } => {
            let page = EditPage::new(&repository).execute(&title)?;
            print_page(&page, cli.json)?;
        }
        Cmd::Save { title, body, id } => {
            let mut request = SaveRequest::new(title, body);
            request.id = id;
            let page = SavePage::new(&repository).execute(request)?;
            println!("{}", page.id());
        }
        Cmd::List { search } => {
            let request = ListRequest { search_term: search };
            let pages = ListPages::new(&repository).execute(request)?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&pages)?);
            } else {
                for page in &pages {
                    println!("{}  {}  {}", page.last_update().to_rfc3339(), page.id(), page.title());
                }
            }
        }
        Cmd::Comment { title, body, reply_to } => {
            let request = CommentRequest {
                page_title: title,
                body,
                reply_to,
            };
            let comment = AddComment::new(&repository).execute(request)?;
            println!("{}", comment.comment_id());
        }
    }

    Ok(())
}

fn print_page(page: &Page, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(page)?);
        return Ok(());
    }

    println!("# {}", page.title());
    if !page.id().is_nil() {
        println!("id: {}  updated: {}", page.id(), page.last_update().to_rfc3339());
    }
    println!();
    println!("{}", page.body());

    if page.comment_count() > 0 {
        println!();
        println!("-- {} comments --", page.comment_count());
        for comment in page.comments() {
            print_comment(comment, 0);
        }
    }
    Ok(())
}

fn print_comment(comment: &Comment, depth: usize) {
    println!(
        "{}[{}] {} ({})",
        "  ".repeat(depth),
        comment.comment_id(),
        comment.body(),
        comment.comment_date().to_rfc3339()
    );
    for reply in comment.replies() {
        print_comment(reply, depth + 1);
    }
}
