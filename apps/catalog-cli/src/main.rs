//! Catalog CLI
//!
//! Lists, searches and edits the financial products served by the catalog API.

use clap::{Args, Parser, Subcommand};
use core_config::tracing::{init_tracing, install_color_eyre};
use domain_financial_products::{
    FilterStore, HttpProductRepository, ListProjectionEngine, MutationCoordinator,
    PaginationPatch, PaginationStore,
};
use eyre::Result;
use tracing::info;

mod commands;
mod config;

use commands::{ListOptions, ProductInput};
use config::{parse_page_size, Config};

#[derive(Parser)]
#[command(name = "catalog-cli")]
#[command(about = "Browse and manage the financial products catalog")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show one page of products
    List {
        /// Case-insensitive search on name, description and id
        #[arg(short, long)]
        search: Option<String>,

        /// 1-based page number
        #[arg(short, long, default_value_t = 1)]
        page: usize,

        /// Page size (5, 10 or 20). Defaults to CATALOG_PAGE_SIZE.
        #[arg(long, value_parser = parse_page_size)]
        per_page: Option<usize>,

        /// Print the page as JSON
        #[arg(long)]
        json: bool,
    },

    /// Create a product
    Create {
        #[arg(long)]
        id: String,

        #[command(flatten)]
        fields: FieldArgs,
    },

    /// Update the fields of an existing product
    Update {
        id: String,

        #[command(flatten)]
        fields: FieldArgs,
    },

    /// Delete a product
    Delete { id: String },
}

#[derive(Args, Debug, Default)]
struct FieldArgs {
    #[arg(long)]
    name: Option<String>,

    #[arg(long)]
    description: Option<String>,

    /// Logo URL
    #[arg(long)]
    logo: Option<String>,

    /// Release date (yyyy-mm-dd); proposes a revision date one year later
    #[arg(long)]
    date_release: Option<String>,

    /// Revision date (yyyy-mm-dd)
    #[arg(long)]
    date_revision: Option<String>,
}

impl FieldArgs {
    fn into_input(self, id: Option<String>) -> ProductInput {
        ProductInput {
            id,
            name: self.name,
            description: self.description,
            logo: self.logo,
            date_release: self.date_release,
            date_revision: self.date_revision,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    install_color_eyre();

    let config = Config::from_env()?;
    init_tracing(&config.environment);

    let cli = Cli::parse();

    info!(api = %config.api.base_url, "Using catalog API");
    let repository = HttpProductRepository::new(config.api.clone())?;

    let pagination = PaginationStore::new();
    pagination.update(PaginationPatch::default().with_items_per_page(config.page_size));
    let engine = ListProjectionEngine::new(repository, FilterStore::new(), pagination);

    match cli.command {
        Commands::List {
            search,
            page,
            per_page,
            json,
        } => {
            let options = ListOptions {
                search,
                page,
                per_page: per_page.unwrap_or(config.page_size),
                json,
            };
            commands::list(&engine, options).await?;
        }

        Commands::Create { id, fields } => {
            let coordinator = MutationCoordinator::new(engine);
            commands::create(&coordinator, fields.into_input(Some(id))).await?;
        }

        Commands::Update { id, fields } => {
            let coordinator = MutationCoordinator::new(engine);
            commands::update(&coordinator, id, fields.into_input(None)).await?;
        }

        Commands::Delete { id } => {
            let coordinator = MutationCoordinator::new(engine);
            commands::delete(&coordinator, id).await?;
        }
    }

    Ok(())
}
