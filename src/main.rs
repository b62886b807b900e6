//! Storedesk CLI application entry point
//!
//! This is the main executable for storedesk. It drives one [`Session`]
//! against the configured storefront backend.
//!
//! # Usage
//!
//! ```bash
//! # List products through the default view (default command)
//! storedesk
//! storedesk list --view 1 --status active --sort "tone desc"
//!
//! # Show saved views
//! storedesk views
//!
//! # Generate, review and apply a description for product 42
//! storedesk generate 42
//!
//! # Configuration
//! storedesk config show
//! storedesk config set base_url=https://admin.example.com
//! ```
//!
//! # Configuration
//!
//! On first run, storedesk prompts for the backend URL. Configuration is
//! stored in the user's config directory (`~/.config/storedesk/config.toml`
//! on Linux).

use colored::Colorize;
use dialoguer::{Editor, Select, theme::ColorfulTheme};
use storedesk::{
    Session, StoredeskError,
    annotate::AnnotateError,
    cli::{Cli, Commands, ConfigCommands, CriteriaArgs},
    config::StoredeskConfig,
    items::{Item, ItemId},
    output,
};
use tracing_subscriber::EnvFilter;

type Result<T> = std::result::Result<T, StoredeskError>;

/// Initialise `tracing` from `RUST_LOG`, falling back to the configured filter
fn init_logging(config: &StoredeskConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Apply CLI filter/sort overrides to the working criteria
fn apply_criteria(session: &Session, criteria: &CriteriaArgs) {
    let views = session.views();
    if !criteria.statuses.is_empty() {
        views.set_status_filter(criteria.statuses.iter().copied());
    }
    if !criteria.categories.is_empty() {
        views.set_category_filter(criteria.categories.iter().cloned());
    }
    if let Some(query) = &criteria.query {
        views.set_query(query.clone());
    }
    if let Some(sort) = criteria.sort {
        views.set_sort(sort);
    }
}

async fn handle_list_command(
    session: &Session,
    view: Option<usize>,
    criteria: &CriteriaArgs,
    json: bool,
    quiet: bool,
) -> Result<()> {
    if let Some(index) = view
        && !session.views().select(index)
    {
        return Err(StoredeskError::InvalidInput(format!(
            "No view at index {index} (have {})",
            session.views().len()
        )));
    }
    apply_criteria(session, criteria);

    let projection = session.load().await?;

    if json {
        let items: Vec<&Item> = projection.items().iter().map(AsRef::as_ref).collect();
        println!("{}", serde_json::to_string_pretty(&items)?);
        return Ok(());
    }

    if !quiet {
        let views = session.views();
        println!("{}", output::view_tabs(&views.views(), views.selected_index()));
        let chips = views.applied_filters();
        if !chips.is_empty() {
            println!("{}", output::filter_chips(&chips));
        }
        println!();
    }
    println!("{}", output::projection(&projection, quiet));
    Ok(())
}

fn handle_views_command(session: &Session, quiet: bool) {
    let views = session.views();
    for (index, view) in views.views().iter().enumerate() {
        if quiet {
            println!("{}", view.name);
        } else {
            println!("{index}: {view}");
        }
    }
}

/// Review choices for a generated draft
const REVIEW_CHOICES: [&str; 3] = ["Apply", "Edit", "Discard"];

async fn handle_generate_command(session: &Session, id: ItemId, yes: bool, quiet: bool) -> Result<()> {
    session.load().await?;
    if !session.select(id) {
        return Err(StoredeskError::InvalidInput(format!("Product {id} is not in the listing")));
    }

    if !quiet {
        println!("Generating description for product {id}...");
    }
    let generated = session.generate().await?;

    let edited = if yes {
        None
    } else {
        println!("{}", output::draft(&generated));
        let choice = Select::with_theme(&ColorfulTheme::default())
            .with_prompt("Use this description?")
            .items(&REVIEW_CHOICES)
            .default(0)
            .interact()?;

        match REVIEW_CHOICES[choice] {
            "Edit" => Editor::new().edit(&generated)?,
            "Discard" => {
                session.pipeline().discard()?;
                if !quiet {
                    println!("Discarded.");
                }
                return Ok(());
            }
            _ => None,
        }
    };

    match session.apply(edited).await {
        Ok(()) => {
            session.load().await?;
            if !quiet {
                println!("{} Description updated for product {id}", "✓".green());
            }
            Ok(())
        }
        Err(AnnotateError::Remote(err)) => {
            if let Some(draft) = session.pipeline().last_finished().and_then(|f| f.draft) {
                eprintln!("{}", output::draft(&draft));
            }
            Err(AnnotateError::Remote(err).into())
        }
        Err(err) => Err(err.into()),
    }
}

fn handle_config_command(mut config: StoredeskConfig, command: &ConfigCommands, quiet: bool) -> Result<()> {
    match command {
        ConfigCommands::Show => {
            let text = toml::to_string_pretty(&config)
                .map_err(|e| StoredeskError::InvalidInput(format!("Failed to render config: {e}")))?;
            print!("{text}");
        }
        ConfigCommands::Set { setting } => {
            let (key, value) = ConfigCommands::parse_setting(setting).ok_or_else(|| {
                StoredeskError::InvalidInput(format!("Invalid format '{setting}'. Use KEY=VALUE"))
            })?;
            config.set(key, value)?;
            config.save()?;
            if !quiet {
                println!("Set {key}");
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = StoredeskConfig::load_or_setup()?;
    init_logging(&config);

    let cli = Cli::parse_args();
    let quiet = cli.quiet;
    let command = cli.get_command();

    if let Commands::Config { command } = &command {
        return handle_config_command(config, command, quiet);
    }

    let session = Session::from_config(&config);
    match &command {
        Commands::List { view, criteria, json } => {
            handle_list_command(&session, *view, criteria, *json, quiet).await?;
        }
        Commands::Views => handle_views_command(&session, quiet),
        Commands::Generate { id, yes } => {
            handle_generate_command(&session, *id, *yes, quiet).await?;
        }
        Commands::Config { .. } => {}
    }

    Ok(())
}
