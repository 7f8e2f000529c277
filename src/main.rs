use std::{path::PathBuf, process::ExitCode};

use anyhow::Error;
use clap::Parser;
use tracing::{debug, error};

use crate::{
    configuration::{get_config_path, get_log_dir, initialize_configuration},
    utils::Cancelled,
    webapp::{
        create::{CreateContext, CreateOutcome, CreateRequest, create_webapp},
        error::WebAppError,
        prompt::{InquirePrompt, NoPrompt, Prompt},
        registry::{list_and_remove, list_entries, print_listing},
    },
};

mod configuration;
mod logging;
mod utils;
mod webapp;

#[derive(Parser)]
#[command(
    version,
    about = "Create browser web app launchers for your application menu",
    long_about = None
)]
struct Cli {
    /// Name of the web app as shown in the menu
    #[arg(short, long)]
    name: Option<String>,

    /// URL the web app opens (https:// is added when missing)
    #[arg(short, long)]
    url: Option<String>,

    /// URL of an icon to download
    #[arg(short, long)]
    icon: Option<String>,

    /// Browser command or path to launch the web app with
    #[arg(short, long)]
    browser: Option<String>,

    /// Fetch the site's favicon when no icon URL is given
    #[arg(short, long)]
    auto_icon: bool,

    /// List web apps and choose one to remove
    #[arg(long, conflicts_with = "list")]
    remove: bool,

    /// List web apps and exit
    #[arg(short, long)]
    list: bool,

    /// Never prompt: use the first installed browser and fetch the favicon
    #[arg(short, long)]
    yes: bool,

    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Restore the default configuration file before running
    #[arg(long)]
    reset_config: bool,

    #[arg(short, long, action = clap::ArgAction::Count)]
    debug: u8,
}

fn exit_code_for(err: &Error) -> u8 {
    if err.downcast_ref::<Cancelled>().is_some() {
        return 0;
    }
    err.downcast_ref::<WebAppError>()
        .map(WebAppError::exit_code)
        .unwrap_or(2)
}

fn run(cli: &Cli) -> Result<(), Error> {
    let config_path = match &cli.config {
        Some(path) => path.clone(),
        None => get_config_path().ok_or(Error::msg("Failed to determine config path"))?,
    };
    let config = initialize_configuration(&config_path, cli.reset_config)?;
    if cli.reset_config {
        println!("Configuration reset to default at {}", config_path.display());
    }
    let layout = config.layout()?;
    debug!(config = %config_path.display(), ?layout, "configuration loaded");

    let mut prompt: Box<dyn Prompt> = if !cli.yes && atty::is(atty::Stream::Stdin) {
        Box::new(InquirePrompt)
    } else {
        Box::new(NoPrompt)
    };

    if cli.list {
        print_listing(&list_entries(&layout.applications_dir)?);
        return Ok(());
    }

    if cli.remove {
        list_and_remove(&layout.applications_dir, &layout.icons_dir, prompt.as_mut())?;
        return Ok(());
    }

    if prompt.is_interactive() {
        println!("=== Web App Creator ===");
        println!("Creates a standalone web app shortcut in your application menu.\n");
    }

    let request = CreateRequest {
        name: cli.name.clone(),
        url: cli.url.clone(),
        icon: cli.icon.clone(),
        browser: cli.browser.clone(),
        auto_icon: cli.auto_icon || cli.yes,
        silent: cli.yes,
    };
    let search_path = std::env::var_os("PATH");
    let context = CreateContext {
        layout: &layout,
        icon_settings: &config.icon,
        search_path: search_path.as_ref(),
    };

    match create_webapp(&request, &context, prompt.as_mut())? {
        CreateOutcome::Created { launcher, .. } => {
            println!("✅ Web app created");
            println!("📁 Launcher written to: {}", launcher.display());
            println!("You should now be able to find it in your application menu.");
        }
        CreateOutcome::Aborted => println!("ℹ️  No changes made."),
    }

    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let _log_guard = logging::init_logging(cli.debug, get_log_dir().as_deref());

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let code = exit_code_for(&err);
            if code == 0 {
                println!("ℹ️  {}", err);
            } else {
                error!(error = ?err, "run failed");
                eprintln!("Error: {:#}", err);
            }
            ExitCode::from(code)
        }
    }
}
