#![deny(clippy::all)]
mod args;
mod commands;
mod config;
mod printer;
mod utils;

use anyhow::{Context, Result};
use log::{debug, error, warn};
use std::{fs, io, path::PathBuf, process};
use structopt::{clap::Shell as ClapShell, StructOpt};
use tablebook_client::{Client, Config as ClientConfig, Session, DEFAULT_ENDPOINT};

use crate::{
    args::{Args, Command, Shell},
    commands::{auth, book, config as config_command, get},
    config::{ConfigLocation, ContextConfig},
    printer::Printer,
    utils::init_env_logger,
};

fn run(args: Args) -> Result<()> {
    let location = ConfigLocation::new(find_configuration(&args)?);
    let printer = Printer::new(args.output);

    match &args.command {
        Command::Config { config_args } => config_command::run(config_args, &location),
        Command::Completion { shell } => {
            let mut app = Args::clap();
            let clap_shell = match shell {
                Shell::Zsh => ClapShell::Zsh,
                Shell::Bash => ClapShell::Bash,
            };
            app.gen_completions_to("tb", clap_shell, &mut io::stdout());
            Ok(())
        }
        Command::Login(login_args) => {
            let (client, mut session) = connect(&args, &location)?;
            auth::login(login_args, &client, &mut session)
        }
        Command::Logout => {
            let (_, mut session) = connect(&args, &location)?;
            auth::logout(&mut session)
        }
        Command::Register(register_args) => {
            let (client, mut session) = connect(&args, &location)?;
            auth::register(register_args, &client, &mut session)
        }
        Command::Get { get_args } => {
            let (client, _) = connect(&args, &location)?;
            get::run(get_args, &client, &printer)
        }
        Command::Book(book_args) => {
            let (client, mut session) = connect(&args, &location)?;
            book::run(book_args, &client, &mut session, &printer)
        }
    }
}

/// Build the client for the selected context and open that context's session.
/// Tokens never cross contexts.
fn connect(args: &Args, location: &ConfigLocation) -> Result<(Client, Session)> {
    let cli_config = location.read()?;
    let selected = cli_config.select(args.context.as_deref())?;
    let client = client_from_args(args, selected.map(|(_, context)| context))?;

    let context_name = selected.map(|(name, _)| name);
    match context_name {
        Some(name) => debug!("Using the session of context `{}`.", name),
        None => debug!("No context selected, using the default session."),
    }
    Ok((client, location.open_session(context_name)?))
}

fn client_from_args(args: &Args, context: Option<&ContextConfig>) -> Result<Client> {
    let endpoint = args
        .endpoint
        .clone()
        .or_else(|| context.map(|context| context.endpoint.clone()))
        .unwrap_or_else(|| DEFAULT_ENDPOINT.clone());

    let accept_invalid_certificates = args
        .accept_invalid_certificates
        .or_else(|| context.map(|context| context.accept_invalid_certificates))
        .unwrap_or(false);

    if accept_invalid_certificates {
        warn!(concat!(
            "TLS certificate verification is disabled. ",
            "Do NOT use this over an insecure network."
        ));
    }

    let proxy = args
        .proxy
        .clone()
        .or_else(|| context.and_then(|context| context.proxy.clone()));

    Client::new(ClientConfig {
        endpoint,
        accept_invalid_certificates,
        proxy,
    })
    .context("Failed to initialise the HTTP client.")
}

fn find_configuration(args: &Args) -> Result<PathBuf> {
    let config_path = if let Some(config_path) = args.config.clone() {
        if !config_path.exists() {
            warn!(
                "Configuration file `{}` doesn't exist.",
                config_path.display()
            );
        }
        config_path
    } else {
        let mut config_path =
            dirs::config_dir().context("Could not get path to the user's config directory")?;
        config_path.push("tablebook");
        fs::create_dir_all(&config_path).with_context(|| {
            format!(
                "Could not create config directory {}",
                config_path.display()
            )
        })?;
        config_path.push("contexts.json");
        config_path
    };
    Ok(config_path)
}

fn main() {
    let args = Args::from_args();
    init_env_logger(args.verbose);

    if let Err(error) = run(args) {
        if let Some(client_error) = error
            .chain()
            .find_map(|cause| cause.downcast_ref::<tablebook_client::Error>())
        {
            error!("{}", client_error.category());
        }
        error!("An error occurred:");
        for cause in error.chain() {
            error!(" |- {cause}");
        }

        #[cfg(feature = "backtrace")]
        {
            error!("{}", error.backtrace());
        }

        process::exit(1);
    }
}
