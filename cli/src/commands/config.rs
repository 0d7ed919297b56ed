use anyhow::{anyhow, Result};
use colored::Colorize;
use log::{info, warn};
use prettytable::{cell, row};
use reqwest::Url;
use structopt::StructOpt;
use tablebook_client::DEFAULT_ENDPOINT;

use crate::{
    config::{ConfigLocation, ContextConfig, TablebookConfig},
    printer::new_table,
    utils::read_from_stdin,
};

#[derive(Debug, StructOpt)]
pub enum ConfigArgs {
    #[structopt(name = "add")]
    /// Add a gateway context, or change an existing one
    AddContext {
        #[structopt(long = "name", short = "n")]
        /// Name of the context. Prompted for if not given.
        name: Option<String>,

        #[structopt(long = "endpoint", short = "e")]
        /// Gateway endpoint of the context. Prompted for if not given.
        endpoint: Option<Url>,

        #[structopt(long = "accept-invalid-certificates", short = "k")]
        /// Accept invalid TLS certificates from this gateway
        accept_invalid_certificates: bool,

        #[structopt(long = "proxy")]
        /// HTTP proxy for this gateway. Keeps the existing proxy if not given.
        proxy: Option<Url>,
    },

    #[structopt(name = "current")]
    /// Print the name of the current context
    CurrentContext,

    #[structopt(name = "delete")]
    /// Delete contexts together with their saved sessions
    DeleteContext {
        /// Names of the contexts to delete
        names: Vec<String>,
    },

    #[structopt(name = "ls")]
    /// List contexts and whether each one is logged in
    ListContexts,

    #[structopt(name = "use")]
    /// Make a context the current one
    UseContext {
        /// Name of the context
        name: String,
    },
}

pub fn run(args: &ConfigArgs, location: &ConfigLocation) -> Result<()> {
    let mut config = location.read()?;
    match args {
        ConfigArgs::ListContexts => list_contexts(&config, location),
        ConfigArgs::CurrentContext => {
            match config.current_context_name() {
                Some(name) => println!("{name}"),
                None => info!("There is no current context."),
            }
            Ok(())
        }
        ConfigArgs::UseContext { name } => {
            if !config.use_context(name) {
                return Err(anyhow!("Unknown context `{}`.", name));
            }
            location.write(&config)?;
            if location.is_logged_in(Some(name)) {
                info!("Switched to context `{}`.", name);
            } else {
                info!("Switched to context `{}`, use `tb login` to log in.", name);
            }
            Ok(())
        }
        ConfigArgs::DeleteContext { names } => {
            for name in names {
                if config.remove_context(name).is_none() {
                    warn!("Unknown context `{}`, skipping it.", name);
                    continue;
                }
                location.write(&config)?;
                if location.remove_session(Some(name))? {
                    info!("Deleted context `{}` and logged it out.", name);
                } else {
                    info!("Deleted context `{}`.", name);
                }
            }
            Ok(())
        }
        ConfigArgs::AddContext {
            name,
            endpoint,
            accept_invalid_certificates,
            proxy,
        } => {
            let name = match name {
                Some(name) => name.clone(),
                None => prompt_name()?,
            };
            let existing = config.context(&name).cloned();
            let endpoint = match endpoint {
                Some(endpoint) => endpoint.clone(),
                None => prompt_endpoint(existing.as_ref())?,
            };
            let context = ContextConfig {
                endpoint,
                accept_invalid_certificates: *accept_invalid_certificates,
                proxy: proxy
                    .clone()
                    .or_else(|| existing.and_then(|context| context.proxy)),
            };
            save_context(&mut config, location, &name, context)
        }
    }
}

fn save_context(
    config: &mut TablebookConfig,
    location: &ConfigLocation,
    name: &str,
    context: ContextConfig,
) -> Result<()> {
    let endpoint = context.endpoint.clone();
    let previous = config.upsert_context(name, context);
    location.write(config)?;

    match previous {
        Some(previous) if previous.endpoint != endpoint => {
            // A token issued by one gateway means nothing to another.
            if location.remove_session(Some(name))? {
                warn!(
                    "Context `{}` now points to `{}`, its session was logged out.",
                    name, endpoint
                );
            }
            info!("Updated context `{}`.", name);
        }
        Some(_) => info!("Updated context `{}`.", name),
        None => info!("Added context `{}` for `{}`.", name, endpoint),
    }
    if config.current_context_name() == Some(name) {
        info!("Current context is `{}`.", name);
    }
    Ok(())
}

fn list_contexts(config: &TablebookConfig, location: &ConfigLocation) -> Result<()> {
    if config.is_empty() {
        info!("No contexts, use `tb config add` to add one.");
        return Ok(());
    }

    let current = config.current_context_name();
    let mut table = new_table();
    table.set_titles(row![bFg => "", "Context", "Endpoint", "Session", "Insecure", "Proxy"]);
    for (name, context) in config.contexts() {
        let is_current = current == Some(name);
        table.add_row(row![
            if is_current { "->" } else { "" },
            if is_current {
                name.bold()
            } else {
                name.normal()
            },
            context.endpoint,
            if location.is_logged_in(Some(name)) {
                "logged in".green()
            } else {
                "logged out".dimmed()
            },
            if context.accept_invalid_certificates {
                "yes".yellow()
            } else {
                "no".normal()
            },
            context
                .proxy
                .as_ref()
                .map(Url::to_string)
                .unwrap_or_default()
        ]);
    }
    table.printstd();
    Ok(())
}

fn prompt_name() -> Result<String> {
    loop {
        let name = read_from_stdin("Context name", None)?;
        if !name.is_empty() {
            return Ok(name);
        }
        warn!("The context name cannot be empty.");
    }
}

fn prompt_endpoint(existing: Option<&ContextConfig>) -> Result<Url> {
    let default = existing
        .map(|context| &context.endpoint)
        .unwrap_or(&*DEFAULT_ENDPOINT);
    loop {
        match Url::parse(&read_from_stdin("Endpoint", Some(default.as_str()))?) {
            Ok(endpoint) => return Ok(endpoint),
            Err(error) => warn!("Invalid endpoint: {}", error),
        }
    }
}
