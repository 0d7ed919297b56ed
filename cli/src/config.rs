//! The contexts file and the per-context session files next to it.
//!
//! ```text
//! <config dir>/tablebook/contexts.json
//! <config dir>/tablebook/session.json            # no context selected
//! <config dir>/tablebook/sessions/<context>.json # one per context
//! ```

use anyhow::{anyhow, Context, Result};
use log::debug;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    fs,
    path::PathBuf,
};
use tablebook_client::{FileStore, KeyValueStore, Session, AUTH_TOKEN_KEY};

const DEFAULT_SESSION_FILE_NAME: &str = "session.json";
const SESSIONS_DIR_NAME: &str = "sessions";

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct TablebookConfig {
    #[serde(default)]
    current_context: Option<String>,
    #[serde(default)]
    contexts: BTreeMap<String, ContextConfig>,
}

/// How to reach one gateway deployment.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ContextConfig {
    pub endpoint: Url,
    #[serde(default)]
    pub accept_invalid_certificates: bool,
    #[serde(default)]
    pub proxy: Option<Url>,
}

impl TablebookConfig {
    pub fn is_empty(&self) -> bool {
        self.contexts.is_empty()
    }

    /// Contexts in name order.
    pub fn contexts(&self) -> impl Iterator<Item = (&str, &ContextConfig)> {
        self.contexts
            .iter()
            .map(|(name, context)| (name.as_str(), context))
    }

    pub fn context(&self, name: &str) -> Option<&ContextConfig> {
        self.contexts.get(name)
    }

    /// Insert or replace a context, returning the one it replaced. The first
    /// context ever added becomes the current one.
    pub fn upsert_context(&mut self, name: &str, context: ContextConfig) -> Option<ContextConfig> {
        let previous = self.contexts.insert(name.to_owned(), context);
        if self.current_context.is_none() && self.contexts.len() == 1 {
            self.current_context = Some(name.to_owned());
        }
        previous
    }

    pub fn remove_context(&mut self, name: &str) -> Option<ContextConfig> {
        let removed = self.contexts.remove(name)?;
        if self.current_context.as_deref() == Some(name) {
            self.current_context = None;
        }
        Some(removed)
    }

    pub fn current_context_name(&self) -> Option<&str> {
        self.current_context
            .as_deref()
            .filter(|name| self.contexts.contains_key(*name))
    }

    pub fn use_context(&mut self, name: &str) -> bool {
        if !self.contexts.contains_key(name) {
            return false;
        }
        self.current_context = Some(name.to_owned());
        true
    }

    /// The context a command runs against: the one named on the command line,
    /// else the current one, else none at all.
    pub fn select<'a>(
        &'a self,
        requested: Option<&'a str>,
    ) -> Result<Option<(&'a str, &'a ContextConfig)>> {
        match requested {
            Some(name) => self
                .context(name)
                .map(|context| Some((name, context)))
                .ok_or_else(|| anyhow!("Unknown context `{}`.", name)),
            None => Ok(self
                .current_context_name()
                .and_then(|name| Some((name, self.context(name)?)))),
        }
    }
}

/// Where the contexts file lives, and with it every session file.
#[derive(Debug, Clone)]
pub struct ConfigLocation {
    contexts_path: PathBuf,
}

impl ConfigLocation {
    pub fn new(contexts_path: PathBuf) -> Self {
        Self { contexts_path }
    }

    pub fn read(&self) -> Result<TablebookConfig> {
        let path = &self.contexts_path;
        if !path.exists() {
            return Ok(TablebookConfig::default());
        }
        debug!("Reading config file at `{}`", path.display());
        let contents = fs::read(path)
            .with_context(|| format!("Could not read config file `{}`", path.display()))?;
        serde_json::from_slice(&contents)
            .with_context(|| format!("Could not parse config file `{}`", path.display()))
    }

    pub fn write(&self, config: &TablebookConfig) -> Result<()> {
        let path = &self.contexts_path;
        debug!("Writing config file at `{}`", path.display());
        let contents =
            serde_json::to_vec_pretty(config).context("Could not serialise configuration")?;
        fs::write(path, contents)
            .with_context(|| format!("Could not write config file `{}`", path.display()))
    }

    /// The session file for a context. Context names are free text, so anything
    /// outside `[A-Za-z0-9_-]` is replaced before it becomes a file name.
    pub fn session_path(&self, context: Option<&str>) -> PathBuf {
        match context {
            None => self.contexts_path.with_file_name(DEFAULT_SESSION_FILE_NAME),
            Some(name) => {
                let file_name: String = name
                    .chars()
                    .map(|c| {
                        if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                            c
                        } else {
                            '_'
                        }
                    })
                    .collect();
                self.contexts_path
                    .with_file_name(SESSIONS_DIR_NAME)
                    .join(format!("{file_name}.json"))
            }
        }
    }

    pub fn open_session(&self, context: Option<&str>) -> Result<Session> {
        let path = self.session_path(context);
        Session::load(FileStore::new(&path))
            .with_context(|| format!("Could not load the session from `{}`", path.display()))
    }

    /// Whether a context has a saved access token, without loading a session.
    pub fn is_logged_in(&self, context: Option<&str>) -> bool {
        FileStore::new(self.session_path(context))
            .get(AUTH_TOKEN_KEY)
            .map_or(false, |token| token.is_some())
    }

    /// Delete a context's session file. Returns whether there was one.
    pub fn remove_session(&self, context: Option<&str>) -> Result<bool> {
        let path = self.session_path(context);
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_file(&path)
            .with_context(|| format!("Could not remove session file `{}`", path.display()))?;
        Ok(true)
    }
}
