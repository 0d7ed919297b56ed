//! Authentication state.
//!
//! The access token is held in memory by a [`Session`] and mirrored to a
//! [`KeyValueStore`] under [`AUTH_TOKEN_KEY`], so it survives restarts. The
//! gateway's refresh cookie is kept the same way under [`REFRESH_COOKIE_KEY`],
//! since a later process has to present it to obtain a new token. Writes go to
//! memory first and then to the store; the last write wins.

use log::{debug, warn};
use std::{
    collections::{BTreeMap, HashMap},
    fs::{self, File, OpenOptions},
    io::{BufReader, BufWriter},
    path::{Path, PathBuf},
};

use crate::{
    error::{Error, Result},
    Token,
};

/// Key the access token is stored under.
pub const AUTH_TOKEN_KEY: &str = "authToken";

/// Key the refresh cookie (`name=value` pairs, `; ` separated) is stored under.
pub const REFRESH_COOKIE_KEY: &str = "refreshCookie";

/// A persistent string-to-string store.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&mut self, key: &str, value: &str) -> Result<()>;

    fn remove(&mut self, key: &str) -> Result<()>;
}

#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.values.remove(key);
        Ok(())
    }
}

/// A store backed by a JSON object on disk. A missing file is an empty store.
///
/// Values are kept in cleartext. On Unix the file is created readable by its
/// owner only.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        debug!("Reading token store at `{}`", self.path.display());
        let file = File::open(&self.path).map_err(|source| Error::TokenStore {
            message: format!("could not open `{}`", self.path.display()),
            source: Box::new(source),
        })?;
        serde_json::from_reader(BufReader::new(file)).map_err(|source| Error::TokenStore {
            message: format!("could not parse `{}`", self.path.display()),
            source: Box::new(source),
        })
    }

    fn write_all(&self, values: &BTreeMap<String, String>) -> Result<()> {
        let store_error = |message: &str, source: std::io::Error| Error::TokenStore {
            message: format!("{} `{}`", message, self.path.display()),
            source: Box::new(source),
        };

        if let Some(parent) = self.path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .map_err(|source| store_error("could not create the directory of", source))?;
        }
        if !self.path.exists() {
            warn!(
                "Saving the session in cleartext at `{}`, keep this file private.",
                self.path.display()
            );
        }

        debug!("Writing token store at `{}`", self.path.display());
        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let file = options
            .open(&self.path)
            .map_err(|source| store_error("could not create", source))?;
        serde_json::to_writer_pretty(BufWriter::new(file), values).map_err(|source| {
            Error::TokenStore {
                message: format!("could not write `{}`", self.path.display()),
                source: Box::new(source),
            }
        })
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_all()?.remove(key))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut values = self.read_all()?;
        values.insert(key.to_owned(), value.to_owned());
        self.write_all(&values)
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        let mut values = self.read_all()?;
        if values.remove(key).is_some() {
            self.write_all(&values)?;
        }
        Ok(())
    }
}

pub struct Session {
    token: Option<Token>,
    refresh_cookie: Option<String>,
    store: Box<dyn KeyValueStore>,
}

impl Session {
    /// Create a session, picking up any token and refresh cookie left in the
    /// store.
    pub fn load(store: impl KeyValueStore + 'static) -> Result<Self> {
        let token = store.get(AUTH_TOKEN_KEY)?.map(Token);
        let refresh_cookie = store.get(REFRESH_COOKIE_KEY)?;
        Ok(Self {
            token,
            refresh_cookie,
            store: Box::new(store),
        })
    }

    pub fn token(&self) -> Option<&Token> {
        self.token.as_ref()
    }

    pub fn is_logged_in(&self) -> bool {
        self.token.is_some()
    }

    pub fn set_token(&mut self, token: Option<Token>) -> Result<()> {
        self.token = token;
        match &self.token {
            Some(token) => self.store.set(AUTH_TOKEN_KEY, &token.0),
            None => self.store.remove(AUTH_TOKEN_KEY),
        }
    }

    pub fn refresh_cookie(&self) -> Option<&str> {
        self.refresh_cookie.as_deref()
    }

    pub fn set_refresh_cookie(&mut self, cookie: Option<String>) -> Result<()> {
        self.refresh_cookie = cookie;
        match &self.refresh_cookie {
            Some(cookie) => self.store.set(REFRESH_COOKIE_KEY, cookie),
            None => self.store.remove(REFRESH_COOKIE_KEY),
        }
    }

    /// Forget both the access token and the refresh cookie.
    pub fn clear(&mut self) -> Result<()> {
        self.set_token(None)?;
        self.set_refresh_cookie(None)
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("Session")
            .field("logged_in", &self.is_logged_in())
            .field("can_refresh", &self.refresh_cookie.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use uuid::Uuid;

    fn temp_store_path() -> PathBuf {
        env::temp_dir().join(format!("tablebook-session-{}.json", Uuid::new_v4()))
    }

    #[test]
    fn test_memory_session() {
        let mut store = MemoryStore::new();
        store.set(AUTH_TOKEN_KEY, "abc").unwrap();

        let mut session = Session::load(store).unwrap();
        assert_eq!(session.token(), Some(&Token("abc".to_owned())));

        session.set_token(Some(Token("def".to_owned()))).unwrap();
        assert_eq!(session.token(), Some(&Token("def".to_owned())));

        session.clear().unwrap();
        assert!(!session.is_logged_in());
    }

    #[test]
    fn test_file_store_persists_token() {
        let path = temp_store_path();
        assert_eq!(FileStore::new(&path).get(AUTH_TOKEN_KEY).unwrap(), None);

        let mut session = Session::load(FileStore::new(&path)).unwrap();
        assert!(!session.is_logged_in());
        session.set_token(Some(Token("first".to_owned()))).unwrap();
        session.set_token(Some(Token("second".to_owned()))).unwrap();

        let reloaded = Session::load(FileStore::new(&path)).unwrap();
        assert_eq!(reloaded.token(), Some(&Token("second".to_owned())));

        session.clear().unwrap();
        let reloaded = Session::load(FileStore::new(&path)).unwrap();
        assert_eq!(reloaded.token(), None);

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_file_store_keeps_other_keys() {
        let path = temp_store_path();
        let mut store = FileStore::new(&path);
        store.set("theme", "dark").unwrap();
        store.set(AUTH_TOKEN_KEY, "abc").unwrap();
        store.remove(AUTH_TOKEN_KEY).unwrap();

        assert_eq!(store.get("theme").unwrap().as_deref(), Some("dark"));
        assert_eq!(store.get(AUTH_TOKEN_KEY).unwrap(), None);

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_file_store_persists_refresh_cookie() {
        let path = temp_store_path();
        let mut session = Session::load(FileStore::new(&path)).unwrap();
        session.set_token(Some(Token("abc".to_owned()))).unwrap();
        session
            .set_refresh_cookie(Some("refresh=r1".to_owned()))
            .unwrap();

        let mut reloaded = Session::load(FileStore::new(&path)).unwrap();
        assert_eq!(reloaded.refresh_cookie(), Some("refresh=r1"));

        reloaded.clear().unwrap();
        let reloaded = Session::load(FileStore::new(&path)).unwrap();
        assert!(!reloaded.is_logged_in());
        assert_eq!(reloaded.refresh_cookie(), None);

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_file_store_creates_missing_directories() {
        let dir = env::temp_dir().join(format!("tablebook-sessions-{}", Uuid::new_v4()));
        let path = dir.join("nested").join("staging.json");
        let mut store = FileStore::new(&path);
        store.set(AUTH_TOKEN_KEY, "abc").unwrap();
        assert_eq!(store.get(AUTH_TOKEN_KEY).unwrap().as_deref(), Some("abc"));
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn test_file_store_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let path = temp_store_path();
        FileStore::new(&path).set(AUTH_TOKEN_KEY, "abc").unwrap();
        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_corrupt_file_store() {
        let path = temp_store_path();
        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(
            Session::load(FileStore::new(&path)),
            Err(Error::TokenStore { .. })
        ));
        std::fs::remove_file(&path).unwrap();
    }
}
