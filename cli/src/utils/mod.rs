pub mod io;

pub use self::io::{init_env_logger, read_from_stdin, read_password};
