use anyhow::{Context, Result};
use log::info;
use structopt::StructOpt;
use tablebook_client::{Client, Credentials, NewUser, Session};

use crate::utils::{read_from_stdin, read_password};

#[derive(Debug, StructOpt)]
pub struct LoginArgs {
    #[structopt(short = "a", long = "account")]
    /// Account email. Prompted for if not given.
    account: Option<String>,

    #[structopt(long = "password")]
    /// Account password. Prompted for if not given.
    password: Option<String>,
}

#[derive(Debug, StructOpt)]
pub struct RegisterArgs {
    #[structopt(long = "name")]
    /// First name
    name: String,

    #[structopt(long = "surname")]
    /// Family name
    surname: String,

    #[structopt(long = "patronymic")]
    /// Patronymic, if any
    patronymic: Option<String>,

    #[structopt(short = "a", long = "account")]
    /// Account email. Prompted for if not given.
    account: Option<String>,

    #[structopt(long = "password")]
    /// Account password. Prompted for, twice, if not given.
    password: Option<String>,
}

pub fn login(args: &LoginArgs, client: &Client, session: &mut Session) -> Result<()> {
    let LoginArgs { account, password } = args;
    let account = match account {
        Some(account) => account.clone(),
        None => read_from_stdin("Account (email)", None)?,
    };
    let password = match password {
        Some(password) => password.clone(),
        None => read_password(false)?,
    };

    client
        .login(
            session,
            &Credentials {
                account: &account,
                password: &password,
            },
        )
        .context("Operation to log in has failed.")?;
    info!("Logged in as `{}`.", account);
    Ok(())
}

pub fn logout(session: &mut Session) -> Result<()> {
    let was_logged_in = session.is_logged_in();
    session.clear().context("Could not forget the access token.")?;
    if was_logged_in {
        info!("Logged out.");
    } else {
        info!("Not logged in.");
    }
    Ok(())
}

pub fn register(args: &RegisterArgs, client: &Client, session: &mut Session) -> Result<()> {
    let RegisterArgs {
        name,
        surname,
        patronymic,
        account,
        password,
    } = args;
    let account = match account {
        Some(account) => account.clone(),
        None => read_from_stdin("Account (email)", None)?,
    };
    let password = match password {
        Some(password) => password.clone(),
        None => read_password(true)?,
    };

    let logged_in = client
        .register(
            session,
            &NewUser {
                name,
                surname,
                patronymic: patronymic.as_deref(),
                account: &account,
                password: &password,
            },
        )
        .context("Operation to register has failed.")?;

    if logged_in {
        info!("Registered and logged in as `{}`.", account);
    } else {
        info!("Registered `{}`, use `tb login` to log in.", account);
    }
    Ok(())
}
