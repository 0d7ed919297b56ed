use serde::{Deserialize, Serialize};

#[derive(Clone, Serialize)]
pub struct Credentials<'request> {
    pub account: &'request str,
    pub password: &'request str,
}

#[derive(Clone, Serialize)]
pub struct NewUser<'request> {
    pub name: &'request str,
    pub surname: &'request str,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub patronymic: Option<&'request str>,

    pub account: &'request str,
    pub password: &'request str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AccessTokenResponse {
    pub access: String,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RegisterResponse {
    // Some deployments log the new user in straight away.
    #[serde(default)]
    pub access: Option<String>,
}
