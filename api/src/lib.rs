#![deny(clippy::all)]
mod error;
pub mod interval;
pub mod resources;
pub mod session;

use http::Method;
use log::{debug, info, warn};
use once_cell::sync::Lazy;
use reqwest::{
    blocking::{Client as HttpClient, Response as HttpResponse},
    header::{self, HeaderMap, HeaderValue},
    IntoUrl, Proxy, StatusCode,
};
use serde::{Deserialize, Serialize};
use std::{fmt::Display, time::Duration};
use url::Url;

use crate::{
    interval::window_fits,
    resources::{
        auth::{AccessTokenResponse, RegisterResponse},
        free_time::to_display_ranges,
        into_result,
        table::{GetTablesQuery, GetTablesResponse},
    },
};

pub use crate::{
    error::{Error, ErrorCategory, Result},
    interval::{display_to_wire, range_contains, wire_to_display, DisplayRange, TimeRange},
    resources::{
        auth::{Credentials, NewUser},
        free_time::FreeTime,
        reservation::{NewReservation, Reservation},
        table::{Id as TableId, RestaurantId, Shape as TableShape, Table},
    },
    session::{
        FileStore, KeyValueStore, MemoryStore, Session, AUTH_TOKEN_KEY, REFRESH_COOKIE_KEY,
    },
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token(pub String);

pub struct Config {
    pub endpoint: Url,
    pub accept_invalid_certificates: bool,
    pub proxy: Option<Url>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            endpoint: DEFAULT_ENDPOINT.clone(),
            accept_invalid_certificates: false,
            proxy: None,
        }
    }
}

#[derive(Debug)]
pub struct Client {
    endpoints: Endpoints,
    http_client: HttpClient,
}

impl Client {
    /// Create a new API client.
    pub fn new(config: Config) -> Result<Client> {
        let http_client = build_http_client(&config)?;
        let endpoints = Endpoints::new(config.endpoint)?;
        Ok(Client {
            endpoints,
            http_client,
        })
    }

    /// Get the base url for the client
    pub fn base_url(&self) -> &Url {
        &self.endpoints.base
    }

    /// List the tables of a restaurant.
    pub fn get_tables(&self, restaurant_id: RestaurantId) -> Result<Vec<Table>> {
        Ok(self
            .get_query::<_, _, GetTablesResponse>(
                self.endpoints.tables.clone(),
                Some(&GetTablesQuery { restaurant_id }),
            )?
            .tables)
    }

    /// List the free segments of a table as reported by the gateway.
    pub fn get_free_times(&self, table_id: TableId) -> Result<Vec<FreeTime>> {
        self.get(self.endpoints.free_times(table_id)?)
    }

    /// List the free segments of a table as display ranges, numbered in order.
    pub fn get_free_ranges(&self, table_id: TableId) -> Result<Vec<DisplayRange>> {
        to_display_ranges(&self.get_free_times(table_id)?)
    }

    /// Log in and keep the issued access token and refresh cookie in the
    /// session.
    pub fn login(&self, session: &mut Session, credentials: &Credentials<'_>) -> Result<()> {
        let (response, refresh_cookie): (AccessTokenResponse, _) =
            self.post_keeping_cookie(&self.endpoints.login, credentials)?;
        session.set_token(Some(Token(response.access)))?;
        session.set_refresh_cookie(refresh_cookie)
    }

    /// Register a new user. Returns whether the gateway also logged the user in.
    pub fn register(&self, session: &mut Session, user: &NewUser<'_>) -> Result<bool> {
        let (response, refresh_cookie): (RegisterResponse, _) =
            self.post_keeping_cookie(&self.endpoints.register, user)?;
        match response.access {
            Some(access) => {
                session.set_token(Some(Token(access)))?;
                session.set_refresh_cookie(refresh_cookie)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Exchange the session's refresh cookie for a new access token and store
    /// it. A rotated cookie replaces the stored one.
    pub fn refresh_token(&self, session: &mut Session) -> Result<Token> {
        debug!("Attempting GET `{}`", self.endpoints.refresh);
        let mut request = self.http_client.get(self.endpoints.refresh.clone());
        if let Some(cookie) = session.refresh_cookie() {
            request = request.header(
                header::COOKIE,
                HeaderValue::from_str(cookie).map_err(|_| Error::BadRefreshCookie)?,
            );
        } else {
            debug!("No refresh cookie saved, refreshing without one.");
        }
        let http_response = request
            .send()
            .map_err(|source| Error::ReqwestError {
                source,
                message: "Token refresh failed.".to_owned(),
            })?;

        let status = http_response.status();
        if status != StatusCode::OK {
            warn!("Failed to refresh token: {}", status);
            return Err(Error::TokenRefreshFailed {
                status_code: status,
            });
        }

        let rotated_cookie = refresh_cookie_from(&http_response);
        let response = http_response
            .json::<AccessTokenResponse>()
            .map_err(Error::BadJsonResponse)?;
        let token = Token(response.access);
        session.set_token(Some(token.clone()))?;
        if rotated_cookie.is_some() {
            session.set_refresh_cookie(rotated_cookie)?;
        }
        Ok(token)
    }

    /// Create a reservation.
    pub fn create_reservation(
        &self,
        session: &mut Session,
        reservation: &NewReservation,
    ) -> Result<Reservation> {
        self.authenticated_request(
            session,
            &Method::POST,
            &self.endpoints.new_reservation,
            &Some(reservation),
        )
    }

    /// Book a table for the requested window.
    ///
    /// A window that does not end after it starts is rejected outright. The
    /// window is then checked against the table's free segments before the
    /// reservation is sent. A table without any listed segment is free.
    pub fn book_table(
        &self,
        session: &mut Session,
        table_id: TableId,
        requested: &DisplayRange,
    ) -> Result<Reservation> {
        let window = display_to_wire(requested)?;
        let start = window.start.ok_or_else(|| Error::InvalidDateFormat {
            value: String::new(),
        })?;
        if window.end.map_or(false, |end| end <= start) {
            return Err(Error::InvertedWindow {
                requested: requested.to_string(),
            });
        }
        if !session.is_logged_in() {
            return Err(Error::NotLoggedIn);
        }

        let free_ranges = self.get_free_ranges(table_id)?;
        if !free_ranges.is_empty() && !window_fits(start, window.end, &free_ranges) {
            return Err(Error::SlotUnavailable {
                table_id: table_id.0,
                requested: requested.to_string(),
            });
        }

        self.create_reservation(
            session,
            &NewReservation {
                reservation_time_from: start,
                reservation_time_to: window.end,
                table_id,
            },
        )
    }

    fn get<LocationT, SuccessT>(&self, url: LocationT) -> Result<SuccessT>
    where
        LocationT: IntoUrl + Display + Clone,
        for<'de> SuccessT: Deserialize<'de>,
    {
        self.get_query::<_, (), _>(url, None)
    }

    fn get_query<LocationT, QueryT, SuccessT>(
        &self,
        url: LocationT,
        query: Option<&QueryT>,
    ) -> Result<SuccessT>
    where
        LocationT: IntoUrl + Display + Clone,
        QueryT: Serialize,
        for<'de> SuccessT: Deserialize<'de>,
    {
        debug!("Attempting GET `{}`", url);
        into_result(self.raw_request(&Method::GET, &url, &None::<()>, &query, None)?)
    }

    /// POST without a token, also returning the refresh cookie the gateway
    /// set on the response, if any.
    fn post_keeping_cookie<RequestT, SuccessT>(
        &self,
        url: &Url,
        request: RequestT,
    ) -> Result<(SuccessT, Option<String>)>
    where
        RequestT: Serialize,
        for<'de> SuccessT: Deserialize<'de>,
    {
        debug!("Attempting POST `{}`", url);
        let http_response =
            self.raw_request(&Method::POST, url, &Some(request), &None::<()>, None)?;
        let refresh_cookie = refresh_cookie_from(&http_response);
        Ok((into_result(http_response)?, refresh_cookie))
    }

    /// Send a request with the session's access token. A 401 refreshes the
    /// token once and re-sends the request once; the second response is final.
    fn authenticated_request<LocationT, RequestT, SuccessT>(
        &self,
        session: &mut Session,
        method: &Method,
        url: &LocationT,
        body: &Option<RequestT>,
    ) -> Result<SuccessT>
    where
        LocationT: IntoUrl + Display + Clone,
        RequestT: Serialize,
        for<'de> SuccessT: Deserialize<'de>,
    {
        let token = session.token().cloned().ok_or(Error::NotLoggedIn)?;
        debug!("Attempting {} `{}`", method, url);
        let http_response = self.raw_request(method, url, body, &None::<()>, Some(&token))?;
        if http_response.status() != StatusCode::UNAUTHORIZED {
            return into_result(http_response);
        }

        info!("Access token was rejected, refreshing it.");
        let token = self.refresh_token(session)?;
        debug!("Retrying {} `{}`", method, url);
        into_result(self.raw_request(method, url, body, &None::<()>, Some(&token))?)
    }

    fn raw_request<LocationT, RequestT, QueryT>(
        &self,
        method: &Method,
        url: &LocationT,
        body: &Option<RequestT>,
        query: &Option<QueryT>,
        token: Option<&Token>,
    ) -> Result<HttpResponse>
    where
        LocationT: IntoUrl + Display + Clone,
        RequestT: Serialize,
        QueryT: Serialize,
    {
        let request = self.http_client.request(method.clone(), url.clone());
        let request = match token {
            Some(token) => request.headers(build_auth_headers(token)?),
            None => request,
        };
        let request = match &query {
            Some(query) => request.query(query),
            None => request,
        };
        let request = match &body {
            Some(body) => request.json(body),
            None => request,
        };

        request.send().map_err(|source| Error::ReqwestError {
            source,
            message: format!("{method} operation failed."),
        })
    }
}

#[derive(Debug)]
struct Endpoints {
    base: Url,
    tables: Url,
    new_reservation: Url,
    login: Url,
    register: Url,
    refresh: Url,
}

fn construct_endpoint(base: &Url, segments: &[&str]) -> Result<Url> {
    let mut endpoint = base.clone();

    let mut endpoint_segments = endpoint
        .path_segments_mut()
        .map_err(|_| Error::BadEndpoint {
            endpoint: base.clone(),
        })?;

    endpoint_segments.pop_if_empty();
    for segment in segments {
        endpoint_segments.push(segment);
    }

    drop(endpoint_segments);

    Ok(endpoint)
}

impl Endpoints {
    pub fn new(base: Url) -> Result<Self> {
        let tables = construct_endpoint(&base, &["tables"])?;
        let new_reservation = construct_endpoint(&base, &["reservations", "new-reservation"])?;
        let login = construct_endpoint(&base, &["auth", "login"])?;
        let register = construct_endpoint(&base, &["auth", "register"])?;
        let refresh = construct_endpoint(&base, &["auth", "refresh"])?;

        Ok(Endpoints {
            base,
            tables,
            new_reservation,
            login,
            register,
            refresh,
        })
    }

    fn free_times(&self, table_id: TableId) -> Result<Url> {
        construct_endpoint(
            &self.base,
            &["tables", &table_id.0.to_string(), "free-times"],
        )
    }
}

const DEFAULT_HTTP_TIMEOUT_SECONDS: u64 = 120;

fn build_http_client(config: &Config) -> Result<HttpClient> {
    let mut builder = HttpClient::builder()
        .gzip(true)
        .danger_accept_invalid_certs(config.accept_invalid_certificates)
        .timeout(Some(Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECONDS)));

    if let Some(proxy) = config.proxy.clone() {
        builder = builder.proxy(Proxy::all(proxy).map_err(Error::BuildHttpClient)?);
    }
    builder.build().map_err(Error::BuildHttpClient)
}

/// The `name=value` pairs of every cookie a response sets, joined the way a
/// `Cookie` request header expects them.
fn refresh_cookie_from(response: &HttpResponse) -> Option<String> {
    let pairs: Vec<&str> = response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .filter_map(|value| value.split(';').next())
        .map(str::trim)
        .filter(|pair| pair.contains('='))
        .collect();
    if pairs.is_empty() {
        None
    } else {
        Some(pairs.join("; "))
    }
}

fn build_auth_headers(token: &Token) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", &token.0)).map_err(|_| Error::BadToken {
            token: token.0.clone(),
        })?,
    );
    Ok(headers)
}

pub static DEFAULT_ENDPOINT: Lazy<Url> = Lazy::new(|| {
    Url::parse("http://localhost/api/web-gateway").expect("Default URL is well-formed")
});
