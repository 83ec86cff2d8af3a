use std::env;

use mysql::{Opts, OptsBuilder};
use serde::{Deserialize, Serialize};

use super::adapter::MysqlAdapter;
use crate::facade::DbFacade;

/// Character set applied at connect time when none is configured.
pub const DEFAULT_CHARSET: &str = "utf8";

/// Connection options for a `MySQL` server.
///
/// Every connection field is optional. An unset field falls back to the
/// matching `SQL_FACADE_*` environment variable, then to the client
/// library's own default.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MysqlOptions {
    pub host: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub database: Option<String>,
    pub port: Option<u16>,
    pub socket: Option<String>,
    /// Character set, applied with `SET NAMES` right after connecting.
    pub charset: String,
}

impl Default for MysqlOptions {
    fn default() -> Self {
        Self {
            host: None,
            user: None,
            password: None,
            database: None,
            port: None,
            socket: None,
            charset: DEFAULT_CHARSET.to_string(),
        }
    }
}

fn env_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.is_empty())
}

impl MysqlOptions {
    /// Resolve unset fields against the environment and produce native
    /// client options.
    pub(crate) fn to_opts(&self) -> Opts {
        let host = self.host.clone().or_else(|| env_var("SQL_FACADE_HOST"));
        let user = self.user.clone().or_else(|| env_var("SQL_FACADE_USER"));
        let password = self
            .password
            .clone()
            .or_else(|| env_var("SQL_FACADE_PASSWORD"));
        let database = self
            .database
            .clone()
            .or_else(|| env_var("SQL_FACADE_DATABASE"));
        let port = self
            .port
            .or_else(|| env_var("SQL_FACADE_PORT").and_then(|p| p.parse().ok()));
        let socket = self.socket.clone().or_else(|| env_var("SQL_FACADE_SOCKET"));

        let mut builder = OptsBuilder::new()
            .ip_or_hostname(host)
            .user(user)
            .pass(password)
            .db_name(database)
            .socket(socket);
        if let Some(port) = port {
            builder = builder.tcp_port(port);
        }
        Opts::from(builder)
    }
}

/// Fluent builder for `MySQL` options.
#[derive(Debug, Clone, Default)]
pub struct MysqlOptionsBuilder {
    opts: MysqlOptions,
}

impl MysqlOptionsBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.opts.host = Some(host.into());
        self
    }

    #[must_use]
    pub fn user(mut self, user: impl Into<String>) -> Self {
        self.opts.user = Some(user.into());
        self
    }

    #[must_use]
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.opts.password = Some(password.into());
        self
    }

    #[must_use]
    pub fn database(mut self, database: impl Into<String>) -> Self {
        self.opts.database = Some(database.into());
        self
    }

    #[must_use]
    pub fn port(mut self, port: u16) -> Self {
        self.opts.port = Some(port);
        self
    }

    #[must_use]
    pub fn socket(mut self, socket: impl Into<String>) -> Self {
        self.opts.socket = Some(socket.into());
        self
    }

    #[must_use]
    pub fn charset(mut self, charset: impl Into<String>) -> Self {
        self.opts.charset = charset.into();
        self
    }

    #[must_use]
    pub fn finish(self) -> MysqlOptions {
        self.opts
    }

    /// Finish and wrap the options in a ready-to-use facade.
    #[must_use]
    pub fn build(self) -> DbFacade {
        DbFacade::new_mysql(self.finish())
    }
}

impl DbFacade {
    #[must_use]
    pub fn mysql_builder() -> MysqlOptionsBuilder {
        MysqlOptionsBuilder::new()
    }

    /// Create a facade over a `MySQL` connection.
    ///
    /// The connection opens lazily on first use; connect failures surface
    /// as `ConnectionError` from the first operation that needs the server.
    #[must_use]
    pub fn new_mysql(opts: MysqlOptions) -> Self {
        DbFacade::new(MysqlAdapter::new(opts))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_charset_is_utf8() {
        assert_eq!(MysqlOptions::default().charset, "utf8");
    }

    #[test]
    fn builder_collects_every_field() {
        let opts = MysqlOptionsBuilder::new()
            .host("db.internal")
            .user("app")
            .password("secret")
            .database("app_db")
            .port(3307)
            .socket("/tmp/mysql.sock")
            .charset("utf8mb4")
            .finish();

        assert_eq!(opts.host.as_deref(), Some("db.internal"));
        assert_eq!(opts.user.as_deref(), Some("app"));
        assert_eq!(opts.password.as_deref(), Some("secret"));
        assert_eq!(opts.database.as_deref(), Some("app_db"));
        assert_eq!(opts.port, Some(3307));
        assert_eq!(opts.socket.as_deref(), Some("/tmp/mysql.sock"));
        assert_eq!(opts.charset, "utf8mb4");
    }
}
