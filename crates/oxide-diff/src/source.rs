//! Where a schema comes from.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::ExtractError;

const MYSQL_SCHEME: &str = "mysql://";
const MARIADB_SCHEME: &str = "mariadb://";

/// A named database source: a live MySQL server or a JSON snapshot file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// A MySQL database reached through a `mysql://` or `mariadb://` URL.
    MySql {
        /// Connection URL with a `mysql://` scheme, credentials included.
        url: String,
        /// Database (schema) name taken from the URL path.
        database: String,
    },
    /// A snapshot previously written by `oxide-diff snapshot`.
    Snapshot(PathBuf),
}

impl Source {
    /// Returns the source with any password removed, for logs and errors.
    #[must_use]
    pub fn redacted(&self) -> String {
        match self {
            Self::MySql { url, .. } => redact(url),
            Self::Snapshot(path) => path.display().to_string(),
        }
    }
}

/// Replaces the user-info part of a URL with `***`.
fn redact(url: &str) -> String {
    let Some((scheme, rest)) = url.split_once("://") else {
        return url.to_string();
    };
    let authority_end = rest.find('/').unwrap_or(rest.len());
    match rest[..authority_end].rfind('@') {
        Some(at) => format!("{scheme}://***{}", &rest[at..]),
        None => url.to_string(),
    }
}

/// Strips a MySQL-compatible scheme, returning the rest of the URL.
fn strip_mysql_scheme(s: &str) -> Option<&str> {
    s.strip_prefix(MYSQL_SCHEME)
        .or_else(|| s.strip_prefix(MARIADB_SCHEME))
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.redacted())
    }
}

impl FromStr for Source {
    type Err = ExtractError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason| ExtractError::InvalidSource {
            input: redact(s),
            reason,
        };

        if let Some(rest) = strip_mysql_scheme(s) {
            let (_, path) = rest
                .split_once('/')
                .ok_or_else(|| invalid("missing database name"))?;
            let database = path.split(['?', '#']).next().unwrap_or_default();
            if database.is_empty() || database.contains('/') {
                return Err(invalid("the URL path must name exactly one database"));
            }
            return Ok(Self::MySql {
                url: format!("{MYSQL_SCHEME}{rest}"),
                database: database.to_string(),
            });
        }

        if s.contains("://") {
            return Err(invalid("only mysql:// and mariadb:// URLs are supported"));
        }
        if s.is_empty() {
            return Err(invalid("empty source"));
        }
        Ok(Self::Snapshot(PathBuf::from(s)))
    }
}
