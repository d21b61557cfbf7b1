use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Prefix of every element key, kept for compatibility with links and
/// element ids produced by earlier versions of the widget.
const KEY_PREFIX: &str = "git-widget";
const KEY_SEPARATOR: char = '|';

/// One tracked repository, identified by owner and name.
///
/// Equality is structural on `(owner, name)` and case-sensitive, which is also
/// the membership rule of [`crate::store::TrackedSet`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RepositoryRef {
    owner: String,
    name: String,
}

impl RepositoryRef {
    /// Build a reference from already separated parts.
    ///
    /// Neither part may be empty or contain `/`, so distinct references never
    /// share a canonical string.
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Result<Self> {
        let owner = owner.into();
        let name = name.into();
        let valid = |part: &str| !part.is_empty() && !part.contains('/');
        if !valid(&owner) || !valid(&name) {
            return Err(Error::MalformedRepositoryString(format!("{}/{}", owner, name)));
        }
        Ok(Self { owner, name })
    }

    /// Parse the canonical `owner/name` form.
    ///
    /// Surrounding whitespace is ignored. Anything other than exactly one `/`
    /// with a non-empty part on each side is rejected.
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        let mut parts = trimmed.split('/');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(owner), Some(name), None) if !owner.is_empty() && !name.is_empty() => {
                Ok(Self {
                    owner: owner.to_string(),
                    name: name.to_string(),
                })
            }
            _ => Err(Error::MalformedRepositoryString(input.to_string())),
        }
    }

    /// Decode a key produced by [`RepositoryRef::key`].
    pub fn from_key(key: &str) -> Result<Self> {
        let malformed = || Error::MalformedKey(key.to_string());

        let mut parts = key.split(KEY_SEPARATOR);
        let (prefix, owner, name) = match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(prefix), Some(owner), Some(name), None) => (prefix, owner, name),
            _ => return Err(malformed()),
        };
        if prefix != KEY_PREFIX {
            return Err(malformed());
        }

        let owner = urlencoding::decode(owner).map_err(|_| malformed())?;
        let name = urlencoding::decode(name).map_err(|_| malformed())?;
        Self::new(owner.into_owned(), name.into_owned()).map_err(|_| malformed())
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The `owner/name` form used for persistence and dedup.
    pub fn canonical_string(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }

    /// Element identifier: `git-widget|<owner>|<name>` with both parts
    /// percent-encoded, so separators inside either part survive a round trip.
    pub fn key(&self) -> String {
        format!(
            "{prefix}{sep}{owner}{sep}{name}",
            prefix = KEY_PREFIX,
            sep = KEY_SEPARATOR,
            owner = urlencoding::encode(&self.owner),
            name = urlencoding::encode(&self.name),
        )
    }
}

impl fmt::Display for RepositoryRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

impl FromStr for RepositoryRef {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
