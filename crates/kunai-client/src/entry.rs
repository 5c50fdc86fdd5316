//! Listing entries.

use std::fmt;

use chrono::{DateTime, FixedOffset};
use kunai_rfc::rfc::dav::{Multistatus, ResourceType, Response};

use crate::path::{EntryPath, EntryType, split_entry};

/// A resource discovered by a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Parent path, ending in `/`.
    pub directory: String,
    /// Last path segment, without slashes.
    pub name: String,
    /// Path relative to the configured base path; directories keep their trailing `/`.
    pub path: String,
    pub entry_type: EntryType,
    pub resource_type: Option<ResourceType>,
    pub content_length: Option<u64>,
    pub last_modified: Option<DateTime<FixedOffset>>,
    /// The href as sent, when the server answered with an absolute URI.
    pub absolute_uri: Option<String>,
}

impl Entry {
    /// Builds an entry from a multistatus response, or `None` if the
    /// response describes the queried collection itself.
    #[must_use]
    pub fn from_response(response: &Response, base_path: &str, query_root: &str) -> Option<Self> {
        let EntryPath {
            directory,
            name,
            path,
            entry_type,
        } = split_entry(&response.href, base_path, query_root)?;

        Some(Self {
            directory,
            name,
            path,
            entry_type,
            resource_type: response.resource_type(),
            content_length: response.content_length(),
            last_modified: response.last_modified(),
            absolute_uri: response
                .href
                .is_absolute_uri()
                .then(|| response.href.to_string()),
        })
    }

    #[must_use]
    pub fn is_directory(&self) -> bool {
        self.entry_type == EntryType::Directory
    }

    #[must_use]
    pub fn is_file(&self) -> bool {
        self.entry_type == EntryType::File
    }
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)
    }
}

/// The entries of one listing, converted as they are consumed.
///
/// A listing is finite and single-use; listing again needs a new request.
#[derive(Debug)]
pub struct Listing {
    responses: std::vec::IntoIter<Response>,
    base_path: String,
    query_root: String,
}

impl Listing {
    pub(crate) fn new(multistatus: Multistatus, base_path: String, query_root: String) -> Self {
        Self {
            responses: multistatus.into_iter(),
            base_path,
            query_root,
        }
    }
}

impl Iterator for Listing {
    type Item = Entry;

    fn next(&mut self) -> Option<Self::Item> {
        self.responses
            .by_ref()
            .find_map(|response| Entry::from_response(&response, &self.base_path, &self.query_root))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, self.responses.size_hint().1)
    }
}
