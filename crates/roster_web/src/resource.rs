//! Route and label descriptors for each served collection.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use roster_core::Collection;

/// Bytes escaped when a record id is placed in a path segment. RFC 3986
/// unreserved characters stay literal.
const ID_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Binds one collection to its URL segment and display labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resource {
    /// Path segment under `/` and `/api/`.
    pub segment: &'static str,
    pub collection: Collection,
    pub singular: &'static str,
    pub plural: &'static str,
}

pub const STUDENTS: Resource = Resource {
    segment: "students",
    collection: Collection::STUDENTS,
    singular: "Student",
    plural: "Students",
};

pub const TRAINEES: Resource = Resource {
    segment: "trainees",
    collection: Collection::TRAINEES,
    singular: "Trainee",
    plural: "Trainees",
};

/// Every resource the server mounts, in routing order.
pub const RESOURCES: [Resource; 2] = [STUDENTS, TRAINEES];

impl Resource {
    /// Path of the HTML list page.
    pub fn html_base(&self) -> String {
        format!("/{}", self.segment)
    }

    /// Path of the HTML view page for `id`, with `id` percent-encoded.
    pub fn record_path(&self, id: &str) -> String {
        format!("/{}/{}", self.segment, utf8_percent_encode(id, ID_SEGMENT))
    }
}
