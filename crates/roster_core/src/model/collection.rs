//! Named partitions of the document store.

use std::fmt::{Display, Formatter};

/// Named partition holding all records of one resource type.
///
/// Collections are compared by name, so two handles built from the same name
/// address the same records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Collection(&'static str);

impl Collection {
    /// Collection backing the students resource.
    pub const STUDENTS: Collection = Collection("student");
    /// Collection backing the trainees resource.
    pub const TRAINEES: Collection = Collection("Trainee");

    /// Creates a collection handle for `name`.
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    /// Returns the storage name of this collection.
    pub fn name(&self) -> &'static str {
        self.0
    }
}

impl Display for Collection {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.0)
    }
}
