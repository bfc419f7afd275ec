//! Contact records, result sinks and query modes

use crate::foundation::math::Vec3;

/// One shape-versus-primitive intersection found at a leaf
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    /// Leaf node that held the primitive
    pub node: usize,
    /// Primitive (triangle) id within the model
    pub primitive: usize,
    /// Witness point on the primitive, in world space
    pub point: Vec3,
}

/// Receives contacts in traversal order
pub trait ContactSink {
    /// Append a contact
    fn push_contact(&mut self, contact: Contact);

    /// Number of contacts held so far
    fn contact_count(&self) -> usize;
}

impl ContactSink for Vec<Contact> {
    fn push_contact(&mut self, contact: Contact) {
        self.push(contact);
    }

    fn contact_count(&self) -> usize {
        self.len()
    }
}

/// How many contacts a collision query needs before it may stop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QueryMode {
    /// Visit every candidate leaf and report the full contact set
    #[default]
    Exhaustive,
    /// Stop at the first contact (boolean collision verdict)
    FirstContact,
    /// Stop once this many contacts have been reported; a limit of zero
    /// behaves like [`FirstContact`](Self::FirstContact)
    MaxContacts(usize),
}

impl QueryMode {
    /// Mode for an optional contact limit; a limit of zero is treated as one
    pub fn from_limit(limit: Option<usize>) -> Self {
        match limit {
            None => Self::Exhaustive,
            Some(0 | 1) => Self::FirstContact,
            Some(n) => Self::MaxContacts(n),
        }
    }

    /// Contact limit, `None` when unbounded. Never zero.
    pub const fn contact_limit(self) -> Option<usize> {
        match self {
            Self::Exhaustive => None,
            Self::FirstContact => Some(1),
            Self::MaxContacts(n) => Some(if n == 0 { 1 } else { n }),
        }
    }

    /// Whether `found` contacts satisfy the mode
    pub fn is_satisfied(self, found: usize) -> bool {
        self.contact_limit().is_some_and(|limit| found >= limit)
    }
}
