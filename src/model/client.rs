//! Client record

use std::fmt;

/// Surrogate identifier assigned by the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClientId(u64);

impl ClientId {
    /// First id handed out by an empty store
    pub const FIRST: ClientId = ClientId(1);

    pub fn new(value: u64) -> Self {
        ClientId(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }

    /// The id following this one, `None` once the id space is used up
    pub fn next(&self) -> Option<Self> {
        self.0.checked_add(1).map(ClientId)
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A client as supplied by the caller, before the store assigns an id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewClient {
    pub cpf: String,
    pub name: String,
    pub age: i32,
}

impl NewClient {
    pub fn new(cpf: impl Into<String>, name: impl Into<String>, age: i32) -> Self {
        NewClient {
            cpf: cpf.into(),
            name: name.into(),
            age,
        }
    }
}

/// A persisted client
///
/// Only the store constructs these, so holding one means the id was assigned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Client {
    id: ClientId,
    cpf: String,
    name: String,
    age: i32,
}

impl Client {
    pub(crate) fn new(id: ClientId, cpf: String, name: String, age: i32) -> Self {
        Client { id, cpf, name, age }
    }

    pub fn id(&self) -> ClientId {
        self.id
    }

    pub fn cpf(&self) -> &str {
        &self.cpf
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn age(&self) -> i32 {
        self.age
    }

    /// Whether this record carries the same business data as `new`
    pub fn matches(&self, new: &NewClient) -> bool {
        self.cpf == new.cpf && self.name == new.name && self.age == new.age
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_sequence() {
        assert_eq!(ClientId::FIRST.value(), 1);
        assert_eq!(ClientId::FIRST.next(), Some(ClientId::new(2)));
        assert_eq!(ClientId::new(u64::MAX).next(), None);
        assert!(ClientId::new(3) > ClientId::new(2));
    }

    #[test]
    fn test_matches_ignores_id() {
        let new = NewClient::new("111", "A", 20);
        let client = Client::new(ClientId::new(9), "111".into(), "A".into(), 20);
        assert!(client.matches(&new));
        assert!(!client.matches(&NewClient::new("111", "B", 20)));
    }
}
