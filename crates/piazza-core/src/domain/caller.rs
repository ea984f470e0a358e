use uuid::Uuid;

/// The verified identity of whoever is making a request.
///
/// Produced by the transport layer after token verification and passed
/// explicitly into every operation that needs to know who is acting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub id: Uuid,
    pub name: String,
}

impl Caller {
    pub fn new(id: Uuid, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}
