use crate::model::Relation;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A person is reachable from themself through father/mother references.
    ///
    /// `cycle` lists the ids along the parent chain and repeats the first id at the end.
    #[error("cyclic ancestry: {}", .cycle.join(" -> "))]
    CyclicAncestry { cycle: Vec<String> },

    #[error(transparent)]
    InvalidInput(#[from] InvalidInput),

    #[error("invalid dataset JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Caller-side contract violations. None of these leave a partially built chart behind.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidInput {
    #[error("duplicate person id: {id}")]
    DuplicatePerson { id: String },

    #[error("person {person} references unknown {relation} {target}")]
    UnknownReference {
        person: String,
        relation: Relation,
        target: String,
    },

    #[error("no generation level for person {id}")]
    MissingGeneration { id: String },

    #[error("no chart node for handle {handle}")]
    UnknownNode { handle: String },
}
