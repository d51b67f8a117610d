//! Person records and the per-invocation id index.
//!
//! The JSON field names follow the seed dataset format:
//!
//! ```json
//! { "id": "3", "name": "Thomas Lancaster", "gender": "male", "dob": "1965-10-10",
//!   "father": "1", "mother": "2", "partner": ["4"] }
//! ```

use crate::error::{InvalidInput, Result};
use crate::layout::CoupleKey;
use crate::options::ReferencePolicy;
use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    #[default]
    #[serde(other)]
    Other,
}

impl Gender {
    pub fn symbol(self) -> Option<char> {
        match self {
            Gender::Male => Some('♂'),
            Gender::Female => Some('♀'),
            Gender::Other => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub gender: Gender,
    pub dob: NaiveDate,
    #[serde(default)]
    pub father: Option<String>,
    #[serde(default)]
    pub mother: Option<String>,
    /// Declared partners, in declaration order. Not required to be symmetric.
    #[serde(default, rename = "partner")]
    pub partners: Vec<String>,
}

impl Person {
    pub fn new(id: impl Into<String>, name: impl Into<String>, dob: NaiveDate) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            gender: Gender::Other,
            dob,
            father: None,
            mother: None,
            partners: Vec::new(),
        }
    }

    pub fn with_gender(mut self, gender: Gender) -> Self {
        self.gender = gender;
        self
    }

    pub fn with_father(mut self, father: impl Into<String>) -> Self {
        self.father = Some(father.into());
        self
    }

    pub fn with_mother(mut self, mother: impl Into<String>) -> Self {
        self.mother = Some(mother.into());
        self
    }

    pub fn with_partner(mut self, partner: impl Into<String>) -> Self {
        self.partners.push(partner.into());
        self
    }

    /// Display label: the name followed by the gender glyph, e.g. `Edward Lancaster (♂)`.
    pub fn label(&self) -> String {
        match self.gender.symbol() {
            Some(symbol) => format!("{} ({symbol})", self.name),
            None => self.name.clone(),
        }
    }

    pub fn is_founder(&self) -> bool {
        self.father.is_none() && self.mother.is_none()
    }

    pub fn declares_partner(&self, id: &str) -> bool {
        self.partners.iter().any(|p| p == id)
    }

    /// Every outgoing id reference: father, mother, then partners.
    pub fn references(&self) -> impl Iterator<Item = (Relation, &str)> + '_ {
        self.father
            .as_deref()
            .map(|id| (Relation::Father, id))
            .into_iter()
            .chain(self.mother.as_deref().map(|id| (Relation::Mother, id)))
            .chain(self.partners.iter().map(|id| (Relation::Partner, id.as_str())))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Relation {
    Father,
    Mother,
    Partner,
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Relation::Father => "father",
            Relation::Mother => "mother",
            Relation::Partner => "partner",
        })
    }
}

/// Parses a JSON array of person records.
pub fn people_from_json(text: &str) -> Result<Vec<Person>> {
    Ok(serde_json::from_str(text)?)
}

/// Id-indexed view over one input slice, built once per engine invocation.
///
/// Iteration follows input order.
#[derive(Debug, Clone)]
pub struct PersonIndex<'a> {
    people: IndexMap<&'a str, &'a Person>,
}

impl<'a> PersonIndex<'a> {
    pub fn build(people: &'a [Person]) -> Result<Self> {
        let mut index: IndexMap<&'a str, &'a Person> = IndexMap::with_capacity(people.len());
        for person in people {
            if index.insert(person.id.as_str(), person).is_some() {
                return Err(InvalidInput::DuplicatePerson {
                    id: person.id.clone(),
                }
                .into());
            }
        }
        Ok(Self { people: index })
    }

    pub fn len(&self) -> usize {
        self.people.len()
    }

    pub fn is_empty(&self) -> bool {
        self.people.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&'a Person> {
        self.people.get(id).copied()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.people.contains_key(id)
    }

    pub fn people(&self) -> impl Iterator<Item = &'a Person> + '_ {
        self.people.values().copied()
    }

    /// Father then mother, skipping references that do not resolve.
    pub fn parents(&self, person: &Person) -> impl Iterator<Item = &'a Person> + '_ {
        let father = person.father.as_deref().and_then(|id| self.get(id));
        let mother = person.mother.as_deref().and_then(|id| self.get(id));
        father.into_iter().chain(mother)
    }

    /// Both sides list each other. One-sided declarations never form a couple.
    pub fn is_couple(&self, a: &str, b: &str) -> bool {
        if a == b {
            return false;
        }
        match (self.get(a), self.get(b)) {
            (Some(a), Some(b)) => a.declares_partner(&b.id) && b.declares_partner(&a.id),
            _ => false,
        }
    }

    /// Every mutual pair in the record set, whatever generation rows the two end up on.
    pub fn couples(&self) -> BTreeSet<CoupleKey> {
        self.people()
            .flat_map(|person| {
                person
                    .partners
                    .iter()
                    .filter(move |partner| self.is_couple(&person.id, partner))
                    .map(move |partner| CoupleKey::new(&person.id, partner))
            })
            .collect()
    }

    /// Applies `policy` to father/mother/partner ids that are not in the record set.
    pub fn check_references(&self, policy: ReferencePolicy) -> Result<()> {
        for person in self.people() {
            for (relation, target) in person.references() {
                if self.contains(target) {
                    continue;
                }
                match policy {
                    ReferencePolicy::Strict => {
                        return Err(InvalidInput::UnknownReference {
                            person: person.id.clone(),
                            relation,
                            target: target.to_string(),
                        }
                        .into());
                    }
                    ReferencePolicy::Lenient => {
                        tracing::warn!(
                            person = %person.id,
                            %relation,
                            %target,
                            "ignoring dangling reference"
                        );
                    }
                }
            }
        }
        Ok(())
    }
}
