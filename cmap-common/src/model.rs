//! Analysis result model
//!
//! Entity shapes exchanged with the community-detection service, plus the
//! transient edit buffer used while one person's interests are being edited.

use crate::{Error, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Person name → ordered interests, in the order the service sent them
pub type PeopleData = IndexMap<String, Vec<String>>;

/// A person and their interests
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    /// Unique name (the person's key)
    pub name: String,
    /// Ordered interests
    pub interests: Vec<String>,
}

/// An interest shared by members of one community
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SharedCategory {
    /// Interest name
    pub category: String,
    /// Members of the community holding this interest
    pub people: u32,
    /// Share of the community holding this interest (0.0-100.0)
    pub percentage: f64,
}

/// A group of people detected by the service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Community {
    /// Zero-based index assigned by the service
    pub id: u32,
    /// Member names
    pub members: Vec<String>,
    /// Interests shared inside the community, most common first
    pub shared_categories: Vec<SharedCategory>,
}

impl Community {
    /// 1-based number shown to users
    pub fn display_number(&self) -> u32 {
        self.id + 1
    }
}

/// Full grouping returned by analyze and update calls
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub communities: Vec<Community>,
    pub total_people: u32,
    pub total_communities: u32,
    /// Present when the service exposes per-person interests (gates editing)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub people_data: Option<PeopleData>,
}

impl AnalysisResult {
    /// Check the structural invariants of a service payload
    ///
    /// - `total_communities` matches the number of communities
    /// - every percentage lies in 0-100 and no category counts more people
    ///   than the community has
    /// - when `people_data` is present, every member has an entry
    pub fn validate(&self) -> Result<()> {
        if self.total_communities as usize != self.communities.len() {
            return Err(Error::Schema(format!(
                "total_communities is {} but {} communities were returned",
                self.total_communities,
                self.communities.len()
            )));
        }

        for community in &self.communities {
            for shared in &community.shared_categories {
                if !shared.percentage.is_finite() || !(0.0..=100.0).contains(&shared.percentage) {
                    return Err(Error::Schema(format!(
                        "community {}: percentage {} for '{}' is outside 0-100",
                        community.id, shared.percentage, shared.category
                    )));
                }
                if shared.people as usize > community.members.len() {
                    return Err(Error::Schema(format!(
                        "community {}: '{}' counts {} people but community has {} members",
                        community.id,
                        shared.category,
                        shared.people,
                        community.members.len()
                    )));
                }
            }

            if let Some(people) = &self.people_data {
                if let Some(missing) = community.members.iter().find(|m| !people.contains_key(*m)) {
                    return Err(Error::Schema(format!(
                        "community {}: member '{}' has no people_data entry",
                        community.id, missing
                    )));
                }
            }
        }

        Ok(())
    }

    /// Whether interest editing is available for this result
    pub fn is_editable(&self) -> bool {
        self.people_data.is_some()
    }

    /// Committed interests for a person, if the result carries people data
    pub fn interests_of(&self, name: &str) -> Option<&[String]> {
        self.people_data
            .as_ref()
            .and_then(|people| people.get(name))
            .map(Vec::as_slice)
    }

    /// All people in service order (empty when people data is absent)
    pub fn people(&self) -> Vec<Person> {
        self.people_data
            .iter()
            .flatten()
            .map(|(name, interests)| Person {
                name: name.clone(),
                interests: interests.clone(),
            })
            .collect()
    }

    /// Community a person belongs to
    pub fn community_of(&self, name: &str) -> Option<&Community> {
        self.communities
            .iter()
            .find(|c| c.members.iter().any(|m| m == name))
    }
}

/// Working copy of one person's interests while an edit session is open
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditBuffer {
    pub person_name: String,
    pub working_interests: Vec<String>,
    /// Draft text of the "add interest" field
    pub pending_new_text: String,
}

impl EditBuffer {
    /// Open a buffer holding a copy of the committed interests
    pub fn new(person_name: impl Into<String>, committed: &[String]) -> Self {
        Self {
            person_name: person_name.into(),
            working_interests: committed.to_vec(),
            pending_new_text: String::new(),
        }
    }

    /// Remove the interest at `index`; out-of-bounds is a no-op
    pub fn remove_interest(&mut self, index: usize) -> bool {
        if index < self.working_interests.len() {
            self.working_interests.remove(index);
            true
        } else {
            false
        }
    }

    /// Whether `add_interest(text)` would change the list
    ///
    /// Duplicates are detected by exact match after trimming.
    pub fn accepts(&self, text: &str) -> bool {
        let trimmed = text.trim();
        !trimmed.is_empty() && !self.working_interests.iter().any(|i| i == trimmed)
    }

    /// Append a trimmed interest unless it is empty or already present
    pub fn add_interest(&mut self, text: &str) -> bool {
        if !self.accepts(text) {
            return false;
        }
        self.working_interests.push(text.trim().to_string());
        true
    }

    /// Replace the interest at `index` with trimmed text
    ///
    /// The result may be empty; blanks are dropped at save time.
    pub fn update_interest(&mut self, index: usize, text: &str) -> bool {
        match self.working_interests.get_mut(index) {
            Some(slot) => {
                *slot = text.trim().to_string();
                true
            }
            None => false,
        }
    }

    pub fn set_pending_text(&mut self, text: impl Into<String>) {
        self.pending_new_text = text.into();
    }

    /// Add the draft text; the draft is cleared only when it was added
    pub fn add_pending_interest(&mut self) -> bool {
        let text = std::mem::take(&mut self.pending_new_text);
        if self.add_interest(&text) {
            true
        } else {
            self.pending_new_text = text;
            false
        }
    }

    /// Working interests with blank entries removed, as sent on save
    pub fn filtered_interests(&self) -> Vec<String> {
        self.working_interests
            .iter()
            .filter(|i| !i.trim().is_empty())
            .cloned()
            .collect()
    }

    /// Whether the working copy differs from the committed interests
    pub fn is_dirty(&self, committed: &[String]) -> bool {
        self.working_interests != committed
    }
}
