//! Presentation-ready figures derived from the result store

use cmap_common::{AnalysisResult, Community};
use serde::Serialize;

/// Headline numbers for a result
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryView {
    pub total_people: u32,
    pub total_communities: u32,
    /// Rounded people per community; `None` when there are no communities
    pub average_members: Option<u32>,
}

impl SummaryView {
    pub fn from_result(result: &AnalysisResult) -> Self {
        let average_members = (result.total_communities > 0).then(|| {
            (f64::from(result.total_people) / f64::from(result.total_communities)).round() as u32
        });

        Self {
            total_people: result.total_people,
            total_communities: result.total_communities,
            average_members,
        }
    }
}

/// One community, numbered from 1
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommunityCard {
    pub number: u32,
    pub title: String,
    pub member_count: usize,
    pub shared_count: usize,
    pub members: Vec<MemberEntry>,
    pub categories: Vec<CategoryEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemberEntry {
    pub name: String,
    /// Offer the edit affordance (result carries people data)
    pub editable: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryEntry {
    pub category: String,
    pub people: u32,
    pub percentage: f64,
    /// Percentage with one decimal, e.g. `66.7%`
    pub percentage_label: String,
}

impl CommunityCard {
    pub fn new(community: &Community, editable: bool) -> Self {
        let number = community.display_number();
        Self {
            number,
            title: format!("Community {}", number),
            member_count: community.members.len(),
            shared_count: community.shared_categories.len(),
            members: community
                .members
                .iter()
                .map(|name| MemberEntry {
                    name: name.clone(),
                    editable,
                })
                .collect(),
            categories: community
                .shared_categories
                .iter()
                .map(|shared| CategoryEntry {
                    category: shared.category.clone(),
                    people: shared.people,
                    percentage: shared.percentage,
                    percentage_label: format!("{:.1}%", shared.percentage),
                })
                .collect(),
        }
    }
}

/// Cards for every community in service order
pub fn community_cards(result: &AnalysisResult) -> Vec<CommunityCard> {
    let editable = result.is_editable();
    result
        .communities
        .iter()
        .map(|community| CommunityCard::new(community, editable))
        .collect()
}

/// Row of the people directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PersonEntry {
    pub name: String,
    pub interest_count: usize,
    /// 1-based number of the person's community, if any
    pub community: Option<u32>,
}

/// People in service order; empty when the result carries no people data
pub fn people_directory(result: &AnalysisResult) -> Vec<PersonEntry> {
    result
        .people()
        .into_iter()
        .map(|person| PersonEntry {
            community: result
                .community_of(&person.name)
                .map(Community::display_number),
            interest_count: person.interests.len(),
            name: person.name,
        })
        .collect()
}
