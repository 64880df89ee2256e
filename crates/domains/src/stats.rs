//! # Aggregation
//!
//! Summary statistics for the admin dashboard. Every function is pure over
//! a snapshot and recomputed from scratch whenever the snapshot changes.

use std::collections::HashMap;

use serde::Serialize;

use crate::models::{ActorId, Category, Complaint, ComplaintStatus};

/// Per-status counts plus the grand total.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusTotals {
    pub pending: usize,
    pub in_progress: usize,
    pub solved: usize,
    pub total: usize,
}

pub fn totals(complaints: &[Complaint]) -> StatusTotals {
    complaints
        .iter()
        .fold(StatusTotals::default(), |mut acc, c| {
            match c.status() {
                ComplaintStatus::Pending => acc.pending += 1,
                ComplaintStatus::InProgress => acc.in_progress += 1,
                ComplaintStatus::Solved => acc.solved += 1,
            }
            acc.total += 1;
            acc
        })
}

/// Percentage of complaints that are Solved, rounded to one decimal.
/// `0.0` for an empty collection.
pub fn resolution_rate(complaints: &[Complaint]) -> f64 {
    rate_from(&totals(complaints))
}

fn rate_from(totals: &StatusTotals) -> f64 {
    if totals.total == 0 {
        return 0.0;
    }
    let pct = totals.solved as f64 / totals.total as f64 * 100.0;
    (pct * 10.0).round() / 10.0
}

/// Category counts in order of first occurrence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CategoryBreakdown(Vec<(Category, usize)>);

impl CategoryBreakdown {
    pub fn entries(&self) -> &[(Category, usize)] {
        &self.0
    }

    pub fn get(&self, category: Category) -> usize {
        self.0
            .iter()
            .find(|(c, _)| *c == category)
            .map_or(0, |(_, n)| *n)
    }

    pub fn labels(&self) -> Vec<&'static str> {
        self.0.iter().map(|(c, _)| c.label()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

pub fn category_breakdown(complaints: &[Complaint]) -> CategoryBreakdown {
    let mut entries: Vec<(Category, usize)> = Vec::new();
    for complaint in complaints {
        match entries.iter_mut().find(|(c, _)| *c == complaint.category()) {
            Some((_, n)) => *n += 1,
            None => entries.push((complaint.category(), 1)),
        }
    }
    CategoryBreakdown(entries)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopComplainer {
    pub author_id: ActorId,
    pub display_name: String,
    pub count: usize,
}

/// The actor with the most complaints.
///
/// Ties go to the actor whose first complaint comes earliest in `complaints`.
pub fn top_complainer(complaints: &[Complaint]) -> Option<TopComplainer> {
    // first-seen order of authors, with their running counts
    let mut order: Vec<(ActorId, &str)> = Vec::new();
    let mut counts: HashMap<ActorId, usize> = HashMap::new();
    for c in complaints {
        let n = counts.entry(c.author_id()).or_insert(0);
        if *n == 0 {
            order.push((c.author_id(), c.author_name()));
        }
        *n += 1;
    }

    let mut best: Option<TopComplainer> = None;
    for (author_id, name) in order {
        let count = counts.get(&author_id).copied().unwrap_or(0);
        if best.as_ref().map_or(true, |b| count > b.count) {
            best = Some(TopComplainer {
                author_id,
                display_name: name.to_owned(),
                count,
            });
        }
    }
    best
}

/// Everything the admin header and summary cards show.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSummary {
    pub totals: StatusTotals,
    pub resolution_rate: f64,
    pub categories: CategoryBreakdown,
    pub top_complainer: Option<TopComplainer>,
}

pub fn summarize(complaints: &[Complaint]) -> DashboardSummary {
    let totals = totals(complaints);
    DashboardSummary {
        resolution_rate: rate_from(&totals),
        totals,
        categories: category_breakdown(complaints),
        top_complainer: top_complainer(complaints),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::transition;
    use crate::models::{Actor, Role, Submission};
    use chrono::Utc;

    fn filed(author: &Actor, category: &str) -> Complaint {
        let valid = Submission::new("Some title", "Some description", category)
            .validate()
            .unwrap();
        Complaint::submitted(author, valid, Utc::now())
    }

    fn solved(author: &Actor) -> Complaint {
        let c = filed(author, "Other");
        let c = transition(&c, ComplaintStatus::InProgress, Role::Admin).unwrap();
        transition(&c, ComplaintStatus::Solved, Role::Admin).unwrap()
    }

    #[test]
    fn empty_collection() {
        assert_eq!(totals(&[]), StatusTotals::default());
        assert_eq!(resolution_rate(&[]), 0.0);
        assert!(category_breakdown(&[]).is_empty());
        assert_eq!(top_complainer(&[]), None);
    }

    #[test]
    fn three_of_ten_solved_is_thirty_percent() {
        let a = Actor::new("A", Role::Student);
        let mut cs: Vec<Complaint> = (0..7).map(|_| filed(&a, "Hostel")).collect();
        cs.extend((0..3).map(|_| solved(&a)));
        assert_eq!(resolution_rate(&cs), 30.0);
        let t = totals(&cs);
        assert_eq!((t.pending, t.in_progress, t.solved, t.total), (7, 0, 3, 10));
    }

    #[test]
    fn rate_rounds_to_one_decimal() {
        let a = Actor::new("A", Role::Student);
        let cs = vec![solved(&a), filed(&a, "Other"), filed(&a, "Other")];
        assert_eq!(resolution_rate(&cs), 33.3);
    }

    #[test]
    fn breakdown_keeps_first_occurrence_order() {
        let a = Actor::new("A", Role::Student);
        let cs = vec![filed(&a, "Hostel"), filed(&a, "Technical"), filed(&a, "Hostel")];
        let b = category_breakdown(&cs);
        assert_eq!(
            b.entries(),
            &[(Category::Hostel, 2), (Category::Technical, 1)]
        );
        assert_eq!(b.labels(), vec!["Hostel", "Technical"]);
        assert_eq!(b.get(Category::Mentor), 0);
    }

    #[test]
    fn tie_goes_to_first_seen_actor() {
        let a = Actor::new("A", Role::Student);
        let b = Actor::new("B", Role::Student);
        let cs = vec![filed(&a, "Other"), filed(&b, "Other"), filed(&a, "Other"), filed(&b, "Other")];
        let top = top_complainer(&cs).unwrap();
        assert_eq!(top.author_id, a.id);
        assert_eq!(top.display_name, "A");
        assert_eq!(top.count, 2);
    }

    #[test]
    fn strictly_greater_count_wins() {
        let a = Actor::new("A", Role::Student);
        let b = Actor::new("B", Role::Student);
        let cs = vec![filed(&a, "Other"), filed(&b, "Other"), filed(&b, "Other")];
        assert_eq!(top_complainer(&cs).unwrap().author_id, b.id);
    }

    #[test]
    fn summarize_bundles_everything() {
        let a = Actor::new("A", Role::Student);
        let cs = vec![solved(&a), filed(&a, "Mentor")];
        let s = summarize(&cs);
        assert_eq!(s.totals.total, 2);
        assert_eq!(s.resolution_rate, 50.0);
        assert_eq!(s.categories.labels(), vec!["Other", "Mentor"]);
        assert_eq!(s.top_complainer.map(|t| t.count), Some(2));
    }
}
