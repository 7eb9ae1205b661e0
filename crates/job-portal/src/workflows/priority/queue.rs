use std::cmp::Ordering;
use std::collections::BinaryHeap;

use super::ScoringContext;
use crate::workflows::candidates::domain::CandidateRecord;

/// Review order: higher score first, then name ascending, then username ascending.
///
/// `Ordering::Less` means `left` is reviewed before `right`, so the function can be
/// handed straight to `sort_by`.
pub fn compare_priority(
    left_score: f64,
    left: &CandidateRecord,
    right_score: f64,
    right: &CandidateRecord,
) -> Ordering {
    right_score
        .total_cmp(&left_score)
        .then_with(|| left.name.cmp(&right.name))
        .then_with(|| left.username.cmp(&right.username))
}

/// Candidates sorted by their stored score in review order.
pub fn rank_candidates(dataset: &[CandidateRecord]) -> Vec<CandidateRecord> {
    let mut ranked = dataset.to_vec();
    ranked.sort_by(|a, b| compare_priority(a.score_or_zero(), a, b.score_or_zero(), b));
    ranked
}

#[derive(Debug, thiserror::Error, Clone, Copy, PartialEq, Eq)]
pub enum QueueError {
    #[error("ranking queue is empty")]
    Empty,
}

#[derive(Debug)]
struct QueueEntry {
    score: f64,
    candidate: CandidateRecord,
}

impl PartialEq for QueueEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for QueueEntry {}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueueEntry {
    // BinaryHeap pops the greatest entry, so the review order is reversed here.
    fn cmp(&self, other: &Self) -> Ordering {
        compare_priority(other.score, &other.candidate, self.score, &self.candidate)
    }
}

/// Max-priority queue of candidates awaiting review.
#[derive(Debug, Default)]
pub struct RankingQueue {
    heap: BinaryHeap<QueueEntry>,
}

impl RankingQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues candidates using the score already stored on each record.
    pub fn from_scored<I>(candidates: I) -> Self
    where
        I: IntoIterator<Item = CandidateRecord>,
    {
        let heap = candidates
            .into_iter()
            .map(|candidate| QueueEntry {
                score: candidate.score_or_zero(),
                candidate,
            })
            .collect();
        Self { heap }
    }

    /// Scores `candidate` against `context` and queues it, returning the score.
    pub fn push(&mut self, candidate: CandidateRecord, context: &ScoringContext<'_>) -> f64 {
        let score = context.score(&candidate);
        self.push_scored(candidate, score);
        score
    }

    pub fn push_scored(&mut self, candidate: CandidateRecord, score: f64) {
        self.heap.push(QueueEntry { score, candidate });
    }

    pub fn pop_highest(&mut self) -> Result<CandidateRecord, QueueError> {
        self.heap
            .pop()
            .map(|entry| entry.candidate)
            .ok_or(QueueError::Empty)
    }

    pub fn peek(&self) -> Option<(&CandidateRecord, f64)> {
        self.heap.peek().map(|entry| (&entry.candidate, entry.score))
    }

    pub fn size(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::priority::test_support::candidate;

    fn scored(name: &str, score: f64) -> CandidateRecord {
        let mut record = candidate(name, 30);
        record.priority_score = Some(score);
        record
    }

    #[test]
    fn equal_scores_pop_in_name_order() {
        let mut queue = RankingQueue::new();
        queue.push_scored(scored("C", 50.0), 50.0);
        queue.push_scored(scored("A", 90.0), 90.0);
        queue.push_scored(scored("B", 90.0), 90.0);

        let order: Vec<String> = (0..3)
            .map(|_| queue.pop_highest().expect("entry available").name)
            .collect();

        assert_eq!(order, vec!["A", "B", "C"]);
        assert_eq!(queue.pop_highest(), Err(QueueError::Empty));
        assert!(queue.is_empty());
    }

    #[test]
    fn pops_are_non_increasing_for_any_push_order() {
        let scores = [12.0, 149.5, 77.0, 77.0, 0.0, 150.0, 33.3, 77.0, 91.0];
        let names = ["h", "b", "e", "a", "z", "c", "q", "f", "d"];
        let mut queue = RankingQueue::new();
        for (name, score) in names.iter().zip(scores) {
            queue.push_scored(scored(name, score), score);
        }
        assert_eq!(queue.size(), scores.len());

        let mut previous: Option<(f64, String)> = None;
        while let Ok(next) = queue.pop_highest() {
            let score = next.score_or_zero();
            if let Some((prev_score, prev_name)) = &previous {
                assert!(score <= *prev_score);
                if score == *prev_score {
                    assert!(next.name >= *prev_name);
                }
            }
            previous = Some((score, next.name));
        }
    }

    #[test]
    fn ranking_matches_queue_order() {
        let dataset = vec![
            scored("Mia", 40.0),
            scored("Abe", 120.0),
            scored("Lou", 120.0),
            scored("Kai", 87.5),
        ];

        let ranked: Vec<String> = rank_candidates(&dataset)
            .into_iter()
            .map(|record| record.name)
            .collect();
        let mut queue = RankingQueue::from_scored(dataset);
        let popped: Vec<String> = std::iter::from_fn(|| queue.pop_highest().ok())
            .map(|record| record.name)
            .collect();

        assert_eq!(ranked, vec!["Abe", "Lou", "Kai", "Mia"]);
        assert_eq!(ranked, popped);
    }

    #[test]
    fn push_scores_through_the_context() {
        let mut queue = RankingQueue::new();
        let context = ScoringContext::new(&[], None);
        let score = queue.push(candidate("Ada", 30), &context);

        let (top, top_score) = queue.peek().expect("queued");
        assert_eq!(top.name, "Ada");
        assert_eq!(top_score, score);
        assert_eq!(queue.size(), 1);
    }
}
