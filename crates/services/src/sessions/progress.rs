use std::iter::Sum;
use std::ops::Add;

/// Correct/wrong counts for one checked page, or a sum of pages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageResult {
    pub correct: usize,
    pub wrong: usize,
}

impl PageResult {
    #[must_use]
    pub fn answered(&self) -> usize {
        self.correct + self.wrong
    }
}

impl Add for PageResult {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            correct: self.correct + rhs.correct,
            wrong: self.wrong + rhs.wrong,
        }
    }
}

impl<'a> Sum<&'a PageResult> for PageResult {
    fn sum<I: Iterator<Item = &'a PageResult>>(iter: I) -> Self {
        iter.fold(Self::default(), |acc, page| acc + *page)
    }
}

/// Aggregated view of quiz progress, useful for UI.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QuizProgress {
    pub percent: u8,
    pub correct: usize,
    pub wrong: usize,
    pub answered: usize,
    pub total: usize,
    pub is_complete: bool,
}

impl QuizProgress {
    #[must_use]
    pub fn new(totals: PageResult, total: usize, is_complete: bool) -> Self {
        Self {
            percent: percent(totals.answered(), total),
            correct: totals.correct,
            wrong: totals.wrong,
            answered: totals.answered(),
            total,
            is_complete,
        }
    }
}

/// `round(100 * answered / total)`, halves rounded up; 0 when `total` is 0.
#[must_use]
pub fn percent(answered: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let answered = answered.min(total);
    let rounded = (answered * 200 + total) / (total * 2);
    u8::try_from(rounded).unwrap_or(100)
}
