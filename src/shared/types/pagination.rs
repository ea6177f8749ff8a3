/// Skip/take paging over an ordered sequence of entities
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Paging {
    pub skip: usize,
    /// `None` takes everything after `skip`
    pub take: Option<usize>,
}

impl Paging {
    pub fn new(skip: usize, take: Option<usize>) -> Self {
        Self { skip, take }
    }

    /// Apply the paging window to an iterator.
    pub fn apply<I: Iterator>(&self, iter: I) -> impl Iterator<Item = I::Item> {
        iter.skip(self.skip).take(self.take.unwrap_or(usize::MAX))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_takes_everything() {
        let items: Vec<_> = Paging::default().apply(1..=5).collect();
        assert_eq!(items, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn skip_and_take_window() {
        let items: Vec<_> = Paging::new(1, Some(2)).apply(1..=5).collect();
        assert_eq!(items, vec![2, 3]);
    }

    #[test]
    fn skip_past_end_is_empty() {
        assert_eq!(Paging::new(10, None).apply(1..=5).count(), 0);
    }
}
