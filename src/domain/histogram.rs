// Country histogram derived from the selection
use super::selection::SelectionSet;
use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Histogram {
    pub categories: Vec<String>,
    pub counts: Vec<usize>,
}

impl Histogram {
    /// Counts saved launches per country, categories in first-seen order.
    pub fn aggregate(selection: &SelectionSet) -> Self {
        let mut histogram = Histogram::default();
        for record in selection.iter() {
            match histogram
                .categories
                .iter()
                .position(|category| category == record.country())
            {
                Some(index) => histogram.counts[index] += 1,
                None => {
                    histogram.categories.push(record.country().to_string());
                    histogram.counts.push(1);
                }
            }
        }
        histogram
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.categories
            .iter()
            .map(String::as_str)
            .zip(self.counts.iter().copied())
    }
}
