use log::info;
use rand::seq::SliceRandom;
use rand::Rng;

/// Randomly selected samples in the order they are written out
#[derive(Debug, Clone)]
pub struct SampleSelection {
    pub samples: Vec<Box<str>>,
    /// Position of each selected sample in the original sample order
    pub original_index: Vec<usize>,
}

impl SampleSelection {
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.samples
            .iter()
            .map(|s| s.as_ref())
            .zip(self.original_index.iter().copied())
    }
}

/// Select `number_of_samples` samples without replacement
///
/// Shuffles the whole population and keeps the first
/// `min(number_of_samples, population)`; the shuffled order is kept.
pub fn select_samples<R: Rng + ?Sized>(
    samples: &[Box<str>],
    number_of_samples: usize,
    rng: &mut R,
) -> SampleSelection {
    let mut order: Vec<usize> = (0..samples.len()).collect();
    order.shuffle(rng);
    order.truncate(number_of_samples);

    if number_of_samples > samples.len() {
        info!(
            "Requested {} samples but only {} available; using all",
            number_of_samples,
            samples.len()
        );
    }

    SampleSelection {
        samples: order.iter().map(|&i| samples[i].clone()).collect(),
        original_index: order,
    }
}
