use super::motion::Sample;

/// Append-only record of the samples produced while playing
#[derive(Debug, Clone, Default)]
pub struct History {
    samples: Vec<Sample>,
}

impl History {
    pub fn new() -> Self {
        Self { samples: Vec::new() }
    }

    pub fn push(&mut self, sample: Sample) {
        self.samples.push(sample);
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Look up `index`, clamping to the last recorded sample.
    /// Only an empty history yields `None`.
    pub fn get_clamped(&self, index: usize) -> Option<&Sample> {
        let last = self.samples.len().checked_sub(1)?;
        self.samples.get(index.min(last))
    }
}

#[cfg(test)]
impl History {
    pub fn get(&self, index: usize) -> Option<&Sample> {
        self.samples.get(index)
    }

    pub fn last(&self) -> Option<&Sample> {
        self.samples.last()
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }
}
