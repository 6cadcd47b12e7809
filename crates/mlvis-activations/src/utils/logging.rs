use std::ops::Range;
use tqdm::{tqdm, Tqdm};

/// Terminal progress bar for long loops (filters, training batches).
pub struct Progress {
    total: usize,
    count: usize,
    bar: Tqdm<Range<usize>>,
}

impl Progress {
    pub fn new(total: usize, description: &str) -> Self {
        Self {
            total,
            count: 0,
            bar: tqdm(0..total).desc(Some(description)),
        }
    }

    /// Advance the bar by one step; extra steps beyond `total` are ignored.
    pub fn inc(&mut self) {
        if self.count >= self.total {
            log::warn!("Progress bar received more updates than its total of {}", self.total);
            return;
        }
        self.count += 1;
        let _ = self.bar.pbar.update(1);
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn finish(self) {
        if self.count < self.total {
            log::debug!("Progress finished early at {}/{}", self.count, self.total);
        }
    }
}
