// Window - fixed-capacity sliding window of normalized feature vectors
//
// Arena-backed ring buffer: one contiguous allocation of
// window_size * feature_count scalars, written in place. The window is always
// exactly full; construction pre-fills it with zero vectors so the classifier
// sees a full-shape input from the first tick.

/// Sliding window buffer
///
/// `head` indexes the oldest vector, which is also the slot the next push
/// overwrites.
#[derive(Debug, Clone)]
pub struct SlidingWindow {
    data: Vec<f32>,
    window_size: usize,
    feature_count: usize,
    head: usize,
}

impl SlidingWindow {
    /// # Panics
    /// Panics if `window_size` or `feature_count` is 0, or if their product
    /// overflows `usize`
    pub fn new(window_size: usize, feature_count: usize) -> Self {
        assert!(window_size > 0, "window_size must be greater than 0");
        assert!(feature_count > 0, "feature_count must be greater than 0");
        let len = window_size
            .checked_mul(feature_count)
            .unwrap_or_else(|| panic!("window of {window_size} x {feature_count} overflows usize"));

        Self {
            data: vec![0.0_f32; len],
            window_size,
            feature_count,
            head: 0,
        }
    }

    /// Number of feature vectors held; always `window_size`
    pub fn len(&self) -> usize {
        self.window_size
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn feature_count(&self) -> usize {
        self.feature_count
    }

    /// Length of [`SlidingWindow::flatten`] output
    pub fn flat_len(&self) -> usize {
        self.data.len()
    }

    /// Evict the oldest vector and append `vector` as the newest
    ///
    /// # Panics
    /// Panics if `vector.len() != feature_count`
    pub fn push(&mut self, vector: &[f32]) {
        assert_eq!(
            vector.len(),
            self.feature_count,
            "feature vector length must match window feature count"
        );
        let start = self.head * self.feature_count;
        self.data[start..start + self.feature_count].copy_from_slice(vector);
        self.head = (self.head + 1) % self.window_size;
    }

    /// Vector at logical position `index` (0 = oldest)
    pub fn get(&self, index: usize) -> Option<&[f32]> {
        if index >= self.window_size {
            return None;
        }
        let slot = (self.head + index) % self.window_size;
        let start = slot * self.feature_count;
        Some(&self.data[start..start + self.feature_count])
    }

    /// Iterate vectors oldest to newest
    pub fn iter(&self) -> impl Iterator<Item = &[f32]> + '_ {
        (0..self.window_size).filter_map(move |i| self.get(i))
    }

    /// Concatenate all vectors oldest to newest
    ///
    /// Shape: (1, window_size, feature_count), row-major, time-major.
    pub fn flatten(&self) -> Vec<f32> {
        let mut out = Vec::with_capacity(self.data.len());
        self.flatten_into(&mut out);
        out
    }

    /// Non-allocating variant of [`SlidingWindow::flatten`] once `out` has
    /// grown to capacity
    pub fn flatten_into(&self, out: &mut Vec<f32>) {
        out.clear();
        let split = self.head * self.feature_count;
        out.extend_from_slice(&self.data[split..]);
        out.extend_from_slice(&self.data[..split]);
    }

    /// Back to the all-zero cold-start state
    pub fn reset(&mut self) {
        self.data.fill(0.0);
        self.head = 0;
    }
}
