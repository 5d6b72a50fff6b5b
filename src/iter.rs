use std::collections::VecDeque;

/// Stream adapters for sample-by-sample signal processing.
pub trait Iter: Iterator {
    fn convolve(self, taps: Vec<f64>) -> Convolve<Self>
    where
        Self: Iterator<Item = f64> + Sized,
    {
        Convolve::new(self, taps)
    }

    fn scale(self, scalar: f64) -> Scale<Self::Item, Self>
    where
        Self: Sized,
        Self::Item: std::ops::Mul<f64, Output = Self::Item>,
    {
        Scale::new(self, scalar)
    }

    fn take_every(self, step: usize) -> TakeEvery<Self::Item, Self>
    where
        Self: Sized,
    {
        TakeEvery::new(self, step)
    }

    fn whole_chunks(self, size: usize) -> WholeChunks<Self::Item, Self>
    where
        Self: Sized,
        Self::Item: Copy + Default,
    {
        WholeChunks::new(self, size)
    }
}

impl<I: Iterator> Iter for I {}

/// Full convolution of a sample stream with an FIR tap vector.
///
/// Yields `n + taps.len() - 1` samples for an `n`-sample source.
pub struct Convolve<I: Iterator<Item = f64>> {
    source: I,
    taps: Vec<f64>,
    history: VecDeque<f64>,
    flush: usize,
    source_done: bool,
}

impl<I: Iterator<Item = f64>> Convolve<I> {
    pub fn new(source: I, taps: Vec<f64>) -> Convolve<I> {
        let flush = taps.len().saturating_sub(1);
        Self {
            source,
            history: VecDeque::with_capacity(taps.len()),
            taps,
            flush,
            source_done: false,
        }
    }

    fn shift(&mut self, sample: f64) {
        self.history.push_front(sample);
        self.history.truncate(self.taps.len());
    }
}

impl<I: Iterator<Item = f64>> Iterator for Convolve<I> {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        if !self.source_done {
            match self.source.next() {
                Some(sample) => self.shift(sample),
                None => self.source_done = true,
            }
        }
        if self.source_done {
            if self.history.is_empty() || self.flush == 0 {
                return None;
            }
            self.flush -= 1;
            self.shift(0f64);
        }
        Some(
            self.taps
                .iter()
                .zip(self.history.iter())
                .map(|(&h_k, &x_k)| h_k * x_k)
                .sum(),
        )
    }
}

pub struct Scale<T: std::ops::Mul<f64, Output = T>, I: Iterator<Item = T>> {
    source: I,
    scalar: f64,
}

impl<T: std::ops::Mul<f64, Output = T>, I: Iterator<Item = T>> Scale<T, I> {
    pub fn new(source: I, scalar: f64) -> Scale<T, I> {
        Self { source, scalar }
    }
}

impl<T: std::ops::Mul<f64, Output = T>, I: Iterator<Item = T>> Iterator for Scale<T, I> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        Some(self.source.next()? * self.scalar)
    }
}

pub struct TakeEvery<T, I: Iterator<Item = T>> {
    source: I,
    step: usize,
    curr: usize,
}

impl<T, I: Iterator<Item = T>> TakeEvery<T, I> {
    pub fn new(source: I, step: usize) -> TakeEvery<T, I> {
        Self {
            source,
            step,
            curr: 0,
        }
    }
}

impl<T, I: Iterator<Item = T>> Iterator for TakeEvery<T, I> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        loop {
            let take = self.curr % self.step == 0;
            self.curr += 1;
            let item = self.source.next();
            if take {
                return item;
            }
            item?;
        }
    }
}

/// Fixed-size chunks; a partial final chunk is padded with `T::default()`.
pub struct WholeChunks<T: Copy + Default, I: Iterator<Item = T>> {
    source: I,
    size: usize,
    done: bool,
}

impl<T: Copy + Default, I: Iterator<Item = T>> WholeChunks<T, I> {
    pub fn new(source: I, size: usize) -> WholeChunks<T, I> {
        Self {
            source,
            size,
            done: false,
        }
    }
}

impl<T: Copy + Default, I: Iterator<Item = T>> Iterator for WholeChunks<T, I> {
    type Item = Vec<T>;

    fn next(&mut self) -> Option<Vec<T>> {
        if self.done {
            return None;
        }
        let mut buf = Vec::with_capacity(self.size);
        while buf.len() < self.size {
            match self.source.next() {
                Some(t) => buf.push(t),
                None => {
                    self.done = true;
                    if buf.is_empty() {
                        return None;
                    }
                    buf.resize(self.size, T::default());
                }
            }
        }
        Some(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::Iter;

    #[test]
    fn convolve_with_unit_taps() {
        let signal = [1f64, 2f64, 3f64];
        let out: Vec<f64> = signal.iter().copied().convolve(vec![1f64]).collect();
        assert_eq!(out, signal);
    }

    #[test]
    fn convolve_full_length() {
        let signal = vec![1f64; 10];
        let taps = vec![0.5f64; 4];
        let out: Vec<f64> = signal.into_iter().convolve(taps).collect();
        assert_eq!(out.len(), 10 + 4 - 1);
        // Steady state: all four taps overlap the signal.
        assert_eq!(out[5], 2f64);
        // Leading edge ramps up one tap at a time.
        assert_eq!(out[0], 0.5f64);
        assert_eq!(out[1], 1f64);
    }

    #[test]
    fn convolve_empty_source() {
        let out: Vec<f64> = std::iter::empty().convolve(vec![1f64, 2f64]).collect();
        assert!(out.is_empty());
    }

    #[test]
    fn scale() {
        let scaled: Vec<f64> = (0..10).map(|i| i as f64).scale(2f64).collect();
        let expected: Vec<f64> = (0..10).map(|i| (2 * i) as f64).collect();
        assert_eq!(scaled, expected);
    }

    #[test]
    fn take_every() {
        let list: Vec<usize> = (0..10).take_every(2).collect();
        assert_eq!(list, [0, 2, 4, 6, 8]);

        let offset: Vec<usize> = (0..12).skip(3).take_every(4).collect();
        assert_eq!(offset, [3, 7, 11]);
    }

    #[test]
    fn whole_chunks_pads_tail() {
        let chunks: Vec<Vec<u8>> = (1u8..=5).whole_chunks(2).collect();
        assert_eq!(chunks, vec![vec![1, 2], vec![3, 4], vec![5, 0]]);
    }

    #[test]
    fn whole_chunks_exact_boundary() {
        let chunks: Vec<Vec<u8>> = (1u8..=4).whole_chunks(2).collect();
        assert_eq!(chunks, vec![vec![1, 2], vec![3, 4]]);
    }
}
