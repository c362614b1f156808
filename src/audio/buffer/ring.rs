//! Fixed-capacity circular sample buffer.
//!
//! Supports wrap-around writes and reads without reallocating. Writing past
//! capacity overwrites the oldest samples, which is what a live capture
//! source wants when its consumer falls behind.

pub struct SampleRing {
    buf: Vec<f32>,
    size: usize,
    write_offset: usize,
    read_offset: usize,
    length: usize,
}

impl SampleRing {
    /// Create a new `SampleRing` holding up to `size` samples.
    pub fn new(size: usize) -> Self {
        Self {
            buf: vec![0.0; size],
            size,
            write_offset: 0,
            read_offset: 0,
            length: 0,
        }
    }

    /// Samples currently available to read.
    pub fn len(&self) -> usize {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    pub fn capacity(&self) -> usize {
        self.size
    }

    /// Samples that can be written before the oldest data is overwritten.
    pub fn remaining(&self) -> usize {
        self.size - self.length
    }

    /// Write `chunk`, overwriting the oldest samples if the ring is full.
    /// Returns the number of samples that were overwritten.
    pub fn write(&mut self, chunk: &[f32]) -> usize {
        if self.size == 0 {
            return chunk.len();
        }

        // Only the newest `size` samples of an oversized chunk can survive.
        let skipped = chunk.len().saturating_sub(self.size);
        let chunk = &chunk[skipped..];
        let to_write = chunk.len();
        let available_at_end = self.size - self.write_offset;

        if to_write <= available_at_end {
            self.buf[self.write_offset..self.write_offset + to_write].copy_from_slice(chunk);
        } else {
            self.buf[self.write_offset..].copy_from_slice(&chunk[..available_at_end]);
            self.buf[..to_write - available_at_end].copy_from_slice(&chunk[available_at_end..]);
        }

        let new_len = self.length + to_write;
        let overwritten = if new_len > self.size {
            let overwritten = new_len - self.size;
            self.read_offset = (self.read_offset + overwritten) % self.size;
            self.length = self.size;
            overwritten
        } else {
            self.length = new_len;
            0
        };

        self.write_offset = (self.write_offset + to_write) % self.size;
        overwritten + skipped
    }

    /// Copy up to `dest.len()` samples into `dest` and advance. Returns the count read.
    pub fn read_into(&mut self, dest: &mut [f32]) -> usize {
        let n = self.peek_into(dest);
        self.skip(n)
    }

    /// Copy up to `dest.len()` samples into `dest` without advancing.
    pub fn peek_into(&self, dest: &mut [f32]) -> usize {
        let to_read = dest.len().min(self.length);
        if to_read == 0 {
            return 0;
        }

        let available_at_end = self.size - self.read_offset;
        if to_read <= available_at_end {
            dest[..to_read].copy_from_slice(&self.buf[self.read_offset..self.read_offset + to_read]);
        } else {
            dest[..available_at_end].copy_from_slice(&self.buf[self.read_offset..]);
            dest[available_at_end..to_read]
                .copy_from_slice(&self.buf[..to_read - available_at_end]);
        }
        to_read
    }

    /// Drain everything currently buffered into a new `Vec`.
    pub fn read_all(&mut self) -> Vec<f32> {
        let mut out = vec![0.0; self.length];
        self.read_into(&mut out);
        out
    }

    /// Skip `n` samples without copying. Returns actual samples skipped.
    pub fn skip(&mut self, n: usize) -> usize {
        let to_skip = n.min(self.length);
        if to_skip > 0 {
            self.read_offset = (self.read_offset + to_skip) % self.size;
            self.length -= to_skip;
        }
        to_skip
    }

    /// Reset the ring to empty.
    pub fn clear(&mut self) {
        self.write_offset = 0;
        self.read_offset = 0;
        self.length = 0;
    }
}
