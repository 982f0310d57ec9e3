//! Burrows-Wheeler transform on single blocks.
//!
//! Rotations are sorted with cyclic prefix doubling: after round `k` every
//! rotation carries the rank of its first `2^k` bytes, and each round is
//! two counting-sort passes, so a block sorts in O(n log n).

use oxistream_core::{Result, StreamError};

/// Sorted rotation order of `data` (its cyclic suffix array).
pub fn rotation_order(data: &[u8]) -> Vec<u32> {
    let n = data.len();
    if n == 0 {
        return Vec::new();
    }

    // Initial order and classes by first byte.
    let mut counts = vec![0usize; n.max(256)];
    for &byte in data {
        counts[byte as usize] += 1;
    }
    for i in 1..256 {
        counts[i] += counts[i - 1];
    }
    let mut order = vec![0u32; n];
    for i in (0..n).rev() {
        let byte = data[i] as usize;
        counts[byte] -= 1;
        order[counts[byte]] = i as u32;
    }

    let mut class = vec![0u32; n];
    let mut classes = 1usize;
    for i in 1..n {
        if data[order[i] as usize] != data[order[i - 1] as usize] {
            classes += 1;
        }
        class[order[i] as usize] = (classes - 1) as u32;
    }

    let mut shifted = vec![0u32; n];
    let mut next_class = vec![0u32; n];
    let mut span = 1usize;
    while span < n && classes < n {
        // Sort by the second half: shift the current order back by `span`.
        for (slot, &pos) in shifted.iter_mut().zip(order.iter()) {
            *slot = ((pos as usize + n - span) % n) as u32;
        }

        // Stable counting sort by the class of the first half.
        counts[..classes].fill(0);
        for &pos in &shifted {
            counts[class[pos as usize] as usize] += 1;
        }
        for i in 1..classes {
            counts[i] += counts[i - 1];
        }
        for &pos in shifted.iter().rev() {
            let c = class[pos as usize] as usize;
            counts[c] -= 1;
            order[counts[c]] = pos;
        }

        next_class[order[0] as usize] = 0;
        classes = 1;
        for i in 1..n {
            let current = order[i] as usize;
            let previous = order[i - 1] as usize;
            let key = (class[current], class[(current + span) % n]);
            let previous_key = (class[previous], class[(previous + span) % n]);
            if key != previous_key {
                classes += 1;
            }
            next_class[current] = (classes - 1) as u32;
        }
        std::mem::swap(&mut class, &mut next_class);
        span *= 2;
    }

    order
}

/// Forward transform: the last column of the sorted rotations and the row
/// holding the original block.
pub fn transform(data: &[u8]) -> (Vec<u8>, usize) {
    let n = data.len();
    let order = rotation_order(data);

    let mut primary = 0;
    let mut last = Vec::with_capacity(n);
    for (row, &start) in order.iter().enumerate() {
        let start = start as usize;
        if start == 0 {
            primary = row;
        }
        last.push(data[(start + n - 1) % n]);
    }
    (last, primary)
}

/// Inverse transform.
///
/// Fails with [`StreamError::Corrupt`] when `primary` is not a row of a
/// non-empty block.
pub fn inverse_transform(last: &[u8], primary: usize) -> Result<Vec<u8>> {
    let n = last.len();
    if n == 0 {
        return Ok(Vec::new());
    }
    if primary >= n {
        return Err(StreamError::corrupt(
            0,
            format!("primary index {primary} outside block of {n} bytes"),
        ));
    }

    let mut starts = [0usize; 256];
    for &byte in last {
        starts[byte as usize] += 1;
    }
    let mut total = 0;
    for slot in starts.iter_mut() {
        let count = *slot;
        *slot = total;
        total += count;
    }

    // next[row] is the row whose last byte is the first byte of `row`.
    let mut next = vec![0u32; n];
    for (row, &byte) in last.iter().enumerate() {
        next[starts[byte as usize]] = row as u32;
        starts[byte as usize] += 1;
    }

    let mut out = Vec::with_capacity(n);
    let mut row = next[primary] as usize;
    for _ in 0..n {
        out.push(last[row]);
        row = next[row] as usize;
    }
    Ok(out)
}
