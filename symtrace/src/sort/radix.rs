//! Least-significant-digit radix sort with a skip-pass optimization

const RADIX: usize = 256;
const DIGIT_BITS: u32 = 8;

/// Sort key with an order-preserving unsigned radix image.
///
/// Signed keys map through an XOR with their sign bit, which preserves
/// ordering across the sign boundary without branching.
pub trait RadixKey: Copy {
    /// Number of 8-bit digits in the radix image. One for byte-wide keys,
    /// otherwise always even, so the ping-pong passes land back in the
    /// input slice.
    const DIGITS: usize;

    /// The unsigned image used for digit extraction.
    fn to_radix(self) -> u64;
}

macro_rules! unsigned_radix_key {
    ($($t:ty => $digits:expr),* $(,)?) => {
        $(impl RadixKey for $t {
            const DIGITS: usize = $digits;
            #[inline]
            fn to_radix(self) -> u64 {
                u64::from(self)
            }
        })*
    };
}

macro_rules! signed_radix_key {
    ($($t:ty => ($unsigned:ty, $digits:expr)),* $(,)?) => {
        $(impl RadixKey for $t {
            const DIGITS: usize = $digits;
            #[inline]
            #[allow(clippy::cast_sign_loss)]
            fn to_radix(self) -> u64 {
                // Shift to unsigned: flip the sign bit so negative values
                // order below positive ones.
                u64::from((self as $unsigned) ^ (1 << (<$unsigned>::BITS - 1)))
            }
        })*
    };
}

unsigned_radix_key! {
    u8 => 1,
    u16 => 2,
    u32 => 4,
    u64 => 8,
}

signed_radix_key! {
    i8 => (u8, 1),
    i16 => (u16, 2),
    i32 => (u32, 4),
    i64 => (u64, 8),
}

/// Sort `items` in place, keyed by `u64`-image radix digits of `key`.
///
/// `scratch` is the auxiliary ping-pong buffer; it is cleared and resized
/// to the input length once, up front. Reusing one scratch vector across
/// many batches avoids repeated allocation.
///
/// The sort is stable and runs in `O(n * digits)` with at most one
/// movement pass per non-constant digit. Already-sorted input is detected
/// during the prescan and returns without moving anything.
pub fn radix_sort_by_key<T, K, F>(items: &mut [T], scratch: &mut Vec<T>, key: F)
where
    T: Copy,
    K: RadixKey,
    F: Fn(&T) -> K,
{
    let n = items.len();
    if n < 2 {
        return;
    }

    scratch.clear();
    scratch.extend_from_slice(items);

    if K::DIGITS == 1 {
        sort_single_digit(items, scratch, &key);
        return;
    }

    // Combined prescan: one walk detects sortedness and builds every
    // digit's histogram plus its largest bucket count.
    let mut counts = vec![[0usize; RADIX]; K::DIGITS];
    let mut max_counts = vec![0usize; K::DIGITS];
    let mut sorted = true;
    let mut previous = 0u64;
    for (index, item) in items.iter().enumerate() {
        let image = key(item).to_radix();
        if index > 0 && image < previous {
            sorted = false;
        }
        previous = image;
        for (digit, histogram) in counts.iter_mut().enumerate() {
            let bucket = digit_of(image, digit);
            histogram[bucket] += 1;
            if histogram[bucket] > max_counts[digit] {
                max_counts[digit] = histogram[bucket];
            }
        }
    }
    if sorted {
        return;
    }

    let mut in_items = true;
    for digit in 0..K::DIGITS {
        // Every element shares this digit value; the pass would be the
        // identity permutation.
        if max_counts[digit] == n {
            continue;
        }
        let offsets = to_offsets(&mut counts[digit]);
        let shift = DIGIT_BITS * digit as u32;
        if in_items {
            counting_pass(items, scratch, offsets, shift, &key);
        } else {
            counting_pass(scratch, items, offsets, shift, &key);
        }
        in_items = !in_items;
    }

    // Skipped passes can leave the result in the scratch buffer even
    // though the digit count is even.
    if !in_items {
        items.copy_from_slice(scratch);
    }
}

/// Sort a slice of keys directly, allocating scratch internally.
pub fn radix_sort<K: RadixKey>(items: &mut [K]) {
    let mut scratch = Vec::new();
    radix_sort_by_key(items, &mut scratch, |&k| k);
}

/// Byte-wide keys: one counting pass into the buffer, then move back.
fn sort_single_digit<T, K, F>(items: &mut [T], scratch: &mut [T], key: &F)
where
    T: Copy,
    K: RadixKey,
    F: Fn(&T) -> K,
{
    let mut histogram = [0usize; RADIX];
    for item in items.iter() {
        histogram[digit_of(key(item).to_radix(), 0)] += 1;
    }
    let offsets = to_offsets(&mut histogram);
    counting_pass(items, scratch, offsets, 0, key);
    items.copy_from_slice(scratch);
}

#[inline]
fn digit_of(image: u64, digit: usize) -> usize {
    ((image >> (DIGIT_BITS * digit as u32)) & 0xFF) as usize
}

/// Convert a histogram to exclusive prefix sums in place.
fn to_offsets(histogram: &mut [usize; RADIX]) -> &mut [usize; RADIX] {
    let mut running = 0;
    for count in histogram.iter_mut() {
        let bucket = *count;
        *count = running;
        running += bucket;
    }
    histogram
}

/// One stable counting-sort pass from `src` into `dst`.
fn counting_pass<T, K, F>(
    src: &[T],
    dst: &mut [T],
    offsets: &mut [usize; RADIX],
    shift: u32,
    key: &F,
) where
    T: Copy,
    K: RadixKey,
    F: Fn(&T) -> K,
{
    for &item in src {
        let bucket = ((key(&item).to_radix() >> shift) & 0xFF) as usize;
        dst[offsets[bucket]] = item;
        offsets[bucket] += 1;
    }
}
