//! Categorical split storage.
//!
//! XGBoost stores, for each categorical split, the set of categories that go
//! RIGHT. Everything else (including categories the split never saw) goes
//! left. Sets are kept here as packed `u32` bitsets, 32 categories per word.

use super::NodeId;

/// Largest category value XGBoost accepts (exclusive), `2^24`.
///
/// Beyond this `f32` can no longer represent every integer exactly.
pub const MAX_CATEGORY: u32 = 1 << 24;

/// Packed bitsets for every categorical node of a tree.
///
/// - `bitsets`: flat array of words for all categorical nodes
/// - `segments`: per-node `(start, size)` into `bitsets`; `(0, 0)` for
///   numeric splits and leaves
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoriesStorage {
    bitsets: Box<[u32]>,
    segments: Box<[(u32, u32)]>,
}

impl CategoriesStorage {
    #[inline]
    pub fn empty() -> Self {
        Self::default()
    }

    /// `segments` must have one entry per tree node.
    pub fn new(bitsets: Vec<u32>, segments: Vec<(u32, u32)>) -> Self {
        Self {
            bitsets: bitsets.into_boxed_slice(),
            segments: segments.into_boxed_slice(),
        }
    }

    /// Whether `category` is in the right-going set of `node`.
    ///
    /// Categories past the end of the stored bitset are not in the set.
    #[inline]
    pub fn category_goes_right(&self, node: NodeId, category: u32) -> bool {
        let Some(&(start, size)) = self.segments.get(node as usize) else {
            return false;
        };
        let word_idx = category >> 5;
        if word_idx >= size {
            return false;
        }
        let word = self.bitsets[(start + word_idx) as usize];
        (word >> (category & 31)) & 1 != 0
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bitsets.is_empty()
    }
}

/// Convert a feature value to a category index.
///
/// The value is truncated toward zero like XGBoost does. Returns `None` for
/// negative values and values at or above [`MAX_CATEGORY`]; such samples are
/// sent left. NaN must be handled as missing before calling this.
#[inline]
pub fn float_to_category(value: f32) -> Option<u32> {
    if value < 0.0 || value >= MAX_CATEGORY as f32 {
        None
    } else {
        Some(value as u32)
    }
}

/// Pack category values into a bitset where bit `c` is set for each `c`.
///
/// ```
/// use xgb_inference::repr::gbdt::categories_to_bitset;
///
/// assert_eq!(categories_to_bitset(&[1, 3, 5]), vec![0b101010]);
/// assert_eq!(categories_to_bitset(&[32]), vec![0, 1]);
/// ```
pub fn categories_to_bitset(categories: &[u32]) -> Vec<u32> {
    let Some(&max_cat) = categories.iter().max() else {
        return Vec::new();
    };
    let mut bitset = vec![0u32; (max_cat >> 5) as usize + 1];
    for &cat in categories {
        bitset[(cat >> 5) as usize] |= 1 << (cat & 31);
    }
    bitset
}
