use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpanError {
    #[error("start's effective index ({start}) is greater than stop's ({stop})")]
    OutOfOrder { start: usize, stop: usize },
}

/// A byte range `[start, stop)` into a node's source text.
///
/// Nodes store spans rather than copied text: slicing the source with any
/// span reproduces the exact text the node covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Span {
    /// Inclusive start byte offset.
    pub start: usize,
    /// Exclusive stop byte offset.
    pub stop: usize,
}

/// Anything a span can be resolved against: an explicit length or a sized value.
pub trait Basis {
    fn basis_len(&self) -> usize;
}

impl Basis for usize {
    fn basis_len(&self) -> usize {
        *self
    }
}

impl Basis for str {
    fn basis_len(&self) -> usize {
        self.len()
    }
}

impl Basis for String {
    fn basis_len(&self) -> usize {
        self.len()
    }
}

impl<T> Basis for [T] {
    fn basis_len(&self) -> usize {
        self.len()
    }
}

impl<T> Basis for Vec<T> {
    fn basis_len(&self) -> usize {
        self.len()
    }
}

impl<B: Basis + ?Sized> Basis for &B {
    fn basis_len(&self) -> usize {
        (**self).basis_len()
    }
}

impl Span {
    pub fn new(start: usize, stop: usize) -> Result<Self, SpanError> {
        if start > stop {
            return Err(SpanError::OutOfOrder { start, stop });
        }
        Ok(Self { start, stop })
    }

    /// Resolves slice-style indices against `basis` and shifts them by `offset`.
    ///
    /// Negative indices count back from the end. An omitted `start` becomes
    /// `offset`, an omitted `stop` becomes `len + offset`. Explicit indices are
    /// clamped into `[0, len]` before the offset is added.
    ///
    /// ```
    /// use spantree_engine::Span;
    ///
    /// assert_eq!(Span::from_indices(10usize, Some(-3), None, 0).unwrap(), Span { start: 7, stop: 10 });
    /// assert!(Span::from_indices(5usize, Some(2), Some(1), 0).is_err());
    /// ```
    pub fn from_indices<B: Basis>(
        basis: B,
        start: Option<isize>,
        stop: Option<isize>,
        offset: usize,
    ) -> Result<Self, SpanError> {
        let len = basis.basis_len();

        let start = match start {
            None => offset,
            Some(i) => resolve(len, i) + offset,
        };
        let stop = match stop {
            None => len + offset,
            Some(i) => resolve(len, i) + offset,
        };

        Self::new(start, stop)
    }

    /// Returns the length in bytes.
    #[must_use]
    pub fn len(self) -> usize {
        self.stop - self.start
    }

    #[must_use]
    pub fn is_empty(self) -> bool {
        self.len() == 0
    }

    /// True if `other` lies entirely within this span.
    #[must_use]
    pub fn contains(self, other: Span) -> bool {
        self.start <= other.start && other.stop <= self.stop
    }

    /// True if the spans cannot sit side by side as siblings: they share a
    /// byte, or one is empty and lies strictly inside the other.
    #[must_use]
    pub fn overlaps(self, other: Span) -> bool {
        let both_empty = self.is_empty() && other.is_empty();
        !both_empty && self.start < other.stop && other.start < self.stop
    }
}

fn resolve(len: usize, index: isize) -> usize {
    if index >= 0 {
        index.unsigned_abs().min(len)
    } else {
        len.saturating_sub(index.unsigned_abs())
    }
}

impl From<Span> for std::ops::Range<usize> {
    fn from(sp: Span) -> Self {
        sp.start..sp.stop
    }
}
