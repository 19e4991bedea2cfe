/// A vector that guarantees at least one element exists
/// Implements "Make Invalid States Unrepresentable" principle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NonEmptyVec<T> {
    head: T,
    tail: Vec<T>,
}

impl<T> NonEmptyVec<T> {
    /// Create a new NonEmptyVec with a single element
    pub fn new(head: T) -> Self {
        Self {
            head,
            tail: Vec::new(),
        }
    }

    /// Build from a plain vector, `None` when it is empty
    pub fn from_vec(mut values: Vec<T>) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let tail = values.split_off(1);
        let head = values.pop()?;
        Some(Self { head, tail })
    }

    /// Get the first element (guaranteed to exist)
    pub fn first(&self) -> &T {
        &self.head
    }

    /// Get the last element (guaranteed to exist)
    pub fn last(&self) -> &T {
        self.tail.last().unwrap_or(&self.head)
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        match index {
            0 => Some(&self.head),
            i => self.tail.get(i - 1),
        }
    }

    /// Add an element to the end
    pub fn push(&mut self, value: T) {
        self.tail.push(value);
    }

    /// Remove the element at `index`; `None` when out of range or when it
    /// is the only element left
    pub fn remove(&mut self, index: usize) -> Option<T> {
        if index == 0 {
            if self.tail.is_empty() {
                return None;
            }
            let next = self.tail.remove(0);
            return Some(std::mem::replace(&mut self.head, next));
        }
        if index > self.tail.len() {
            return None;
        }
        Some(self.tail.remove(index - 1))
    }

    /// Get the length (always >= 1)
    pub fn len(&self) -> usize {
        1 + self.tail.len()
    }

    /// Iterator over all elements
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        std::iter::once(&self.head).chain(self.tail.iter())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> {
        std::iter::once(&mut self.head).chain(self.tail.iter_mut())
    }
}

impl<T> From<T> for NonEmptyVec<T> {
    fn from(head: T) -> Self {
        Self::new(head)
    }
}

impl<T> From<NonEmptyVec<T>> for Vec<T> {
    fn from(values: NonEmptyVec<T>) -> Self {
        let mut out = Vec::with_capacity(values.len());
        out.push(values.head);
        out.extend(values.tail);
        out
    }
}
