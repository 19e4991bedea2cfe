mod non_empty;

pub use non_empty::NonEmptyVec;
