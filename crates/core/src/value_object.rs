//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects are **immutable** and **compared by value**: two `Money`
/// amounts of `1050` are the same amount no matter which line or total they
/// came from. To "modify" one, compute a new one.
///
/// ```ignore
/// let a = Money::from_major(1000) + Money::from_major(50);
/// assert_eq!(a, Money::from_major(1050));
/// ```
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
