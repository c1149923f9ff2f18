//! Clamped scalar state.

/// A value held inside a closed `[min, max]` range.
///
/// Out-of-range input is never an error: [`BoundedValue::set`] clamps it
/// silently, so the stored value is always representable and in range.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundedValue<T> {
    min: T,
    max: T,
    value: T,
}

impl<T: PartialOrd + Copy> BoundedValue<T> {
    /// Create a store for `[min, max]`, clamping `initial` into range.
    ///
    /// Bounds given in the wrong order are swapped.
    pub fn new(min: T, max: T, initial: T) -> Self {
        let (min, max) = if min <= max { (min, max) } else { (max, min) };
        Self {
            min,
            max,
            value: clamp(initial, min, max),
        }
    }

    /// Store `raw` clamped into range. Returns `true` if the stored value changed.
    pub fn set(&mut self, raw: T) -> bool {
        let clamped = clamp(raw, self.min, self.max);
        let changed = self.value != clamped;
        self.value = clamped;
        changed
    }

    pub fn get(&self) -> T {
        self.value
    }

    pub fn min(&self) -> T {
        self.min
    }

    pub fn max(&self) -> T {
        self.max
    }
}

fn clamp<T: PartialOrd>(raw: T, min: T, max: T) -> T {
    if raw < min {
        min
    } else if raw > max {
        max
    } else {
        raw
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_clamps_into_range() {
        let mut store = BoundedValue::new(-4000i16, 10000, 0);
        for raw in [i16::MIN, -4001, -4000, -1, 0, 2150, 10000, 10001, i16::MAX] {
            store.set(raw);
            assert_eq!(store.get(), raw.clamp(-4000, 10000), "raw = {raw}");
        }
    }

    #[test]
    fn test_set_reports_change() {
        let mut store = BoundedValue::new(0u16, 10000, 0);
        assert!(store.set(5000));
        assert!(!store.set(5000));
        assert!(store.set(15000));
        assert_eq!(store.get(), 10000);
        // Still clamps to the same stored value
        assert!(!store.set(20000));
    }

    #[test]
    fn test_set_get_is_idempotent() {
        let mut store = BoundedValue::new(-4000i16, 10000, 1234);
        let current = store.get();
        assert!(!store.set(current));
        assert_eq!(store.get(), 1234);
    }

    #[test]
    fn test_new_clamps_initial_and_orders_bounds() {
        let store = BoundedValue::new(100u16, 0, 500);
        assert_eq!(store.min(), 0);
        assert_eq!(store.max(), 100);
        assert_eq!(store.get(), 100);
    }

    #[test]
    fn test_bool_range() {
        let mut store = BoundedValue::new(false, true, false);
        assert!(store.set(true));
        assert!(store.get());
        assert!(!store.set(true));
    }
}
