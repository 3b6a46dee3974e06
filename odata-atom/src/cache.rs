//! Per-node memoization of DOM-derived properties.
//!
//! Every typed node owns one `PropertyCache`. An entry is either absent (not
//! yet computed) or holds the computed value. "No value found" is a computed
//! value too: properties that may legitimately be missing are cached as
//! `Option<T>`, so a `None` result is not recomputed.
//!
//! The cache is only consistent with the DOM as long as mutations go through
//! the typed accessors, which use [`PropertyCache::write_through`]. Editing
//! the DOM directly bypasses it and may leave stale entries.

use std::any::Any;
use std::cell::RefCell;
use std::collections::HashMap;

use tracing::trace;

use crate::error::Result;

/// Memoized property values keyed by property name.
#[derive(Default)]
pub struct PropertyCache {
    cells: RefCell<HashMap<String, Box<dyn Any>>>,
}

impl PropertyCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached value for `name`, computing and storing it first if
    /// it is absent.
    ///
    /// `compute` runs at most once per name until the entry is overwritten or
    /// invalidated. It may read other cached properties of the same node or
    /// re-enter the extension registry; the cache is not borrowed while it
    /// runs. If `compute` fails, the error is returned and nothing is cached.
    pub fn get_cached_property<T, F>(&self, name: &str, compute: F) -> Result<T>
    where
        T: Clone + 'static,
        F: FnOnce() -> Result<T>,
    {
        if let Some(value) = self.get::<T>(name) {
            trace!(property = name, "cache hit");
            return Ok(value);
        }
        trace!(property = name, "cache miss");
        let value = compute()?;
        self.set_cached_property(name, value.clone());
        Ok(value)
    }

    /// Overwrites the cached value for `name`. Does not touch the DOM.
    pub fn set_cached_property<T: 'static>(&self, name: &str, value: T) {
        self.cells
            .borrow_mut()
            .insert(name.to_string(), Box::new(value));
    }

    /// Runs a DOM mutation and stores the value it produces as the new value
    /// of `name`, returning it.
    ///
    /// If the mutation fails the cache entry is dropped, since the DOM may be
    /// partially modified and the old value can no longer be trusted.
    pub fn write_through<T, F>(&self, name: &str, mutate: F) -> Result<T>
    where
        T: Clone + 'static,
        F: FnOnce() -> Result<T>,
    {
        self.write_through_with(name, || {
            let value = mutate()?;
            Ok((value.clone(), value))
        })
    }

    /// Like [`PropertyCache::write_through`], for mutations whose result is
    /// not the stored value itself. `mutate` returns the new value of `name`
    /// and the result handed back to the caller.
    pub fn write_through_with<T, R, F>(&self, name: &str, mutate: F) -> Result<R>
    where
        T: 'static,
        F: FnOnce() -> Result<(T, R)>,
    {
        match mutate() {
            Ok((value, result)) => {
                self.set_cached_property(name, value);
                Ok(result)
            }
            Err(e) => {
                self.invalidate(name);
                Err(e)
            }
        }
    }

    /// Drops the cached value for `name`, forcing the next read to recompute.
    pub fn invalidate(&self, name: &str) {
        self.cells.borrow_mut().remove(name);
    }

    /// Drops every cached value.
    pub fn clear(&self) {
        self.cells.borrow_mut().clear();
    }

    /// Returns true if a value for `name` is cached.
    pub fn contains(&self, name: &str) -> bool {
        self.cells.borrow().contains_key(name)
    }

    /// Returns a clone of the cached value, if present with type `T`.
    fn get<T: Clone + 'static>(&self, name: &str) -> Option<T> {
        self.cells
            .borrow()
            .get(name)
            .and_then(|v| v.downcast_ref::<T>())
            .cloned()
    }
}

impl std::fmt::Debug for PropertyCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let cells = self.cells.borrow();
        let mut names: Vec<&String> = cells.keys().collect();
        names.sort();
        f.debug_struct("PropertyCache")
            .field("cached", &names)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::cell::Cell;

    #[test]
    fn test_compute_runs_once() {
        let cache = PropertyCache::new();
        let calls = Cell::new(0);
        let compute = || {
            calls.set(calls.get() + 1);
            Ok("Products".to_string())
        };

        assert_eq!(cache.get_cached_property("title", compute).unwrap(), "Products");
        assert_eq!(cache.get_cached_property("title", compute).unwrap(), "Products");
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_no_value_is_cached() {
        let cache = PropertyCache::new();
        let calls = Cell::new(0);
        let compute = || {
            calls.set(calls.get() + 1);
            Ok(None::<String>)
        };

        assert_eq!(cache.get_cached_property("feed", compute).unwrap(), None);
        assert_eq!(cache.get_cached_property("feed", compute).unwrap(), None);
        assert_eq!(calls.get(), 1);
        assert!(cache.contains("feed"));
    }

    #[test]
    fn test_failed_compute_is_not_cached() {
        let cache = PropertyCache::new();
        let failed: Result<String> =
            cache.get_cached_property("id", || Err(Error::malformed("no id")));
        assert!(matches!(failed, Err(Error::MalformedNode(_))));
        assert!(!cache.contains("id"));

        let recovered = cache.get_cached_property("id", || Ok("urn:1".to_string()));
        assert_eq!(recovered.unwrap(), "urn:1");
    }

    #[test]
    fn test_set_overrides_without_compute() {
        let cache = PropertyCache::new();
        cache.set_cached_property("title", "new".to_string());
        let value: String = cache
            .get_cached_property("title", || panic!("must not recompute"))
            .unwrap();
        assert_eq!(value, "new");
    }

    #[test]
    fn test_write_through() {
        let cache = PropertyCache::new();
        let dom = Cell::new(0);

        let stored = cache
            .write_through("count", || {
                dom.set(5);
                Ok(5_i32)
            })
            .unwrap();
        assert_eq!(stored, 5);
        assert_eq!(dom.get(), 5);
        let count: i32 = cache.get_cached_property("count", || Ok(0)).unwrap();
        assert_eq!(count, 5);

        let failed: Result<i32> = cache.write_through("count", || Err(Error::malformed("boom")));
        assert!(failed.is_err());
        assert!(!cache.contains("count"));
    }

    #[test]
    fn test_write_through_with_separate_result() {
        let cache = PropertyCache::new();
        cache.set_cached_property("entries", vec!["urn:1".to_string()]);

        let added = cache
            .write_through_with("entries", || {
                Ok((vec!["urn:1".to_string(), "urn:2".to_string()], "urn:2"))
            })
            .unwrap();
        assert_eq!(added, "urn:2");
        let entries: Vec<String> = cache
            .get_cached_property("entries", || panic!("must not recompute"))
            .unwrap();
        assert_eq!(entries.len(), 2);

        let failed: Result<&str> = cache.write_through_with("entries", || {
            Err::<(Vec<String>, _), _>(Error::malformed("boom"))
        });
        assert!(failed.is_err());
        assert!(!cache.contains("entries"));
    }

    #[test]
    fn test_clear() {
        let cache = PropertyCache::new();
        cache.set_cached_property("id", "urn:1".to_string());
        cache.set_cached_property("title", "t".to_string());
        cache.clear();
        assert!(!cache.contains("id"));
        assert!(!cache.contains("title"));
    }

    #[test]
    fn test_reentrant_compute() {
        let cache = PropertyCache::new();
        let outer: String = cache
            .get_cached_property("outer", || {
                let inner: String = cache.get_cached_property("inner", || Ok("in".to_string()))?;
                Ok(format!("{}-out", inner))
            })
            .unwrap();
        assert_eq!(outer, "in-out");
        assert!(cache.contains("inner"));
    }

    #[test]
    fn test_invalidate() {
        let cache = PropertyCache::new();
        cache.set_cached_property("a", 1_u8);
        cache.invalidate("a");
        assert!(!cache.contains("a"));
        assert_eq!(format!("{:?}", cache), "PropertyCache { cached: [] }");
    }
}
