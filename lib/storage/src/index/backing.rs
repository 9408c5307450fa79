use dashmap::DashMap;
use rustc_hash::{FxHashMap, FxHasher};
use std::hash::{BuildHasherDefault, Hash};

/// A hash map that is either a plain [FxHashMap] or a sharded [DashMap].
///
/// The variant is chosen once when the map is created and is used by all indices of a
/// [QuadCollection](crate::QuadCollection) and by the [ChangeJournal](crate::ChangeJournal).
#[derive(Debug)]
pub(crate) enum BackingMap<K: Eq + Hash, V> {
    Plain(FxHashMap<K, V>),
    Concurrent(DashMap<K, V, BuildHasherDefault<FxHasher>>),
}

impl<K: Eq + Hash, V> BackingMap<K, V> {
    /// Creates a new empty [BackingMap].
    pub fn new(thread_safe: bool) -> Self {
        if thread_safe {
            Self::Concurrent(DashMap::with_hasher(BuildHasherDefault::default()))
        } else {
            Self::Plain(FxHashMap::default())
        }
    }

    pub fn is_concurrent(&self) -> bool {
        matches!(self, Self::Concurrent(_))
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Plain(map) => map.len(),
            Self::Concurrent(map) => map.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains_key(&self, key: &K) -> bool {
        match self {
            Self::Plain(map) => map.contains_key(key),
            Self::Concurrent(map) => map.contains_key(key),
        }
    }

    /// Applies `f` to the value of `key`, if present.
    pub fn with<R>(&self, key: &K, f: impl FnOnce(&V) -> R) -> Option<R> {
        match self {
            Self::Plain(map) => map.get(key).map(f),
            Self::Concurrent(map) => map.get(key).map(|entry| f(entry.value())),
        }
    }

    /// Applies `f` to the value of `key`. The value is created if it does not exist yet.
    pub fn upsert<R>(&mut self, key: K, f: impl FnOnce(&mut V) -> R) -> R
    where
        V: Default,
    {
        match self {
            Self::Plain(map) => f(map.entry(key).or_default()),
            Self::Concurrent(map) => f(map.entry(key).or_default().value_mut()),
        }
    }

    /// Applies `f` to the value of `key`, if present. The entry is removed if `f` leaves the
    /// value in a state for which `is_vacant` holds.
    pub fn modify<R>(
        &mut self,
        key: &K,
        f: impl FnOnce(&mut V) -> R,
        is_vacant: impl FnOnce(&V) -> bool,
    ) -> Option<R> {
        let (result, vacant) = match self {
            Self::Plain(map) => {
                let value = map.get_mut(key)?;
                let result = f(value);
                (result, is_vacant(value))
            }
            Self::Concurrent(map) => {
                let mut value = map.get_mut(key)?;
                let result = f(value.value_mut());
                (result, is_vacant(value.value()))
            }
        };

        if vacant {
            self.remove(key);
        }
        Some(result)
    }

    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        match self {
            Self::Plain(map) => map.insert(key, value),
            Self::Concurrent(map) => map.insert(key, value),
        }
    }

    pub fn remove(&mut self, key: &K) -> Option<V> {
        match self {
            Self::Plain(map) => map.remove(key),
            Self::Concurrent(map) => map.remove(key).map(|(_, value)| value),
        }
    }

    pub fn clear(&mut self) {
        match self {
            Self::Plain(map) => map.clear(),
            Self::Concurrent(map) => map.clear(),
        }
    }

    /// Calls `f` for every entry. The order is unspecified.
    pub fn for_each(&self, mut f: impl FnMut(&K, &V)) {
        match self {
            Self::Plain(map) => {
                for (key, value) in map {
                    f(key, value);
                }
            }
            Self::Concurrent(map) => {
                for entry in map {
                    f(entry.key(), entry.value());
                }
            }
        }
    }

    /// Removes all entries and returns them. The order is unspecified.
    pub fn drain(&mut self) -> Vec<(K, V)> {
        match self {
            Self::Plain(map) => map.drain().collect(),
            Self::Concurrent(map) => std::mem::take(map).into_iter().collect(),
        }
    }
}

impl<K: Eq + Hash + Clone, V> BackingMap<K, V> {
    pub fn keys(&self) -> Vec<K> {
        let mut keys = Vec::with_capacity(self.len());
        self.for_each(|key, _| keys.push(key.clone()));
        keys
    }
}

impl<K: Eq + Hash + Clone, V: Clone> Clone for BackingMap<K, V> {
    fn clone(&self) -> Self {
        match self {
            Self::Plain(map) => Self::Plain(map.clone()),
            Self::Concurrent(map) => Self::Concurrent(map.clone()),
        }
    }
}
