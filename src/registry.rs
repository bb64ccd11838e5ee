//! Region name <-> token registry.
//!
//! Every region gets a consecutive start/end token pair the first time its
//! name is seen. Both directions live behind a single lock so they can never
//! disagree, and tokens come from a monotonic counter so a token is never
//! handed to a second name, even after [`Registry::forget`].

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::area::Role;
use crate::marker::Token;

/// The pair of tokens identifying one region inside markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RegionTokens {
    pub start: Token,
    pub end: Token,
}

impl RegionTokens {
    pub fn token(&self, role: Role) -> Token {
        match role {
            Role::Start => self.start,
            Role::End => self.end,
        }
    }
}

#[derive(Debug, Default)]
struct Maps {
    /// Last allocated token value.
    last: u64,
    by_name: HashMap<Arc<str>, RegionTokens>,
    by_token: HashMap<Token, (Arc<str>, Role)>,
}

/// Thread-safe bidirectional registry.
#[derive(Debug)]
pub struct Registry {
    maps: RwLock<Maps>,
}

impl Registry {
    /// Create a registry whose first token is `token_base + 1`.
    pub fn new(token_base: u64) -> Self {
        Self {
            maps: RwLock::new(Maps {
                last: token_base,
                ..Maps::default()
            }),
        }
    }

    /// Tokens for `name`, allocating them on first use.
    pub fn intern(&self, name: &str) -> RegionTokens {
        if let Some(tokens) = self.read().by_name.get(name) {
            return *tokens;
        }

        let mut maps = self.write();
        // Another caller may have won the race between the two locks.
        if let Some(tokens) = maps.by_name.get(name) {
            return *tokens;
        }

        let tokens = RegionTokens {
            start: Token::new(maps.last + 1),
            end: Token::new(maps.last + 2),
        };
        maps.last += 2;

        tracing::trace!("Interned region {:?} as {}/{}", name, tokens.start, tokens.end);

        let name: Arc<str> = Arc::from(name);
        maps.by_token
            .insert(tokens.start, (Arc::clone(&name), Role::Start));
        maps.by_token.insert(tokens.end, (Arc::clone(&name), Role::End));
        maps.by_name.insert(name, tokens);

        tokens
    }

    /// Tokens for `name` without allocating.
    pub fn lookup(&self, name: &str) -> Option<RegionTokens> {
        self.read().by_name.get(name).copied()
    }

    /// Region name and role a token stands for.
    pub fn resolve(&self, token: Token) -> Option<(Arc<str>, Role)> {
        self.read().by_token.get(&token).cloned()
    }

    /// Resolve `token` and run `f` on the result while the registry is still
    /// read-locked, so a concurrent [`forget_and`](Self::forget_and) cannot
    /// slip in between.
    pub fn resolve_and<R, F>(&self, token: Token, f: F) -> Option<R>
    where
        F: FnOnce(&Arc<str>, Role) -> R,
    {
        let maps = self.read();
        let (name, role) = maps.by_token.get(&token)?;
        Some(f(name, *role))
    }

    /// Drop both directions for `name`. Returns false if it was not registered.
    pub fn forget(&self, name: &str) -> bool {
        self.forget_and(name, || {})
    }

    /// [`forget`](Self::forget), running `release` under the same write lock.
    ///
    /// `release` runs whether or not `name` was registered.
    pub fn forget_and<F>(&self, name: &str, release: F) -> bool
    where
        F: FnOnce(),
    {
        let mut maps = self.write();
        let registered = match maps.by_name.remove(name) {
            Some(tokens) => {
                maps.by_token.remove(&tokens.start);
                maps.by_token.remove(&tokens.end);
                true
            }
            None => false,
        };
        release();
        registered
    }

    /// Number of registered regions.
    pub fn len(&self) -> usize {
        self.read().by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read(&self) -> RwLockReadGuard<'_, Maps> {
        self.maps.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Maps> {
        self.maps.write().unwrap_or_else(PoisonError::into_inner)
    }
}
