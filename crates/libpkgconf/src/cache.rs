//! Package cache for avoiding redundant `.pc` file lookups.
//!
//! The [`Cache`] struct provides an in-memory cache of loaded [`Package`]s,
//! keyed by their lookup identifier (e.g. `"zlib"`, `"glib-2.0"`). This
//! avoids re-parsing and re-resolving the same `.pc` file multiple times
//! during dependency graph resolution.
//!
//! # Virtual Package Registration
//!
//! The cache also supports preloading virtual packages (such as the built-in
//! `pkg-config` and `pkgconf` packages) via [`Cache::register()`].
//!
//! # Cache Bypass
//!
//! When the client's `NO_CACHE` flag is set, [`Cache::lookup()`] always
//! returns `None`, effectively disabling the cache while still allowing
//! packages to be registered for virtual package resolution.

use std::collections::HashMap;

use crate::client::{Client, ClientFlags};
use crate::error::Result;
use crate::pkg::{self, Package};

/// An in-memory cache of resolved packages.
///
/// Packages are stored by their lookup identifier and can be retrieved
/// without re-parsing their `.pc` files.
#[derive(Debug, Clone, Default)]
pub struct Cache {
    /// The package store, keyed by package id.
    packages: HashMap<String, Package>,
}

impl Cache {
    /// Create a new, empty cache.
    pub fn new() -> Self {
        Self {
            packages: HashMap::new(),
        }
    }

    /// Create a new cache pre-populated with the built-in virtual packages
    /// (`pkg-config` and `pkgconf`).
    pub fn with_builtins(client: &Client) -> Self {
        let mut cache = Self::new();
        cache.register(pkg::builtin_pkg_config(client));
        cache.register(pkg::builtin_pkgconf(client));
        cache
    }

    /// Look up a package by its identifier.
    ///
    /// Returns `None` if the package is not cached or if the client's
    /// `NO_CACHE` flag is set (unless the package is virtual, in which
    /// case it is always returned).
    pub fn lookup(&self, name: &str, client: &Client) -> Option<&Package> {
        let pkg = self.packages.get(name)?;

        // Virtual packages are always returned, even with NO_CACHE
        if pkg.is_virtual() {
            return Some(pkg);
        }

        // Respect NO_CACHE for non-virtual packages
        if client.flags().contains(ClientFlags::NO_CACHE) {
            return None;
        }

        Some(pkg)
    }

    /// Look up a package by its identifier, without checking client flags.
    ///
    /// This is useful for internal operations that need to check the cache
    /// regardless of the `NO_CACHE` flag.
    pub fn lookup_unchecked(&self, name: &str) -> Option<&Package> {
        self.packages.get(name)
    }

    /// Look up a package that provides the given name.
    ///
    /// Searches all cached packages to find one whose `Provides` list
    /// includes the requested name. Returns `None` if no provider is found.
    pub fn lookup_provider(&self, name: &str, client: &Client) -> Option<&Package> {
        for pkg in self.packages.values() {
            // Skip non-virtual packages if NO_CACHE is set
            if !pkg.is_virtual() && client.flags().contains(ClientFlags::NO_CACHE) {
                continue;
            }

            if pkg.satisfies_name(name) && pkg.id != name {
                return Some(pkg);
            }
        }
        None
    }

    /// Add a package to the cache.
    ///
    /// If a package with the same id already exists, it is replaced.
    /// The package's `CACHED` flag is set automatically.
    ///
    /// If the client's `NO_CACHE` flag is set, the package is still stored
    /// but will not be returned by [`lookup()`](Cache::lookup) unless it
    /// is virtual.
    pub fn add(&mut self, mut pkg: Package) {
        use crate::pkg::PackageFlags;
        pkg.flags = pkg.flags.set(PackageFlags::CACHED);
        self.packages.insert(pkg.id.clone(), pkg);
    }

    /// Register a virtual or preloaded package in the cache.
    ///
    /// This is equivalent to [`add()`](Cache::add) but makes the intent
    /// clearer for virtual packages and preloaded `.pc` files.
    pub fn register(&mut self, pkg: Package) {
        self.add(pkg);
    }

    /// Remove a package from the cache by id.
    ///
    /// Returns the removed package, or `None` if it was not cached.
    pub fn remove(&mut self, name: &str) -> Option<Package> {
        self.packages.remove(name)
    }

    /// Check if a package is present in the cache.
    pub fn contains(&self, name: &str) -> bool {
        self.packages.contains_key(name)
    }

    /// Get the number of cached packages.
    pub fn len(&self) -> usize {
        self.packages.len()
    }

    /// Check if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    /// Clear all non-virtual packages from the cache.
    ///
    /// Virtual packages (built-ins, preloaded) are preserved.
    pub fn clear_non_virtual(&mut self) {
        self.packages.retain(|_, pkg| pkg.is_virtual());
    }

    /// Clear the entire cache, including virtual packages.
    pub fn clear(&mut self) {
        self.packages.clear();
    }

    /// Iterate over all cached packages.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Package)> {
        self.packages.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Get all cached package ids.
    pub fn ids(&self) -> Vec<&str> {
        self.packages.keys().map(|s| s.as_str()).collect()
    }

    /// Find and load a package, using the cache if possible.
    ///
    /// This is the primary entry point for package resolution. It:
    ///
    /// 1. Checks the cache for the package (respecting `NO_CACHE`).
    /// 2. If not found, checks for a provider in the cache.
    /// 3. If still not found, searches the filesystem via [`Package::find()`].
    /// 4. Caches the loaded package for future lookups.
    ///
    /// Returns a reference to the cached package on success.
    pub fn find_or_load(&mut self, name: &str, client: &Client) -> Result<&Package> {
        // Check cache first
        if self.lookup(name, client).is_some() {
            // We need to return the reference, but the borrow checker won't let
            // us borrow from `self` while also potentially mutating it below.
            // So we use a key-based approach.
            return Ok(&self.packages[name]);
        }

        // Check if any cached package provides this name
        if let Some(provider_id) = self.lookup_provider(name, client).map(|p| p.id.clone()) {
            return Ok(&self.packages[&provider_id]);
        }

        // Load from the filesystem.
        // The package's id (derived from the .pc filename stem) may differ
        // from the query `name` (e.g. when `name` is a full path like
        // "/usr/lib/pkgconfig/foo.pc" but the id is "foo"). We store the
        // package under its canonical id, and if the query name differs,
        // we also store an alias so future lookups by the original name
        // will find it.
        let pkg = Package::find(client, name)?;
        let id = pkg.id.clone();
        self.add(pkg);

        // If the query name differs from the package id (e.g. a full path
        // was used), store an alias clone so the package can be found by
        // either key.
        if name != id
            && let Some(pkg) = self.packages.get(&id).cloned()
        {
            self.packages.insert(name.to_string(), pkg);
        }

        Ok(&self.packages[&id])
    }
}
