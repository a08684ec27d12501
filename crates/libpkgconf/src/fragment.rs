//! Compiler and linker flag fragment management.
//!
//! This module handles parsing, filtering, deduplication, and rendering of
//! compiler flags (`-I`, `-D`, etc.) and linker flags (`-L`, `-l`, etc.)
//! as used by pkg-config/pkgconf.
//!
//! Fragments are the individual pieces that make up a flags string. Each
//! fragment has a **type** (a single character like `I`, `L`, `l`, `D`, etc.)
//! and associated **data** (the path or value). Fragments without a recognized
//! type character are stored as "untyped" with type `\0`.
//!
//! The module supports:
//! - Parsing flags strings into fragment lists
//! - Filtering fragments (e.g. only `-I`, only `-L`, only `-l`)
//! - Deduplication with correct semantics (some flags like `-l` must keep
//!   last occurrence, while `-I` and `-L` keep first)
//! - System directory filtering (removing `-I/usr/include`, `-L/usr/lib`, etc.)
//! - Rendering fragment lists back to strings

use std::collections::HashSet;

/// A single compiler or linker flag fragment.
///
/// Each fragment consists of a type character and a data string.
/// For example, `-I/usr/include` has type `'I'` and data `"/usr/include"`,
/// while `-lfoo` has type `'l'` and data `"foo"`.
///
/// Fragments without a recognized type prefix (e.g. bare words or flags like
/// `-pthread`) have type `'\0'` (represented as `None` in the public API).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fragment {
    /// The fragment type character (`I`, `L`, `l`, `D`, etc.), or `\0` for untyped.
    frag_type: char,

    /// The data associated with this fragment (path, library name, define, etc.).
    pub data: String,

    /// Flags controlling fragment behaviour.
    pub flags: FragmentFlags,
}

impl Fragment {
    /// Create a new typed fragment.
    ///
    /// # Examples
    ///
    /// ```
    /// use libpkgconf::fragment::Fragment;
    ///
    /// let frag = Fragment::new('I', "/usr/include");
    /// assert_eq!(frag.frag_type(), Some('I'));
    /// assert_eq!(frag.data, "/usr/include");
    /// ```
    pub fn new(frag_type: char, data: impl Into<String>) -> Self {
        Self {
            frag_type,
            data: data.into(),
            flags: FragmentFlags::NONE,
        }
    }

    /// Create a new untyped fragment (for flags like `-pthread` or bare words).
    pub fn untyped(data: impl Into<String>) -> Self {
        Self {
            frag_type: '\0',
            data: data.into(),
            flags: FragmentFlags::NONE,
        }
    }

    /// Get the fragment type character, or `None` if untyped.
    pub fn frag_type(&self) -> Option<char> {
        if self.frag_type == '\0' {
            None
        } else {
            Some(self.frag_type)
        }
    }

    /// Get the raw type character (including `\0` for untyped).
    pub fn frag_type_raw(&self) -> char {
        self.frag_type
    }

    /// Check whether this fragment is typed.
    pub fn is_typed(&self) -> bool {
        self.frag_type != '\0'
    }

    /// Check whether this is an include-path fragment (`-I`).
    pub fn is_include(&self) -> bool {
        self.frag_type == 'I'
    }

    /// Check whether this is a library-path fragment (`-L`).
    pub fn is_lib_path(&self) -> bool {
        self.frag_type == 'L'
    }

    /// Check whether this is a library-name fragment (`-l`).
    pub fn is_lib_name(&self) -> bool {
        self.frag_type == 'l'
    }

    /// Check whether this is a define fragment (`-D`).
    pub fn is_define(&self) -> bool {
        self.frag_type == 'D'
    }

    /// Check whether this fragment refers to a system directory in the given
    /// filter lists.
    ///
    /// System directory fragments are typically filtered out by default to
    /// avoid interfering with the compiler's built-in search paths.
    pub fn has_system_dir(&self, system_libdirs: &[String], system_includedirs: &[String]) -> bool {
        match self.frag_type {
            'L' => is_path_in_list(&self.data, system_libdirs),
            'I' => is_path_in_list(&self.data, system_includedirs),
            _ => false,
        }
    }

    /// Render this fragment as a flag string (e.g. `-I/usr/include`, `-lfoo`).
    pub fn render(&self) -> String {
        match self.frag_type {
            '\0' => self.data.clone(),
            // `-framework Name` fragments already carry the full flag text.
            'f' => self.data.clone(),
            _ => format!("-{}{}", self.frag_type, self.data),
        }
    }

    /// Render this fragment, escaping spaces in the data with backslashes.
    pub fn render_escaped(&self) -> String {
        let escaped_data = escape_fragment_data(&self.data);
        match self.frag_type {
            '\0' => escaped_data,
            'f' => escaped_data,
            _ => format!("-{}{}", self.frag_type, escaped_data),
        }
    }

    /// Render this fragment using MSVC syntax.
    ///
    /// Translates GCC-style flags to their MSVC equivalents:
    /// - `-I<path>` → `/I<path>`
    /// - `-L<path>` → `/LIBPATH:<path>`
    /// - `-l<name>` → `<name>.lib`
    /// - `-D<def>`  → `/D<def>`
    /// - `-U<def>`  → `/U<def>`
    /// - Everything else is passed through unchanged.
    pub fn render_msvc(&self) -> String {
        match self.frag_type {
            'I' => format!("/I{}", self.data),
            'L' => format!("/LIBPATH:{}", self.data),
            'l' => format!("{}.lib", self.data),
            'D' => format!("/D{}", self.data),
            'U' => format!("/U{}", self.data),
            '\0' => self.data.clone(),
            _ => self.render(), // fall through for unknown types
        }
    }

    /// Render this fragment using MSVC syntax with escaped spaces.
    pub fn render_msvc_escaped(&self) -> String {
        let escaped_data = escape_fragment_data(&self.data);
        match self.frag_type {
            'I' => format!("/I{}", escaped_data),
            'L' => format!("/LIBPATH:{}", escaped_data),
            'l' => format!("{}.lib", escaped_data),
            'D' => format!("/D{}", escaped_data),
            'U' => format!("/U{}", escaped_data),
            '\0' => escaped_data,
            _ => self.render_escaped(), // fall through for unknown types
        }
    }

    /// Check whether this fragment type participates in merge/dedup at all.
    ///
    /// Only `-I`, `-L`, `-l`, `-D`, `-U`, and `-framework` (`f`) are
    /// mergeable. Everything else — including untyped free-form tokens like
    /// `-pthread` — is passed through by [`FragmentList::deduplicate`]
    /// unchanged, with order and duplicates both preserved.
    pub fn is_mergeable(&self) -> bool {
        matches!(self.frag_type, 'I' | 'L' | 'l' | 'D' | 'U' | 'f')
    }

    /// Check whether this fragment type should keep the *first* occurrence
    /// during deduplication.
    ///
    /// Include paths (`-I`) and library search paths (`-L`) keep the first
    /// occurrence to preserve priority ordering. Library names (`-l`) keep
    /// the *last* occurrence to satisfy link ordering requirements.
    pub fn keeps_first(&self) -> bool {
        matches!(self.frag_type, 'I' | 'L' | 'D' | 'f')
    }

    /// Check whether this fragment type should keep the *last* occurrence
    /// during deduplication.
    ///
    /// Only meaningful for mergeable types; non-mergeable fragments (untyped
    /// tokens) are never deduplicated regardless of this result.
    pub fn keeps_last(&self) -> bool {
        self.is_mergeable() && !self.keeps_first()
    }
}

impl std::fmt::Display for Fragment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.render())
    }
}

/// Flags that can be associated with a fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FragmentFlags(u32);

impl FragmentFlags {
    /// No flags.
    pub const NONE: Self = Self(0);
    /// Fragment has been terminated / finalized.
    pub const TERMINATED: Self = Self(0x1);

    /// Check if a flag is set.
    pub fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    /// Set a flag.
    pub fn with(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Unset a flag.
    pub fn without(self, other: Self) -> Self {
        Self(self.0 & !other.0)
    }
}

/// An ordered list of flag fragments.
///
/// This is the primary data structure for working with compiler and linker
/// flags. It supports parsing, filtering, deduplication, and rendering.
#[derive(Debug, Clone, Default)]
pub struct FragmentList {
    fragments: Vec<Fragment>,
}

impl FragmentList {
    /// Create a new empty fragment list.
    pub fn new() -> Self {
        Self {
            fragments: Vec::new(),
        }
    }

    /// Parse a flags string into a fragment list.
    ///
    /// The input is split on whitespace (respecting quoting), then each token
    /// is classified as a typed fragment (`-Ipath`, `-lfoo`, `-Ldir`, `-DFOO`)
    /// or an untyped fragment.
    ///
    /// # Examples
    ///
    /// ```
    /// use libpkgconf::fragment::FragmentList;
    ///
    /// let list = FragmentList::parse("-I/usr/include -lfoo -L/usr/lib -DBAR=1 -pthread");
    /// assert_eq!(list.len(), 5);
    /// ```
    pub fn parse(input: &str) -> Self {
        let mut list = Self::new();

        if input.trim().is_empty() {
            return list;
        }

        let tokens = split_flags(input);
        let mut iter = tokens.into_iter().peekable();

        while let Some(token) = iter.next() {
            if token == "-framework" {
                if let Some(name) = iter.next() {
                    list.fragments.push(Fragment::new('f', format!("{token} {name}")));
                } else {
                    list.fragments.push(Fragment::untyped(token));
                }
                continue;
            }
            list.add_token(&token);
        }

        list
    }

    /// Add a single flag token, classifying it as typed or untyped.
    fn add_token(&mut self, token: &str) {
        if token.len() < 2 || !token.starts_with('-') {
            // Not a flag or too short to be a typed flag
            if !token.is_empty() {
                self.fragments.push(Fragment::untyped(token));
            }
            return;
        }

        let type_char = token.as_bytes()[1] as char;

        // Recognized single-char flag types that take an argument concatenated
        // or in the same token
        match type_char {
            'I' | 'L' | 'l' | 'D' | 'U' | 'F' | 'W' => {
                let data = &token[2..];
                // Special case: `-l foo` is handled at tokenization time; here
                // we always expect concatenated form like `-lfoo`.
                // If data is empty but type is one that requires data, store the
                // flag as-is (untyped).
                if data.is_empty() && matches!(type_char, 'I' | 'L' | 'l' | 'D' | 'U') {
                    // Flag like `-I` with no path is unusual but we emit it as-is
                    self.fragments.push(Fragment::untyped(token));
                } else {
                    self.fragments.push(Fragment::new(type_char, data));
                }
            }
            // `-framework Name` (macOS) is merged into one fragment of type `f`
            // by the caller before add_token is reached; anything else
            // multi-character stays untyped.
            _ => {
                self.fragments.push(Fragment::untyped(token));
            }
        }
    }

    /// Add a pre-built fragment to the list.
    pub fn push(&mut self, fragment: Fragment) {
        self.fragments.push(fragment);
    }

    /// Insert a fragment at the beginning or end of the list.
    pub fn insert(&mut self, fragment: Fragment, at_tail: bool) {
        if at_tail {
            self.fragments.push(fragment);
        } else {
            self.fragments.insert(0, fragment);
        }
    }

    /// Remove a fragment at the given index.
    pub fn remove(&mut self, index: usize) -> Fragment {
        self.fragments.remove(index)
    }

    /// Get a reference to the fragment at the given index.
    pub fn get(&self, index: usize) -> Option<&Fragment> {
        self.fragments.get(index)
    }

    /// Return the number of fragments.
    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    /// Check if the list is empty.
    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Return a slice of all fragments.
    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }

    /// Return a mutable slice of all fragments.
    pub fn fragments_mut(&mut self) -> &mut [Fragment] {
        &mut self.fragments
    }

    /// Iterate over the fragments.
    pub fn iter(&self) -> impl Iterator<Item = &Fragment> {
        self.fragments.iter()
    }

    /// Iterate mutably over the fragments.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Fragment> {
        self.fragments.iter_mut()
    }

    /// Remove all fragments.
    pub fn clear(&mut self) {
        self.fragments.clear();
    }

    /// Append all fragments from another list.
    pub fn append(&mut self, other: &FragmentList) {
        self.fragments.extend(other.fragments.iter().cloned());
    }

    /// Copy all fragments from another list into this one.
    pub fn copy_from(&mut self, other: &FragmentList) {
        self.fragments.extend(other.fragments.iter().cloned());
    }

    /// Filter fragments, keeping only those for which the predicate returns `true`.
    pub fn filter<F>(&self, predicate: F) -> FragmentList
    where
        F: Fn(&Fragment) -> bool,
    {
        FragmentList {
            fragments: self
                .fragments
                .iter()
                .filter(|f| predicate(f))
                .cloned()
                .collect(),
        }
    }

    /// Filter out fragments that refer to system directories.
    ///
    /// This removes `-I` fragments pointing to system include directories and
    /// `-L` fragments pointing to system library directories, which is the
    /// default behaviour of pkg-config.
    pub fn filter_system_dirs(
        &self,
        system_libdirs: &[String],
        system_includedirs: &[String],
    ) -> FragmentList {
        self.filter(|f| !f.has_system_dir(system_libdirs, system_includedirs))
    }

    /// Filter to only include `-I` fragments.
    pub fn filter_cflags_only_i(&self) -> FragmentList {
        self.filter(|f| f.frag_type == 'I')
    }

    /// Filter to only include non-`-I` cflags fragments.
    pub fn filter_cflags_only_other(&self) -> FragmentList {
        self.filter(|f| f.frag_type != 'I')
    }

    /// Filter to only include `-L` fragments.
    pub fn filter_libs_only_ldpath(&self) -> FragmentList {
        self.filter(|f| f.frag_type == 'L')
    }

    /// Filter to only include `-l` fragments.
    pub fn filter_libs_only_libname(&self) -> FragmentList {
        self.filter(|f| f.frag_type == 'l')
    }

    /// Filter to only include non-`-L`, non-`-l` lib fragments.
    pub fn filter_libs_only_other(&self) -> FragmentList {
        self.filter(|f| f.frag_type != 'L' && f.frag_type != 'l')
    }

    /// Filter fragments to only those whose type character is in the given set.
    ///
    /// This corresponds to pkgconf's `--fragment-filter` option.
    pub fn filter_by_types(&self, types: &str) -> FragmentList {
        self.filter(|f| {
            if let Some(t) = f.frag_type() {
                types.contains(t)
            } else {
                // Untyped fragments are included if the filter string is empty
                // or contains '\0'. In practice, untyped fragments are usually
                // excluded by type filters.
                false
            }
        })
    }

    /// Deduplicate fragments.
    ///
    /// Only mergeable types participate:
    /// - For types that "keep first" (`-I`, `-L`, `-D`, `-framework`): the
    ///   first occurrence is kept and subsequent duplicates are removed.
    /// - For types that "keep last" (`-l`, `-U`): the last occurrence is
    ///   kept and earlier duplicates are removed.
    ///
    /// Non-mergeable fragments — untyped free-form tokens like `-pthread` —
    /// are passed through unchanged, in their original order, duplicates and
    /// all, per pkgconf's "no dedup for free-form tokens" rule.
    pub fn deduplicate(&self) -> FragmentList {
        let mut result = Vec::new();

        // For "keeps first" types, track what we've already seen
        let mut seen_first: HashSet<(char, String)> = HashSet::new();
        // For "keeps last" types, we need to know the last occurrence index
        let mut last_occurrence: std::collections::HashMap<(char, String), usize> =
            std::collections::HashMap::new();

        // First pass: find last occurrence of each "keeps last" fragment
        for (i, frag) in self.fragments.iter().enumerate() {
            if frag.keeps_last() {
                let key = (frag.frag_type, frag.data.clone());
                last_occurrence.insert(key, i);
            }
        }

        // Second pass: build deduplicated list
        for (i, frag) in self.fragments.iter().enumerate() {
            if !frag.is_mergeable() {
                // Free-form tokens are never deduplicated or reordered.
                result.push(frag.clone());
                continue;
            }

            let key = (frag.frag_type, frag.data.clone());

            if frag.keeps_first() {
                if seen_first.insert(key) {
                    result.push(frag.clone());
                }
            } else {
                // Keep only the last occurrence
                if last_occurrence.get(&key) == Some(&i) {
                    result.push(frag.clone());
                }
            }
        }

        FragmentList { fragments: result }
    }

    /// Apply a sysroot prefix to all `-I` and `-L` path fragments.
    ///
    /// For each fragment with type `I` (include path) or `L` (library path),
    /// if the path is absolute and does not already start with the sysroot,
    /// the sysroot is prepended.
    ///
    /// This implements the sysroot path rewriting that pkgconf performs
    /// when `PKG_CONFIG_SYSROOT_DIR` is set or `--define-prefix` is used
    /// with a cross-compilation sysroot.
    ///
    /// # Arguments
    ///
    /// * `sysroot` — The sysroot directory to prepend (e.g. `/usr/x86_64-linux-gnu`).
    ///
    /// # Example
    ///
    /// ```
    /// use libpkgconf::fragment::FragmentList;
    ///
    /// let mut list = FragmentList::parse("-I/usr/include -L/usr/lib -lz");
    /// list.apply_sysroot("/cross");
    /// assert_eq!(list.render(' '), "-I/cross/usr/include -L/cross/usr/lib -lz");
    /// ```
    pub fn apply_sysroot(&mut self, sysroot: &str) {
        if sysroot.is_empty() {
            return;
        }
        for frag in &mut self.fragments {
            match frag.frag_type {
                'I' | 'L' => {
                    if frag.data.starts_with('/') && !frag.data.starts_with(sysroot) {
                        frag.data = format!("{sysroot}{}", frag.data);
                    }
                }
                _ => {}
            }
        }
    }

    /// Apply FDO sysroot rules to `-I` and `-L` path fragments.
    ///
    /// Under FDO sysroot rules (`PKG_CONFIG_FDO_SYSROOT_RULES`), the sysroot
    /// is prepended to all absolute paths in `-I` and `-L` fragments, similar
    /// to [`apply_sysroot()`](FragmentList::apply_sysroot), but the sysroot
    /// is always prepended even if the path already starts with the sysroot
    /// prefix. This matches the freedesktop.org specification behavior.
    ///
    /// # Arguments
    ///
    /// * `sysroot` — The sysroot directory to prepend.
    pub fn apply_sysroot_fdo(&mut self, sysroot: &str) {
        if sysroot.is_empty() {
            return;
        }
        for frag in &mut self.fragments {
            match frag.frag_type {
                'I' | 'L' => {
                    if frag.data.starts_with('/') {
                        frag.data = format!("{sysroot}{}", frag.data);
                    }
                }
                _ => {}
            }
        }
    }

    /// Render the fragment list as a single string.
    ///
    /// Fragments are joined by the given delimiter (typically `' '` or `'\n'`).
    pub fn render(&self, delimiter: char) -> String {
        self.fragments
            .iter()
            .map(|f| f.render())
            .collect::<Vec<_>>()
            .join(&delimiter.to_string())
    }

    /// Render the fragment list with escaped spaces in data.
    pub fn render_escaped(&self, delimiter: char) -> String {
        self.fragments
            .iter()
            .map(|f| f.render_escaped())
            .collect::<Vec<_>>()
            .join(&delimiter.to_string())
    }

    /// Render the fragment list using MSVC syntax.
    ///
    /// Translates GCC-style flags to MSVC equivalents:
    /// - `-I` → `/I`
    /// - `-L` → `/LIBPATH:`
    /// - `-l` → `<name>.lib`
    /// - `-D` → `/D`
    pub fn render_msvc(&self, delimiter: char) -> String {
        self.fragments
            .iter()
            .map(|f| f.render_msvc())
            .collect::<Vec<_>>()
            .join(&delimiter.to_string())
    }

    /// Render the fragment list using MSVC syntax with escaped spaces.
    pub fn render_msvc_escaped(&self, delimiter: char) -> String {
        self.fragments
            .iter()
            .map(|f| f.render_msvc_escaped())
            .collect::<Vec<_>>()
            .join(&delimiter.to_string())
    }

    /// Compute the total rendered length (for pre-allocation).
    pub fn render_len(&self, escaped: bool) -> usize {
        if self.fragments.is_empty() {
            return 0;
        }

        let mut total = 0;
        for (i, frag) in self.fragments.iter().enumerate() {
            if i > 0 {
                total += 1; // delimiter
            }
            if escaped {
                total += frag.render_escaped().len();
            } else {
                total += frag.render().len();
            }
        }
        total
    }
}

impl IntoIterator for FragmentList {
    type Item = Fragment;
    type IntoIter = std::vec::IntoIter<Fragment>;

    fn into_iter(self) -> Self::IntoIter {
        self.fragments.into_iter()
    }
}

impl<'a> IntoIterator for &'a FragmentList {
    type Item = &'a Fragment;
    type IntoIter = std::slice::Iter<'a, Fragment>;

    fn into_iter(self) -> Self::IntoIter {
        self.fragments.iter()
    }
}

impl FromIterator<Fragment> for FragmentList {
    fn from_iter<I: IntoIterator<Item = Fragment>>(iter: I) -> Self {
        Self {
            fragments: iter.into_iter().collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Helper functions
// ---------------------------------------------------------------------------

/// Check if a path (possibly with trailing slash normalization) matches any
/// entry in a directory list.
fn is_path_in_list(path: &str, dirs: &[String]) -> bool {
    let normalized = normalize_path(path);
    for dir in dirs {
        let normalized_dir = normalize_path(dir);
        if normalized == normalized_dir {
            return true;
        }
    }
    false
}

/// Normalize a path string by removing trailing slashes (but keeping root `/`).
fn normalize_path(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() { "/" } else { trimmed }
}

/// Escape whitespace in fragment data with backslashes.
fn escape_fragment_data(data: &str) -> String {
    let mut result = String::with_capacity(data.len());
    for c in data.chars() {
        if c == ' ' || c == '\t' {
            result.push('\\');
        }
        result.push(c);
    }
    result
}

/// Split a flags string into tokens, respecting quoting and backslash escapes.
///
/// This handles:
/// - Single-quoted strings: `'path with spaces'`
/// - Double-quoted strings: `"path with spaces"`
/// - Backslash-escaped spaces: `path\ with\ spaces`
/// - Whitespace delimiters (space, tab, newline)
fn split_flags(input: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut chars = input.chars().peekable();
    let mut in_single_quote = false;
    let mut in_double_quote = false;

    while let Some(c) = chars.next() {
        if in_single_quote {
            if c == '\'' {
                in_single_quote = false;
            } else {
                current.push(c);
            }
        } else if in_double_quote {
            if c == '"' {
                in_double_quote = false;
            } else if c == '\\' {
                if let Some(&next) = chars.peek() {
                    match next {
                        '"' | '\\' | '$' | '`' => {
                            current.push(chars.next().unwrap());
                        }
                        _ => {
                            current.push('\\');
                        }
                    }
                } else {
                    current.push('\\');
                }
            } else {
                current.push(c);
            }
        } else {
            match c {
                '\'' => {
                    in_single_quote = true;
                }
                '"' => {
                    in_double_quote = true;
                }
                '\\' => {
                    if let Some(next) = chars.next() {
                        current.push(next);
                    }
                }
                c if c.is_ascii_whitespace() => {
                    if !current.is_empty() {
                        tokens.push(std::mem::take(&mut current));
                    }
                }
                _ => {
                    current.push(c);
                }
            }
        }
    }

    if !current.is_empty() {
        tokens.push(current);
    }

    tokens
}
