use serde::Deserialize;
use std::{
    collections::{BTreeMap, BTreeSet},
    fmt::Display,
    ops::{BitOr, BitOrAssign},
};

/// Helpers that every compilation treats as known.
pub const BUILTIN_HELPERS: [&str; 8] = [
    "helperMissing",
    "blockHelperMissing",
    "each",
    "if",
    "unless",
    "with",
    "log",
    "lookup",
];

/// Bitset of compile flags.
///
/// The numeric values are stable. [`Flags::COMPAT`] and [`Flags::USE_DEPTHS`]
/// share the same bit, so they can not be toggled independently.
///
/// # Examples
///
/// ```
/// use stache::Flags;
///
/// let flags = Flags::STRING_PARAMS | Flags::TRACK_IDS;
/// assert_eq!(flags.bits(), 6);
/// assert!(flags.contains(Flags::TRACK_IDS));
/// assert!(Flags::COMPAT.contains(Flags::USE_DEPTHS));
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Flags(u32);

impl Flags {
    pub const NONE: Flags = Flags(0);
    pub const USE_DEPTHS: Flags = Flags(1 << 0);
    pub const COMPAT: Flags = Flags(1 << 0);
    pub const STRING_PARAMS: Flags = Flags(1 << 1);
    pub const TRACK_IDS: Flags = Flags(1 << 2);
    pub const KNOWN_HELPERS_ONLY: Flags = Flags(1 << 4);
    /// Every bit below [`Flags::KNOWN_HELPERS_ONLY`].
    pub const ALL: Flags = Flags((1 << 4) - 1);

    /// Create [`Flags`] from raw bits, keeping bits without a name.
    #[inline]
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// Return the raw bits.
    #[inline]
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Return true if every bit of `other` is set.
    #[inline]
    pub const fn contains(self, other: Flags) -> bool {
        self.0 & other.0 == other.0
    }

    /// Return true if no bits are set.
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for Flags {
    type Output = Flags;

    fn bitor(self, rhs: Self) -> Self::Output {
        Flags(self.0 | rhs.0)
    }
}

impl BitOrAssign for Flags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl From<u32> for Flags {
    fn from(value: u32) -> Self {
        Self::from_bits(value)
    }
}

impl Display for Flags {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names = [
            (Flags::USE_DEPTHS, "USE_DEPTHS"),
            (Flags::STRING_PARAMS, "STRING_PARAMS"),
            (Flags::TRACK_IDS, "TRACK_IDS"),
            (Flags::KNOWN_HELPERS_ONLY, "KNOWN_HELPERS_ONLY"),
        ];
        let set: Vec<&str> = names
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .collect();

        match set.is_empty() {
            true => write!(f, "NONE"),
            false => write!(f, "{}", set.join(" | ")),
        }
    }
}

/// Settings that affect code generation.
///
/// Lexing and parsing never depend on [`Options`].
///
/// # Examples
///
/// ```
/// use stache::{Flags, Options};
///
/// let options = Options::new()
///     .with_flags(Flags::KNOWN_HELPERS_ONLY)
///     .with_known_helper("format");
///
/// assert!(options.is_known_helper("format"));
/// assert!(options.is_known_helper("each"));
/// assert!(!options.is_known_helper("missing"));
/// ```
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Options {
    flags: Flags,
    /// Helper names declared by the caller, in addition to the builtins.
    known_helpers: BTreeSet<String>,
}

impl Options {
    /// Create a new [`Options`] with no flags and no known helpers beyond
    /// the builtins.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the [`Flags`], replacing any previous value.
    pub fn with_flags(mut self, flags: Flags) -> Self {
        self.set_flags(flags);

        self
    }

    /// Set the [`Flags`], replacing any previous value.
    pub fn set_flags(&mut self, flags: Flags) {
        self.flags = flags;
    }

    /// Declare a helper as known.
    pub fn with_known_helper<T>(mut self, name: T) -> Self
    where
        T: Into<String>,
    {
        self.set_known_helper(name);

        self
    }

    /// Declare each of the given helpers as known.
    pub fn with_known_helpers<I, T>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        for name in names {
            self.set_known_helper(name);
        }

        self
    }

    /// Declare a helper as known.
    ///
    /// Builtin helpers are always known and can not be removed.
    pub fn set_known_helper<T>(&mut self, name: T)
    where
        T: Into<String>,
    {
        self.known_helpers.insert(name.into());
    }

    /// Return the [`Flags`].
    #[inline]
    pub fn flags(&self) -> Flags {
        self.flags
    }

    /// Return true if the given flag is set.
    #[inline]
    pub fn has(&self, flag: Flags) -> bool {
        self.flags.contains(flag)
    }

    /// Return the helper names declared by the caller.
    pub fn known_helpers(&self) -> &BTreeSet<String> {
        &self.known_helpers
    }

    /// Return true if the helper is a builtin or declared by the caller.
    pub fn is_known_helper(&self, name: &str) -> bool {
        self.known_helpers.contains(name) || BUILTIN_HELPERS.contains(&name)
    }
}

/// Compile options as they appear in Handlebars conformance fixtures.
///
/// Unrecognized fields are ignored.
///
/// # Examples
///
/// ```
/// use stache::{FixtureOptions, Flags, Options};
///
/// let fixture: FixtureOptions =
///     serde_json::from_str(r#"{"knownHelpersOnly": true, "knownHelpers": {"foo": true}}"#).unwrap();
/// let options = Options::from(fixture);
///
/// assert!(options.has(Flags::KNOWN_HELPERS_ONLY));
/// assert!(options.is_known_helper("foo"));
/// ```
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FixtureOptions {
    pub compat: Option<bool>,
    pub use_depths: Option<bool>,
    pub string_params: Option<bool>,
    pub track_ids: Option<bool>,
    pub known_helpers_only: Option<bool>,
    /// Every key is declared as known, whatever its value.
    pub known_helpers: Option<BTreeMap<String, bool>>,
}

impl FixtureOptions {
    /// Merge `over` on top of these options, preferring fields set in `over`.
    ///
    /// Fixtures carry both `compileOptions` and `options`, the latter wins.
    pub fn merge(self, over: FixtureOptions) -> Self {
        Self {
            compat: over.compat.or(self.compat),
            use_depths: over.use_depths.or(self.use_depths),
            string_params: over.string_params.or(self.string_params),
            track_ids: over.track_ids.or(self.track_ids),
            known_helpers_only: over.known_helpers_only.or(self.known_helpers_only),
            known_helpers: over.known_helpers.or(self.known_helpers),
        }
    }

    /// Return the [`Flags`] described by these options.
    pub fn flags(&self) -> Flags {
        let mut flags = Flags::NONE;
        for (set, flag) in [
            (self.compat, Flags::COMPAT),
            (self.use_depths, Flags::USE_DEPTHS),
            (self.string_params, Flags::STRING_PARAMS),
            (self.track_ids, Flags::TRACK_IDS),
            (self.known_helpers_only, Flags::KNOWN_HELPERS_ONLY),
        ] {
            if set == Some(true) {
                flags |= flag;
            }
        }

        flags
    }
}

impl From<FixtureOptions> for Options {
    fn from(value: FixtureOptions) -> Self {
        let mut options = Options::new().with_flags(value.flags());
        for name in value.known_helpers.unwrap_or_default().into_keys() {
            options.set_known_helper(name);
        }

        options
    }
}
