//! Serialization policy.
//!
//! [`Config`] is pure policy, no behavior: when to write `$type` tags, whether
//! object key lookup folds ASCII case, and which members are force-included or
//! force-excluded regardless of what a converter would do on its own. It is
//! read-only during a traversal and safe to share between forked serializers.
//!
//! There is no implicit global default: every
//! [`GraphSerializer`](crate::GraphSerializer) is constructed with an explicit
//! `Config` value.
//!
//! ## Examples
//!
//! ```rust
//! use graphdoc::{Config, TypeTagMode};
//!
//! let config = Config::new()
//!     .with_type_tag_mode(TypeTagMode::Always)
//!     .with_case_insensitive_keys(true)
//!     .hide_member("password");
//!
//! assert_eq!(config.member_allowed("password"), Some(false));
//! assert_eq!(config.member_allowed("name"), None);
//! ```

/// When the serializer attaches a `$type` tag to an object.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum TypeTagMode {
    /// Never tag; documents can only be read back as their declared types.
    Never,
    /// Tag only when the runtime type differs from the declared type and the
    /// declared type's converter asks for inheritance support.
    #[default]
    WhenNeeded,
    /// Tag every object whose runtime type is registered.
    Always,
}

/// Policy switches consumed by the serialization pipeline.
#[derive(Clone, Debug, Default)]
pub struct Config {
    pub type_tag_mode: TypeTagMode,
    pub case_insensitive_keys: bool,
    forced_members: Vec<String>,
    hidden_members: Vec<String>,
}

impl Config {
    /// Creates the default policy: `WhenNeeded` tags, case-sensitive keys, no
    /// member markers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the `$type` tagging mode.
    #[must_use]
    pub fn with_type_tag_mode(mut self, mode: TypeTagMode) -> Self {
        self.type_tag_mode = mode;
        self
    }

    /// Enables or disables ASCII-case-insensitive object key lookup.
    #[must_use]
    pub fn with_case_insensitive_keys(mut self, fold: bool) -> Self {
        self.case_insensitive_keys = fold;
        self
    }

    /// Marks a member name as force-included: converters must emit it even if
    /// they would normally skip it.
    #[must_use]
    pub fn force_member(mut self, member: impl Into<String>) -> Self {
        self.forced_members.push(member.into());
        self
    }

    /// Marks a member name as force-excluded: converters must never emit or
    /// populate it. Exclusion wins over inclusion.
    #[must_use]
    pub fn hide_member(mut self, member: impl Into<String>) -> Self {
        self.hidden_members.push(member.into());
        self
    }

    /// Resolves the member markers for `member`: `Some(false)` when
    /// force-excluded, `Some(true)` when force-included, `None` when the
    /// converter's own policy applies.
    #[must_use]
    pub fn member_allowed(&self, member: &str) -> Option<bool> {
        if self.hidden_members.iter().any(|m| m == member) {
            return Some(false);
        }
        if self.forced_members.iter().any(|m| m == member) {
            return Some(true);
        }
        None
    }

    /// Shorthand used at every reserved-key lookup in the pipeline.
    #[inline]
    #[must_use]
    pub fn fold_keys(&self) -> bool {
        self.case_insensitive_keys
    }
}
