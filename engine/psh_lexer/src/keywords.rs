//! The five case-insensitive word sets consulted by the tokenizer.
//!
//! The sets are owned by the host (an editor ships them as data files or
//! built-in tables) and are only ever queried here. Membership is exact
//! and case-insensitive: words are lowercased once at construction and
//! probes arrive already lowercased from the scan context's bounded
//! extraction, so lookups are allocation-free.

use rustc_hash::FxHashSet;

/// Immutable word sets for keyword, type, cmdlet, alias, and predefined
/// variable classification.
#[derive(Clone, Debug, Default)]
pub struct KeywordSets {
    keywords: FxHashSet<Box<str>>,
    types: FxHashSet<Box<str>>,
    cmdlets: FxHashSet<Box<str>>,
    aliases: FxHashSet<Box<str>>,
    predefined_variables: FxHashSet<Box<str>>,
}

impl KeywordSets {
    /// Build the sets from externally supplied word lists. Input case is
    /// irrelevant; everything is folded to lowercase.
    pub fn new<'w>(
        keywords: impl IntoIterator<Item = &'w str>,
        types: impl IntoIterator<Item = &'w str>,
        cmdlets: impl IntoIterator<Item = &'w str>,
        aliases: impl IntoIterator<Item = &'w str>,
        predefined_variables: impl IntoIterator<Item = &'w str>,
    ) -> Self {
        Self {
            keywords: lowered_set(keywords),
            types: lowered_set(types),
            cmdlets: lowered_set(cmdlets),
            aliases: lowered_set(aliases),
            predefined_variables: lowered_set(predefined_variables),
        }
    }

    /// Language keyword (`if`, `function`, `class`, ...).
    #[inline]
    pub fn is_keyword(&self, lowered: &[u8]) -> bool {
        contains(&self.keywords, lowered)
    }

    /// Type name recognized inside `[...]` attribute brackets.
    #[inline]
    pub fn is_type(&self, lowered: &[u8]) -> bool {
        contains(&self.types, lowered)
    }

    /// Built-in command name (`Get-Item`, ...).
    #[inline]
    pub fn is_cmdlet(&self, lowered: &[u8]) -> bool {
        contains(&self.cmdlets, lowered)
    }

    /// Command alias (`gci`, `ls`, ...).
    #[inline]
    pub fn is_alias(&self, lowered: &[u8]) -> bool {
        contains(&self.aliases, lowered)
    }

    /// Predefined variable name, probed without its `$`/`@` sigil
    /// (`pshome`, `args`, ...).
    #[inline]
    pub fn is_predefined_variable(&self, lowered: &[u8]) -> bool {
        contains(&self.predefined_variables, lowered)
    }
}

fn lowered_set<'w>(words: impl IntoIterator<Item = &'w str>) -> FxHashSet<Box<str>> {
    words
        .into_iter()
        .map(|w| w.to_ascii_lowercase().into_boxed_str())
        .collect()
}

/// Probe with lowercased bytes. Truncated or non-UTF-8 probes simply miss,
/// per the bounded-extraction contract.
fn contains(set: &FxHashSet<Box<str>>, lowered: &[u8]) -> bool {
    std::str::from_utf8(lowered).is_ok_and(|word| set.contains(word))
}
