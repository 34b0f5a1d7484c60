//! `SYSCAT.TABLES.TYPE` discriminator codes.
//!
//! DB2 stores every table-like object in one catalog view and tells them apart
//! with a single-character `TYPE` column. The mapping below is fixed; it is
//! checked once, the first time it is used.

use std::collections::{BTreeMap, HashMap};

use once_cell::sync::Lazy;

use super::category::ObjectCategory;

/// Category to code assignments, as documented for `SYSCAT.TABLES`.
const TYPE_CODE_ENTRIES: &[(ObjectCategory, &[char])] = &[
    (ObjectCategory::Alias, &['A']),
    // created temporary, hierarchy, detached, table, typed table
    (ObjectCategory::Table, &['G', 'H', 'L', 'T', 'U']),
    (ObjectCategory::View, &['V', 'W']),
    (ObjectCategory::MaterializedView, &['S']),
    (ObjectCategory::Nickname, &['N']),
];

static TYPE_CODES: Lazy<Result<TypeCodeTable, TypeCodeError>> =
    Lazy::new(|| TypeCodeTable::build(TYPE_CODE_ENTRIES));

/// Problems found while building a [`TypeCodeTable`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TypeCodeError {
    #[error("no type codes assigned to {0}")]
    MissingCodes(ObjectCategory),

    #[error("{0} is not stored in SYSCAT.TABLES and cannot carry type codes")]
    NotTableLike(ObjectCategory),

    #[error("type code '{code}' assigned to both {first} and {second}")]
    DuplicateCode {
        code: char,
        first: ObjectCategory,
        second: ObjectCategory,
    },

    #[error("type code '{0}' is not an uppercase ASCII letter")]
    InvalidCode(char),
}

/// Bidirectional mapping between table-like categories and type codes.
#[derive(Debug, Clone)]
pub struct TypeCodeTable {
    by_category: BTreeMap<ObjectCategory, Vec<char>>,
    by_code: HashMap<char, ObjectCategory>,
}

impl TypeCodeTable {
    /// Build and validate a table from raw assignments.
    pub fn build(entries: &[(ObjectCategory, &[char])]) -> Result<Self, TypeCodeError> {
        let mut by_category: BTreeMap<ObjectCategory, Vec<char>> = BTreeMap::new();
        let mut by_code = HashMap::new();

        for (category, codes) in entries {
            if !category.is_table_like() {
                return Err(TypeCodeError::NotTableLike(*category));
            }
            for &code in codes.iter() {
                if !code.is_ascii_uppercase() {
                    return Err(TypeCodeError::InvalidCode(code));
                }
                if let Some(first) = by_code.insert(code, *category) {
                    return Err(TypeCodeError::DuplicateCode {
                        code,
                        first,
                        second: *category,
                    });
                }
                by_category.entry(*category).or_default().push(code);
            }
        }

        for category in ObjectCategory::ALL.iter().filter(|c| c.is_table_like()) {
            if by_category.get(category).map_or(true, Vec::is_empty) {
                return Err(TypeCodeError::MissingCodes(*category));
            }
        }

        Ok(Self {
            by_category,
            by_code,
        })
    }

    /// Codes stored for a category. Empty for non-table-like categories.
    pub fn codes_for(&self, category: ObjectCategory) -> &[char] {
        self.by_category
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Category recovered from a raw catalog value.
    ///
    /// Only the first character is significant; DB2 returns `CHAR(1)`.
    pub fn category_for(&self, raw: &str) -> Option<ObjectCategory> {
        let code = raw.trim().chars().next()?;
        self.by_code.get(&code).copied()
    }

    /// Codes for a set of categories, in category order.
    pub fn codes_for_all<'a>(
        &self,
        categories: impl IntoIterator<Item = &'a ObjectCategory>,
    ) -> Vec<char> {
        let mut codes: Vec<char> = categories
            .into_iter()
            .flat_map(|c| self.codes_for(*c).iter().copied())
            .collect();
        codes.dedup();
        codes
    }
}

/// The validated DB2 type code table.
pub fn type_codes() -> Result<&'static TypeCodeTable, TypeCodeError> {
    TYPE_CODES.as_ref().map_err(Clone::clone)
}
