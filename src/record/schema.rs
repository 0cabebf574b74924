//! The fixed, ordered column set shared by the extractor and the sink
//!
//! Field names are matched verbatim against on-page label text and are
//! written verbatim as CSV header cells, so they must stay byte-identical
//! between the two uses.

use std::collections::HashMap;
use thiserror::Error;

/// Errors raised while building a schema or mapping data onto it
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("Schema has no fields")]
    Empty,

    #[error("Duplicate schema field: {0}")]
    DuplicateField(String),

    #[error("Role field '{0}' is not part of the schema")]
    MissingRoleField(String),

    #[error("Row has {found} cells, schema has {expected}")]
    RowWidth { expected: usize, found: usize },
}

/// How a column's cells are interpreted when read back
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Free text as shown on the page
    Text,
    /// Presence flag: `true` when stated, empty when not stated
    Flag,
}

/// One column of the schema
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: String,
    pub kind: FieldKind,
}

impl FieldSpec {
    pub fn text(name: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: FieldKind::Text,
        }
    }

    pub fn flag(name: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: FieldKind::Flag,
        }
    }
}

/// Area
pub const AREA_FIELD: &str = "المساحة";
/// Price
pub const PRICE_FIELD: &str = "السعر";
/// Date the listing was added
pub const PUBLISHED_FIELD: &str = "تاريخ الإضافة";
/// Source URL, the record identity
pub const URL_FIELD: &str = "Apartment Link";

/// Ordered schema with three role columns: identity, price and publish date
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    fields: Vec<FieldSpec>,
    index: HashMap<String, usize>,
    identity: usize,
    price: usize,
    published: usize,
}

impl Schema {
    /// Builds a schema, checking that names are unique and every role
    /// field is present
    pub fn new(
        fields: Vec<FieldSpec>,
        identity: &str,
        price: &str,
        published: &str,
    ) -> Result<Self, SchemaError> {
        if fields.is_empty() {
            return Err(SchemaError::Empty);
        }

        let mut index = HashMap::with_capacity(fields.len());
        for (position, field) in fields.iter().enumerate() {
            if index.insert(field.name.clone(), position).is_some() {
                return Err(SchemaError::DuplicateField(field.name.clone()));
            }
        }

        let role = |name: &str| {
            index
                .get(name)
                .copied()
                .ok_or_else(|| SchemaError::MissingRoleField(name.to_string()))
        };
        let identity = role(identity)?;
        let price = role(price)?;
        let published = role(published)?;

        Ok(Self {
            fields,
            index,
            identity,
            price,
            published,
        })
    }

    /// The apartment-listing schema of the target catalog
    pub fn listing() -> Self {
        let fields = vec![
            FieldSpec::text(AREA_FIELD),
            FieldSpec::text("عمر العقار"),
            FieldSpec::text("الدور"),
            FieldSpec::text("دورات المياه"),
            FieldSpec::text("الصالات"),
            FieldSpec::text("غرف النوم"),
            FieldSpec::text("الواجهة"),
            FieldSpec::flag("مدخل سيارة"),
            FieldSpec::flag("مصعد"),
            FieldSpec::flag("توفر الماء"),
            FieldSpec::flag("توفر الكهرباء"),
            FieldSpec::flag("توفر صرف صحي"),
            FieldSpec::flag("سطح خاص"),
            FieldSpec::flag("مدخلين"),
            FieldSpec::text("المنطقة"),
            FieldSpec::text("المدينة"),
            FieldSpec::text("الحي"),
            FieldSpec::text("الشارع"),
            FieldSpec::text("الرمز البريدي"),
            FieldSpec::text("رقم المبنى"),
            FieldSpec::text("الرقم الإضافي"),
            FieldSpec::text(PUBLISHED_FIELD),
            FieldSpec::text(PRICE_FIELD),
            FieldSpec::text(URL_FIELD),
        ];

        let fields_len = fields.len();
        let index: HashMap<String, usize> = fields
            .iter()
            .enumerate()
            .map(|(position, field)| (field.name.clone(), position))
            .collect();
        debug_assert_eq!(index.len(), fields_len);

        Self {
            fields,
            index,
            identity: fields_len - 1,
            price: fields_len - 2,
            published: fields_len - 3,
        }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Column names in output order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    /// Position of a field, if the name is part of the schema
    pub fn position(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Kind of a field, if the name is part of the schema
    pub fn kind(&self, name: &str) -> Option<FieldKind> {
        self.position(name).map(|position| self.fields[position].kind)
    }

    pub fn identity_field(&self) -> &str {
        &self.fields[self.identity].name
    }

    pub fn price_field(&self) -> &str {
        &self.fields[self.price].name
    }

    pub fn published_field(&self) -> &str {
        &self.fields[self.published].name
    }

    pub(crate) fn identity_position(&self) -> usize {
        self.identity
    }
}
