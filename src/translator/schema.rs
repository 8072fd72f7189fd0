//! Record schemas
//!
//! The translator consults declared record types to tell a positional field
//! projection apart from relation currying, and to find the codomain of a
//! relation when it synthesizes join quantifiers.

use rustc_hash::FxHashMap;

use crate::ast::{Declaration, RecordField, RecordRelation};

/// Separator between a record name and one of its relations
pub const RELATION_SEPARATOR: char = '#';

/// Returns the canonical name of a derived relation, `Record#relation`
pub fn relation_name(record: &str, relation: &str) -> String {
    format!("{}{}{}", record, RELATION_SEPARATOR, relation)
}

/// A typed field or relation of a record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypedRef {
    /// Member name
    pub name: String,
    /// Declared type name
    pub ty: String,
    /// Identity flag for fields, injectivity flag for relations
    pub flagged: bool,
}

impl From<&RecordField> for TypedRef {
    fn from(field: &RecordField) -> Self {
        Self {
            name: field.name.clone(),
            ty: field.ty.clone(),
            flagged: field.is_identity,
        }
    }
}

impl From<&RecordRelation> for TypedRef {
    fn from(relation: &RecordRelation) -> Self {
        Self {
            name: relation.name.clone(),
            ty: relation.ty.clone(),
            flagged: relation.is_injective,
        }
    }
}

/// A record schema
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Type {
    /// Record name
    pub name: String,
    /// Positional fields
    pub fields: Vec<TypedRef>,
    /// Derived relations
    pub relations: Vec<TypedRef>,
}

impl Type {
    /// Returns the qualified relation name if this record declares `relation`
    pub fn find_relation(&self, relation: &str) -> Option<String> {
        self.relations
            .iter()
            .any(|r| r.name == relation)
            .then(|| relation_name(&self.name, relation))
    }

    /// Returns the position of a field
    pub fn find_field(&self, field: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == field)
    }

    /// Returns the declaration of a relation or field, relations first
    pub fn find_type_of(&self, member: &str) -> Option<&TypedRef> {
        self.relations
            .iter()
            .chain(self.fields.iter())
            .find(|t| t.name == member)
    }
}

/// All record schemas of a specification, in declaration order
#[derive(Debug, Clone, Default)]
pub struct Schema {
    types: Vec<Type>,
    by_name: FxHashMap<String, usize>,
}

impl Schema {
    /// Creates an empty schema
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers every record declared in `declarations`
    pub fn from_declarations(declarations: &[Declaration]) -> Self {
        let mut schema = Self::new();
        for declaration in declarations {
            if let Declaration::Record {
                name,
                fields,
                relations,
            } = declaration
            {
                schema.register(Type {
                    name: name.clone(),
                    fields: fields.iter().map(TypedRef::from).collect(),
                    relations: relations.iter().map(TypedRef::from).collect(),
                });
            }
        }
        schema
    }

    /// Registers a record type, replacing an earlier one with the same name
    pub fn register(&mut self, ty: Type) {
        match self.by_name.get(&ty.name) {
            Some(&index) => self.types[index] = ty,
            None => {
                self.by_name.insert(ty.name.clone(), self.types.len());
                self.types.push(ty);
            }
        }
    }

    /// Looks up a record type by name
    pub fn get(&self, name: &str) -> Option<&Type> {
        self.by_name.get(name).map(|&index| &self.types[index])
    }

    /// Iterates record types in declaration order
    pub fn types(&self) -> impl Iterator<Item = &Type> {
        self.types.iter()
    }

    /// Returns the codomain type of a qualified relation name (`Room#teacher`)
    pub fn relation_codomain(&self, qualified: &str) -> Option<&str> {
        let (record, relation) = qualified.split_once(RELATION_SEPARATOR)?;
        self.get(record)?
            .relations
            .iter()
            .find(|r| r.name == relation)
            .map(|r| r.ty.as_str())
    }

    /// Returns the first record (in declaration order) declaring relation `name`
    pub fn find_relation_anywhere(&self, name: &str) -> Option<String> {
        self.types.iter().find_map(|t| t.find_relation(name))
    }

    /// Returns the first record (in declaration order) declaring field `name`,
    /// with the field's position
    pub fn find_field_anywhere(&self, name: &str) -> Option<(&Type, usize)> {
        self.types
            .iter()
            .find_map(|t| t.find_field(name).map(|index| (t, index)))
    }
}
