use crate::schema::{ CollectionSchema, FieldSpec, FieldType };

/// Collection backing the public space search.
pub const SPACES_COLLECTION: &str = "spaces";

/// Declared schema for the spaces collection. This is the fixed target the
/// schema trigger reconciles against; changing it and re-running the trigger
/// rebuilds the remote collection to match.
pub fn spaces_schema() -> CollectionSchema {
    CollectionSchema {
        name: SPACES_COLLECTION.to_string(),
        fields: vec![
            FieldSpec::new("title", FieldType::String),
            FieldSpec::new("description", FieldType::String).optional(),
            FieldSpec::new("address", FieldType::String),
            FieldSpec::new("city", FieldType::String).facet(),
            FieldSpec::new("state", FieldType::String).optional().facet(),
            FieldSpec::new("price_per_hour", FieldType::Float).facet(),
            FieldSpec::new("currency", FieldType::String).facet(),
            FieldSpec::new("capacity", FieldType::Int32).facet(),
            FieldSpec::new("area_sqm", FieldType::Float).optional().facet(),
            FieldSpec::new("images", FieldType::StringArray).optional(),
            FieldSpec::new("features", FieldType::StringArray).optional().facet(),
            FieldSpec::new("amenities", FieldType::StringArray).optional().facet(),
            FieldSpec::new("is_active", FieldType::Bool).default_value(false),
            FieldSpec::new("rating", FieldType::Float).facet().default_value(0.0),
            FieldSpec::new("total_reviews", FieldType::Int32).default_value(0),
            FieldSpec::new("category_id", FieldType::String).optional().facet(),
            FieldSpec::new("owner_id", FieldType::String),
            FieldSpec::new("location", FieldType::Geopoint).optional()
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::RESERVED_ID_FIELD;
    use std::collections::HashSet;

    #[test]
    fn spaces_schema_has_unique_field_names() {
        let schema = spaces_schema();
        let names: HashSet<&str> = schema.fields
            .iter()
            .map(|f| f.name.as_str())
            .collect();
        assert_eq!(names.len(), schema.fields.len());
    }

    #[test]
    fn spaces_schema_never_declares_the_reserved_id_field() {
        assert!(
            spaces_schema()
                .fields.iter()
                .all(|f| f.name != RESERVED_ID_FIELD)
        );
    }

    #[test]
    fn spaces_schema_declares_the_full_field_set() {
        let schema = spaces_schema();
        assert_eq!(schema.name, SPACES_COLLECTION);
        assert_eq!(schema.fields.len(), 18);

        let city = schema.fields
            .iter()
            .find(|f| f.name == "city")
            .unwrap();
        assert!(city.facet);
        assert!(!city.optional);

        let rating = schema.fields
            .iter()
            .find(|f| f.name == "rating")
            .unwrap();
        assert_eq!(rating.default, Some(0.0.into()));
    }
}
