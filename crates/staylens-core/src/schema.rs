/// Arrow schemas and column names for review tables.
pub mod reviews {
    use arrow::datatypes::{DataType, Field, Schema};

    pub const HOTEL: &str = "hotel_name";
    pub const SOURCE: &str = "source";
    pub const SOURCE_FILE: &str = "source_file";
    pub const TITLE: &str = "review_title";
    pub const COMMENT: &str = "review_comment";
    pub const RATING_RAW: &str = "rating_raw";
    pub const RATING: &str = "rating_0_5";
    pub const SENTIMENT: &str = "sentiment";
    pub const CLEAN_COMMENT: &str = "clean_comment";
    pub const CLEAN_FULL_TEXT: &str = "clean_full_text";
    pub const TOPIC: &str = "lda_topic";

    /// Older artifacts named the harmonized rating column this way.
    pub const LEGACY_RATING: &str = "rating_1_5";

    /// Raw-table column aliases, in priority order.
    pub const HOTEL_ALIASES: &[&str] = &["hotel_name", "hotel_id", "hotel"];
    pub const TITLE_ALIASES: &[&str] = &["review_title", "title"];
    pub const BODY_ALIASES: &[&str] = &["review_comment", "comment", "review_text", "body"];
    pub const RATING_ALIASES: &[&str] = &["rating_raw", "rating", "score"];
    pub const SENTIMENT_ALIASES: &[&str] = &["sentiment", "label"];

    /// Schema for the cleaned corpus artifact.
    pub fn cleaned_schema() -> Schema {
        Schema::new(vec![
            Field::new(HOTEL, DataType::Utf8, true),
            Field::new(SOURCE, DataType::Utf8, false),
            Field::new(SOURCE_FILE, DataType::Utf8, false),
            Field::new(TITLE, DataType::Utf8, false),
            Field::new(COMMENT, DataType::Utf8, false),
            Field::new(RATING_RAW, DataType::Utf8, true),
            Field::new(RATING, DataType::Float64, true),
            Field::new(SENTIMENT, DataType::Utf8, false),
            Field::new(CLEAN_COMMENT, DataType::Utf8, false),
            Field::new(CLEAN_FULL_TEXT, DataType::Utf8, false),
        ])
    }

    /// Cleaned corpus plus the dominant LDA topic per review.
    pub fn with_topics_schema() -> Schema {
        let mut fields: Vec<Field> = cleaned_schema()
            .fields()
            .iter()
            .map(|f| f.as_ref().clone())
            .collect();
        fields.push(Field::new(TOPIC, DataType::Int64, true));
        Schema::new(fields)
    }
}
