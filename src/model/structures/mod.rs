pub mod alias_mapping;
pub mod match_record;
pub mod ranking_entry;
pub mod rating;
pub mod source_type;
