pub mod commands;
pub mod login;
pub mod notes;
pub mod placeholder_sets;
pub mod placeholders;
pub mod search;
pub mod steps;
pub mod substitute;
pub mod tags;

/// Body shared by the rename endpoints.
#[derive(serde::Deserialize)]
pub struct NameBody {
    pub name: String,
}

/// Body shared by the replace-all tag endpoints.
#[derive(serde::Deserialize)]
pub struct TagIdsBody {
    #[serde(alias = "tagIds")]
    pub tag_ids: Vec<i64>,
}
